/// A candidate site that may be opened
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Facility {
    pub name: String,
    /// Fixed cost paid when the facility is opened
    pub open_cost: f64,
    /// Combined flow the facility can carry when open (the big-M of its linking row)
    pub capacity: f64,
    /// Unit flow cost, one entry per product
    pub flow_cost: [f64; 2],
}

/// A product whose demand must be covered
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub name: String,
    pub demand: f64,
}

/// The four-site, two-product siting instance
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct FacilityInstance {
    pub facilities: [Facility; 4],
    pub products: [Product; 2],
    /// Minimum number of facilities that must be open
    pub min_open: f64,
}

impl Default for FacilityInstance {
    fn default() -> Self {
        Self::standard()
    }
}

impl FacilityInstance {
    /// The hard-coded instance this tool solves
    pub fn standard() -> Self {
        Self {
            facilities: [
                facility("f1", 100.0, 40.0, [1.0, 1.0]),
                facility("f2", 120.0, 60.0, [2.0, 2.0]),
                facility("f3", 90.0, 50.0, [1.0, 1.0]),
                facility("f4", 150.0, 70.0, [2.0, 2.0]),
            ],
            products: [
                Product {
                    name: "A".to_string(),
                    demand: 56.0,
                },
                Product {
                    name: "B".to_string(),
                    demand: 74.0,
                },
            ],
            min_open: 2.0,
        }
    }

    pub fn total_capacity(&self) -> f64 {
        self.facilities.iter().map(|f| f.capacity).sum()
    }

    pub fn total_demand(&self) -> f64 {
        self.products.iter().map(|p| p.demand).sum()
    }
}

fn facility(name: &str, open_cost: f64, capacity: f64, flow_cost: [f64; 2]) -> Facility {
    Facility {
        name: name.to_string(),
        open_cost,
        capacity,
        flow_cost,
    }
}
