use log::debug;
use siting_solver::{ConstraintOp, MilpBuilder, MilpProblem, ProblemError, VarKind};
use thiserror::Error;

use crate::instance::FacilityInstance;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompileError {
    #[error("Unknown facility index: {0}")]
    UnknownFacility(usize),
    #[error("Invalid instance data: {0}")]
    InvalidData(String),
    #[error("Total demand {demand} exceeds total capacity {capacity}")]
    InsufficientCapacity { demand: f64, capacity: f64 },
    #[error(transparent)]
    Problem(#[from] ProblemError),
}

/// Knobs applied while compiling an instance
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompileOptions {
    /// Facilities (by index) that must be open; each adds an `x >= 1` row
    pub force_open: Vec<usize>,
}

impl CompileOptions {
    pub fn force_open(mut self, facility: usize) -> Self {
        if !self.force_open.contains(&facility) {
            self.force_open.push(facility);
        }
        self
    }
}

/// An instance lowered to a [`MilpProblem`], with the column layout needed
/// to read the solution back.
///
/// Columns are laid out as `open[f]` for every facility, then `flow[p][f]`
/// product by product.
#[derive(Debug, Clone)]
pub struct CompiledModel {
    pub problem: MilpProblem,
    pub facility_names: Vec<String>,
    pub product_names: Vec<String>,
}

impl CompiledModel {
    pub fn open_var(&self, facility: usize) -> usize {
        open_column(facility)
    }

    pub fn flow_var(&self, product: usize, facility: usize) -> usize {
        flow_column(self.facility_names.len(), product, facility)
    }

    /// Facilities whose open variable is 1 in `values`
    pub fn open_facilities(&self, values: &[f64]) -> Vec<&str> {
        self.facility_names
            .iter()
            .enumerate()
            .filter(|&(f, _)| values.get(self.open_var(f)).is_some_and(|&v| v > 0.5))
            .map(|(_, name)| name.as_str())
            .collect()
    }
}

fn open_column(facility: usize) -> usize {
    facility
}

fn flow_column(num_facilities: usize, product: usize, facility: usize) -> usize {
    num_facilities * (1 + product) + facility
}

impl FacilityInstance {
    pub fn compile(&self, options: &CompileOptions) -> Result<CompiledModel, CompileError> {
        self.validate()?;
        for &f in &options.force_open {
            if f >= self.facilities.len() {
                return Err(CompileError::UnknownFacility(f));
            }
        }

        let n_fac = self.facilities.len();
        let mut builder = MilpBuilder::new().minimize();

        for fac in &self.facilities {
            builder.add_variable(
                format!("open_{}", fac.name),
                VarKind::Binary,
                fac.open_cost,
            )?;
        }
        for (p, product) in self.products.iter().enumerate() {
            for fac in &self.facilities {
                builder.add_variable(
                    format!("flow_{}_{}", product.name, fac.name),
                    VarKind::Continuous,
                    fac.flow_cost[p],
                )?;
            }
        }

        let mut row = builder.row();
        for f in 0..n_fac {
            row[open_column(f)] = 1.0;
        }
        builder.add_constraint("min_open", row, ConstraintOp::Ge, self.min_open)?;

        for (p, product) in self.products.iter().enumerate() {
            let mut row = builder.row();
            for f in 0..n_fac {
                row[flow_column(n_fac, p, f)] = 1.0;
            }
            builder.add_constraint(
                format!("demand_{}", product.name),
                row,
                ConstraintOp::Ge,
                product.demand,
            )?;
        }

        for (f, fac) in self.facilities.iter().enumerate() {
            let mut row = builder.row();
            row[open_column(f)] = -fac.capacity;
            for p in 0..self.products.len() {
                row[flow_column(n_fac, p, f)] = 1.0;
            }
            builder.add_constraint(
                format!("capacity_{}", fac.name),
                row,
                ConstraintOp::Le,
                0.0,
            )?;
        }

        for &f in &options.force_open {
            let mut row = builder.row();
            row[open_column(f)] = 1.0;
            builder.add_constraint(
                format!("force_open_{}", self.facilities[f].name),
                row,
                ConstraintOp::Ge,
                1.0,
            )?;
        }

        let problem = builder.build();
        debug!(
            "compiled instance: {} variables, {} constraints",
            problem.num_variables(),
            problem.num_constraints()
        );

        Ok(CompiledModel {
            problem,
            facility_names: self.facilities.iter().map(|f| f.name.clone()).collect(),
            product_names: self.products.iter().map(|p| p.name.clone()).collect(),
        })
    }

    fn validate(&self) -> Result<(), CompileError> {
        for fac in &self.facilities {
            if !(fac.capacity.is_finite() && fac.capacity >= 0.0) {
                return Err(CompileError::InvalidData(format!(
                    "capacity of {} must be a finite non-negative number",
                    fac.name
                )));
            }
        }
        for product in &self.products {
            if !(product.demand.is_finite() && product.demand >= 0.0) {
                return Err(CompileError::InvalidData(format!(
                    "demand of {} must be a finite non-negative number",
                    product.name
                )));
            }
        }
        if self.total_demand() > self.total_capacity() {
            return Err(CompileError::InsufficientCapacity {
                demand: self.total_demand(),
                capacity: self.total_capacity(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use siting_solver::{Solution, SolutionStatus, Solver};

    const TOL: f64 = 1e-6;

    fn solve(options: &CompileOptions) -> (CompiledModel, Solution) {
        let compiled = FacilityInstance::standard().compile(options).unwrap();
        let solution = Solver::new().solve(&compiled.problem);
        (compiled, solution)
    }

    #[test]
    fn test_compile_layout() {
        let compiled = FacilityInstance::standard()
            .compile(&CompileOptions::default())
            .unwrap();
        let problem = &compiled.problem;

        assert_eq!(problem.num_variables(), 12);
        assert_eq!(problem.num_binary(), 4);
        assert!(problem.variables[..4].iter().all(|v| v.kind == VarKind::Binary));
        assert!(problem.variables[4..].iter().all(|v| v.kind == VarKind::Continuous));
        assert_eq!(
            problem.objective.coefficients,
            vec![100.0, 120.0, 90.0, 150.0, 1.0, 2.0, 1.0, 2.0, 1.0, 2.0, 1.0, 2.0]
        );
        assert!(problem.objective.minimize);
        assert_eq!(problem.variables[5].name, "flow_A_f2");
        assert_eq!(problem.variables[compiled.flow_var(1, 3)].name, "flow_B_f4");
    }

    #[test]
    fn test_compile_rows_in_order() {
        let compiled = FacilityInstance::standard()
            .compile(&CompileOptions::default())
            .unwrap();
        let rows = &compiled.problem.constraints;

        let names: Vec<&str> = rows.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "min_open",
                "demand_A",
                "demand_B",
                "capacity_f1",
                "capacity_f2",
                "capacity_f3",
                "capacity_f4"
            ]
        );

        let expected: [(Vec<f64>, ConstraintOp, f64); 7] = [
            (vec![1., 1., 1., 1., 0., 0., 0., 0., 0., 0., 0., 0.], ConstraintOp::Ge, 2.0),
            (vec![0., 0., 0., 0., 1., 1., 1., 1., 0., 0., 0., 0.], ConstraintOp::Ge, 56.0),
            (vec![0., 0., 0., 0., 0., 0., 0., 0., 1., 1., 1., 1.], ConstraintOp::Ge, 74.0),
            (vec![-40., 0., 0., 0., 1., 0., 0., 0., 1., 0., 0., 0.], ConstraintOp::Le, 0.0),
            (vec![0., -60., 0., 0., 0., 1., 0., 0., 0., 1., 0., 0.], ConstraintOp::Le, 0.0),
            (vec![0., 0., -50., 0., 0., 0., 1., 0., 0., 0., 1., 0.], ConstraintOp::Le, 0.0),
            (vec![0., 0., 0., -70., 0., 0., 0., 1., 0., 0., 0., 1.], ConstraintOp::Le, 0.0),
        ];
        for (row, (coefficients, op, rhs)) in rows.iter().zip(expected) {
            assert_eq!(row.coefficients, coefficients, "row {}", row.name);
            assert_eq!(row.op, op, "row {}", row.name);
            assert_eq!(row.rhs, rhs, "row {}", row.name);
        }
    }

    #[test]
    fn test_force_open_appends_rows() {
        let options = CompileOptions::default().force_open(3).force_open(3);
        let compiled = FacilityInstance::standard().compile(&options).unwrap();

        assert_eq!(compiled.problem.num_constraints(), 8);
        let row = compiled.problem.constraint("force_open_f4").unwrap();
        assert_eq!(row.coefficients[3], 1.0);
        assert_eq!(row.op, ConstraintOp::Ge);
        assert_eq!(row.rhs, 1.0);
    }

    #[test]
    fn test_unknown_facility_rejected() {
        let options = CompileOptions::default().force_open(4);
        assert_eq!(
            FacilityInstance::standard().compile(&options).unwrap_err(),
            CompileError::UnknownFacility(4)
        );
    }

    #[test]
    fn test_negative_demand_rejected() {
        let mut instance = FacilityInstance::standard();
        instance.products[0].demand = -1.0;
        assert!(matches!(
            instance.compile(&CompileOptions::default()),
            Err(CompileError::InvalidData(_))
        ));
    }

    #[test]
    fn test_compile_and_solve() {
        let (compiled, solution) = solve(&CompileOptions::default());

        assert_eq!(solution.status, SolutionStatus::Optimal);
        assert_eq!(solution.solution_count(), 1);
        assert_eq!(solution.values.len(), 12);

        // Open f1, f2, f3: 310 fixed + 90 units at cost 1 + 40 units at cost 2
        assert!(
            (solution.objective_value - 480.0).abs() < TOL,
            "obj = {} (expected 480)",
            solution.objective_value
        );
        assert_eq!(compiled.open_facilities(&solution.values), vec!["f1", "f2", "f3"]);
    }

    #[test]
    fn test_solution_respects_domains_and_rows() {
        let (compiled, solution) = solve(&CompileOptions::default());
        let problem = &compiled.problem;

        for (spec, &value) in problem.variables.iter().zip(&solution.values) {
            match spec.kind {
                VarKind::Binary => assert!(
                    value.abs() < TOL || (value - 1.0).abs() < TOL,
                    "{} = {} is not binary",
                    spec.name,
                    value
                ),
                VarKind::Continuous => {
                    assert!(value >= -TOL, "{} = {} is negative", spec.name, value)
                }
            }
        }
        for row in &problem.constraints {
            assert!(row.is_satisfied(&solution.values, TOL), "{} violated", row.name);
        }
        assert!(solution.is_verified());
    }

    #[test]
    fn test_closed_facility_carries_no_flow() {
        let (compiled, solution) = solve(&CompileOptions::default());

        for f in 0..compiled.facility_names.len() {
            if solution.values[compiled.open_var(f)] < 0.5 {
                for p in 0..compiled.product_names.len() {
                    let value = solution.values[compiled.flow_var(p, f)];
                    assert!(
                        value.abs() < TOL,
                        "flow {} through closed {}",
                        value,
                        compiled.facility_names[f]
                    );
                }
            }
        }
        // f4 is the closed one
        assert!(solution.values[compiled.open_var(3)].abs() < TOL);
    }

    #[test]
    fn test_repeated_solves_agree() {
        let (_, first) = solve(&CompileOptions::default());
        let (_, second) = solve(&CompileOptions::default());

        assert_eq!(first.status, SolutionStatus::Optimal);
        assert_eq!(second.status, SolutionStatus::Optimal);
        assert!((first.objective_value - second.objective_value).abs() < TOL);
    }

    #[test]
    fn test_all_facilities_forced_open() {
        let options = (0..4).fold(CompileOptions::default(), |o, f| o.force_open(f));
        let (compiled, solution) = solve(&options);

        assert_eq!(solution.status, SolutionStatus::Optimal);
        assert_eq!(
            compiled.open_facilities(&solution.values),
            vec!["f1", "f2", "f3", "f4"]
        );
        // 460 fixed, cheap sites f1 and f3 saturated (90 units), 40 more at cost 2
        assert!(
            (solution.objective_value - 630.0).abs() < TOL,
            "obj = {} (expected 630)",
            solution.objective_value
        );
        // Linking rows cannot bind beyond capacity
        for f in 0..4 {
            let carried: f64 = (0..2).map(|p| solution.values[compiled.flow_var(p, f)]).sum();
            assert!(carried <= FacilityInstance::standard().facilities[f].capacity + TOL);
        }
    }

    #[test]
    fn test_demand_beyond_capacity_rejected() {
        let mut instance = FacilityInstance::standard();
        instance.products[1].demand = 200.0;

        assert_eq!(
            instance.compile(&CompileOptions::default()).unwrap_err(),
            CompileError::InsufficientCapacity {
                demand: 256.0,
                capacity: 220.0
            }
        );
    }

    #[test]
    fn test_unreachable_open_count_is_infeasible() {
        // Only four sites exist
        let mut instance = FacilityInstance::standard();
        instance.min_open = 5.0;
        let compiled = instance.compile(&CompileOptions::default()).unwrap();

        let solution = Solver::new().solve(&compiled.problem);

        assert_eq!(solution.status, SolutionStatus::Infeasible);
        assert_eq!(solution.solution_count(), 0);
    }
}
