/// The result of solving a MILP problem
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone)]
pub struct Solution {
    /// Solution status
    pub status: SolutionStatus,
    /// Assigned value for each variable (empty unless optimal)
    pub values: Vec<f64>,
    /// Optimal objective value
    pub objective_value: f64,
    /// Rows or domains the returned values break, worst first
    pub violations: Vec<ConstraintViolation>,
    /// Message reported by the backend when it fails
    pub message: Option<String>,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolutionStatus {
    /// An optimal solution was found
    Optimal,
    /// The problem is infeasible (no solution exists)
    Infeasible,
    /// The problem is unbounded
    Unbounded,
    /// Solver encountered an error
    Error,
}

impl SolutionStatus {
    pub fn label(self) -> &'static str {
        match self {
            SolutionStatus::Optimal => "OPTIMAL",
            SolutionStatus::Infeasible => "INFEASIBLE",
            SolutionStatus::Unbounded => "UNBOUNDED",
            SolutionStatus::Error => "ERROR",
        }
    }
}

/// Information about a violated constraint or variable domain
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct ConstraintViolation {
    /// Constraint or variable name
    pub constraint: String,
    /// Required value (from constraint RHS or variable domain)
    pub required: f64,
    /// Actual value achieved
    pub actual: f64,
    /// How much the constraint is violated by
    pub violation_amount: f64,
    /// Human-readable description of what's wrong
    pub description: String,
}

impl Solution {
    pub fn optimal(values: Vec<f64>, objective_value: f64) -> Self {
        Self {
            status: SolutionStatus::Optimal,
            values,
            objective_value,
            violations: Vec::new(),
            message: None,
        }
    }

    pub fn infeasible() -> Self {
        Self {
            status: SolutionStatus::Infeasible,
            values: Vec::new(),
            objective_value: f64::INFINITY,
            violations: Vec::new(),
            message: None,
        }
    }

    pub fn unbounded() -> Self {
        Self {
            status: SolutionStatus::Unbounded,
            values: Vec::new(),
            objective_value: f64::NEG_INFINITY,
            violations: Vec::new(),
            message: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: SolutionStatus::Error,
            values: Vec::new(),
            objective_value: f64::NAN,
            violations: Vec::new(),
            message: Some(message.into()),
        }
    }

    /// Number of feasible solutions carried by this result (0 or 1)
    pub fn solution_count(&self) -> usize {
        usize::from(self.status == SolutionStatus::Optimal)
    }

    pub fn is_optimal(&self) -> bool {
        self.status == SolutionStatus::Optimal
    }

    /// True when the result is optimal and passed the audit
    pub fn is_verified(&self) -> bool {
        self.is_optimal() && self.violations.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_solution_count_follows_status() {
        assert_eq!(Solution::optimal(vec![1.0], 3.0).solution_count(), 1);
        assert_eq!(Solution::infeasible().solution_count(), 0);
        assert_eq!(Solution::unbounded().solution_count(), 0);
        assert_eq!(Solution::error("boom").solution_count(), 0);
    }

    #[test]
    fn test_failed_results_carry_no_values() {
        let sol = Solution::infeasible();
        assert!(sol.values.is_empty());
        assert!(!sol.is_verified());

        let sol = Solution::error("numerical trouble");
        assert_eq!(sol.status.label(), "ERROR");
        assert_eq!(sol.message.as_deref(), Some("numerical trouble"));
    }
}
