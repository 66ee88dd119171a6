use good_lp::{
    default_solver, variable, Expression, ProblemVariables, ResolutionError, SolverModel,
    Variable,
};
use good_lp::Solution as _;
use log::{debug, info, warn};

use crate::problem::{ConstraintOp, MilpProblem, VarKind};
use crate::solution::{ConstraintViolation, Solution};

/// Runs a [`MilpProblem`] through the `good_lp` backend.
///
/// The backend is called once with its default settings. No time limit or gap
/// is configured.
pub struct Solver {
    /// Tolerance used when auditing the returned values
    tolerance: f64,
}

impl Default for Solver {
    fn default() -> Self {
        Self { tolerance: 1e-6 }
    }
}

impl Solver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tolerance(mut self, tol: f64) -> Self {
        self.tolerance = tol;
        self
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Solve the problem and audit the result
    pub fn solve(&self, problem: &MilpProblem) -> Solution {
        info!(
            "solving MILP: {} variables ({} binary), {} constraints",
            problem.num_variables(),
            problem.num_binary(),
            problem.num_constraints()
        );

        let mut vars = ProblemVariables::new();
        let columns: Vec<Variable> = problem
            .variables
            .iter()
            .map(|spec| match spec.kind {
                VarKind::Binary => vars.add(variable().binary()),
                VarKind::Continuous => vars.add(variable().min(spec.kind.lower_bound())),
            })
            .collect();

        let objective = linear_expression(&problem.objective.coefficients, &columns);
        let unsolved = if problem.objective.minimize {
            vars.minimise(objective)
        } else {
            vars.maximise(objective)
        };

        let mut model = unsolved.using(default_solver);
        for c in &problem.constraints {
            let lhs = linear_expression(&c.coefficients, &columns);
            let row = match c.op {
                ConstraintOp::Le => lhs.leq(c.rhs),
                ConstraintOp::Ge => lhs.geq(c.rhs),
                ConstraintOp::Eq => lhs.eq(c.rhs),
            };
            model = model.with(row);
        }

        let solved = match model.solve() {
            Ok(solved) => solved,
            Err(ResolutionError::Infeasible) => {
                info!("backend reports the problem infeasible");
                return Solution::infeasible();
            }
            Err(ResolutionError::Unbounded) => {
                info!("backend reports the problem unbounded");
                return Solution::unbounded();
            }
            Err(e) => {
                warn!("backend failed: {}", e);
                return Solution::error(e.to_string());
            }
        };

        let values: Vec<f64> = columns.iter().map(|&column| solved.value(column)).collect();
        for (spec, value) in problem.variables.iter().zip(&values) {
            debug!("{} = {}", spec.name, value);
        }

        let objective_value = problem.evaluate_objective(&values);
        info!("optimal objective {}", objective_value);

        let mut solution = Solution::optimal(values, objective_value);
        solution.violations = self.verify(problem, &solution.values);
        if !solution.violations.is_empty() {
            warn!(
                "backend solution breaks {} constraint(s) beyond tolerance {}",
                solution.violations.len(),
                self.tolerance
            );
        }
        solution
    }

    /// Check `values` against every row and variable domain of `problem`
    pub fn verify(&self, problem: &MilpProblem, values: &[f64]) -> Vec<ConstraintViolation> {
        let mut violations = Vec::new();

        if values.len() != problem.num_variables() {
            let expected = problem.num_variables() as f64;
            let actual = values.len() as f64;
            violations.push(ConstraintViolation {
                constraint: "solution".to_string(),
                required: expected,
                actual,
                violation_amount: (expected - actual).abs(),
                description: format!(
                    "expected {} values but got {}",
                    problem.num_variables(),
                    values.len()
                ),
            });
            return violations;
        }

        for (spec, &value) in problem.variables.iter().zip(values) {
            if !value.is_finite() {
                violations.push(ConstraintViolation {
                    constraint: spec.name.clone(),
                    required: spec.kind.lower_bound(),
                    actual: value,
                    violation_amount: f64::INFINITY,
                    description: format!("{} has no finite value ({})", spec.name, value),
                });
                continue;
            }
            match spec.kind {
                VarKind::Binary => {
                    let nearest = value.round().clamp(0.0, 1.0);
                    let off = (value - nearest).abs();
                    if off > self.tolerance {
                        violations.push(ConstraintViolation {
                            constraint: spec.name.clone(),
                            required: nearest,
                            actual: value,
                            violation_amount: off,
                            description: format!("{} should be 0 or 1 but is {}", spec.name, value),
                        });
                    }
                }
                VarKind::Continuous => {
                    if value < spec.kind.lower_bound() - self.tolerance {
                        violations.push(ConstraintViolation {
                            constraint: spec.name.clone(),
                            required: spec.kind.lower_bound(),
                            actual: value,
                            violation_amount: spec.kind.lower_bound() - value,
                            description: format!("{} is negative ({})", spec.name, value),
                        });
                    }
                }
            }
        }

        for c in &problem.constraints {
            if c.is_satisfied(values, self.tolerance) {
                continue;
            }
            let amount = c.violation(values);
            let lhs = c.lhs(values);
            let description = match c.op {
                ConstraintOp::Le => {
                    format!("{} exceeds maximum of {:.2} by {:.2}", c.name, c.rhs, amount)
                }
                ConstraintOp::Ge => {
                    format!("{} is below minimum of {:.2} by {:.2}", c.name, c.rhs, amount)
                }
                ConstraintOp::Eq => {
                    format!("{} requires exactly {:.2} but got {:.2}", c.name, c.rhs, lhs)
                }
            };
            violations.push(ConstraintViolation {
                constraint: c.name.clone(),
                required: c.rhs,
                actual: lhs,
                violation_amount: amount,
                description,
            });
        }

        // Worst first
        violations.sort_by(|a, b| {
            b.violation_amount
                .partial_cmp(&a.violation_amount)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        violations
    }
}

fn linear_expression(coefficients: &[f64], columns: &[Variable]) -> Expression {
    let mut expr = Expression::from(0.0);
    for (&coef, &column) in coefficients.iter().zip(columns) {
        if coef != 0.0 {
            expr += coef * column;
        }
    }
    expr
}
