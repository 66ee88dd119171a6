mod error;
mod milp;
mod problem;
mod solution;

pub use error::ProblemError;
pub use milp::Solver;
pub use problem::{
    Constraint, ConstraintOp, MilpBuilder, MilpProblem, Objective, VarKind, VariableSpec,
};
pub use solution::{ConstraintViolation, Solution, SolutionStatus};
