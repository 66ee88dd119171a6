use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProblemError {
    #[error("Constraint {name} has {got} coefficients, expected {expected}")]
    DimensionMismatch { name: String, expected: usize, got: usize },
    #[error("Non-finite value in {0}")]
    NonFinite(String),
    #[error("Cannot add variable {0} after constraints have been added")]
    VariableAfterConstraint(String),
    #[error("Duplicate name: {0}")]
    DuplicateName(String),
}
