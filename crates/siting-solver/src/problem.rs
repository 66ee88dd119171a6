use crate::error::ProblemError;

/// Domain of a decision variable
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarKind {
    /// Takes the value 0 or 1
    Binary,
    /// Any real value >= 0, no upper bound
    Continuous,
}

impl VarKind {
    pub fn lower_bound(self) -> f64 {
        0.0
    }

    pub fn upper_bound(self) -> f64 {
        match self {
            VarKind::Binary => 1.0,
            VarKind::Continuous => f64::INFINITY,
        }
    }
}

/// A decision variable together with its objective cost
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct VariableSpec {
    pub name: String,
    pub kind: VarKind,
    /// Objective coefficient
    pub cost: f64,
}

/// A frozen mixed-integer linear program
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct MilpProblem {
    pub variables: Vec<VariableSpec>,
    pub objective: Objective,
    pub constraints: Vec<Constraint>,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Objective {
    /// Coefficients for each variable, in variable order
    pub coefficients: Vec<f64>,
    /// Whether to minimize or maximize
    pub minimize: bool,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    /// Name/label for the constraint (for diagnostics)
    pub name: String,
    /// Coefficients for each variable
    pub coefficients: Vec<f64>,
    /// Comparison operator
    pub op: ConstraintOp,
    /// Right-hand side value
    pub rhs: f64,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintOp {
    /// Less than or equal (<=)
    Le,
    /// Greater than or equal (>=)
    Ge,
    /// Equal (=)
    Eq,
}

impl ConstraintOp {
    pub fn symbol(self) -> &'static str {
        match self {
            ConstraintOp::Le => "<=",
            ConstraintOp::Ge => ">=",
            ConstraintOp::Eq => "=",
        }
    }
}

impl Constraint {
    /// Left-hand side evaluated at `values`
    pub fn lhs(&self, values: &[f64]) -> f64 {
        self.coefficients
            .iter()
            .zip(values)
            .map(|(coef, value)| coef * value)
            .sum()
    }

    /// Amount by which `values` violate this row, zero when satisfied.
    /// A non-finite left-hand side counts as an infinite violation.
    pub fn violation(&self, values: &[f64]) -> f64 {
        let lhs = self.lhs(values);
        if !lhs.is_finite() {
            return f64::INFINITY;
        }
        match self.op {
            ConstraintOp::Le => (lhs - self.rhs).max(0.0),
            ConstraintOp::Ge => (self.rhs - lhs).max(0.0),
            ConstraintOp::Eq => (lhs - self.rhs).abs(),
        }
    }

    pub fn is_satisfied(&self, values: &[f64], tolerance: f64) -> bool {
        self.violation(values) <= tolerance
    }
}

impl MilpProblem {
    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    pub fn num_binary(&self) -> usize {
        self.variables
            .iter()
            .filter(|v| v.kind == VarKind::Binary)
            .count()
    }

    pub fn constraint(&self, name: &str) -> Option<&Constraint> {
        self.constraints.iter().find(|c| c.name == name)
    }

    pub fn evaluate_objective(&self, values: &[f64]) -> f64 {
        self.objective
            .coefficients
            .iter()
            .zip(values)
            .map(|(coef, value)| coef * value)
            .sum()
    }
}

/// Owned builder for a [`MilpProblem`].
///
/// Variables are declared first; each carries its own objective cost, so the
/// objective is complete before the first row is added. Rows are dense over all
/// declared variables, which is why declaring a variable after a row is an error.
/// `build` consumes the builder, leaving the problem immutable.
#[derive(Debug, Clone)]
pub struct MilpBuilder {
    variables: Vec<VariableSpec>,
    minimize: bool,
    constraints: Vec<Constraint>,
}

impl Default for MilpBuilder {
    fn default() -> Self {
        Self {
            variables: Vec::new(),
            minimize: true,
            constraints: Vec::new(),
        }
    }
}

impl MilpBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a variable and return its column index
    pub fn add_variable(
        &mut self,
        name: impl Into<String>,
        kind: VarKind,
        cost: f64,
    ) -> Result<usize, ProblemError> {
        let name = name.into();
        if !self.constraints.is_empty() {
            return Err(ProblemError::VariableAfterConstraint(name));
        }
        if !cost.is_finite() {
            return Err(ProblemError::NonFinite(format!("cost of {}", name)));
        }
        if self.variables.iter().any(|v| v.name == name) {
            return Err(ProblemError::DuplicateName(name));
        }
        self.variables.push(VariableSpec { name, kind, cost });
        Ok(self.variables.len() - 1)
    }

    pub fn minimize(mut self) -> Self {
        self.minimize = true;
        self
    }

    pub fn maximize(mut self) -> Self {
        self.minimize = false;
        self
    }

    pub fn add_constraint(
        &mut self,
        name: impl Into<String>,
        coefficients: Vec<f64>,
        op: ConstraintOp,
        rhs: f64,
    ) -> Result<(), ProblemError> {
        let name = name.into();
        if coefficients.len() != self.variables.len() {
            return Err(ProblemError::DimensionMismatch {
                name,
                expected: self.variables.len(),
                got: coefficients.len(),
            });
        }
        if !rhs.is_finite() || coefficients.iter().any(|c| !c.is_finite()) {
            return Err(ProblemError::NonFinite(name));
        }
        if self.constraints.iter().any(|c| c.name == name) {
            return Err(ProblemError::DuplicateName(name));
        }
        self.constraints.push(Constraint {
            name,
            coefficients,
            op,
            rhs,
        });
        Ok(())
    }

    /// Empty row sized to the variables declared so far
    pub fn row(&self) -> Vec<f64> {
        vec![0.0; self.variables.len()]
    }

    pub fn build(self) -> MilpProblem {
        let coefficients = self.variables.iter().map(|v| v.cost).collect();
        MilpProblem {
            variables: self.variables,
            objective: Objective {
                coefficients,
                minimize: self.minimize,
            },
            constraints: self.constraints,
        }
    }
}
