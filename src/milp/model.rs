//! In-memory MILP model.

use super::backend::{Direction, MilpBackend, Sense, VarKind};
use thiserror::Error;

/// Errors raised by [`LpModel`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    #[error("invalid bounds for variable `{name}`: [{lower}, {upper}]")]
    InvalidVariableBounds { name: String, lower: f64, upper: f64 },

    #[error("non-finite coefficient {value} for variable {var:?}")]
    NonFiniteCoefficient { var: VarId, value: f64 },

    #[error("non-finite right-hand side {value} for constraint `{name}`")]
    NonFiniteRhs { name: String, value: f64 },

    #[error("non-finite constant {0}")]
    NonFiniteConstant(f64),

    #[error("unknown variable {0:?}")]
    UnknownVariable(VarId),

    #[error("objective already set")]
    ObjectiveAlreadySet,

    #[error("assignment has {found} values, model has {expected} variables")]
    AssignmentLength { expected: usize, found: usize },

    #[error("variable index {index} exceeds the id range")]
    TooManyVariables { index: usize },
}

/// Index of a variable inside an [`LpModel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VarId(u32);

impl VarId {
    pub(crate) fn try_from_index(index: usize) -> Result<Self, ModelError> {
        u32::try_from(index)
            .map(VarId)
            .map_err(|_| ModelError::TooManyVariables { index })
    }

    // Only for indices of variables already in a model, which
    // `try_from_index` has admitted.
    pub(crate) fn from_index(index: usize) -> Self {
        debug_assert!(u32::try_from(index).is_ok());
        VarId(index as u32)
    }

    /// Position in [`LpModel::variables`].
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A decision variable.
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub name: String,
    pub lower: f64,
    pub upper: f64,
    pub kind: VarKind,
}

impl Variable {
    /// Integer variable with bounds `[0, 1]`.
    pub fn is_binary(&self) -> bool {
        self.kind == VarKind::Integer && self.lower == 0.0 && self.upper == 1.0
    }
}

/// A linear expression `Σ coefficient·var + constant`.
///
/// Terms are kept in insertion order; a variable may appear more than once
/// and [`LinearExpr::coefficient`] sums its occurrences.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinearExpr {
    terms: Vec<(VarId, f64)>,
    constant: f64,
}

impl LinearExpr {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn terms(&self) -> &[(VarId, f64)] {
        &self.terms
    }

    pub fn constant(&self) -> f64 {
        self.constant
    }

    /// Total coefficient of `var` (zero when absent).
    pub fn coefficient(&self, var: VarId) -> f64 {
        self.terms
            .iter()
            .filter(|(v, _)| *v == var)
            .map(|(_, c)| c)
            .sum()
    }

    /// Whether `var` appears in any term.
    pub fn contains(&self, var: VarId) -> bool {
        self.terms.iter().any(|(v, _)| *v == var)
    }

    /// Value of the expression under `values` (indexed by [`VarId::index`]).
    pub fn evaluate(&self, values: &[f64]) -> f64 {
        self.terms
            .iter()
            .map(|(v, c)| c * values[v.index()])
            .sum::<f64>()
            + self.constant
    }
}

/// A named linear constraint `expr (sense) rhs`.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearConstraint {
    pub name: String,
    pub expr: LinearExpr,
    pub sense: Sense,
    pub rhs: f64,
}

/// The registered objective.
#[derive(Debug, Clone, PartialEq)]
pub struct Objective {
    pub direction: Direction,
    pub expr: LinearExpr,
}

/// A MILP model held in memory.
///
/// Implements [`MilpBackend`] by recording every variable, constraint and
/// the objective. The recorded model can be inspected, checked against a
/// candidate assignment, or written in LP format for an external solver.
///
/// # Examples
///
/// ```
/// use u_aircraft_routing::milp::{Direction, LpModel, MilpBackend, Sense, VarKind};
///
/// let mut model = LpModel::new("demo");
/// let x = model.create_variable("x", 0.0, 1.0, VarKind::Integer).unwrap();
/// let y = model.create_variable("y", 0.0, f64::INFINITY, VarKind::Continuous).unwrap();
///
/// let mut expr = model.linear_expression();
/// model.add_term(&mut expr, 1.0, x).unwrap();
/// model.add_term(&mut expr, 2.0, y).unwrap();
/// model.add_less_or_equal("cap", expr, 4.0).unwrap();
///
/// let obj = model.scale(1.0, x).unwrap();
/// model.set_objective(obj, Direction::Maximize).unwrap();
///
/// let cap = model.constraint("cap").unwrap();
/// assert_eq!(cap.sense, Sense::LessOrEqual);
/// assert_eq!(cap.expr.coefficient(y), 2.0);
/// ```
#[derive(Debug, Clone)]
pub struct LpModel {
    /// Model name.
    pub name: String,
    variables: Vec<Variable>,
    constraints: Vec<LinearConstraint>,
    objective: Option<Objective>,
}

impl LpModel {
    /// Creates an empty model.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            variables: Vec::new(),
            constraints: Vec::new(),
            objective: None,
        }
    }

    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn variable(&self, id: VarId) -> Option<&Variable> {
        self.variables.get(id.index())
    }

    pub fn constraints(&self) -> &[LinearConstraint] {
        &self.constraints
    }

    /// First constraint with exactly this name.
    pub fn constraint(&self, name: &str) -> Option<&LinearConstraint> {
        self.constraints.iter().find(|c| c.name == name)
    }

    /// Constraints whose name starts with `prefix`, in insertion order.
    pub fn constraints_named<'a>(
        &'a self,
        prefix: &'a str,
    ) -> impl Iterator<Item = &'a LinearConstraint> + 'a {
        self.constraints
            .iter()
            .filter(move |c| c.name.starts_with(prefix))
    }

    pub fn objective(&self) -> Option<&Objective> {
        self.objective.as_ref()
    }

    pub fn variable_count(&self) -> usize {
        self.variables.len()
    }

    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }

    /// Objective value under `values`, if an objective is set.
    pub fn objective_value(&self, values: &[f64]) -> Result<Option<f64>, ModelError> {
        self.ensure_assignment(values)?;
        Ok(self.objective.as_ref().map(|o| o.expr.evaluate(values)))
    }

    pub(crate) fn ensure_assignment(&self, values: &[f64]) -> Result<(), ModelError> {
        if values.len() != self.variables.len() {
            return Err(ModelError::AssignmentLength {
                expected: self.variables.len(),
                found: values.len(),
            });
        }
        Ok(())
    }

    fn ensure_variable(&self, var: VarId) -> Result<(), ModelError> {
        if var.index() >= self.variables.len() {
            return Err(ModelError::UnknownVariable(var));
        }
        Ok(())
    }

    fn push_constraint(
        &mut self,
        name: &str,
        expr: LinearExpr,
        sense: Sense,
        rhs: f64,
    ) -> Result<(), ModelError> {
        if !rhs.is_finite() {
            return Err(ModelError::NonFiniteRhs {
                name: name.to_string(),
                value: rhs,
            });
        }
        tracing::trace!(
            component = "lp_model",
            operation = "add_constraint",
            constraint = name,
            sense = sense.as_str(),
            rhs,
            terms = expr.terms.len(),
            "Added constraint"
        );
        self.constraints.push(LinearConstraint {
            name: name.to_string(),
            expr,
            sense,
            rhs,
        });
        Ok(())
    }
}

impl MilpBackend for LpModel {
    type Var = VarId;
    type Expr = LinearExpr;
    type Error = ModelError;

    fn create_variable(
        &mut self,
        name: &str,
        lower: f64,
        upper: f64,
        kind: VarKind,
    ) -> Result<VarId, ModelError> {
        if lower.is_nan()
            || upper.is_nan()
            || lower > upper
            || lower == f64::INFINITY
            || upper == f64::NEG_INFINITY
        {
            return Err(ModelError::InvalidVariableBounds {
                name: name.to_string(),
                lower,
                upper,
            });
        }
        let id = VarId::try_from_index(self.variables.len())?;
        self.variables.push(Variable {
            name: name.to_string(),
            lower,
            upper,
            kind,
        });
        Ok(id)
    }

    fn linear_expression(&mut self) -> LinearExpr {
        LinearExpr::new()
    }

    fn add_term(
        &mut self,
        expr: &mut LinearExpr,
        coefficient: f64,
        var: VarId,
    ) -> Result<(), ModelError> {
        self.ensure_variable(var)?;
        if !coefficient.is_finite() {
            return Err(ModelError::NonFiniteCoefficient {
                var,
                value: coefficient,
            });
        }
        expr.terms.push((var, coefficient));
        Ok(())
    }

    fn add_constant(&mut self, expr: &mut LinearExpr, constant: f64) -> Result<(), ModelError> {
        if !constant.is_finite() {
            return Err(ModelError::NonFiniteConstant(constant));
        }
        expr.constant += constant;
        Ok(())
    }

    fn sum(&mut self, mut lhs: LinearExpr, rhs: LinearExpr) -> Result<LinearExpr, ModelError> {
        lhs.terms.extend(rhs.terms);
        lhs.constant += rhs.constant;
        Ok(lhs)
    }

    fn diff(&mut self, mut lhs: LinearExpr, rhs: LinearExpr) -> Result<LinearExpr, ModelError> {
        lhs.terms
            .extend(rhs.terms.into_iter().map(|(v, c)| (v, -c)));
        lhs.constant -= rhs.constant;
        Ok(lhs)
    }

    fn scale(&mut self, coefficient: f64, var: VarId) -> Result<LinearExpr, ModelError> {
        let mut expr = LinearExpr::new();
        self.add_term(&mut expr, coefficient, var)?;
        Ok(expr)
    }

    fn add_equality(&mut self, name: &str, expr: LinearExpr, rhs: f64) -> Result<(), ModelError> {
        self.push_constraint(name, expr, Sense::Equal, rhs)
    }

    fn add_less_or_equal(
        &mut self,
        name: &str,
        expr: LinearExpr,
        rhs: f64,
    ) -> Result<(), ModelError> {
        self.push_constraint(name, expr, Sense::LessOrEqual, rhs)
    }

    fn add_greater_or_equal(
        &mut self,
        name: &str,
        expr: LinearExpr,
        rhs: f64,
    ) -> Result<(), ModelError> {
        self.push_constraint(name, expr, Sense::GreaterOrEqual, rhs)
    }

    fn set_objective(&mut self, expr: LinearExpr, direction: Direction) -> Result<(), ModelError> {
        if self.objective.is_some() {
            return Err(ModelError::ObjectiveAlreadySet);
        }
        tracing::trace!(
            component = "lp_model",
            operation = "set_objective",
            direction = ?direction,
            terms = expr.terms.len(),
            "Set objective"
        );
        self.objective = Some(Objective { direction, expr });
        Ok(())
    }
}
