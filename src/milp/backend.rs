//! Solver primitive interface.

use std::fmt;

/// Domain type of a decision variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum VarKind {
    /// Integer-valued within its bounds (binary when bounds are `[0, 1]`).
    Integer,
    /// Real-valued within its bounds.
    Continuous,
}

/// Objective direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Direction {
    Minimize,
    Maximize,
}

/// Relational operator of a linear constraint `expr (sense) rhs`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Sense {
    /// `expr == rhs`
    Equal,
    /// `expr <= rhs`
    LessOrEqual,
    /// `expr >= rhs`
    GreaterOrEqual,
}

impl Sense {
    /// LP-format operator.
    pub fn as_str(self) -> &'static str {
        match self {
            Sense::Equal => "=",
            Sense::LessOrEqual => "<=",
            Sense::GreaterOrEqual => ">=",
        }
    }
}

impl fmt::Display for Sense {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Primitive operations a MILP solver must offer to build routing models.
///
/// The formulation only ever talks to a solver through this trait, so any
/// solver API (or the in-memory [`LpModel`](super::LpModel)) can sit behind
/// it. Variable and expression handles are owned by the implementor; the
/// formulation keeps copies of `Var` handles but never inspects them.
///
/// Every fallible call returns the implementor's own error type; the
/// formulation wraps it with the model part being built and gives up.
///
/// Implementations are driven from a single thread, start to finish.
pub trait MilpBackend {
    /// Variable handle.
    type Var: Copy + fmt::Debug;
    /// Linear expression handle.
    type Expr;
    /// Error raised when the solver rejects a call.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Creates a decision variable with bounds `[lower, upper]`.
    fn create_variable(
        &mut self,
        name: &str,
        lower: f64,
        upper: f64,
        kind: VarKind,
    ) -> Result<Self::Var, Self::Error>;

    /// Creates an empty linear expression.
    fn linear_expression(&mut self) -> Self::Expr;

    /// Appends `coefficient * var` to `expr`.
    fn add_term(
        &mut self,
        expr: &mut Self::Expr,
        coefficient: f64,
        var: Self::Var,
    ) -> Result<(), Self::Error>;

    /// Adds a constant to `expr`.
    fn add_constant(&mut self, expr: &mut Self::Expr, constant: f64) -> Result<(), Self::Error>;

    /// `lhs + rhs`.
    fn sum(&mut self, lhs: Self::Expr, rhs: Self::Expr) -> Result<Self::Expr, Self::Error>;

    /// `lhs - rhs`.
    fn diff(&mut self, lhs: Self::Expr, rhs: Self::Expr) -> Result<Self::Expr, Self::Error>;

    /// `coefficient * var` as a fresh expression.
    fn scale(&mut self, coefficient: f64, var: Self::Var) -> Result<Self::Expr, Self::Error>;

    /// Adds `expr == rhs`.
    fn add_equality(&mut self, name: &str, expr: Self::Expr, rhs: f64)
        -> Result<(), Self::Error>;

    /// Adds `expr <= rhs`.
    fn add_less_or_equal(
        &mut self,
        name: &str,
        expr: Self::Expr,
        rhs: f64,
    ) -> Result<(), Self::Error>;

    /// Adds `expr >= rhs`.
    fn add_greater_or_equal(
        &mut self,
        name: &str,
        expr: Self::Expr,
        rhs: f64,
    ) -> Result<(), Self::Error>;

    /// Registers the objective. Called once per model.
    fn set_objective(&mut self, expr: Self::Expr, direction: Direction) -> Result<(), Self::Error>;
}
