//! Decision variable families.

use super::config::FormulationStrategy;
use crate::data::Dimensions;
use crate::error::{solver_failure, BuildStep, RoutingError};
use crate::milp::{MilpBackend, VarKind};

/// Bounds of the per-leg violation variable before the budget row applies.
pub const VIOLATION_LOWER: f64 = -1.0;
pub const VIOLATION_UPPER: f64 = 0.0;

/// Handles of every variable the routing model owns.
#[derive(Debug, Clone)]
pub struct RoutingVariables<V> {
    /// `x_j`, binary, one per string.
    pub strings: Vec<V>,
    /// `y_k`, continuous `[0, +inf)`, one per ground arc.
    pub ground_arcs: Vec<V>,
    /// `z_i`, integer `[-1, 0]`, one per flight leg. Robust models only.
    pub violations: Option<Vec<V>>,
}

/// Creates the variable families for `dims` on `model`.
///
/// A zero count yields an empty family without touching the backend.
pub(crate) fn create_variables<B: MilpBackend>(
    model: &mut B,
    dims: &Dimensions,
    strategy: &FormulationStrategy,
) -> Result<RoutingVariables<B::Var>, RoutingError> {
    let strings = create_family(
        model,
        "x",
        dims.strings,
        (0.0, 1.0, VarKind::Integer),
        BuildStep::StringVariables,
    )?;
    let ground_arcs = create_family(
        model,
        "y",
        dims.ground_arcs,
        (0.0, f64::INFINITY, VarKind::Continuous),
        BuildStep::GroundArcVariables,
    )?;
    let violations = if strategy.has_violation() {
        Some(create_family(
            model,
            "z",
            dims.flight_legs,
            (VIOLATION_LOWER, VIOLATION_UPPER, VarKind::Integer),
            BuildStep::ViolationVariables,
        )?)
    } else {
        None
    };

    tracing::debug!(
        component = "formulation",
        operation = "create_variables",
        strings = strings.len(),
        ground_arcs = ground_arcs.len(),
        violations = violations.as_ref().map_or(0, Vec::len),
        "Created routing variables"
    );

    Ok(RoutingVariables {
        strings,
        ground_arcs,
        violations,
    })
}

fn create_family<B: MilpBackend>(
    model: &mut B,
    prefix: &str,
    count: usize,
    (lower, upper, kind): (f64, f64, VarKind),
    step: BuildStep,
) -> Result<Vec<B::Var>, RoutingError> {
    let mut vars = Vec::with_capacity(count);
    for i in 0..count {
        let var = model
            .create_variable(&format!("{prefix}_{i}"), lower, upper, kind)
            .map_err(solver_failure(step))?;
        vars.push(var);
    }
    Ok(vars)
}
