//! Constraint families of the routing model.
//!
//! One builder serves both formulations. The strategy decides whether the
//! cover rows carry the violation variable and whether the robustness rows
//! are emitted; cover, maintenance flow and fleet count rows are shared.
//!
//! Row names: `cover_{i}`, `maint_in_{m}`, `maint_out_{m}`, `fleet_count`,
//! `robust_shortfall_{i}`, `robust_budget_{i}`, `fix_string_{j}`.

use super::config::FormulationStrategy;
use super::variables::RoutingVariables;
use crate::data::{Dimensions, Matrix, ProblemData};
use crate::error::{solver_failure, BuildStep, RoutingError};
use crate::milp::MilpBackend;

/// Number of rows emitted per constraint family.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConstraintSummary {
    pub cover: usize,
    pub maint_in: usize,
    pub maint_out: usize,
    pub fleet_count: usize,
    pub robust_shortfall: usize,
    pub robust_budget: usize,
    pub fixed_strings: usize,
}

impl ConstraintSummary {
    /// Total number of rows emitted.
    pub fn total(&self) -> usize {
        self.cover
            + self.maint_in
            + self.maint_out
            + self.fleet_count
            + self.robust_shortfall
            + self.robust_budget
            + self.fixed_strings
    }
}

/// Predicate selecting strings to pin to zero.
pub type FixedStringPredicate = dyn Fn(usize) -> bool;

/// Emits every constraint family in a fixed order: cover, maintenance in,
/// maintenance out, fleet count, robustness, fixed strings.
///
/// `data` must already be validated against `dims`.
pub(crate) fn build_constraints<B: MilpBackend>(
    model: &mut B,
    data: &ProblemData,
    dims: &Dimensions,
    vars: &RoutingVariables<B::Var>,
    strategy: &FormulationStrategy,
    fixed: Option<&FixedStringPredicate>,
) -> Result<ConstraintSummary, RoutingError> {
    let mut summary = ConstraintSummary {
        cover: add_cover(model, data, dims, vars)?,
        maint_in: add_maintenance(
            model,
            "maint_in",
            &data.maint_strings_in,
            &data.maint_ground_in,
            dims,
            vars,
            BuildStep::MaintenanceIn,
        )?,
        maint_out: add_maintenance(
            model,
            "maint_out",
            &data.maint_strings_out,
            &data.maint_ground_out,
            dims,
            vars,
            BuildStep::MaintenanceOut,
        )?,
        fleet_count: add_fleet_count(model, data, dims, vars)?,
        ..ConstraintSummary::default()
    };

    if let Some(robustness) = strategy.robustness {
        let (shortfall, budget) = add_robustness(model, data, dims, vars, robustness.gamma)?;
        summary.robust_shortfall = shortfall;
        summary.robust_budget = budget;
    }

    if let Some(predicate) = fixed {
        summary.fixed_strings = add_fixed_strings(model, vars, predicate)?;
    }

    tracing::info!(
        component = "formulation",
        operation = "build_constraints",
        kind = %strategy.kind,
        cover = summary.cover,
        maint_in = summary.maint_in,
        maint_out = summary.maint_out,
        fleet_count = summary.fleet_count,
        robust_shortfall = summary.robust_shortfall,
        robust_budget = summary.robust_budget,
        fixed_strings = summary.fixed_strings,
        total = summary.total(),
        "Built routing constraints"
    );
    Ok(summary)
}

/// `Σ_j matrix[row][j] · vars[j]` over non-zero coefficients.
///
/// An element-empty matrix contributes nothing, whatever `row` is.
fn row_expr<B: MilpBackend>(
    model: &mut B,
    matrix: &Matrix,
    row: usize,
    vars: &[B::Var],
) -> Result<B::Expr, B::Error> {
    let mut expr = model.linear_expression();
    if vars.is_empty() || matrix.is_empty() {
        return Ok(expr);
    }
    for (j, coefficient) in matrix.nonzeros(row) {
        model.add_term(&mut expr, coefficient, vars[j])?;
    }
    Ok(expr)
}

/// `cover_{i}`: `Σ_j cover[i][j] · x_j (+ z_i) = 1`.
///
/// A leg no string covers still gets its row; the model is then infeasible
/// and the solver reports it.
fn add_cover<B: MilpBackend>(
    model: &mut B,
    data: &ProblemData,
    dims: &Dimensions,
    vars: &RoutingVariables<B::Var>,
) -> Result<usize, RoutingError> {
    let fail = || solver_failure::<B::Error>(BuildStep::Cover);
    let mut uncovered = 0usize;

    for i in 0..dims.flight_legs {
        if data.cover.is_empty() || data.cover.is_zero_row(i) {
            uncovered += 1;
        }
        let mut expr = row_expr(model, &data.cover, i, &vars.strings).map_err(fail())?;
        if let Some(z) = &vars.violations {
            model.add_term(&mut expr, 1.0, z[i]).map_err(fail())?;
        }
        model
            .add_equality(&format!("cover_{i}"), expr, 1.0)
            .map_err(fail())?;
    }

    if uncovered > 0 {
        tracing::warn!(
            component = "formulation",
            operation = "cover",
            uncovered_legs = uncovered,
            "Flight legs without a covering string; model will be infeasible"
        );
    }
    tracing::debug!(
        component = "formulation",
        operation = "cover",
        rows = dims.flight_legs,
        "Added cover constraints"
    );
    Ok(dims.flight_legs)
}

/// `{prefix}_{m}`: `Σ_j strings[m][j] · x_j + Σ_k ground[m][k] · y_k = 0`.
fn add_maintenance<B: MilpBackend>(
    model: &mut B,
    prefix: &str,
    strings: &Matrix,
    ground: &Matrix,
    dims: &Dimensions,
    vars: &RoutingVariables<B::Var>,
    step: BuildStep,
) -> Result<usize, RoutingError> {
    let fail = || solver_failure::<B::Error>(step);

    for m in 0..dims.maint_locations {
        let string_part = row_expr(model, strings, m, &vars.strings).map_err(fail())?;
        let ground_part = row_expr(model, ground, m, &vars.ground_arcs).map_err(fail())?;
        let expr = model.sum(string_part, ground_part).map_err(fail())?;
        model
            .add_equality(&format!("{prefix}_{m}"), expr, 0.0)
            .map_err(fail())?;
    }

    tracing::debug!(
        component = "formulation",
        operation = prefix,
        rows = dims.maint_locations,
        "Added maintenance flow constraints"
    );
    Ok(dims.maint_locations)
}

/// `fleet_count`: `Σ_j count_strings[0][j] · x_j + Σ_k count_ground[0][k] · y_k <= aircraft`.
fn add_fleet_count<B: MilpBackend>(
    model: &mut B,
    data: &ProblemData,
    dims: &Dimensions,
    vars: &RoutingVariables<B::Var>,
) -> Result<usize, RoutingError> {
    let fail = || solver_failure::<B::Error>(BuildStep::FleetCount);

    let string_part = row_expr(model, &data.count_strings, 0, &vars.strings).map_err(fail())?;
    let ground_part = row_expr(model, &data.count_ground, 0, &vars.ground_arcs).map_err(fail())?;
    let expr = model.sum(string_part, ground_part).map_err(fail())?;
    model
        .add_less_or_equal("fleet_count", expr, dims.available_aircraft as f64)
        .map_err(fail())?;

    tracing::debug!(
        component = "formulation",
        operation = "fleet_count",
        available_aircraft = dims.available_aircraft,
        "Added count constraint"
    );
    Ok(1)
}

/// Per leg: `z_i - Σ_j robust_cover[i][j] · x_j >= 0` and `z_i + gamma >= 0`.
fn add_robustness<B: MilpBackend>(
    model: &mut B,
    data: &ProblemData,
    dims: &Dimensions,
    vars: &RoutingVariables<B::Var>,
    gamma: f64,
) -> Result<(usize, usize), RoutingError> {
    let (Some(z), Some(robust_cover)) = (&vars.violations, &data.robust_cover) else {
        return Err(RoutingError::dimension(
            "robust_cover",
            "robust constraints need violation variables and a robust cover matrix",
        ));
    };
    let shortfall_fail = || solver_failure::<B::Error>(BuildStep::RobustShortfall);
    let budget_fail = || solver_failure::<B::Error>(BuildStep::RobustBudget);

    for i in 0..dims.flight_legs {
        let mut expr = model.scale(1.0, z[i]).map_err(shortfall_fail())?;
        if !robust_cover.is_empty() {
            for (j, coefficient) in robust_cover.nonzeros(i) {
                let term = model
                    .scale(coefficient, vars.strings[j])
                    .map_err(shortfall_fail())?;
                expr = model.diff(expr, term).map_err(shortfall_fail())?;
            }
        }
        model
            .add_greater_or_equal(&format!("robust_shortfall_{i}"), expr, 0.0)
            .map_err(shortfall_fail())?;

        let mut budget = model.scale(1.0, z[i]).map_err(budget_fail())?;
        model.add_constant(&mut budget, gamma).map_err(budget_fail())?;
        model
            .add_greater_or_equal(&format!("robust_budget_{i}"), budget, 0.0)
            .map_err(budget_fail())?;
    }

    tracing::debug!(
        component = "formulation",
        operation = "robustness",
        rows = 2 * dims.flight_legs,
        gamma,
        "Added robustness constraints"
    );
    Ok((dims.flight_legs, dims.flight_legs))
}

/// `fix_string_{j}`: `x_j = 0` for every string the predicate selects.
fn add_fixed_strings<B: MilpBackend>(
    model: &mut B,
    vars: &RoutingVariables<B::Var>,
    predicate: &FixedStringPredicate,
) -> Result<usize, RoutingError> {
    let fail = || solver_failure::<B::Error>(BuildStep::FixedStrings);
    let mut fixed = 0usize;

    for (j, &x) in vars.strings.iter().enumerate() {
        if !predicate(j) {
            continue;
        }
        let expr = model.scale(1.0, x).map_err(fail())?;
        model
            .add_equality(&format!("fix_string_{j}"), expr, 0.0)
            .map_err(fail())?;
        fixed += 1;
    }

    tracing::debug!(
        component = "formulation",
        operation = "fixed_strings",
        rows = fixed,
        "Fixed strings to zero"
    );
    Ok(fixed)
}
