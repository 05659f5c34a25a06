//! Objective assembly.

use super::config::{FormulationStrategy, ObjectiveRule};
use super::variables::RoutingVariables;
use crate::data::ProblemData;
use crate::error::{solver_failure, BuildStep, RoutingError};
use crate::milp::{Direction, MilpBackend};

/// Builds the objective expression and registers it with its direction.
///
/// Every string contributes a term, including zero-weighted ones, so the
/// flat robust objective still references all selection variables.
/// `data` must already be validated for `strategy.kind`.
pub(crate) fn build_objective<B: MilpBackend>(
    model: &mut B,
    data: &ProblemData,
    vars: &RoutingVariables<B::Var>,
    strategy: &FormulationStrategy,
) -> Result<(), RoutingError> {
    let fail = || solver_failure::<B::Error>(BuildStep::Objective);
    let mut expr = model.linear_expression();

    let direction = match strategy.objective {
        ObjectiveRule::MinimizeDelay => {
            let delay = data.prop_delay.as_ref().ok_or_else(|| {
                RoutingError::dimension("prop_delay", "required by the nominal formulation")
            })?;
            for (j, &x) in vars.strings.iter().enumerate() {
                model
                    .add_term(&mut expr, delay.get(0, j), x)
                    .map_err(fail())?;
            }
            Direction::Minimize
        }
        ObjectiveRule::MaximizeFeasibility => {
            for &x in &vars.strings {
                model.add_term(&mut expr, 0.0, x).map_err(fail())?;
            }
            Direction::Maximize
        }
    };

    model.set_objective(expr, direction).map_err(fail())?;

    tracing::debug!(
        component = "formulation",
        operation = "build_objective",
        direction = ?direction,
        terms = vars.strings.len(),
        "Set objective function"
    );
    Ok(())
}
