//! Error types for model construction.

use std::fmt;
use thiserror::Error;

/// The part of the model being built when a backend call failed.
///
/// Carried by [`RoutingError::SolverPrimitiveFailure`] so the caller can tell
/// which variable family, objective or constraint family was abandoned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuildStep {
    /// Binary string-selection variables `x`.
    StringVariables,
    /// Continuous ground-arc flow variables `y`.
    GroundArcVariables,
    /// Integer violation variables `z` (robust formulation only).
    ViolationVariables,
    /// Objective expression and direction.
    Objective,
    /// Flight-leg cover constraints.
    Cover,
    /// Inbound maintenance flow balance.
    MaintenanceIn,
    /// Outbound maintenance flow balance.
    MaintenanceOut,
    /// Global fleet-size cap.
    FleetCount,
    /// `z_i - robust_cover_i · x >= 0`.
    RobustShortfall,
    /// `z_i + gamma >= 0`.
    RobustBudget,
    /// Strings pinned to zero by an injected predicate.
    FixedStrings,
}

impl BuildStep {
    /// Human-readable name used in error messages and log fields.
    pub fn as_str(self) -> &'static str {
        match self {
            BuildStep::StringVariables => "string selection variables",
            BuildStep::GroundArcVariables => "ground arc variables",
            BuildStep::ViolationVariables => "violation variables",
            BuildStep::Objective => "objective function",
            BuildStep::Cover => "cover constraint",
            BuildStep::MaintenanceIn => "flights in maintenance constraint",
            BuildStep::MaintenanceOut => "flights out maintenance constraint",
            BuildStep::FleetCount => "count constraint",
            BuildStep::RobustShortfall => "robust shortfall constraint",
            BuildStep::RobustBudget => "robust budget constraint",
            BuildStep::FixedStrings => "fixed strings constraint",
        }
    }
}

impl fmt::Display for BuildStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised while validating data or building a routing model.
///
/// None of these are recoverable at the builder level: once one is returned
/// the model under construction must be discarded.
#[derive(Debug, Error)]
pub enum RoutingError {
    /// A count is negative, a matrix disagrees with the declared counts, or
    /// a matrix required by the formulation is missing.
    #[error("invalid dimension for {name}: {detail}")]
    InvalidDimension { name: &'static str, detail: String },

    /// The solver backend rejected a variable, expression or constraint call.
    #[error("error in adding {step}")]
    SolverPrimitiveFailure {
        step: BuildStep,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },

    /// The requested formulation kind is not known.
    #[error("unsupported formulation `{0}`")]
    UnsupportedFormulation(String),

    /// The formulation configuration is not usable.
    #[error("invalid formulation config: {0}")]
    InvalidConfig(String),

    /// A build entry point was called out of order, twice, or after a failure.
    #[error("cannot {operation} while formulation is {stage}")]
    BuildOrder {
        operation: &'static str,
        stage: &'static str,
    },
}

impl RoutingError {
    pub(crate) fn dimension(name: &'static str, detail: impl Into<String>) -> Self {
        RoutingError::InvalidDimension {
            name,
            detail: detail.into(),
        }
    }
}

/// Returns a closure wrapping a backend error with the step being built.
///
/// Meant for `map_err`: `model.add_equality(..).map_err(solver_failure(BuildStep::Cover))?`.
pub(crate) fn solver_failure<E>(step: BuildStep) -> impl FnOnce(E) -> RoutingError
where
    E: std::error::Error + Send + Sync + 'static,
{
    move |source| RoutingError::SolverPrimitiveFailure {
        step,
        source: Box::new(source),
    }
}
