//! Formulation configuration and strategy.

use crate::error::RoutingError;
use std::fmt;
use std::str::FromStr;

/// Default uncertainty budget of the robust formulation.
pub const DEFAULT_GAMMA: f64 = 3.0;

/// Which routing model to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum FormulationKind {
    /// Exact cover, minimize total propagation delay.
    #[default]
    Nominal,
    /// Budgeted cover violation, flat objective.
    Robust,
}

impl FormulationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FormulationKind::Nominal => "nominal",
            FormulationKind::Robust => "robust",
        }
    }
}

impl fmt::Display for FormulationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FormulationKind {
    type Err = RoutingError;

    /// Accepts `nominal`, `robust` and `ev` (case-insensitive).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "nominal" => Ok(FormulationKind::Nominal),
            "robust" | "ev" => Ok(FormulationKind::Robust),
            _ => Err(RoutingError::UnsupportedFormulation(s.to_string())),
        }
    }
}

/// Configuration for building a routing model.
///
/// # Examples
///
/// ```
/// use u_aircraft_routing::formulation::{FormulationConfig, FormulationKind};
///
/// let config = FormulationConfig::robust().with_gamma(2.0);
/// assert_eq!(config.kind, FormulationKind::Robust);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FormulationConfig {
    /// Model variant.
    pub kind: FormulationKind,

    /// Uncertainty budget: lower bound `-gamma` on each violation variable.
    ///
    /// Only read by the robust formulation. `0` allows no violation at all.
    pub gamma: f64,
}

impl Default for FormulationConfig {
    fn default() -> Self {
        Self {
            kind: FormulationKind::Nominal,
            gamma: DEFAULT_GAMMA,
        }
    }
}

impl FormulationConfig {
    /// Nominal configuration.
    pub fn nominal() -> Self {
        Self::default()
    }

    /// Robust configuration with the default budget.
    pub fn robust() -> Self {
        Self {
            kind: FormulationKind::Robust,
            ..Self::default()
        }
    }

    pub fn with_kind(mut self, kind: FormulationKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_gamma(mut self, gamma: f64) -> Self {
        self.gamma = gamma;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), RoutingError> {
        if !self.gamma.is_finite() {
            return Err(RoutingError::InvalidConfig(format!(
                "gamma must be finite, got {}",
                self.gamma
            )));
        }
        if self.gamma < 0.0 {
            return Err(RoutingError::InvalidConfig(format!(
                "gamma must be non-negative, got {}",
                self.gamma
            )));
        }
        Ok(())
    }

    /// The strategy value object derived from this configuration.
    pub fn strategy(&self) -> FormulationStrategy {
        FormulationStrategy::for_kind(self.kind, self.gamma)
    }
}

/// How the objective is formed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectiveRule {
    /// Minimize `Σ prop_delay[0][j] · x_j`.
    MinimizeDelay,
    /// Maximize `Σ 0 · x_j`: any solution within the budget is acceptable.
    MaximizeFeasibility,
}

/// Robust-only parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Robustness {
    pub gamma: f64,
}

/// What differs between the nominal and robust models.
///
/// The variable factory and the constraint builder are shared; they consult
/// this value to decide whether violation variables and robustness rows
/// exist and which objective to register.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FormulationStrategy {
    pub kind: FormulationKind,
    pub objective: ObjectiveRule,
    /// `Some` when the model carries violation variables `z`.
    pub robustness: Option<Robustness>,
}

impl FormulationStrategy {
    pub fn for_kind(kind: FormulationKind, gamma: f64) -> Self {
        match kind {
            FormulationKind::Nominal => Self {
                kind,
                objective: ObjectiveRule::MinimizeDelay,
                robustness: None,
            },
            FormulationKind::Robust => Self {
                kind,
                objective: ObjectiveRule::MaximizeFeasibility,
                robustness: Some(Robustness { gamma }),
            },
        }
    }

    /// Whether violation variables are part of the model.
    pub fn has_violation(&self) -> bool {
        self.robustness.is_some()
    }
}
