//! String-based aircraft routing formulation.
//!
//! Selects candidate strings (multi-day aircraft routings) so that every
//! flight leg is covered, maintenance flow balances at every maintenance
//! location and the fleet-size cap holds.
//!
//! # Variants
//!
//! - **Nominal**: exact cover, minimize total propagation delay.
//! - **Robust**: cover relaxed by a per-leg integer violation variable
//!   `z_i ∈ [-1, 0]`, with `z_i - Σ_j robust_cover[i][j]·x_j >= 0` and
//!   `z_i + γ >= 0`. The objective is flat: any solution inside the
//!   uncertainty budget is acceptable.
//!
//! Both variants share one variable factory and one constraint builder,
//! parameterized by a [`FormulationStrategy`].
//!
//! # Key Components
//!
//! - **Config**: [`FormulationConfig`], [`FormulationKind`]
//! - **Façade**: [`RoutingFormulation`]: `build_variables` →
//!   `build_objective` → `build_constraints`, plus selection readback
//! - **Report**: [`ConstraintSummary`]: rows emitted per family

mod builder;
mod config;
mod constraints;
mod objective;
mod variables;

pub use builder::{BuildStage, RoutingFormulation};
pub use config::{
    FormulationConfig, FormulationKind, FormulationStrategy, ObjectiveRule, Robustness,
    DEFAULT_GAMMA,
};
pub use constraints::{ConstraintSummary, FixedStringPredicate};
pub use variables::{RoutingVariables, VIOLATION_LOWER, VIOLATION_UPPER};
