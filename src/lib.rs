//! String-based aircraft routing as a mixed-integer linear program.
//!
//! Builds the model that picks candidate strings (multi-day aircraft
//! routings) so that every scheduled flight leg is covered, maintenance
//! flow balances and the fleet-size cap holds:
//!
//! - **Nominal**: exact cover, minimizing total propagation delay.
//! - **Robust**: cover relaxed by per-leg violation variables bounded by an
//!   uncertainty budget `γ`, with a flat objective.
//!
//! # Architecture
//!
//! - [`data`]: problem-size counts and coefficient matrices
//! - [`milp`]: the [`MilpBackend`](milp::MilpBackend) solver interface and
//!   the in-memory [`LpModel`](milp::LpModel)
//! - [`formulation`]: variable factory, objective and constraint builders
//!   behind the [`RoutingFormulation`](formulation::RoutingFormulation) façade
//! - [`error`]: [`RoutingError`]
//!
//! The crate does not solve models and does not parse route files. A solver
//! is plugged in by implementing `MilpBackend`, or by exporting an `LpModel`
//! in LP format.

pub mod data;
pub mod error;
pub mod formulation;
pub mod milp;

pub use error::{BuildStep, RoutingError};
