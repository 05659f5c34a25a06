//! MILP solver interface.
//!
//! The routing formulation builds models through the [`MilpBackend`] trait,
//! which abstracts the handful of primitives a MILP solver API offers:
//! variable creation, linear expressions, equality/inequality constraints
//! and a single objective.
//!
//! # Key Components
//!
//! - **Backend**: [`MilpBackend`]: solver primitive interface
//! - **In-memory model**: [`LpModel`]: records variables, named constraints
//!   and the objective; supports inspection, feasibility checking
//!   ([`LpModel::check`]) and LP export ([`LpModel::write_lp`])
//!
//! # Design
//!
//! No solving happens here. Branch-and-bound belongs to whatever solver sits
//! behind the trait, or to an external program fed with the LP text.

mod backend;
mod check;
mod lp_format;
mod model;

pub use backend::{Direction, MilpBackend, Sense, VarKind};
pub use check::Violation;
pub use model::{LinearConstraint, LinearExpr, LpModel, ModelError, Objective, VarId, Variable};
