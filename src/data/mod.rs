//! Routing problem data.
//!
//! [`ProblemData`] bundles the problem-size counts with the coefficient
//! matrices the formulation reads:
//!
//! | Matrix | Shape | Meaning |
//! |---|---|---|
//! | `cover` | F×S | string `j` covers leg `i` |
//! | `maint_strings_in` / `maint_strings_out` | M×S | string contribution to maintenance flow |
//! | `maint_ground_in` / `maint_ground_out` | M×G | ground-arc contribution to maintenance flow |
//! | `count_strings` / `count_ground` | 1×S / 1×G | aircraft count contribution |
//! | `prop_delay` | 1×S | propagation delay (nominal) |
//! | `robust_cover` | F×S | worst-case coverage coefficients (robust) |
//!
//! Parsing route files is left to the caller. [`synthetic`] generates
//! seeded instances for benchmarks and tests.

mod matrix;
mod problem;
pub mod synthetic;

pub use matrix::Matrix;
pub use problem::{Dimensions, ProblemData, ProblemSize};
