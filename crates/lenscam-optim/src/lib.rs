//! Optimizer glue for `lenscam` camera models built on tiny-solver.
//!
//! Camera entities expose their pinhole block to the solver through a
//! [`params::ParameterStore`]; residual factors evaluate block-backed views so
//! tiny-solver's dual numbers flow through the unmodified projection code.

pub mod factors;
pub mod jacobian_ad;
pub mod params;
pub mod solver;

pub use crate::factors::reprojection::{reproj_cost, reproj_residual, PointObservation};
pub use crate::factors::tiny::{add_reprojection_residuals, TinyReprojFactor};
pub use crate::factors::RobustLoss;
pub use crate::params::ParameterStore;
pub use crate::solver::tiny::{solve, solve_store, LinearSolverKind, TinySolveOptions};
