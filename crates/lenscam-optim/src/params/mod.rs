//! Parameter blocks exchanged with the solver.
//!
//! Each camera contributes one block of [`CameraEntity::num_parameters`]
//! scalars (`[fx, fy, cx, cy]`). Blocks are keyed by name, matching the
//! `HashMap<String, DVector<f64>>` tiny-solver consumes and returns.
//!
//! [`CameraEntity::num_parameters`]: lenscam_core::CameraEntity::num_parameters

mod store;

pub use store::ParameterStore;
