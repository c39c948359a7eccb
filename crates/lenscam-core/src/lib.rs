//! Core camera models for `lenscam`.
//!
//! This crate contains:
//! - `Vec2`/`Vec3` aliases and homogeneous-coordinate helpers,
//! - the [`Scalar`] abstraction that lets the same projection code run on
//!   `f64` and on dual numbers,
//! - the Meta / View / Entity camera model layers with a pinhole base model
//!   and the atan (equidistant/FOV) distortion model,
//! - a serde-backed model registry and optional finite-result diagnostics.
//!
//! Camera pipeline for the atan model:
//! `pixel = K ∘ atan_distortion ∘ perspective_divide(X)`

/// Finite-result checks for projections.
pub mod diagnostics;
/// Error type shared by configuration, factories and diagnostics.
pub mod error;
/// Linear algebra type aliases and helpers.
pub mod math;
/// Camera models: traits, pinhole base, atan model, registry.
pub mod models;
/// Scalar abstraction for plain and derivative-carrying evaluation.
pub mod scalar;

pub use diagnostics::*;
pub use error::*;
pub use math::*;
pub use models::*;
pub use scalar::*;
