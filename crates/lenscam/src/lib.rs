//! Differentiable camera projection models.
//!
//! - [`core`]: Meta/View/Entity camera layers and the atan distortion model.
//! - [`optim`]: parameter stores, reprojection factors and num-dual
//!   Jacobians for use with tiny-solver.
//!
//! ```
//! use lenscam::core::{AtanCamera, CameraEntity};
//! use nalgebra::{Vector2, Vector3};
//!
//! let cam = AtanCamera::new(640, 480, 0.0, 0.8, Vector2::zeros())
//!     .with_intrinsics(500.0, 500.0, 320.0, 240.0);
//! let px = cam.project(&Vector3::new(0.0, 0.0, 1.0));
//! assert_eq!(px, Vector2::new(320.0, 240.0));
//! ```

pub use lenscam_core as core;
pub use lenscam_optim as optim;

pub mod prelude {
    pub use lenscam_core::{
        AnyCamera, AtanCamera, CameraConfig, CameraEntity, CameraView, CheckedProjection,
        PinholeCamera,
    };
    pub use lenscam_optim::{
        add_reprojection_residuals, solve_store, ParameterStore, PointObservation, RobustLoss,
        TinySolveOptions,
    };
}
