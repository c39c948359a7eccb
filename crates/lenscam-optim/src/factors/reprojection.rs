//! Backend-independent reprojection residuals.

use lenscam_core::{lift, CameraEntity, CameraView};
use nalgebra::{DVectorView, RealField, SVector, Vector2, Vector3};
use serde::{Deserialize, Serialize};

/// A camera-frame point and the pixel it was observed at.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointObservation {
    pub pc: [f64; 3],
    pub uv: [f64; 2],
    #[serde(default = "unit_weight")]
    pub w: f64,
}

fn unit_weight() -> f64 {
    1.0
}

impl PointObservation {
    pub fn new(pc: Vector3<f64>, uv: Vector2<f64>) -> Self {
        Self {
            pc: [pc.x, pc.y, pc.z],
            uv: [uv.x, uv.y],
            w: 1.0,
        }
    }

    pub fn with_weight(mut self, w: f64) -> Self {
        self.w = w;
        self
    }
}

/// Reprojection residual through any view.
///
/// The residual is scaled by `sqrt(w)` and ordered `[u_residual, v_residual]`.
pub fn reproj_residual_generic<T: RealField, V: CameraView<T>>(
    view: &V,
    obs: &PointObservation,
) -> SVector<T, 2> {
    let pc = Vector3::new(lift::<T>(obs.pc[0]), lift(obs.pc[1]), lift(obs.pc[2]));
    let proj = view.project(&pc);
    let sqrt_w: T = lift(obs.w.sqrt());
    let ru = (lift::<T>(obs.uv[0]) - proj.x.clone()) * sqrt_w.clone();
    let rv = (lift::<T>(obs.uv[1]) - proj.y.clone()) * sqrt_w;
    SVector::<T, 2>::new(ru, rv)
}

/// Residual for `camera` with its base parameters read from `intr`.
pub(crate) fn reproj_residual_block_generic<E: CameraEntity, T: RealField>(
    camera: &E,
    intr: DVectorView<'_, T>,
    obs: &PointObservation,
) -> SVector<T, 2> {
    debug_assert!(
        intr.len() >= camera.num_parameters(),
        "camera block must have {} params",
        camera.num_parameters()
    );
    let view = camera.view_with_block(intr);
    reproj_residual_generic(&view, obs)
}

/// `f64` residual against the camera's stored parameters.
pub fn reproj_residual<E: CameraEntity>(camera: &E, obs: &PointObservation) -> Vector2<f64> {
    reproj_residual_generic(&camera.view::<f64>(), obs)
}

/// Half the sum of squared residuals over all observations.
pub fn reproj_cost<E: CameraEntity>(camera: &E, observations: &[PointObservation]) -> f64 {
    let view = camera.view::<f64>();
    0.5 * observations
        .iter()
        .map(|obs| reproj_residual_generic(&view, obs).norm_squared())
        .sum::<f64>()
}
