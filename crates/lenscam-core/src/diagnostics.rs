use nalgebra::{Vector2, Vector3};

use crate::{CameraEntity, CameraError};

pub fn check_finite2(v: &Vector2<f64>, what: &'static str) -> Result<Vector2<f64>, CameraError> {
    if v.iter().all(|c| c.is_finite()) {
        Ok(*v)
    } else {
        Err(CameraError::NonFinite(what))
    }
}

pub fn check_finite3(v: &Vector3<f64>, what: &'static str) -> Result<Vector3<f64>, CameraError> {
    if v.iter().all(|c| c.is_finite()) {
        Ok(*v)
    } else {
        Err(CameraError::NonFinite(what))
    }
}

/// Projection variants that report NaN/∞ results as errors.
///
/// The plain `project`/`unproject` never fail; these are opt-in.
pub trait CheckedProjection: CameraEntity {
    fn try_project(&self, x: &Vector3<f64>) -> Result<Vector2<f64>, CameraError> {
        check_finite2(&self.project(x), "projection")
    }

    fn try_unproject(&self, y: &Vector2<f64>) -> Result<Vector3<f64>, CameraError> {
        check_finite3(&self.unproject(y), "unprojection")
    }
}

impl<E: CameraEntity> CheckedProjection for E {}
