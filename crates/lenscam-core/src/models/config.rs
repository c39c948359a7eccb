use log::debug;
use nalgebra::{Vector2, Vector3};
use serde::{Deserialize, Serialize};

use super::{AtanCamera, AtanMeta, CameraEntity, CameraMeta, PinholeCamera, PinholeMeta};
use crate::CameraError;

/// Entity ids known to [`AnyCamera::with_defaults`].
pub const ENTITY_IDS: &[&str] = &[PinholeCamera::ENTITY_ID, AtanCamera::ENTITY_ID];

/// Serializable camera description, tagged by entity id.
///
/// ```json
/// { "type": "Atan", "fx": 500.0, "fy": 500.0, "cx": 320.0, "cy": 240.0,
///   "cols": 640, "rows": 480, "readout": 0.0, "gamma": 0.8, "wc": [0.0, 0.0] }
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum CameraConfig {
    Pinhole(PinholeMeta),
    Atan(AtanMeta),
}

impl CameraConfig {
    pub fn from_json(json: &str) -> Result<Self, CameraError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, CameraError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn entity_id(&self) -> &'static str {
        match self {
            CameraConfig::Pinhole(_) => PinholeCamera::ENTITY_ID,
            CameraConfig::Atan(_) => AtanCamera::ENTITY_ID,
        }
    }

    fn validate(&self) -> Result<(), CameraError> {
        let (base, extra): (&PinholeMeta, Vec<f64>) = match self {
            CameraConfig::Pinhole(meta) => (meta, Vec::new()),
            CameraConfig::Atan(meta) => (meta.pinhole(), vec![meta.gamma, meta.wc.x, meta.wc.y]),
        };
        if base.cols == 0 || base.rows == 0 {
            return Err(CameraError::InvalidParams(format!(
                "image size must be positive, got {}x{}",
                base.cols, base.rows
            )));
        }
        if base.fx == 0.0 || base.fy == 0.0 {
            return Err(CameraError::InvalidParams(
                "focal lengths must be nonzero".to_string(),
            ));
        }
        let all_finite = [base.fx, base.fy, base.cx, base.cy, base.readout]
            .iter()
            .chain(extra.iter())
            .all(|v| v.is_finite());
        if !all_finite {
            return Err(CameraError::InvalidParams(
                "parameters must be finite".to_string(),
            ));
        }
        Ok(())
    }
}

/// A camera of any registered model.
#[derive(Clone, Debug, PartialEq)]
pub enum AnyCamera {
    Pinhole(PinholeCamera),
    Atan(AtanCamera),
}

impl AnyCamera {
    /// Build a validated camera from its description.
    pub fn from_config(config: &CameraConfig) -> Result<Self, CameraError> {
        config.validate()?;
        debug!("building {} camera", config.entity_id());
        Ok(match config {
            CameraConfig::Pinhole(meta) => AnyCamera::Pinhole(PinholeCamera::from_meta(*meta)),
            CameraConfig::Atan(meta) => AnyCamera::Atan(AtanCamera::from_meta(*meta)),
        })
    }

    /// Camera of type `entity_id` with identity intrinsics and neutral distortion.
    pub fn with_defaults(
        entity_id: &str,
        cols: usize,
        rows: usize,
        readout: f64,
    ) -> Result<Self, CameraError> {
        if entity_id == PinholeCamera::ENTITY_ID {
            Ok(AnyCamera::Pinhole(PinholeCamera::new(cols, rows, readout)))
        } else if entity_id == AtanCamera::ENTITY_ID {
            Ok(AnyCamera::Atan(AtanCamera::new(
                cols,
                rows,
                readout,
                1.0,
                Vector2::zeros(),
            )))
        } else {
            Err(CameraError::UnknownEntity(entity_id.to_string()))
        }
    }

    pub fn to_config(&self) -> CameraConfig {
        match self {
            AnyCamera::Pinhole(cam) => CameraConfig::Pinhole(*cam.meta()),
            AnyCamera::Atan(cam) => CameraConfig::Atan(*cam.meta()),
        }
    }

    pub fn entity_id(&self) -> &'static str {
        match self {
            AnyCamera::Pinhole(_) => PinholeCamera::ENTITY_ID,
            AnyCamera::Atan(_) => AtanCamera::ENTITY_ID,
        }
    }

    pub fn num_parameters(&self) -> usize {
        match self {
            AnyCamera::Pinhole(cam) => cam.num_parameters(),
            AnyCamera::Atan(cam) => cam.num_parameters(),
        }
    }

    pub fn project(&self, x: &Vector3<f64>) -> Vector2<f64> {
        match self {
            AnyCamera::Pinhole(cam) => cam.project(x),
            AnyCamera::Atan(cam) => cam.project(x),
        }
    }

    pub fn unproject(&self, y: &Vector2<f64>) -> Vector3<f64> {
        match self {
            AnyCamera::Pinhole(cam) => cam.unproject(y),
            AnyCamera::Atan(cam) => cam.unproject(y),
        }
    }
}
