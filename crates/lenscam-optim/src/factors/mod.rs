//! Residual factors over camera parameter blocks.

pub mod reprojection;
pub mod tiny;

use serde::{Deserialize, Serialize};

/// Robust loss applied to each reprojection residual.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RobustLoss {
    #[default]
    None,
    Huber {
        scale: f64,
    },
    Cauchy {
        scale: f64,
    },
    Arctan {
        scale: f64,
    },
}
