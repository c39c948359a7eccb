//! tiny-solver adapters for reprojection residuals.

use anyhow::{ensure, Result};
use lenscam_core::CameraEntity;
use log::debug;
use nalgebra::DVector;
use tiny_solver::factors::Factor;
use tiny_solver::loss_functions::{ArctanLoss, CauchyLoss, HuberLoss, Loss};
use tiny_solver::problem::Problem;

use super::reprojection::{reproj_residual_block_generic, PointObservation};
use super::RobustLoss;
use crate::params::ParameterStore;

fn compile_loss(loss: RobustLoss) -> Result<Option<Box<dyn Loss + Send>>> {
    match loss {
        RobustLoss::None => Ok(None),
        RobustLoss::Huber { scale } => {
            ensure!(scale > 0.0, "Huber scale must be positive");
            Ok(Some(Box::new(HuberLoss::new(scale))))
        }
        RobustLoss::Cauchy { scale } => {
            ensure!(scale > 0.0, "Cauchy scale must be positive");
            Ok(Some(Box::new(CauchyLoss::new(scale))))
        }
        RobustLoss::Arctan { scale } => {
            ensure!(scale > 0.0, "Arctan scale must be positive");
            Ok(Some(Box::new(ArctanLoss::new(scale))))
        }
    }
}

/// Reprojection factor over a single camera block.
///
/// The entity only supplies its Meta; the solver's block is read through a
/// block-backed view on every evaluation, so parameters outside the block
/// stay at their stored values.
#[derive(Debug, Clone)]
pub struct TinyReprojFactor<E> {
    pub camera: E,
    pub obs: PointObservation,
}

impl<T, E> Factor<T> for TinyReprojFactor<E>
where
    T: nalgebra::RealField,
    E: CameraEntity + Send + Sync,
{
    fn residual_func(&self, params: &[DVector<T>]) -> DVector<T> {
        debug_assert_eq!(params.len(), 1, "expected [cam] parameter block");
        let r = reproj_residual_block_generic(&self.camera, params[0].as_view(), &self.obs);
        DVector::from_row_slice(r.as_slice())
    }
}

/// Add one 2D residual per observation against the camera block `block`.
///
/// `store` must already hold `block` with `camera.num_parameters()` values.
/// Every factor holds its own copy of `camera`; only the block values are
/// owned by the solver.
pub fn add_reprojection_residuals<E>(
    problem: &mut Problem,
    store: &ParameterStore,
    block: &str,
    camera: &E,
    observations: &[PointObservation],
    loss: RobustLoss,
) -> Result<()>
where
    E: CameraEntity + Clone + Send + Sync + 'static,
{
    store.camera_block(block, camera)?;
    ensure!(!observations.is_empty(), "need at least one observation");
    for obs in observations {
        ensure!(
            obs.w.is_finite() && obs.w >= 0.0,
            "observation weight must be finite and non-negative, got {}",
            obs.w
        );
    }
    for obs in observations {
        let factor = TinyReprojFactor {
            camera: camera.clone(),
            obs: *obs,
        };
        problem.add_residual_block(2, &[block], Box::new(factor), compile_loss(loss)?);
    }
    debug!(
        "added {} {} reprojection residuals on block {block} ({loss:?})",
        observations.len(),
        E::ENTITY_ID
    );
    Ok(())
}
