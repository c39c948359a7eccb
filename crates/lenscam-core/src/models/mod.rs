//! Camera model building blocks.
//!
//! Every model is split into three layers:
//!
//! 1. **Meta**: a plain `f64` record of the model's parameters. The first
//!    [`CameraMeta::num_parameters`] values form the block an optimizer reads
//!    and writes.
//! 2. **View**: a stateless, scalar-generic borrow of a Meta that implements
//!    the projection math. One view type serves every scalar `T`, so the same
//!    code runs on `f64` and on dual numbers.
//! 3. **Entity**: owns the Meta, carries the registration id and offers `f64`
//!    convenience methods.
//!
//! Views built with `with_block` read the base parameters from an external
//! parameter block instead of the Meta. Nothing is cached, so edits made by a
//! solver to that block are visible on the next call.

mod atan;
mod config;
mod pinhole;

pub use atan::*;
pub use config::*;
pub use pinhole::*;

use nalgebra::{DVector, DVectorView, RealField, Vector2, Vector3};

use crate::CameraError;

/// Parameter record shared by all models built on the pinhole base.
pub trait CameraMeta: Clone + std::fmt::Debug + Send + Sync + 'static {
    /// Base (pinhole) parameters.
    fn pinhole(&self) -> &PinholeMeta;
    /// Mutable base (pinhole) parameters.
    fn pinhole_mut(&mut self) -> &mut PinholeMeta;
    /// Number of contiguous scalars exposed to the optimizer.
    fn num_parameters(&self) -> usize;
}

/// Projection interface implemented by every view.
pub trait CameraView<T: RealField> {
    /// Map a camera-frame point to pixel coordinates.
    fn project(&self, x: &Vector3<T>) -> Vector2<T>;
    /// Map pixel coordinates to an (unnormalized) camera-frame ray.
    fn unproject(&self, y: &Vector2<T>) -> Vector3<T>;
}

/// Owning wrapper binding a Meta to one view family.
///
/// The owned Meta is read-only from outside the crate. Parameters change only
/// through the typed setters of a mutable view or through
/// [`CameraEntity::update_from_block`]:
///
/// ```compile_fail
/// use lenscam_core::{AtanCamera, CameraEntity};
///
/// let mut cam = AtanCamera::new(640, 480, 0.0, 0.8, nalgebra::Vector2::zeros());
/// cam.meta_mut().gamma = 0.1;
/// ```
///
/// ```compile_fail
/// use lenscam_core::AtanCamera;
///
/// let mut cam = AtanCamera::new(640, 480, 0.0, 0.8, nalgebra::Vector2::zeros());
/// cam.view_mut::<f64>().base_mut().meta_mut().gamma = 0.1;
/// ```
pub trait CameraEntity {
    /// Textual id used by the registry and serialized configs.
    const ENTITY_ID: &'static str;

    type Meta: CameraMeta;
    type View<'a, T: RealField>: CameraView<T>
    where
        Self: 'a;

    fn meta(&self) -> &Self::Meta;

    /// View reading every parameter from the owned Meta.
    fn view<T: RealField>(&self) -> Self::View<'_, T>;

    /// View reading the base parameters from `block`.
    ///
    /// `block` must hold [`num_parameters`](Self::num_parameters) values;
    /// [`try_view_with_block`](Self::try_view_with_block) checks this.
    fn view_with_block<'a, T: RealField>(&'a self, block: DVectorView<'a, T>)
        -> Self::View<'a, T>;

    /// Copy solver output back into the owned Meta through the view setters.
    fn update_from_block(&mut self, block: DVectorView<'_, f64>) -> Result<(), CameraError>;

    /// Length-checked [`view_with_block`](Self::view_with_block).
    fn try_view_with_block<'a, T: RealField>(
        &'a self,
        block: DVectorView<'a, T>,
    ) -> Result<Self::View<'a, T>, CameraError> {
        check_block_len(self.num_parameters(), block.len())?;
        Ok(self.view_with_block(block))
    }

    fn num_parameters(&self) -> usize {
        self.meta().num_parameters()
    }

    /// Current base parameters as a dense block.
    fn parameter_block(&self) -> DVector<f64> {
        self.meta().pinhole().to_block()
    }

    fn project(&self, x: &Vector3<f64>) -> Vector2<f64> {
        self.view::<f64>().project(x)
    }

    fn unproject(&self, y: &Vector2<f64>) -> Vector3<f64> {
        self.view::<f64>().unproject(y)
    }
}

pub(crate) fn check_block_len(expected: usize, actual: usize) -> Result<(), CameraError> {
    if actual == expected {
        Ok(())
    } else {
        Err(CameraError::BlockLength { expected, actual })
    }
}
