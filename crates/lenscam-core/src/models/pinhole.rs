use std::ops::{Deref, DerefMut};

use nalgebra::{DVector, DVectorView, Matrix3, RealField, Vector2, Vector3};
use serde::{Deserialize, Serialize};

use super::{check_block_len, CameraEntity, CameraMeta, CameraView};
use crate::{dehomogenize, homogenize, lift, CameraError, Scalar};

/// Pinhole parameters shared by every model in this crate.
///
/// The optimizer block is `[fx, fy, cx, cy]`; the image size and readout
/// time are stored alongside but never exposed to the solver.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PinholeMeta {
    /// Focal length in pixels along X.
    pub fx: f64,
    /// Focal length in pixels along Y.
    pub fy: f64,
    /// Principal point X coordinate in pixels.
    pub cx: f64,
    /// Principal point Y coordinate in pixels.
    pub cy: f64,
    /// Image width in pixels.
    pub cols: usize,
    /// Image height in pixels.
    pub rows: usize,
    /// Rolling-shutter readout time for a full frame (seconds).
    pub readout: f64,
}

impl PinholeMeta {
    pub const NUM_PARAMETERS: usize = 4;

    /// Parameters with an identity camera matrix.
    pub fn new(cols: usize, rows: usize, readout: f64) -> Self {
        Self {
            fx: 1.0,
            fy: 1.0,
            cx: 0.0,
            cy: 0.0,
            cols,
            rows,
            readout,
        }
    }

    /// Dense block `[fx, fy, cx, cy]`.
    pub fn to_block(&self) -> DVector<f64> {
        nalgebra::dvector![self.fx, self.fy, self.cx, self.cy]
    }

    fn block_value(&self, idx: usize) -> f64 {
        match idx {
            0 => self.fx,
            1 => self.fy,
            2 => self.cx,
            _ => self.cy,
        }
    }
}

impl CameraMeta for PinholeMeta {
    fn pinhole(&self) -> &PinholeMeta {
        self
    }

    fn pinhole_mut(&mut self) -> &mut PinholeMeta {
        self
    }

    fn num_parameters(&self) -> usize {
        Self::NUM_PARAMETERS
    }
}

/// Scalar-generic view of the pinhole part of any [`CameraMeta`].
///
/// `R` is `&M` for read-only views and `&mut M` when setters are needed.
pub struct PinholeView<'a, T: RealField, R> {
    meta: R,
    block: Option<DVectorView<'a, T>>,
}

impl<'a, T, M, R> PinholeView<'a, T, R>
where
    T: RealField,
    M: CameraMeta,
    R: Deref<Target = M>,
{
    pub fn new(meta: R) -> Self {
        Self { meta, block: None }
    }

    /// Read `[fx, fy, cx, cy]` from `block` instead of the Meta.
    pub fn with_block(meta: R, block: DVectorView<'a, T>) -> Self {
        debug_assert!(
            block.len() >= PinholeMeta::NUM_PARAMETERS,
            "pinhole block must have 4 params"
        );
        Self {
            meta,
            block: Some(block),
        }
    }

    pub fn meta(&self) -> &M {
        &self.meta
    }

    fn param(&self, idx: usize) -> T {
        match &self.block {
            Some(block) => block[idx].clone(),
            None => lift(self.meta.pinhole().block_value(idx)),
        }
    }

    pub fn fx(&self) -> T {
        self.param(0)
    }

    pub fn fy(&self) -> T {
        self.param(1)
    }

    pub fn cx(&self) -> T {
        self.param(2)
    }

    pub fn cy(&self) -> T {
        self.param(3)
    }

    pub fn cols(&self) -> usize {
        self.meta.pinhole().cols
    }

    pub fn rows(&self) -> usize {
        self.meta.pinhole().rows
    }

    pub fn readout(&self) -> T {
        lift(self.meta.pinhole().readout)
    }

    /// Time offset of image row `v` relative to the first row.
    pub fn row_time(&self, v: T) -> T {
        let rows: T = lift(self.rows().max(1) as f64);
        v * self.readout() / rows
    }

    /// The 3×3 camera matrix `K`.
    pub fn camera_matrix(&self) -> Matrix3<T> {
        let zero = T::zero();
        Matrix3::new(
            self.fx(),
            zero.clone(),
            self.cx(),
            zero.clone(),
            self.fy(),
            self.cy(),
            zero.clone(),
            zero,
            T::one(),
        )
    }

    /// Closed-form `K⁻¹`.
    pub fn inverse_camera_matrix(&self) -> Matrix3<T> {
        let fx = self.fx();
        let fy = self.fy();
        let zero = T::zero();
        Matrix3::new(
            T::one() / fx.clone(),
            zero.clone(),
            -self.cx() / fx,
            zero.clone(),
            T::one() / fy.clone(),
            -self.cy() / fy,
            zero.clone(),
            zero,
            T::one(),
        )
    }
}

impl<'a, T, M, R> PinholeView<'a, T, R>
where
    T: Scalar,
    M: CameraMeta,
    R: DerefMut<Target = M>,
{
    pub(crate) fn meta_mut(&mut self) -> &mut M {
        &mut self.meta
    }

    /// Write `[fx, fy, cx, cy]` from a block of exactly `num_parameters` values.
    pub fn set_from_block(&mut self, block: DVectorView<'_, f64>) -> Result<(), CameraError> {
        check_block_len(self.meta.num_parameters(), block.len())?;
        self.set_fx(lift(block[0]));
        self.set_fy(lift(block[1]));
        self.set_cx(lift(block[2]));
        self.set_cy(lift(block[3]));
        Ok(())
    }

    pub fn set_fx(&mut self, fx: T) {
        self.meta.pinhole_mut().fx = fx.narrow();
    }

    pub fn set_fy(&mut self, fy: T) {
        self.meta.pinhole_mut().fy = fy.narrow();
    }

    pub fn set_cx(&mut self, cx: T) {
        self.meta.pinhole_mut().cx = cx.narrow();
    }

    pub fn set_cy(&mut self, cy: T) {
        self.meta.pinhole_mut().cy = cy.narrow();
    }

    pub fn set_readout(&mut self, readout: T) {
        self.meta.pinhole_mut().readout = readout.narrow();
    }
}

impl<'a, T, M, R> CameraView<T> for PinholeView<'a, T, R>
where
    T: RealField,
    M: CameraMeta,
    R: Deref<Target = M>,
{
    fn project(&self, x: &Vector3<T>) -> Vector2<T> {
        dehomogenize(&(self.camera_matrix() * x))
    }

    fn unproject(&self, y: &Vector2<T>) -> Vector3<T> {
        self.inverse_camera_matrix() * homogenize(y)
    }
}

/// Undistorted pinhole camera.
#[derive(Debug, Clone, PartialEq)]
pub struct PinholeCamera {
    meta: PinholeMeta,
}

impl PinholeCamera {
    pub fn new(cols: usize, rows: usize, readout: f64) -> Self {
        Self::from_meta(PinholeMeta::new(cols, rows, readout))
    }

    pub fn from_meta(meta: PinholeMeta) -> Self {
        Self { meta }
    }

    /// Replace the camera matrix entries.
    pub fn with_intrinsics(mut self, fx: f64, fy: f64, cx: f64, cy: f64) -> Self {
        {
            let mut view = self.view_mut::<f64>();
            view.set_fx(fx);
            view.set_fy(fy);
            view.set_cx(cx);
            view.set_cy(cy);
        }
        self
    }

    pub fn view_mut<T: RealField>(&mut self) -> PinholeView<'_, T, &mut PinholeMeta> {
        PinholeView::new(&mut self.meta)
    }
}

impl CameraEntity for PinholeCamera {
    const ENTITY_ID: &'static str = "Pinhole";

    type Meta = PinholeMeta;
    type View<'a, T: RealField> = PinholeView<'a, T, &'a PinholeMeta>;

    fn meta(&self) -> &PinholeMeta {
        &self.meta
    }

    fn view<T: RealField>(&self) -> Self::View<'_, T> {
        PinholeView::new(&self.meta)
    }

    fn view_with_block<'a, T: RealField>(
        &'a self,
        block: DVectorView<'a, T>,
    ) -> Self::View<'a, T> {
        PinholeView::with_block(&self.meta, block)
    }

    fn update_from_block(&mut self, block: DVectorView<'_, f64>) -> Result<(), CameraError> {
        self.view_mut::<f64>().set_from_block(block)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera() -> PinholeCamera {
        PinholeCamera::new(1280, 720, 0.03).with_intrinsics(800.0, 780.0, 640.0, 360.0)
    }

    #[test]
    fn inverse_camera_matrix_is_inverse() {
        let cam = camera();
        let view = cam.view::<f64>();
        let prod = view.camera_matrix() * view.inverse_camera_matrix();
        let err = (prod - Matrix3::identity()).norm();
        assert!(err < 1e-12, "err={err}");
    }

    #[test]
    fn project_unproject_roundtrip() {
        let cam = camera();
        let x = Vector3::new(0.2, -0.1, 2.0);
        let px = cam.project(&x);
        let ray = cam.unproject(&px);
        let back = ray * x.z;
        assert!((back - x).norm() < 1e-12, "back={back:?}");
    }

    #[test]
    fn block_overrides_meta() {
        let cam = camera();
        let block = nalgebra::dvector![400.0, 400.0, 320.0, 240.0];
        let view = cam.view_with_block(block.as_view());
        let px = view.project(&Vector3::new(0.0, 0.0, 1.0));
        assert_eq!(px, Vector2::new(320.0, 240.0));
        assert_eq!(view.cols(), 1280);
    }

    #[cfg(feature = "autodiff")]
    #[test]
    fn setter_drops_derivative() {
        use num_dual::Dual64;

        let mut cam = camera();
        cam.view_mut::<Dual64>().set_fx(Dual64::new(900.0, 1.0));
        assert_eq!(cam.meta().fx, 900.0);
    }

    #[test]
    fn row_time_scales_with_readout() {
        let cam = camera();
        let t = cam.view::<f64>().row_time(360.0);
        assert!((t - 0.015).abs() < 1e-15);
    }

    #[test]
    fn update_from_block_checks_length() {
        let mut cam = camera();
        let short = nalgebra::dvector![1.0, 2.0];
        assert!(cam.update_from_block(short.as_view()).is_err());

        let block = nalgebra::dvector![500.0, 510.0, 300.0, 200.0];
        cam.update_from_block(block.as_view()).unwrap();
        assert_eq!(cam.parameter_block(), block);
    }
}
