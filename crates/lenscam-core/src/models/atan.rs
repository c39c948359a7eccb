//! Atan (equidistant / field-of-view) lens model.
//!
//! Radial distortion is centered on `wc` in normalized coordinates:
//!
//! ```text
//! A = X.xy / (X.z + ε)
//! L = A - wc,   r = √(|L|² + ε)
//! f = atan(r·γ) / γ                (project)
//! f = tan(r·γ) / γ                 (unproject)
//! Y = (wc + f·L / r, 1)
//! ```
//!
//! `project` applies `K` to `Y`; `unproject` starts from `K⁻¹·(y, 1)` and
//! returns `Y` directly. The two radial maps are exact inverses, so
//! `unproject(project(X))` is parallel to `X` wherever `|r·γ| < π/2`.
//!
//! `γ = 0` is not special-cased: both maps evaluate `0/0`. Use
//! [`GammaGuard::Series`] to switch to a series expansion near zero.

use std::ops::{Deref, DerefMut};

use nalgebra::{DVectorView, RealField, Vector2, Vector3};
use serde::{Deserialize, Serialize};

use super::{CameraEntity, CameraMeta, CameraView, PinholeMeta, PinholeView};
use crate::{homogenize, lift, CameraError, Scalar};

/// Bias on depth and squared radius that keeps `0/0` out of the math.
pub const ATAN_EPS: f64 = 1e-32;

/// Handling of the `γ → 0` limit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GammaGuard {
    /// Evaluate `atan(r·γ)/γ` and `tan(r·γ)/γ` as written.
    #[default]
    Unguarded,
    /// Use `r ∓ γ²r³/3` while `|γ| < threshold`.
    Series { threshold: f64 },
}

/// Parameters of the atan model.
///
/// Only the pinhole block is reported by [`CameraMeta::num_parameters`];
/// `gamma` and `wc` are stored here but are not part of the optimizer block.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AtanMeta {
    #[serde(flatten)]
    pub base: PinholeMeta,
    /// Distortion strength.
    pub gamma: f64,
    /// Distortion center in normalized coordinates.
    pub wc: Vector2<f64>,
    #[serde(default)]
    pub guard: GammaGuard,
}

impl CameraMeta for AtanMeta {
    fn pinhole(&self) -> &PinholeMeta {
        &self.base
    }

    fn pinhole_mut(&mut self) -> &mut PinholeMeta {
        &mut self.base
    }

    // TODO: expose gamma and wc to the solver once the block layout carries them.
    fn num_parameters(&self) -> usize {
        self.base.num_parameters()
    }
}

#[derive(Clone, Copy)]
enum Radial {
    Forward,
    Inverse,
}

/// Scalar-generic view implementing the atan projection.
pub struct AtanView<'a, T: RealField, R> {
    base: PinholeView<'a, T, R>,
}

impl<'a, T, R> AtanView<'a, T, R>
where
    T: RealField,
    R: Deref<Target = AtanMeta>,
{
    pub fn new(meta: R) -> Self {
        Self {
            base: PinholeView::new(meta),
        }
    }

    /// Read the pinhole block from `block`; `gamma` and `wc` still come from the Meta.
    pub fn with_block(meta: R, block: DVectorView<'a, T>) -> Self {
        Self {
            base: PinholeView::with_block(meta, block),
        }
    }

    /// The underlying pinhole view (camera matrix and base accessors).
    pub fn base(&self) -> &PinholeView<'a, T, R> {
        &self.base
    }

    pub fn meta(&self) -> &AtanMeta {
        self.base.meta()
    }

    pub fn gamma(&self) -> T {
        lift(self.meta().gamma)
    }

    pub fn wc(&self) -> Vector2<T> {
        self.meta().wc.cast::<T>()
    }

    fn radial(&self, r: T, dir: Radial) -> T {
        let gamma = self.gamma();
        if let GammaGuard::Series { threshold } = self.meta().guard {
            if gamma.clone().abs() < lift(threshold) {
                let r3 = r.clone() * r.clone() * r.clone();
                let corr = gamma.clone() * gamma * r3 / lift::<T>(3.0);
                return match dir {
                    Radial::Forward => r - corr,
                    Radial::Inverse => r + corr,
                };
            }
        }
        let rg = r * gamma.clone();
        match dir {
            Radial::Forward => rg.atan() / gamma,
            Radial::Inverse => rg.tan() / gamma,
        }
    }

    /// `(wc + f·L/r, 1)` for a recentered point `L`.
    fn recompose(&self, l: Vector2<T>, dir: Radial) -> Vector3<T> {
        let eps: T = lift(ATAN_EPS);
        let wc = self.wc();
        let r = (l.norm_squared() + eps).sqrt();
        let f = self.radial(r.clone(), dir);
        homogenize(&(wc + l * f / r))
    }
}

impl<'a, T, R> AtanView<'a, T, R>
where
    T: Scalar,
    R: DerefMut<Target = AtanMeta>,
{
    /// Mutable access to the base view for the pinhole setters.
    pub fn base_mut(&mut self) -> &mut PinholeView<'a, T, R> {
        &mut self.base
    }

    /// Stores the plain value of `gamma`; derivatives are dropped.
    pub fn set_gamma(&mut self, gamma: T) {
        self.base.meta_mut().gamma = gamma.narrow();
    }

    /// Stores the plain value of `wc`; derivatives are dropped.
    pub fn set_wc(&mut self, wc: &Vector2<T>) {
        self.base.meta_mut().wc = Vector2::new(wc.x.narrow(), wc.y.narrow());
    }
}

impl<'a, T, R> CameraView<T> for AtanView<'a, T, R>
where
    T: RealField,
    R: Deref<Target = AtanMeta>,
{
    fn project(&self, x: &Vector3<T>) -> Vector2<T> {
        let eps: T = lift(ATAN_EPS);
        let a = x.xy() / (x.z.clone() + eps);
        let l = a - self.wc();
        let y = self.recompose(l, Radial::Forward);
        // y.z == 1, no normalization needed
        (self.base.camera_matrix() * y).xy()
    }

    fn unproject(&self, y: &Vector2<T>) -> Vector3<T> {
        let phn = self.base.inverse_camera_matrix() * homogenize(y);
        let l = phn.xy() - self.wc();
        self.recompose(l, Radial::Inverse)
    }
}

/// Camera with the atan lens model.
#[derive(Debug, Clone, PartialEq)]
pub struct AtanCamera {
    meta: AtanMeta,
}

impl AtanCamera {
    /// Camera with an identity camera matrix and the given distortion.
    pub fn new(cols: usize, rows: usize, readout: f64, gamma: f64, wc: Vector2<f64>) -> Self {
        let mut camera = Self::from_meta(AtanMeta {
            base: PinholeMeta::new(cols, rows, readout),
            gamma: 0.0,
            wc: Vector2::zeros(),
            guard: GammaGuard::Unguarded,
        });
        {
            let mut view = camera.view_mut::<f64>();
            view.set_gamma(gamma);
            view.set_wc(&wc);
        }
        camera
    }

    pub fn from_meta(meta: AtanMeta) -> Self {
        Self { meta }
    }

    /// Replace the camera matrix entries.
    pub fn with_intrinsics(mut self, fx: f64, fy: f64, cx: f64, cy: f64) -> Self {
        {
            let mut view = self.view_mut::<f64>();
            let base = view.base_mut();
            base.set_fx(fx);
            base.set_fy(fy);
            base.set_cx(cx);
            base.set_cy(cy);
        }
        self
    }

    pub fn with_guard(mut self, guard: GammaGuard) -> Self {
        self.meta.guard = guard;
        self
    }

    pub fn view_mut<T: RealField>(&mut self) -> AtanView<'_, T, &mut AtanMeta> {
        AtanView::new(&mut self.meta)
    }

    pub fn gamma(&self) -> f64 {
        self.meta.gamma
    }

    pub fn wc(&self) -> Vector2<f64> {
        self.meta.wc
    }

    pub fn set_gamma(&mut self, gamma: f64) {
        self.view_mut::<f64>().set_gamma(gamma);
    }

    pub fn set_wc(&mut self, wc: Vector2<f64>) {
        self.view_mut::<f64>().set_wc(&wc);
    }
}

impl CameraEntity for AtanCamera {
    const ENTITY_ID: &'static str = "Atan";

    type Meta = AtanMeta;
    type View<'a, T: RealField> = AtanView<'a, T, &'a AtanMeta>;

    fn meta(&self) -> &AtanMeta {
        &self.meta
    }

    fn view<T: RealField>(&self) -> Self::View<'_, T> {
        AtanView::new(&self.meta)
    }

    fn view_with_block<'a, T: RealField>(
        &'a self,
        block: DVectorView<'a, T>,
    ) -> Self::View<'a, T> {
        AtanView::with_block(&self.meta, block)
    }

    fn update_from_block(&mut self, block: DVectorView<'_, f64>) -> Result<(), CameraError> {
        self.view_mut::<f64>().base_mut().set_from_block(block)
    }
}
