//! Projection Jacobians using `num-dual`.
//!
//! The projection code is scalar-generic, so forward-mode dual vectors flow
//! through it unchanged. Derivatives are taken either with respect to the
//! camera-frame point or with respect to the camera's base parameter block.

use lenscam_core::{CameraEntity, CameraView, PinholeMeta};
use nalgebra::{DVectorView, SMatrix, SVector, Vector2, Vector3};
use num_dual::{jacobian, DualSVec64};

const BLOCK_DIM: usize = PinholeMeta::NUM_PARAMETERS;

/// Projection of `x` and its 2×3 Jacobian `∂π/∂x`.
pub fn project_jacobian_point<E: CameraEntity>(
    camera: &E,
    x: &Vector3<f64>,
) -> (Vector2<f64>, SMatrix<f64, 2, 3>) {
    jacobian(
        |p: SVector<DualSVec64<3>, 3>| camera.view::<DualSVec64<3>>().project(&p),
        *x,
    )
}

/// Projection of `x` and its 2×4 Jacobian with respect to `[fx, fy, cx, cy]`.
pub fn project_jacobian_params<E: CameraEntity>(
    camera: &E,
    x: &Vector3<f64>,
) -> (Vector2<f64>, SMatrix<f64, 2, BLOCK_DIM>) {
    debug_assert_eq!(camera.num_parameters(), BLOCK_DIM);
    let block = SVector::<f64, BLOCK_DIM>::from_column_slice(camera.parameter_block().as_slice());
    jacobian(
        |p: SVector<DualSVec64<BLOCK_DIM>, BLOCK_DIM>| {
            let xd = x.cast::<DualSVec64<BLOCK_DIM>>();
            camera
                .view_with_block(DVectorView::from_slice(p.as_slice(), BLOCK_DIM))
                .project(&xd)
        },
        block,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use lenscam_core::{AtanCamera, PinholeCamera};

    #[test]
    fn pinhole_param_jacobian_is_analytic() {
        let cam = PinholeCamera::new(640, 480, 0.0).with_intrinsics(500.0, 510.0, 320.0, 240.0);
        let x = Vector3::new(0.4, -0.2, 2.0);
        let (px, jac) = project_jacobian_params(&cam, &x);
        assert!((px - cam.project(&x)).norm() < 1e-12);

        let expected = SMatrix::<f64, 2, 4>::new(0.2, 0.0, 1.0, 0.0, 0.0, -0.1, 0.0, 1.0);
        assert!((jac - expected).norm() < 1e-12, "jac={jac}");
    }

    #[test]
    fn atan_param_jacobian_matches_finite_differences() {
        let cam = AtanCamera::new(640, 480, 0.0, 1.1, Vector2::new(0.02, -0.01))
            .with_intrinsics(480.0, 470.0, 330.0, 250.0);
        let x = Vector3::new(-0.5, 0.3, 1.2);
        let (_, jac) = project_jacobian_params(&cam, &x);

        let h = 1e-5;
        let base = cam.parameter_block();
        for i in 0..4 {
            let mut bp = base.clone();
            let mut bm = base.clone();
            bp[i] += h;
            bm[i] -= h;
            let fp = cam.view_with_block(bp.as_view()).project(&x);
            let fm = cam.view_with_block(bm.as_view()).project(&x);
            let num = (fp - fm) / (2.0 * h);
            for r in 0..2 {
                let diff = (jac[(r, i)] - num[r]).abs();
                assert!(diff < 1e-6, "({r}, {i}): ad={} fd={}", jac[(r, i)], num[r]);
            }
        }
    }

    #[test]
    fn pinhole_point_jacobian_is_analytic() {
        let cam = PinholeCamera::new(640, 480, 0.0).with_intrinsics(500.0, 500.0, 320.0, 240.0);
        let (_, jac) = project_jacobian_point(&cam, &Vector3::new(0.0, 0.0, 2.0));
        assert!((jac[(0, 0)] - 250.0).abs() < 1e-9);
        assert!((jac[(1, 1)] - 250.0).abs() < 1e-9);
        assert!(jac[(0, 2)].abs() < 1e-9);
    }
}
