//! Synthetic intrinsics refinement through tiny-solver.
//!
//! Observations are generated from a ground-truth camera; a perturbed copy is
//! solved for and must land back on the ground truth.

use lenscam_core::{AtanCamera, CameraEntity, PinholeCamera};
use lenscam_optim::{
    add_reprojection_residuals, reproj_cost, solve_store, ParameterStore, PointObservation,
    RobustLoss, TinySolveOptions,
};
use nalgebra::{Vector2, Vector3};
use tiny_solver::problem::Problem;

const BLOCK: &str = "cam";

fn grid_points() -> Vec<Vector3<f64>> {
    let mut pts = Vec::new();
    for i in -3..=3 {
        for j in -2..=2 {
            let z = 1.5 + 0.1 * ((i + j) as f64).abs();
            pts.push(Vector3::new(0.25 * i as f64, 0.25 * j as f64, z));
        }
    }
    pts
}

fn observations<E: CameraEntity>(camera: &E) -> Vec<PointObservation> {
    grid_points()
        .into_iter()
        .map(|pc| PointObservation::new(pc, camera.project(&pc)))
        .collect()
}

fn ground_truth() -> AtanCamera {
    AtanCamera::new(640, 480, 0.0, 0.9, Vector2::new(0.01, -0.02))
        .with_intrinsics(500.0, 505.0, 320.0, 240.0)
}

fn refine<E>(camera: &mut E, obs: &[PointObservation], loss: RobustLoss, fixed: &[usize])
where
    E: CameraEntity + Clone + Send + Sync + 'static,
{
    let mut store = ParameterStore::new();
    store.insert_camera(BLOCK, camera);

    let mut problem = Problem::new();
    for &idx in fixed {
        problem.fix_variable(BLOCK, idx);
    }
    add_reprojection_residuals(&mut problem, &store, BLOCK, camera, obs, loss)
        .expect("residuals should be accepted");

    solve_store(&problem, &mut store, &TinySolveOptions::default()).expect("solve failed");
    store.write_back(BLOCK, camera).expect("write back failed");
}

fn assert_block_close<E: CameraEntity>(got: &E, expected: &E, tol: f64) {
    let diff = got.parameter_block() - expected.parameter_block();
    assert!(
        diff.amax() < tol,
        "got {:?}, expected {:?}",
        got.parameter_block().as_slice(),
        expected.parameter_block().as_slice()
    );
}

#[test]
fn recovers_atan_intrinsics() {
    let gt = ground_truth();
    let obs = observations(&gt);

    let mut cam = gt.clone().with_intrinsics(470.0, 530.0, 335.0, 228.0);
    let initial_cost = reproj_cost(&cam, &obs);
    refine(&mut cam, &obs, RobustLoss::None, &[]);
    let final_cost = reproj_cost(&cam, &obs);

    assert!(final_cost < initial_cost);
    assert!(final_cost < 1e-8, "final cost {final_cost}");
    assert_block_close(&cam, &gt, 1e-4);
    // distortion is held fixed
    assert_eq!(cam.gamma(), gt.gamma());
    assert_eq!(cam.wc(), gt.wc());
}

#[test]
fn recovers_pinhole_intrinsics() {
    let gt = PinholeCamera::new(1280, 720, 0.0).with_intrinsics(800.0, 790.0, 640.0, 360.0);
    let obs = observations(&gt);

    let mut cam = gt.clone().with_intrinsics(760.0, 820.0, 600.0, 380.0);
    refine(&mut cam, &obs, RobustLoss::None, &[]);
    assert_block_close(&cam, &gt, 1e-4);
}

#[test]
fn fixed_indices_are_held() {
    let gt = ground_truth();
    let obs = observations(&gt);

    let mut cam = gt.clone().with_intrinsics(480.0, 520.0, 321.0, 241.0);
    refine(&mut cam, &obs, RobustLoss::None, &[2, 3]);

    assert_eq!(cam.meta().base.cx, 321.0);
    assert_eq!(cam.meta().base.cy, 241.0);
    assert!((cam.meta().base.fx - 500.0).abs() < 5.0);
    assert!((cam.meta().base.fy - 505.0).abs() < 5.0);
}

#[test]
fn huber_loss_tolerates_outliers() {
    let gt = ground_truth();
    let mut obs = observations(&gt);
    for o in obs.iter_mut().step_by(9) {
        o.uv[0] += 40.0;
        o.uv[1] -= 25.0;
    }

    let mut cam = gt.clone().with_intrinsics(480.0, 520.0, 330.0, 230.0);
    refine(&mut cam, &obs, RobustLoss::Huber { scale: 1.0 }, &[]);

    let block = cam.parameter_block();
    assert!((block[0] - 500.0).abs() < 5.0, "fx={}", block[0]);
    assert!((block[2] - 320.0).abs() < 5.0, "cx={}", block[2]);
}
