//! Levenberg-Marquardt solves through tiny-solver.

use std::collections::HashMap;

use anyhow::{anyhow, Result};
use log::debug;
use nalgebra::DVector;
use serde::{Deserialize, Serialize};
use tiny_solver::linear::sparse::LinearSolverType;
use tiny_solver::optimizer::{Optimizer, OptimizerOptions};
use tiny_solver::problem::Problem;
use tiny_solver::LevenbergMarquardtOptimizer;

use crate::params::ParameterStore;

/// Linear solver used inside each LM step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LinearSolverKind {
    SparseCholesky,
    SparseQR,
}

/// Termination and verbosity settings for a solve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TinySolveOptions {
    pub max_iters: usize,
    pub verbosity: usize,
    pub linear_solver: LinearSolverKind,
    pub min_abs_decrease: f64,
    pub min_rel_decrease: f64,
    pub min_error: f64,
}

impl Default for TinySolveOptions {
    fn default() -> Self {
        Self {
            max_iters: 100,
            verbosity: 0,
            linear_solver: LinearSolverKind::SparseCholesky,
            min_abs_decrease: 1e-10,
            min_rel_decrease: 1e-10,
            min_error: 1e-14,
        }
    }
}

impl TinySolveOptions {
    fn to_optimizer_options(&self) -> OptimizerOptions {
        OptimizerOptions {
            max_iteration: self.max_iters,
            verbosity_level: self.verbosity,
            linear_solver_type: match self.linear_solver {
                LinearSolverKind::SparseCholesky => LinearSolverType::SparseCholesky,
                LinearSolverKind::SparseQR => LinearSolverType::SparseQR,
            },
            min_abs_error_decrease_threshold: self.min_abs_decrease,
            min_rel_error_decrease_threshold: self.min_rel_decrease,
            min_error_threshold: self.min_error,
            ..OptimizerOptions::default()
        }
    }
}

/// Run LM on `problem` starting from `initial`; returns the refined blocks.
pub fn solve(
    problem: &Problem,
    initial: HashMap<String, DVector<f64>>,
    opts: &TinySolveOptions,
) -> Result<HashMap<String, DVector<f64>>> {
    debug!(
        "tiny-solver: {} blocks, max_iters={}, {:?}",
        initial.len(),
        opts.max_iters,
        opts.linear_solver
    );
    LevenbergMarquardtOptimizer::default()
        .optimize(problem, &initial, Some(opts.to_optimizer_options()))
        .ok_or_else(|| anyhow!("tiny-solver failed to converge"))
}

/// Solve in place: blocks in `store` are replaced by the refined values.
pub fn solve_store(
    problem: &Problem,
    store: &mut ParameterStore,
    opts: &TinySolveOptions,
) -> Result<()> {
    let solution = solve(problem, store.as_map().clone(), opts)?;
    *store = ParameterStore::from_map(solution);
    Ok(())
}
