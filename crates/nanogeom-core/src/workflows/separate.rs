use crate::core::models::axis::SignedAxis;
use crate::core::models::cloud::PointCloud;
use crate::engine::config::SolverConfig;
use crate::engine::error::EngineError;
use crate::engine::progress::ProgressReporter;
use crate::engine::solver::{self, SolvedPlacement};
use crate::engine::transform;
use tracing::{info, instrument};

/// Two structures to be placed at controlled separations from each other.
#[derive(Debug, Clone)]
pub struct SeparateRequest {
    /// The structure that stays in place.
    pub fixed: PointCloud,
    /// The structure translated along `axis`.
    pub movable: PointCloud,
    pub recenter_fixed: bool,
    pub recenter_movable: bool,
    pub axis: SignedAxis,
    pub distances: Vec<f64>,
    pub solver: SolverConfig,
}

#[instrument(skip_all, name = "separate_workflow")]
pub fn run(
    request: SeparateRequest,
    reporter: &ProgressReporter,
) -> Result<Vec<SolvedPlacement>, EngineError> {
    let SeparateRequest {
        mut fixed,
        mut movable,
        recenter_fixed,
        recenter_movable,
        axis,
        distances,
        solver: config,
    } = request;

    if recenter_fixed {
        transform::recenter(&mut fixed);
    }
    if recenter_movable {
        transform::recenter(&mut movable);
    }

    info!(
        fixed_atoms = fixed.len(),
        movable_atoms = movable.len(),
        %axis,
        "Starting controlled-distance placement."
    );

    let placements = reporter.stage("Solving separations", || {
        solver::solve(&fixed, movable, axis, &distances, &config, reporter)
    })?;

    info!(count = placements.len(), "Separate workflow complete.");
    Ok(placements)
}

/// File stem for the movable structure placed at `target`.
pub fn placement_name(stem: &str, axis: SignedAxis, target: f64) -> String {
    format!("{}_{}_d_{:.2}", stem, axis, (target * 100.0).ceil() / 100.0)
}
