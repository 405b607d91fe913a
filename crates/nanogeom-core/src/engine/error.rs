use thiserror::Error;

use crate::core::lattice::LatticeError;
use crate::core::models::cloud::CloudError;
use crate::core::shapes::ShapeError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Corrupt input: {0}")]
    CorruptInput(String),

    #[error("Boundary cleanup did not converge after {passes} passes ({unresolved} dangling atoms remain)")]
    BoundaryNotConverged { passes: usize, unresolved: usize },

    #[error("Invalid alloy request: {reason}")]
    InvalidAlloyRequest { reason: String },

    #[error("Inconsistent geometry: {reason}")]
    GeometryInconsistent { reason: String },

    #[error(
        "Distance optimization diverged during {phase} phase: reached {reached:.4} Å while targeting {target:.4} Å"
    )]
    OptimizationDiverged {
        target: f64,
        reached: f64,
        phase: &'static str,
    },

    #[error("Invalid parameters for {shape}: {reason}")]
    InvalidShapeParameters { shape: &'static str, reason: String },

    #[error("Unsupported species '{species}': {reason}")]
    UnsupportedSpecies { species: String, reason: String },

    #[error("Stage '{stage}' produced an empty structure")]
    EmptyStructure { stage: &'static str },

    #[error("Invalid distance targets: {0}")]
    InvalidDistanceTargets(String),

    #[error("Lattice generation failed: {0}")]
    Lattice(#[from] LatticeError),

    #[error("Point cloud error: {0}")]
    Cloud(#[from] CloudError),
}

impl From<ShapeError> for EngineError {
    fn from(e: ShapeError) -> Self {
        EngineError::InvalidShapeParameters {
            shape: e.shape,
            reason: e.reason,
        }
    }
}
