use crate::core::models::cloud::PointCloud;
use crate::core::species::SpeciesParams;
use crate::engine::error::EngineError;
use crate::core::utils::neighbors::NeighborIndex;
use tracing::{debug, instrument};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Removal passes attempted before the cleaner gives up.
pub const MAX_PASSES: usize = 3;

/// Atoms with fewer neighbors than this are considered dangling.
const MIN_NEIGHBORS: usize = 2;

/// Scale applied to the nearest-neighbor distance to obtain the default cleanup cutoff.
const CUTOFF_SCALE: f64 = 1.05;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CleanReport {
    /// Passes that removed at least one atom.
    pub passes: usize,
    pub removed: usize,
}

pub fn default_cutoff(params: &SpeciesParams) -> f64 {
    params.nearest_neighbor * CUTOFF_SCALE
}

fn neighbor_counts(positions: &[nalgebra::Point3<f64>], cutoff: f64) -> Vec<usize> {
    let index = NeighborIndex::new(positions);

    #[cfg(not(feature = "parallel"))]
    let counts = positions.iter().map(|p| index.count_neighbors(p, cutoff)).collect();

    #[cfg(feature = "parallel")]
    let counts = positions
        .par_iter()
        .map(|p| index.count_neighbors(p, cutoff))
        .collect();

    counts
}

/// Repeatedly strips atoms with fewer than two neighbors within `cutoff`.
///
/// All dangling atoms found in a pass are removed together. Removing an atom can
/// leave a former neighbor dangling, so passes continue until none remain or
/// [`MAX_PASSES`] have run.
///
/// # Errors
///
/// Returns [`EngineError::BoundaryNotConverged`] if dangling atoms are still present
/// after the last pass, and [`EngineError::CorruptInput`] for a non-positive cutoff.
#[instrument(skip_all, name = "boundary_cleanup", fields(atoms = cloud.len(), cutoff = cutoff))]
pub fn clean(cloud: &PointCloud, cutoff: f64) -> Result<(PointCloud, CleanReport), EngineError> {
    if !(cutoff.is_finite() && cutoff > 0.0) {
        return Err(EngineError::CorruptInput(format!(
            "cleanup cutoff must be a positive finite number (got {})",
            cutoff
        )));
    }

    let mut current = cloud.clone();
    let mut report = CleanReport {
        passes: 0,
        removed: 0,
    };

    for pass in 1..=MAX_PASSES {
        let counts = neighbor_counts(current.positions(), cutoff);
        let keep: Vec<bool> = counts.iter().map(|&n| n >= MIN_NEIGHBORS).collect();
        let dangling = keep.iter().filter(|k| !**k).count();
        if dangling == 0 {
            return Ok((current, report));
        }

        debug!(pass, dangling, "Removing under-coordinated atoms.");
        current = current.retain_mask(&keep)?;
        report.passes = pass;
        report.removed += dangling;
    }

    let unresolved = neighbor_counts(current.positions(), cutoff)
        .into_iter()
        .filter(|&n| n < MIN_NEIGHBORS)
        .count();
    if unresolved > 0 {
        return Err(EngineError::BoundaryNotConverged {
            passes: MAX_PASSES,
            unresolved,
        });
    }
    Ok((current, report))
}
