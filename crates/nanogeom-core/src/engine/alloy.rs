use crate::core::models::cloud::PointCloud;
use crate::engine::error::EngineError;
use rand::Rng;
use rand::seq::index;
use tracing::{debug, instrument};

/// Number of atoms relabeled when doping `total` atoms at `percent`.
pub fn dopant_count(total: usize, percent: f64) -> usize {
    (total as f64 * percent / 100.0).floor() as usize
}

/// Relabels `floor(N * percent / 100)` atoms, drawn uniformly without replacement, to `species`.
///
/// Returns the indices that were relabeled, in ascending order.
///
/// # Errors
///
/// Returns [`EngineError::InvalidAlloyRequest`] if `percent` is outside `(0, 100)` or the
/// cloud is too small for the percentage to select a single atom.
#[instrument(skip_all, name = "alloy_doping", fields(atoms = cloud.len(), species, percent))]
pub fn dope(
    cloud: &mut PointCloud,
    species: &str,
    percent: f64,
    rng: &mut impl Rng,
) -> Result<Vec<usize>, EngineError> {
    if !(percent.is_finite() && percent > 0.0 && percent < 100.0) {
        return Err(EngineError::InvalidAlloyRequest {
            reason: format!(
                "percentage must lie strictly between 0 and 100 (got {})",
                percent
            ),
        });
    }

    let count = dopant_count(cloud.len(), percent);
    if count == 0 {
        return Err(EngineError::InvalidAlloyRequest {
            reason: format!(
                "{}% of {} atoms selects no atoms to replace",
                percent,
                cloud.len()
            ),
        });
    }

    let mut chosen = index::sample(rng, cloud.len(), count).into_vec();
    chosen.sort_unstable();
    cloud.relabel(&chosen, species)?;

    debug!(replaced = count, "Relabeled atoms to alloy species.");
    Ok(chosen)
}
