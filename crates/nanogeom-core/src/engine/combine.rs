use crate::core::models::cloud::PointCloud;
use crate::core::utils::neighbors::NeighborIndex;
use nalgebra::Point3;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Marks the atoms of `candidate` that are at least `cutoff` away from every atom of `reference`.
fn clear_of(reference: &PointCloud, candidate: &PointCloud, cutoff: f64) -> Vec<bool> {
    let index = NeighborIndex::new(reference.positions());
    let is_clear = |p: &Point3<f64>| !index.any_closer_than(p, cutoff);

    #[cfg(not(feature = "parallel"))]
    let mask = candidate.positions().iter().map(is_clear).collect();

    #[cfg(feature = "parallel")]
    let mask = candidate.positions().par_iter().map(is_clear).collect();

    mask
}

fn nothing_to_filter(a: &PointCloud, b: &PointCloud, cutoff: f64) -> bool {
    a.is_empty() || b.is_empty() || !(cutoff.is_finite() && cutoff > 0.0)
}

/// Atoms of `b` that lie at least `cutoff` away from every atom of `a`.
///
/// A non-positive cutoff keeps all of `b`.
pub fn difference(a: &PointCloud, b: &PointCloud, cutoff: f64) -> PointCloud {
    if nothing_to_filter(a, b, cutoff) {
        return b.clone();
    }
    let mut mask = clear_of(a, b, cutoff).into_iter();
    b.filter(|_, _| mask.next().unwrap_or(false))
}

/// All of `a`, followed by the atoms of `b` that do not overlap `a` within `cutoff`.
pub fn union(a: &PointCloud, b: &PointCloud, cutoff: f64) -> PointCloud {
    a.concat(&difference(a, b, cutoff))
}

/// Merges two independently loaded structures, dropping atoms of `b` that collide with `a`.
pub fn merge(a: &PointCloud, b: &PointCloud, cutoff: f64) -> PointCloud {
    union(a, b, cutoff)
}

/// Appends `b` after `a` with no overlap test.
pub fn concat(a: &PointCloud, b: &PointCloud) -> PointCloud {
    a.concat(b)
}
