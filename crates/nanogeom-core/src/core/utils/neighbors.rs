use kiddo::{ImmutableKdTree, SquaredEuclidean};
use nalgebra::Point3;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Relative slack added to range queries; hits are re-checked against the exact radius.
const RANGE_SLACK: f64 = 1e-9;

fn as_array(p: &Point3<f64>) -> [f64; 3] {
    [p.x, p.y, p.z]
}

/// A k-d tree over a fixed set of points for nearest-neighbor and fixed-radius queries.
///
/// Clouds never change once indexed, so the tree is built once in balanced form.
/// An empty point set yields an index that answers every query as "nothing nearby".
pub(crate) struct NeighborIndex {
    tree: Option<ImmutableKdTree<f64, 3>>,
}

impl NeighborIndex {
    pub fn new(points: &[Point3<f64>]) -> Self {
        if points.is_empty() {
            return Self { tree: None };
        }
        let entries: Vec<[f64; 3]> = points.iter().map(as_array).collect();
        Self {
            tree: Some(ImmutableKdTree::new_from_slice(&entries)),
        }
    }

    /// Squared distance from `p` to the closest indexed point.
    pub fn nearest_squared(&self, p: &Point3<f64>) -> Option<f64> {
        self.tree
            .as_ref()
            .map(|tree| tree.nearest_one::<SquaredEuclidean>(&as_array(p)).distance)
    }

    /// Smallest distance between any of `points` and the indexed set.
    ///
    /// Returns `None` if either side is empty.
    pub fn min_distance_to(&self, points: &[Point3<f64>]) -> Option<f64> {
        if self.tree.is_none() || points.is_empty() {
            return None;
        }
        let nearest = |p: &Point3<f64>| self.nearest_squared(p).unwrap_or(f64::INFINITY);

        #[cfg(not(feature = "parallel"))]
        let best = points.iter().map(nearest).fold(f64::INFINITY, f64::min);

        #[cfg(feature = "parallel")]
        let best = points
            .par_iter()
            .map(nearest)
            .reduce(|| f64::INFINITY, f64::min);

        Some(best.sqrt())
    }

    /// Returns `true` if any indexed point lies strictly closer than `radius` to `p`.
    pub fn any_closer_than(&self, p: &Point3<f64>, radius: f64) -> bool {
        self.nearest_squared(p)
            .is_some_and(|d_sq| d_sq < radius * radius)
    }

    /// Counts indexed points at a distance `d` from `p` with `0 < d ≤ radius`.
    pub fn count_neighbors(&self, p: &Point3<f64>, radius: f64) -> usize {
        let Some(tree) = &self.tree else {
            return 0;
        };
        let r_sq = radius * radius;
        tree.within_unsorted::<SquaredEuclidean>(&as_array(p), r_sq * (1.0 + RANGE_SLACK))
            .into_iter()
            .filter(|hit| hit.distance > 0.0 && hit.distance <= r_sq)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn brute_count(points: &[Point3<f64>], p: &Point3<f64>, r: f64) -> usize {
        points
            .iter()
            .filter(|q| {
                let d = (*q - p).norm();
                d > 0.0 && d <= r
            })
            .count()
    }

    #[test]
    fn neighbor_counts_match_brute_force() {
        let points: Vec<_> = (0..6)
            .flat_map(|i| (0..6).map(move |j| Point3::new(i as f64 * 1.1, j as f64 * 0.9, 0.3 * i as f64)))
            .collect();
        let index = NeighborIndex::new(&points);
        for p in &points {
            assert_eq!(index.count_neighbors(p, 1.5), brute_count(&points, p, 1.5));
        }
    }

    #[test]
    fn planar_point_sets_are_indexed() {
        let points: Vec<_> = (0..20)
            .flat_map(|i| (0..20).map(move |j| Point3::new(i as f64, j as f64, 0.0)))
            .collect();
        let index = NeighborIndex::new(&points);
        assert_eq!(index.count_neighbors(&Point3::new(5.0, 5.0, 0.0), 1.0), 4);
        assert_eq!(index.count_neighbors(&Point3::new(0.0, 0.0, 0.0), 1.0), 2);
    }

    #[test]
    fn radius_boundary_is_inclusive_for_counts_and_exclusive_for_overlap() {
        let points = [Point3::origin(), Point3::new(2.0, 0.0, 0.0)];
        let index = NeighborIndex::new(&points);
        assert_eq!(index.count_neighbors(&points[0], 2.0), 1);
        assert!(!index.any_closer_than(&Point3::new(4.0, 0.0, 0.0), 2.0));
        assert!(index.any_closer_than(&Point3::new(3.99, 0.0, 0.0), 2.0));
    }

    #[test]
    fn coincident_points_are_not_neighbors() {
        let points = [Point3::origin(), Point3::origin()];
        let index = NeighborIndex::new(&points);
        assert_eq!(index.count_neighbors(&points[0], 1.0), 0);
        assert!(index.any_closer_than(&points[0], 1.0));
    }

    #[test]
    fn tiny_radius_far_from_origin_is_handled() {
        let index = NeighborIndex::new(&[Point3::new(100.0, 0.0, 0.0)]);
        assert!(!index.any_closer_than(&Point3::new(200.0, 0.0, 0.0), 1e-17));
        assert_eq!(index.count_neighbors(&Point3::new(200.0, 0.0, 0.0), 1e-17), 0);
    }

    #[test]
    fn empty_index_finds_nothing() {
        let index = NeighborIndex::new(&[]);
        assert_eq!(index.nearest_squared(&Point3::origin()), None);
        assert!(!index.any_closer_than(&Point3::origin(), 10.0));
        assert_eq!(index.count_neighbors(&Point3::origin(), 10.0), 0);
    }
}
