use crate::core::models::axis::Axis;
use crate::core::utils::neighbors::NeighborIndex;
use nalgebra::{Point3, Rotation3, Unit, Vector3};

pub fn rotation_from_axis_angle(axis: &Vector3<f64>, angle_degrees: f64) -> Rotation3<f64> {
    Rotation3::from_axis_angle(&Unit::new_normalize(*axis), angle_degrees.to_radians())
}

pub fn rotation_about(axis: Axis, angle_degrees: f64) -> Rotation3<f64> {
    rotation_from_axis_angle(&axis.unit(), angle_degrees)
}

/// Smallest pairwise distance between a point of `a` and a point of `b`.
///
/// Returns `None` if either set is empty.
pub fn min_distance(a: &[Point3<f64>], b: &[Point3<f64>]) -> Option<f64> {
    NeighborIndex::new(a).min_distance_to(b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn min_distance_finds_closest_pair() {
        let a = [Point3::new(0.0, 0.0, 0.0), Point3::new(5.0, 0.0, 0.0)];
        let b = [Point3::new(8.0, 4.0, 0.0), Point3::new(5.0, 3.0, 0.0)];
        assert_eq!(min_distance(&a, &b), Some(3.0));
    }

    #[test]
    fn min_distance_matches_exhaustive_search() {
        let a: Vec<_> = (0..40)
            .map(|i| Point3::new((i as f64 * 0.7).sin() * 5.0, i as f64 * 0.3, (i % 7) as f64))
            .collect();
        let b: Vec<_> = (0..25)
            .map(|i| Point3::new(9.0 + (i % 5) as f64, (i / 5) as f64 * 1.3, 2.5))
            .collect();
        let exhaustive = a
            .iter()
            .flat_map(|p| b.iter().map(move |q| (p - q).norm()))
            .fold(f64::INFINITY, f64::min);
        let found = min_distance(&a, &b).unwrap();
        assert!((found - exhaustive).abs() < 1e-12);
    }

    #[test]
    fn min_distance_of_empty_set_is_none() {
        assert_eq!(min_distance(&[], &[Point3::origin()]), None);
        assert_eq!(min_distance(&[Point3::origin()], &[]), None);
    }

    #[test]
    fn rotation_about_z_by_ninety_degrees_maps_x_to_y() {
        let rot = rotation_about(Axis::Z, 90.0);
        let p = rot * Point3::new(1.0, 0.0, 0.0);
        assert!((p - Point3::new(0.0, 1.0, 0.0)).norm() < 1e-12);
    }
}
