use crate::core::models::axis::{Axis, SignedAxis};
use crate::core::models::cloud::PointCloud;
use crate::core::utils::geometry::rotation_about;
use nalgebra::Vector3;

pub fn translate(cloud: &mut PointCloud, shift: &Vector3<f64>) {
    cloud.translate(shift);
}

/// Rotates the cloud about the origin.
///
/// A negative axis rotates by `360 - degrees` about the positive axis, which is the
/// same rotation as `degrees` about the reversed axis.
pub fn rotate(cloud: &mut PointCloud, axis: SignedAxis, degrees: f64) {
    let angle = if axis.negative { 360.0 - degrees } else { degrees };
    let rotation = rotation_about(axis.axis, angle);
    cloud.map_positions(|p| rotation * p);
}

/// Moves the centroid onto the origin and returns the applied shift.
pub fn recenter(cloud: &mut PointCloud) -> Vector3<f64> {
    let shift = -cloud.centroid().coords;
    cloud.translate(&shift);
    shift
}

/// Reflects the cloud through the plane perpendicular to `axis` that contains the origin.
pub fn mirror(cloud: &mut PointCloud, axis: Axis) {
    let i = axis.index();
    cloud.map_positions(|p| {
        let mut q = *p;
        q[i] = -q[i];
        q
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    fn approx(a: &Point3<f64>, b: &Point3<f64>) -> bool {
        (a - b).norm() < 1e-9
    }

    fn sample() -> PointCloud {
        PointCloud::uniform(
            "au",
            vec![
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(3.0, 2.0, 0.0),
                Point3::new(2.0, 1.0, 3.0),
            ],
        )
    }

    #[test]
    fn translate_moves_centroid_by_shift() {
        let mut cloud = sample();
        let before = cloud.centroid();
        translate(&mut cloud, &Vector3::new(1.0, -2.0, 0.5));
        assert!(approx(&cloud.centroid(), &(before + Vector3::new(1.0, -2.0, 0.5))));
    }

    #[test]
    fn negative_axis_rotates_the_other_way() {
        let mut positive = PointCloud::uniform("au", vec![Point3::new(1.0, 0.0, 0.0)]);
        let mut negative = positive.clone();
        rotate(&mut positive, SignedAxis::positive(Axis::Z), 90.0);
        rotate(&mut negative, SignedAxis::negative(Axis::Z), 90.0);
        assert!(approx(&positive.positions()[0], &Point3::new(0.0, 1.0, 0.0)));
        assert!(approx(&negative.positions()[0], &Point3::new(0.0, -1.0, 0.0)));
    }

    #[test]
    fn half_turn_about_x_inverts_y_and_z() {
        let mut cloud = PointCloud::uniform("au", vec![Point3::new(1.0, 2.0, 3.0)]);
        rotate(&mut cloud, SignedAxis::positive(Axis::X), 180.0);
        assert!(approx(&cloud.positions()[0], &Point3::new(1.0, -2.0, -3.0)));
    }

    #[test]
    fn recenter_moves_centroid_to_origin() {
        let mut cloud = sample();
        let shift = recenter(&mut cloud);
        assert!(approx(&cloud.centroid(), &Point3::origin()));
        assert!((shift - Vector3::new(-2.0, -1.0, -1.0)).norm() < 1e-12);
    }

    #[test]
    fn mirror_flips_one_coordinate() {
        let mut cloud = sample();
        mirror(&mut cloud, Axis::X);
        assert!(approx(&cloud.positions()[1], &Point3::new(-3.0, 2.0, 0.0)));
        mirror(&mut cloud, Axis::X);
        assert_eq!(cloud, sample());
    }
}
