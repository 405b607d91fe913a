//! Two-dimensional masks for graphene fragments. Only `x` and `y` are tested.

use super::{ShapeError, ShapePredicate, require_positive};
use crate::core::models::cloud::Aabb;
use nalgebra::Point3;
use std::fmt;
use std::str::FromStr;

fn planar_box(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Aabb {
    Aabb::new(Point3::new(min_x, min_y, 0.0), Point3::new(max_x, max_y, 0.0))
}

/// Rectangle of `x_length` by `y_length` centered on the origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ribbon {
    pub x_length: f64,
    pub y_length: f64,
}

impl Ribbon {
    pub fn new(x_length: f64, y_length: f64) -> Result<Self, ShapeError> {
        require_positive("graphene ribbon", "x length", x_length)?;
        require_positive("graphene ribbon", "y length", y_length)?;
        Ok(Self { x_length, y_length })
    }
}

impl ShapePredicate for Ribbon {
    fn contains(&self, p: &Point3<f64>) -> bool {
        p.x.abs() <= self.x_length / 2.0 && p.y.abs() <= self.y_length / 2.0
    }

    fn extent(&self) -> Aabb {
        let (hx, hy) = (self.x_length / 2.0, self.y_length / 2.0);
        planar_box(-hx, -hy, hx, hy)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Disk {
    pub radius: f64,
}

impl Disk {
    pub fn new(radius: f64) -> Result<Self, ShapeError> {
        require_positive("graphene disk", "radius", radius)?;
        Ok(Self { radius })
    }
}

impl ShapePredicate for Disk {
    fn contains(&self, p: &Point3<f64>) -> bool {
        p.x * p.x + p.y * p.y <= self.radius * self.radius
    }

    fn extent(&self) -> Aabb {
        planar_box(-self.radius, -self.radius, self.radius, self.radius)
    }
}

/// Annulus between `inner` and `outer` radii, both boundaries inclusive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ring {
    pub outer: f64,
    pub inner: f64,
}

impl Ring {
    pub fn new(outer: f64, inner: f64) -> Result<Self, ShapeError> {
        require_positive("graphene ring", "outer radius", outer)?;
        require_positive("graphene ring", "inner radius", inner)?;
        if inner >= outer {
            return Err(ShapeError::new(
                "graphene ring",
                format!(
                    "inner radius ({}) must be smaller than outer radius ({})",
                    inner, outer
                ),
            ));
        }
        Ok(Self { outer, inner })
    }
}

impl ShapePredicate for Ring {
    fn contains(&self, p: &Point3<f64>) -> bool {
        let rho_sq = p.x * p.x + p.y * p.y;
        rho_sq >= self.inner * self.inner && rho_sq <= self.outer * self.outer
    }

    fn extent(&self) -> Aabb {
        planar_box(-self.outer, -self.outer, self.outer, self.outer)
    }
}

/// Edge termination of a graphene triangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeType {
    Armchair,
    Zigzag,
}

impl fmt::Display for EdgeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EdgeType::Armchair => "armchair",
            EdgeType::Zigzag => "zigzag",
        })
    }
}

impl FromStr for EdgeType {
    type Err = ShapeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "armchair" => Ok(EdgeType::Armchair),
            "zigzag" => Ok(EdgeType::Zigzag),
            other => Err(ShapeError::new(
                "graphene triangle",
                format!("unknown edge type '{}' (expected armchair or zigzag)", other),
            )),
        }
    }
}

/// Equilateral triangle with one vertex on the origin, bounded by two lines of
/// slope ±1/√3 and closed at height `side·√3/2`.
///
/// On a honeycomb lattice with zigzag rows along `x`, the armchair orientation opens
/// towards `+x` so all three sides run along armchair directions. The zigzag
/// orientation is the same wedge opened towards `+y`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    pub edge: EdgeType,
    pub side: f64,
}

impl Triangle {
    pub fn new(edge: EdgeType, side: f64) -> Result<Self, ShapeError> {
        require_positive("graphene triangle", "side length", side)?;
        Ok(Self { edge, side })
    }

    fn height(&self) -> f64 {
        self.side * 3f64.sqrt() / 2.0
    }

    fn wedge_contains(&self, along: f64, across: f64) -> bool {
        along >= 0.0 && along <= self.height() && across.abs() <= along / 3f64.sqrt()
    }
}

impl ShapePredicate for Triangle {
    fn contains(&self, p: &Point3<f64>) -> bool {
        match self.edge {
            EdgeType::Armchair => self.wedge_contains(p.x, p.y),
            EdgeType::Zigzag => self.wedge_contains(p.y, p.x),
        }
    }

    fn extent(&self) -> Aabb {
        let h = self.height();
        let half = self.side / 2.0;
        match self.edge {
            EdgeType::Armchair => planar_box(0.0, -half, h, half),
            EdgeType::Zigzag => planar_box(-half, 0.0, half, h),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ribbon_ignores_z_and_tests_half_lengths() {
        let ribbon = Ribbon::new(10.0, 4.0).unwrap();
        assert!(ribbon.contains(&Point3::new(5.0, -2.0, 3.0)));
        assert!(!ribbon.contains(&Point3::new(5.1, 0.0, 0.0)));
        assert!(!ribbon.contains(&Point3::new(0.0, 2.1, 0.0)));
    }

    #[test]
    fn ring_excludes_the_hole() {
        let ring = Ring::new(10.0, 5.0).unwrap();
        assert!(!ring.contains(&Point3::new(4.9, 0.0, 0.0)));
        assert!(ring.contains(&Point3::new(5.0, 0.0, 0.0)));
        assert!(ring.contains(&Point3::new(0.0, -10.0, 0.0)));
        assert!(!ring.contains(&Point3::new(8.0, 8.0, 0.0)));
    }

    #[test]
    fn ring_requires_inner_smaller_than_outer() {
        assert!(Ring::new(5.0, 5.0).is_err());
        assert!(Ring::new(5.0, 6.0).is_err());
    }

    #[test]
    fn armchair_triangle_opens_along_x() {
        let tri = Triangle::new(EdgeType::Armchair, 10.0).unwrap();
        let h = 10.0 * 3f64.sqrt() / 2.0;
        assert!(tri.contains(&Point3::origin()));
        assert!(tri.contains(&Point3::new(h, 4.99, 0.0)));
        assert!(!tri.contains(&Point3::new(h, 5.01, 0.0)));
        assert!(!tri.contains(&Point3::new(-0.1, 0.0, 0.0)));
        assert!(!tri.contains(&Point3::new(h + 0.1, 0.0, 0.0)));
    }

    #[test]
    fn zigzag_triangle_opens_along_y() {
        let tri = Triangle::new(EdgeType::Zigzag, 10.0).unwrap();
        let h = 10.0 * 3f64.sqrt() / 2.0;
        assert!(tri.contains(&Point3::new(4.99, h, 0.0)));
        assert!(!tri.contains(&Point3::new(h, 4.99, 0.0)));
        let extent = tri.extent();
        assert_eq!(extent.max.y, h);
        assert_eq!(extent.min.x, -5.0);
    }

    #[test]
    fn edge_type_parses_case_insensitively() {
        assert_eq!("ArmChair".parse::<EdgeType>(), Ok(EdgeType::Armchair));
        assert_eq!("zigzag".parse::<EdgeType>(), Ok(EdgeType::Zigzag));
        assert!("chiral".parse::<EdgeType>().is_err());
    }
}
