//! Pure geometric membership tests used to carve structures out of a bulk lattice.
//!
//! Every shape is a small `Copy` value whose [`ShapePredicate::contains`] depends only on
//! the queried point and the shape's own parameters, so a predicate can be evaluated
//! independently for every atom. Constructors validate their parameters and return a
//! [`ShapeError`] naming the offending shape instead of producing a degenerate region.

mod planar;
mod solids;

pub use planar::{Disk, EdgeType, Ribbon, Ring, Triangle};
pub use solids::{
    Bipyramid, Clipped, Cone, Cylinder, EllipticParaboloid, Rod, Sphere, SquarePyramid,
};

use crate::core::models::cloud::{Aabb, PointCloud};
use nalgebra::Point3;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Clone)]
#[error("Invalid parameters for {shape}: {reason}")]
pub struct ShapeError {
    pub shape: &'static str,
    pub reason: String,
}

impl ShapeError {
    pub(crate) fn new(shape: &'static str, reason: impl Into<String>) -> Self {
        Self {
            shape,
            reason: reason.into(),
        }
    }
}

/// A region of space defined by a pure boolean test.
pub trait ShapePredicate {
    /// Returns `true` if `p` lies inside the region (boundary inclusive).
    fn contains(&self, p: &Point3<f64>) -> bool;

    /// A box enclosing the whole region. A bulk lattice covering this box is
    /// guaranteed to contain every lattice point the predicate can accept.
    fn extent(&self) -> Aabb;
}

/// Keeps the atoms of `cloud` that lie inside `shape`, preserving their order.
pub fn carve<S: ShapePredicate + ?Sized>(cloud: &PointCloud, shape: &S) -> PointCloud {
    cloud.filter(|_, p| shape.contains(p))
}

pub(crate) fn require_positive(shape: &'static str, name: &str, value: f64) -> Result<(), ShapeError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ShapeError::new(
            shape,
            format!("{} must be a positive finite number (got {})", name, value),
        ))
    }
}
