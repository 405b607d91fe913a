//! Bulk lattice generation.
//!
//! Produces a dense point cloud of a single species that covers a requested
//! region. Shape predicates then carve the target structure out of it.

use crate::core::models::cloud::{Aabb, PointCloud};
use crate::core::species::{Packing, SpeciesParams};
use itertools::iproduct;
use nalgebra::{Point3, Vector3};
use thiserror::Error;

/// Spare cells added on every side of the requested region.
const CELL_MARGIN: i64 = 1;

#[derive(Debug, Error, PartialEq, Clone)]
pub enum LatticeError {
    #[error("Lattice generation is not supported for {packing} packing (species '{species}')")]
    UnsupportedPacking { species: String, packing: Packing },
    #[error("Invalid lattice constant {value} for species '{species}'")]
    InvalidConstant { species: String, value: f64 },
    #[error("Lattice region is not finite")]
    InvalidRegion,
}

const FCC_BASIS: [[f64; 3]; 4] = [
    [0.0, 0.0, 0.0],
    [0.0, 0.5, 0.5],
    [0.5, 0.0, 0.5],
    [0.5, 0.5, 0.0],
];

const BCC_BASIS: [[f64; 3]; 2] = [[0.0, 0.0, 0.0], [0.5, 0.5, 0.5]];

/// Generates a bulk lattice of `species` covering `region`.
///
/// Cubic lattices put a lattice point on the origin and use cell index ranges that
/// are symmetric about it, so any region symmetric about the origin is covered by
/// an inversion-symmetric set of points. Honeycomb lattices lie in the `z = 0`
/// plane with zigzag rows along `x` and armchair rows along `y`.
///
/// # Errors
///
/// Returns [`LatticeError::UnsupportedPacking`] for hexagonal close-packed species.
pub fn bulk(species: &str, params: &SpeciesParams, region: &Aabb) -> Result<PointCloud, LatticeError> {
    let a = params.lattice_constant;
    if !a.is_finite() || a <= 0.0 {
        return Err(LatticeError::InvalidConstant {
            species: species.to_string(),
            value: a,
        });
    }
    if !(0..3).all(|i| region.min[i].is_finite() && region.max[i].is_finite()) {
        return Err(LatticeError::InvalidRegion);
    }

    let positions = match params.packing {
        Packing::Fcc => cubic(a, &FCC_BASIS, region),
        Packing::Bcc => cubic(a, &BCC_BASIS, region),
        Packing::Honeycomb => honeycomb(a, region),
        Packing::Hcp => {
            return Err(LatticeError::UnsupportedPacking {
                species: species.to_string(),
                packing: Packing::Hcp,
            });
        }
    };

    Ok(PointCloud::uniform(species, positions))
}

fn symmetric_cell_range(region: &Aabb, axis: usize, cell: f64) -> i64 {
    let reach = region.min[axis].abs().max(region.max[axis].abs());
    (reach / cell).ceil() as i64 + CELL_MARGIN
}

fn cubic(a: f64, basis: &[[f64; 3]], region: &Aabb) -> Vec<Point3<f64>> {
    let nx = symmetric_cell_range(region, 0, a);
    let ny = symmetric_cell_range(region, 1, a);
    let nz = symmetric_cell_range(region, 2, a);

    iproduct!(-nx..=nx, -ny..=ny, -nz..=nz, basis.iter())
        .map(|(i, j, k, b)| {
            Point3::new(
                (i as f64 + b[0]) * a,
                (j as f64 + b[1]) * a,
                (k as f64 + b[2]) * a,
            )
        })
        .filter(|p| region.contains(p))
        .collect()
}

fn honeycomb(a: f64, region: &Aabb) -> Vec<Point3<f64>> {
    if region.min.z > 0.0 || region.max.z < 0.0 {
        return Vec::new();
    }

    let a1 = Vector3::new(a, 0.0, 0.0);
    let a2 = Vector3::new(0.5 * a, 0.5 * 3f64.sqrt() * a, 0.0);
    let second_site = Vector3::new(0.5 * a, 0.5 * a / 3f64.sqrt(), 0.0);

    // Rows are sheared by a/2 per step in j, so the i range has to absorb the shear.
    let nj = (region.min.y.abs().max(region.max.y.abs()) / a2.y).ceil() as i64 + CELL_MARGIN;
    let ni = (region.min.x.abs().max(region.max.x.abs()) / a).ceil() as i64 + nj + CELL_MARGIN;

    iproduct!(-ni..=ni, -nj..=nj)
        .flat_map(|(i, j)| {
            let origin = Point3::origin() + a1 * i as f64 + a2 * j as f64;
            [origin, origin + second_site]
        })
        .filter(|p| region.contains(p))
        .collect()
}
