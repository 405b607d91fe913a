//! Single-structure utilities: rigid transforms, measurements and merging.

use super::{file_stem, read_structure, write_structure, write_structure_to};
use crate::cli::{CentroidArgs, InputArgs, MergeArgs, MirrorArgs, PairArgs, RotateArgs, TranslateArgs};
use crate::error::{CliError, Result};
use nanogeom::core::models::cloud::PointCloud;
use nanogeom::core::species::SpeciesTable;
use nanogeom::core::utils::geometry;
use nanogeom::engine::{combine, transform};
use nanogeom::workflows::separate::placement_name;
use tracing::info;

fn load(input: &InputArgs) -> Result<(PointCloud, String)> {
    let mut cloud = read_structure(&input.input)?;
    if input.recenter {
        let shift = transform::recenter(&mut cloud);
        info!(dx = shift.x, dy = shift.y, dz = shift.z, "Moved structure to the origin.");
    }
    Ok((cloud, file_stem(&input.input)?))
}

pub fn translate(args: TranslateArgs) -> Result<()> {
    let (mut cloud, stem) = load(&args.input)?;
    transform::translate(&mut cloud, &(args.axis.direction() * args.shift));

    let name = placement_name(&stem, args.axis, args.shift);
    let path = write_structure(&args.input.output_dir, &name, &cloud)?;
    println!("✓ Translated structure written to: {}", path.display());
    Ok(())
}

pub fn rotate(args: RotateArgs) -> Result<()> {
    let (cloud, stem) = load(&args.input)?;

    for &angle in &args.angles {
        let mut rotated = cloud.clone();
        transform::rotate(&mut rotated, args.axis, angle);

        let name = format!("{}_{}_degree_{:?}", stem, args.axis, angle);
        let path = write_structure(&args.input.output_dir, &name, &rotated)?;
        println!("✓ Rotated by {}° written to: {}", angle, path.display());
    }
    Ok(())
}

pub fn center(args: InputArgs) -> Result<()> {
    let mut cloud = read_structure(&args.input)?;
    transform::recenter(&mut cloud);

    let name = format!("{}_000", file_stem(&args.input)?);
    let path = write_structure(&args.output_dir, &name, &cloud)?;
    println!("✓ Centered structure written to: {}", path.display());
    Ok(())
}

pub fn mirror(args: MirrorArgs) -> Result<()> {
    let (mut cloud, stem) = load(&args.input)?;
    transform::mirror(&mut cloud, args.axis);

    let path = write_structure(&args.input.output_dir, &format!("{}_000_mirror", stem), &cloud)?;
    println!(
        "✓ Structure mirrored across the {} = 0 plane written to: {}",
        args.axis,
        path.display()
    );
    Ok(())
}

pub fn min_dist(args: PairArgs) -> Result<()> {
    let distance = min_distance(&args)?;
    println!("Minimum distance: {:.4} Å", distance);
    Ok(())
}

fn min_distance(args: &PairArgs) -> Result<f64> {
    let first = read_structure(&args.first)?;
    let second = read_structure(&args.second)?;
    geometry::min_distance(first.positions(), second.positions())
        .ok_or_else(|| CliError::Argument("Both structures must contain atoms".to_string()))
}

pub fn centroid(args: CentroidArgs) -> Result<()> {
    let cloud = read_structure(&args.input)?;
    let c = cloud.centroid();
    println!("Geometric center: ({:.4}, {:.4}, {:.4})", c.x, c.y, c.z);
    Ok(())
}

/// Largest nearest-neighbor distance among the species present in `cloud`.
fn nearest_neighbor_cutoff(cloud: &PointCloud, table: &SpeciesTable) -> Result<f64> {
    let mut cutoff: Option<f64> = None;
    for species in cloud.species() {
        let params = table.get(species).ok_or_else(|| {
            CliError::Argument(format!(
                "No nearest-neighbor distance known for species '{}'; pass --cutoff",
                species
            ))
        })?;
        cutoff = Some(cutoff.map_or(params.nearest_neighbor, |c| c.max(params.nearest_neighbor)));
    }
    cutoff.ok_or_else(|| CliError::Argument("The first structure has no atoms".to_string()))
}

pub fn merge(args: MergeArgs) -> Result<()> {
    let first = read_structure(&args.pair.first)?;
    let second = read_structure(&args.pair.second)?;

    let cutoff = match args.cutoff {
        Some(cutoff) => cutoff,
        None => {
            let table = match &args.species_file {
                Some(path) => {
                    SpeciesTable::load_overrides(path).map_err(|e| CliError::file(path.clone(), e))?
                }
                None => SpeciesTable::builtin(),
            };
            let cutoff = nearest_neighbor_cutoff(&first, &table)?;
            info!(cutoff, "Using the nearest-neighbor distance as merge cutoff.");
            cutoff
        }
    };
    if !(cutoff.is_finite() && cutoff >= 0.0) {
        return Err(CliError::Argument(format!(
            "Merge cutoff must be a non-negative number (got {})",
            cutoff
        )));
    }

    let merged = combine::merge(&first, &second, cutoff);
    info!(
        kept = merged.len() - first.len(),
        dropped = first.len() + second.len() - merged.len(),
        "Merged structures."
    );

    let path = match args.output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            write_structure_to(&path, &merged)?;
            path
        }
        None => {
            let name = format!(
                "{}_{}_merged",
                file_stem(&args.pair.first)?,
                file_stem(&args.pair.second)?
            );
            write_structure(&args.output_dir, &name, &merged)?
        }
    };
    println!("✓ {} atoms written to: {}", merged.len(), path.display());
    Ok(())
}
