pub mod create;
pub mod separate;
pub mod tools;

use crate::error::{CliError, Result};
use crate::utils::progress::CliProgressHandler;
use nanogeom::core::io::report::{DistanceRecord, write_distance_report_path};
use nanogeom::core::io::traits::StructureFile;
use nanogeom::core::io::xyz::{XyzFile, XyzMetadata};
use nanogeom::core::models::cloud::PointCloud;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub(crate) fn read_structure(path: &Path) -> Result<PointCloud> {
    info!("Loading structure from {:?}", path);
    let (cloud, _) = XyzFile::read_from_path(path).map_err(|e| CliError::file(path, e))?;
    debug!(atoms = cloud.len(), "Structure loaded.");
    Ok(cloud)
}

/// Writes `{dir}/{name}.xyz`, creating `dir` when needed.
pub(crate) fn write_structure(dir: &Path, name: &str, cloud: &PointCloud) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(format!("{}.xyz", name));
    write_structure_to(&path, cloud)?;
    Ok(path)
}

pub(crate) fn write_structure_to(path: &Path, cloud: &PointCloud) -> Result<()> {
    info!(atoms = cloud.len(), "Writing structure to {:?}", path);
    XyzFile::write_to_path(cloud, &XyzMetadata::default(), path)
        .map_err(|e| CliError::file(path, e))
}

pub(crate) fn write_report(dir: &Path, name: &str, records: &[DistanceRecord]) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(format!("{}_distances.csv", name));
    write_distance_report_path(&path, records).map_err(|e| CliError::file(path.clone(), e))?;
    Ok(path)
}

/// File name without directory or extension, used as the prefix of derived files.
pub(crate) fn file_stem(path: &Path) -> Result<String> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .map(str::to_string)
        .ok_or_else(|| {
            CliError::Argument(format!("Cannot derive a file name from {:?}", path))
        })
}

pub(crate) fn progress_handler(quiet: bool) -> CliProgressHandler {
    if quiet {
        CliProgressHandler::hidden()
    } else {
        CliProgressHandler::new()
    }
}
