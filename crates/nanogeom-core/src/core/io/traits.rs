use crate::core::models::cloud::PointCloud;
use std::error::Error;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Defines the interface for reading and writing point-cloud structure formats.
///
/// Implementors handle format-specific parsing and serialization, while the
/// provided methods take care of opening files with buffered readers and writers.
pub trait StructureFile {
    /// Format-specific data carried alongside the atoms (e.g. a comment line).
    type Metadata;

    /// The error type for I/O operations.
    type Error: Error + From<io::Error>;

    /// Reads a point cloud and its metadata from a buffered reader.
    ///
    /// # Errors
    ///
    /// Returns an error if parsing fails or the reader encounters an I/O problem.
    fn read_from(reader: &mut impl BufRead) -> Result<(PointCloud, Self::Metadata), Self::Error>;

    /// Writes a point cloud and metadata to a writer.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    fn write_to(
        cloud: &PointCloud,
        metadata: &Self::Metadata,
        writer: &mut impl Write,
    ) -> Result<(), Self::Error>;

    /// Reads a point cloud from a file path.
    fn read_from_path<P: AsRef<Path>>(path: P) -> Result<(PointCloud, Self::Metadata), Self::Error> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        Self::read_from(&mut reader)
    }

    /// Writes a point cloud and metadata to a file path, creating or truncating it.
    fn write_to_path<P: AsRef<Path>>(
        cloud: &PointCloud,
        metadata: &Self::Metadata,
        path: P,
    ) -> Result<(), Self::Error> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        Self::write_to(cloud, metadata, &mut writer)?;
        writer.flush()?;
        Ok(())
    }
}
