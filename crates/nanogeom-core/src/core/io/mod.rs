//! Input/output for point-cloud structure files and solver reports.
//!
//! Structures are exchanged in the plain XYZ format through the [`traits::StructureFile`]
//! interface. Distance-controlled placements can additionally be summarized as a CSV
//! report of requested versus achieved separations.

pub mod report;
pub mod traits;
pub mod xyz;
