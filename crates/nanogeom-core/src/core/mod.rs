//! # Core Module
//!
//! Fundamental building blocks for nanostructure synthesis.
//!
//! ## Architecture
//!
//! - **Data Models** ([`models`]) - Point clouds, bounding boxes and axes
//! - **Species Data** ([`species`]) - Lattice constants, packings and nearest-neighbor distances
//! - **Bulk Lattices** ([`lattice`]) - FCC, BCC and graphene honeycomb generators
//! - **Shape Predicates** ([`shapes`]) - Pure geometric membership tests used to carve lattices
//! - **File I/O** ([`io`]) - XYZ structures and distance reports
//! - **Utilities** ([`utils`]) - Geometry helpers shared across layers

pub mod io;
pub mod lattice;
pub mod models;
pub mod shapes;
pub mod species;
pub mod utils;
