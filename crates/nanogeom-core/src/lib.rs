//! # nanogeom Core Library
//!
//! A library for synthesizing atomic point-cloud models of nanostructures: metal
//! nanoparticles, graphene fragments and composite assemblies carved from a dense
//! bulk lattice.
//!
//! ## Architectural Philosophy
//!
//! The library follows a strict three-layer architecture.
//!
//! - **[`core`]: The Foundation.** Stateless data models (`PointCloud`), the species
//!   table, bulk-lattice generation, pure shape predicates and file I/O.
//!
//! - **[`engine`]: The Logic Core.** The algorithms that act on point clouds: boundary
//!   cleanup, union/difference combination, alloy doping, rigid transforms and the
//!   distance-controlled placement solver, together with their configuration, errors
//!   and progress reporting.
//!
//! - **[`workflows`]: The Public API.** End-to-end procedures that compose the engine
//!   into named recipes (spheres, rods, core-shell particles, tips, graphene shapes,
//!   dimers and bowties) and into the two-structure separation procedure.

pub mod core;
pub mod engine;
pub mod workflows;
