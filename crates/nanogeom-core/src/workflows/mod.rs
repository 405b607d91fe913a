//! # Workflows Module
//!
//! End-to-end procedures built on top of the engine. These are the entry points used by
//! the command-line front end.
//!
//! ## Architecture
//!
//! - **Create Workflow** ([`create`]) - Turns a validated [`Recipe`](crate::engine::config::Recipe)
//!   into one or more named structures: carving, boundary cleanup, recentering, alloy
//!   doping, region combination and, for dimers and bowties, distance-controlled assembly.
//! - **Separate Workflow** ([`separate`]) - Places one loaded structure at a series of
//!   controlled minimum distances from another.
//!
//! Both workflows report their stages through a
//! [`ProgressReporter`](crate::engine::progress::ProgressReporter) and return owned clouds;
//! writing files is left to the caller.

pub mod create;
pub mod separate;
