//! # Engine Module
//!
//! The algorithms that turn carved lattices into finished nanostructures.
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - Recipes, solver settings and their validation
//! - **Boundary Cleanup** ([`cleanup`]) - Iterative removal of dangling edge atoms
//! - **Set Combination** ([`combine`]) - Union and difference of clouds under an overlap cutoff
//! - **Alloy Doping** ([`alloy`]) - Random substitution of a fraction of atoms
//! - **Rigid Transforms** ([`transform`]) - Translation, rotation, recentering and mirroring
//! - **Distance Solver** ([`solver`]) - Controlled-separation placement of one cloud against another
//! - **Progress Monitoring** ([`progress`]) - Callback-based progress reporting
//! - **Error Handling** ([`error`]) - Engine error kinds carrying the offending parameters
//!
//! Every algorithm is synchronous and owns the clouds it produces. Operations that change
//! the atom count return a new cloud rather than resizing their input.

pub mod alloy;
pub mod cleanup;
pub mod combine;
pub mod config;
pub mod error;
pub mod progress;
pub mod solver;
pub mod transform;
