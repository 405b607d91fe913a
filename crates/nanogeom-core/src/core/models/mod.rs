//! Data structures describing atomic point clouds.

pub mod axis;
pub mod cloud;
