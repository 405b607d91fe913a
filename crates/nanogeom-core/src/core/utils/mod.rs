pub mod geometry;
pub(crate) mod neighbors;
