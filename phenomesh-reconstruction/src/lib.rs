//! Surface reconstruction for registered point clouds
//!
//! Builds a tetrahedral Delaunay decomposition of the cloud, keeps the cells
//! allowed by an alpha radius threshold, and extracts the boundary of the
//! kept complex as a triangle mesh.

pub mod alpha_shape;
pub mod delaunay;

pub use alpha_shape::*;
pub use delaunay::*;
