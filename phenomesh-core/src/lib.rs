//! Core data structures for phenomesh
//!
//! This crate provides the fundamental types shared by the meshing pipeline:
//! points, point clouds, triangle meshes, the registration recentering
//! transform and the common error type.

pub mod error;
pub mod mesh;
pub mod point;
pub mod point_cloud;
pub mod recenter;

pub use error::*;
pub use mesh::*;
pub use point::*;
pub use point_cloud::*;
pub use recenter::*;

/// Re-export commonly used types from nalgebra
pub use nalgebra::{Point3, Vector3};

/// Common result type for phenomesh operations
pub type Result<T> = std::result::Result<T, Error>;
