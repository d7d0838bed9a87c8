//! Point and vector aliases
//!
//! Registered clouds carry projected (UTM) coordinates in the millions of
//! meters, so the working scalar is `f64` end to end; single precision
//! cannot even represent sub-centimeter structure at that magnitude.

use nalgebra::{Point3, Vector3};

/// A 3D point with double precision coordinates
pub type Point3d = Point3<f64>;

/// A 3D vector with double precision components
pub type Vector3d = Vector3<f64>;
