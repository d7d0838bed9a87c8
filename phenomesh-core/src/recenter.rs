//! Coordinate recentering for registered scans

use crate::point::{Point3d, Vector3d};
use crate::point_cloud::PointCloud;
use serde::{Deserialize, Serialize};

/// Offset subtracted from every point of a registered cloud, in the order
/// easting, northing, elevation (meters).
///
/// Registered plots are georeferenced to a UTM origin millions of meters
/// from zero; the triangulation needs coordinates in a local frame, so
/// clouds are shifted by the plot origin used during registration. The
/// constants are survey knowledge, not derivable from the data.
pub const REGISTRATION_OFFSET: [f64; 3] = [409_000.0, 3_660_100.0, 0.0];

/// A per-axis translation applied uniformly to every point: `p' = p - offset`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Recenter {
    pub offset: Vector3d,
}

impl Recenter {
    /// Create a recentering transform with an explicit offset
    pub fn new(offset: Vector3d) -> Self {
        Self { offset }
    }

    /// The standard transform for registered plot clouds
    pub fn registration() -> Self {
        let [dx, dy, dz] = REGISTRATION_OFFSET;
        Self::new(Vector3d::new(dx, dy, dz))
    }

    /// Apply the transform to a single point
    pub fn apply_point(&self, point: &Point3d) -> Point3d {
        point - self.offset
    }

    /// Apply the transform to every point in a cloud
    pub fn apply(&self, cloud: &mut PointCloud<Point3d>) {
        cloud.recenter(self);
    }
}

impl Default for Recenter {
    fn default() -> Self {
        Self::registration()
    }
}
