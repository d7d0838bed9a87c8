//! I/O operations for point clouds and meshes
//!
//! Reads registered point clouds and writes reconstructed meshes in the PLY
//! polygon format. Mesh writes are atomic: data goes to a temporary sibling
//! file that is renamed over the destination only after a complete write,
//! so a failed run never leaves a partial mesh behind.

pub mod ply;

use phenomesh_core::{Error, Point3d, PointCloud, Result, TriangleMesh};
use std::fs;
use std::path::Path;

/// Trait for reading point clouds from files
pub trait PointCloudReader {
    fn read_point_cloud<P: AsRef<Path>>(path: P) -> Result<PointCloud<Point3d>>;
}

/// Trait for writing point clouds to files
pub trait PointCloudWriter {
    fn write_point_cloud<P: AsRef<Path>>(cloud: &PointCloud<Point3d>, path: P) -> Result<()>;
}

/// Trait for reading meshes from files
pub trait MeshReader {
    fn read_mesh<P: AsRef<Path>>(path: P) -> Result<TriangleMesh>;
}

/// Trait for writing meshes to files
pub trait MeshWriter {
    fn write_mesh<P: AsRef<Path>>(mesh: &TriangleMesh, path: P) -> Result<()>;
}

/// Auto-detect format and read a point cloud
pub fn read_point_cloud<P: AsRef<Path>>(path: P) -> Result<PointCloud<Point3d>> {
    let path = path.as_ref();
    match path.extension().and_then(|s| s.to_str()) {
        Some("ply") => ply::PlyReader::read_point_cloud(path),
        _ => Err(Error::UnsupportedFormat(format!(
            "unsupported point cloud format: {:?}",
            path.extension()
        ))),
    }
}

/// Auto-detect format and read a mesh
pub fn read_mesh<P: AsRef<Path>>(path: P) -> Result<TriangleMesh> {
    let path = path.as_ref();
    match path.extension().and_then(|s| s.to_str()) {
        Some("ply") => ply::PlyReader::read_mesh(path),
        _ => Err(Error::UnsupportedFormat(format!(
            "unsupported mesh format: {:?}",
            path.extension()
        ))),
    }
}

/// Auto-detect format and write a mesh atomically
pub fn write_mesh<P: AsRef<Path>>(mesh: &TriangleMesh, path: P) -> Result<()> {
    let path = path.as_ref();
    match path.extension().and_then(|s| s.to_str()) {
        Some("ply") => write_mesh_atomic(mesh, path),
        _ => Err(Error::UnsupportedFormat(format!(
            "unsupported mesh format: {:?}",
            path.extension()
        ))),
    }
}

fn write_mesh_atomic(mesh: &TriangleMesh, path: &Path) -> Result<()> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = std::path::PathBuf::from(tmp);

    let result = ply::PlyWriter::write_mesh(mesh, &tmp)
        .and_then(|_| fs::rename(&tmp, path).map_err(Error::Io));

    match result {
        Ok(()) => Ok(()),
        Err(err) => {
            let _ = fs::remove_file(&tmp);
            match err {
                Error::Io(source) => Err(Error::OutputWrite {
                    path: path.to_path_buf(),
                    source,
                }),
                other => Err(other),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use phenomesh_core::Point3d;

    #[test]
    fn unsupported_extension_is_rejected() {
        let cloud = read_point_cloud("cloud.xyz");
        assert!(matches!(cloud, Err(Error::UnsupportedFormat(_))));

        let mesh = TriangleMesh::new();
        let written = write_mesh(&mesh, "mesh.stl");
        assert!(matches!(written, Err(Error::UnsupportedFormat(_))));
    }

    #[test]
    fn failed_write_leaves_nothing_behind() {
        let mesh = TriangleMesh::from_vertices_and_faces(
            vec![
                Point3d::new(0.0, 0.0, 0.0),
                Point3d::new(1.0, 0.0, 0.0),
                Point3d::new(0.0, 1.0, 0.0),
            ],
            vec![[0, 1, 2]],
        );

        let target = Path::new("no_such_dir_phenomesh_io/out.ply");
        let result = write_mesh(&mesh, target);
        assert!(matches!(result, Err(Error::OutputWrite { .. })));
        assert!(!target.exists());
        assert!(!Path::new("no_such_dir_phenomesh_io/out.ply.tmp").exists());
    }
}
