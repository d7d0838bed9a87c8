//! End-to-end pipeline tests: plot directory in, triangle mesh out.

use phenomesh_cli::{MeshBuilder, INPUT_CLOUD_NAME};
use phenomesh_core::{Error, Point3d, PointCloud, Recenter, Vector3d, REGISTRATION_OFFSET};
use phenomesh_io::{ply::PlyWriter, PointCloudWriter};
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::fs;
use std::path::PathBuf;

fn plot_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("phenomesh_{}_{}", name, std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

/// A 0.12 m cube of points near the plot origin of the registered frame,
/// sampled at the 0.02 m spacing the default alpha is tuned for.
fn registered_cube_cloud(seed: u64) -> PointCloud<Point3d> {
    let mut rng = StdRng::seed_from_u64(seed);
    let [dx, dy, dz] = REGISTRATION_OFFSET;
    let spacing = 0.02;

    let mut points = Vec::new();
    for ix in 0..7 {
        for iy in 0..7 {
            for iz in 0..7 {
                points.push(Point3d::new(
                    dx + 1.0 + ix as f64 * spacing + rng.gen_range(-0.002..0.002),
                    dy + 2.0 + iy as f64 * spacing + rng.gen_range(-0.002..0.002),
                    dz + 0.5 + iz as f64 * spacing + rng.gen_range(-0.002..0.002),
                ));
            }
        }
    }
    PointCloud::from_points(points)
}

#[test]
fn builds_mesh_from_plot_directory() {
    let dir = plot_dir("build");
    let cloud = registered_cube_cloud(3);
    PlyWriter::write_point_cloud(&cloud, dir.join(INPUT_CLOUD_NAME)).unwrap();

    let mesh = MeshBuilder::default().build_mesh(&dir).unwrap();

    assert!(!mesh.is_empty());
    for face in &mesh.faces {
        for &v in face {
            assert!(v < mesh.vertex_count());
        }
    }
    // the surface lives in the recentered local frame
    for v in &mesh.vertices {
        assert!(v.x.abs() < 10.0 && v.y.abs() < 10.0 && v.z.abs() < 10.0);
    }

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn pipeline_is_deterministic() {
    let dir = plot_dir("repeat");
    let cloud = registered_cube_cloud(17);
    PlyWriter::write_point_cloud(&cloud, dir.join(INPUT_CLOUD_NAME)).unwrap();

    let first = MeshBuilder::default().build_mesh(&dir).unwrap();
    let second = MeshBuilder::default().build_mesh(&dir).unwrap();
    assert_eq!(first, second);

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn missing_cloud_is_input_not_found() {
    let dir = plot_dir("empty");

    let result = MeshBuilder::default().build_mesh(&dir);
    assert!(matches!(result, Err(Error::InputNotFound(_))));

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn too_small_alpha_surfaces_reconstruction_error() {
    let dir = plot_dir("alpha");
    let cloud = registered_cube_cloud(29);
    PlyWriter::write_point_cloud(&cloud, dir.join(INPUT_CLOUD_NAME)).unwrap();

    let result = MeshBuilder::default().with_alpha(1e-6).build_mesh(&dir);
    assert!(matches!(result, Err(Error::Reconstruction(_))));

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn recenter_override_handles_local_clouds() {
    let dir = plot_dir("local");
    let mut rng = StdRng::seed_from_u64(41);

    // cloud already in a local frame; identity offset instead of the default
    let mut points = Vec::new();
    for ix in 0..6 {
        for iy in 0..6 {
            for iz in 0..6 {
                points.push(Point3d::new(
                    ix as f64 * 0.02 + rng.gen_range(-0.002..0.002),
                    iy as f64 * 0.02 + rng.gen_range(-0.002..0.002),
                    iz as f64 * 0.02 + rng.gen_range(-0.002..0.002),
                ));
            }
        }
    }
    PlyWriter::write_point_cloud(&PointCloud::from_points(points), dir.join(INPUT_CLOUD_NAME))
        .unwrap();

    let mesh = MeshBuilder::default()
        .with_recenter(Recenter::new(Vector3d::zeros()))
        .build_mesh(&dir)
        .unwrap();

    assert!(!mesh.is_empty());
    for v in &mesh.vertices {
        assert!(v.x >= -0.01 && v.x <= 0.12);
    }

    let _ = fs::remove_dir_all(&dir);
}
