//! Alpha shape surface reconstruction
//!
//! Filters the Delaunay decomposition by circumradius, extracts the boundary
//! of the kept cell complex as outward-oriented polygons, and triangulates
//! the polygons into a uniform triangle mesh.

use crate::delaunay::{sorted3, tetrahedralize};
use phenomesh_core::{Error, Point3d, PointCloud, Result, TriangleMesh};
use std::collections::{BTreeMap, HashMap};
use tracing::info;

/// Default alpha radius, tuned to the sample spacing of the registered
/// plot scans this pipeline was built for. Clouds sampled at a different
/// density need a different alpha; too small opens holes, too large merges
/// features.
pub const DEFAULT_ALPHA: f64 = 0.02;

/// Reconstruct a surface mesh from a point cloud via the alpha shape of its
/// Delaunay tetrahedralization.
///
/// Keeps every tetrahedron with circumradius at most `alpha`, takes the
/// boundary of the kept complex and returns it as a triangle-only mesh with
/// outward-wound faces. Vertices not on the surface are dropped.
///
/// The result is a valid closed or open surface consistent with the sample
/// density and `alpha`; manifoldness is not guaranteed for noisy or sparse
/// input, which is inherent to alpha shapes.
pub fn alpha_shape_reconstruction(cloud: &PointCloud<Point3d>, alpha: f64) -> Result<TriangleMesh> {
    if !(alpha > 0.0) {
        return Err(Error::Reconstruction(format!(
            "alpha radius must be positive, got {alpha}"
        )));
    }

    let tet_mesh = tetrahedralize(&cloud.points)?;

    let kept: Vec<[usize; 4]> = tet_mesh
        .tets
        .iter()
        .zip(&tet_mesh.circumradii)
        .filter(|(_, &radius)| radius <= alpha)
        .map(|(tet, _)| *tet)
        .collect();

    if kept.is_empty() {
        return Err(Error::Reconstruction(format!(
            "no tetrahedron has circumradius within alpha {}; the cloud is too sparse for this alpha",
            alpha
        )));
    }

    let polygons = boundary_polygons(&kept);
    let faces = triangulate_polygons(polygons);
    let mesh = compact(&tet_mesh.vertices, faces);

    info!(
        cells = kept.len(),
        vertices = mesh.vertex_count(),
        faces = mesh.face_count(),
        alpha,
        "surface extracted"
    );

    Ok(mesh)
}

/// Outward-facing triangles of a positively oriented tetrahedron.
fn oriented_faces([a, b, c, d]: [usize; 4]) -> [[usize; 3]; 4] {
    [[a, c, b], [a, b, d], [a, d, c], [b, c, d]]
}

/// Boundary of the cell complex: faces incident to exactly one cell, with
/// the winding inherited from their cell (away from the opposite vertex).
fn boundary_polygons(tets: &[[usize; 4]]) -> Vec<Vec<usize>> {
    let mut incidence: BTreeMap<[usize; 3], u32> = BTreeMap::new();
    for tet in tets {
        for face in oriented_faces(*tet) {
            *incidence.entry(sorted3(face)).or_insert(0) += 1;
        }
    }

    let mut polygons = Vec::new();
    for tet in tets {
        for face in oriented_faces(*tet) {
            if incidence[&sorted3(face)] == 1 {
                polygons.push(face.to_vec());
            }
        }
    }
    polygons
}

/// Fan-triangulate polygon faces into triangles. Boundary faces of a
/// tetrahedral complex are already triangles; this pass is the uniformity
/// guarantee for any polygonal extraction.
fn triangulate_polygons(polygons: Vec<Vec<usize>>) -> Vec<[usize; 3]> {
    let mut faces = Vec::with_capacity(polygons.len());
    for polygon in polygons {
        for i in 1..polygon.len().saturating_sub(1) {
            faces.push([polygon[0], polygon[i], polygon[i + 1]]);
        }
    }
    faces
}

/// Re-index faces against a vertex list holding only surface vertices, in
/// first-use order.
fn compact(vertices: &[Point3d], faces: Vec<[usize; 3]>) -> TriangleMesh {
    let mut mesh = TriangleMesh::new();
    let mut remap: HashMap<usize, usize> = HashMap::new();

    for face in faces {
        let mapped = face.map(|old| {
            *remap
                .entry(old)
                .or_insert_with(|| mesh.add_vertex(vertices[old]))
        });
        mesh.add_face(mapped);
    }
    mesh
}
