//! Incremental 3D Delaunay tetrahedralization
//!
//! Bowyer-Watson insertion over a bounding super-tetrahedron: each point
//! carves the cavity of cells whose circumsphere strictly contains it, and
//! the cavity walls are rejoined to the new vertex. Cells are stored
//! positively oriented so the containment test is orientation-free, and the
//! circumsphere of every cell is cached at creation time.
//!
//! All bookkeeping uses ordered containers and input-order insertion, so the
//! decomposition is deterministic for a given point sequence.

use nalgebra::Matrix3;
use phenomesh_core::{Error, Point3d, Result, Vector3d};
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::debug;

/// Relative slack for circumsphere containment; points on the sphere
/// (cospherical ties) are treated as outside.
const IN_SPHERE_SLACK: f64 = 1e-10;

/// A tetrahedral decomposition of a point set.
///
/// `tets` index into `vertices` (the distinct input points, in input order);
/// every cell is positively oriented and has the circumradius cached at the
/// same position in `circumradii`.
#[derive(Debug, Clone)]
pub struct TetMesh {
    pub vertices: Vec<Point3d>,
    pub tets: Vec<[usize; 4]>,
    pub circumradii: Vec<f64>,
}

impl TetMesh {
    /// Number of tetrahedra in the decomposition
    pub fn tet_count(&self) -> usize {
        self.tets.len()
    }
}

/// Working cell: vertex indices plus cached circumsphere.
struct Cell {
    v: [usize; 4],
    center: Point3d,
    radius2: f64,
}

/// Signed volume predicate: positive when `d` is on the positive side of
/// the plane through `a`, `b`, `c`.
fn orient(a: &Point3d, b: &Point3d, c: &Point3d, d: &Point3d) -> f64 {
    let ba = b - a;
    let ca = c - a;
    let da = d - a;
    Matrix3::new(
        ba.x, ba.y, ba.z, //
        ca.x, ca.y, ca.z, //
        da.x, da.y, da.z,
    )
    .determinant()
}

/// Circumcenter and squared circumradius of a tetrahedron; `None` when the
/// four points have no 3D extent.
fn circumsphere(a: &Point3d, b: &Point3d, c: &Point3d, d: &Point3d) -> Option<(Point3d, f64)> {
    let ba = b - a;
    let ca = c - a;
    let da = d - a;
    let m = Matrix3::new(
        ba.x, ba.y, ba.z, //
        ca.x, ca.y, ca.z, //
        da.x, da.y, da.z,
    );
    let rhs = Vector3d::new(
        0.5 * ba.norm_squared(),
        0.5 * ca.norm_squared(),
        0.5 * da.norm_squared(),
    );
    let offset = m.lu().solve(&rhs)?;
    Some((a + offset, offset.norm_squared()))
}

/// Build a cell with positive orientation and a cached circumsphere.
/// Flat quadruples get an infinite circumsphere; they are swallowed by the
/// next insertion that touches them and never reach the output.
fn make_cell(vertices: &[Point3d], mut v: [usize; 4]) -> Cell {
    if orient(&vertices[v[0]], &vertices[v[1]], &vertices[v[2]], &vertices[v[3]]) < 0.0 {
        v.swap(2, 3);
    }
    match circumsphere(&vertices[v[0]], &vertices[v[1]], &vertices[v[2]], &vertices[v[3]]) {
        Some((center, radius2)) if radius2.is_finite() => Cell { v, center, radius2 },
        _ => Cell {
            v,
            center: vertices[v[0]],
            radius2: f64::INFINITY,
        },
    }
}

pub(crate) fn sorted3(mut f: [usize; 3]) -> [usize; 3] {
    f.sort_unstable();
    f
}

fn cell_face_keys(v: [usize; 4]) -> [[usize; 3]; 4] {
    [
        sorted3([v[0], v[1], v[2]]),
        sorted3([v[0], v[1], v[3]]),
        sorted3([v[0], v[2], v[3]]),
        sorted3([v[1], v[2], v[3]]),
    ]
}

/// How deep `p` sits inside a cell: the smallest of the four signed volumes
/// obtained by substituting `p` for each vertex. Non-negative exactly for
/// the cell containing the point.
fn containment_score(vertices: &[Point3d], cell: &Cell, p: &Point3d) -> f64 {
    let [a, b, c, d] = cell.v.map(|i| vertices[i]);
    orient(p, &b, &c, &d)
        .min(orient(&a, p, &c, &d))
        .min(orient(&a, &b, p, &d))
        .min(orient(&a, &b, &c, p))
}

/// Restrict the carved region to the face-connected component around the
/// cell containing `p`. In exact arithmetic the circumsphere test already
/// yields a connected set; floating point (and flat leftover cells, whose
/// circumsphere is infinite) can admit detached cells whose removal would
/// punch unrelated holes into the triangulation.
fn connected_cavity(
    vertices: &[Point3d],
    cells: &[Cell],
    candidates: &[usize],
    p: &Point3d,
) -> Vec<usize> {
    let start = *candidates
        .iter()
        .max_by(|&&x, &&y| {
            let sx = containment_score(vertices, &cells[x], p);
            let sy = containment_score(vertices, &cells[y], p);
            sx.partial_cmp(&sy).expect("orientation predicates are finite")
        })
        .expect("cavity candidates are never empty");

    let mut by_face: HashMap<[usize; 3], Vec<usize>> = HashMap::new();
    for &ci in candidates {
        for key in cell_face_keys(cells[ci].v) {
            by_face.entry(key).or_default().push(ci);
        }
    }

    let mut visited: HashSet<usize> = HashSet::new();
    let mut queue = vec![start];
    visited.insert(start);
    while let Some(ci) = queue.pop() {
        for key in cell_face_keys(cells[ci].v) {
            for &neighbor in &by_face[&key] {
                if visited.insert(neighbor) {
                    queue.push(neighbor);
                }
            }
        }
    }

    let mut cavity: Vec<usize> = visited.into_iter().collect();
    cavity.sort_unstable();
    cavity
}

/// Drop exact duplicates, preserving first occurrences in input order.
/// Coincident points would stall the cavity step (they lie on, not inside,
/// every circumsphere around them).
fn distinct_points(points: &[Point3d]) -> Vec<Point3d> {
    let mut seen: HashSet<[u64; 3]> = HashSet::with_capacity(points.len());
    let mut unique = Vec::with_capacity(points.len());
    for p in points {
        if seen.insert([p.x.to_bits(), p.y.to_bits(), p.z.to_bits()]) {
            unique.push(*p);
        }
    }
    unique
}

/// How far the super-tetrahedron corners sit from the data, in bounding
/// radii. Hull cells with circumspheres reaching the corners get rewired to
/// them and drop out of the result, so the corners must clear every
/// circumsphere the real points can produce.
const SUPER_REACH: f64 = 64.0;

/// Regular super-tetrahedron whose insphere covers the bounding sphere of
/// the input, with room to spare.
fn super_tetrahedron(points: &[Point3d]) -> [Point3d; 4] {
    let mut min = points[0];
    let mut max = points[0];
    for p in points {
        min = Point3d::new(min.x.min(p.x), min.y.min(p.y), min.z.min(p.z));
        max = Point3d::new(max.x.max(p.x), max.y.max(p.y), max.z.max(p.z));
    }
    let center = Point3d::from((min.coords + max.coords) * 0.5);
    let radius = 0.5 * (max - min).norm() + 1.0;
    let reach = SUPER_REACH * radius / 3f64.sqrt();
    [
        center + Vector3d::new(reach, reach, reach),
        center + Vector3d::new(reach, -reach, -reach),
        center + Vector3d::new(-reach, reach, -reach),
        center + Vector3d::new(-reach, -reach, reach),
    ]
}

/// Compute the Delaunay tetrahedralization of a point set.
///
/// Fails with [`Error::DegenerateInput`] when fewer than four distinct
/// points are given or when the set is coplanar/collinear (no cell with 3D
/// extent survives).
pub fn tetrahedralize(points: &[Point3d]) -> Result<TetMesh> {
    let unique = distinct_points(points);
    if unique.len() < 4 {
        return Err(Error::DegenerateInput(format!(
            "3D triangulation requires at least 4 distinct points, got {}",
            unique.len()
        )));
    }

    let corners = super_tetrahedron(&unique);
    let mut vertices: Vec<Point3d> = Vec::with_capacity(unique.len() + 4);
    vertices.extend_from_slice(&corners);
    vertices.extend_from_slice(&unique);

    let mut cells = vec![make_cell(&vertices, [0, 1, 2, 3])];

    for vi in 4..vertices.len() {
        let p = vertices[vi];

        let candidates: Vec<usize> = cells
            .iter()
            .enumerate()
            .filter(|(_, cell)| {
                (p - cell.center).norm_squared() < cell.radius2 * (1.0 - IN_SPHERE_SLACK)
            })
            .map(|(ci, _)| ci)
            .collect();
        if candidates.is_empty() {
            return Err(Error::Reconstruction(format!(
                "no circumsphere contains point {}; cannot continue insertion",
                vi - 4
            )));
        }

        let cavity = connected_cavity(&vertices, &cells, &candidates, &p);

        // cavity walls: faces belonging to exactly one carved cell
        let mut walls: BTreeMap<[usize; 3], u32> = BTreeMap::new();
        let mut carved = vec![false; cells.len()];
        for &ci in &cavity {
            carved[ci] = true;
            for key in cell_face_keys(cells[ci].v) {
                *walls.entry(key).or_insert(0) += 1;
            }
        }

        let mut next: Vec<Cell> = cells
            .into_iter()
            .enumerate()
            .filter(|(ci, _)| !carved[*ci])
            .map(|(_, cell)| cell)
            .collect();
        for (face, count) in walls {
            if count == 1 {
                next.push(make_cell(&vertices, [face[0], face[1], face[2], vi]));
            }
        }
        cells = next;
    }

    let mut tets = Vec::new();
    let mut circumradii = Vec::new();
    for cell in &cells {
        if cell.v.iter().any(|&i| i < 4) {
            // incident to the super-tetrahedron
            continue;
        }
        if !cell.radius2.is_finite() {
            // flat leftover with no 3D extent
            continue;
        }
        tets.push([
            cell.v[0] - 4,
            cell.v[1] - 4,
            cell.v[2] - 4,
            cell.v[3] - 4,
        ]);
        circumradii.push(cell.radius2.sqrt());
    }

    if tets.is_empty() {
        return Err(Error::DegenerateInput(
            "points are coplanar or collinear; no tetrahedron with 3D extent exists".to_string(),
        ));
    }

    debug!(
        points = unique.len(),
        cells = tets.len(),
        "tetrahedralization complete"
    );

    Ok(TetMesh {
        vertices: unique,
        tets,
        circumradii,
    })
}
