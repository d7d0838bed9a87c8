//! PLY format support

use crate::{MeshReader, MeshWriter, PointCloudReader, PointCloudWriter};
use phenomesh_core::{Error, Point3d, PointCloud, Result, TriangleMesh, Vector3d};
use ply_rs::{
    parser::Parser,
    ply::{Addable, DefaultElement, ElementDef, Ply, Property, PropertyDef, PropertyType, ScalarType},
    writer::Writer,
};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

pub struct PlyReader;
pub struct PlyWriter;

fn open(path: &Path) -> Result<File> {
    File::open(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::InputNotFound(path.to_path_buf())
        } else {
            Error::Io(e)
        }
    })
}

impl PointCloudReader for PlyReader {
    fn read_point_cloud<P: AsRef<Path>>(path: P) -> Result<PointCloud<Point3d>> {
        let file = open(path.as_ref())?;
        let mut reader = BufReader::new(file);

        let parser = Parser::<DefaultElement>::new();
        let ply = parser.read_ply(&mut reader)?;

        let mut points = Vec::new();
        if let Some(vertex_element) = ply.payload.get("vertex") {
            for vertex in vertex_element {
                let x = extract_scalar(vertex, "x")?;
                let y = extract_scalar(vertex, "y")?;
                let z = extract_scalar(vertex, "z")?;

                points.push(Point3d::new(x, y, z));
            }
        }

        Ok(PointCloud::from_points(points))
    }
}

impl PointCloudWriter for PlyWriter {
    fn write_point_cloud<P: AsRef<Path>>(cloud: &PointCloud<Point3d>, path: P) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);

        let mut ply = Ply::<DefaultElement>::new();

        let mut vertex_element = ElementDef::new("vertex".to_string());
        vertex_element.count = cloud.len();
        for name in ["x", "y", "z"] {
            vertex_element.properties.add(PropertyDef::new(
                name.to_string(),
                PropertyType::Scalar(ScalarType::Double),
            ));
        }
        ply.header.elements.add(vertex_element);

        let mut vertices = Vec::with_capacity(cloud.len());
        for point in cloud {
            let mut vertex = DefaultElement::new();
            vertex.insert("x".to_string(), Property::Double(point.x));
            vertex.insert("y".to_string(), Property::Double(point.y));
            vertex.insert("z".to_string(), Property::Double(point.z));
            vertices.push(vertex);
        }
        ply.payload.insert("vertex".to_string(), vertices);

        let writer_instance = Writer::new();
        writer_instance.write_ply(&mut writer, &mut ply)?;

        Ok(())
    }
}

impl MeshReader for PlyReader {
    fn read_mesh<P: AsRef<Path>>(path: P) -> Result<TriangleMesh> {
        let file = open(path.as_ref())?;
        let mut reader = BufReader::new(file);

        let parser = Parser::<DefaultElement>::new();
        let ply = parser.read_ply(&mut reader)?;

        let mut vertices = Vec::new();
        if let Some(vertex_element) = ply.payload.get("vertex") {
            for vertex in vertex_element {
                let x = extract_scalar(vertex, "x")?;
                let y = extract_scalar(vertex, "y")?;
                let z = extract_scalar(vertex, "z")?;

                vertices.push(Point3d::new(x, y, z));
            }
        }

        let mut faces = Vec::new();
        if let Some(face_element) = ply.payload.get("face") {
            for face in face_element {
                let indices = extract_face_indices(face)?;
                if indices.len() != 3 {
                    return Err(Error::InvalidData(format!(
                        "expected triangle faces, found a face with {} vertices",
                        indices.len()
                    )));
                }
                faces.push([indices[0], indices[1], indices[2]]);
            }
        }

        let normals = if let Some(vertex_element) = ply.payload.get("vertex") {
            let mut normals = Vec::new();
            let mut has_normals = true;

            for vertex in vertex_element {
                if let (Ok(nx), Ok(ny), Ok(nz)) = (
                    extract_scalar(vertex, "nx"),
                    extract_scalar(vertex, "ny"),
                    extract_scalar(vertex, "nz"),
                ) {
                    normals.push(Vector3d::new(nx, ny, nz));
                } else {
                    has_normals = false;
                    break;
                }
            }

            (has_normals && !normals.is_empty()).then_some(normals)
        } else {
            None
        };

        let mut mesh = TriangleMesh::from_vertices_and_faces(vertices, faces);
        if let Some(normals) = normals {
            mesh.set_normals(normals);
        }

        Ok(mesh)
    }
}

impl MeshWriter for PlyWriter {
    fn write_mesh<P: AsRef<Path>>(mesh: &TriangleMesh, path: P) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);

        let mut ply = Ply::<DefaultElement>::new();

        let mut vertex_element = ElementDef::new("vertex".to_string());
        vertex_element.count = mesh.vertices.len();
        for name in ["x", "y", "z"] {
            vertex_element.properties.add(PropertyDef::new(
                name.to_string(),
                PropertyType::Scalar(ScalarType::Double),
            ));
        }
        if mesh.normals.is_some() {
            for name in ["nx", "ny", "nz"] {
                vertex_element.properties.add(PropertyDef::new(
                    name.to_string(),
                    PropertyType::Scalar(ScalarType::Double),
                ));
            }
        }
        ply.header.elements.add(vertex_element);

        let mut face_element = ElementDef::new("face".to_string());
        face_element.count = mesh.faces.len();
        face_element.properties.add(PropertyDef::new(
            "vertex_indices".to_string(),
            PropertyType::List(ScalarType::UChar, ScalarType::Int),
        ));
        ply.header.elements.add(face_element);

        let mut vertices = Vec::with_capacity(mesh.vertices.len());
        for (i, vertex) in mesh.vertices.iter().enumerate() {
            let mut element = DefaultElement::new();
            element.insert("x".to_string(), Property::Double(vertex.x));
            element.insert("y".to_string(), Property::Double(vertex.y));
            element.insert("z".to_string(), Property::Double(vertex.z));

            if let Some(normals) = &mesh.normals {
                element.insert("nx".to_string(), Property::Double(normals[i].x));
                element.insert("ny".to_string(), Property::Double(normals[i].y));
                element.insert("nz".to_string(), Property::Double(normals[i].z));
            }

            vertices.push(element);
        }
        ply.payload.insert("vertex".to_string(), vertices);

        let mut faces = Vec::with_capacity(mesh.faces.len());
        for face in &mesh.faces {
            let mut element = DefaultElement::new();
            let indices = vec![face[0] as i32, face[1] as i32, face[2] as i32];
            element.insert("vertex_indices".to_string(), Property::ListInt(indices));
            faces.push(element);
        }
        ply.payload.insert("face".to_string(), faces);

        let writer_instance = Writer::new();
        writer_instance.write_ply(&mut writer, &mut ply)?;

        Ok(())
    }
}

/// Extract a scalar property as f64 from a PLY element
fn extract_scalar(element: &DefaultElement, name: &str) -> Result<f64> {
    match element.get(name) {
        Some(Property::Double(val)) => Ok(*val),
        Some(Property::Float(val)) => Ok(*val as f64),
        Some(Property::Int(val)) => Ok(*val as f64),
        Some(Property::UInt(val)) => Ok(*val as f64),
        _ => Err(Error::InvalidData(format!(
            "property '{}' not found or invalid type",
            name
        ))),
    }
}

/// Extract face indices from a PLY face element
fn extract_face_indices(element: &DefaultElement) -> Result<Vec<usize>> {
    match element
        .get("vertex_indices")
        .or_else(|| element.get("vertex_index"))
    {
        Some(Property::ListInt(indices)) => Ok(indices.iter().map(|&idx| idx as usize).collect()),
        Some(Property::ListUInt(indices)) => Ok(indices.iter().map(|&idx| idx as usize).collect()),
        Some(Property::ListUChar(indices)) => Ok(indices.iter().map(|&idx| idx as usize).collect()),
        _ => Err(Error::InvalidData("face indices not found".to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn point_cloud_roundtrip() {
        let temp_file = "test_phenomesh_cloud.ply";

        let mut cloud = PointCloud::new();
        cloud.push(Point3d::new(409_000.5, 3_660_100.25, 1.125));
        cloud.push(Point3d::new(409_001.0, 3_660_101.5, 2.25));
        cloud.push(Point3d::new(409_002.0, 3_660_102.75, 3.5));

        PlyWriter::write_point_cloud(&cloud, temp_file).unwrap();
        let loaded = PlyReader::read_point_cloud(temp_file).unwrap();

        // double precision properties survive bit-exact
        assert_eq!(cloud.len(), loaded.len());
        for (original, read_back) in cloud.iter().zip(loaded.iter()) {
            assert_eq!(original, read_back);
        }

        let _ = fs::remove_file(temp_file);
    }

    #[test]
    fn mesh_roundtrip_keeps_connectivity() {
        let temp_file = "test_phenomesh_mesh.ply";

        let vertices = vec![
            Point3d::new(0.0, 0.0, 0.0),
            Point3d::new(1.0, 0.0, 0.0),
            Point3d::new(0.5, 1.0, 0.0),
            Point3d::new(0.5, 0.5, 1.0),
        ];
        let faces = vec![[0, 2, 1], [0, 1, 3], [1, 2, 3], [0, 3, 2]];
        let mesh = TriangleMesh::from_vertices_and_faces(vertices, faces);

        PlyWriter::write_mesh(&mesh, temp_file).unwrap();
        let loaded = PlyReader::read_mesh(temp_file).unwrap();

        assert_eq!(mesh.vertices, loaded.vertices);
        assert_eq!(mesh.faces, loaded.faces);
        assert!(loaded.normals.is_none());

        let _ = fs::remove_file(temp_file);
    }

    #[test]
    fn ascii_fixture_with_float_vertices() {
        let temp_file = "test_phenomesh_ascii.ply";

        let ply_content = "ply\n\
format ascii 1.0\n\
comment registered scan fragment\n\
element vertex 4\n\
property float x\n\
property float y\n\
property float z\n\
end_header\n\
0.0 0.0 0.0\n\
1.0 0.0 0.0\n\
0.0 1.0 0.0\n\
0.0 0.0 1.0\n";
        fs::write(temp_file, ply_content).unwrap();

        let cloud = PlyReader::read_point_cloud(temp_file).unwrap();
        assert_eq!(cloud.len(), 4);
        assert_eq!(cloud[3], Point3d::new(0.0, 0.0, 1.0));

        let _ = fs::remove_file(temp_file);
    }

    #[test]
    fn missing_file_maps_to_input_not_found() {
        let result = PlyReader::read_point_cloud("does_not_exist_phenomesh.ply");
        assert!(matches!(result, Err(Error::InputNotFound(_))));
    }

    #[test]
    fn non_triangle_face_is_invalid_data() {
        let temp_file = "test_phenomesh_quad.ply";

        let ply_content = "ply\n\
format ascii 1.0\n\
element vertex 4\n\
property float x\n\
property float y\n\
property float z\n\
element face 1\n\
property list uchar int vertex_indices\n\
end_header\n\
0.0 0.0 0.0\n\
1.0 0.0 0.0\n\
1.0 1.0 0.0\n\
0.0 1.0 0.0\n\
4 0 1 2 3\n";
        fs::write(temp_file, ply_content).unwrap();

        let result = PlyReader::read_mesh(temp_file);
        assert!(matches!(result, Err(Error::InvalidData(_))));

        let _ = fs::remove_file(temp_file);
    }
}
