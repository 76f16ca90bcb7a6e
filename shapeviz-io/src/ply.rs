//! PLY format support for point sets and meshes
//!
//! Positions come from the `x`, `y`, `z` properties of the `vertex`
//! element. Colors are read from `red`, `green`, `blue` when all three are
//! present: integer channels are divided by 255, float channels are taken
//! as-is. Mesh faces come from the `face` element's `vertex_indices` list;
//! polygons with more than three corners are split into a triangle fan.

use crate::{MeshReader, MeshWriter, PointSetReader, PointSetWriter};
use ply_rs::{
    parser::Parser,
    ply::{Addable, DefaultElement, ElementDef, Ply, Property, PropertyDef, PropertyType, ScalarType},
    writer::Writer,
};
use shapeviz_core::{Error, Point3f, PointSet, Result, Rgb, TriangleMesh};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

pub struct PlyReader;
pub struct PlyWriter;

impl PointSetReader for PlyReader {
    fn read_point_set<P: AsRef<Path>>(path: P) -> Result<PointSet> {
        let path = path.as_ref();
        let ply = parse(path)?;

        let (positions, colors) = read_vertices(&ply)?;
        let set = match colors {
            Some(colors) => PointSet::from_colored_points(positions, colors)?,
            None => PointSet::from_points(positions),
        };

        log::debug!(
            "read {} points ({}colored) from {}",
            set.len(),
            if set.has_colors() { "" } else { "un" },
            path.display()
        );
        Ok(set)
    }
}

impl MeshReader for PlyReader {
    fn read_mesh<P: AsRef<Path>>(path: P) -> Result<TriangleMesh> {
        let path = path.as_ref();
        let ply = parse(path)?;

        let (vertices, colors) = read_vertices(&ply)?;

        let mut faces = Vec::new();
        for face in ply.payload.get("face").map(Vec::as_slice).unwrap_or_default() {
            let indices = extract_face_indices(face)?;
            if indices.len() < 3 {
                return Err(Error::InvalidData(format!(
                    "face with {} corners in {}",
                    indices.len(),
                    path.display()
                )));
            }
            for i in 1..indices.len() - 1 {
                faces.push([indices[0], indices[i], indices[i + 1]]);
            }
        }

        let mut mesh = TriangleMesh::from_vertices_and_faces(vertices, faces)?;
        if let Some(colors) = colors {
            mesh.set_colors(colors)?;
        }

        log::debug!(
            "read mesh with {} vertices and {} triangles from {}",
            mesh.vertex_count(),
            mesh.face_count(),
            path.display()
        );
        Ok(mesh)
    }
}

impl PointSetWriter for PlyWriter {
    fn write_point_set<P: AsRef<Path>>(set: &PointSet, path: P) -> Result<()> {
        let mut ply = Ply::<DefaultElement>::new();
        add_vertices(&mut ply, set.positions(), set.colors());
        write(&mut ply, path.as_ref())
    }
}

impl MeshWriter for PlyWriter {
    fn write_mesh<P: AsRef<Path>>(mesh: &TriangleMesh, path: P) -> Result<()> {
        let mut ply = Ply::<DefaultElement>::new();
        add_vertices(&mut ply, mesh.vertices(), mesh.colors());

        let mut face_element = ElementDef::new("face".to_string());
        face_element.count = mesh.face_count();
        face_element.properties.add(PropertyDef::new(
            "vertex_indices".to_string(),
            PropertyType::List(ScalarType::UChar, ScalarType::Int),
        ));
        ply.header.elements.add(face_element);

        let mut faces = Vec::with_capacity(mesh.face_count());
        for face in mesh.faces() {
            let indices = face
                .iter()
                .map(|&v| {
                    i32::try_from(v)
                        .map_err(|_| Error::InvalidArgument(format!("vertex index {} does not fit PLY int", v)))
                })
                .collect::<Result<Vec<_>>>()?;
            let mut element = DefaultElement::new();
            element.insert("vertex_indices".to_string(), Property::ListInt(indices));
            faces.push(element);
        }
        ply.payload.insert("face".to_string(), faces);

        write(&mut ply, path.as_ref())
    }
}

fn parse(path: &Path) -> Result<Ply<DefaultElement>> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);
    let parser = Parser::<DefaultElement>::new();
    Ok(parser.read_ply(&mut reader)?)
}

fn write(ply: &mut Ply<DefaultElement>, path: &Path) -> Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    let writer_instance = Writer::new();
    writer_instance.write_ply(&mut writer, ply)?;
    Ok(())
}

/// Positions and, when every channel is declared, colors of the `vertex` element
fn read_vertices(ply: &Ply<DefaultElement>) -> Result<(Vec<Point3f>, Option<Vec<Rgb>>)> {
    let vertices = ply.payload.get("vertex").map(Vec::as_slice).unwrap_or_default();

    let mut positions = Vec::with_capacity(vertices.len());
    for vertex in vertices {
        let x = extract_property_value(vertex, "x")?;
        let y = extract_property_value(vertex, "y")?;
        let z = extract_property_value(vertex, "z")?;
        positions.push(Point3f::new(x, y, z));
    }

    let has_colors = vertices
        .first()
        .is_some_and(|v| ["red", "green", "blue"].iter().all(|c| v.contains_key(*c)));
    if !has_colors {
        return Ok((positions, None));
    }

    let colors = vertices
        .iter()
        .map(|v| {
            Ok(Rgb::new(
                extract_color_channel(v, "red")?,
                extract_color_channel(v, "green")?,
                extract_color_channel(v, "blue")?,
            ))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok((positions, Some(colors)))
}

/// Declare and fill the `vertex` element, with `uchar` colors when given
fn add_vertices(ply: &mut Ply<DefaultElement>, positions: &[Point3f], colors: Option<&[Rgb]>) {
    let mut vertex_element = ElementDef::new("vertex".to_string());
    vertex_element.count = positions.len();
    for name in ["x", "y", "z"] {
        vertex_element.properties.add(PropertyDef::new(
            name.to_string(),
            PropertyType::Scalar(ScalarType::Float),
        ));
    }
    if colors.is_some() {
        for name in ["red", "green", "blue"] {
            vertex_element.properties.add(PropertyDef::new(
                name.to_string(),
                PropertyType::Scalar(ScalarType::UChar),
            ));
        }
    }
    ply.header.elements.add(vertex_element);

    let mut vertices = Vec::with_capacity(positions.len());
    for (i, point) in positions.iter().enumerate() {
        let mut vertex = DefaultElement::new();
        vertex.insert("x".to_string(), Property::Float(point.x));
        vertex.insert("y".to_string(), Property::Float(point.y));
        vertex.insert("z".to_string(), Property::Float(point.z));
        if let Some(color) = colors.and_then(|c| c.get(i)) {
            let [r, g, b] = color.to_u8();
            vertex.insert("red".to_string(), Property::UChar(r));
            vertex.insert("green".to_string(), Property::UChar(g));
            vertex.insert("blue".to_string(), Property::UChar(b));
        }
        vertices.push(vertex);
    }
    ply.payload.insert("vertex".to_string(), vertices);
}

/// Extract a property value as f32 from a PLY element
fn extract_property_value(element: &DefaultElement, name: &str) -> Result<f32> {
    match element.get(name) {
        Some(Property::Float(val)) => Ok(*val),
        Some(Property::Double(val)) => Ok(*val as f32),
        Some(Property::Int(val)) => Ok(*val as f32),
        Some(Property::UInt(val)) => Ok(*val as f32),
        Some(Property::Short(val)) => Ok(*val as f32),
        Some(Property::UShort(val)) => Ok(*val as f32),
        _ => Err(Error::InvalidData(format!(
            "Property '{}' not found or invalid type",
            name
        ))),
    }
}

/// Extract a color channel normalized to [0, 1]
fn extract_color_channel(element: &DefaultElement, name: &str) -> Result<f32> {
    match element.get(name) {
        Some(Property::UChar(val)) => Ok(*val as f32 / 255.0),
        Some(Property::UShort(val)) => Ok(*val as f32 / 65535.0),
        Some(Property::Float(val)) => Ok(*val),
        Some(Property::Double(val)) => Ok(*val as f32),
        _ => Err(Error::InvalidData(format!(
            "Color channel '{}' not found or invalid type",
            name
        ))),
    }
}

/// Extract face indices from a PLY face element
fn extract_face_indices(element: &DefaultElement) -> Result<Vec<usize>> {
    let negative = |idx: i32| Error::InvalidData(format!("negative vertex index {}", idx));
    match element.get("vertex_indices").or_else(|| element.get("vertex_index")) {
        Some(Property::ListInt(indices)) => indices
            .iter()
            .map(|&idx| usize::try_from(idx).map_err(|_| negative(idx)))
            .collect(),
        Some(Property::ListUInt(indices)) => Ok(indices.iter().map(|&idx| idx as usize).collect()),
        Some(Property::ListUShort(indices)) => Ok(indices.iter().map(|&idx| idx as usize).collect()),
        Some(Property::ListUChar(indices)) => Ok(indices.iter().map(|&idx| idx as usize).collect()),
        _ => Err(Error::InvalidData("Face indices not found".to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn write_temp(content: &str) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("input.ply");
        std::fs::write(&path, content).unwrap();
        (dir, path)
    }

    #[test]
    fn test_ascii_colored_cloud() {
        let (_dir, path) = write_temp(
            "ply
format ascii 1.0
element vertex 3
property float x
property float y
property float z
property uchar red
property uchar green
property uchar blue
end_header
0.0 0.0 0.0 255 0 0
1.0 0.5 0.0 0 255 0
-1.0 0.0 2.5 0 0 51
",
        );

        let set = PlyReader::read_point_set(&path).unwrap();
        assert_eq!(set.len(), 3);
        assert_eq!(set.positions()[2], Point3f::new(-1.0, 0.0, 2.5));

        let colors = set.colors().expect("colors should be read");
        assert_eq!(colors[0], Rgb::new(1.0, 0.0, 0.0));
        assert_eq!(colors[1], Rgb::new(0.0, 1.0, 0.0));
        assert_relative_eq!(colors[2].b, 0.2, epsilon = 1e-6);
    }

    #[test]
    fn test_ascii_positions_only() {
        let (_dir, path) = write_temp(
            "ply
format ascii 1.0
element vertex 2
property double x
property double y
property double z
end_header
0.25 0.5 0.75
1 2 3
",
        );

        let set = PlyReader::read_point_set(&path).unwrap();
        assert_eq!(set.len(), 2);
        assert!(!set.has_colors());
        assert_eq!(set.positions()[0], Point3f::new(0.25, 0.5, 0.75));
    }

    #[test]
    fn test_missing_coordinate_is_invalid_data() {
        let (_dir, path) = write_temp(
            "ply
format ascii 1.0
element vertex 1
property float x
property float y
end_header
0.0 1.0
",
        );

        let result = PlyReader::read_point_set(&path);
        assert!(matches!(result, Err(Error::InvalidData(_))));
    }

    #[test]
    fn test_ascii_mesh_fans_polygons() {
        let (_dir, path) = write_temp(
            "ply
format ascii 1.0
element vertex 4
property float x
property float y
property float z
element face 1
property list uchar int vertex_indices
end_header
0 0 0
1 0 0
1 1 0
0 1 0
4 0 1 2 3
",
        );

        let mesh = PlyReader::read_mesh(&path).unwrap();
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.faces(), &[[0, 1, 2], [0, 2, 3]]);
        assert!(!mesh.has_colors());
    }

    #[test]
    fn test_mesh_with_dangling_index_rejected() {
        let (_dir, path) = write_temp(
            "ply
format ascii 1.0
element vertex 3
property float x
property float y
property float z
element face 1
property list uchar int vertex_indices
end_header
0 0 0
1 0 0
1 1 0
3 0 1 7
",
        );

        assert!(matches!(PlyReader::read_mesh(&path), Err(Error::InvalidData(_))));
    }
}
