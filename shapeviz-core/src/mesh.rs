//! Triangle meshes used directly as focus objects

use crate::error::{Error, Result};
use crate::palette::ColorPalette;
use crate::point::*;
use crate::point_set::height_colors;
use crate::transform::Transform3D;
use serde::{Deserialize, Serialize};

/// A triangle mesh with optional per-vertex colors.
///
/// Every face index is below the vertex count and, when present, there is
/// exactly one color per vertex.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TriangleMeshRepr", into = "TriangleMeshRepr")]
pub struct TriangleMesh {
    vertices: Vec<Point3f>,
    faces: Vec<[usize; 3]>,
    colors: Option<Vec<Rgb>>,
}

#[derive(Serialize, Deserialize)]
struct TriangleMeshRepr {
    vertices: Vec<Point3f>,
    faces: Vec<[usize; 3]>,
    #[serde(default)]
    colors: Option<Vec<Rgb>>,
}

impl TryFrom<TriangleMeshRepr> for TriangleMesh {
    type Error = Error;

    fn try_from(repr: TriangleMeshRepr) -> Result<Self> {
        let mut mesh = Self::from_vertices_and_faces(repr.vertices, repr.faces)?;
        if let Some(colors) = repr.colors {
            mesh.set_colors(colors)?;
        }
        Ok(mesh)
    }
}

impl From<TriangleMesh> for TriangleMeshRepr {
    fn from(mesh: TriangleMesh) -> Self {
        Self { vertices: mesh.vertices, faces: mesh.faces, colors: mesh.colors }
    }
}

impl TriangleMesh {
    /// Create a new empty mesh
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mesh from vertices and faces. Fails if a face refers to a
    /// vertex that does not exist.
    pub fn from_vertices_and_faces(vertices: Vec<Point3f>, faces: Vec<[usize; 3]>) -> Result<Self> {
        if let Some((i, face)) = faces
            .iter()
            .enumerate()
            .find(|(_, face)| face.iter().any(|&v| v >= vertices.len()))
        {
            return Err(Error::InvalidData(format!(
                "face {} {:?} refers past the {} vertices",
                i,
                face,
                vertices.len()
            )));
        }
        Ok(Self { vertices, faces, colors: None })
    }

    /// Get the number of vertices
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Get the number of faces
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    pub fn vertices(&self) -> &[Point3f] {
        &self.vertices
    }

    pub fn faces(&self) -> &[[usize; 3]] {
        &self.faces
    }

    pub fn colors(&self) -> Option<&[Rgb]> {
        self.colors.as_deref()
    }

    pub fn has_colors(&self) -> bool {
        self.colors.is_some()
    }

    /// Attach per-vertex colors. Fails if the length differs from the vertices.
    pub fn set_colors(&mut self, colors: Vec<Rgb>) -> Result<()> {
        if colors.len() != self.vertices.len() {
            return Err(Error::InvalidArgument(format!(
                "expected {} vertex colors, got {}",
                self.vertices.len(),
                colors.len()
            )));
        }
        self.colors = Some(colors);
        Ok(())
    }

    /// Apply a transformation to all vertices
    pub fn transform(&mut self, transform: &Transform3D) {
        for vertex in &mut self.vertices {
            *vertex = transform.transform_point(vertex);
        }
    }

    /// Color every vertex by its height, the same way as
    /// [`PointSet::colorize_by_height`](crate::PointSet::colorize_by_height)
    pub fn colorize_by_height(&mut self, palette: &ColorPalette) -> Result<()> {
        self.colors = Some(height_colors(&self.vertices, palette)?);
        Ok(())
    }
}
