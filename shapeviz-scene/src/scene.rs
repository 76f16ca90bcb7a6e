//! Explicit scene construction
//!
//! A [`SceneBuilder`] collects the focus geometry and output path for one
//! render and turns them, together with a [`RenderConfig`], into a
//! self-contained [`SceneDescription`]. Nothing here touches global state;
//! the description is the whole hand-off to the renderer.

use crate::config::{LightKind, RenderConfig, RenderSettings};
use serde::{Deserialize, Serialize};
use shapeviz_core::{Aabb, Bounded, Error, InstanceBatch, Point3f, Result, Transform3D, TriangleMesh};
use std::path::PathBuf;

/// Name given to the focus object, which the camera tracks
pub const FOCUS_OBJECT_NAME: &str = "object";

/// Vertex attribute carrying per-instance colors
pub const COLOR_ATTRIBUTE: &str = "Col";

/// What the focus object is made of
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum FocusGeometry {
    /// One primitive per record, built by the renderer
    Instances(InstanceBatch),
    /// A mesh imported as it is
    Mesh(TriangleMesh),
}

impl FocusGeometry {
    /// Instances placed, or triangles in the mesh
    pub fn len(&self) -> usize {
        match self {
            FocusGeometry::Instances(batch) => batch.len(),
            FocusGeometry::Mesh(mesh) => mesh.face_count(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn has_colors(&self) -> bool {
        match self {
            FocusGeometry::Instances(batch) => batch.has_colors(),
            FocusGeometry::Mesh(mesh) => mesh.has_colors(),
        }
    }
}

impl Bounded for FocusGeometry {
    fn bounding_box(&self) -> Aabb {
        match self {
            FocusGeometry::Instances(batch) => batch.bounding_box(),
            FocusGeometry::Mesh(mesh) => mesh.bounding_box(),
        }
    }
}

impl From<InstanceBatch> for FocusGeometry {
    fn from(batch: InstanceBatch) -> Self {
        FocusGeometry::Instances(batch)
    }
}

impl From<TriangleMesh> for FocusGeometry {
    fn from(mesh: TriangleMesh) -> Self {
        FocusGeometry::Mesh(mesh)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FocusObject {
    pub name: String,
    pub geometry: FocusGeometry,
    pub rotation_deg: [f32; 3],
    /// Bounds of the geometry before rotation
    pub bounds: Aabb,
}

impl FocusObject {
    pub fn instances(&self) -> Option<&InstanceBatch> {
        match &self.geometry {
            FocusGeometry::Instances(batch) => Some(batch),
            FocusGeometry::Mesh(_) => None,
        }
    }

    pub fn mesh(&self) -> Option<&TriangleMesh> {
        match &self.geometry {
            FocusGeometry::Mesh(mesh) => Some(mesh),
            FocusGeometry::Instances(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Material {
    /// Single principled BSDF with a flat base color
    Principled { base_color: [f32; 4] },
    /// Principled BSDF whose base color reads a per-vertex attribute
    VertexColor { attribute: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub location: Point3f,
    pub lens: f32,
    /// Point the camera is constrained to look at
    pub track_to: Point3f,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Light {
    pub kind: LightKind,
    pub location: Point3f,
    pub rotation_deg: [f32; 3],
    pub energy: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroundPlane {
    pub size: f32,
    pub location: Point3f,
    pub shadow_only: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderOutput {
    pub settings: RenderSettings,
    pub output: PathBuf,
}

/// Everything an external renderer needs to produce one still image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneDescription {
    pub focus: FocusObject,
    pub material: Material,
    pub camera: Camera,
    pub light: Light,
    pub ground_plane: Option<GroundPlane>,
    pub render: RenderOutput,
}

impl SceneDescription {
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::Render(e.to_string()))
    }

    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| Error::InvalidData(e.to_string()))
    }
}

/// Builds a [`SceneDescription`] from a config, a focus object and an output path
#[derive(Debug, Clone)]
pub struct SceneBuilder<'a> {
    config: &'a RenderConfig,
    focus: Option<FocusGeometry>,
    output: Option<PathBuf>,
}

impl<'a> SceneBuilder<'a> {
    pub fn new(config: &'a RenderConfig) -> Self {
        Self { config, focus: None, output: None }
    }

    /// Set the instances or mesh making up the focus object
    pub fn focus<G: Into<FocusGeometry>>(mut self, geometry: G) -> Self {
        self.focus = Some(geometry.into());
        self
    }

    /// Set the image path the renderer writes to
    pub fn output<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.output = Some(path.into());
        self
    }

    pub fn build(self) -> Result<SceneDescription> {
        let config = self.config;
        config.validate()?;

        let geometry = self
            .focus
            .ok_or_else(|| Error::InvalidArgument("scene has no focus object".to_string()))?;
        let output = self
            .output
            .ok_or_else(|| Error::InvalidArgument("scene has no output path".to_string()))?;

        let bounds = geometry.bounding_box();
        let rotation = Transform3D::from_euler_degrees(config.object.rotation_deg);

        let material = if geometry.has_colors() && config.object.use_color {
            Material::VertexColor { attribute: COLOR_ATTRIBUTE.to_string() }
        } else {
            Material::Principled { base_color: config.object.base_color }
        };

        let camera = Camera {
            location: Point3f::from(config.camera.location),
            lens: config.camera.lens,
            track_to: rotation.transform_point(&bounds.center()),
        };

        let light = Light {
            kind: config.light.kind,
            location: Point3f::from(config.light.location),
            rotation_deg: config.light.rotation_deg,
            energy: config.light.energy,
        };

        let ground_plane = config.plane.enabled.then(|| {
            let z = bounds.dimensions().z * 0.5 + config.plane.margin;
            GroundPlane {
                size: config.plane.size,
                location: Point3f::new(0.0, 0.0, -z),
                shadow_only: config.plane.shadow_only,
            }
        });

        match &geometry {
            FocusGeometry::Instances(batch) => log::debug!(
                "built scene: {} {:?} instances, material {:?}, plane {}",
                batch.len(),
                batch.primitive,
                material,
                ground_plane.is_some()
            ),
            FocusGeometry::Mesh(mesh) => log::debug!(
                "built scene: mesh with {} triangles, material {:?}, plane {}",
                mesh.face_count(),
                material,
                ground_plane.is_some()
            ),
        }

        Ok(SceneDescription {
            focus: FocusObject {
                name: FOCUS_OBJECT_NAME.to_string(),
                geometry,
                rotation_deg: config.object.rotation_deg,
                bounds,
            },
            material,
            camera,
            light,
            ground_plane,
            render: RenderOutput { settings: config.render.clone(), output },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use shapeviz_core::{expand, PointSet, Primitive, Rgb, Vector3f};

    fn two_point_batch(colored: bool) -> InstanceBatch {
        let positions = vec![Point3f::new(0.0, 0.0, -0.5), Point3f::new(0.0, 0.0, 0.5)];
        let set = if colored {
            PointSet::from_colored_points(positions, vec![Rgb::WHITE, Rgb::BLACK]).unwrap()
        } else {
            PointSet::from_points(positions)
        };
        expand(&set, 0.25, Primitive::Sphere, 1).unwrap()
    }

    #[test]
    fn test_plane_sits_below_object() {
        let mut config = RenderConfig::voxel();
        config.plane.margin = 0.1;
        let scene = SceneBuilder::new(&config)
            .focus(two_point_batch(false))
            .output("render.png")
            .build()
            .unwrap();

        // z extent is 1.0 + 2 * 0.25
        let plane = scene.ground_plane.unwrap();
        assert_relative_eq!(plane.location.z, -(0.75 + 0.1));
        assert!(plane.shadow_only);
        assert_eq!(scene.focus.name, FOCUS_OBJECT_NAME);
    }

    #[test]
    fn test_material_selection() {
        let config = RenderConfig::point_cloud();
        let colored = SceneBuilder::new(&config)
            .focus(two_point_batch(true))
            .output("a.png")
            .build()
            .unwrap();
        assert_eq!(colored.material, Material::VertexColor { attribute: "Col".to_string() });

        let plain = SceneBuilder::new(&config)
            .focus(two_point_batch(false))
            .output("a.png")
            .build()
            .unwrap();
        assert_eq!(plain.material, Material::Principled { base_color: [1.0, 0.0, 0.0, 1.0] });

        let mut no_color = config.clone();
        no_color.object.use_color = false;
        let forced = SceneBuilder::new(&no_color)
            .focus(two_point_batch(true))
            .output("a.png")
            .build()
            .unwrap();
        assert!(matches!(forced.material, Material::Principled { .. }));
    }

    #[test]
    fn test_camera_tracks_focus_center() {
        let config = RenderConfig::point_cloud();
        let scene = SceneBuilder::new(&config)
            .focus(two_point_batch(false))
            .output("a.png")
            .build()
            .unwrap();
        assert_relative_eq!(scene.camera.track_to, Point3f::origin(), epsilon = 1e-6);
        assert_eq!(scene.camera.location, Point3f::new(0.0, 4.0, 1.0));
        assert!(scene.ground_plane.is_none());
    }

    #[test]
    fn test_missing_parts_rejected() {
        let config = RenderConfig::voxel();
        let no_focus = SceneBuilder::new(&config).output("a.png").build();
        assert!(matches!(no_focus, Err(Error::InvalidArgument(_))));

        let no_output = SceneBuilder::new(&config).focus(two_point_batch(false)).build();
        assert!(matches!(no_output, Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_mesh_focus() {
        let mesh = TriangleMesh::from_vertices_and_faces(
            vec![Point3f::new(-1.0, 0.0, -0.5), Point3f::new(1.0, 0.0, -0.5), Point3f::new(0.0, 1.0, 0.5)],
            vec![[0, 1, 2]],
        )
        .unwrap();

        let config = RenderConfig::mesh();
        let scene = SceneBuilder::new(&config).focus(mesh.clone()).output("chair.png").build().unwrap();

        assert_eq!(scene.focus.mesh(), Some(&mesh));
        assert!(scene.focus.instances().is_none());
        assert_eq!(scene.focus.geometry.len(), 1);
        assert_relative_eq!(scene.focus.bounds.dimensions(), Vector3f::new(2.0, 1.0, 1.0));
        assert!(matches!(scene.material, Material::Principled { .. }));

        // half the z extent plus the 0.1 margin
        let plane = scene.ground_plane.as_ref().unwrap();
        assert_relative_eq!(plane.location.z, -0.6, epsilon = 1e-6);
        assert_relative_eq!(plane.size, 1.0);

        let json = SceneDescription::from_json(&scene.to_json().unwrap()).unwrap();
        assert_eq!(json.focus.mesh(), Some(&mesh));
    }

    #[test]
    fn test_json_handoff() {
        let config = RenderConfig::voxel();
        let scene = SceneBuilder::new(&config)
            .focus(two_point_batch(true))
            .output("out/chair.png")
            .build()
            .unwrap();

        let json = scene.to_json().unwrap();
        assert!(json.contains("\"type\": \"vertex_color\""));
        assert!(json.contains("\"primitive\": \"sphere\""));
        assert!(json.contains("\"kind\": \"instances\""));
        assert_eq!(SceneDescription::from_json(&json).unwrap(), scene);
    }
}
