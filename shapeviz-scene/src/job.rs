//! Single-file render jobs: load, instance, describe, hand off

use crate::backend::RenderBackend;
use crate::config::RenderConfig;
use crate::scene::{FocusGeometry, SceneBuilder, SceneDescription};
use serde::{Deserialize, Serialize};
use shapeviz_core::{
    expand, expand_voxels, Error, InstanceBatch, Primitive, Result, Transform3D, TriangleMesh, Vector3f,
};
use std::path::{Path, PathBuf};

/// What a job's input file contains
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputKind {
    /// `.npz` occupancy grid, rendered as cubes
    Voxel,
    /// `.ply` point set, rendered as spheres
    Points,
    /// `.ply` triangle mesh, rendered as it is
    Mesh,
}

impl InputKind {
    /// File extension batch discovery looks for
    pub fn extension(self) -> &'static str {
        match self {
            InputKind::Voxel => "npz",
            InputKind::Points | InputKind::Mesh => "ply",
        }
    }
}

/// One input file and the image it should become
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderJob {
    pub input: PathBuf,
    pub output: PathBuf,
    pub kind: InputKind,
}

/// Result of a finished job
#[derive(Debug, Clone, PartialEq)]
pub struct JobOutcome {
    pub input: PathBuf,
    pub output: PathBuf,
    /// Instances placed, or mesh triangles
    pub elements: usize,
}

impl RenderJob {
    /// Job rendering `input` to `out_dir/<stem>.<format>`
    pub fn new<P: Into<PathBuf>>(input: P, out_dir: &Path, kind: InputKind, format: &str) -> Result<Self> {
        let input = input.into();
        let stem = input
            .file_stem()
            .ok_or_else(|| Error::InvalidArgument(format!("input {} has no file name", input.display())))?;
        let output = out_dir.join(format!("{}.{}", stem.to_string_lossy(), format));
        Ok(Self { input, output, kind })
    }

    /// Load the input and build the focus geometry for it
    pub fn load_focus(&self, config: &RenderConfig) -> Result<FocusGeometry> {
        match self.kind {
            InputKind::Voxel => voxel_instances(&self.input, config).map(FocusGeometry::from),
            InputKind::Points => point_instances(&self.input, config).map(FocusGeometry::from),
            InputKind::Mesh => load_mesh(&self.input, config).map(FocusGeometry::from),
        }
    }

    /// Build the full scene description without rendering it
    pub fn plan(&self, config: &RenderConfig) -> Result<SceneDescription> {
        let geometry = self.load_focus(config)?;
        SceneBuilder::new(config).focus(geometry).output(&self.output).build()
    }

    /// Plan the scene and hand it to `backend`
    pub fn run(&self, config: &RenderConfig, backend: &dyn RenderBackend) -> Result<JobOutcome> {
        let scene = self.plan(config)?;
        backend.render(&scene)?;
        let elements = scene.focus.geometry.len();
        log::info!(
            "{} -> {} via {} ({} elements)",
            self.input.display(),
            self.output.display(),
            backend.name(),
            elements
        );
        Ok(JobOutcome {
            input: self.input.clone(),
            output: self.output.clone(),
            elements,
        })
    }
}

fn voxel_instances(path: &Path, config: &RenderConfig) -> Result<InstanceBatch> {
    let object = &config.object;
    let grid = shapeviz_io::read_occupancy(path)?;
    let offset = Vector3f::from(object.offset);

    match &object.palette {
        Some(palette) => {
            let palette = palette.resolve()?;
            let mut centers = grid.sample(offset, object.scale)?.to_point_set();
            centers.colorize_by_height(&palette)?;
            expand(&centers, object.radius, Primitive::Cube, object.subdivision)
        }
        None => expand_voxels(&grid, offset, object.scale, object.radius, object.subdivision),
    }
}

fn point_instances(path: &Path, config: &RenderConfig) -> Result<InstanceBatch> {
    let object = &config.object;
    let mut points = shapeviz_io::read_point_set(path)?;

    if object.axis_remap {
        points.transform(&Transform3D::y_up_to_z_up());
    }
    if let Some(palette) = &object.palette {
        if !points.has_colors() {
            points.colorize_by_height(&palette.resolve()?)?;
        }
    }

    expand(&points, object.radius, Primitive::Sphere, object.subdivision)
}

fn load_mesh(path: &Path, config: &RenderConfig) -> Result<TriangleMesh> {
    let object = &config.object;
    let mut mesh = shapeviz_io::read_mesh(path)?;

    if object.axis_remap {
        mesh.transform(&Transform3D::y_up_to_z_up());
    }
    if let Some(palette) = &object.palette {
        if !mesh.has_colors() {
            mesh.colorize_by_height(&palette.resolve()?)?;
        }
    }
    Ok(mesh)
}
