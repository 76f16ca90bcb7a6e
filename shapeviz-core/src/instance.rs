//! Point/voxel-to-instance expansion
//!
//! Scale convention: `scale` is the radius of the base primitive. The cube
//! primitive is the unit cube with vertices at ±1 (so `scale` is its
//! half-extent) and the sphere primitive is the unit sphere, so every
//! instance spans `center ± scale` on each axis.

use crate::error::{Error, Result};
use crate::occupancy::OccupancyGrid;
use crate::point::{Point3f, Rgb, Vector3f};
use crate::point_set::PointSet;
use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

/// Base shape every instance is a scaled copy of
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Primitive {
    Cube,
    Sphere,
}

/// One placed copy of the base primitive
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InstanceRecord {
    pub center: Point3f,
    pub scale: f32,
    pub color: Option<Rgb>,
}

/// GPU-friendly packing of an [`InstanceRecord`].
///
/// `position_scale` is `[x, y, z, scale]`. `color` is RGBA with alpha 0
/// when the record has no color.
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct RawInstance {
    pub position_scale: [f32; 4],
    pub color: [f32; 4],
}

impl From<&InstanceRecord> for RawInstance {
    fn from(record: &InstanceRecord) -> Self {
        let c = record.center;
        Self {
            position_scale: [c.x, c.y, c.z, record.scale],
            color: match record.color {
                Some(rgb) => rgb.with_alpha(1.0),
                None => [0.0; 4],
            },
        }
    }
}

/// Ordered instance records plus the metadata the renderer needs to build
/// the base primitive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstanceBatch {
    pub records: Vec<InstanceRecord>,
    pub primitive: Primitive,
    /// How many times the renderer should subdivide the base primitive.
    /// Carried through untouched.
    pub subdivision: u32,
}

impl InstanceBatch {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, InstanceRecord> {
        self.records.iter()
    }

    /// True if any record carries a color
    pub fn has_colors(&self) -> bool {
        self.records.iter().any(|r| r.color.is_some())
    }

    /// Pack the records for upload as an instance buffer
    pub fn to_raw(&self) -> Vec<RawInstance> {
        self.records.iter().map(RawInstance::from).collect()
    }

    /// Raw bytes of [`to_raw`](Self::to_raw)
    pub fn to_bytes(&self) -> Vec<u8> {
        bytemuck::cast_slice(&self.to_raw()).to_vec()
    }
}

impl<'a> IntoIterator for &'a InstanceBatch {
    type Item = &'a InstanceRecord;
    type IntoIter = std::slice::Iter<'a, InstanceRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Expand every point into one instance of `primitive` with `scale = radius`.
///
/// The i-th record corresponds to the i-th point, including its color.
/// An empty point set gives an empty batch.
pub fn expand(points: &PointSet, radius: f32, primitive: Primitive, subdivision: u32) -> Result<InstanceBatch> {
    check_radius(radius)?;

    let records: Vec<InstanceRecord> = points
        .iter()
        .map(|(center, color)| InstanceRecord { center, scale: radius, color })
        .collect();

    log::debug!(
        "expanded {} points into {:?} instances (radius {}, subdivision {})",
        records.len(),
        primitive,
        radius,
        subdivision
    );

    Ok(InstanceBatch { records, primitive, subdivision })
}

/// Sample the occupied voxels of `grid` and expand them into cubes.
pub fn expand_voxels(
    grid: &OccupancyGrid,
    offset: Vector3f,
    scale: f32,
    radius: f32,
    subdivision: u32,
) -> Result<InstanceBatch> {
    check_radius(radius)?;
    let sampler = grid.sample(offset, scale)?;

    let records: Vec<InstanceRecord> = sampler
        .centers()
        .map(|center| InstanceRecord { center, scale: radius, color: None })
        .collect();

    log::debug!(
        "expanded {} of {} voxels into cubes",
        records.len(),
        grid.shape().0 * grid.shape().1 * grid.shape().2
    );

    Ok(InstanceBatch { records, primitive: Primitive::Cube, subdivision })
}

fn check_radius(radius: f32) -> Result<()> {
    if !radius.is_finite() || radius < 0.0 {
        return Err(Error::InvalidArgument(format!(
            "instance radius must be finite and non-negative, got {}",
            radius
        )));
    }
    Ok(())
}
