//! Point set container with optional per-point colors

use crate::error::{Error, Result};
use crate::palette::ColorPalette;
use crate::point::*;
use crate::transform::Transform3D;
use serde::{Deserialize, Serialize};

/// An ordered set of points, optionally paired one-to-one with colors.
///
/// When `colors` is present, `colors[i]` belongs to `positions[i]`. Every
/// constructor and mutator keeps the two vectors the same length, and so
/// does deserialization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "PointSetRepr", into = "PointSetRepr")]
pub struct PointSet {
    positions: Vec<Point3f>,
    colors: Option<Vec<Rgb>>,
}

/// Unchecked serialized form of [`PointSet`]
#[derive(Serialize, Deserialize)]
struct PointSetRepr {
    positions: Vec<Point3f>,
    #[serde(default)]
    colors: Option<Vec<Rgb>>,
}

impl TryFrom<PointSetRepr> for PointSet {
    type Error = Error;

    fn try_from(repr: PointSetRepr) -> Result<Self> {
        match repr.colors {
            Some(colors) => Self::from_colored_points(repr.positions, colors),
            None => Ok(Self::from_points(repr.positions)),
        }
    }
}

impl From<PointSet> for PointSetRepr {
    fn from(set: PointSet) -> Self {
        Self { positions: set.positions, colors: set.colors }
    }
}

impl PointSet {
    /// Create a new empty point set without colors
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a point set from positions only
    pub fn from_points(positions: Vec<Point3f>) -> Self {
        Self { positions, colors: None }
    }

    /// Create a colored point set. Fails if the lengths differ.
    pub fn from_colored_points(positions: Vec<Point3f>, colors: Vec<Rgb>) -> Result<Self> {
        if positions.len() != colors.len() {
            return Err(Error::InvalidArgument(format!(
                "point set has {} positions but {} colors",
                positions.len(),
                colors.len()
            )));
        }
        Ok(Self { positions, colors: Some(colors) })
    }

    /// Get the number of points in the set
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Check if the point set is empty
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn positions(&self) -> &[Point3f] {
        &self.positions
    }

    pub fn colors(&self) -> Option<&[Rgb]> {
        self.colors.as_deref()
    }

    pub fn has_colors(&self) -> bool {
        self.colors.is_some()
    }

    /// Replace (or attach) the colors. Fails if the length differs from the positions.
    pub fn set_colors(&mut self, colors: Vec<Rgb>) -> Result<()> {
        if colors.len() != self.positions.len() {
            return Err(Error::InvalidArgument(format!(
                "expected {} colors, got {}",
                self.positions.len(),
                colors.len()
            )));
        }
        self.colors = Some(colors);
        Ok(())
    }

    /// Drop the colors, keeping positions
    pub fn clear_colors(&mut self) {
        self.colors = None;
    }

    /// Iterate over `(position, color)` pairs in input order
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (Point3f, Option<Rgb>)> + '_ {
        self.positions
            .iter()
            .enumerate()
            .map(move |(i, p)| (*p, self.colors.as_ref().map(|c| c[i])))
    }

    /// Apply a transformation to all positions. Colors are untouched.
    pub fn transform(&mut self, transform: &Transform3D) {
        for point in &mut self.positions {
            *point = transform.transform_point(point);
        }
    }

    /// Color every point by its height, mapping the z range of the set onto
    /// `[0, 1]` and interpolating across `palette`.
    ///
    /// A flat set (zero z extent) takes the first anchor everywhere.
    pub fn colorize_by_height(&mut self, palette: &ColorPalette) -> Result<()> {
        self.colors = Some(height_colors(&self.positions, palette)?);
        Ok(())
    }
}

/// One palette color per position, by normalized height
pub(crate) fn height_colors(positions: &[Point3f], palette: &ColorPalette) -> Result<Vec<Rgb>> {
    let (min_z, max_z) = positions
        .iter()
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), p| (lo.min(p.z), hi.max(p.z)));
    let extent = max_z - min_z;

    positions
        .iter()
        .map(|p| {
            let t = if extent > 0.0 { ((p.z - min_z) / extent).clamp(0.0, 1.0) } else { 0.0 };
            palette.interpolate(t)
        })
        .collect()
}

impl FromIterator<Point3f> for PointSet {
    fn from_iter<I: IntoIterator<Item = Point3f>>(iter: I) -> Self {
        Self::from_points(Vec::from_iter(iter))
    }
}
