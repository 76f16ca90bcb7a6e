//! Piecewise-linear color palettes

use crate::error::{Error, Result};
use crate::point::Rgb;
use serde::{Deserialize, Serialize};

/// An ordered list of at least two anchor colors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Rgb>", into = "Vec<Rgb>")]
pub struct ColorPalette {
    anchors: Vec<Rgb>,
}

impl ColorPalette {
    /// Create a palette, failing if fewer than two anchors are given
    pub fn new(anchors: Vec<Rgb>) -> Result<Self> {
        check_len(anchors.len())?;
        Ok(Self { anchors })
    }

    pub fn anchors(&self) -> &[Rgb] {
        &self.anchors
    }

    pub fn len(&self) -> usize {
        self.anchors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.anchors.is_empty()
    }

    /// See [`interpolate`]
    pub fn interpolate(&self, t: f32) -> Result<Rgb> {
        interpolate(&self.anchors, t)
    }

    /// Look up one of the built-in palettes by name
    pub fn named(name: &str) -> Option<Self> {
        match name {
            "viridis" => Some(Self::viridis()),
            "coolwarm" => Some(Self::coolwarm()),
            "rainbow" => Some(Self::rainbow()),
            _ => None,
        }
    }

    pub fn viridis() -> Self {
        Self::from_static(&[
            [0.267, 0.004, 0.329],
            [0.282, 0.140, 0.457],
            [0.253, 0.265, 0.529],
            [0.206, 0.371, 0.553],
            [0.163, 0.471, 0.558],
            [0.127, 0.566, 0.550],
            [0.134, 0.658, 0.517],
            [0.266, 0.749, 0.440],
            [0.477, 0.821, 0.318],
            [0.741, 0.873, 0.150],
            [0.993, 0.906, 0.144],
        ])
    }

    pub fn coolwarm() -> Self {
        Self::from_static(&[
            [0.230, 0.299, 0.754],
            [0.552, 0.690, 0.996],
            [0.866, 0.866, 0.866],
            [0.956, 0.604, 0.486],
            [0.706, 0.016, 0.150],
        ])
    }

    pub fn rainbow() -> Self {
        Self::from_static(&[
            [0.5, 0.0, 1.0],
            [0.0, 0.0, 1.0],
            [0.0, 1.0, 1.0],
            [0.0, 1.0, 0.0],
            [1.0, 1.0, 0.0],
            [1.0, 0.0, 0.0],
        ])
    }

    // Built-in tables always have at least two anchors.
    fn from_static(table: &[[f32; 3]]) -> Self {
        Self { anchors: table.iter().copied().map(Rgb::from).collect() }
    }
}

impl TryFrom<Vec<Rgb>> for ColorPalette {
    type Error = Error;

    fn try_from(anchors: Vec<Rgb>) -> Result<Self> {
        Self::new(anchors)
    }
}

impl From<ColorPalette> for Vec<Rgb> {
    fn from(palette: ColorPalette) -> Self {
        palette.anchors
    }
}

/// Map `t` to a color by linear interpolation across `anchors`.
///
/// With `n` anchors, `a = t * (n - 1)`, `lo = floor(a)` and the result is
/// `(1 - frac) * anchors[lo] + frac * anchors[hi]`. `t` is not clamped:
/// if `lo` falls outside `[0, n - 2]` the call fails with
/// [`Error::OutOfRange`], except at `a == n - 1` which returns the last
/// anchor exactly.
pub fn interpolate(anchors: &[Rgb], t: f32) -> Result<Rgb> {
    check_len(anchors.len())?;

    let last = anchors.len() - 1;
    let a = t * last as f32;
    if a == last as f32 {
        return Ok(anchors[last]);
    }

    let lo = a.floor();
    if !(lo >= 0.0 && lo <= (last - 1) as f32) {
        return Err(Error::OutOfRange(format!(
            "t = {} maps to anchor {} of a {}-color palette",
            t,
            lo,
            anchors.len()
        )));
    }

    let lo_idx = lo as usize;
    let hi_idx = (a.ceil() as usize).min(last);
    let frac = a - lo;
    Ok(anchors[lo_idx].lerp(anchors[hi_idx], frac))
}

fn check_len(len: usize) -> Result<()> {
    if len < 2 {
        return Err(Error::InvalidArgument(format!(
            "a palette needs at least 2 anchor colors, got {}",
            len
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn rgb_palette() -> Vec<Rgb> {
        vec![Rgb::new(1.0, 0.0, 0.0), Rgb::new(0.0, 1.0, 0.0), Rgb::new(0.0, 0.0, 1.0)]
    }

    #[test]
    fn test_anchor_hits_are_exact() {
        let p = rgb_palette();
        assert_eq!(interpolate(&p, 0.0).unwrap(), Rgb::new(1.0, 0.0, 0.0));
        assert_eq!(interpolate(&p, 0.5).unwrap(), Rgb::new(0.0, 1.0, 0.0));
        assert_eq!(interpolate(&p, 1.0).unwrap(), Rgb::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn test_midway_blend() {
        let c = interpolate(&rgb_palette(), 0.25).unwrap();
        assert_relative_eq!(c.r, 0.5);
        assert_relative_eq!(c.g, 0.5);
        assert_relative_eq!(c.b, 0.0);

        let c = interpolate(&rgb_palette(), 0.875).unwrap();
        assert_relative_eq!(c.g, 0.25);
        assert_relative_eq!(c.b, 0.75);
    }

    #[test]
    fn test_short_palette_rejected() {
        assert!(matches!(interpolate(&[Rgb::WHITE], 0.5), Err(Error::InvalidArgument(_))));
        assert!(matches!(interpolate(&[], 0.0), Err(Error::InvalidArgument(_))));
        assert!(matches!(ColorPalette::new(vec![Rgb::BLACK]), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_out_of_range() {
        let p = rgb_palette();
        assert!(matches!(interpolate(&p, -0.1), Err(Error::OutOfRange(_))));
        assert!(matches!(interpolate(&p, 1.2), Err(Error::OutOfRange(_))));
        assert!(matches!(interpolate(&p, f32::NAN), Err(Error::OutOfRange(_))));
    }

    #[test]
    fn test_named_palettes() {
        for name in ["viridis", "coolwarm", "rainbow"] {
            let palette = ColorPalette::named(name).unwrap();
            assert!(palette.len() >= 2);
            assert_eq!(palette.interpolate(0.0).unwrap(), palette.anchors()[0]);
            assert_eq!(palette.interpolate(1.0).unwrap(), *palette.anchors().last().unwrap());
        }
        assert!(ColorPalette::named("plasma").is_none());
    }
}
