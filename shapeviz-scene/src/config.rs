//! Render configuration
//!
//! Loaded from TOML. Every table and field is optional; missing values
//! fall back to the voxel preset.
//!
//! ```toml
//! [render]
//! num_samples = 100
//! devices = [0]
//!
//! [object]
//! radius = 0.017
//! subdivision = 1
//! palette = "viridis"
//! ```

use serde::{Deserialize, Serialize};
use shapeviz_core::{ColorPalette, Error, Result, Rgb};
use std::path::Path;

/// Complete configuration for one render job
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderConfig {
    pub render: RenderSettings,
    pub camera: CameraConfig,
    pub light: LightConfig,
    pub object: ObjectConfig,
    pub plane: PlaneConfig,
}

/// Output and sampling settings handed to the renderer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderSettings {
    pub resolution_x: u32,
    pub resolution_y: u32,
    pub resolution_percentage: u32,
    pub num_samples: u32,
    pub use_adaptive_sampling: bool,
    pub use_denoiser: bool,
    pub transparent_background: bool,
    /// GPU ordinals to render on; empty means every available device
    pub devices: Vec<usize>,
    /// Image format, also used as the output file extension
    pub format: String,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            resolution_x: 800,
            resolution_y: 800,
            resolution_percentage: 100,
            num_samples: 500,
            use_adaptive_sampling: false,
            use_denoiser: true,
            transparent_background: true,
            devices: Vec::new(),
            format: "png".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CameraConfig {
    pub location: [f32; 3],
    /// Focal length in millimetres
    pub lens: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self { location: [0.0, 3.0, 1.0], lens: 85.0 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LightKind {
    Sun,
    Area,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LightConfig {
    pub kind: LightKind,
    pub location: [f32; 3],
    pub rotation_deg: [f32; 3],
    pub energy: f32,
}

impl Default for LightConfig {
    fn default() -> Self {
        Self {
            kind: LightKind::Area,
            location: [0.0, 0.0, 1.0],
            rotation_deg: [0.0; 3],
            energy: 25.0,
        }
    }
}

/// Either a built-in palette name or an explicit list of anchors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PaletteSpec {
    Named(String),
    Anchors(Vec<[f32; 3]>),
}

impl PaletteSpec {
    pub fn resolve(&self) -> Result<ColorPalette> {
        match self {
            PaletteSpec::Named(name) => ColorPalette::named(name)
                .ok_or_else(|| Error::Config(format!("unknown palette '{}'", name))),
            PaletteSpec::Anchors(anchors) => {
                ColorPalette::new(anchors.iter().copied().map(Rgb::from).collect())
            }
        }
    }
}

/// How the focus object is built and placed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ObjectConfig {
    pub rotation_deg: [f32; 3],
    /// RGBA color of the principled material
    pub base_color: [f32; 4],
    /// Instance radius (cube half-extent or sphere radius)
    pub radius: f32,
    pub subdivision: u32,
    /// Voxel grids only: world-space center of the grid
    pub offset: [f32; 3],
    /// Voxel grids only: side length of the grid cube
    pub scale: f32,
    /// Shade with per-point colors when the input has them
    pub use_color: bool,
    /// Point sets and meshes: convert Y-up input to Z-up
    pub axis_remap: bool,
    /// Color instances by height through this palette
    pub palette: Option<PaletteSpec>,
}

impl Default for ObjectConfig {
    fn default() -> Self {
        Self {
            rotation_deg: [0.0, 0.0, 54.0],
            base_color: [0.0, 1.0, 0.0, 1.0],
            radius: 0.0125 / 2.0,
            subdivision: 0,
            offset: [0.0; 3],
            scale: 1.0,
            use_color: true,
            axis_remap: false,
            palette: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlaneConfig {
    pub enabled: bool,
    pub size: f32,
    /// The plane only catches shadows and is otherwise invisible
    pub shadow_only: bool,
    /// Extra gap between the object's lower half-extent and the plane
    pub margin: f32,
}

impl Default for PlaneConfig {
    fn default() -> Self {
        Self { enabled: true, size: 100.0, shadow_only: true, margin: 0.0 }
    }
}

impl RenderConfig {
    /// Defaults for voxel occupancy renders
    pub fn voxel() -> Self {
        Self::default()
    }

    /// Defaults for point cloud renders: small spheres, sun light, no plane
    pub fn point_cloud() -> Self {
        Self {
            render: RenderSettings { num_samples: 100, ..RenderSettings::default() },
            camera: CameraConfig { location: [0.0, 4.0, 1.0], lens: 85.0 },
            light: LightConfig {
                kind: LightKind::Sun,
                location: [0.0, 0.0, 2.0],
                rotation_deg: [0.0; 3],
                energy: 3.0,
            },
            object: ObjectConfig {
                base_color: [1.0, 0.0, 0.0, 1.0],
                radius: 0.01,
                subdivision: 1,
                ..ObjectConfig::default()
            },
            plane: PlaneConfig { enabled: false, shadow_only: false, margin: 0.1, ..PlaneConfig::default() },
        }
    }

    /// Defaults for mesh renders: the point cloud camera and light with a
    /// small plane just below the mesh
    pub fn mesh() -> Self {
        Self {
            object: ObjectConfig::default(),
            plane: PlaneConfig { enabled: true, size: 1.0, shadow_only: true, margin: 0.1 },
            ..Self::point_cloud()
        }
    }

    /// Parse and validate a TOML document
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&text)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        log::debug!("loaded render config from {}", path.display());
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::Config(e.to_string()))
    }

    /// Reject settings the renderer cannot honor
    pub fn validate(&self) -> Result<()> {
        let r = &self.render;
        if !r.use_adaptive_sampling && r.num_samples == 0 {
            return Err(Error::InvalidArgument(
                "adaptive sampling is disabled but num_samples is zero".to_string(),
            ));
        }
        if r.resolution_x == 0 || r.resolution_y == 0 || r.resolution_percentage == 0 {
            return Err(Error::InvalidArgument(format!(
                "resolution must be non-zero, got {}x{} at {}%",
                r.resolution_x, r.resolution_y, r.resolution_percentage
            )));
        }
        if r.format.is_empty() {
            return Err(Error::InvalidArgument("image format must not be empty".to_string()));
        }
        if !(self.camera.lens > 0.0) {
            return Err(Error::InvalidArgument(format!(
                "camera lens must be positive, got {}",
                self.camera.lens
            )));
        }
        let o = &self.object;
        if !o.radius.is_finite() || o.radius < 0.0 {
            return Err(Error::InvalidArgument(format!("invalid instance radius {}", o.radius)));
        }
        if !(o.scale > 0.0) || !o.scale.is_finite() {
            return Err(Error::InvalidArgument(format!("invalid grid scale {}", o.scale)));
        }
        if let Some(palette) = &o.palette {
            palette.resolve()?;
        }
        Ok(())
    }
}
