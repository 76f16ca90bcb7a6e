//! Render backends
//!
//! The renderer itself lives outside this workspace. A backend receives a
//! finished [`SceneDescription`] and is responsible for producing the image
//! at `scene.render.output`.

use crate::scene::SceneDescription;
use shapeviz_core::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Consumer of finished scene descriptions
pub trait RenderBackend: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// Render (or hand off) one scene
    fn render(&self, scene: &SceneDescription) -> Result<()>;

    /// Whether several scenes may be rendered concurrently.
    ///
    /// Renderers that keep one global scene per process must return false.
    fn parallel_safe(&self) -> bool {
        false
    }
}

/// Writes each scene as pretty JSON beside its output image
/// (`renders/chair.png` → `renders/chair.json`) for a renderer to pick up.
#[derive(Debug, Clone, Default)]
pub struct JsonSceneExporter;

impl JsonSceneExporter {
    pub fn new() -> Self {
        Self
    }

    /// Where the description for `output` is written
    pub fn scene_path(output: &Path) -> PathBuf {
        output.with_extension("json")
    }
}

impl RenderBackend for JsonSceneExporter {
    fn name(&self) -> &str {
        "json"
    }

    fn render(&self, scene: &SceneDescription) -> Result<()> {
        let path = Self::scene_path(&scene.render.output);
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let json = scene.to_json()?;
        fs::write(&path, json)
            .map_err(|e| Error::Render(format!("cannot write {}: {}", path.display(), e)))?;
        log::info!(
            "wrote scene with {} focus elements to {}",
            scene.focus.geometry.len(),
            path.display()
        );
        Ok(())
    }

    fn parallel_safe(&self) -> bool {
        true
    }
}
