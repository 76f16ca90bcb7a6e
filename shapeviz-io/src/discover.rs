//! Batch input discovery

use shapeviz_core::Result;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Recursively collect every file under `dir` whose extension matches
/// `extension` (case-insensitive, without the dot), sorted by path.
///
/// Symbolic links are not followed, so linked files and directories are
/// skipped.
pub fn discover_inputs<P: AsRef<Path>>(dir: P, extension: &str) -> Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    for entry in WalkDir::new(dir.as_ref()).follow_links(false) {
        let entry = entry.map_err(std::io::Error::from)?;
        if !entry.file_type().is_file() {
            continue;
        }
        let matches = entry
            .path()
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case(extension));
        if matches {
            found.push(entry.into_path());
        }
    }
    found.sort();
    log::debug!("found {} .{} files under {}", found.len(), extension, dir.as_ref().display());
    Ok(found)
}
