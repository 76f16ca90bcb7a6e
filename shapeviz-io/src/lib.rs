//! I/O for shapeviz inputs and outputs
//!
//! Reads point sets and meshes (PLY) and voxel occupancy grids (NumPy
//! `.npz` archives), discovers batch inputs on disk and crops rendered
//! images.

pub mod ply;
pub mod npz;
pub mod discover;
pub mod crop;

pub use crop::{crop_center, crop_center_to, CropMargins};
pub use discover::discover_inputs;
pub use npz::{read_occupancy, read_occupancy_key, VOXEL_KEY};

use shapeviz_core::{Error, PointSet, Result, TriangleMesh};
use std::path::Path;

/// Trait for reading point sets from files
pub trait PointSetReader {
    fn read_point_set<P: AsRef<Path>>(path: P) -> Result<PointSet>;
}

/// Trait for writing point sets to files
pub trait PointSetWriter {
    fn write_point_set<P: AsRef<Path>>(set: &PointSet, path: P) -> Result<()>;
}

/// Trait for reading meshes from files
pub trait MeshReader {
    fn read_mesh<P: AsRef<Path>>(path: P) -> Result<TriangleMesh>;
}

/// Trait for writing meshes to files
pub trait MeshWriter {
    fn write_mesh<P: AsRef<Path>>(mesh: &TriangleMesh, path: P) -> Result<()>;
}

/// Auto-detect format and read a point set
pub fn read_point_set<P: AsRef<Path>>(path: P) -> Result<PointSet> {
    let path = path.as_ref();
    match path.extension().and_then(|s| s.to_str()) {
        Some("ply") => ply::PlyReader::read_point_set(path),
        _ => Err(Error::UnsupportedFormat(format!(
            "Unsupported point set format: {:?}",
            path.extension()
        ))),
    }
}

/// Auto-detect format and read a mesh
pub fn read_mesh<P: AsRef<Path>>(path: P) -> Result<TriangleMesh> {
    let path = path.as_ref();
    match path.extension().and_then(|s| s.to_str()) {
        Some("ply") => ply::PlyReader::read_mesh(path),
        _ => Err(Error::UnsupportedFormat(format!(
            "Unsupported mesh format: {:?}",
            path.extension()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_extension_rejected() {
        let result = read_point_set("cloud.xyz");
        assert!(matches!(result, Err(Error::UnsupportedFormat(_))));
        assert!(matches!(read_point_set("no_extension"), Err(Error::UnsupportedFormat(_))));
        assert!(matches!(read_mesh("chair.obj"), Err(Error::UnsupportedFormat(_))));
    }
}
