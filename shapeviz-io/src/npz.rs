//! NumPy `.npz` occupancy archives
//!
//! Voxel grids are stored as a 3-D array under the key `"voxel"`. Boolean,
//! `u8`, `f32` and `f64` arrays are accepted; any nonzero value counts as
//! occupied.

use ndarray::{Array3, Ix3, OwnedRepr};
use ndarray_npy::{NpzReader, ReadNpzError, ReadableElement};
use shapeviz_core::{Error, OccupancyGrid, Result};
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

/// Archive key holding the occupancy array
pub const VOXEL_KEY: &str = "voxel";

/// Read the `"voxel"` array of an `.npz` archive as an occupancy grid
pub fn read_occupancy<P: AsRef<Path>>(path: P) -> Result<OccupancyGrid> {
    read_occupancy_key(path, VOXEL_KEY)
}

/// Read the array stored under `key` as an occupancy grid
pub fn read_occupancy_key<P: AsRef<Path>>(path: P, key: &str) -> Result<OccupancyGrid> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let mut npz = NpzReader::new(BufReader::new(file)).map_err(npz_error)?;

    let names = npz.names().map_err(npz_error)?;
    let entry = names
        .iter()
        .find(|name| name.as_str() == key || name.strip_suffix(".npy") == Some(key))
        .cloned()
        .ok_or_else(|| {
            Error::InvalidData(format!(
                "{} has no array named '{}' (found {:?})",
                path.display(),
                key,
                names
            ))
        })?;

    let cells = read_cells(&mut npz, &entry)?;
    let grid = OccupancyGrid::new(cells)?;

    log::debug!(
        "read {:?} occupancy grid with {} occupied voxels from {}",
        grid.shape(),
        grid.count_occupied(),
        path.display()
    );
    Ok(grid)
}

fn read_cells<R: Read + Seek>(npz: &mut NpzReader<R>, entry: &str) -> Result<Array3<bool>> {
    if let Some(cells) = try_read::<R, bool>(npz, entry)? {
        return Ok(cells);
    }
    if let Some(cells) = try_read::<R, u8>(npz, entry)? {
        return Ok(cells.mapv(|v| v != 0));
    }
    if let Some(cells) = try_read::<R, f32>(npz, entry)? {
        return Ok(cells.mapv(|v| v != 0.0));
    }
    if let Some(cells) = try_read::<R, f64>(npz, entry)? {
        return Ok(cells.mapv(|v| v != 0.0));
    }
    Err(Error::InvalidData(format!(
        "array '{}' must be a 3-D bool, u8, f32 or f64 array",
        entry
    )))
}

/// Read `entry` as a 3-D array of `T`. A dtype or rank mismatch gives `None`
/// so the caller can try the next element type.
fn try_read<R, T>(npz: &mut NpzReader<R>, entry: &str) -> Result<Option<Array3<T>>>
where
    R: Read + Seek,
    T: ReadableElement,
{
    match npz.by_name::<OwnedRepr<T>, Ix3>(entry) {
        Ok(cells) => Ok(Some(cells)),
        Err(ReadNpzError::Npy(_)) => Ok(None),
        Err(e) => Err(npz_error(e)),
    }
}

fn npz_error(e: ReadNpzError) -> Error {
    Error::InvalidData(format!("npz archive: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray_npy::NpzWriter;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn write_npz<T: ndarray_npy::WritableElement>(dir: &TempDir, key: &str, cells: &Array3<T>) -> PathBuf {
        let path = dir.path().join("cells.npz");
        let mut npz = NpzWriter::new(File::create(&path).unwrap());
        npz.add_array(key, cells).unwrap();
        npz.finish().unwrap();
        path
    }

    #[test]
    fn test_bool_voxels() {
        let cells = Array3::from_shape_fn((4, 4, 4), |(i, j, k)| i == j && j == k);
        let dir = tempfile::tempdir().unwrap();
        let path = write_npz(&dir, VOXEL_KEY, &cells);

        let grid = read_occupancy(&path).unwrap();
        assert_eq!(grid.shape(), (4, 4, 4));
        assert_eq!(grid.count_occupied(), 4);
    }

    #[test]
    fn test_float_voxels_are_thresholded() {
        let mut cells = Array3::<f32>::zeros((2, 3, 2));
        cells[[0, 1, 1]] = 1.0;
        cells[[1, 2, 0]] = 0.5;
        let dir = tempfile::tempdir().unwrap();
        let path = write_npz(&dir, VOXEL_KEY, &cells);

        let grid = read_occupancy(&path).unwrap();
        assert_eq!(grid.count_occupied(), 2);
        assert_eq!(grid.get((0, 1, 1)), Some(true));
    }

    #[test]
    fn test_missing_key() {
        let cells = Array3::from_elem((2, 2, 2), true);
        let dir = tempfile::tempdir().unwrap();
        let path = write_npz(&dir, "occupancy", &cells);

        assert!(matches!(read_occupancy(&path), Err(Error::InvalidData(_))));
        assert!(read_occupancy_key(&path, "occupancy").is_ok());
    }

    #[test]
    fn test_not_an_archive_is_invalid_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.npz");
        std::fs::write(&path, b"not a zip archive").unwrap();

        assert!(matches!(read_occupancy(&path), Err(Error::InvalidData(_))));
        assert!(matches!(read_occupancy(dir.path().join("absent.npz")), Err(Error::Io(_))));
    }

    #[test]
    fn test_zero_dimension_is_invalid_shape() {
        let cells = Array3::<bool>::from_elem((0, 2, 2), false);
        let dir = tempfile::tempdir().unwrap();
        let path = write_npz(&dir, VOXEL_KEY, &cells);

        assert!(matches!(read_occupancy(&path), Err(Error::InvalidShape(_))));
    }
}
