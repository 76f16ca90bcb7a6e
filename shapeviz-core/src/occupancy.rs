//! Voxel occupancy grids

use crate::error::{Error, Result};
use crate::point::Vector3f;
use crate::sampler::{sample, VoxelSampler};
use ndarray::{Array3, ArrayView3};

/// A 3-D boolean array marking which voxels are filled.
///
/// All three dimensions are non-zero. The grid cannot be mutated once built.
#[derive(Debug, Clone, PartialEq)]
pub struct OccupancyGrid {
    cells: Array3<bool>,
}

impl OccupancyGrid {
    /// Wrap an existing array, rejecting empty dimensions
    pub fn new(cells: Array3<bool>) -> Result<Self> {
        check_shape(cells.dim())?;
        Ok(Self { cells })
    }

    /// Build a grid from a flat row-major buffer
    pub fn from_shape_vec(shape: (usize, usize, usize), cells: Vec<bool>) -> Result<Self> {
        check_shape(shape)?;
        let cells = Array3::from_shape_vec(shape, cells)
            .map_err(|e| Error::InvalidShape(format!("cannot build {:?} grid: {}", shape, e)))?;
        Ok(Self { cells })
    }

    /// Build a grid by evaluating `f` at every `(i, j, k)`
    pub fn from_fn<F>(shape: (usize, usize, usize), f: F) -> Result<Self>
    where
        F: FnMut((usize, usize, usize)) -> bool,
    {
        check_shape(shape)?;
        Ok(Self { cells: Array3::from_shape_fn(shape, f) })
    }

    /// `(Nx, Ny, Nz)`
    pub fn shape(&self) -> (usize, usize, usize) {
        self.cells.dim()
    }

    pub fn get(&self, index: (usize, usize, usize)) -> Option<bool> {
        self.cells.get(index).copied()
    }

    /// Number of occupied voxels
    pub fn count_occupied(&self) -> usize {
        self.cells.iter().filter(|&&v| v).count()
    }

    pub fn view(&self) -> ArrayView3<'_, bool> {
        self.cells.view()
    }

    /// Sample the world-space centers of occupied voxels
    pub fn sample(&self, offset: Vector3f, scale: f32) -> Result<VoxelSampler<'_>> {
        sample(self.view(), offset, scale)
    }
}

pub(crate) fn check_shape(shape: (usize, usize, usize)) -> Result<()> {
    let (nx, ny, nz) = shape;
    if nx == 0 || ny == 0 || nz == 0 {
        return Err(Error::InvalidShape(format!(
            "occupancy grid dimensions must be non-zero, got ({}, {}, {})",
            nx, ny, nz
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_dimension_rejected() {
        assert!(matches!(
            OccupancyGrid::new(Array3::from_elem((4, 0, 4), true)),
            Err(Error::InvalidShape(_))
        ));
        assert!(matches!(
            OccupancyGrid::from_shape_vec((0, 1, 1), vec![]),
            Err(Error::InvalidShape(_))
        ));
    }

    #[test]
    fn test_buffer_length_must_match_shape() {
        let result = OccupancyGrid::from_shape_vec((2, 2, 2), vec![true; 7]);
        assert!(matches!(result, Err(Error::InvalidShape(_))));
    }

    #[test]
    fn test_count_occupied() {
        let grid = OccupancyGrid::from_fn((3, 3, 3), |(i, j, k)| i == j && j == k).unwrap();
        assert_eq!(grid.shape(), (3, 3, 3));
        assert_eq!(grid.count_occupied(), 3);
        assert_eq!(grid.get((1, 1, 1)), Some(true));
        assert_eq!(grid.get((1, 2, 1)), Some(false));
        assert_eq!(grid.get((3, 0, 0)), None);
    }
}
