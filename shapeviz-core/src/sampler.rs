//! Voxel-grid-to-point-set sampling
//!
//! Every occupied voxel `(i, j, k)` of an `Nx × Ny × Nz` grid maps to the
//! world-space center
//!
//! ```text
//! center[a] = ((index[a] + 0.5) / dim[a] - 0.5) * scale + offset[a]
//! ```
//!
//! so the whole grid fills a cube of side `scale` centered at `offset`.

use crate::error::Result;
use crate::occupancy::check_shape;
use crate::point::{Point3f, Vector3f};
use crate::point_set::PointSet;
use ndarray::ArrayView3;

/// Lazy view over the occupied-voxel centers of a grid.
///
/// [`VoxelSampler::centers`] can be called any number of times; each call
/// restarts the enumeration in row-major `(i, j, k)` order.
#[derive(Debug, Clone)]
pub struct VoxelSampler<'a> {
    cells: ArrayView3<'a, bool>,
    offset: Vector3f,
    scale: f32,
}

/// Validate `cells` and return a sampler over its occupied voxels.
///
/// Fails with [`Error::InvalidShape`](crate::Error::InvalidShape) if any
/// dimension is zero.
pub fn sample(cells: ArrayView3<'_, bool>, offset: Vector3f, scale: f32) -> Result<VoxelSampler<'_>> {
    check_shape(cells.dim())?;
    Ok(VoxelSampler { cells, offset, scale })
}

impl<'a> VoxelSampler<'a> {
    /// Iterate the world-space centers of occupied voxels
    pub fn centers(&self) -> impl Iterator<Item = Point3f> + '_ {
        let (nx, ny, nz) = self.cells.dim();
        let dims = [nx as f32, ny as f32, nz as f32];
        let offset = self.offset;
        let scale = self.scale;

        self.cells
            .indexed_iter()
            .filter(|(_, &occupied)| occupied)
            .map(move |((i, j, k), _)| {
                let axis = |index: usize, a: usize| {
                    let unit = (index as f32 + 0.5) / dims[a] - 0.5;
                    unit * scale + offset[a]
                };
                Point3f::new(axis(i, 0), axis(j, 1), axis(k, 2))
            })
    }

    /// Number of centers [`centers`](Self::centers) yields
    pub fn len(&self) -> usize {
        self.cells.iter().filter(|&&v| v).count()
    }

    pub fn is_empty(&self) -> bool {
        !self.cells.iter().any(|&v| v)
    }

    /// Edge length of a single voxel along each axis, in world units
    pub fn voxel_size(&self) -> Vector3f {
        let (nx, ny, nz) = self.cells.dim();
        Vector3f::new(self.scale / nx as f32, self.scale / ny as f32, self.scale / nz as f32)
    }

    /// Collect the centers into an uncolored point set
    pub fn to_point_set(&self) -> PointSet {
        self.centers().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::occupancy::OccupancyGrid;
    use approx::assert_relative_eq;
    use ndarray::Array3;
    use proptest::prelude::*;

    #[test]
    fn test_full_2x2x2_grid_has_quarter_offsets() {
        let grid = OccupancyGrid::new(Array3::from_elem((2, 2, 2), true)).unwrap();
        let sampler = grid.sample(Vector3f::zeros(), 1.0).unwrap();
        let centers: Vec<_> = sampler.centers().collect();

        assert_eq!(centers.len(), 8);
        for c in &centers {
            for a in 0..3 {
                assert!(c[a] == -0.25 || c[a] == 0.25, "unexpected coordinate {}", c[a]);
            }
        }
        // row-major: k varies fastest
        assert_eq!(centers[0], Point3f::new(-0.25, -0.25, -0.25));
        assert_eq!(centers[1], Point3f::new(-0.25, -0.25, 0.25));
        assert_eq!(centers[7], Point3f::new(0.25, 0.25, 0.25));
    }

    #[test]
    fn test_zero_dimension_fails() {
        let cells = Array3::from_elem((3, 3, 0), true);
        let result = sample(cells.view(), Vector3f::zeros(), 1.0);
        assert!(matches!(result, Err(Error::InvalidShape(_))));
    }

    #[test]
    fn test_scale_and_offset() {
        let grid = OccupancyGrid::from_fn((4, 1, 2), |(i, _, k)| i == 3 && k == 0).unwrap();
        let sampler = grid.sample(Vector3f::new(1.0, -2.0, 0.5), 2.0).unwrap();
        let centers: Vec<_> = sampler.centers().collect();

        assert_eq!(centers.len(), 1);
        // x: (3.5/4 - 0.5) * 2 + 1, y: (0.5/1 - 0.5) * 2 - 2, z: (0.5/2 - 0.5) * 2 + 0.5
        assert_relative_eq!(centers[0].x, 1.75, epsilon = 1e-6);
        assert_relative_eq!(centers[0].y, -2.0, epsilon = 1e-6);
        assert_relative_eq!(centers[0].z, 0.0, epsilon = 1e-6);

        assert_relative_eq!(sampler.voxel_size(), Vector3f::new(0.5, 2.0, 1.0));
    }

    #[test]
    fn test_restartable() {
        let grid = OccupancyGrid::from_fn((3, 2, 2), |(i, j, k)| (i + j + k) % 2 == 0).unwrap();
        let sampler = grid.sample(Vector3f::zeros(), 1.0).unwrap();
        let first: Vec<_> = sampler.centers().collect();
        let second: Vec<_> = sampler.centers().collect();
        assert_eq!(first, second);
        assert_eq!(sampler.to_point_set().positions(), first.as_slice());
    }

    #[test]
    fn test_empty_grid_yields_nothing() {
        let grid = OccupancyGrid::new(Array3::from_elem((2, 3, 4), false)).unwrap();
        let sampler = grid.sample(Vector3f::zeros(), 1.0).unwrap();
        assert!(sampler.is_empty());
        assert_eq!(sampler.centers().count(), 0);
    }

    proptest! {
        #[test]
        fn sample_len_matches_true_count(
            (shape, cells) in (1usize..5, 1usize..5, 1usize..5).prop_flat_map(|(x, y, z)| {
                (Just((x, y, z)), proptest::collection::vec(any::<bool>(), x * y * z))
            }),
            scale in 0.1f32..10.0,
        ) {
            let expected = cells.iter().filter(|&&v| v).count();
            let grid = OccupancyGrid::from_shape_vec(shape, cells).unwrap();
            let sampler = grid.sample(Vector3f::new(0.3, -0.1, 2.0), scale).unwrap();
            prop_assert_eq!(sampler.len(), expected);
            prop_assert_eq!(sampler.centers().count(), expected);
        }

        #[test]
        fn centers_stay_inside_grid_cube(
            (shape, cells) in (1usize..5, 1usize..5, 1usize..5).prop_flat_map(|(x, y, z)| {
                (Just((x, y, z)), proptest::collection::vec(any::<bool>(), x * y * z))
            }),
        ) {
            let grid = OccupancyGrid::from_shape_vec(shape, cells).unwrap();
            let sampler = grid.sample(Vector3f::zeros(), 1.0).unwrap();
            for c in sampler.centers() {
                prop_assert!(c.x > -0.5 && c.x < 0.5);
                prop_assert!(c.y > -0.5 && c.y < 0.5);
                prop_assert!(c.z > -0.5 && c.z < 0.5);
            }
        }
    }
}
