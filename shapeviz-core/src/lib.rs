//! Core data structures and transforms for shapeviz
//!
//! This crate turns learning-pipeline outputs (voxel occupancy grids and
//! point sets) into ordered instance records that any instancing renderer
//! can consume, holds meshes that are rendered as they are, and provides
//! the palette interpolation used to color both.

pub mod error;
pub mod point;
pub mod point_set;
pub mod mesh;
pub mod occupancy;
pub mod sampler;
pub mod instance;
pub mod palette;
pub mod transform;
pub mod bounds;

pub use error::*;
pub use point::*;
pub use point_set::*;
pub use mesh::*;
pub use occupancy::*;
pub use sampler::*;
pub use instance::*;
pub use palette::*;
pub use transform::*;
pub use bounds::*;

/// Re-export commonly used types from nalgebra
pub use nalgebra::{Point3, Vector3, Matrix4};
