//! Axis-aligned bounds

use crate::instance::InstanceBatch;
use crate::mesh::TriangleMesh;
use crate::point::{Point3f, Vector3f};
use crate::point_set::PointSet;
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Point3f,
    pub max: Point3f,
}

impl Aabb {
    /// Degenerate box at the origin, used for empty inputs
    pub fn empty() -> Self {
        Self { min: Point3f::origin(), max: Point3f::origin() }
    }

    /// Smallest box containing every point; `empty()` when there are none
    pub fn from_points<'a, I>(points: I) -> Self
    where
        I: IntoIterator<Item = &'a Point3f>,
    {
        let mut iter = points.into_iter();
        let Some(first) = iter.next() else {
            return Self::empty();
        };

        let mut bounds = Self { min: *first, max: *first };
        for p in iter {
            bounds.min = bounds.min.inf(p);
            bounds.max = bounds.max.sup(p);
        }
        bounds
    }

    /// Extent along each axis
    pub fn dimensions(&self) -> Vector3f {
        self.max - self.min
    }

    pub fn center(&self) -> Point3f {
        nalgebra::center(&self.min, &self.max)
    }
}

/// Objects with a world-space extent
pub trait Bounded {
    fn bounding_box(&self) -> Aabb;

    fn center(&self) -> Point3f {
        self.bounding_box().center()
    }

    fn dimensions(&self) -> Vector3f {
        self.bounding_box().dimensions()
    }
}

impl Bounded for PointSet {
    fn bounding_box(&self) -> Aabb {
        Aabb::from_points(self.positions())
    }
}

impl Bounded for TriangleMesh {
    fn bounding_box(&self) -> Aabb {
        Aabb::from_points(self.vertices())
    }
}

impl Bounded for InstanceBatch {
    /// Bounds of the placed primitives, each spanning `center ± scale`
    fn bounding_box(&self) -> Aabb {
        let mut iter = self.records.iter();
        let Some(first) = iter.next() else {
            return Aabb::empty();
        };

        let half = |s: f32| Vector3f::repeat(s);
        let mut bounds = Aabb {
            min: first.center - half(first.scale),
            max: first.center + half(first.scale),
        };
        for r in iter {
            bounds.min = bounds.min.inf(&(r.center - half(r.scale)));
            bounds.max = bounds.max.sup(&(r.center + half(r.scale)));
        }
        bounds
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::{expand, Primitive};
    use approx::assert_relative_eq;

    #[test]
    fn test_point_set_bounds() {
        let set = PointSet::from_points(vec![
            Point3f::new(-1.0, 0.0, 2.0),
            Point3f::new(3.0, -2.0, 0.0),
            Point3f::new(0.0, 1.0, 1.0),
        ]);
        let bounds = set.bounding_box();
        assert_eq!(bounds.min, Point3f::new(-1.0, -2.0, 0.0));
        assert_eq!(bounds.max, Point3f::new(3.0, 1.0, 2.0));
        assert_relative_eq!(set.dimensions(), Vector3f::new(4.0, 3.0, 2.0));
        assert_relative_eq!(set.center(), Point3f::new(1.0, -0.5, 1.0));
    }

    #[test]
    fn test_instance_bounds_include_radius() {
        let set = PointSet::from_points(vec![Point3f::new(0.0, 0.0, 0.0), Point3f::new(1.0, 0.0, 0.0)]);
        let batch = expand(&set, 0.5, Primitive::Sphere, 0).unwrap();
        let bounds = batch.bounding_box();
        assert_relative_eq!(bounds.min, Point3f::new(-0.5, -0.5, -0.5));
        assert_relative_eq!(bounds.max, Point3f::new(1.5, 0.5, 0.5));
    }

    #[test]
    fn test_mesh_bounds() {
        let mesh = TriangleMesh::from_vertices_and_faces(
            vec![Point3f::new(-1.0, 0.0, 0.0), Point3f::new(1.0, 2.0, 0.0), Point3f::new(0.0, 0.0, 0.5)],
            vec![[0, 1, 2]],
        )
        .unwrap();
        assert_relative_eq!(mesh.dimensions(), Vector3f::new(2.0, 2.0, 0.5));
        assert_relative_eq!(mesh.center(), Point3f::new(0.0, 1.0, 0.25));
    }

    #[test]
    fn test_empty_bounds() {
        assert_eq!(PointSet::new().bounding_box(), Aabb::empty());
        let batch = expand(&PointSet::new(), 1.0, Primitive::Cube, 0).unwrap();
        assert_eq!(batch.dimensions(), Vector3f::zeros());
    }
}
