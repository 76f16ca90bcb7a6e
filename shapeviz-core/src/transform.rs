//! 3D transformation utilities

use nalgebra::{Matrix4, Point3, Rotation3, Vector3};
use serde::{Deserialize, Serialize};

/// A homogeneous 3D transformation applied to point positions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform3D {
    pub matrix: Matrix4<f32>,
}

impl Transform3D {
    /// Create an identity transformation
    pub fn identity() -> Self {
        Self {
            matrix: Matrix4::identity(),
        }
    }

    /// Create a translation transformation
    pub fn translation(translation: Vector3<f32>) -> Self {
        Self {
            matrix: Matrix4::new_translation(&translation),
        }
    }

    /// Create a uniform scaling transformation
    pub fn uniform_scaling(scale: f32) -> Self {
        Self {
            matrix: Matrix4::new_scaling(scale),
        }
    }

    /// Rotation from Euler angles in degrees, applied X then Y then Z
    pub fn from_euler_degrees(degrees: [f32; 3]) -> Self {
        let [rx, ry, rz] = degrees.map(f32::to_radians);
        Self {
            matrix: Rotation3::from_euler_angles(rx, ry, rz).to_homogeneous(),
        }
    }

    /// Axis remap used for point clouds exported Y-up: `(x, y, z) -> (-x, -z, y)`
    pub fn y_up_to_z_up() -> Self {
        #[rustfmt::skip]
        let matrix = Matrix4::new(
            -1.0, 0.0,  0.0, 0.0,
             0.0, 0.0, -1.0, 0.0,
             0.0, 1.0,  0.0, 0.0,
             0.0, 0.0,  0.0, 1.0,
        );
        Self { matrix }
    }

    /// Apply the transformation to a point
    pub fn transform_point(&self, point: &Point3<f32>) -> Point3<f32> {
        let homogeneous = self.matrix * point.to_homogeneous();
        Point3::from_homogeneous(homogeneous).unwrap_or(*point)
    }

    /// Compose with another transform; `other` is applied first
    pub fn compose(self, other: Self) -> Self {
        Self {
            matrix: self.matrix * other.matrix,
        }
    }

    /// Check if this is approximately the identity transformation
    pub fn is_identity(&self, epsilon: f32) -> bool {
        (self.matrix - Matrix4::identity()).norm() < epsilon
    }
}

impl Default for Transform3D {
    fn default() -> Self {
        Self::identity()
    }
}

impl std::ops::Mul for Transform3D {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        self.compose(rhs)
    }
}
