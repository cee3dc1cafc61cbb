//! Rigid and affine transforms for actors and axes

use crate::point::{Point3d, Vector3d};
use nalgebra::{Matrix4, Rotation3, Translation3};
use serde::{Deserialize, Serialize};

/// A 4x4 homogeneous transformation in double precision
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform3D {
    pub matrix: Matrix4<f64>,
}

impl Transform3D {
    /// Create an identity transformation
    pub fn identity() -> Self {
        Self {
            matrix: Matrix4::identity(),
        }
    }

    /// Create a translation transformation
    pub fn translation(translation: Vector3d) -> Self {
        Self {
            matrix: Translation3::from(translation).to_homogeneous(),
        }
    }

    /// Create a rotation transformation
    pub fn rotation(rotation: Rotation3<f64>) -> Self {
        Self {
            matrix: rotation.to_homogeneous(),
        }
    }

    /// Create a uniform scaling transformation
    pub fn uniform_scaling(scale: f64) -> Self {
        let mut matrix = Matrix4::new_scaling(scale);
        matrix[(3, 3)] = 1.0;
        Self { matrix }
    }

    /// Apply the transformation to a point
    pub fn transform_point(&self, point: &Point3d) -> Point3d {
        let homogeneous = self.matrix * point.to_homogeneous();
        Point3d::from_homogeneous(homogeneous).unwrap_or(*point)
    }

    /// Compose this transformation with another; `other` is applied first
    pub fn compose(self, other: Self) -> Self {
        Self {
            matrix: self.matrix * other.matrix,
        }
    }

    /// Get the inverse transformation
    pub fn inverse(self) -> Option<Self> {
        self.matrix.try_inverse().map(|matrix| Self { matrix })
    }

    /// Check if this is approximately the identity transformation
    pub fn is_identity(&self, epsilon: f64) -> bool {
        (self.matrix - Matrix4::identity()).norm() < epsilon
    }

    pub fn to_f32(&self) -> Matrix4<f32> {
        self.matrix.cast::<f32>()
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

impl From<Matrix4<f64>> for Transform3D {
    fn from(matrix: Matrix4<f64>) -> Self {
        Self { matrix }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_compose_order() {
        let t = Transform3D::translation(Vector3d::new(1.0, 0.0, 0.0));
        let s = Transform3D::uniform_scaling(2.0);
        let p = (t * s).transform_point(&Point3d::new(1.0, 1.0, 1.0));
        assert_relative_eq!(p, Point3d::new(3.0, 2.0, 2.0));
    }

    #[test]
    fn test_inverse() {
        let r = Transform3D::rotation(Rotation3::from_euler_angles(0.1, 0.2, 0.3));
        let t = Transform3D::translation(Vector3d::new(1.0, -2.0, 3.0));
        let m = t * r;
        let inv = m.inverse().unwrap();
        assert!((m * inv).is_identity(1e-12));
    }
}
