//! Rays for intersection queries

use crate::error::{Error, Result};
use crate::point::{Point3d, Vector3d};
use serde::{Deserialize, Serialize};

/// A half-line with a unit direction
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ray {
    pub origin: Point3d,
    pub direction: Vector3d,
}

impl Ray {
    /// Create a ray, normalizing the direction
    pub fn new(origin: Point3d, direction: Vector3d) -> Result<Self> {
        let direction = direction
            .try_normalize(f64::EPSILON)
            .ok_or_else(|| Error::InvalidData("ray direction must be non-zero".to_string()))?;
        Ok(Self { origin, direction })
    }

    /// Ray from `origin` through `target`
    pub fn through(origin: Point3d, target: Point3d) -> Result<Self> {
        Self::new(origin, target - origin)
    }

    pub fn point_at(&self, t: f64) -> Point3d {
        self.origin + self.direction * t
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_direction_is_normalized() {
        let ray = Ray::new(Point3d::origin(), Vector3d::new(0.0, 0.0, 5.0)).unwrap();
        assert_relative_eq!(ray.direction.norm(), 1.0);
        assert_relative_eq!(ray.point_at(2.0), Point3d::new(0.0, 0.0, 2.0));
    }

    #[test]
    fn test_zero_direction_rejected() {
        assert!(Ray::new(Point3d::origin(), Vector3d::zeros()).is_err());
    }
}
