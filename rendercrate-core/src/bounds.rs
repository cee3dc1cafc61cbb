//! Axis-aligned bounding boxes

use crate::point::{Point3d, Vector3d};
use serde::{Deserialize, Serialize};

/// An axis-aligned bounding box in world coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Point3d,
    pub max: Point3d,
}

impl Aabb {
    pub fn new(min: Point3d, max: Point3d) -> Self {
        Self { min, max }
    }

    /// Smallest box containing all points, `None` for an empty iterator
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = Point3d>,
    {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        Some(iter.fold(Self::new(first, first), |b, p| b.including(&p)))
    }

    /// Grow the box to include a point
    pub fn including(self, p: &Point3d) -> Self {
        Self {
            min: self.min.inf(p),
            max: self.max.sup(p),
        }
    }

    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: self.min.inf(&other.min),
            max: self.max.sup(&other.max),
        }
    }

    /// True when min <= max on every axis and no coordinate is NaN
    pub fn is_valid(&self) -> bool {
        (0..3).all(|i| self.min[i] <= self.max[i])
    }

    pub fn center(&self) -> Point3d {
        nalgebra::center(&self.min, &self.max)
    }

    pub fn diagonal(&self) -> Vector3d {
        self.max - self.min
    }

    /// The eight corners, x slowest and z fastest
    pub fn corners(&self) -> [Point3d; 8] {
        let (lo, hi) = (self.min, self.max);
        [
            Point3d::new(lo.x, lo.y, lo.z),
            Point3d::new(lo.x, lo.y, hi.z),
            Point3d::new(lo.x, hi.y, lo.z),
            Point3d::new(lo.x, hi.y, hi.z),
            Point3d::new(hi.x, lo.y, lo.z),
            Point3d::new(hi.x, lo.y, hi.z),
            Point3d::new(hi.x, hi.y, lo.z),
            Point3d::new(hi.x, hi.y, hi.z),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_points() {
        let b = Aabb::from_points([
            Point3d::new(1.0, -2.0, 0.5),
            Point3d::new(-1.0, 3.0, 0.0),
        ])
        .unwrap();
        assert_eq!(b.min, Point3d::new(-1.0, -2.0, 0.0));
        assert_eq!(b.max, Point3d::new(1.0, 3.0, 0.5));
        assert!(Aabb::from_points(std::iter::empty()).is_none());
    }

    #[test]
    fn test_corners_span_box() {
        let b = Aabb::new(Point3d::new(0.0, 0.0, 0.0), Point3d::new(1.0, 2.0, 3.0));
        let corners = b.corners();
        assert_eq!(corners[0], b.min);
        assert_eq!(corners[7], b.max);
        assert_eq!(corners[5], Point3d::new(1.0, 0.0, 3.0));
        assert_eq!(b.center(), Point3d::new(0.5, 1.0, 1.5));
    }
}
