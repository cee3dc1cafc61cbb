//! Core traits for rendercrate

use crate::{bounds::Aabb, mesh::TriangleMesh, point::Point3f, point_cloud::PointCloud};

/// Trait for drawable/renderable objects
pub trait Drawable {
    /// World-space bounds, `None` when there is nothing to draw
    fn bounds(&self) -> Option<Aabb>;
}

impl Drawable for TriangleMesh {
    fn bounds(&self) -> Option<Aabb> {
        TriangleMesh::bounds(self)
    }
}

impl Drawable for PointCloud<Point3f> {
    fn bounds(&self) -> Option<Aabb> {
        Aabb::from_points(self.points.iter().map(|p| p.cast::<f64>()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::point::Point3d;

    #[test]
    fn test_point_cloud_bounds() {
        let cloud: PointCloud<Point3f> = vec![Point3f::new(0.0, 0.0, 2.0), Point3f::new(1.0, -1.0, 3.0)]
            .into_iter()
            .collect();
        let b = Drawable::bounds(&cloud).unwrap();
        assert_eq!(b.min, Point3d::new(0.0, -1.0, 2.0));
        assert_eq!(b.max, Point3d::new(1.0, 0.0, 3.0));

        assert!(Drawable::bounds(&PointCloud::<Point3f>::new()).is_none());
    }
}
