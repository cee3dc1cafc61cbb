//! Point cloud containers

use crate::mesh::TriangleMesh;
use crate::point::*;
use serde::{Deserialize, Serialize};

/// Points without connectivity. Converts into vertex-only poly data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PointCloud<T> {
    pub points: Vec<T>,
}

pub type ColoredPointCloud3f = PointCloud<ColoredPoint3f>;

impl<T> PointCloud<T> {
    pub fn new() -> Self {
        Self { points: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

impl<T> FromIterator<T> for PointCloud<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            points: iter.into_iter().collect(),
        }
    }
}

impl From<PointCloud<Point3f>> for TriangleMesh {
    /// Vertex-only poly data
    fn from(cloud: PointCloud<Point3f>) -> Self {
        TriangleMesh::from_vertices_and_faces(cloud.points, Vec::new())
    }
}

impl From<PointCloud<ColoredPoint3f>> for TriangleMesh {
    fn from(cloud: PointCloud<ColoredPoint3f>) -> Self {
        let (vertices, colors): (Vec<_>, Vec<_>) = cloud
            .points
            .into_iter()
            .map(|p| (p.position, p.color))
            .unzip();
        let mut mesh = TriangleMesh::from_vertices_and_faces(vertices, Vec::new());
        mesh.colors = Some(colors);
        mesh
    }
}
