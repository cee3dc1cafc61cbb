//! Poly data: triangle meshes and vertex-only point clouds

use crate::bounds::Aabb;
use crate::error::{Error, Result};
use crate::point::*;
use serde::{Deserialize, Serialize};

/// What a poly data container renders as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GeometryKind {
    /// At least one polygon
    Mesh,
    /// Vertices only
    PointCloud,
}

/// A triangle mesh with vertices, faces and optional per-vertex attributes.
///
/// A mesh without faces is a point cloud; [`TriangleMesh::kind`] makes the
/// distinction explicit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriangleMesh {
    pub vertices: Vec<Point3f>,
    pub faces: Vec<[usize; 3]>,
    pub normals: Option<Vec<Vector3f>>,
    pub colors: Option<Vec<Rgb8>>,
    pub tex_coords: Option<Vec<[f32; 2]>>,
}

impl TriangleMesh {
    /// Create a new empty mesh
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            faces: Vec::new(),
            normals: None,
            colors: None,
            tex_coords: None,
        }
    }

    /// Create a mesh from vertices and faces
    pub fn from_vertices_and_faces(vertices: Vec<Point3f>, faces: Vec<[usize; 3]>) -> Self {
        Self {
            vertices,
            faces,
            ..Self::new()
        }
    }

    /// Number of vertices
    pub fn num_points(&self) -> usize {
        self.vertices.len()
    }

    /// Number of triangles
    pub fn num_polygons(&self) -> usize {
        self.faces.len()
    }

    pub fn kind(&self) -> GeometryKind {
        if self.num_polygons() > 0 {
            GeometryKind::Mesh
        } else {
            GeometryKind::PointCloud
        }
    }

    /// Check if the mesh has no vertices
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Add a vertex to the mesh
    pub fn add_vertex(&mut self, vertex: Point3f) -> usize {
        let index = self.vertices.len();
        self.vertices.push(vertex);
        index
    }

    /// Add a face to the mesh
    pub fn add_face(&mut self, face: [usize; 3]) {
        self.faces.push(face);
    }

    /// Calculate face normals
    pub fn calculate_face_normals(&self) -> Vec<Vector3f> {
        self.faces
            .iter()
            .map(|face| {
                let v0 = self.vertices[face[0]];
                let v1 = self.vertices[face[1]];
                let v2 = self.vertices[face[2]];

                let edge1 = v1 - v0;
                let edge2 = v2 - v0;

                edge1.cross(&edge2).try_normalize(f32::EPSILON).unwrap_or_else(Vector3f::zeros)
            })
            .collect()
    }

    /// Set vertex colors, one per vertex
    pub fn set_colors(&mut self, colors: Vec<Rgb8>) -> Result<()> {
        if colors.len() != self.vertices.len() {
            return Err(Error::GeometryMismatch(format!(
                "{} colors given for {} points",
                colors.len(),
                self.vertices.len()
            )));
        }
        self.colors = Some(colors);
        Ok(())
    }

    /// Set texture coordinates, one per vertex
    pub fn set_tex_coords(&mut self, tex_coords: Vec<[f32; 2]>) -> Result<()> {
        if tex_coords.len() != self.vertices.len() {
            return Err(Error::GeometryMismatch(format!(
                "{} texture coordinates given for {} points",
                tex_coords.len(),
                self.vertices.len()
            )));
        }
        self.tex_coords = Some(tex_coords);
        Ok(())
    }

    /// Check that every face references an existing vertex and that
    /// attribute arrays match the vertex count.
    pub fn validate(&self) -> Result<()> {
        let n = self.vertices.len();
        if let Some(face) = self.faces.iter().find(|f| f.iter().any(|&i| i >= n)) {
            return Err(Error::InvalidData(format!(
                "face {:?} references a vertex outside 0..{}",
                face, n
            )));
        }
        let attribute_lens = [
            ("normals", self.normals.as_ref().map(Vec::len)),
            ("colors", self.colors.as_ref().map(Vec::len)),
            ("texture coordinates", self.tex_coords.as_ref().map(Vec::len)),
        ];
        for (name, len) in attribute_lens {
            if let Some(len) = len.filter(|&len| len != n) {
                return Err(Error::InvalidData(format!(
                    "{} {} for {} vertices",
                    len, name, n
                )));
            }
        }
        Ok(())
    }

    /// Axis-aligned bounds of all vertices
    pub fn bounds(&self) -> Option<Aabb> {
        Aabb::from_points(self.vertices.iter().map(|v| v.cast::<f64>()))
    }

    /// Scale all vertices about the origin
    pub fn scale_uniform(&mut self, scale: f32) {
        for v in &mut self.vertices {
            v.coords *= scale;
        }
    }
}

impl Default for TriangleMesh {
    fn default() -> Self {
        Self::new()
    }
}
