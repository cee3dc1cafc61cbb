//! Renderable actors
//!
//! An actor pairs geometry (a textured mesh, a point cloud or line
//! segments) with display properties and a user transform.

use crate::primitives::{axes_mesh, MeshBuilder, SPHERE_RESOLUTION};
use nalgebra::Matrix4;
use rendercrate_core::{
    colors, rgb8_to_unit, Aabb, Drawable, Error, GeometryKind, Point3d, Point3f, PolyData, Result, Rgb8, Texture, Transform3D,
};
use rendercrate_gpu::{DrawItem, LineInstance, MeshVertex, PointInstance, Primitive};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_POINT_SIZE: f32 = 3.0;

/// Display properties of an actor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActorProperty {
    /// RGB in [0, 1]; used where the geometry has no vertex colors
    pub color: [f32; 3],
    pub opacity: f32,
    /// Point sprite size in pixels
    pub point_size: f32,
    /// Line width in pixels
    pub line_width: f32,
    pub lighting: bool,
}

impl Default for ActorProperty {
    fn default() -> Self {
        Self {
            color: [1.0, 1.0, 1.0],
            opacity: 1.0,
            point_size: 1.0,
            line_width: 1.0,
            lighting: true,
        }
    }
}

#[derive(Debug, Clone)]
pub enum ActorGeometry {
    Mesh { mesh: PolyData, texture: Option<Texture> },
    PointCloud { cloud: PolyData },
    Lines { segments: Vec<[Point3d; 2]> },
}

/// Geometry with display properties
#[derive(Debug, Clone)]
pub struct Actor {
    pub geometry: ActorGeometry,
    pub property: ActorProperty,
    pub user_transform: Transform3D,
    pub visible: bool,
}

impl Actor {
    fn new(geometry: ActorGeometry) -> Self {
        Self {
            geometry,
            property: ActorProperty::default(),
            user_transform: Transform3D::identity(),
            visible: true,
        }
    }

    /// Point cloud from coordinates and optional per-point colors
    pub fn point_cloud(coords: &[Point3f], colors: Option<&[Rgb8]>) -> Result<Self> {
        let poly_data = match colors {
            Some(colors) => rendercrate_io::create_point_cloud_poly_data(coords, colors)?,
            None => PolyData::from_vertices_and_faces(coords.to_vec(), Vec::new()),
        };
        Self::point_cloud_from_poly_data(poly_data, 1.0, DEFAULT_POINT_SIZE, None)
    }

    /// Point cloud actor; the poly data must have points and no polygons
    pub fn point_cloud_from_poly_data(
        mut poly_data: PolyData,
        opacity: f32,
        point_size: f32,
        overwrite_color: Option<Rgb8>,
    ) -> Result<Self> {
        let (num_points, num_polys) = (poly_data.num_points(), poly_data.num_polygons());
        if num_points == 0 || num_polys > 0 {
            return Err(Error::GeometryMismatch(format!(
                "point cloud needs points and no polygons, got {} points and {} polygons",
                num_points, num_polys
            )));
        }
        if let Some(color) = overwrite_color {
            poly_data.colors = Some(rendercrate_io::create_color_array(num_points, color));
        }
        poly_data.validate()?;

        let mut actor = Self::new(ActorGeometry::PointCloud { cloud: poly_data });
        actor.property.opacity = opacity;
        actor.property.point_size = point_size;
        Ok(actor)
    }

    /// Mesh actor; the poly data must contain polygons
    pub fn mesh_from_poly_data(poly_data: PolyData, texture: Option<Texture>, opacity: f32) -> Result<Self> {
        if poly_data.num_polygons() == 0 {
            return Err(Error::GeometryMismatch(format!(
                "mesh needs polygons, got {} points and none",
                poly_data.num_points()
            )));
        }
        poly_data.validate()?;
        if texture.is_some() && poly_data.tex_coords.is_none() {
            log::warn!("Mesh has no texture coordinates, the texture will not show");
        }

        let mut actor = Self::new(ActorGeometry::Mesh { mesh: poly_data, texture });
        actor.property.opacity = opacity;
        Ok(actor)
    }

    /// Mesh actor when the poly data has polygons, else point cloud actor
    pub fn mesh_or_point_cloud_from_poly_data(
        poly_data: PolyData,
        opacity: f32,
        texture: Option<Texture>,
        point_size: f32,
        point_overwrite_color: Option<Rgb8>,
    ) -> Result<Self> {
        match poly_data.kind() {
            GeometryKind::Mesh => Self::mesh_from_poly_data(poly_data, texture, opacity),
            GeometryKind::PointCloud => {
                Self::point_cloud_from_poly_data(poly_data, opacity, point_size, point_overwrite_color)
            }
        }
    }

    /// Load an OBJ, PLY or STL file and an optional texture image
    pub fn mesh_or_point_cloud_from_file<P: AsRef<Path>>(path: P, texture_path: Option<&Path>) -> Result<Self> {
        let poly_data = rendercrate_io::read_poly_data(path)?;
        let texture = texture_path.map(rendercrate_io::read_texture).transpose()?;
        Self::mesh_or_point_cloud_from_poly_data(poly_data, 1.0, texture, DEFAULT_POINT_SIZE, None)
    }

    pub fn line(p1: Point3d, p2: Point3d, color: Rgb8) -> Self {
        let mut actor = Self::new(ActorGeometry::Lines { segments: vec![[p1, p2]] });
        actor.property.color = rgb8_to_unit(color);
        actor.property.lighting = false;
        actor
    }

    pub fn sphere(center: Point3d, color: Rgb8, radius: f64) -> Self {
        let mut builder = MeshBuilder::new();
        builder.add_sphere(&center, radius, SPHERE_RESOLUTION, color);
        Self::new(ActorGeometry::Mesh {
            mesh: builder.build(),
            texture: None,
        })
    }

    /// Capped 8-sided cylinder of height 1 and radius 0.5 along Y
    pub fn example_cylinder(opacity: f32) -> Self {
        let mut builder = MeshBuilder::new();
        builder.add_cylinder(
            &Point3d::new(0.0, -0.5, 0.0),
            &Point3d::new(0.0, 0.5, 0.0),
            0.5,
            8,
            true,
            colors::WHITE,
        );
        let mut actor = Self::new(ActorGeometry::Mesh {
            mesh: builder.build(),
            texture: None,
        });
        actor.property.opacity = opacity;
        actor
    }

    /// Unit axes placed by `transform`
    pub fn axes(transform: &Matrix4<f64>) -> Self {
        let mut actor = Self::new(ActorGeometry::Mesh {
            mesh: axes_mesh(),
            texture: None,
        });
        actor.user_transform = Transform3D::from(*transform);
        actor
    }

    pub fn num_points(&self) -> usize {
        match &self.geometry {
            ActorGeometry::Mesh { mesh, .. } => mesh.num_points(),
            ActorGeometry::PointCloud { cloud } => cloud.num_points(),
            ActorGeometry::Lines { segments } => 2 * segments.len(),
        }
    }

    pub fn num_polygons(&self) -> usize {
        match &self.geometry {
            ActorGeometry::Mesh { mesh, .. } => mesh.num_polygons(),
            _ => 0,
        }
    }

    /// GPU draw item for the current geometry and properties
    pub fn draw_item(&self) -> DrawItem<'_> {
        let base = [self.property.color[0], self.property.color[1], self.property.color[2], 1.0];
        let vertex_color = |colors: &Option<Vec<Rgb8>>, index: usize| match colors {
            Some(colors) => {
                let [r, g, b] = rgb8_to_unit(colors[index]);
                [r, g, b, 1.0]
            }
            None => base,
        };

        let primitive = match &self.geometry {
            ActorGeometry::Mesh { mesh, texture } => {
                let vertices = mesh
                    .vertices
                    .iter()
                    .enumerate()
                    .map(|(i, v)| MeshVertex {
                        position: [v.x, v.y, v.z],
                        color: vertex_color(&mesh.colors, i),
                        uv: mesh.tex_coords.as_ref().map_or([0.0, 0.0], |uv| uv[i]),
                    })
                    .collect();
                let indices = mesh.faces.iter().flatten().map(|&i| i as u32).collect();
                Primitive::Triangles {
                    vertices,
                    indices,
                    texture: texture.as_ref().filter(|_| mesh.tex_coords.is_some()),
                }
            }
            ActorGeometry::PointCloud { cloud } => Primitive::Points(
                cloud
                    .vertices
                    .iter()
                    .enumerate()
                    .map(|(i, v)| PointInstance {
                        position: [v.x, v.y, v.z],
                        color: vertex_color(&cloud.colors, i),
                    })
                    .collect(),
            ),
            ActorGeometry::Lines { segments } => Primitive::Lines(
                segments
                    .iter()
                    .map(|[a, b]| LineInstance {
                        start: [a.x as f32, a.y as f32, a.z as f32],
                        end: [b.x as f32, b.y as f32, b.z as f32],
                        color: base,
                    })
                    .collect(),
            ),
        };

        DrawItem {
            primitive,
            model: self.user_transform.to_f32(),
            opacity: self.property.opacity,
            point_size: self.property.point_size,
            line_width: self.property.line_width,
            lighting: self.property.lighting,
        }
    }
}

impl Drawable for Actor {
    /// World bounds after the user transform
    fn bounds(&self) -> Option<Aabb> {
        let local = match &self.geometry {
            ActorGeometry::Mesh { mesh, .. } => mesh.bounds(),
            ActorGeometry::PointCloud { cloud } => cloud.bounds(),
            ActorGeometry::Lines { segments } => Aabb::from_points(segments.iter().flatten().copied()),
        }?;
        Aabb::from_points(local.corners().iter().map(|c| self.user_transform.transform_point(c)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rendercrate_core::Vector3d;

    fn sample_points(n: usize) -> Vec<Point3f> {
        (0..n).map(|i| Point3f::new(i as f32, 0.0, -(i as f32))).collect()
    }

    #[test]
    fn test_point_cloud_counts() {
        let coords = sample_points(5);
        let colors = vec![colors::RED; 5];
        let actor = Actor::point_cloud(&coords, Some(&colors)).unwrap();
        assert_eq!(actor.num_points(), 5);
        assert_eq!(actor.num_polygons(), 0);
        assert_eq!(actor.property.point_size, DEFAULT_POINT_SIZE);

        assert!(matches!(
            Actor::point_cloud(&coords, Some(&colors[..4])),
            Err(Error::GeometryMismatch(_))
        ));
    }

    #[test]
    fn test_kind_is_checked() {
        let mesh = PolyData::from_vertices_and_faces(sample_points(3), vec![[0, 1, 2]]);
        assert!(matches!(
            Actor::point_cloud_from_poly_data(mesh.clone(), 1.0, 3.0, None),
            Err(Error::GeometryMismatch(_))
        ));
        assert!(Actor::mesh_from_poly_data(mesh.clone(), None, 1.0).is_ok());

        let cloud = PolyData::from_vertices_and_faces(sample_points(3), Vec::new());
        assert!(matches!(
            Actor::mesh_from_poly_data(cloud.clone(), None, 1.0),
            Err(Error::GeometryMismatch(_))
        ));
        let empty = PolyData::new();
        assert!(Actor::point_cloud_from_poly_data(empty, 1.0, 3.0, None).is_err());

        let dispatched = Actor::mesh_or_point_cloud_from_poly_data(cloud, 0.5, None, 2.0, Some(colors::BLUE)).unwrap();
        assert!(matches!(&dispatched.geometry, ActorGeometry::PointCloud { cloud } if cloud.colors == Some(vec![colors::BLUE; 3])));
        assert_eq!(dispatched.property.opacity, 0.5);
        let dispatched = Actor::mesh_or_point_cloud_from_poly_data(mesh, 1.0, None, 2.0, None).unwrap();
        assert!(matches!(dispatched.geometry, ActorGeometry::Mesh { .. }));
    }

    #[test]
    fn test_attribute_counts_are_validated() {
        let mut mesh = PolyData::from_vertices_and_faces(sample_points(3), vec![[0, 1, 2]]);
        mesh.colors = Some(vec![colors::RED]);
        assert!(matches!(
            Actor::mesh_from_poly_data(mesh, None, 1.0),
            Err(Error::InvalidData(_))
        ));

        let mut out_of_range = PolyData::from_vertices_and_faces(sample_points(3), vec![[0, 1, 3]]);
        out_of_range.tex_coords = Some(vec![[0.0, 0.0]; 3]);
        assert!(Actor::mesh_from_poly_data(out_of_range, None, 1.0).is_err());

        let mut cloud = PolyData::from_vertices_and_faces(sample_points(3), Vec::new());
        cloud.colors = Some(vec![colors::RED; 2]);
        assert!(matches!(
            Actor::point_cloud_from_poly_data(cloud.clone(), 1.0, 3.0, None),
            Err(Error::InvalidData(_))
        ));
        // An overwrite color replaces the mismatched array
        let actor = Actor::point_cloud_from_poly_data(cloud, 1.0, 3.0, Some(colors::LIME)).unwrap();
        assert_eq!(actor.num_points(), 3);
    }

    #[test]
    fn test_bounds_follow_user_transform() {
        let mut actor = Actor::example_cylinder(1.0);
        let b = actor.bounds().unwrap();
        assert_relative_eq!(b.min.y, -0.5, epsilon = 1e-6);
        assert_relative_eq!(b.max.y, 0.5, epsilon = 1e-6);

        actor.user_transform = Transform3D::translation(Vector3d::new(0.0, 10.0, 0.0));
        let b = actor.bounds().unwrap();
        assert_relative_eq!(b.min.y, 9.5, epsilon = 1e-6);
    }

    #[test]
    fn test_line_and_sphere() {
        let line = Actor::line(Point3d::origin(), Point3d::new(1.0, 2.0, 3.0), colors::RED);
        assert_eq!(line.num_points(), 2);
        assert_eq!(line.property.color, [1.0, 0.0, 0.0]);
        assert_eq!(line.bounds().unwrap().max, Point3d::new(1.0, 2.0, 3.0));

        let sphere = Actor::sphere(Point3d::new(0.0, 0.0, 5.0), colors::BLUE, 0.25);
        let b = sphere.bounds().unwrap();
        assert_relative_eq!(b.center(), Point3d::new(0.0, 0.0, 5.0), epsilon = 1e-6);
        assert_relative_eq!(b.max.z, 5.25, epsilon = 1e-6);
    }

    #[test]
    fn test_draw_item_colors() {
        let coords = sample_points(2);
        let actor = Actor::point_cloud(&coords, Some(&[colors::RED, colors::LIME])).unwrap();
        let item = actor.draw_item();
        let Primitive::Points(points) = &item.primitive else {
            panic!("expected points");
        };
        assert_eq!(points[0].color, [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(points[1].color, [0.0, 1.0, 0.0, 1.0]);
        assert_eq!(item.point_size, DEFAULT_POINT_SIZE);

        let uncolored = Actor::point_cloud(&coords, None).unwrap();
        let Primitive::Points(points) = uncolored.draw_item().primitive else {
            panic!("expected points");
        };
        assert_eq!(points[0].color, [1.0, 1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_texture_needs_tex_coords() {
        let mut mesh = PolyData::from_vertices_and_faces(sample_points(3), vec![[0, 1, 2]]);
        let texture = Texture::solid([1, 2, 3, 255]);

        let actor = Actor::mesh_from_poly_data(mesh.clone(), Some(texture.clone()), 1.0).unwrap();
        assert!(matches!(actor.draw_item().primitive, Primitive::Triangles { texture: None, .. }));

        mesh.set_tex_coords(vec![[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]]).unwrap();
        let actor = Actor::mesh_from_poly_data(mesh, Some(texture), 1.0).unwrap();
        let item = actor.draw_item();
        let Primitive::Triangles { vertices, indices, texture } = &item.primitive else {
            panic!("expected triangles");
        };
        assert!(texture.is_some());
        assert_eq!(indices, &vec![0, 1, 2]);
        assert_eq!(vertices[1].uv, [1.0, 0.0]);
    }
}
