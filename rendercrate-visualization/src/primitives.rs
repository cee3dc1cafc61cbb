//! Tessellated primitives: spheres, cylinders, cones and axes

use rendercrate_core::{colors, Point3d, Point3f, Rgb8, TriangleMesh, Vector3d};
use std::f64::consts::PI;

pub const SPHERE_RESOLUTION: usize = 64;
pub const AXES_RESOLUTION: usize = 16;

/// Fraction of an axis taken by the shaft; the cone tip takes the rest
const AXES_SHAFT_LENGTH: f64 = 0.8;
const AXES_SHAFT_RADIUS: f64 = 0.015;
const AXES_TIP_RADIUS: f64 = 0.05;

fn perpendicular_frame(axis: &Vector3d) -> (Vector3d, Vector3d) {
    let helper = if axis.x.abs() < 0.9 { Vector3d::x() } else { Vector3d::y() };
    let u = axis.cross(&helper).normalize();
    let v = axis.cross(&u);
    (u, v)
}

/// Accumulates colored triangles
#[derive(Debug, Default)]
pub struct MeshBuilder {
    vertices: Vec<Point3f>,
    faces: Vec<[usize; 3]>,
    colors: Vec<Rgb8>,
}

impl MeshBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn vertex(&mut self, p: Point3d, color: Rgb8) -> usize {
        self.vertices.push(p.cast::<f32>());
        self.colors.push(color);
        self.vertices.len() - 1
    }

    fn ring(&mut self, center: &Point3d, u: &Vector3d, v: &Vector3d, radius: f64, resolution: usize, color: Rgb8) -> usize {
        let first = self.vertices.len();
        for k in 0..resolution {
            let angle = 2.0 * PI * k as f64 / resolution as f64;
            self.vertex(center + (u * angle.cos() + v * angle.sin()) * radius, color);
        }
        first
    }

    fn cap(&mut self, center: Point3d, ring: usize, resolution: usize, color: Rgb8, flip: bool) {
        let c = self.vertex(center, color);
        for k in 0..resolution {
            let (a, b) = (ring + k, ring + (k + 1) % resolution);
            self.faces.push(if flip { [c, b, a] } else { [c, a, b] });
        }
    }

    /// UV sphere with `resolution` segments in both directions, poles on Z
    pub fn add_sphere(&mut self, center: &Point3d, radius: f64, resolution: usize, color: Rgb8) -> &mut Self {
        let resolution = resolution.max(3);
        let north = self.vertex(center + Vector3d::z() * radius, color);
        let south = self.vertex(center - Vector3d::z() * radius, color);

        let rings: Vec<usize> = (1..resolution)
            .map(|j| {
                let phi = PI * j as f64 / resolution as f64;
                let ring_center = center + Vector3d::z() * radius * phi.cos();
                self.ring(&ring_center, &Vector3d::x(), &Vector3d::y(), radius * phi.sin(), resolution, color)
            })
            .collect();

        for k in 0..resolution {
            let next = (k + 1) % resolution;
            if let (Some(&top), Some(&bottom)) = (rings.first(), rings.last()) {
                self.faces.push([north, top + k, top + next]);
                self.faces.push([south, bottom + next, bottom + k]);
            }
            for pair in rings.windows(2) {
                let (upper, lower) = (pair[0], pair[1]);
                self.faces.push([upper + k, lower + k, lower + next]);
                self.faces.push([upper + k, lower + next, upper + next]);
            }
        }
        self
    }

    /// Cylinder from `start` to `end`
    pub fn add_cylinder(
        &mut self,
        start: &Point3d,
        end: &Point3d,
        radius: f64,
        resolution: usize,
        capped: bool,
        color: Rgb8,
    ) -> &mut Self {
        let Some(axis) = (end - start).try_normalize(f64::EPSILON) else {
            return self;
        };
        let resolution = resolution.max(3);
        let (u, v) = perpendicular_frame(&axis);
        let bottom = self.ring(start, &u, &v, radius, resolution, color);
        let top = self.ring(end, &u, &v, radius, resolution, color);

        for k in 0..resolution {
            let next = (k + 1) % resolution;
            self.faces.push([bottom + k, bottom + next, top + next]);
            self.faces.push([bottom + k, top + next, top + k]);
        }
        if capped {
            self.cap(*start, bottom, resolution, color, true);
            self.cap(*end, top, resolution, color, false);
        }
        self
    }

    /// Capped cone with its base disk at `base`
    pub fn add_cone(&mut self, base: &Point3d, tip: &Point3d, radius: f64, resolution: usize, color: Rgb8) -> &mut Self {
        let Some(axis) = (tip - base).try_normalize(f64::EPSILON) else {
            return self;
        };
        let resolution = resolution.max(3);
        let (u, v) = perpendicular_frame(&axis);
        let ring = self.ring(base, &u, &v, radius, resolution, color);
        self.cap(*tip, ring, resolution, color, false);
        self.cap(*base, ring, resolution, color, true);
        self
    }

    pub fn build(self) -> TriangleMesh {
        let mut mesh = TriangleMesh::from_vertices_and_faces(self.vertices, self.faces);
        mesh.colors = Some(self.colors);
        mesh
    }
}

/// Unit-length axes at the origin: X red, Y green, Z blue
pub fn axes_mesh() -> TriangleMesh {
    let mut builder = MeshBuilder::new();
    let origin = Point3d::origin();
    for (axis, color) in [
        (Vector3d::x(), colors::RED),
        (Vector3d::y(), colors::LIME),
        (Vector3d::z(), colors::BLUE),
    ] {
        let shaft_end = origin + axis * AXES_SHAFT_LENGTH;
        builder
            .add_cylinder(&origin, &shaft_end, AXES_SHAFT_RADIUS, AXES_RESOLUTION, false, color)
            .add_cone(&shaft_end, &(origin + axis), AXES_TIP_RADIUS, AXES_RESOLUTION, color);
    }
    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sphere_topology() {
        let mut builder = MeshBuilder::new();
        builder.add_sphere(&Point3d::new(1.0, 2.0, 3.0), 0.5, 8, colors::RED);
        let mesh = builder.build();

        // Two poles plus 7 rings of 8
        assert_eq!(mesh.num_points(), 2 + 7 * 8);
        // Two pole fans plus 6 bands of quads
        assert_eq!(mesh.num_polygons(), 2 * 8 + 6 * 8 * 2);
        mesh.validate().unwrap();
        for v in &mesh.vertices {
            let r = (v.cast::<f64>() - Point3d::new(1.0, 2.0, 3.0)).norm();
            assert!((r - 0.5).abs() < 1e-6);
        }
    }

    #[test]
    fn test_capped_cylinder() {
        let mut builder = MeshBuilder::new();
        builder.add_cylinder(&Point3d::new(0.0, -0.5, 0.0), &Point3d::new(0.0, 0.5, 0.0), 0.5, 8, true, colors::WHITE);
        let mesh = builder.build();
        assert_eq!(mesh.num_points(), 2 * 8 + 2);
        assert_eq!(mesh.num_polygons(), 2 * 8 + 2 * 8);

        let bounds = mesh.bounds().unwrap();
        assert!((bounds.max.y - 0.5).abs() < 1e-6);
        assert!((bounds.max.x - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_degenerate_cylinder_is_skipped() {
        let mut builder = MeshBuilder::new();
        builder.add_cylinder(&Point3d::origin(), &Point3d::origin(), 1.0, 8, true, colors::WHITE);
        assert!(builder.build().is_empty());
    }

    #[test]
    fn test_axes_extent_and_colors() {
        let mesh = axes_mesh();
        let bounds = mesh.bounds().unwrap();
        assert!((bounds.max.x - 1.0).abs() < 1e-6);
        assert!((bounds.max.y - 1.0).abs() < 1e-6);
        assert!((bounds.max.z - 1.0).abs() < 1e-6);

        let vertex_colors = mesh.colors.as_ref().unwrap();
        assert_eq!(vertex_colors.len(), mesh.num_points());
        assert!(vertex_colors.contains(&colors::RED) && vertex_colors.contains(&colors::BLUE));
    }
}
