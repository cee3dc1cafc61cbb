//! Ray/line-mesh intersection
//!
//! Triangles are bulk-loaded into an R*-tree once. A query walks only the
//! nodes whose boxes the query segment passes through and runs a
//! Möller–Trumbore test on the surviving triangles.

use rayon::prelude::*;
use rendercrate_core::{Aabb, Error, Point3d, Ray, Result, TriangleMesh, Vector3d};
use rstar::{RTree, RTreeObject, SelectionFunction, AABB};
use std::path::Path;

/// Barycentric slack so rays through shared edges and vertices still hit
const BARYCENTRIC_EPSILON: f64 = 1e-9;

/// Hits closer than this fraction of the mesh diagonal are merged
const MERGE_TOLERANCE: f64 = 1e-9;

/// One triangle of the indexed mesh
#[derive(Debug, Clone)]
struct IndexedTriangle {
    index: usize,
    corners: [Point3d; 3],
}

impl RTreeObject for IndexedTriangle {
    type Envelope = AABB<[f64; 3]>;

    fn envelope(&self) -> Self::Envelope {
        let [a, b, c] = self.corners;
        let lo = a.inf(&b).inf(&c);
        let hi = a.sup(&b).sup(&c);
        AABB::from_corners([lo.x, lo.y, lo.z], [hi.x, hi.y, hi.z])
    }
}

/// Selects tree nodes whose box intersects the segment `origin + t * delta`, `t` in [0, 1]
struct SegmentSelection {
    origin: Point3d,
    delta: Vector3d,
}

impl SegmentSelection {
    fn hits_box(&self, envelope: &AABB<[f64; 3]>) -> bool {
        let (lower, upper) = (envelope.lower(), envelope.upper());
        let mut t_enter = 0.0f64;
        let mut t_exit = 1.0f64;
        for axis in 0..3 {
            let o = self.origin[axis];
            let d = self.delta[axis];
            if d == 0.0 {
                if o < lower[axis] || o > upper[axis] {
                    return false;
                }
                continue;
            }
            let t1 = (lower[axis] - o) / d;
            let t2 = (upper[axis] - o) / d;
            t_enter = t_enter.max(t1.min(t2));
            t_exit = t_exit.min(t1.max(t2));
            if t_enter > t_exit {
                return false;
            }
        }
        true
    }
}

impl SelectionFunction<IndexedTriangle> for SegmentSelection {
    fn should_unpack_parent(&self, envelope: &AABB<[f64; 3]>) -> bool {
        self.hits_box(envelope)
    }

    fn should_unpack_leaf(&self, leaf: &IndexedTriangle) -> bool {
        self.hits_box(&leaf.envelope())
    }
}

/// A single segment/triangle hit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineHit {
    pub point: Point3d,
    /// Distance from the segment start
    pub distance: f64,
    pub triangle_index: usize,
}

/// Möller–Trumbore; returns the segment parameter in [0, 1]
fn intersect_triangle(origin: &Point3d, delta: &Vector3d, corners: &[Point3d; 3]) -> Option<f64> {
    let edge1 = corners[1] - corners[0];
    let edge2 = corners[2] - corners[0];
    let p = delta.cross(&edge2);
    let det = edge1.dot(&p);
    if det.abs() < f64::EPSILON * edge1.norm() * edge2.norm() * delta.norm() {
        return None;
    }
    let inv_det = 1.0 / det;

    let s = origin - corners[0];
    let u = s.dot(&p) * inv_det;
    if u < -BARYCENTRIC_EPSILON || u > 1.0 + BARYCENTRIC_EPSILON {
        return None;
    }

    let q = s.cross(&edge1);
    let v = delta.dot(&q) * inv_det;
    if v < -BARYCENTRIC_EPSILON || u + v > 1.0 + BARYCENTRIC_EPSILON {
        return None;
    }

    let t = edge2.dot(&q) * inv_det;
    (0.0..=1.0).contains(&t).then_some(t)
}

/// Intersection queries against one mesh
pub struct MeshIntersector {
    mesh: TriangleMesh,
    tree: RTree<IndexedTriangle>,
    bounds: Aabb,
    corners: [Point3d; 8],
}

impl MeshIntersector {
    /// Index a mesh. Point clouds have nothing to intersect and are rejected.
    pub fn new(mesh: TriangleMesh) -> Result<Self> {
        if mesh.num_polygons() == 0 {
            return Err(Error::GeometryMismatch(
                "intersection queries need a mesh with polygons".to_string(),
            ));
        }
        mesh.validate()?;

        let (tree, bounds) = build_index(&mesh)?;
        log::info!(
            "Indexed {} triangles for intersection queries",
            mesh.num_polygons()
        );
        Ok(Self {
            mesh,
            tree,
            corners: bounds.corners(),
            bounds,
        })
    }

    /// Load a mesh file and index it
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::new(rendercrate_io::read_poly_data(path)?)
    }

    pub fn mesh(&self) -> &TriangleMesh {
        &self.mesh
    }

    pub fn bounds(&self) -> Aabb {
        self.bounds
    }

    pub fn bounding_box_corner_points(&self) -> &[Point3d; 8] {
        &self.corners
    }

    /// Largest distance from `query` to any bounding box corner. Every point
    /// of the mesh lies within this distance of `query`.
    pub fn compute_max_distance_upper_bound(&self, query: &Point3d) -> f64 {
        self.corners
            .iter()
            .map(|c| (c - query).norm())
            .fold(0.0, f64::max)
    }

    /// All hits of the segment from `p1` to `p2`, nearest first.
    /// Hits on shared edges are reported once.
    pub fn compute_single_line_mesh_hits(&self, p1: &Point3d, p2: &Point3d) -> Vec<LineHit> {
        let delta = p2 - p1;
        let length = delta.norm();
        if length == 0.0 {
            return Vec::new();
        }

        let selection = SegmentSelection { origin: *p1, delta };
        let mut hits: Vec<LineHit> = self
            .tree
            .locate_with_selection_function(selection)
            .filter_map(|triangle| {
                intersect_triangle(p1, &delta, &triangle.corners).map(|t| LineHit {
                    point: p1 + delta * t,
                    distance: t * length,
                    triangle_index: triangle.index,
                })
            })
            .collect();

        hits.sort_by(|a, b| {
            a.distance
                .partial_cmp(&b.distance)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.triangle_index.cmp(&b.triangle_index))
        });

        let tolerance = MERGE_TOLERANCE * self.bounds.diagonal().norm().max(1.0);
        hits.dedup_by(|later, earlier| (later.distance - earlier.distance).abs() <= tolerance);
        hits
    }

    /// Intersection points of the segment from `p1` to `p2`, nearest first
    pub fn compute_single_line_mesh_intersection(&self, p1: &Point3d, p2: &Point3d) -> Vec<Point3d> {
        self.compute_single_line_mesh_hits(p1, p2)
            .into_iter()
            .map(|hit| hit.point)
            .collect()
    }

    /// All hits along a ray, nearest first. The ray is cut at the
    /// max-distance upper bound, which cannot lose a hit.
    pub fn compute_single_ray_mesh_intersections_sorted(&self, ray: &Ray) -> Vec<Point3d> {
        let length = self.compute_max_distance_upper_bound(&ray.origin);
        self.compute_single_line_mesh_intersection(&ray.origin, &ray.point_at(length))
    }

    pub fn compute_first_single_ray_mesh_intersection(&self, ray: &Ray) -> Option<Point3d> {
        self.compute_single_ray_mesh_intersections_sorted(ray)
            .into_iter()
            .next()
    }

    /// First hit of every ray, in ray order; rays that miss are dropped
    pub fn compute_rays_mesh_intersections(&self, rays: &[Ray]) -> Vec<Point3d> {
        let hits: Vec<Point3d> = rays
            .par_iter()
            .filter_map(|ray| self.compute_first_single_ray_mesh_intersection(ray))
            .collect();
        log::debug!("{} of {} rays hit the mesh", hits.len(), rays.len());
        hits
    }

    /// Scale the mesh about the origin and rebuild the index
    pub fn scale_mesh(&mut self, scale: f64) -> Result<()> {
        if !scale.is_finite() || scale == 0.0 {
            return Err(Error::InvalidData(format!("invalid mesh scale {}", scale)));
        }
        self.mesh.scale_uniform(scale as f32);
        let (tree, bounds) = build_index(&self.mesh)?;
        self.tree = tree;
        self.bounds = bounds;
        self.corners = bounds.corners();
        Ok(())
    }
}

fn build_index(mesh: &TriangleMesh) -> Result<(RTree<IndexedTriangle>, Aabb)> {
    let bounds = mesh
        .bounds()
        .ok_or_else(|| Error::InvalidData("mesh has no vertices".to_string()))?;
    let triangles = mesh
        .faces
        .iter()
        .enumerate()
        .map(|(index, face)| IndexedTriangle {
            index,
            corners: face.map(|i| mesh.vertices[i].cast::<f64>()),
        })
        .collect();
    Ok((RTree::bulk_load(triangles), bounds))
}
