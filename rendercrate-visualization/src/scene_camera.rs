//! Scene camera with VTK semantics
//!
//! The camera is described by a position, a focal point and a view-up
//! vector, a vertical view angle, a clipping range and a window center
//! (the principal point offset in normalized viewport units). Projection
//! matrices follow OpenGL conventions (NDC depth in [-1, 1]);
//! [`SceneCamera::wgpu_view_projection`] remaps them for the GPU so the
//! stored depth equals the OpenGL window depth.

use nalgebra::{Matrix4, Rotation3, Unit};
use rendercrate_core::{Aabb, Error, Point3d, Result, Vector3d};
use serde::{Deserialize, Serialize};

const MIN_CLIPPING_DISTANCE: f64 = 1e-20;
const CLIPPING_RANGE_EXPANSION: f64 = 0.5;
const NEAR_CLIPPING_PLANE_TOLERANCE: f64 = 0.001;

/// Maps OpenGL clip depth [-1, 1] onto the [0, 1] range used by wgpu
pub fn opengl_to_wgpu_depth() -> Matrix4<f64> {
    Matrix4::new(
        1.0, 0.0, 0.0, 0.0,
        0.0, 1.0, 0.0, 0.0,
        0.0, 0.0, 0.5, 0.5,
        0.0, 0.0, 0.0, 1.0,
    )
}

/// OpenGL perspective frustum
fn frustum(left: f64, right: f64, bottom: f64, top: f64, near: f64, far: f64) -> Matrix4<f64> {
    let mut m = Matrix4::zeros();
    m[(0, 0)] = 2.0 * near / (right - left);
    m[(0, 2)] = (left + right) / (right - left);
    m[(1, 1)] = 2.0 * near / (top - bottom);
    m[(1, 2)] = (bottom + top) / (top - bottom);
    m[(2, 2)] = -(far + near) / (far - near);
    m[(2, 3)] = -2.0 * far * near / (far - near);
    m[(3, 2)] = -1.0;
    m
}

fn any_perpendicular(v: &Vector3d) -> Vector3d {
    let helper = if v.x.abs() < 0.9 { Vector3d::x() } else { Vector3d::y() };
    v.cross(&helper).normalize()
}

/// A perspective camera looking from `position` at `focal_point`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneCamera {
    position: Point3d,
    focal_point: Point3d,
    view_up: Vector3d,
    view_angle: f64,
    clipping_range: (f64, f64),
    window_center: (f64, f64),
}

impl Default for SceneCamera {
    fn default() -> Self {
        Self {
            position: Point3d::new(0.0, 0.0, 1.0),
            focal_point: Point3d::origin(),
            view_up: Vector3d::y(),
            view_angle: 30.0,
            clipping_range: (0.01, 1000.01),
            window_center: (0.0, 0.0),
        }
    }
}

impl SceneCamera {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn position(&self) -> Point3d {
        self.position
    }

    pub fn set_position(&mut self, position: Point3d) {
        self.position = position;
    }

    pub fn focal_point(&self) -> Point3d {
        self.focal_point
    }

    pub fn set_focal_point(&mut self, focal_point: Point3d) {
        self.focal_point = focal_point;
    }

    pub fn view_up(&self) -> Vector3d {
        self.view_up
    }

    /// Set the view-up direction; it is stored normalized. A zero vector
    /// is ignored.
    pub fn set_view_up(&mut self, view_up: Vector3d) {
        match view_up.try_normalize(f64::EPSILON) {
            Some(v) => self.view_up = v,
            None => log::warn!("Ignoring zero view-up vector"),
        }
    }

    /// Vertical view angle in degrees
    pub fn view_angle(&self) -> f64 {
        self.view_angle
    }

    pub fn set_view_angle(&mut self, degrees: f64) {
        self.view_angle = degrees.clamp(1e-8, 179.0);
    }

    pub fn clipping_range(&self) -> (f64, f64) {
        self.clipping_range
    }

    /// Set near and far plane distances. They are swapped when given in
    /// the wrong order, and the near plane and the thickness are kept
    /// above 1e-20.
    pub fn set_clipping_range(&mut self, near: f64, far: f64) {
        let (mut near, mut far) = if near > far { (far, near) } else { (near, far) };
        if near < MIN_CLIPPING_DISTANCE {
            near = MIN_CLIPPING_DISTANCE;
        }
        if far - near < MIN_CLIPPING_DISTANCE {
            far = near + MIN_CLIPPING_DISTANCE;
        }
        self.clipping_range = (near, far);
    }

    pub fn window_center(&self) -> (f64, f64) {
        self.window_center
    }

    pub fn set_window_center(&mut self, x: f64, y: f64) {
        self.window_center = (x, y);
    }

    /// Distance between position and focal point
    pub fn distance(&self) -> f64 {
        (self.focal_point - self.position).norm()
    }

    /// Unit vector from the position towards the focal point
    pub fn direction_of_projection(&self) -> Vector3d {
        (self.focal_point - self.position)
            .try_normalize(f64::EPSILON)
            .unwrap_or(-Vector3d::z())
    }

    /// World-to-camera transform (the "view transform")
    pub fn view_transform_matrix(&self) -> Matrix4<f64> {
        let forward = self.direction_of_projection();
        let right = forward
            .cross(&self.view_up)
            .try_normalize(f64::EPSILON)
            .unwrap_or_else(|| any_perpendicular(&forward));
        let up = right.cross(&forward);
        let eye = self.position.coords;

        Matrix4::new(
            right.x, right.y, right.z, -right.dot(&eye),
            up.x, up.y, up.z, -up.dot(&eye),
            -forward.x, -forward.y, -forward.z, forward.dot(&eye),
            0.0, 0.0, 0.0, 1.0,
        )
    }

    /// Place the camera at the origin looking down -Z with +Y up. The view
    /// transform is then exactly the identity.
    pub fn set_view_transform_to_identity(&mut self) -> Result<()> {
        self.focal_point = Point3d::new(0.0, 0.0, -1.0);
        self.view_up = Vector3d::y();
        self.position = Point3d::origin();

        let view = self.view_transform_matrix();
        if view != Matrix4::identity() {
            return Err(Error::Usage(format!(
                "camera baseline does not yield an identity view transform: {}",
                view
            )));
        }
        Ok(())
    }

    /// Transform position, focal point and view-up by `transform`
    pub fn apply_transform(&mut self, transform: &Matrix4<f64>) {
        let position = transform.transform_point(&self.position);
        let focal_point = transform.transform_point(&self.focal_point);
        let up_point = transform.transform_point(&(self.position + self.view_up));

        self.position = position;
        self.focal_point = focal_point;
        self.set_view_up(up_point - position);
    }

    /// OpenGL projection for a viewport of the given aspect ratio
    pub fn projection_matrix(&self, aspect: f64) -> Matrix4<f64> {
        let (near, far) = self.clipping_range;
        let height = near * (self.view_angle.to_radians() / 2.0).tan();
        let width = height * aspect;
        let (wx, wy) = self.window_center;

        frustum(
            (wx - 1.0) * width,
            (wx + 1.0) * width,
            (wy - 1.0) * height,
            (wy + 1.0) * height,
            near,
            far,
        )
    }

    /// Projection times view transform
    pub fn composite_projection_matrix(&self, aspect: f64) -> Matrix4<f64> {
        self.projection_matrix(aspect) * self.view_transform_matrix()
    }

    /// World to wgpu clip space
    pub fn wgpu_view_projection(&self, aspect: f64) -> Matrix4<f64> {
        opengl_to_wgpu_depth() * self.composite_projection_matrix(aspect)
    }

    /// Fit the clipping range to `bounds`. Empty or invalid bounds leave
    /// the range untouched.
    pub fn reset_clipping_range(&mut self, bounds: Option<&Aabb>) {
        let Some(bounds) = bounds.filter(|b| b.is_valid()) else {
            return;
        };

        let direction = self.direction_of_projection();
        let (mut near, mut far) = bounds
            .corners()
            .iter()
            .map(|c| direction.dot(&(c - self.position)))
            .fold((f64::MAX, f64::MIN), |(lo, hi), d| (lo.min(d), hi.max(d)));

        // Geometry behind the camera does not count
        near = near.max(0.0);
        far = far.max(0.0);
        if far <= 0.0 {
            log::debug!("Scene is behind the camera, keeping clipping range {:?}", self.clipping_range);
            return;
        }

        let expansion = (far - near) * CLIPPING_RANGE_EXPANSION;
        near = 0.99 * near - expansion;
        far = 1.01 * far + expansion;
        if near >= far {
            near = 0.01 * far;
        }
        if near < NEAR_CLIPPING_PLANE_TOLERANCE * far {
            near = NEAR_CLIPPING_PLANE_TOLERANCE * far;
        }
        self.set_clipping_range(near, far);
    }

    /// Move the camera along its viewing direction so the bounding sphere
    /// of `bounds` fills the view, then reset the clipping range
    pub fn reset_camera(&mut self, bounds: Option<&Aabb>) {
        let Some(bounds) = bounds.filter(|b| b.is_valid()) else {
            log::warn!("Cannot reset camera: no visible geometry");
            return;
        };

        let center = bounds.center();
        let mut radius = bounds.diagonal().norm();
        if radius == 0.0 {
            radius = 1.0;
        }
        radius *= 0.5;
        let distance = radius / (self.view_angle.to_radians() * 0.5).sin();

        let view_plane_normal = -self.direction_of_projection();
        if self.view_up.dot(&view_plane_normal).abs() > 0.999 {
            log::warn!("Resetting view-up since it is parallel to the view plane normal");
            let vu = self.view_up;
            self.set_view_up(Vector3d::new(-vu.z, vu.x, vu.y));
        }

        self.focal_point = center;
        self.position = center + view_plane_normal * distance;
        self.reset_clipping_range(Some(bounds));
    }

    fn rotate_position_about_focal_point(&mut self, axis: &Vector3d, degrees: f64) {
        let Some(axis) = Unit::try_new(*axis, f64::EPSILON) else {
            return;
        };
        let rotation = Rotation3::from_axis_angle(&axis, degrees.to_radians());
        self.position = self.focal_point + rotation * (self.position - self.focal_point);
    }

    /// Rotate the position about the view-up vector centered at the focal point
    pub fn azimuth(&mut self, degrees: f64) {
        let axis = self.view_up;
        self.rotate_position_about_focal_point(&axis, degrees);
    }

    /// Rotate the position about the camera's horizontal axis centered at the
    /// focal point. Positive angles move the camera up.
    pub fn elevation(&mut self, degrees: f64) {
        let view = self.view_transform_matrix();
        let right = Vector3d::new(view[(0, 0)], view[(0, 1)], view[(0, 2)]);
        self.rotate_position_about_focal_point(&-right, degrees);
    }

    /// Divide the camera's distance from the focal point by `factor`
    pub fn dolly(&mut self, factor: f64) {
        if factor <= 0.0 {
            return;
        }
        let distance = self.distance() / factor;
        self.position = self.focal_point - self.direction_of_projection() * distance;
    }

    /// Translate position and focal point together
    pub fn pan(&mut self, offset: &Vector3d) {
        self.position += offset;
        self.focal_point += offset;
    }

    /// Make the view-up perpendicular to the direction of projection
    pub fn orthogonalize_view_up(&mut self) {
        let view = self.view_transform_matrix();
        self.set_view_up(Vector3d::new(view[(1, 0)], view[(1, 1)], view[(1, 2)]));
    }
}
