//! Pinhole camera model and camera coordinate conventions
//!
//! Computer-vision cameras look down +Z with +Y pointing down the image;
//! OpenGL cameras look down -Z with +Y up. Both share +X. A cam-to-world
//! matrix is converted between the two by flipping the Y and Z axes of the
//! camera frame, i.e. right-multiplying with `diag(1, -1, -1, 1)`.

use crate::error::{Error, Result};
use crate::point::{Point3d, Vector3d};
use nalgebra::{Matrix3, Matrix4, Vector4};
use serde::{Deserialize, Serialize};

/// Axis convention of a camera frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CameraConvention {
    /// Z forward, Y down
    ComputerVision,
    /// Z backward, Y up
    OpenGl,
}

/// Basis change between the computer-vision and OpenGL camera frames.
/// It is its own inverse.
pub fn cv_gl_basis_change() -> Matrix4<f64> {
    Matrix4::from_diagonal(&Vector4::new(1.0, -1.0, -1.0, 1.0))
}

pub fn convert_computer_vision_to_opengl_camera(cam_to_world_cv: &Matrix4<f64>) -> Matrix4<f64> {
    cam_to_world_cv * cv_gl_basis_change()
}

pub fn convert_opengl_to_computer_vision_camera(cam_to_world_gl: &Matrix4<f64>) -> Matrix4<f64> {
    cam_to_world_gl * cv_gl_basis_change()
}

/// Vertical field of view in degrees for a focal length given in pixels
pub fn compute_view_angle(focal_length: f64, _width: u32, height: u32) -> f64 {
    2.0 * (height as f64 / (2.0 * focal_length)).atan().to_degrees()
}

/// Build a calibration matrix from focal lengths and principal point
pub fn calibration_matrix(fx: f64, fy: f64, cx: f64, cy: f64) -> Matrix3<f64> {
    Matrix3::new(
        fx, 0.0, cx,
        0.0, fy, cy,
        0.0, 0.0, 1.0,
    )
}

/// A calibrated pinhole camera with its pose
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PinholeCamera {
    pub width: u32,
    pub height: u32,
    pub calibration: Matrix3<f64>,
    pub cam_to_world: Matrix4<f64>,
    pub convention: CameraConvention,
}

impl PinholeCamera {
    pub fn new(
        width: u32,
        height: u32,
        calibration: Matrix3<f64>,
        cam_to_world: Matrix4<f64>,
        convention: CameraConvention,
    ) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidData(format!(
                "camera size must be positive, got {}x{}",
                width, height
            )));
        }
        if calibration[(0, 0)] <= 0.0 {
            return Err(Error::InvalidData(format!(
                "focal length must be positive, got {}",
                calibration[(0, 0)]
            )));
        }
        Ok(Self {
            width,
            height,
            calibration,
            cam_to_world,
            convention,
        })
    }

    pub fn focal_length(&self) -> f64 {
        self.calibration[(0, 0)]
    }

    pub fn principal_point(&self) -> (f64, f64) {
        (self.calibration[(0, 2)], self.calibration[(1, 2)])
    }

    /// Vertical field of view in degrees
    pub fn view_angle(&self) -> f64 {
        compute_view_angle(self.focal_length(), self.width, self.height)
    }

    /// The same camera expressed in OpenGL convention
    pub fn to_opengl(&self) -> Self {
        match self.convention {
            CameraConvention::OpenGl => self.clone(),
            CameraConvention::ComputerVision => Self {
                cam_to_world: convert_computer_vision_to_opengl_camera(&self.cam_to_world),
                convention: CameraConvention::OpenGl,
                ..self.clone()
            },
        }
    }

    /// The same camera expressed in computer-vision convention
    pub fn to_computer_vision(&self) -> Self {
        match self.convention {
            CameraConvention::ComputerVision => self.clone(),
            CameraConvention::OpenGl => Self {
                cam_to_world: convert_opengl_to_computer_vision_camera(&self.cam_to_world),
                convention: CameraConvention::ComputerVision,
                ..self.clone()
            },
        }
    }

    pub fn camera_center(&self) -> Point3d {
        Point3d::new(
            self.cam_to_world[(0, 3)],
            self.cam_to_world[(1, 3)],
            self.cam_to_world[(2, 3)],
        )
    }

    pub fn rotation(&self) -> Matrix3<f64> {
        self.cam_to_world.fixed_view::<3, 3>(0, 0).into_owned()
    }

    /// Rotate a camera-frame direction into the world frame
    pub fn cam_direction_to_world_direction(&self, direction: &Vector3d) -> Vector3d {
        self.rotation() * direction
    }

    /// Project a world point to pixel coordinates (column, row, depth along
    /// the optical axis). Row 0 is the image top. `None` behind the camera.
    pub fn project_to_pixel(&self, world: &Point3d) -> Option<(f64, f64, f64)> {
        let cv = self.to_computer_vision();
        let world_to_cam = cv.cam_to_world.try_inverse()?;
        let p = world_to_cam.transform_point(world);
        if p.z <= 0.0 {
            return None;
        }
        let k = &self.calibration;
        let u = k[(0, 0)] * p.x / p.z + k[(0, 1)] * p.y / p.z + k[(0, 2)];
        let v = k[(1, 1)] * p.y / p.z + k[(1, 2)];
        Some((u, v, p.z))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::{Rotation3, Translation3};

    fn sample_pose() -> Matrix4<f64> {
        let rotation = Rotation3::from_euler_angles(0.3, -0.2, 1.1);
        Translation3::new(1.0, 2.0, -3.0).to_homogeneous() * rotation.to_homogeneous()
    }

    #[test]
    fn test_conversion_is_involution() {
        let pose = sample_pose();
        let back = convert_opengl_to_computer_vision_camera(
            &convert_computer_vision_to_opengl_camera(&pose),
        );
        assert_relative_eq!(back, pose, epsilon = 1e-12);
    }

    #[test]
    fn test_conversion_flips_view_direction() {
        let cam = PinholeCamera::new(
            640,
            480,
            calibration_matrix(500.0, 500.0, 320.0, 240.0),
            sample_pose(),
            CameraConvention::ComputerVision,
        )
        .unwrap();
        let gl = cam.to_opengl();

        let forward_cv = cam.cam_direction_to_world_direction(&Vector3d::z());
        let forward_gl = gl.cam_direction_to_world_direction(&-Vector3d::z());
        assert_relative_eq!(forward_cv, forward_gl, epsilon = 1e-12);
        assert_eq!(cam.camera_center(), gl.camera_center());
    }

    #[test]
    fn test_view_angle() {
        // 2 * atan(240 / 240) = 90 degrees
        assert_relative_eq!(compute_view_angle(240.0, 640, 480), 90.0, epsilon = 1e-12);
    }

    #[test]
    fn test_project_principal_point() {
        let cam = PinholeCamera::new(
            640,
            480,
            calibration_matrix(500.0, 500.0, 320.0, 240.0),
            Matrix4::identity(),
            CameraConvention::ComputerVision,
        )
        .unwrap();
        let (u, v, depth) = cam.project_to_pixel(&Point3d::new(0.0, 0.0, 4.0)).unwrap();
        assert_relative_eq!(u, 320.0);
        assert_relative_eq!(v, 240.0);
        assert_relative_eq!(depth, 4.0);
        assert!(cam.project_to_pixel(&Point3d::new(0.0, 0.0, -1.0)).is_none());
    }

    #[test]
    fn test_rejects_bad_intrinsics() {
        let result = PinholeCamera::new(
            640,
            480,
            calibration_matrix(0.0, 0.0, 320.0, 240.0),
            Matrix4::identity(),
            CameraConvention::OpenGl,
        );
        assert!(result.is_err());
    }
}
