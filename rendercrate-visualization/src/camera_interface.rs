//! Calibrated cameras to scene camera state
//!
//! A pose is applied in three steps: the scene camera is reset to a
//! baseline whose view transform is exactly the identity, the OpenGL
//! cam-to-world matrix is applied as a transform on top of it, and the
//! projection is derived from the calibration. When scene bounds are
//! known the clipping range is then fitted to them.

use crate::scene_camera::SceneCamera;
use nalgebra::{Matrix3, Matrix4};
use rendercrate_core::{
    compute_view_angle, convert_computer_vision_to_opengl_camera, Aabb, PinholeCamera, Result, Vector3d,
};

/// Default far plane for calibrated cameras
pub const DEFAULT_MAX_CLIPPING_RANGE: f64 = 100.0;

/// Sets intrinsics and extrinsics of a [`SceneCamera`]
#[derive(Debug, Clone, Copy, Default)]
pub struct CameraInterface;

impl CameraInterface {
    pub fn new() -> Self {
        Self
    }

    /// View angle from the focal length `calibration[0][0]`, clipping
    /// range `(0, max_clipping_range)`
    pub fn set_active_cam_intrinsics(
        &self,
        camera: &mut SceneCamera,
        calibration: &Matrix3<f64>,
        width: u32,
        height: u32,
        max_clipping_range: f64,
    ) {
        let view_angle = compute_view_angle(calibration[(0, 0)], width, height);
        camera.set_view_angle(view_angle);
        camera.set_clipping_range(0.0, max_clipping_range);
    }

    /// Convert a principal point in pixels to the camera's window center
    pub fn set_principal_point(&self, camera: &mut SceneCamera, principal_pt: (f64, f64), width: u32, height: u32) {
        let (w, h) = (width as f64, height as f64);
        let wcx = -2.0 * (principal_pt.0 - w / 2.0) / w;
        let wcy = 2.0 * (principal_pt.1 - h / 2.0) / h;
        camera.set_window_center(wcx, wcy);
    }

    /// Reset to the identity baseline and apply `cam_to_world_gl`
    pub fn set_active_cam_model_view_transformation(
        &self,
        camera: &mut SceneCamera,
        cam_to_world_gl: &Matrix4<f64>,
    ) -> Result<()> {
        camera.set_view_transform_to_identity()?;
        camera.apply_transform(cam_to_world_gl);
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    pub fn set_active_cam_from_opengl_cam_to_world_mat(
        &self,
        camera: &mut SceneCamera,
        scene_bounds: Option<&Aabb>,
        cam_to_world_gl: &Matrix4<f64>,
        calibration: &Matrix3<f64>,
        width: u32,
        height: u32,
        max_clipping_range: f64,
    ) -> Result<()> {
        log::info!("Setting active camera from OpenGL cam-to-world matrix");
        self.set_active_cam_intrinsics(camera, calibration, width, height, max_clipping_range);
        self.set_active_cam_model_view_transformation(camera, cam_to_world_gl)?;
        camera.reset_clipping_range(scene_bounds);
        log::debug!("Clipping range after reset: {:?}", camera.clipping_range());
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    pub fn set_active_cam_from_computer_vision_cam_to_world_mat(
        &self,
        camera: &mut SceneCamera,
        scene_bounds: Option<&Aabb>,
        cam_to_world_cv: &Matrix4<f64>,
        calibration: &Matrix3<f64>,
        width: u32,
        height: u32,
        max_clipping_range: f64,
    ) -> Result<()> {
        let cam_to_world_gl = convert_computer_vision_to_opengl_camera(cam_to_world_cv);
        self.set_active_cam_from_opengl_cam_to_world_mat(
            camera,
            scene_bounds,
            &cam_to_world_gl,
            calibration,
            width,
            height,
            max_clipping_range,
        )
    }

    pub fn set_active_cam_from_computer_vision_cam(
        &self,
        camera: &mut SceneCamera,
        scene_bounds: Option<&Aabb>,
        cam: &PinholeCamera,
        max_clipping_range: f64,
    ) -> Result<()> {
        let cv = cam.to_computer_vision();
        self.set_active_cam_from_computer_vision_cam_to_world_mat(
            camera,
            scene_bounds,
            &cv.cam_to_world,
            &cv.calibration,
            cv.width,
            cv.height,
            max_clipping_range,
        )
    }

    pub fn set_active_cam_from_opengl_cam(
        &self,
        camera: &mut SceneCamera,
        scene_bounds: Option<&Aabb>,
        cam: &PinholeCamera,
        max_clipping_range: f64,
    ) -> Result<()> {
        let gl = cam.to_opengl();
        self.set_active_cam_from_opengl_cam_to_world_mat(
            camera,
            scene_bounds,
            &gl.cam_to_world,
            &gl.calibration,
            gl.width,
            gl.height,
            max_clipping_range,
        )
    }

    /// Position, focal point and view-up taken one by one from the pose.
    /// Yields the same view transform as the matrix path; the clipping
    /// range is not fitted to the scene.
    pub fn set_active_cam_from_opengl_cam_legacy(
        &self,
        camera: &mut SceneCamera,
        cam: &PinholeCamera,
        max_clipping_range: f64,
    ) {
        let gl = cam.to_opengl();
        let center = gl.camera_center();
        camera.set_position(center);
        camera.set_focal_point(center + gl.cam_direction_to_world_direction(&-Vector3d::z()));
        camera.set_view_up(gl.cam_direction_to_world_direction(&Vector3d::y()));

        camera.set_view_angle(gl.view_angle());
        camera.set_clipping_range(0.0, max_clipping_range);
    }

    /// Log position, view-up and focal point
    pub fn describe_active_camera_pose(&self, camera: &SceneCamera) {
        log::info!(
            "Camera position {:?}, view-up {:?}, focal point {:?}",
            camera.position(),
            camera.view_up(),
            camera.focal_point()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::{Rotation3, Translation3};
    use rendercrate_core::{calibration_matrix, CameraConvention, Point3d};

    fn sample_camera(convention: CameraConvention) -> PinholeCamera {
        let pose = Translation3::new(0.5, -1.0, 4.0).to_homogeneous()
            * Rotation3::from_euler_angles(0.2, 0.7, -0.4).to_homogeneous();
        PinholeCamera::new(640, 480, calibration_matrix(525.0, 525.0, 319.5, 239.5), pose, convention).unwrap()
    }

    #[test]
    fn test_matrix_and_legacy_paths_agree() {
        let interface = CameraInterface::new();
        for convention in [CameraConvention::OpenGl, CameraConvention::ComputerVision] {
            let cam = sample_camera(convention);

            let mut direct = SceneCamera::new();
            interface
                .set_active_cam_from_opengl_cam(&mut direct, None, &cam, DEFAULT_MAX_CLIPPING_RANGE)
                .unwrap();

            let mut legacy = SceneCamera::new();
            interface.set_active_cam_from_opengl_cam_legacy(&mut legacy, &cam, DEFAULT_MAX_CLIPPING_RANGE);

            assert_relative_eq!(
                direct.view_transform_matrix(),
                legacy.view_transform_matrix(),
                epsilon = 1e-9
            );
            assert_relative_eq!(direct.view_angle(), legacy.view_angle(), epsilon = 1e-12);
        }
    }

    #[test]
    fn test_view_transform_inverts_pose() {
        let interface = CameraInterface::new();
        let cam = sample_camera(CameraConvention::OpenGl);
        let mut camera = SceneCamera::new();
        interface
            .set_active_cam_model_view_transformation(&mut camera, &cam.cam_to_world)
            .unwrap();

        assert_relative_eq!(
            camera.view_transform_matrix() * cam.cam_to_world,
            Matrix4::identity(),
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_computer_vision_camera_looks_along_positive_z() {
        let interface = CameraInterface::new();
        let mut camera = SceneCamera::new();
        interface
            .set_active_cam_from_computer_vision_cam_to_world_mat(
                &mut camera,
                None,
                &Matrix4::identity(),
                &calibration_matrix(500.0, 500.0, 320.0, 240.0),
                640,
                480,
                DEFAULT_MAX_CLIPPING_RANGE,
            )
            .unwrap();

        assert_relative_eq!(camera.direction_of_projection(), Vector3d::z(), epsilon = 1e-12);
        assert_relative_eq!(camera.view_up(), -Vector3d::y(), epsilon = 1e-12);
        assert_relative_eq!(camera.view_angle(), compute_view_angle(500.0, 640, 480));
    }

    #[test]
    fn test_clipping_range_fits_scene() {
        let interface = CameraInterface::new();
        let mut camera = SceneCamera::new();
        let bounds = Aabb::new(Point3d::new(-1.0, -1.0, 4.0), Point3d::new(1.0, 1.0, 6.0));
        interface
            .set_active_cam_from_computer_vision_cam_to_world_mat(
                &mut camera,
                Some(&bounds),
                &Matrix4::identity(),
                &calibration_matrix(500.0, 500.0, 320.0, 240.0),
                640,
                480,
                DEFAULT_MAX_CLIPPING_RANGE,
            )
            .unwrap();

        let (near, far) = camera.clipping_range();
        assert!(near > 0.0 && near < 4.0);
        assert!(far > 6.0 && far < DEFAULT_MAX_CLIPPING_RANGE);
    }

    #[test]
    fn test_principal_point_to_window_center() {
        let interface = CameraInterface::new();
        let mut camera = SceneCamera::new();
        interface.set_principal_point(&mut camera, (320.0, 240.0), 640, 480);
        assert_eq!(camera.window_center(), (0.0, 0.0));

        interface.set_principal_point(&mut camera, (480.0, 120.0), 640, 480);
        assert_relative_eq!(camera.window_center().0, -0.5);
        assert_relative_eq!(camera.window_center().1, -0.5);
    }
}
