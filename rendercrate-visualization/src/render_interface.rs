//! Render facade
//!
//! [`RenderInterface`] owns the scene, the active camera and the GPU state
//! and composes the camera, z-buffer, image buffer and coordinate axes
//! components. Offscreen instances render into a texture and support
//! read-back; interactive instances open a window in
//! [`RenderInterface::start_interactor`].

use crate::actor::Actor;
use crate::camera_interface::CameraInterface;
use crate::coordinate_axes::CoordinateAxesInterface;
use crate::frame::RenderedFrame;
use crate::image_buffer::ImageBufferInterface;
use crate::interactor;
use crate::scene::Scene;
use crate::scene_camera::SceneCamera;
use crate::zbuffer::{ZBuffer, ZBufferInterface};
use nalgebra::{Matrix3, Matrix4};
use ndarray::{Array1, Array2, Array3};
use rendercrate_core::{Drawable, Error, PinholeCamera, Point3d, Point3f, Result, Rgb8};
use rendercrate_gpu::{GpuContext, Layer, OffscreenTarget, SceneRenderer};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Construction parameters of a [`RenderInterface`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderInterfaceConfig {
    pub off_screen_rendering: bool,
    pub width: u32,
    pub height: u32,
    /// RGB in [0, 1]
    pub background_color: [f32; 3],
    /// Window title in interactive mode
    pub title: String,
}

impl Default for RenderInterfaceConfig {
    fn default() -> Self {
        Self {
            off_screen_rendering: true,
            width: 640,
            height: 480,
            background_color: [0.0, 0.0, 1.0],
            title: "rendercrate".to_string(),
        }
    }
}

/// Lifecycle of a [`RenderInterface`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderState {
    Constructed,
    /// Actors or camera changed since construction or the last render
    Configured,
    Rendered,
    /// Terminal once the interactor has been started
    InteractiveRunning,
}

struct OffscreenGpu {
    gpu: GpuContext,
    renderer: SceneRenderer,
    target: OffscreenTarget,
}

impl OffscreenGpu {
    fn new(width: u32, height: u32) -> Result<Self> {
        let gpu = pollster::block_on(GpuContext::new())?;
        let renderer = SceneRenderer::offscreen(&gpu)?;
        let target = OffscreenTarget::new(&gpu, width, height)?;
        Ok(Self { gpu, renderer, target })
    }

    fn render(&self, scene: &Scene, camera: &SceneCamera) -> Result<RenderedFrame> {
        let (width, height) = (self.target.width(), self.target.height());
        let gpu_scene = self.renderer.upload(&self.gpu, &scene.draw_items());
        let frame = self
            .renderer
            .create_frame_binding(&self.gpu, &interactor::frame_uniforms(camera, width, height));
        let layer = Layer {
            scene: &gpu_scene,
            frame: &frame,
            viewport: None,
        };
        self.renderer
            .render(&self.gpu, self.target.views(), scene.background_rgba(), &[layer])?;

        let depth = self.target.read_depth(&self.gpu)?;
        let rgba = self.target.read_rgba(&self.gpu)?;
        RenderedFrame::new(width, height, depth, rgba, camera.clone())
    }
}

/// Scene, camera and renderer behind one facade
pub struct RenderInterface {
    config: RenderInterfaceConfig,
    state: RenderState,
    scene: Scene,
    camera: SceneCamera,
    camera_interface: CameraInterface,
    z_buffer_interface: ZBufferInterface,
    image_buffer_interface: ImageBufferInterface,
    coordinate_axes_interface: CoordinateAxesInterface,
    offscreen: Option<OffscreenGpu>,
    frame: Option<RenderedFrame>,
}

impl RenderInterface {
    /// Validate the configuration and put the camera at the identity
    /// baseline. No GPU resources are acquired until the first render.
    pub fn new(config: RenderInterfaceConfig) -> Result<Self> {
        if config.width == 0 || config.height == 0 {
            return Err(Error::InvalidData(format!(
                "render size must be non-zero, got {}x{}",
                config.width, config.height
            )));
        }

        let mut camera = SceneCamera::new();
        camera.set_view_transform_to_identity()?;
        log::info!(
            "Created {} render interface {}x{}",
            if config.off_screen_rendering { "offscreen" } else { "interactive" },
            config.width,
            config.height
        );

        Ok(Self {
            scene: Scene::new(config.background_color),
            config,
            state: RenderState::Constructed,
            camera,
            camera_interface: CameraInterface::new(),
            z_buffer_interface: ZBufferInterface::new(),
            image_buffer_interface: ImageBufferInterface::new(),
            coordinate_axes_interface: CoordinateAxesInterface::new(),
            offscreen: None,
            frame: None,
        })
    }

    pub fn config(&self) -> &RenderInterfaceConfig {
        &self.config
    }

    pub fn state(&self) -> RenderState {
        self.state
    }

    pub fn width(&self) -> u32 {
        self.config.width
    }

    pub fn height(&self) -> u32 {
        self.config.height
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        self.touch();
        &mut self.scene
    }

    pub fn get_active_camera(&self) -> &SceneCamera {
        &self.camera
    }

    pub fn get_active_camera_mut(&mut self) -> &mut SceneCamera {
        self.touch();
        &mut self.camera
    }

    /// The last offscreen render
    pub fn last_frame(&self) -> Option<&RenderedFrame> {
        self.frame.as_ref()
    }

    fn touch(&mut self) {
        if self.state != RenderState::InteractiveRunning {
            self.state = RenderState::Configured;
        }
    }

    pub fn add_actor(&mut self, actor: Actor) -> usize {
        self.touch();
        self.scene.add_actor(actor)
    }

    pub fn add_point_cloud(&mut self, coords: &[Point3f], colors: Option<&[Rgb8]>) -> Result<()> {
        let actor = Actor::point_cloud(coords, colors)?;
        self.add_actor(actor);
        Ok(())
    }

    pub fn load_vtk_mesh_or_point_cloud<P: AsRef<Path>>(&mut self, path: P, texture_path: Option<&Path>) -> Result<()> {
        let path = path.as_ref();
        log::info!("Loading {}", path.display());
        let actor = Actor::mesh_or_point_cloud_from_file(path, texture_path)?;
        self.add_actor(actor);
        Ok(())
    }

    /// Point the camera at the bounding sphere of all visible actors
    pub fn look_with_camera_on_scene(&mut self) {
        let bounds = self.scene.bounds();
        self.touch();
        self.camera.reset_camera(bounds.as_ref());
    }

    pub fn set_active_cam_intrinsics(&mut self, calibration: &Matrix3<f64>, width: u32, height: u32, max_clipping_range: f64) {
        self.touch();
        self.camera_interface
            .set_active_cam_intrinsics(&mut self.camera, calibration, width, height, max_clipping_range);
    }

    pub fn set_principal_point(&mut self, principal_pt: (f64, f64), width: u32, height: u32) {
        self.touch();
        self.camera_interface
            .set_principal_point(&mut self.camera, principal_pt, width, height);
    }

    pub fn set_active_cam_model_view_transformation(&mut self, cam_to_world_gl: &Matrix4<f64>) -> Result<()> {
        self.touch();
        self.camera_interface
            .set_active_cam_model_view_transformation(&mut self.camera, cam_to_world_gl)
    }

    pub fn set_active_cam_model_view_transformation_to_identity(&mut self) -> Result<()> {
        self.touch();
        self.camera.set_view_transform_to_identity()
    }

    pub fn set_active_cam_from_opengl_cam_to_world_mat(
        &mut self,
        cam_to_world_gl: &Matrix4<f64>,
        calibration: &Matrix3<f64>,
        width: u32,
        height: u32,
        max_clipping_range: f64,
    ) -> Result<()> {
        let bounds = self.scene.bounds();
        self.touch();
        self.camera_interface.set_active_cam_from_opengl_cam_to_world_mat(
            &mut self.camera,
            bounds.as_ref(),
            cam_to_world_gl,
            calibration,
            width,
            height,
            max_clipping_range,
        )
    }

    pub fn set_active_cam_from_computer_vision_cam_to_world_mat(
        &mut self,
        cam_to_world_cv: &Matrix4<f64>,
        calibration: &Matrix3<f64>,
        width: u32,
        height: u32,
        max_clipping_range: f64,
    ) -> Result<()> {
        let bounds = self.scene.bounds();
        self.touch();
        self.camera_interface.set_active_cam_from_computer_vision_cam_to_world_mat(
            &mut self.camera,
            bounds.as_ref(),
            cam_to_world_cv,
            calibration,
            width,
            height,
            max_clipping_range,
        )
    }

    pub fn set_active_cam_from_computer_vision_cam(&mut self, cam: &PinholeCamera, max_clipping_range: f64) -> Result<()> {
        let bounds = self.scene.bounds();
        self.touch();
        self.camera_interface
            .set_active_cam_from_computer_vision_cam(&mut self.camera, bounds.as_ref(), cam, max_clipping_range)
    }

    pub fn set_active_cam_from_opengl_cam(&mut self, cam: &PinholeCamera, max_clipping_range: f64) -> Result<()> {
        let bounds = self.scene.bounds();
        self.touch();
        self.camera_interface
            .set_active_cam_from_opengl_cam(&mut self.camera, bounds.as_ref(), cam, max_clipping_range)
    }

    pub fn set_active_cam_from_opengl_cam_legacy(&mut self, cam: &PinholeCamera, max_clipping_range: f64) {
        self.touch();
        self.camera_interface
            .set_active_cam_from_opengl_cam_legacy(&mut self.camera, cam, max_clipping_range);
    }

    pub fn describe_active_camera_pose(&self) {
        self.camera_interface.describe_active_camera_pose(&self.camera);
    }

    /// Draw the scene once. Offscreen, the depth and color buffers are
    /// read back and kept as the last frame. Interactive instances draw in
    /// [`RenderInterface::start_interactor`].
    pub fn render(&mut self) -> Result<()> {
        if self.state == RenderState::InteractiveRunning {
            return Err(Error::Usage("cannot render after the interactor was started".to_string()));
        }
        if !self.config.off_screen_rendering {
            log::debug!("Interactive render deferred to the interactor");
            self.state = RenderState::Rendered;
            return Ok(());
        }

        if self.offscreen.is_none() {
            self.offscreen = Some(OffscreenGpu::new(self.config.width, self.config.height)?);
        }
        let offscreen = self
            .offscreen
            .as_ref()
            .ok_or_else(|| Error::Gpu("offscreen target is not available".to_string()))?;
        let frame = offscreen.render(&self.scene, &self.camera)?;
        log::debug!("Rendered {} actors into {}x{}", self.scene.len(), frame.width(), frame.height());

        self.frame = Some(frame);
        self.state = RenderState::Rendered;
        Ok(())
    }

    /// Open the interactive window and block until it is closed
    pub fn start_interactor(&mut self) -> Result<()> {
        if self.config.off_screen_rendering {
            return Err(Error::Usage("the interactor needs an interactive render interface".to_string()));
        }
        if self.state == RenderState::InteractiveRunning {
            return Err(Error::Usage("the interactor was already started".to_string()));
        }
        interactor::claim_session()?;
        self.state = RenderState::InteractiveRunning;

        interactor::run(
            &self.scene,
            &mut self.camera,
            &self.config.title,
            (self.config.width, self.config.height),
            self.coordinate_axes_interface.orientation_marker_shown(),
        )
    }

    pub fn render_and_start(&mut self) -> Result<()> {
        self.render()?;
        self.start_interactor()
    }

    fn rendered_frame(&self) -> Result<&RenderedFrame> {
        if !self.config.off_screen_rendering {
            return Err(Error::Usage("buffer read-back needs offscreen rendering".to_string()));
        }
        self.frame
            .as_ref()
            .ok_or_else(|| Error::Usage("buffer read-back needs a completed render()".to_string()))
    }

    pub fn get_z_buffer(&self) -> Result<&ZBuffer> {
        Ok(self.rendered_frame()?.z_buffer())
    }

    /// Row 0 is the bottom image row
    pub fn get_opengl_z_buffer_as_array(&self) -> Result<Array2<f32>> {
        Ok(self.get_z_buffer()?.opengl().to_owned())
    }

    /// Row 0 is the top image row
    pub fn get_computer_vision_z_buffer_as_array(&self) -> Result<Array2<f32>> {
        Ok(self.get_z_buffer()?.computer_vision())
    }

    pub fn get_z_buffer_sparse(&self, sparsity: usize) -> Result<Array1<f32>> {
        self.get_z_buffer()?.sparse(sparsity)
    }

    /// World points of the last render, using the camera of that render
    pub fn get_z_buffer_as_world_coords(&self, n_th_result_point: usize) -> Result<Vec<Point3d>> {
        let frame = self.rendered_frame()?;
        self.z_buffer_interface
            .convert_z_buffer_to_world_coords(frame.z_buffer().opengl(), frame.camera(), n_th_result_point)
    }

    pub fn get_pixel_z_values_as_world_coords(
        &self,
        pixel_z_values: &[Option<(f64, f64, f64)>],
        computer_vision_pixels: bool,
        none_values_allowed: bool,
    ) -> Result<Vec<Option<Point3d>>> {
        let frame = self.rendered_frame()?;
        self.z_buffer_interface.get_pixel_z_values_as_world_coords(
            pixel_z_values,
            frame.camera(),
            frame.width() as usize,
            frame.height() as usize,
            computer_vision_pixels,
            none_values_allowed,
        )
    }

    /// Linear depth of the last render, bottom row first; NaN without
    /// geometry
    pub fn get_depth_buffer(&self) -> Result<Array2<f64>> {
        let frame = self.rendered_frame()?;
        let (near, far) = frame.camera().clipping_range();
        Ok(frame.z_buffer().to_depth_buffer(near, far))
    }

    pub fn get_rgba_buffer_as_array(&self) -> Result<Array3<f32>> {
        self.image_buffer_interface.get_rgba_buffer(self.rendered_frame()?)
    }

    pub fn write_z_buffer_to_disc<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.z_buffer_interface.write_z_buffer_to_disc(self.get_z_buffer()?, path)
    }

    pub fn write_z_buffer_visualization_to_disc<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.z_buffer_interface
            .write_z_buffer_visualization_to_disc(self.get_z_buffer()?, path)
    }

    pub fn write_depth_buffer_to_disc<P: AsRef<Path>>(&self, path: P, scale: f64) -> Result<()> {
        let frame = self.rendered_frame()?;
        let (near, far) = frame.camera().clipping_range();
        self.z_buffer_interface
            .write_depth_buffer_to_disc(frame.z_buffer(), near, far, path, scale)
    }

    pub fn write_rgba_buffer_to_disc<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.image_buffer_interface
            .write_rgba_buffer_to_disc(self.rendered_frame()?, path)
    }

    pub fn show_global_coordinate_axes_widget(&mut self) {
        self.coordinate_axes_interface.show_global_coordinate_axes_widget();
    }

    pub fn add_coordinate_axes(&mut self, transformation: &Matrix4<f64>, no_labels: bool) {
        self.touch();
        self.coordinate_axes_interface
            .add_coordinate_axes(&mut self.scene, transformation, no_labels);
    }

    pub fn add_point(&mut self, p: Point3d, color: Rgb8, radius: f64) {
        self.touch();
        self.coordinate_axes_interface.add_point(&mut self.scene, p, color, radius);
    }

    pub fn add_line(&mut self, p1: Point3d, p2: Point3d, color: Rgb8, line_width: f32) {
        self.touch();
        self.coordinate_axes_interface
            .add_line(&mut self.scene, p1, p2, color, line_width);
    }

    #[allow(clippy::too_many_arguments)]
    pub fn add_coordinate_axes_custom(
        &mut self,
        cam_to_world_cv: &Matrix4<f64>,
        length: f64,
        line_width: f32,
        point_radius: f64,
        add_center: bool,
        add_endpoints: bool,
    ) {
        self.touch();
        self.coordinate_axes_interface.add_coordinate_axes_custom(
            &mut self.scene,
            cam_to_world_cv,
            length,
            line_width,
            point_radius,
            add_center,
            add_endpoints,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rendercrate_core::colors;

    fn interactive_config() -> RenderInterfaceConfig {
        RenderInterfaceConfig {
            off_screen_rendering: false,
            ..Default::default()
        }
    }

    #[test]
    fn test_new_sets_identity_camera() {
        let render = RenderInterface::new(RenderInterfaceConfig::default()).unwrap();
        assert_eq!(render.state(), RenderState::Constructed);
        assert_eq!(render.get_active_camera().view_transform_matrix(), Matrix4::identity());
        assert_eq!(render.scene().background_color, [0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_zero_size_is_rejected() {
        let config = RenderInterfaceConfig {
            width: 0,
            ..Default::default()
        };
        assert!(matches!(RenderInterface::new(config), Err(Error::InvalidData(_))));
    }

    #[test]
    fn test_read_back_before_render_is_usage_error() {
        let render = RenderInterface::new(RenderInterfaceConfig::default()).unwrap();
        assert!(matches!(render.get_z_buffer(), Err(Error::Usage(_))));
        assert!(matches!(render.get_depth_buffer(), Err(Error::Usage(_))));
        assert!(matches!(render.get_rgba_buffer_as_array(), Err(Error::Usage(_))));
    }

    #[test]
    fn test_interactive_read_back_is_usage_error() {
        let mut render = RenderInterface::new(interactive_config()).unwrap();
        render.add_point(Point3d::origin(), colors::RED, 0.1);
        render.render().unwrap();
        assert_eq!(render.state(), RenderState::Rendered);
        assert!(matches!(render.get_z_buffer(), Err(Error::Usage(_))));
        assert!(matches!(render.get_z_buffer_as_world_coords(1), Err(Error::Usage(_))));
        assert!(matches!(render.write_z_buffer_to_disc("unused.png"), Err(Error::Usage(_))));
    }

    #[test]
    fn test_offscreen_interactor_is_usage_error() {
        let mut render = RenderInterface::new(RenderInterfaceConfig::default()).unwrap();
        assert!(matches!(render.start_interactor(), Err(Error::Usage(_))));
    }

    #[test]
    fn test_mutations_mark_configured() {
        let mut render = RenderInterface::new(RenderInterfaceConfig::default()).unwrap();
        render.add_coordinate_axes_custom(&Matrix4::identity(), 1.0, 2.0, 0.05, true, false);
        assert_eq!(render.state(), RenderState::Configured);
        assert_eq!(render.scene().len(), 4);

        render.look_with_camera_on_scene();
        assert!(render.get_active_camera().distance() > 1.0);
    }
}
