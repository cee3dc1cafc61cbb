//! Interactive window with a trackball camera
//!
//! Left drag rotates the camera around its focal point, shift + left drag
//! or middle drag pans, right drag and the wheel dolly. `r` refits the
//! camera to the scene; `q`, `e` and Escape close the window.

use crate::actor::Actor;
use crate::scene::Scene;
use crate::scene_camera::SceneCamera;
use nalgebra::Matrix4;
use rendercrate_core::{Aabb, Drawable, Error, Result, Vector3d};
use rendercrate_gpu::{FrameBinding, FrameUniforms, GpuContext, GpuScene, Layer, SceneRenderer, WindowTarget};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use winit::{
    dpi::{PhysicalPosition, PhysicalSize},
    event::{ElementState, Event, MouseButton, MouseScrollDelta, WindowEvent},
    event_loop::{ControlFlow, EventLoop, EventLoopWindowTarget},
    keyboard::{Key, ModifiersState, NamedKey},
    window::{Window, WindowBuilder},
};

/// Degrees of rotation per window extent, scaled by the motion factor
const ROTATION_PER_EXTENT: f64 = 20.0;
const MOTION_FACTOR: f64 = 10.0;
const DOLLY_BASE: f64 = 1.1;
const WHEEL_MOTION_FACTOR: f64 = 0.2;

/// Fraction of the window taken by the orientation marker
const MARKER_VIEWPORT_FRACTION: f32 = 0.2;

static SESSION_STARTED: AtomicBool = AtomicBool::new(false);

/// Claim the single interactor session of this process
pub(crate) fn claim_session() -> Result<()> {
    if SESSION_STARTED.swap(true, Ordering::SeqCst) {
        return Err(Error::Usage(
            "only one interactor session can run per process".to_string(),
        ));
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Motion {
    Rotate,
    Pan,
    Dolly,
}

/// Mouse-driven camera manipulation in window pixels (y down)
#[derive(Debug, Clone)]
pub struct TrackballStyle {
    scene_bounds: Option<Aabb>,
    motion: Option<Motion>,
    last_cursor: Option<(f64, f64)>,
}

impl TrackballStyle {
    pub fn new(scene_bounds: Option<Aabb>) -> Self {
        Self {
            scene_bounds,
            motion: None,
            last_cursor: None,
        }
    }

    fn press(&mut self, button: MouseButton, modifiers: ModifiersState) {
        self.motion = match button {
            MouseButton::Left if modifiers.shift_key() => Some(Motion::Pan),
            MouseButton::Left => Some(Motion::Rotate),
            MouseButton::Middle => Some(Motion::Pan),
            MouseButton::Right => Some(Motion::Dolly),
            _ => self.motion,
        };
    }

    fn release(&mut self) {
        self.motion = None;
    }

    /// Move the cursor to `(x, y)`; returns whether the camera changed
    fn cursor_moved(&mut self, camera: &mut SceneCamera, x: f64, y: f64, size: (u32, u32)) -> bool {
        let last = self.last_cursor.replace((x, y));
        let (Some(motion), Some((last_x, last_y))) = (self.motion, last) else {
            return false;
        };
        let (dx, dy) = (x - last_x, y - last_y);
        match motion {
            Motion::Rotate => self.rotate(camera, dx, dy, size),
            Motion::Pan => self.pan(camera, dx, dy, size),
            Motion::Dolly => self.dolly(camera, DOLLY_BASE.powf(-MOTION_FACTOR * dy / (size.1.max(1) as f64 / 2.0))),
        }
        true
    }

    pub fn rotate(&self, camera: &mut SceneCamera, dx: f64, dy: f64, size: (u32, u32)) {
        let (w, h) = (size.0.max(1) as f64, size.1.max(1) as f64);
        camera.azimuth(-ROTATION_PER_EXTENT / w * dx * MOTION_FACTOR);
        camera.elevation(ROTATION_PER_EXTENT / h * dy * MOTION_FACTOR);
        camera.orthogonalize_view_up();
        camera.reset_clipping_range(self.scene_bounds.as_ref());
    }

    /// Shift the camera so the focal plane follows the cursor
    pub fn pan(&self, camera: &mut SceneCamera, dx: f64, dy: f64, size: (u32, u32)) {
        let height = size.1.max(1) as f64;
        let world_per_pixel = 2.0 * camera.distance() * (camera.view_angle().to_radians() / 2.0).tan() / height;
        let dop = camera.direction_of_projection();
        let Some(right) = dop.cross(&camera.view_up()).try_normalize(f64::EPSILON) else {
            log::debug!("View-up is parallel to the view direction, ignoring pan");
            return;
        };
        let up = right.cross(&dop);
        let offset: Vector3d = (-dx * right + dy * up) * world_per_pixel;
        camera.pan(&offset);
        camera.reset_clipping_range(self.scene_bounds.as_ref());
    }

    pub fn dolly(&self, camera: &mut SceneCamera, factor: f64) {
        camera.dolly(factor);
        camera.reset_clipping_range(self.scene_bounds.as_ref());
    }

    /// Positive `lines` scroll forward
    pub fn wheel(&self, camera: &mut SceneCamera, lines: f64) {
        self.dolly(camera, DOLLY_BASE.powf(MOTION_FACTOR * WHEEL_MOTION_FACTOR * lines));
    }

    pub fn reset(&self, camera: &mut SceneCamera) {
        camera.reset_camera(self.scene_bounds.as_ref());
        camera.reset_clipping_range(self.scene_bounds.as_ref());
    }
}

/// Uniforms for a render of `camera` into a `width` x `height` target
pub(crate) fn frame_uniforms(camera: &SceneCamera, width: u32, height: u32) -> FrameUniforms {
    let aspect = width.max(1) as f64 / height.max(1) as f64;
    FrameUniforms::new(
        &camera.wgpu_view_projection(aspect).cast::<f32>(),
        &camera.position().cast::<f32>(),
        width,
        height,
    )
}

/// World axes seen from the direction of the main camera
struct OrientationMarker {
    scene: GpuScene,
    frame: FrameBinding,
    bounds: Option<Aabb>,
}

impl OrientationMarker {
    fn new(gpu: &GpuContext, renderer: &SceneRenderer) -> Self {
        let axes = Actor::axes(&Matrix4::identity());
        let bounds = axes.bounds();
        let scene = renderer.upload(gpu, &[axes.draw_item()]);
        let frame = renderer.create_frame_binding(gpu, &frame_uniforms(&SceneCamera::new(), 1, 1));
        Self { scene, frame, bounds }
    }

    fn viewport(size: (u32, u32)) -> [f32; 4] {
        let (w, h) = (size.0 as f32, size.1 as f32);
        let side = MARKER_VIEWPORT_FRACTION * w.min(h);
        [0.0, h - side, side, side]
    }

    fn update(&self, gpu: &GpuContext, renderer: &SceneRenderer, camera: &SceneCamera, size: (u32, u32)) {
        let mut marker_camera = camera.clone();
        marker_camera.set_window_center(0.0, 0.0);
        marker_camera.reset_camera(self.bounds.as_ref());
        marker_camera.reset_clipping_range(self.bounds.as_ref());
        let side = Self::viewport(size)[2].max(1.0) as u32;
        renderer.write_frame(gpu, &self.frame, &frame_uniforms(&marker_camera, side, side));
    }
}

struct Session<'a> {
    window: Arc<Window>,
    gpu: GpuContext,
    target: WindowTarget,
    renderer: SceneRenderer,
    scene: GpuScene,
    frame: FrameBinding,
    marker: Option<OrientationMarker>,
    background: [f64; 4],
    camera: &'a mut SceneCamera,
    style: TrackballStyle,
    modifiers: ModifiersState,
}

impl Session<'_> {
    fn redraw(&mut self) -> Result<()> {
        let size = self.target.size();
        self.renderer
            .write_frame(&self.gpu, &self.frame, &frame_uniforms(self.camera, size.0, size.1));
        if let Some(marker) = &self.marker {
            marker.update(&self.gpu, &self.renderer, self.camera, size);
        }

        let mut layers = vec![Layer {
            scene: &self.scene,
            frame: &self.frame,
            viewport: None,
        }];
        if let Some(marker) = &self.marker {
            layers.push(Layer {
                scene: &marker.scene,
                frame: &marker.frame,
                viewport: Some(OrientationMarker::viewport(size)),
            });
        }

        let (gpu, renderer, background) = (&self.gpu, &self.renderer, self.background);
        self.target
            .present_with(gpu, |views| renderer.render(gpu, views, background, &layers))
    }

    fn handle_window_event(&mut self, event: WindowEvent, target: &EventLoopWindowTarget<()>) -> Result<()> {
        match event {
            WindowEvent::CloseRequested => target.exit(),
            WindowEvent::Resized(PhysicalSize { width, height }) => {
                self.target.resize(&self.gpu, width, height);
                self.window.request_redraw();
            }
            WindowEvent::ModifiersChanged(modifiers) => self.modifiers = modifiers.state(),
            WindowEvent::MouseInput { state, button, .. } => match state {
                ElementState::Pressed => self.style.press(button, self.modifiers),
                ElementState::Released => self.style.release(),
            },
            WindowEvent::CursorMoved {
                position: PhysicalPosition { x, y },
                ..
            } => {
                let size = self.target.size();
                if self.style.cursor_moved(self.camera, x, y, size) {
                    self.window.request_redraw();
                }
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let lines = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y as f64,
                    MouseScrollDelta::PixelDelta(pos) => pos.y / 100.0,
                };
                self.style.wheel(self.camera, lines);
                self.window.request_redraw();
            }
            WindowEvent::KeyboardInput { event, .. } if event.state == ElementState::Pressed => {
                match &event.logical_key {
                    Key::Named(NamedKey::Escape) => target.exit(),
                    Key::Character(c) => match c.as_str() {
                        "q" | "Q" | "e" | "E" => target.exit(),
                        "r" | "R" => {
                            self.style.reset(self.camera);
                            log::info!("Camera reset to scene bounds");
                            self.window.request_redraw();
                        }
                        _ => {}
                    },
                    _ => {}
                }
            }
            WindowEvent::RedrawRequested => self.redraw()?,
            _ => {}
        }
        Ok(())
    }
}

/// Open a window showing `scene` and block until it is closed. The camera
/// is updated in place by the interaction.
pub(crate) fn run(
    scene: &Scene,
    camera: &mut SceneCamera,
    title: &str,
    size: (u32, u32),
    show_orientation_marker: bool,
) -> Result<()> {
    let event_loop =
        EventLoop::new().map_err(|e| Error::Visualization(format!("Failed to create event loop: {}", e)))?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title(title)
            .with_inner_size(PhysicalSize::new(size.0, size.1))
            .build(&event_loop)
            .map_err(|e| Error::Visualization(format!("Failed to create window: {}", e)))?,
    );

    let (gpu, surface) = pollster::block_on(GpuContext::with_surface(window.clone()))?;
    let inner = window.inner_size();
    let target = WindowTarget::new(&gpu, surface, inner.width, inner.height)?;
    let renderer = SceneRenderer::new(&gpu, target.format());
    let gpu_scene = renderer.upload(&gpu, &scene.draw_items());
    let frame = renderer.create_frame_binding(&gpu, &frame_uniforms(camera, inner.width, inner.height));
    let marker = show_orientation_marker.then(|| OrientationMarker::new(&gpu, &renderer));

    let mut session = Session {
        window,
        gpu,
        target,
        renderer,
        scene: gpu_scene,
        frame,
        marker,
        background: scene.background_rgba(),
        camera,
        style: TrackballStyle::new(scene.bounds()),
        modifiers: ModifiersState::empty(),
    };
    log::info!("Interactor started with {} actors", scene.len());
    session.window.request_redraw();

    let mut failure = None;
    event_loop
        .run(|event, target| {
            target.set_control_flow(ControlFlow::Wait);
            if let Event::WindowEvent { event, .. } = event {
                if let Err(e) = session.handle_window_event(event, target) {
                    log::error!("Interactor stopped: {}", e);
                    failure = Some(e);
                    target.exit();
                }
            }
        })
        .map_err(|e| Error::Visualization(format!("Event loop failed: {}", e)))?;

    log::info!("Interactor closed");
    failure.map_or(Ok(()), Err)
}
