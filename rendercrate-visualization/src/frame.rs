//! Result of an offscreen render

use crate::scene_camera::SceneCamera;
use crate::zbuffer::ZBuffer;
use rendercrate_core::{Error, Result};

/// Depth and color of one render together with the camera that produced
/// them. Conversions back to world space must use this camera, not the
/// one currently set on the facade.
#[derive(Debug, Clone)]
pub struct RenderedFrame {
    width: u32,
    height: u32,
    z_buffer: ZBuffer,
    /// RGBA8, row 0 at the top
    rgba: Vec<u8>,
    camera: SceneCamera,
}

impl RenderedFrame {
    /// `depth` and `rgba` are row-major with the top row first
    pub fn new(width: u32, height: u32, depth: Vec<f32>, rgba: Vec<u8>, camera: SceneCamera) -> Result<Self> {
        let expected = width as usize * height as usize * 4;
        if rgba.len() != expected {
            return Err(Error::InvalidData(format!(
                "color buffer {}x{} needs {} bytes, got {}",
                width,
                height,
                expected,
                rgba.len()
            )));
        }
        let z_buffer = ZBuffer::from_image_rows(width, height, depth)?;
        Ok(Self {
            width,
            height,
            z_buffer,
            rgba,
            camera,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn z_buffer(&self) -> &ZBuffer {
        &self.z_buffer
    }

    pub fn rgba(&self) -> &[u8] {
        &self.rgba
    }

    pub fn camera(&self) -> &SceneCamera {
        &self.camera
    }
}
