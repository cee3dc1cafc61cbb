//! Color buffer read-back

use crate::frame::RenderedFrame;
use ndarray::Array3;
use rendercrate_core::{Error, Result};
use std::path::Path;

/// Converts and writes the color buffer of a render
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageBufferInterface;

impl ImageBufferInterface {
    pub fn new() -> Self {
        Self
    }

    /// `(height, width, 4)` RGBA in [0, 1], row 0 at the image top
    pub fn get_rgba_buffer(&self, frame: &RenderedFrame) -> Result<Array3<f32>> {
        let shape = (frame.height() as usize, frame.width() as usize, 4);
        let values = frame.rgba().iter().map(|&c| c as f32 / 255.0).collect();
        Array3::from_shape_vec(shape, values)
            .map_err(|e| Error::InvalidData(format!("color buffer does not match {:?}: {}", shape, e)))
    }

    /// 8-bit RGBA image, format chosen by the file extension
    pub fn write_rgba_buffer_to_disc<P: AsRef<Path>>(&self, frame: &RenderedFrame, path: P) -> Result<()> {
        log::info!("Writing color buffer to {}", path.as_ref().display());
        rendercrate_io::write_rgba8_image(path, frame.width(), frame.height(), frame.rgba().to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene_camera::SceneCamera;

    fn two_pixel_frame() -> RenderedFrame {
        let rgba = vec![255, 0, 0, 255, 0, 0, 255, 255, 0, 255, 0, 255, 0, 0, 0, 255];
        RenderedFrame::new(2, 2, vec![1.0; 4], rgba, SceneCamera::new()).unwrap()
    }

    #[test]
    fn test_rgba_buffer_layout() {
        let buffer = ImageBufferInterface::new().get_rgba_buffer(&two_pixel_frame()).unwrap();
        assert_eq!(buffer.dim(), (2, 2, 4));
        assert_eq!(buffer[[0, 0, 0]], 1.0);
        assert_eq!(buffer[[0, 1, 2]], 1.0);
        assert_eq!(buffer[[1, 0, 1]], 1.0);
        assert_eq!(buffer[[1, 1, 0]], 0.0);
        assert_eq!(buffer[[1, 1, 3]], 1.0);
    }

    #[test]
    fn test_write_rgba_buffer() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("color.png");
        ImageBufferInterface::new()
            .write_rgba_buffer_to_disc(&two_pixel_frame(), &path)
            .unwrap();

        let image = image::open(&path).unwrap().to_rgba8();
        assert_eq!(image.dimensions(), (2, 2));
        assert_eq!(image.get_pixel(1, 0).0, [0, 0, 255, 255]);
    }
}
