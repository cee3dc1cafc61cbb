//! Texture loading and image output

use image::{GrayImage, ImageBuffer, Luma, RgbaImage};
use rendercrate_core::{Error, Result, Texture};
use std::path::Path;

fn image_error(path: &Path, e: image::ImageError) -> Error {
    Error::Image(format!("{}: {}", path.display(), e))
}

/// Decode a JPEG or PNG texture
pub fn read_texture<P: AsRef<Path>>(path: P) -> Result<Texture> {
    let path = path.as_ref();
    let rgba = image::open(path).map_err(|e| image_error(path, e))?.to_rgba8();
    let (width, height) = rgba.dimensions();
    log::info!("Read texture {} ({}x{})", path.display(), width, height);
    Texture::new(width, height, rgba.into_raw())
}

/// Write an 8-bit grayscale image, row 0 at the top; format from extension
pub fn write_gray8_image<P: AsRef<Path>>(path: P, width: u32, height: u32, pixels: Vec<u8>) -> Result<()> {
    let path = path.as_ref();
    let image = GrayImage::from_raw(width, height, pixels)
        .ok_or_else(|| Error::InvalidData(format!("pixel buffer does not match {}x{}", width, height)))?;
    image.save(path).map_err(|e| image_error(path, e))
}

/// Write a 16-bit grayscale PNG, row 0 at the top
pub fn write_gray16_png<P: AsRef<Path>>(path: P, width: u32, height: u32, pixels: Vec<u16>) -> Result<()> {
    let path = path.as_ref();
    let image: ImageBuffer<Luma<u16>, Vec<u16>> = ImageBuffer::from_raw(width, height, pixels)
        .ok_or_else(|| Error::InvalidData(format!("pixel buffer does not match {}x{}", width, height)))?;
    image
        .save_with_format(path, image::ImageFormat::Png)
        .map_err(|e| image_error(path, e))
}

/// Write an RGBA image, row 0 at the top. JPEG output drops the alpha channel.
pub fn write_rgba8_image<P: AsRef<Path>>(path: P, width: u32, height: u32, pixels: Vec<u8>) -> Result<()> {
    let path = path.as_ref();
    let image = RgbaImage::from_raw(width, height, pixels)
        .ok_or_else(|| Error::InvalidData(format!("pixel buffer does not match {}x{}", width, height)))?;
    let is_jpeg = path
        .extension()
        .and_then(|s| s.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("jpg") || e.eq_ignore_ascii_case("jpeg"));
    if is_jpeg {
        image::DynamicImage::ImageRgba8(image)
            .to_rgb8()
            .save(path)
            .map_err(|e| image_error(path, e))
    } else {
        image.save(path).map_err(|e| image_error(path, e))
    }
}
