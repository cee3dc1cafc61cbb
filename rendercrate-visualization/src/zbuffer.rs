//! Z-buffer read-back and conversions
//!
//! A z-buffer holds normalized window depth: 0 on the near plane, 1 on the
//! far plane. Pixels without geometry keep the clear value 1.0, which every
//! conversion treats as "no data".

use crate::scene_camera::SceneCamera;
use nalgebra::{Matrix4, Vector4};
use ndarray::{s, Array1, Array2, ArrayView2};
use rayon::prelude::*;
use rendercrate_core::{Error, Point3d, Result};
use std::path::Path;

/// Normalized depth of a render, stored bottom row first (OpenGL window
/// convention)
#[derive(Debug, Clone, PartialEq)]
pub struct ZBuffer {
    values: Array2<f32>,
}

impl ZBuffer {
    /// Wrap values given bottom row first
    pub fn from_opengl(values: Array2<f32>) -> Self {
        Self { values }
    }

    /// Build from row-major values given top row first, as read back from
    /// the GPU
    pub fn from_image_rows(width: u32, height: u32, values: Vec<f32>) -> Result<Self> {
        let top_down = Array2::from_shape_vec((height as usize, width as usize), values)
            .map_err(|e| Error::InvalidData(format!("z-buffer does not match {}x{}: {}", width, height, e)))?;
        Ok(Self {
            values: top_down.slice(s![..;-1, ..]).to_owned(),
        })
    }

    pub fn width(&self) -> usize {
        self.values.ncols()
    }

    pub fn height(&self) -> usize {
        self.values.nrows()
    }

    /// Row 0 is the bottom image row
    pub fn opengl(&self) -> ArrayView2<'_, f32> {
        self.values.view()
    }

    /// Row 0 is the top image row
    pub fn computer_vision(&self) -> Array2<f32> {
        self.values.slice(s![..;-1, ..]).to_owned()
    }

    /// Every `sparsity`-th row of [`ZBuffer::opengl`], flattened
    pub fn sparse(&self, sparsity: usize) -> Result<Array1<f32>> {
        if sparsity == 0 {
            return Err(Error::InvalidData("sparsity must be at least 1".to_string()));
        }
        let rows = self.values.slice(s![..;sparsity as isize, ..]);
        Ok(rows.iter().copied().collect())
    }

    /// Linear depth along the optical axis for the given clipping planes,
    /// bottom row first. Pixels without geometry are NaN.
    pub fn to_depth_buffer(&self, near: f64, far: f64) -> Array2<f64> {
        self.values.mapv(|z| {
            if z >= 1.0 {
                f64::NAN
            } else {
                let z = z as f64;
                2.0 * near * far / (far + near - (2.0 * z - 1.0) * (far - near))
            }
        })
    }
}

/// Inverse of the composite projection of a render, from display pixels
/// and window depth to world points
#[derive(Debug, Clone)]
pub struct DisplayToWorld {
    inverse: Matrix4<f64>,
    width: f64,
    height: f64,
}

impl DisplayToWorld {
    pub fn new(camera: &SceneCamera, width: usize, height: usize) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidData(format!("empty viewport {}x{}", width, height)));
        }
        let aspect = width as f64 / height as f64;
        let inverse = camera
            .wgpu_view_projection(aspect)
            .try_inverse()
            .ok_or_else(|| Error::Visualization("camera projection is not invertible".to_string()))?;
        Ok(Self {
            inverse,
            width: width as f64,
            height: height as f64,
        })
    }

    /// `x`, `y` count pixels from the lower-left corner and are sampled at
    /// pixel centers; `z` is the window depth
    pub fn convert(&self, x: f64, y: f64, z: f64) -> Point3d {
        let ndc = Vector4::new(
            2.0 * (x + 0.5) / self.width - 1.0,
            2.0 * (y + 0.5) / self.height - 1.0,
            z,
            1.0,
        );
        let world = self.inverse * ndc;
        Point3d::new(world.x / world.w, world.y / world.w, world.z / world.w)
    }
}

/// Converts and writes z-buffers
#[derive(Debug, Clone, Copy, Default)]
pub struct ZBufferInterface;

impl ZBufferInterface {
    pub fn new() -> Self {
        Self
    }

    /// World points of the z-buffer pixels in raster order (bottom row
    /// first). Far-plane pixels are skipped; of the rest, a pixel is kept
    /// when its raster index is a multiple of `n_th_result_point`.
    pub fn convert_z_buffer_to_world_coords(
        &self,
        z_buffer: ArrayView2<'_, f32>,
        camera: &SceneCamera,
        n_th_result_point: usize,
    ) -> Result<Vec<Point3d>> {
        if n_th_result_point == 0 {
            return Err(Error::InvalidData("n_th_result_point must be at least 1".to_string()));
        }
        let (rows, cols) = z_buffer.dim();
        if rows == 0 || cols == 0 {
            return Ok(Vec::new());
        }
        let transform = DisplayToWorld::new(camera, cols, rows)?;

        let points: Vec<Point3d> = (0..rows * cols)
            .into_par_iter()
            .filter_map(|index| {
                let (y, x) = (index / cols, index % cols);
                let z = z_buffer[(y, x)];
                (z < 1.0 && index % n_th_result_point == 0)
                    .then(|| transform.convert(x as f64, y as f64, z as f64))
            })
            .collect();

        log::info!("Converted z-buffer {}x{} to {} world points", cols, rows, points.len());
        Ok(points)
    }

    /// World points for individual `(x, y, z)` pixel samples. Samples with
    /// `z >= 1` have no geometry and map to `None`. Missing samples are
    /// only accepted when `none_values_allowed`. Computer-vision pixels
    /// count rows from the top.
    #[allow(clippy::too_many_arguments)]
    pub fn get_pixel_z_values_as_world_coords(
        &self,
        pixel_z_values: &[Option<(f64, f64, f64)>],
        camera: &SceneCamera,
        width: usize,
        height: usize,
        computer_vision_pixels: bool,
        none_values_allowed: bool,
    ) -> Result<Vec<Option<Point3d>>> {
        let transform = DisplayToWorld::new(camera, width, height)?;

        let mut without_intersection = 0usize;
        let mut world_coords = Vec::with_capacity(pixel_z_values.len());
        for (index, value) in pixel_z_values.iter().enumerate() {
            let Some((x, y, z)) = *value else {
                if none_values_allowed {
                    world_coords.push(None);
                    continue;
                }
                return Err(Error::InvalidData(format!("missing pixel value at index {}", index)));
            };
            if z < 1.0 {
                let y = if computer_vision_pixels { height as f64 - 1.0 - y } else { y };
                world_coords.push(Some(transform.convert(x, y, z)));
            } else {
                world_coords.push(None);
                without_intersection += 1;
            }
        }

        log::debug!("{} of {} pixels without geometry", without_intersection, pixel_z_values.len());
        Ok(world_coords)
    }

    /// 8-bit grayscale `255 * (1 - z)`: near is bright, background black
    pub fn write_z_buffer_to_disc<P: AsRef<Path>>(&self, z_buffer: &ZBuffer, path: P) -> Result<()> {
        let pixels = z_buffer
            .computer_vision()
            .iter()
            .map(|&z| (255.0 * (1.0 - z.clamp(0.0, 1.0))).round() as u8)
            .collect();
        rendercrate_io::write_gray8_image(path, z_buffer.width() as u32, z_buffer.height() as u32, pixels)
    }

    /// 8-bit grayscale stretched over the range of the valid z values
    pub fn write_z_buffer_visualization_to_disc<P: AsRef<Path>>(&self, z_buffer: &ZBuffer, path: P) -> Result<()> {
        let image = z_buffer.computer_vision();
        let (min, max) = image
            .iter()
            .filter(|&&z| z < 1.0)
            .fold((f32::MAX, f32::MIN), |(lo, hi), &z| (lo.min(z), hi.max(z)));
        let range = max - min;

        let pixels = image
            .iter()
            .map(|&z| {
                if z >= 1.0 {
                    0
                } else if range <= 0.0 {
                    255
                } else {
                    (255.0 * (1.0 - (z - min) / range)).round() as u8
                }
            })
            .collect();
        rendercrate_io::write_gray8_image(path, z_buffer.width() as u32, z_buffer.height() as u32, pixels)
    }

    /// 16-bit PNG of the linear depth times `scale`; 0 marks missing depth
    pub fn write_depth_buffer_to_disc<P: AsRef<Path>>(
        &self,
        z_buffer: &ZBuffer,
        near: f64,
        far: f64,
        path: P,
        scale: f64,
    ) -> Result<()> {
        let depth = z_buffer.to_depth_buffer(near, far);
        let pixels = depth
            .slice(s![..;-1, ..])
            .iter()
            .map(|&d| {
                if d.is_nan() {
                    0
                } else {
                    (d * scale).round().clamp(0.0, u16::MAX as f64) as u16
                }
            })
            .collect();
        rendercrate_io::write_gray16_png(path, z_buffer.width() as u32, z_buffer.height() as u32, pixels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    fn looking_down_negative_z() -> SceneCamera {
        let mut camera = SceneCamera::new();
        camera.set_view_transform_to_identity().unwrap();
        camera.set_view_angle(90.0);
        camera.set_clipping_range(1.0, 10.0);
        camera
    }

    /// Window depth of a point at distance `d` in front of the camera
    fn window_depth(near: f64, far: f64, d: f64) -> f32 {
        let z_ndc = (far + near) / (far - near) - 2.0 * far * near / ((far - near) * d);
        ((z_ndc + 1.0) / 2.0) as f32
    }

    #[test]
    fn test_orientation() {
        let z = ZBuffer::from_image_rows(2, 3, vec![0.1, 0.2, 0.3, 0.4, 0.5, 0.6]).unwrap();
        assert_eq!(z.opengl(), array![[0.5, 0.6], [0.3, 0.4], [0.1, 0.2]]);
        assert_eq!(z.computer_vision(), array![[0.1, 0.2], [0.3, 0.4], [0.5, 0.6]]);
        assert!(ZBuffer::from_image_rows(2, 2, vec![0.0; 3]).is_err());
    }

    #[test]
    fn test_sparse_takes_every_nth_row() {
        let z = ZBuffer::from_opengl(array![[0.0, 0.1], [0.2, 0.3], [0.4, 0.5]]);
        assert_eq!(z.sparse(2).unwrap().to_vec(), vec![0.0, 0.1, 0.4, 0.5]);
        assert_eq!(z.sparse(1).unwrap().len(), 6);
        assert!(z.sparse(0).is_err());
    }

    #[test]
    fn test_depth_buffer() {
        let (near, far) = (1.0, 10.0);
        let z = ZBuffer::from_opengl(array![[0.0, 1.0, window_depth(near, far, 4.0)]]);
        let depth = z.to_depth_buffer(near, far);

        assert_relative_eq!(depth[(0, 0)], near, epsilon = 1e-9);
        assert!(depth[(0, 1)].is_nan());
        assert_relative_eq!(depth[(0, 2)], 4.0, epsilon = 1e-4);
    }

    #[test]
    fn test_world_coords_skip_background() {
        let camera = looking_down_negative_z();
        let d = window_depth(1.0, 10.0, 5.0);
        // 2x2 viewport: pixel centers at ndc +-0.5
        let z = array![[d, 1.0], [1.0, d]];

        let points = ZBufferInterface::new()
            .convert_z_buffer_to_world_coords(z.view(), &camera, 1)
            .unwrap();
        assert_eq!(points.len(), 2);
        // Bottom-left pixel, then top-right; tan(45) = 1 so x = ndc * depth
        assert_relative_eq!(points[0], Point3d::new(-2.5, -2.5, -5.0), epsilon = 1e-3);
        assert_relative_eq!(points[1], Point3d::new(2.5, 2.5, -5.0), epsilon = 1e-3);
    }

    #[test]
    fn test_world_coords_stride_counts_all_pixels() {
        let camera = looking_down_negative_z();
        let d = window_depth(1.0, 10.0, 3.0);
        let z = Array2::from_elem((4, 4), d);

        let interface = ZBufferInterface::new();
        let every_third = interface.convert_z_buffer_to_world_coords(z.view(), &camera, 3).unwrap();
        assert_eq!(every_third.len(), 6);

        let mut with_background = z.clone();
        with_background[(0, 0)] = 1.0;
        let skipped = interface
            .convert_z_buffer_to_world_coords(with_background.view(), &camera, 3)
            .unwrap();
        assert_eq!(skipped.len(), 5);
    }

    #[test]
    fn test_pixel_values_flip_computer_vision_rows() {
        let camera = looking_down_negative_z();
        let d = window_depth(1.0, 10.0, 2.0) as f64;
        let interface = ZBufferInterface::new();

        let cv = interface
            .get_pixel_z_values_as_world_coords(&[Some((0.0, 0.0, d)), Some((1.0, 1.0, 1.0))], &camera, 2, 2, true, false)
            .unwrap();
        // Top-left pixel
        assert_relative_eq!(cv[0].unwrap(), Point3d::new(-1.0, 1.0, -2.0), epsilon = 1e-3);
        assert!(cv[1].is_none());

        let gl = interface
            .get_pixel_z_values_as_world_coords(&[Some((0.0, 0.0, d))], &camera, 2, 2, false, false)
            .unwrap();
        assert_relative_eq!(gl[0].unwrap(), Point3d::new(-1.0, -1.0, -2.0), epsilon = 1e-3);
    }

    #[test]
    fn test_missing_pixel_values() {
        let camera = looking_down_negative_z();
        let interface = ZBufferInterface::new();
        assert!(interface
            .get_pixel_z_values_as_world_coords(&[None], &camera, 2, 2, true, false)
            .is_err());
        assert_eq!(
            interface
                .get_pixel_z_values_as_world_coords(&[None], &camera, 2, 2, true, true)
                .unwrap(),
            vec![None]
        );
    }

    #[test]
    fn test_write_images() {
        let dir = tempfile::tempdir().unwrap();
        let z = ZBuffer::from_image_rows(2, 1, vec![0.25, 1.0]).unwrap();
        let interface = ZBufferInterface::new();

        let gray = dir.path().join("z.png");
        interface.write_z_buffer_to_disc(&z, &gray).unwrap();
        let image = image::open(&gray).unwrap().to_luma8();
        assert_eq!(image.get_pixel(0, 0).0, [191]);
        assert_eq!(image.get_pixel(1, 0).0, [0]);

        let vis = dir.path().join("z_vis.png");
        interface.write_z_buffer_visualization_to_disc(&z, &vis).unwrap();
        assert_eq!(image::open(&vis).unwrap().to_luma8().get_pixel(0, 0).0, [255]);

        let depth = dir.path().join("depth.png");
        let d = window_depth(1.0, 10.0, 2.0);
        let z = ZBuffer::from_image_rows(2, 1, vec![d, 1.0]).unwrap();
        interface.write_depth_buffer_to_disc(&z, 1.0, 10.0, &depth, 1000.0).unwrap();
        let image = image::open(&depth).unwrap().to_luma16();
        assert!((image.get_pixel(0, 0).0[0] as i32 - 2000).abs() <= 2);
        assert_eq!(image.get_pixel(1, 0).0, [0]);
    }
}
