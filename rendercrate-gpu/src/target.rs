//! Render targets: offscreen textures with read-back, and window surfaces

use crate::device::GpuContext;
use crate::renderer::{RenderTargetViews, DEPTH_FORMAT, DEPTH_OUTPUT_FORMAT};
use rendercrate_core::{Error, Result};

/// Color format of offscreen targets
pub const OFFSCREEN_COLOR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

fn create_attachment(
    gpu: &GpuContext,
    label: &str,
    width: u32,
    height: u32,
    format: wgpu::TextureFormat,
    usage: wgpu::TextureUsages,
) -> wgpu::Texture {
    gpu.device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | usage,
        view_formats: &[],
    })
}

fn create_depth_view(gpu: &GpuContext, width: u32, height: u32) -> wgpu::TextureView {
    create_attachment(gpu, "Depth Texture", width, height, DEPTH_FORMAT, wgpu::TextureUsages::empty())
        .create_view(&wgpu::TextureViewDescriptor::default())
}

fn check_size(gpu: &GpuContext, width: u32, height: u32) -> Result<()> {
    let max = gpu.device.limits().max_texture_dimension_2d;
    if width == 0 || height == 0 || width > max || height > max {
        return Err(Error::Gpu(format!(
            "Render target size {}x{} outside 1..={}",
            width, height, max
        )));
    }
    Ok(())
}

/// Offscreen color and depth textures that can be copied back to the host.
/// Depth is read from the renderer's depth output attachment, the depth
/// buffer itself only serves the depth test.
pub struct OffscreenTarget {
    width: u32,
    height: u32,
    color_texture: wgpu::Texture,
    color_view: wgpu::TextureView,
    depth_view: wgpu::TextureView,
    depth_output_texture: wgpu::Texture,
    depth_output_view: wgpu::TextureView,
}

impl OffscreenTarget {
    pub fn new(gpu: &GpuContext, width: u32, height: u32) -> Result<Self> {
        check_size(gpu, width, height)?;

        gpu.validated("Offscreen target creation", || {
            let color_texture = create_attachment(
                gpu,
                "Offscreen Color Texture",
                width,
                height,
                OFFSCREEN_COLOR_FORMAT,
                wgpu::TextureUsages::COPY_SRC,
            );
            let depth_output_texture = create_attachment(
                gpu,
                "Offscreen Depth Output Texture",
                width,
                height,
                DEPTH_OUTPUT_FORMAT,
                wgpu::TextureUsages::COPY_SRC,
            );

            Self {
                width,
                height,
                color_view: color_texture.create_view(&wgpu::TextureViewDescriptor::default()),
                color_texture,
                depth_view: create_depth_view(gpu, width, height),
                depth_output_view: depth_output_texture.create_view(&wgpu::TextureViewDescriptor::default()),
                depth_output_texture,
            }
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn views(&self) -> RenderTargetViews<'_> {
        RenderTargetViews {
            color: &self.color_view,
            depth: &self.depth_view,
            depth_output: Some(&self.depth_output_view),
        }
    }

    /// Window depth values in [0, 1], row-major with row 0 at the top.
    /// Pixels without geometry hold 1.0.
    pub fn read_depth(&self, gpu: &GpuContext) -> Result<Vec<f32>> {
        let bytes = gpu.read_texture(&self.depth_output_texture, 4)?;
        Ok(bytes
            .chunks_exact(4)
            .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
            .collect())
    }

    /// RGBA8 pixels, row-major with row 0 at the top
    pub fn read_rgba(&self, gpu: &GpuContext) -> Result<Vec<u8>> {
        gpu.read_texture(&self.color_texture, 4)
    }
}

/// Presentable window surface with its own depth buffer
pub struct WindowTarget {
    surface: wgpu::Surface<'static>,
    config: wgpu::SurfaceConfiguration,
    depth_view: wgpu::TextureView,
}

impl WindowTarget {
    pub fn new(gpu: &GpuContext, surface: wgpu::Surface<'static>, width: u32, height: u32) -> Result<Self> {
        let surface_caps = surface.get_capabilities(&gpu.adapter);
        // Linear output keeps colors identical to offscreen renders
        let format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| !f.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .ok_or_else(|| Error::Gpu("Surface is incompatible with the adapter".to_string()))?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: width.max(1),
            height: height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps.alpha_modes.first().copied().unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&gpu.device, &config);

        let depth_view = create_depth_view(gpu, config.width, config.height);

        Ok(Self {
            surface,
            config,
            depth_view,
        })
    }

    pub fn format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    pub fn size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    /// Resize renderer surface
    pub fn resize(&mut self, gpu: &GpuContext, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.config.width = width;
            self.config.height = height;
            self.surface.configure(&gpu.device, &self.config);
            self.depth_view = create_depth_view(gpu, width, height);
        }
    }

    /// Acquire the next frame, hand its views to `draw` and present it.
    /// A lost or outdated surface is reconfigured and the frame skipped.
    pub fn present_with<F>(&mut self, gpu: &GpuContext, draw: F) -> Result<()>
    where
        F: FnOnce(RenderTargetViews<'_>) -> Result<()>,
    {
        let output = match self.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost) | Err(wgpu::SurfaceError::Outdated) => {
                log::debug!("Surface lost, reconfiguring");
                self.surface.configure(&gpu.device, &self.config);
                return Ok(());
            }
            Err(wgpu::SurfaceError::Timeout) => {
                log::warn!("Timed out acquiring surface texture");
                return Ok(());
            }
            Err(e) => return Err(Error::Gpu(format!("Failed to get surface texture: {:?}", e))),
        };

        let view = output.texture.create_view(&wgpu::TextureViewDescriptor::default());
        draw(RenderTargetViews {
            color: &view,
            depth: &self.depth_view,
            depth_output: None,
        })?;
        output.present();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::{DrawItem, FrameUniforms, Layer, MeshVertex, Primitive, SceneRenderer};
    use nalgebra::{Matrix4, Point3};

    async fn try_create_gpu_context() -> Option<GpuContext> {
        match GpuContext::new().await {
            Ok(gpu) => Some(gpu),
            Err(_) => {
                println!("⚠️  GPU not available, skipping GPU-dependent test");
                None
            }
        }
    }

    fn square(z: f32, color: [f32; 4]) -> DrawItem<'static> {
        let vertex = |x: f32, y: f32| MeshVertex {
            position: [x, y, z],
            color,
            uv: [0.0, 0.0],
        };
        let mut item = DrawItem::new(Primitive::Triangles {
            vertices: vec![vertex(-0.5, -0.5), vertex(0.5, -0.5), vertex(0.5, 0.5), vertex(-0.5, 0.5)],
            indices: vec![0, 1, 2, 0, 2, 3],
            texture: None,
        });
        item.lighting = false;
        item
    }

    /// Red square at window depth 0.25 over a blue background, 64x32
    fn render_square(gpu: &GpuContext) -> Result<OffscreenTarget> {
        let target = OffscreenTarget::new(gpu, 64, 32)?;
        let renderer = SceneRenderer::offscreen(gpu)?;
        // Identity view-projection: clip z is the window depth
        let frame = renderer.create_frame_binding(
            gpu,
            &FrameUniforms::new(&Matrix4::identity(), &Point3::origin(), 64, 32),
        );
        let scene = renderer.upload(gpu, &[square(0.25, [1.0, 0.0, 0.0, 1.0])]);
        assert_eq!(scene.len(), 1);

        renderer.render(
            gpu,
            target.views(),
            [0.0, 0.0, 1.0, 1.0],
            &[Layer {
                scene: &scene,
                frame: &frame,
                viewport: None,
            }],
        )?;
        Ok(target)
    }

    #[test]
    fn test_offscreen_depth_and_color() {
        pollster::block_on(async {
            let Some(gpu) = try_create_gpu_context().await else {
                return;
            };

            let target = render_square(&gpu).unwrap();
            let depth = target.read_depth(&gpu).unwrap();
            assert_eq!(depth.len(), 64 * 32);
            // Center is covered, corner is background
            assert!((depth[16 * 64 + 32] - 0.25).abs() < 1e-6);
            assert_eq!(depth[0], 1.0);

            let rgba = target.read_rgba(&gpu).unwrap();
            assert_eq!(rgba.len(), 64 * 32 * 4);
            assert_eq!(&rgba[(16 * 64 + 32) * 4..(16 * 64 + 32) * 4 + 4], &[255, 0, 0, 255]);
            assert_eq!(&rgba[0..4], &[0, 0, 255, 255]);
        });
    }

    #[test]
    fn test_depth_read_back_on_gl_backend() {
        pollster::block_on(async {
            let Ok(gpu) = GpuContext::with_backends(wgpu::Backends::GL).await else {
                println!("⚠️  No GL adapter, skipping GL read-back test");
                return;
            };

            match render_square(&gpu).and_then(|target| target.read_depth(&gpu)) {
                Ok(depth) => assert!((depth[16 * 64 + 32] - 0.25).abs() < 1e-6),
                Err(Error::Gpu(msg)) => println!("⚠️  GL adapter cannot render offscreen: {}", msg),
                Err(e) => panic!("unexpected error: {}", e),
            }
        });
    }

    #[test]
    fn test_window_renderer_rejects_offscreen_target() {
        pollster::block_on(async {
            let Some(gpu) = try_create_gpu_context().await else {
                return;
            };
            let target = OffscreenTarget::new(&gpu, 8, 8).unwrap();
            let renderer = SceneRenderer::new(&gpu, OFFSCREEN_COLOR_FORMAT);
            let result = renderer.render(&gpu, target.views(), [0.0; 4], &[]);
            assert!(matches!(result, Err(Error::Gpu(_))));
        });
    }

    #[test]
    fn test_zero_sized_target_is_rejected() {
        pollster::block_on(async {
            let Some(gpu) = try_create_gpu_context().await else {
                return;
            };
            assert!(OffscreenTarget::new(&gpu, 0, 10).is_err());
        });
    }
}
