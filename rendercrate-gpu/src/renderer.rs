//! Scene rendering with wgpu
//!
//! The renderer owns three pipelines (shaded triangles, point sprites and
//! screen-space line quads) that share one pipeline layout:
//!
//! * group 0: per-frame camera uniforms
//! * group 1: per-draw uniforms plus an optional color texture
//!
//! Geometry is uploaded once into a [`GpuScene`] and drawn into any
//! [`RenderTargetViews`] in one or more [`Layer`]s. Each layer after the
//! first keeps the color of the previous ones but starts from a cleared
//! depth buffer, so overlays such as an orientation marker are never hidden
//! by scene geometry.
//!
//! Offscreen renderers also write the window depth of every fragment into
//! an [`DEPTH_OUTPUT_FORMAT`] color attachment. Copying that attachment
//! works on every backend, unlike copying the depth texture itself.

use crate::device::GpuContext;
use bytemuck::{Pod, Zeroable};
use nalgebra::{Matrix4, Point3};
use rendercrate_core::{Error, Result, Texture};
use wgpu::util::DeviceExt;

/// Depth format of every render target
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Color attachment receiving the window depth of offscreen renders
pub const DEPTH_OUTPUT_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::R32Float;

const COMMON_SHADER: &str = include_str!("shaders/common.wgsl");
const MESH_SHADER: &str = include_str!("shaders/mesh.wgsl");
const POINTS_SHADER: &str = include_str!("shaders/points.wgsl");
const LINES_SHADER: &str = include_str!("shaders/lines.wgsl");

/// Vertices per point sprite or line quad
const QUAD_VERTICES: u32 = 6;

/// Vertex of a triangle mesh
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
    pub uv: [f32; 2],
}

impl MeshVertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 3] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x4, 2 => Float32x2];

    /// Vertex buffer layout descriptor
    pub fn desc<'a>() -> wgpu::VertexBufferLayout<'a> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<MeshVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// One point sprite
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct PointInstance {
    pub position: [f32; 3],
    pub color: [f32; 4],
}

impl PointInstance {
    const ATTRIBUTES: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x4];

    pub fn desc<'a>() -> wgpu::VertexBufferLayout<'a> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<PointInstance>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// One line segment
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct LineInstance {
    pub start: [f32; 3],
    pub end: [f32; 3],
    pub color: [f32; 4],
}

impl LineInstance {
    const ATTRIBUTES: [wgpu::VertexAttribute; 3] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x4];

    pub fn desc<'a>() -> wgpu::VertexBufferLayout<'a> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<LineInstance>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Camera uniform data
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct FrameUniforms {
    pub view_proj: [[f32; 4]; 4],
    pub camera_position: [f32; 4],
    pub viewport: [f32; 4],
}

impl FrameUniforms {
    /// `view_proj` must map into wgpu clip space (depth in [0, 1]).
    pub fn new(view_proj: &Matrix4<f32>, camera_position: &Point3<f32>, width: u32, height: u32) -> Self {
        Self {
            view_proj: (*view_proj).into(),
            camera_position: [camera_position.x, camera_position.y, camera_position.z, 1.0],
            viewport: [width.max(1) as f32, height.max(1) as f32, 0.0, 0.0],
        }
    }
}

/// Per-draw uniform data
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct DrawUniforms {
    pub model: [[f32; 4]; 4],
    pub params: [f32; 4],
    pub flags: [u32; 4],
}

/// Geometry of a draw item
#[derive(Debug, Clone)]
pub enum Primitive<'a> {
    Triangles {
        vertices: Vec<MeshVertex>,
        indices: Vec<u32>,
        texture: Option<&'a Texture>,
    },
    Points(Vec<PointInstance>),
    Lines(Vec<LineInstance>),
}

/// Geometry plus the state it is drawn with
#[derive(Debug, Clone)]
pub struct DrawItem<'a> {
    pub primitive: Primitive<'a>,
    pub model: Matrix4<f32>,
    pub opacity: f32,
    /// Sprite edge length in pixels
    pub point_size: f32,
    /// Line width in pixels
    pub line_width: f32,
    pub lighting: bool,
}

impl<'a> DrawItem<'a> {
    pub fn new(primitive: Primitive<'a>) -> Self {
        Self {
            primitive,
            model: Matrix4::identity(),
            opacity: 1.0,
            point_size: 1.0,
            line_width: 1.0,
            lighting: true,
        }
    }

    fn uniforms(&self) -> DrawUniforms {
        let textured = matches!(self.primitive, Primitive::Triangles { texture: Some(_), .. });
        DrawUniforms {
            model: self.model.into(),
            params: [self.opacity.clamp(0.0, 1.0), self.point_size.max(1.0), self.line_width.max(1.0), 0.0],
            flags: [self.lighting as u32, textured as u32, 0, 0],
        }
    }
}

enum GpuGeometry {
    Triangles {
        vertex_buffer: wgpu::Buffer,
        index_buffer: wgpu::Buffer,
        index_count: u32,
    },
    Points {
        instance_buffer: wgpu::Buffer,
        count: u32,
    },
    Lines {
        instance_buffer: wgpu::Buffer,
        count: u32,
    },
}

struct GpuDraw {
    geometry: GpuGeometry,
    bind_group: wgpu::BindGroup,
    translucent: bool,
    // Kept alive for the bind group
    _uniform_buffer: wgpu::Buffer,
    _texture: Option<wgpu::Texture>,
}

/// Scene geometry resident on the GPU
#[derive(Default)]
pub struct GpuScene {
    draws: Vec<GpuDraw>,
}

impl GpuScene {
    pub fn len(&self) -> usize {
        self.draws.len()
    }

    pub fn is_empty(&self) -> bool {
        self.draws.is_empty()
    }
}

/// Camera uniforms bound for one layer
pub struct FrameBinding {
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

/// Color and depth attachments of one frame
#[derive(Clone, Copy)]
pub struct RenderTargetViews<'a> {
    pub color: &'a wgpu::TextureView,
    pub depth: &'a wgpu::TextureView,
    /// [`DEPTH_OUTPUT_FORMAT`] attachment, required by offscreen renderers
    pub depth_output: Option<&'a wgpu::TextureView>,
}

/// One pass over a scene
pub struct Layer<'a> {
    pub scene: &'a GpuScene,
    pub frame: &'a FrameBinding,
    /// x, y, width, height in pixels; the whole target when `None`
    pub viewport: Option<[f32; 4]>,
}

/// Renderer for meshes, point clouds and lines
pub struct SceneRenderer {
    color_format: wgpu::TextureFormat,
    depth_output: bool,
    frame_layout: wgpu::BindGroupLayout,
    draw_layout: wgpu::BindGroupLayout,
    mesh_pipeline: wgpu::RenderPipeline,
    points_pipeline: wgpu::RenderPipeline,
    lines_pipeline: wgpu::RenderPipeline,
    sampler: wgpu::Sampler,
    white_texture: wgpu::Texture,
}

impl SceneRenderer {
    /// Create the pipelines for color targets of `color_format`
    pub fn new(gpu: &GpuContext, color_format: wgpu::TextureFormat) -> Self {
        Self::with_targets(gpu, color_format, false)
    }

    /// Renderer for [`crate::OffscreenTarget`]s, writing color and depth
    pub fn offscreen(gpu: &GpuContext) -> Result<Self> {
        gpu.validated("Offscreen pipeline creation", || {
            Self::with_targets(gpu, crate::target::OFFSCREEN_COLOR_FORMAT, true)
        })
    }

    fn with_targets(gpu: &GpuContext, color_format: wgpu::TextureFormat, depth_output: bool) -> Self {
        let frame_layout = gpu.create_bind_group_layout(
            "frame_bind_group_layout",
            &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        );

        let draw_layout = gpu.create_bind_group_layout(
            "draw_bind_group_layout",
            &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        );

        let pipeline_layout = gpu.device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Scene Pipeline Layout"),
            bind_group_layouts: &[&frame_layout, &draw_layout],
            push_constant_ranges: &[],
        });

        let mesh_shader = gpu.create_shader_module("Mesh Shader", &format!("{COMMON_SHADER}\n{MESH_SHADER}"));
        let points_shader = gpu.create_shader_module("Points Shader", &format!("{COMMON_SHADER}\n{POINTS_SHADER}"));
        let lines_shader = gpu.create_shader_module("Lines Shader", &format!("{COMMON_SHADER}\n{LINES_SHADER}"));

        let mesh_pipeline = create_render_pipeline(
            gpu,
            "Mesh Render Pipeline",
            &pipeline_layout,
            &mesh_shader,
            MeshVertex::desc(),
            color_format,
            depth_output,
        );
        let points_pipeline = create_render_pipeline(
            gpu,
            "Points Render Pipeline",
            &pipeline_layout,
            &points_shader,
            PointInstance::desc(),
            color_format,
            depth_output,
        );
        let lines_pipeline = create_render_pipeline(
            gpu,
            "Lines Render Pipeline",
            &pipeline_layout,
            &lines_shader,
            LineInstance::desc(),
            color_format,
            depth_output,
        );

        let sampler = gpu.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Texture Sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });
        let white_texture = upload_texture(gpu, &Texture::solid([255, 255, 255, 255]));

        Self {
            color_format,
            depth_output,
            frame_layout,
            draw_layout,
            mesh_pipeline,
            points_pipeline,
            lines_pipeline,
            sampler,
            white_texture,
        }
    }

    pub fn color_format(&self) -> wgpu::TextureFormat {
        self.color_format
    }

    /// Allocate the camera uniforms for one layer
    pub fn create_frame_binding(&self, gpu: &GpuContext, uniforms: &FrameUniforms) -> FrameBinding {
        let buffer = gpu.create_buffer_init(
            "Frame Uniform Buffer",
            std::slice::from_ref(uniforms),
            wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        );
        let bind_group = gpu.create_bind_group(
            "frame_bind_group",
            &self.frame_layout,
            &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
        );
        FrameBinding { buffer, bind_group }
    }

    /// Update the camera uniforms of a layer
    pub fn write_frame(&self, gpu: &GpuContext, binding: &FrameBinding, uniforms: &FrameUniforms) {
        gpu.queue.write_buffer(&binding.buffer, 0, bytemuck::bytes_of(uniforms));
    }

    /// Upload draw items. Items without geometry are skipped.
    pub fn upload(&self, gpu: &GpuContext, items: &[DrawItem<'_>]) -> GpuScene {
        let mut draws = Vec::with_capacity(items.len());
        for item in items {
            let (geometry, texture) = match &item.primitive {
                Primitive::Triangles { vertices, indices, texture } => {
                    if vertices.is_empty() || indices.is_empty() {
                        continue;
                    }
                    let geometry = GpuGeometry::Triangles {
                        vertex_buffer: gpu.create_buffer_init("Mesh Vertex Buffer", vertices, wgpu::BufferUsages::VERTEX),
                        index_buffer: gpu.create_buffer_init("Mesh Index Buffer", indices, wgpu::BufferUsages::INDEX),
                        index_count: indices.len() as u32,
                    };
                    (geometry, texture.map(|t| upload_texture(gpu, t)))
                }
                Primitive::Points(points) => {
                    if points.is_empty() {
                        continue;
                    }
                    let geometry = GpuGeometry::Points {
                        instance_buffer: gpu.create_buffer_init("Point Instance Buffer", points, wgpu::BufferUsages::VERTEX),
                        count: points.len() as u32,
                    };
                    (geometry, None)
                }
                Primitive::Lines(lines) => {
                    if lines.is_empty() {
                        continue;
                    }
                    let geometry = GpuGeometry::Lines {
                        instance_buffer: gpu.create_buffer_init("Line Instance Buffer", lines, wgpu::BufferUsages::VERTEX),
                        count: lines.len() as u32,
                    };
                    (geometry, None)
                }
            };

            let uniform_buffer = gpu.create_buffer_init(
                "Draw Uniform Buffer",
                &[item.uniforms()],
                wgpu::BufferUsages::UNIFORM,
            );
            let texture_view = texture
                .as_ref()
                .unwrap_or(&self.white_texture)
                .create_view(&wgpu::TextureViewDescriptor::default());
            let bind_group = gpu.create_bind_group(
                "draw_bind_group",
                &self.draw_layout,
                &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: uniform_buffer.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::TextureView(&texture_view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 2,
                        resource: wgpu::BindingResource::Sampler(&self.sampler),
                    },
                ],
            );

            draws.push(GpuDraw {
                geometry,
                bind_group,
                translucent: item.opacity < 1.0,
                _uniform_buffer: uniform_buffer,
                _texture: texture,
            });
        }

        log::debug!("Uploaded {} of {} draw items", draws.len(), items.len());
        GpuScene { draws }
    }

    /// Render `layers` in order into `target` and submit the work.
    /// `background` is the RGBA clear color in [0, 1].
    pub fn render(&self, gpu: &GpuContext, target: RenderTargetViews<'_>, background: [f64; 4], layers: &[Layer<'_>]) -> Result<()> {
        if target.depth_output.is_some() != self.depth_output {
            return Err(Error::Gpu(format!(
                "Renderer {} a depth output attachment",
                if self.depth_output { "requires" } else { "does not take" }
            )));
        }
        gpu.validated("Scene render", || self.encode_and_submit(gpu, target, background, layers))
    }

    fn encode_and_submit(&self, gpu: &GpuContext, target: RenderTargetViews<'_>, background: [f64; 4], layers: &[Layer<'_>]) {
        let mut encoder = gpu.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Scene Render Encoder"),
        });

        if layers.is_empty() {
            let _clear = begin_pass(&mut encoder, target, background, true);
        }

        for (index, layer) in layers.iter().enumerate() {
            let mut render_pass = begin_pass(&mut encoder, target, background, index == 0);

            if let Some([x, y, width, height]) = layer.viewport {
                render_pass.set_viewport(x, y, width, height, 0.0, 1.0);
            }
            render_pass.set_bind_group(0, &layer.frame.bind_group, &[]);

            // Opaque geometry first so translucent draws blend over it
            let opaque = layer.scene.draws.iter().filter(|d| !d.translucent);
            let translucent = layer.scene.draws.iter().filter(|d| d.translucent);
            for draw in opaque.chain(translucent) {
                render_pass.set_bind_group(1, &draw.bind_group, &[]);
                match &draw.geometry {
                    GpuGeometry::Triangles { vertex_buffer, index_buffer, index_count } => {
                        render_pass.set_pipeline(&self.mesh_pipeline);
                        render_pass.set_vertex_buffer(0, vertex_buffer.slice(..));
                        render_pass.set_index_buffer(index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                        render_pass.draw_indexed(0..*index_count, 0, 0..1);
                    }
                    GpuGeometry::Points { instance_buffer, count } => {
                        render_pass.set_pipeline(&self.points_pipeline);
                        render_pass.set_vertex_buffer(0, instance_buffer.slice(..));
                        render_pass.draw(0..QUAD_VERTICES, 0..*count);
                    }
                    GpuGeometry::Lines { instance_buffer, count } => {
                        render_pass.set_pipeline(&self.lines_pipeline);
                        render_pass.set_vertex_buffer(0, instance_buffer.slice(..));
                        render_pass.draw(0..QUAD_VERTICES, 0..*count);
                    }
                }
            }
        }

        gpu.queue.submit(std::iter::once(encoder.finish()));
    }
}

/// Begin a pass over `target`. The depth buffer is always cleared; color
/// and depth output are cleared only for the first layer.
fn begin_pass<'e>(
    encoder: &'e mut wgpu::CommandEncoder,
    target: RenderTargetViews<'e>,
    background: [f64; 4],
    first: bool,
) -> wgpu::RenderPass<'e> {
    let load = |clear: wgpu::Color| if first { wgpu::LoadOp::Clear(clear) } else { wgpu::LoadOp::Load };
    let color = Some(wgpu::RenderPassColorAttachment {
        view: target.color,
        resolve_target: None,
        ops: wgpu::Operations {
            load: load(wgpu::Color {
                r: background[0],
                g: background[1],
                b: background[2],
                a: background[3],
            }),
            store: wgpu::StoreOp::Store,
        },
    });
    // Background depth is the far plane
    let depth_output = target.depth_output.map(|view| wgpu::RenderPassColorAttachment {
        view,
        resolve_target: None,
        ops: wgpu::Operations {
            load: load(wgpu::Color {
                r: 1.0,
                g: 0.0,
                b: 0.0,
                a: 0.0,
            }),
            store: wgpu::StoreOp::Store,
        },
    });
    let color_attachments: Vec<_> = std::iter::once(color).chain(depth_output.map(Some)).collect();

    encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some("Scene Render Pass"),
        color_attachments: &color_attachments,
        depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
            view: target.depth,
            depth_ops: Some(wgpu::Operations {
                load: wgpu::LoadOp::Clear(1.0),
                store: wgpu::StoreOp::Store,
            }),
            stencil_ops: None,
        }),
        timestamp_writes: None,
        occlusion_query_set: None,
    })
}

fn create_render_pipeline(
    gpu: &GpuContext,
    label: &str,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    buffer: wgpu::VertexBufferLayout<'_>,
    color_format: wgpu::TextureFormat,
    depth_output: bool,
) -> wgpu::RenderPipeline {
    let mut targets = vec![Some(wgpu::ColorTargetState {
        format: color_format,
        blend: Some(wgpu::BlendState::ALPHA_BLENDING),
        write_mask: wgpu::ColorWrites::ALL,
    })];
    if depth_output {
        // Float targets do not blend: the last fragment that passes the
        // depth test wins, as in the depth buffer
        targets.push(Some(wgpu::ColorTargetState {
            format: DEPTH_OUTPUT_FORMAT,
            blend: None,
            write_mask: wgpu::ColorWrites::RED,
        }));
    }

    gpu.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: "vs_main",
            buffers: &[buffer],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: if depth_output { "fs_main_depth" } else { "fs_main" },
            targets: &targets,
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            unclipped_depth: false,
            polygon_mode: wgpu::PolygonMode::Fill,
            conservative: false,
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::LessEqual,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState {
            count: 1,
            mask: !0,
            alpha_to_coverage_enabled: false,
        },
        multiview: None,
    })
}

fn upload_texture(gpu: &GpuContext, texture: &Texture) -> wgpu::Texture {
    gpu.device.create_texture_with_data(
        &gpu.queue,
        &wgpu::TextureDescriptor {
            label: Some("Color Texture"),
            size: wgpu::Extent3d {
                width: texture.width,
                height: texture.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        },
        wgpu::util::TextureDataOrder::LayerMajor,
        &texture.rgba,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_layouts_match_struct_sizes() {
        assert_eq!(std::mem::size_of::<MeshVertex>(), 36);
        assert_eq!(MeshVertex::desc().array_stride, 36);
        assert_eq!(std::mem::size_of::<PointInstance>(), 28);
        assert_eq!(std::mem::size_of::<LineInstance>(), 40);
        assert_eq!(std::mem::size_of::<FrameUniforms>(), 96);
        assert_eq!(std::mem::size_of::<DrawUniforms>(), 96);
    }

    #[test]
    fn test_draw_uniforms_flags() {
        let texture = Texture::solid([10, 20, 30, 255]);
        let mut item = DrawItem::new(Primitive::Triangles {
            vertices: Vec::new(),
            indices: Vec::new(),
            texture: Some(&texture),
        });
        item.opacity = 2.0;
        item.lighting = false;

        let uniforms = item.uniforms();
        assert_eq!(uniforms.flags, [0, 1, 0, 0]);
        assert_eq!(uniforms.params[0], 1.0);

        let points = DrawItem::new(Primitive::Points(vec![]));
        assert_eq!(points.uniforms().flags, [1, 0, 0, 0]);
    }

    #[test]
    fn test_frame_uniforms_viewport() {
        let uniforms = FrameUniforms::new(&Matrix4::identity(), &Point3::new(1.0, 2.0, 3.0), 640, 0);
        assert_eq!(uniforms.viewport, [640.0, 1.0, 0.0, 0.0]);
        assert_eq!(uniforms.camera_position, [1.0, 2.0, 3.0, 1.0]);
    }
}
