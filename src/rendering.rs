//! Rendering system with wgpu pipelines for bars and outlines.

use bytemuck::{Pod, Zeroable};
use std::sync::Arc;
use wgpu::util::DeviceExt;
use winit::window::Window;

use crate::params::RenderConfig;
use crate::scene::{Bar, SceneContext};

/// Errors raised while creating the rendering system.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("Failed to create surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),
    #[error("Failed to find suitable GPU adapter")]
    NoAdapter,
    #[error("Failed to request device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),
    #[error("Surface reports no supported formats")]
    UnsupportedSurface,
}

/// Uniform buffer shared by both pipelines
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct Uniforms {
    pub view_proj: [[f32; 4]; 4],
    pub border_color: [f32; 4],
}

/// Unit-geometry vertex (quad or outline), centred on the origin
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub uv: [f32; 2],
}

/// Per-bar instance data
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct BarInstance {
    pub offset: [f32; 3],
    pub amplitude: f32,
    pub scale: [f32; 2],
    pub _padding: [f32; 2],
}

impl From<&Bar> for BarInstance {
    fn from(bar: &Bar) -> Self {
        Self {
            offset: bar.position.to_array(),
            amplitude: bar.amplitude,
            scale: bar.scale.to_array(),
            _padding: [0.0; 2],
        }
    }
}

const LEFT_BOTTOM: Vertex = Vertex {
    position: [-0.5, -0.5],
    uv: [0.0, 0.0],
};
const RIGHT_BOTTOM: Vertex = Vertex {
    position: [0.5, -0.5],
    uv: [1.0, 0.0],
};
const RIGHT_TOP: Vertex = Vertex {
    position: [0.5, 0.5],
    uv: [1.0, 1.0],
};
const LEFT_TOP: Vertex = Vertex {
    position: [-0.5, 0.5],
    uv: [0.0, 1.0],
};

/// Unit quad as two triangles (uv.y = 0 at the bottom edge)
const QUAD_VERTICES: [Vertex; 6] = [
    LEFT_BOTTOM,
    RIGHT_BOTTOM,
    RIGHT_TOP,
    LEFT_BOTTOM,
    RIGHT_TOP,
    LEFT_TOP,
];

/// Unit square outline as four line segments
const OUTLINE_VERTICES: [Vertex; 8] = [
    LEFT_BOTTOM,
    RIGHT_BOTTOM,
    RIGHT_BOTTOM,
    RIGHT_TOP,
    RIGHT_TOP,
    LEFT_TOP,
    LEFT_TOP,
    LEFT_BOTTOM,
];

/// Convert an sRGB-encoded colour channel to linear
pub fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// Rendering system managing wgpu device, pipelines, and buffers
pub struct RenderSystem {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    bar_pipeline: wgpu::RenderPipeline,
    border_pipeline: wgpu::RenderPipeline,
    quad_buffer: wgpu::Buffer,
    outline_buffer: wgpu::Buffer,
    bar_instances: wgpu::Buffer,
    border_instances: wgpu::Buffer,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    instance_count: u32,
    clear_color: wgpu::Color,
    /// Surface expects linear colours that it will encode to sRGB
    srgb_surface: bool,
}

impl RenderSystem {
    /// Create new rendering system sized to the window
    pub async fn new(
        window: Arc<Window>,
        scene: &SceneContext,
        render_config: &RenderConfig,
    ) -> Result<Self, RenderError> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        // Window must have 'static lifetime via Arc
        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(RenderError::NoAdapter)?;

        log::info!("GPU: {} ({:?})", adapter.get_info().name, adapter.get_info().backend);

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Main Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::downlevel_webgl2_defaults()
                        .using_resolution(adapter.limits()),
                    memory_hints: Default::default(),
                },
                None,
            )
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or(RenderError::UnsupportedSurface)?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Bars Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/bars.wgsl").into()),
        });

        let quad_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Quad Vertex Buffer"),
            contents: bytemuck::cast_slice(&QUAD_VERTICES),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let outline_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Outline Vertex Buffer"),
            contents: bytemuck::cast_slice(&OUTLINE_VERTICES),
            usage: wgpu::BufferUsages::VERTEX,
        });

        // Instance buffers are sized once; the bar count never changes
        let bars: Vec<BarInstance> = scene.bars().bars().iter().map(BarInstance::from).collect();
        let borders: Vec<BarInstance> =
            scene.bars().borders().iter().map(BarInstance::from).collect();
        let bar_instances = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Bar Instance Buffer"),
            contents: bytemuck::cast_slice(&bars),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });
        let border_instances = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Border Instance Buffer"),
            contents: bytemuck::cast_slice(&borders),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });

        let srgb_surface = surface_format.is_srgb();
        let uniforms = Self::uniforms(scene, srgb_surface);
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Uniform Buffer"),
            contents: bytemuck::cast_slice(&[uniforms]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let uniform_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Uniform Bind Group Layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Uniform Bind Group"),
            layout: &uniform_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Bars Pipeline Layout"),
            bind_group_layouts: &[&uniform_bind_group_layout],
            push_constant_ranges: &[],
        });

        let bar_pipeline = Self::create_pipeline(
            &device,
            &pipeline_layout,
            &shader,
            surface_format,
            ("vs_bar", "fs_bar"),
            wgpu::PrimitiveTopology::TriangleList,
            "Bar Pipeline",
        );
        let border_pipeline = Self::create_pipeline(
            &device,
            &pipeline_layout,
            &shader,
            surface_format,
            ("vs_border", "fs_border"),
            wgpu::PrimitiveTopology::LineList,
            "Border Pipeline",
        );

        let clear_color = render_config.clear_color;

        Ok(Self {
            surface,
            device,
            queue,
            config,
            bar_pipeline,
            border_pipeline,
            quad_buffer,
            outline_buffer,
            bar_instances,
            border_instances,
            uniform_buffer,
            uniform_bind_group,
            instance_count: bars.len() as u32,
            clear_color,
            srgb_surface,
        })
    }

    fn create_pipeline(
        device: &wgpu::Device,
        layout: &wgpu::PipelineLayout,
        shader: &wgpu::ShaderModule,
        format: wgpu::TextureFormat,
        (vs_entry, fs_entry): (&str, &str),
        topology: wgpu::PrimitiveTopology,
        label: &str,
    ) -> wgpu::RenderPipeline {
        let vertex_layout = wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &wgpu::vertex_attr_array![0 => Float32x2, 1 => Float32x2],
        };
        let instance_layout = wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<BarInstance>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &wgpu::vertex_attr_array![
                2 => Float32x3,
                3 => Float32,
                4 => Float32x2
            ],
        };

        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(label),
            layout: Some(layout),
            vertex: wgpu::VertexState {
                module: shader,
                entry_point: Some(vs_entry),
                buffers: &[vertex_layout, instance_layout],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: shader,
                entry_point: Some(fs_entry),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        })
    }

    fn uniforms(scene: &SceneContext, srgb_surface: bool) -> Uniforms {
        let mut border_color = scene.bars().layout().border_color;
        if srgb_surface {
            for c in &mut border_color[..3] {
                *c = srgb_to_linear(*c);
            }
        }
        Uniforms {
            view_proj: scene.camera().view_proj().to_cols_array_2d(),
            border_color,
        }
    }

    /// Current surface size in pixels
    pub fn size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    /// Reconfigure the surface; zero sizes are ignored
    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.config.width = width;
            self.config.height = height;
            self.surface.configure(&self.device, &self.config);
        }
    }

    /// Upload camera and bar state for the next frame
    pub fn update(&self, scene: &SceneContext) {
        let uniforms = Self::uniforms(scene, self.srgb_surface);
        self.queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::cast_slice(&[uniforms]));

        let bars: Vec<BarInstance> = scene.bars().bars().iter().map(BarInstance::from).collect();
        let borders: Vec<BarInstance> =
            scene.bars().borders().iter().map(BarInstance::from).collect();
        self.queue
            .write_buffer(&self.bar_instances, 0, bytemuck::cast_slice(&bars));
        self.queue
            .write_buffer(&self.border_instances, 0, bytemuck::cast_slice(&borders));
    }

    /// Render a frame: bars first, outlines on top
    pub fn render(&self) -> Result<(), wgpu::SurfaceError> {
        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            render_pass.set_bind_group(0, &self.uniform_bind_group, &[]);

            render_pass.set_pipeline(&self.bar_pipeline);
            render_pass.set_vertex_buffer(0, self.quad_buffer.slice(..));
            render_pass.set_vertex_buffer(1, self.bar_instances.slice(..));
            render_pass.draw(0..QUAD_VERTICES.len() as u32, 0..self.instance_count);

            render_pass.set_pipeline(&self.border_pipeline);
            render_pass.set_vertex_buffer(0, self.outline_buffer.slice(..));
            render_pass.set_vertex_buffer(1, self.border_instances.slice(..));
            render_pass.draw(0..OUTLINE_VERTICES.len() as u32, 0..self.instance_count);
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Vec2, Vec3};

    #[test]
    fn test_instance_layout_matches_shader_stride() {
        assert_eq!(std::mem::size_of::<BarInstance>(), 32);
        assert_eq!(std::mem::size_of::<Vertex>(), 16);
        assert_eq!(std::mem::size_of::<Uniforms>(), 80);
    }

    #[test]
    fn test_instance_from_bar() {
        let bar = Bar {
            position: Vec3::new(10.0, -20.0, 1.0),
            scale: Vec2::new(40.0, 80.0),
            amplitude: 0.5,
        };
        let instance = BarInstance::from(&bar);
        assert_eq!(instance.offset, [10.0, -20.0, 1.0]);
        assert_eq!(instance.scale, [40.0, 80.0]);
        assert_eq!(instance.amplitude, 0.5);
    }

    #[test]
    fn test_quad_uv_runs_bottom_to_top() {
        for v in QUAD_VERTICES {
            assert_eq!(v.uv[1], v.position[1] + 0.5);
        }
        assert!(QUAD_VERTICES.iter().any(|v| v.uv == [0.0, 0.0]));
        assert!(QUAD_VERTICES.iter().any(|v| v.uv == [1.0, 1.0]));
    }

    #[test]
    fn test_srgb_to_linear_endpoints() {
        assert_eq!(srgb_to_linear(0.0), 0.0);
        assert!((srgb_to_linear(1.0) - 1.0).abs() < 1e-6);
        let grey = srgb_to_linear(75.0 / 255.0);
        assert!(grey > 0.06 && grey < 0.08);
    }
}
