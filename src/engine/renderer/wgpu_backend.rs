// GPU backend using wgpu

use anyhow::Result;
use glam::{Mat4, Vec3};
use log::{info, warn};
use std::sync::Arc;
use wgpu::util::DeviceExt;
use winit::window::Window;

use super::mesh::{self, MeshData, SPHERE_SEGMENTS};
use super::uniform::{FrameUniform, LightUniform, FOG_COLOR};
use super::{InstanceRaw, LightParams, MatrixStack, Primitive, RenderBackend, Vertex};
use crate::core::Color;
use crate::engine::component::{LightSlot, MAX_LIGHTS};
use crate::engine::config::GameConfig;

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Mesh uploaded once at start-up
struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
}

impl GpuMesh {
    fn new(device: &wgpu::Device, label: &str, data: &MeshData) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} Vertex Buffer")),
            contents: bytemuck::cast_slice(&data.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} Index Buffer")),
            contents: bytemuck::cast_slice(&data.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        Self {
            vertex_buffer,
            index_buffer,
            index_count: data.indices.len() as u32,
        }
    }

    fn draw<'a>(
        &'a self,
        render_pass: &mut wgpu::RenderPass<'a>,
        instances: &'a wgpu::Buffer,
        count: u32,
    ) {
        render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        render_pass.set_vertex_buffer(1, instances.slice(..));
        render_pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
        render_pass.draw_indexed(0..self.index_count, 0, 0..count);
    }
}

/// Renderer drawing into a winit window
///
/// Draw calls are collected during the frame and submitted in one render
/// pass on `present`, one instanced draw per primitive.
pub struct WgpuRenderer {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    depth_view: wgpu::TextureView,
    pipeline: wgpu::RenderPipeline,
    frame_buffer: wgpu::Buffer,
    frame_bind_group: wgpu::BindGroup,
    cube: GpuMesh,
    sphere: GpuMesh,
    stack: MatrixStack,
    projection: Mat4,
    lights: [LightUniform; MAX_LIGHTS],
    cube_instances: Vec<InstanceRaw>,
    sphere_instances: Vec<InstanceRaw>,
    shut_down: bool,
    // Dropped last so the surface never outlives it
    _window: Arc<Window>,
}

impl WgpuRenderer {
    /// Create a new renderer for the given window
    pub async fn new(window: Arc<Window>, game: &GameConfig) -> Result<Self> {
        let size = window.inner_size();
        let (width, height) = if size.width > 0 && size.height > 0 {
            (size.width, size.height)
        } else {
            game.screen_size
        };

        // Create wgpu instance
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        // Create surface
        let surface = instance.create_surface(window.clone())?;

        let power_preference = if game.hardware_acceleration {
            wgpu::PowerPreference::HighPerformance
        } else {
            wgpu::PowerPreference::LowPower
        };

        // Request adapter
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| anyhow::anyhow!("Failed to find suitable GPU adapter"))?;

        info!("Using GPU: {}", adapter.get_info().name);

        // Request device and queue
        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Main Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                },
                None,
            )
            .await?;

        // Configure surface
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .or_else(|| surface_caps.formats.first().copied())
            .ok_or_else(|| anyhow::anyhow!("Surface reports no texture formats"))?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width,
            height,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };

        surface.configure(&device, &config);

        let depth_view = create_depth_view(&device, &config);
        let (pipeline, frame_bind_group_layout) = create_pipeline(&device, surface_format);

        let frame_uniform = FrameUniform::new(Mat4::IDENTITY, [LightUniform::OFF; MAX_LIGHTS]);
        let frame_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Frame Buffer"),
            contents: bytemuck::bytes_of(&frame_uniform),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let frame_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Frame Bind Group"),
            layout: &frame_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: frame_buffer.as_entire_binding(),
            }],
        });

        let cube = GpuMesh::new(&device, "Cube", &mesh::cube());
        let sphere = GpuMesh::new(&device, "Sphere", &mesh::sphere(SPHERE_SEGMENTS));

        info!("Renderer initialized with {}x{} resolution", width, height);

        Ok(Self {
            surface,
            device,
            queue,
            config,
            depth_view,
            pipeline,
            frame_buffer,
            frame_bind_group,
            cube,
            sphere,
            stack: MatrixStack::new(),
            projection: Mat4::IDENTITY,
            lights: [LightUniform::OFF; MAX_LIGHTS],
            cube_instances: Vec::new(),
            sphere_instances: Vec::new(),
            shut_down: false,
            _window: window,
        })
    }

    /// Get the surface format
    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    fn instance_buffer(&self, label: &str, instances: &[InstanceRaw]) -> Option<wgpu::Buffer> {
        if instances.is_empty() {
            return None;
        }
        Some(
            self.device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(label),
                    contents: bytemuck::cast_slice(instances),
                    usage: wgpu::BufferUsages::VERTEX,
                }),
        )
    }

    /// Forget the draws and lights of the finished frame
    fn end_frame(&mut self) {
        self.cube_instances.clear();
        self.sphere_instances.clear();
        self.lights = [LightUniform::OFF; MAX_LIGHTS];
    }
}

impl RenderBackend for WgpuRenderer {
    fn set_viewport(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        if width != self.config.width || height != self.config.height {
            self.config.width = width;
            self.config.height = height;
            self.surface.configure(&self.device, &self.config);
            self.depth_view = create_depth_view(&self.device, &self.config);
            info!("Renderer resized to {}x{}", width, height);
        }
    }

    fn set_perspective(&mut self, fov_y_degrees: f32, aspect: f32, near: f32, far: f32) {
        self.projection = Mat4::perspective_rh(fov_y_degrees.to_radians(), aspect, near, far);
    }

    fn load_identity(&mut self) {
        self.stack.load_identity();
    }

    fn clear(&mut self) {
        self.cube_instances.clear();
        self.sphere_instances.clear();
    }

    fn push_matrix(&mut self) {
        self.stack.push();
    }

    fn pop_matrix(&mut self) {
        self.stack.pop();
    }

    fn translate(&mut self, offset: Vec3) {
        self.stack.translate(offset);
    }

    fn rotate(&mut self, angle_degrees: f32, axis: Vec3) {
        self.stack.rotate(angle_degrees, axis);
    }

    fn scale(&mut self, factors: Vec3) {
        self.stack.scale(factors);
    }

    fn mult_matrix(&mut self, matrix: Mat4) {
        self.stack.mult(matrix);
    }

    fn draw(&mut self, primitive: Primitive, color: Color) {
        let instance = InstanceRaw::new(self.stack.top(), color);
        match primitive {
            Primitive::Cube => self.cube_instances.push(instance),
            Primitive::Sphere => self.sphere_instances.push(instance),
        }
    }

    fn enable_light(&mut self, slot: LightSlot, light: &LightParams) {
        if let Some(target) = self.lights.get_mut(slot.index()) {
            *target = LightUniform::new(light, self.stack.top());
        }
    }

    fn disable_light(&mut self, slot: LightSlot) {
        if let Some(target) = self.lights.get_mut(slot.index()) {
            *target = LightUniform::OFF;
        }
    }

    fn present(&mut self) -> Result<()> {
        let output = match self.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                warn!("Surface lost, reconfiguring");
                self.surface.configure(&self.device, &self.config);
                self.end_frame();
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let frame_uniform = FrameUniform::new(self.projection, self.lights);
        self.queue
            .write_buffer(&self.frame_buffer, 0, bytemuck::bytes_of(&frame_uniform));

        let cube_instances = self.instance_buffer("Cube Instances", &self.cube_instances);
        let sphere_instances = self.instance_buffer("Sphere Instances", &self.sphere_instances);

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let [r, g, b, a] = FOG_COLOR.to_array();
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Main Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: r as f64,
                            g: g as f64,
                            b: b as f64,
                            a: a as f64,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            render_pass.set_pipeline(&self.pipeline);
            render_pass.set_bind_group(0, &self.frame_bind_group, &[]);

            if let Some(buffer) = &cube_instances {
                self.cube
                    .draw(&mut render_pass, buffer, self.cube_instances.len() as u32);
            }
            if let Some(buffer) = &sphere_instances {
                self.sphere
                    .draw(&mut render_pass, buffer, self.sphere_instances.len() as u32);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        self.end_frame();
        Ok(())
    }

    fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        let _ = self.device.poll(wgpu::Maintain::Wait);
        self.end_frame();
        self.shut_down = true;
        info!("Renderer shut down");
    }
}

fn create_depth_view(
    device: &wgpu::Device,
    config: &wgpu::SurfaceConfiguration,
) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Depth Texture"),
        size: wgpu::Extent3d {
            width: config.width,
            height: config.height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}

fn create_pipeline(
    device: &wgpu::Device,
    format: wgpu::TextureFormat,
) -> (wgpu::RenderPipeline, wgpu::BindGroupLayout) {
    // Create shader module
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("Scene Shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("shaders/scene.wgsl").into()),
    });

    let frame_bind_group_layout =
        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Frame Bind Group Layout"),
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

    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Scene Pipeline Layout"),
        bind_group_layouts: &[&frame_bind_group_layout],
        push_constant_ranges: &[],
    });

    let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("Scene Render Pipeline"),
        layout: Some(&pipeline_layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: "vs_main",
            buffers: &[Vertex::desc(), InstanceRaw::desc()],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: "fs_main",
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: Some(wgpu::Face::Back),
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
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
    });

    (pipeline, frame_bind_group_layout)
}
