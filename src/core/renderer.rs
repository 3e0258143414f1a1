//! Main renderer implementation.
//!
//! [`SceneRenderer`] is the seam between passes and the GPU: passes
//! manipulate clear state, bind targets, and issue scene or full-screen
//! draws through it. [`Renderer`] is the wgpu implementation; tests use
//! a recording double.

use super::{Gpu, Id, RenderTarget, TargetTexture};
use crate::camera::PerspectiveCamera;
use crate::math::Color;
use crate::postprocessing::{FullscreenVertex, FULLSCREEN_QUAD_VERTICES};
use crate::scene::Scene;
use std::collections::HashMap;
use std::sync::Arc;
use wgpu::util::DeviceExt;

/// A single full-screen draw: an opaque shader artifact, its packed
/// uniform block, and the textures it samples. Uniform values are
/// assembled by the caller immediately before the draw, so the block
/// always reflects the current frame.
pub struct FullscreenDraw<'a> {
    /// Pipeline cache key for the shader.
    pub shader_id: Id,
    /// WGSL source of the shader.
    pub shader_source: &'a str,
    /// Packed uniform block bytes.
    pub uniforms: &'a [u8],
    /// Color input texture (previous stage output).
    pub color_texture: Option<&'a Arc<TargetTexture>>,
    /// Depth input texture (packed-depth target).
    pub depth_texture: Option<&'a Arc<TargetTexture>>,
}

/// Renderer interface consumed by post-processing passes.
///
/// Clear color, clear alpha, and the auto-clear flag are global
/// renderer state shared by every pass in a pipeline; a pass that
/// changes them must put them back (see [`ClearStateGuard`]).
pub trait SceneRenderer {
    /// Get the clear color.
    fn clear_color(&self) -> Color;
    /// Set the clear color.
    fn set_clear_color(&mut self, color: Color);
    /// Get the clear alpha.
    fn clear_alpha(&self) -> f32;
    /// Set the clear alpha.
    fn set_clear_alpha(&mut self, alpha: f32);
    /// Whether scene draws clear the target first.
    fn auto_clear(&self) -> bool;
    /// Set the auto-clear flag.
    fn set_auto_clear(&mut self, auto_clear: bool);

    /// Bind a render target, or the display surface when `None`.
    /// Backing textures are (re)allocated here if the target was
    /// resized since its last bind.
    fn set_render_target(&mut self, target: Option<&mut RenderTarget>);

    /// Clear the bound target with the current clear color and alpha.
    fn clear(&mut self);

    /// Render the scene from the given camera into the bound target,
    /// using whichever material each node currently holds.
    fn render_scene(&mut self, scene: &Scene, camera: &PerspectiveCamera);

    /// Draw a full-screen quad into the bound target.
    fn draw_fullscreen(&mut self, draw: &FullscreenDraw<'_>);
}

/// Scoped save/restore of the renderer's clear state.
///
/// Captures clear color, clear alpha, and auto-clear on construction
/// and writes all three back on drop, so a pass that temporarily forces
/// its own clear configuration cannot leak it past its own `render`,
/// whichever way that returns.
pub struct ClearStateGuard<'a, R: SceneRenderer + ?Sized> {
    renderer: &'a mut R,
    color: Color,
    alpha: f32,
    auto_clear: bool,
}

impl<'a, R: SceneRenderer + ?Sized> ClearStateGuard<'a, R> {
    /// Capture the renderer's current clear state.
    pub fn new(renderer: &'a mut R) -> Self {
        let color = renderer.clear_color();
        let alpha = renderer.clear_alpha();
        let auto_clear = renderer.auto_clear();
        Self {
            renderer,
            color,
            alpha,
            auto_clear,
        }
    }
}

impl<R: SceneRenderer + ?Sized> Drop for ClearStateGuard<'_, R> {
    fn drop(&mut self) {
        self.renderer.set_clear_color(self.color);
        self.renderer.set_clear_alpha(self.alpha);
        self.renderer.set_auto_clear(self.auto_clear);
    }
}

impl<R: SceneRenderer + ?Sized> std::ops::Deref for ClearStateGuard<'_, R> {
    type Target = R;
    fn deref(&self) -> &R {
        self.renderer
    }
}

impl<R: SceneRenderer + ?Sized> std::ops::DerefMut for ClearStateGuard<'_, R> {
    fn deref_mut(&mut self) -> &mut R {
        self.renderer
    }
}

/// Camera uniform block for scene draws.
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
struct CameraUniform {
    view_proj: [f32; 16],
}

/// Per-object uniform block for scene draws.
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
struct ModelUniform {
    model: [f32; 16],
}

/// Upper bound on a material's parameter block, in bytes.
const MATERIAL_BLOCK_SIZE: u64 = 64;

/// Uniform buffers and bind group for one scene draw.
struct ObjectSlot {
    model_buf: wgpu::Buffer,
    material_buf: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

/// Render statistics for the current frame.
#[derive(Debug, Clone, Default)]
pub struct RenderInfo {
    /// Number of draw calls.
    pub draw_calls: u32,
    /// Frame number.
    pub frame: u64,
}

/// The wgpu renderer.
pub struct Renderer {
    gpu: Arc<Gpu>,
    surface_format: wgpu::TextureFormat,
    clear_color: Color,
    clear_alpha: f32,
    auto_clear: bool,
    info: RenderInfo,

    // Frame-scoped display surface view, set by `begin_frame`.
    screen_view: Option<wgpu::TextureView>,
    screen_depth: Option<(wgpu::Texture, wgpu::TextureView)>,
    screen_size: (u32, u32),

    // Currently bound target (None = display surface).
    bound_target: Option<Arc<TargetTexture>>,
    bound_format: wgpu::TextureFormat,

    scene_bgl: wgpu::BindGroupLayout,
    fullscreen_bgl: wgpu::BindGroupLayout,
    scene_pipelines: HashMap<(Id, wgpu::TextureFormat), wgpu::RenderPipeline>,
    fullscreen_pipelines: HashMap<(Id, wgpu::TextureFormat), wgpu::RenderPipeline>,

    camera_buf: wgpu::Buffer,
    fullscreen_ubo: wgpu::Buffer,
    quad_buffer: wgpu::Buffer,
    linear_sampler: wgpu::Sampler,
    nearest_sampler: wgpu::Sampler,
    object_slots: Vec<ObjectSlot>,
}

impl Renderer {
    /// Create a new renderer for the given surface format and size.
    pub fn new(gpu: Arc<Gpu>, surface_format: wgpu::TextureFormat, width: u32, height: u32) -> Self {
        let device = &gpu.device;

        let scene_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Scene Bind Group Layout"),
            entries: &[
                // Camera
                uniform_entry(0, wgpu::ShaderStages::VERTEX),
                // Model
                uniform_entry(1, wgpu::ShaderStages::VERTEX),
                // Material parameters
                uniform_entry(2, wgpu::ShaderStages::FRAGMENT),
            ],
        });

        let fullscreen_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Fullscreen Bind Group Layout"),
            entries: &[
                // Color input
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                // Depth input (color-packed)
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
                // Linear sampler
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
                // Nearest sampler (for packed depth)
                wgpu::BindGroupLayoutEntry {
                    binding: 3,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::NonFiltering),
                    count: None,
                },
                // Uniforms
                uniform_entry(4, wgpu::ShaderStages::FRAGMENT),
            ],
        });

        let camera_buf = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Camera Uniform Buffer"),
            size: std::mem::size_of::<CameraUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let fullscreen_ubo = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Fullscreen Uniform Buffer"),
            size: 256,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let quad_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Fullscreen Quad Buffer"),
            contents: bytemuck::cast_slice(&FULLSCREEN_QUAD_VERTICES),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let linear_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Linear Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let nearest_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Nearest Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let mut renderer = Self {
            gpu,
            surface_format,
            clear_color: Color::new(0.1, 0.1, 0.1),
            clear_alpha: 1.0,
            auto_clear: true,
            info: RenderInfo::default(),
            screen_view: None,
            screen_depth: None,
            screen_size: (width.max(1), height.max(1)),
            bound_target: None,
            bound_format: surface_format,
            scene_bgl,
            fullscreen_bgl,
            scene_pipelines: HashMap::new(),
            fullscreen_pipelines: HashMap::new(),
            camera_buf,
            fullscreen_ubo,
            quad_buffer,
            linear_sampler,
            nearest_sampler,
            object_slots: Vec::new(),
        };
        renderer.create_screen_depth();
        renderer
    }

    /// Get render info.
    #[inline]
    pub fn info(&self) -> &RenderInfo {
        &self.info
    }

    /// Handle surface resize.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.screen_size = (width, height);
            self.create_screen_depth();
        }
    }

    /// Begin a frame targeting the given surface view.
    pub fn begin_frame(&mut self, surface_view: wgpu::TextureView) {
        self.screen_view = Some(surface_view);
        self.bound_target = None;
        self.bound_format = self.surface_format;
        self.info.draw_calls = 0;
        self.info.frame += 1;
    }

    /// End the frame, releasing the surface view.
    pub fn end_frame(&mut self) {
        self.screen_view = None;
    }

    fn create_screen_depth(&mut self) {
        let texture = self.gpu.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Screen Depth Texture"),
            size: wgpu::Extent3d {
                width: self.screen_size.0,
                height: self.screen_size.1,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Depth32Float,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        self.screen_depth = Some((texture, view));
    }

    /// Views of the currently bound target, or `None` when targeting
    /// the display surface outside of a frame.
    fn current_views(&self) -> Option<(&wgpu::TextureView, &wgpu::TextureView)> {
        match (&self.bound_target, &self.screen_view, &self.screen_depth) {
            (Some(target), _, _) => Some((&target.color_view, &target.depth_view)),
            (None, Some(color), Some((_, depth))) => Some((color, depth)),
            _ => None,
        }
    }

    fn wgpu_clear_color(&self) -> wgpu::Color {
        wgpu::Color {
            r: self.clear_color.r as f64,
            g: self.clear_color.g as f64,
            b: self.clear_color.b as f64,
            a: self.clear_alpha as f64,
        }
    }

    fn ensure_scene_pipeline(&mut self, material_id: Id, shader_source: &str) {
        let key = (material_id, self.bound_format);
        if self.scene_pipelines.contains_key(&key) {
            return;
        }
        let device = &self.gpu.device;
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Scene Material Shader"),
            source: wgpu::ShaderSource::Wgsl(shader_source.into()),
        });
        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Scene Pipeline Layout"),
            bind_group_layouts: &[&self.scene_bgl],
            push_constant_ranges: &[],
        });
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Scene Pipeline"),
            layout: Some(&layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[crate::geometry::Vertex::layout()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: self.bound_format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: Some(wgpu::Face::Back),
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: wgpu::TextureFormat::Depth32Float,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::LessEqual,
                stencil: Default::default(),
                bias: Default::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });
        self.scene_pipelines.insert(key, pipeline);
    }

    fn ensure_fullscreen_pipeline(&mut self, shader_id: Id, shader_source: &str) {
        let key = (shader_id, self.bound_format);
        if self.fullscreen_pipelines.contains_key(&key) {
            return;
        }
        let device = &self.gpu.device;
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Fullscreen Shader"),
            source: wgpu::ShaderSource::Wgsl(shader_source.into()),
        });
        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Fullscreen Pipeline Layout"),
            bind_group_layouts: &[&self.fullscreen_bgl],
            push_constant_ranges: &[],
        });
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Fullscreen Pipeline"),
            layout: Some(&layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[FullscreenVertex::layout()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: self.bound_format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });
        self.fullscreen_pipelines.insert(key, pipeline);
    }

    fn ensure_object_slots(&mut self, count: usize) {
        let device = &self.gpu.device;
        while self.object_slots.len() < count {
            let model_buf = device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("Model Uniform Buffer"),
                size: std::mem::size_of::<ModelUniform>() as u64,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });
            let material_buf = device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("Material Uniform Buffer"),
                size: MATERIAL_BLOCK_SIZE,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });
            let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("Scene Bind Group"),
                layout: &self.scene_bgl,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: self.camera_buf.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: model_buf.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 2,
                        resource: material_buf.as_entire_binding(),
                    },
                ],
            });
            self.object_slots.push(ObjectSlot {
                model_buf,
                material_buf,
                bind_group,
            });
        }
    }
}

impl SceneRenderer for Renderer {
    #[inline]
    fn clear_color(&self) -> Color {
        self.clear_color
    }

    #[inline]
    fn set_clear_color(&mut self, color: Color) {
        self.clear_color = color;
    }

    #[inline]
    fn clear_alpha(&self) -> f32 {
        self.clear_alpha
    }

    #[inline]
    fn set_clear_alpha(&mut self, alpha: f32) {
        self.clear_alpha = alpha;
    }

    #[inline]
    fn auto_clear(&self) -> bool {
        self.auto_clear
    }

    #[inline]
    fn set_auto_clear(&mut self, auto_clear: bool) {
        self.auto_clear = auto_clear;
    }

    fn set_render_target(&mut self, target: Option<&mut RenderTarget>) {
        match target {
            Some(rt) => {
                self.bound_format = rt.format();
                self.bound_target = Some(rt.ensure_allocated(&self.gpu.device).clone());
            }
            None => {
                self.bound_format = self.surface_format;
                self.bound_target = None;
            }
        }
    }

    fn clear(&mut self) {
        let clear_color = self.wgpu_clear_color();
        let Some((color_view, depth_view)) = self.current_views() else {
            log::warn!("clear() with no render target bound");
            return;
        };
        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Clear Encoder"),
            });
        {
            let _pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Clear Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: color_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });
        }
        self.gpu.queue.submit(std::iter::once(encoder.finish()));
    }

    fn render_scene(&mut self, scene: &Scene, camera: &PerspectiveCamera) {
        let draws = scene.collect_draws();

        for draw in &draws {
            self.ensure_scene_pipeline(draw.material.id(), draw.material.shader_source());
        }
        self.ensure_object_slots(draws.len());

        let gpu = self.gpu.clone();
        let camera_uniform = CameraUniform {
            view_proj: camera.view_projection_matrix().to_cols_array(),
        };
        gpu.queue
            .write_buffer(&self.camera_buf, 0, bytemuck::bytes_of(&camera_uniform));

        for (slot, draw) in self.object_slots.iter().zip(&draws) {
            let model = ModelUniform {
                model: draw.model.to_cols_array(),
            };
            gpu.queue
                .write_buffer(&slot.model_buf, 0, bytemuck::bytes_of(&model));
            let params = draw.material.uniform_data();
            if !params.is_empty() {
                gpu.queue.write_buffer(&slot.material_buf, 0, &params);
            }
        }

        let clear_color = self.wgpu_clear_color();
        let auto_clear = self.auto_clear;
        let Some((color_view, depth_view)) = self.current_views() else {
            log::warn!("render_scene() with no render target bound");
            return;
        };

        let mut draw_calls = 0;
        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Scene Encoder"),
            });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: color_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: if auto_clear {
                            wgpu::LoadOp::Clear(clear_color)
                        } else {
                            wgpu::LoadOp::Load
                        },
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: if auto_clear {
                            wgpu::LoadOp::Clear(1.0)
                        } else {
                            wgpu::LoadOp::Load
                        },
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            for (slot, draw) in self.object_slots.iter().zip(&draws) {
                let key = (draw.material.id(), self.bound_format);
                let Some(pipeline) = self.scene_pipelines.get(&key) else {
                    continue;
                };
                let Some(vertex_buffer) = draw.geometry.vertex_buffer() else {
                    continue;
                };
                pass.set_pipeline(pipeline);
                pass.set_bind_group(0, &slot.bind_group, &[]);
                pass.set_vertex_buffer(0, vertex_buffer.slice(..));
                if let Some(index_buffer) = draw.geometry.index_buffer() {
                    pass.set_index_buffer(index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                    pass.draw_indexed(0..draw.geometry.index_count(), 0, 0..1);
                } else {
                    pass.draw(0..draw.geometry.vertex_count(), 0..1);
                }
                draw_calls += 1;
            }
        }
        gpu.queue.submit(std::iter::once(encoder.finish()));
        self.info.draw_calls += draw_calls;
    }

    fn draw_fullscreen(&mut self, draw: &FullscreenDraw<'_>) {
        let (Some(color_texture), Some(depth_texture)) = (draw.color_texture, draw.depth_texture)
        else {
            log::warn!("draw_fullscreen() with unallocated input textures");
            return;
        };

        self.ensure_fullscreen_pipeline(draw.shader_id, draw.shader_source);

        let gpu = self.gpu.clone();
        gpu.queue.write_buffer(&self.fullscreen_ubo, 0, draw.uniforms);

        let bind_group = gpu.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Fullscreen Bind Group"),
            layout: &self.fullscreen_bgl,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&color_texture.color_view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&depth_texture.color_view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&self.linear_sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::Sampler(&self.nearest_sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 4,
                    resource: self.fullscreen_ubo.as_entire_binding(),
                },
            ],
        });

        let Some((color_view, _)) = self.current_views() else {
            log::warn!("draw_fullscreen() with no render target bound");
            return;
        };
        let key = (draw.shader_id, self.bound_format);
        let Some(pipeline) = self.fullscreen_pipelines.get(&key) else {
            return;
        };

        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Fullscreen Encoder"),
            });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Fullscreen Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: color_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            pass.set_pipeline(pipeline);
            pass.set_bind_group(0, &bind_group, &[]);
            pass.set_vertex_buffer(0, self.quad_buffer.slice(..));
            pass.draw(0..6, 0..1);
        }
        gpu.queue.submit(std::iter::once(encoder.finish()));
        self.info.draw_calls += 1;
    }
}

fn uniform_entry(binding: u32, visibility: wgpu::ShaderStages) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::RecordingRenderer;

    #[test]
    fn test_clear_state_guard_restores_on_drop() {
        let mut renderer = RecordingRenderer::new();
        renderer.set_clear_color(Color::new(0.2, 0.4, 0.6));
        renderer.set_clear_alpha(0.5);
        renderer.set_auto_clear(true);

        {
            let mut guarded = ClearStateGuard::new(&mut renderer as &mut dyn SceneRenderer);
            guarded.set_auto_clear(false);
            guarded.set_clear_color(Color::WHITE);
            guarded.set_clear_alpha(1.0);
            assert!(!guarded.auto_clear());
        }

        assert_eq!(renderer.clear_color(), Color::new(0.2, 0.4, 0.6));
        assert_eq!(renderer.clear_alpha(), 0.5);
        assert!(renderer.auto_clear());
    }

    #[test]
    fn test_clear_state_guard_restores_after_nested_changes() {
        let mut renderer = RecordingRenderer::new();
        let before = (
            renderer.clear_color(),
            renderer.clear_alpha(),
            renderer.auto_clear(),
        );
        {
            let mut guarded = ClearStateGuard::new(&mut renderer);
            guarded.set_clear_color(Color::RED);
            guarded.set_clear_color(Color::BLUE);
            guarded.set_clear_alpha(0.0);
        }
        let after = (
            renderer.clear_color(),
            renderer.clear_alpha(),
            renderer.auto_clear(),
        );
        assert_eq!(before, after);
    }
}
