//! Base render pass trait for post-processing.

use crate::camera::PerspectiveCamera;
use crate::core::{RenderTarget, SceneRenderer};
use crate::scene::Scene;

/// Per-frame inputs shared by every pass in a pipeline.
pub struct FrameContext<'a> {
    /// The scene being rendered.
    pub scene: &'a Scene,
    /// The active camera, read live each frame.
    pub camera: &'a PerspectiveCamera,
}

/// A render pass in the post-processing pipeline.
pub trait Pass {
    /// Get the name of this pass.
    fn name(&self) -> &str;

    /// Check if this pass is enabled. Disabled passes are skipped by
    /// the composer without being invoked.
    fn enabled(&self) -> bool {
        true
    }

    /// Set whether this pass is enabled.
    fn set_enabled(&mut self, enabled: bool);

    /// Whether the composer swaps the ping-pong buffers after this
    /// pass. A pass that writes its own output placement (into the read
    /// buffer, or into the write buffer while consuming the read buffer
    /// as a texture) returns `false`.
    fn needs_swap(&self) -> bool {
        true
    }

    /// Called when the render target size changes, in physical pixels.
    /// Sizing is applied regardless of the enabled flag so a re-enabled
    /// pass never renders through a stale-sized buffer.
    fn resize(&mut self, width: u32, height: u32);

    /// Render this pass.
    ///
    /// # Arguments
    /// * `renderer` - Renderer to issue state changes and draws through
    /// * `frame` - Scene and camera for this frame
    /// * `read_buffer` - Output of the previous pass
    /// * `write_buffer` - Target for this pass's output
    /// * `to_screen` - This pass is terminal; output goes to the
    ///   display surface instead of `write_buffer`
    fn render(
        &mut self,
        renderer: &mut dyn SceneRenderer,
        frame: &FrameContext<'_>,
        read_buffer: &mut RenderTarget,
        write_buffer: &mut RenderTarget,
        to_screen: bool,
    );

    /// Downcast support for typed access to passes owned by a composer.
    fn as_any_mut(&mut self) -> &mut dyn std::any::Any;
}

/// Vertex for fullscreen quad (position + uv).
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct FullscreenVertex {
    /// Position (x, y).
    pub position: [f32; 2],
    /// UV coordinates.
    pub uv: [f32; 2],
}

impl FullscreenVertex {
    /// Vertex buffer layout.
    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Self>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    format: wgpu::VertexFormat::Float32x2,
                    offset: 0,
                    shader_location: 0,
                },
                wgpu::VertexAttribute {
                    format: wgpu::VertexFormat::Float32x2,
                    offset: 8,
                    shader_location: 1,
                },
            ],
        }
    }
}

/// Fullscreen quad vertices (two triangles).
pub const FULLSCREEN_QUAD_VERTICES: [FullscreenVertex; 6] = [
    // First triangle
    FullscreenVertex { position: [-1.0, -1.0], uv: [0.0, 1.0] },
    FullscreenVertex { position: [1.0, -1.0], uv: [1.0, 1.0] },
    FullscreenVertex { position: [1.0, 1.0], uv: [1.0, 0.0] },
    // Second triangle
    FullscreenVertex { position: [-1.0, -1.0], uv: [0.0, 1.0] },
    FullscreenVertex { position: [1.0, 1.0], uv: [1.0, 0.0] },
    FullscreenVertex { position: [-1.0, 1.0], uv: [0.0, 0.0] },
];
