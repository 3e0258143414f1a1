//! # Core Module
//!
//! Core engine functionality including wgpu context management,
//! the renderer, and off-screen render targets.

mod context;
mod engine;
mod id;
mod render_target;
mod renderer;

pub use context::{Context, ContextError, Gpu};
pub use engine::Engine;
pub use id::Id;
pub use render_target::{RenderTarget, TargetTexture};
pub use renderer::{ClearStateGuard, FullscreenDraw, RenderInfo, Renderer, SceneRenderer};

/// Render configuration options.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Enable alpha compositing with the page.
    pub alpha: bool,
    /// Power preference for GPU selection.
    pub power_preference: wgpu::PowerPreference,
    /// Present mode (vsync).
    pub present_mode: wgpu::PresentMode,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            alpha: false,
            power_preference: wgpu::PowerPreference::HighPerformance,
            present_mode: wgpu::PresentMode::AutoVsync,
        }
    }
}
