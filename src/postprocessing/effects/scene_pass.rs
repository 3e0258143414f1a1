//! Scene render pass.

use crate::core::{ClearStateGuard, RenderTarget, SceneRenderer};
use crate::math::Color;
use crate::postprocessing::pass::{FrameContext, Pass};

/// Renders the scene into the pipeline, usually as the first pass.
///
/// Output lands in the read buffer so downstream passes can consume it
/// as a texture, which is why this pass opts out of the buffer swap.
pub struct ScenePass {
    enabled: bool,
    /// Clear color override for the duration of this pass.
    pub clear_color: Option<Color>,
    /// Clear alpha override for the duration of this pass.
    pub clear_alpha: Option<f32>,
}

impl Default for ScenePass {
    fn default() -> Self {
        Self::new()
    }
}

impl ScenePass {
    /// Create a new scene pass.
    pub fn new() -> Self {
        Self {
            enabled: true,
            clear_color: None,
            clear_alpha: None,
        }
    }
}

impl Pass for ScenePass {
    fn name(&self) -> &str {
        "scene"
    }

    fn enabled(&self) -> bool {
        self.enabled
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    fn needs_swap(&self) -> bool {
        false
    }

    fn resize(&mut self, _width: u32, _height: u32) {}

    fn render(
        &mut self,
        renderer: &mut dyn SceneRenderer,
        frame: &FrameContext<'_>,
        read_buffer: &mut RenderTarget,
        _write_buffer: &mut RenderTarget,
        to_screen: bool,
    ) {
        let mut guarded = ClearStateGuard::new(renderer);
        if let Some(color) = self.clear_color {
            guarded.set_clear_color(color);
        }
        if let Some(alpha) = self.clear_alpha {
            guarded.set_clear_alpha(alpha);
        }
        if to_screen {
            guarded.set_render_target(None);
        } else {
            guarded.set_render_target(Some(read_buffer));
        }
        guarded.render_scene(frame.scene, frame.camera);
    }

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::PerspectiveCamera;
    use crate::scene::Scene;
    use crate::test_support::{RecordingRenderer, RenderEvent};

    #[test]
    fn test_renders_into_read_buffer_without_swap() {
        let mut renderer = RecordingRenderer::new();
        let scene = Scene::new();
        let camera = PerspectiveCamera::default();
        let mut read = RenderTarget::new("Read", 64, 64, wgpu::TextureFormat::Rgba8Unorm);
        let mut write = RenderTarget::new("Write", 64, 64, wgpu::TextureFormat::Rgba8Unorm);

        let mut pass = ScenePass::new();
        assert!(!pass.needs_swap());

        let frame = FrameContext {
            scene: &scene,
            camera: &camera,
        };
        pass.render(&mut renderer, &frame, &mut read, &mut write, false);

        assert!(matches!(
            renderer.events.as_slice(),
            [
                RenderEvent::SetTarget(Some(target)),
                RenderEvent::RenderScene { .. }
            ] if *target == read.id()
        ));
    }

    #[test]
    fn test_clear_overrides_do_not_leak() {
        let mut renderer = RecordingRenderer::new();
        let before = renderer.clear_color();
        let scene = Scene::new();
        let camera = PerspectiveCamera::default();
        let mut read = RenderTarget::new("Read", 64, 64, wgpu::TextureFormat::Rgba8Unorm);
        let mut write = RenderTarget::new("Write", 64, 64, wgpu::TextureFormat::Rgba8Unorm);

        let mut pass = ScenePass::new();
        pass.clear_color = Some(Color::RED);
        pass.clear_alpha = Some(0.0);

        let frame = FrameContext {
            scene: &scene,
            camera: &camera,
        };
        pass.render(&mut renderer, &frame, &mut read, &mut write, true);

        assert_eq!(renderer.clear_color(), before);
        assert_eq!(renderer.clear_alpha(), 1.0);
    }
}
