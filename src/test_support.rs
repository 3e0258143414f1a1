//! Shared test doubles.

use crate::camera::PerspectiveCamera;
use crate::core::{FullscreenDraw, Id, RenderTarget, SceneRenderer};
use crate::math::Color;
use crate::scene::Scene;

/// One recorded renderer invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderEvent {
    /// A render target was bound (`None` = display surface).
    SetTarget(Option<Id>),
    /// The bound target was cleared with the state at call time.
    Clear {
        target: Option<Id>,
        color: Color,
        alpha: f32,
    },
    /// The scene was rendered. `materials` snapshots the material each
    /// drawable node held at call time, as (node name, material id).
    RenderScene {
        target: Option<Id>,
        auto_clear: bool,
        materials: Vec<(String, Id)>,
    },
    /// A full-screen draw was issued.
    Fullscreen {
        target: Option<Id>,
        shader_id: Id,
        uniforms: Vec<u8>,
        has_color_input: bool,
        has_depth_input: bool,
    },
}

/// Renderer double that records every call instead of touching a GPU.
pub struct RecordingRenderer {
    clear_color: Color,
    clear_alpha: f32,
    auto_clear: bool,
    bound: Option<Id>,
    /// Recorded invocations in call order.
    pub events: Vec<RenderEvent>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self {
            clear_color: Color::new(0.1, 0.1, 0.1),
            clear_alpha: 1.0,
            auto_clear: true,
            bound: None,
            events: Vec::new(),
        }
    }

    /// Recorded scene renders, in call order.
    pub fn scene_renders(&self) -> Vec<&RenderEvent> {
        self.events
            .iter()
            .filter(|e| matches!(e, RenderEvent::RenderScene { .. }))
            .collect()
    }

    /// Recorded full-screen draws, in call order.
    pub fn fullscreen_draws(&self) -> Vec<&RenderEvent> {
        self.events
            .iter()
            .filter(|e| matches!(e, RenderEvent::Fullscreen { .. }))
            .collect()
    }
}

impl Default for RecordingRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneRenderer for RecordingRenderer {
    fn clear_color(&self) -> Color {
        self.clear_color
    }

    fn set_clear_color(&mut self, color: Color) {
        self.clear_color = color;
    }

    fn clear_alpha(&self) -> f32 {
        self.clear_alpha
    }

    fn set_clear_alpha(&mut self, alpha: f32) {
        self.clear_alpha = alpha;
    }

    fn auto_clear(&self) -> bool {
        self.auto_clear
    }

    fn set_auto_clear(&mut self, auto_clear: bool) {
        self.auto_clear = auto_clear;
    }

    fn set_render_target(&mut self, target: Option<&mut RenderTarget>) {
        self.bound = target.map(|t| t.id());
        self.events.push(RenderEvent::SetTarget(self.bound));
    }

    fn clear(&mut self) {
        self.events.push(RenderEvent::Clear {
            target: self.bound,
            color: self.clear_color,
            alpha: self.clear_alpha,
        });
    }

    fn render_scene(&mut self, scene: &Scene, _camera: &PerspectiveCamera) {
        let mut materials = Vec::new();
        scene.traverse(|object| {
            if let Some(drawable) = object.drawable() {
                materials.push((object.name().to_string(), drawable.material.id()));
            }
        });
        self.events.push(RenderEvent::RenderScene {
            target: self.bound,
            auto_clear: self.auto_clear,
            materials,
        });
    }

    fn draw_fullscreen(&mut self, draw: &FullscreenDraw<'_>) {
        self.events.push(RenderEvent::Fullscreen {
            target: self.bound,
            shader_id: draw.shader_id,
            uniforms: draw.uniforms.to_vec(),
            has_color_input: draw.color_texture.is_some(),
            has_depth_input: draw.depth_texture.is_some(),
        });
    }
}
