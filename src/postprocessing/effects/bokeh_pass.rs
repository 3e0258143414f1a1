//! Depth-of-field (bokeh) pass.
//!
//! Runs in two stages each frame: a depth pre-pass that re-renders the
//! scene with depth-packing materials into a private target, then a
//! full-screen composite that blurs the previous stage's color output
//! by each pixel's distance from the focal plane.

use crate::core::{ClearStateGuard, FullscreenDraw, Id, RenderTarget, SceneRenderer};
use crate::material::{DepthMaterial, MaterialRef};
use crate::math::Color;
use crate::postprocessing::material_swap::MaterialSwap;
use crate::postprocessing::pass::{FrameContext, Pass};
use crate::postprocessing::PassError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Construction parameters for [`BokehPass`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BokehParams {
    /// Distance from the camera to the focal plane, in world units.
    pub focus: f32,
    /// Blur strength per unit of defocus.
    pub aperture: f32,
    /// Upper bound on the blur radius in UV space.
    pub max_blur: f32,
    /// Fixed aspect ratio for blur shaping; `None` follows the camera.
    pub aspect: Option<f32>,
    /// Initial depth target width in physical pixels.
    pub width: u32,
    /// Initial depth target height in physical pixels.
    pub height: u32,
}

impl Default for BokehParams {
    fn default() -> Self {
        Self {
            focus: 1.0,
            aperture: 0.025,
            max_blur: 1.0,
            aspect: None,
            width: 1,
            height: 1,
        }
    }
}

/// Composite uniform block, assembled fresh for every draw.
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
struct BokehUniforms {
    focus: f32,
    aperture: f32,
    max_blur: f32,
    aspect: f32,
    near: f32,
    far: f32,
    _pad: [f32; 2],
}

/// Depth-of-field post-processing pass.
///
/// `focus`, `aperture`, and `max_blur` are plain public fields; the
/// composite reads them (and the camera's live clip planes) when it
/// assembles its uniform block, so mutations between frames take effect
/// on the next render with no invalidation step.
pub struct BokehPass {
    enabled: bool,
    /// Distance from the camera to the focal plane, in world units.
    pub focus: f32,
    /// Blur strength per unit of defocus.
    pub aperture: f32,
    /// Upper bound on the blur radius in UV space.
    pub max_blur: f32,
    aspect: Option<f32>,
    depth_target: RenderTarget,
    depth_material: MaterialRef,
    swap: MaterialSwap,
    shader_id: Id,
    shader_source: String,
}

impl BokehPass {
    /// Create a bokeh pass with the built-in composite shader.
    pub fn new(params: BokehParams) -> Result<Self, PassError> {
        Self::with_shader(BOKEH_SHADER, params)
    }

    /// Create a bokeh pass with a custom composite shader. The shader
    /// must expose `vs_main` and `fs_main` entry points against the
    /// full-screen binding contract.
    pub fn with_shader(
        shader_source: impl Into<String>,
        params: BokehParams,
    ) -> Result<Self, PassError> {
        let shader_source = shader_source.into();
        if shader_source.trim().is_empty() {
            log::error!("bokeh pass constructed without a composite shader");
            return Err(PassError::MissingShader { pass: "bokeh" });
        }
        for entry_point in ["vs_main", "fs_main"] {
            if !shader_source.contains(entry_point) {
                log::error!("bokeh composite shader has no `{entry_point}` entry point");
                return Err(PassError::MissingEntryPoint {
                    pass: "bokeh",
                    entry_point,
                });
            }
        }
        Ok(Self {
            enabled: true,
            focus: params.focus,
            aperture: params.aperture,
            max_blur: params.max_blur,
            aspect: params.aspect,
            depth_target: RenderTarget::new(
                "Bokeh Depth Target",
                params.width,
                params.height,
                wgpu::TextureFormat::Rgba8Unorm,
            ),
            depth_material: Arc::new(DepthMaterial::new()),
            swap: MaterialSwap::new(),
            shader_id: Id::new(),
            shader_source,
        })
    }

    /// Get the depth target dimensions.
    #[inline]
    pub fn depth_target_size(&self) -> (u32, u32) {
        self.depth_target.size()
    }
}

impl Pass for BokehPass {
    fn name(&self) -> &str {
        "bokeh"
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

    fn resize(&mut self, width: u32, height: u32) {
        self.depth_target.set_size(width, height);
    }

    fn render(
        &mut self,
        renderer: &mut dyn SceneRenderer,
        frame: &FrameContext<'_>,
        read_buffer: &mut RenderTarget,
        write_buffer: &mut RenderTarget,
        to_screen: bool,
    ) {
        self.swap.begin(frame.scene, &self.depth_material);
        {
            let mut guarded = ClearStateGuard::new(renderer);

            // Depth capture. The target starts out white, the packed
            // encoding of the far plane, so uncovered pixels read as
            // maximally distant.
            guarded.set_auto_clear(false);
            guarded.set_clear_color(Color::WHITE);
            guarded.set_clear_alpha(1.0);
            guarded.set_render_target(Some(&mut self.depth_target));
            guarded.clear();
            guarded.render_scene(frame.scene, frame.camera);

            let uniforms = BokehUniforms {
                focus: self.focus,
                aperture: self.aperture,
                max_blur: self.max_blur,
                aspect: self.aspect.unwrap_or(frame.camera.aspect),
                near: frame.camera.near,
                far: frame.camera.far,
                _pad: [0.0; 2],
            };
            let draw = FullscreenDraw {
                shader_id: self.shader_id,
                shader_source: &self.shader_source,
                uniforms: bytemuck::bytes_of(&uniforms),
                color_texture: read_buffer.texture(),
                depth_texture: self.depth_target.texture(),
            };

            if to_screen {
                guarded.set_render_target(None);
                guarded.draw_fullscreen(&draw);
            } else {
                guarded.set_render_target(Some(write_buffer));
                guarded.clear();
                guarded.draw_fullscreen(&draw);
            }
        }
        self.swap.end(frame.scene);
    }

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
}

const BOKEH_SHADER: &str = r#"
struct BokehParams {
    focus: f32,
    aperture: f32,
    max_blur: f32,
    aspect: f32,
    near: f32,
    far: f32,
    _pad0: f32,
    _pad1: f32,
}

@group(0) @binding(0) var t_color: texture_2d<f32>;
@group(0) @binding(1) var t_depth: texture_2d<f32>;
@group(0) @binding(2) var s_linear: sampler;
@group(0) @binding(3) var s_nearest: sampler;
@group(0) @binding(4) var<uniform> params: BokehParams;

struct VertexInput {
    @location(0) position: vec2<f32>,
    @location(1) uv: vec2<f32>,
}

struct VertexOutput {
    @builtin(position) position: vec4<f32>,
    @location(0) uv: vec2<f32>,
}

@vertex
fn vs_main(in: VertexInput) -> VertexOutput {
    var out: VertexOutput;
    out.position = vec4<f32>(in.position, 0.0, 1.0);
    out.uv = in.uv;
    return out;
}

// Inverse of the depth material's pack_depth.
fn unpack_depth(rgba: vec4<f32>) -> f32 {
    let bit_shift = vec4<f32>(
        1.0 / (256.0 * 256.0 * 256.0),
        1.0 / (256.0 * 256.0),
        1.0 / 256.0,
        1.0,
    );
    return dot(rgba, bit_shift);
}

// Perspective-divide depth back to view-space distance.
fn view_distance(depth: f32) -> f32 {
    return params.near * params.far / (params.far - depth * (params.far - params.near));
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let aspect_correct = vec2<f32>(1.0, params.aspect);

    let depth = unpack_depth(textureSample(t_depth, s_nearest, in.uv));
    let factor = view_distance(depth) - params.focus;
    let blur = clamp(factor * params.aperture, -params.max_blur, params.max_blur);

    var col = textureSample(t_color, s_linear, in.uv).rgb;

    // Three concentric sample rings, each offset by half a step so the
    // taps interleave instead of stacking along the axes.
    for (var ring = 1; ring <= 3; ring = ring + 1) {
        let radius = f32(ring) / 3.0;
        for (var i = 0; i < 8; i = i + 1) {
            let angle = (f32(i) + f32(ring) * 0.5) * 0.78539816;
            let offset = vec2<f32>(cos(angle), sin(angle)) * aspect_correct * radius * blur;
            col = col + textureSample(t_color, s_linear, in.uv + offset).rgb;
        }
    }
    col = col / 25.0;

    return vec4<f32>(col, 1.0);
}
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::PerspectiveCamera;
    use crate::geometry::BufferGeometry;
    use crate::material::{BasicMaterial, Material};
    use crate::postprocessing::{EffectComposer, ScenePass};
    use crate::scene::{Object3D, Scene};
    use crate::test_support::{RecordingRenderer, RenderEvent};

    fn mesh(name: &str) -> Object3D {
        let geometry = Arc::new(BufferGeometry::new());
        let material: MaterialRef = Arc::new(BasicMaterial::new(Color::GREEN));
        let mut object = Object3D::mesh(geometry, material);
        object.set_name(name);
        object
    }

    fn targets() -> (RenderTarget, RenderTarget) {
        (
            RenderTarget::new("Read", 64, 64, wgpu::TextureFormat::Rgba8Unorm),
            RenderTarget::new("Write", 64, 64, wgpu::TextureFormat::Rgba8Unorm),
        )
    }

    #[test]
    fn test_default_params() {
        let params = BokehParams::default();
        assert_eq!(params.focus, 1.0);
        assert_eq!(params.aperture, 0.025);
        assert_eq!(params.max_blur, 1.0);
        assert!(params.aspect.is_none());
    }

    #[test]
    fn test_empty_shader_is_rejected() {
        let result = BokehPass::with_shader("   ", BokehParams::default());
        assert!(matches!(
            result,
            Err(PassError::MissingShader { pass: "bokeh" })
        ));
    }

    #[test]
    fn test_missing_entry_point_is_rejected() {
        let result = BokehPass::with_shader(
            "@vertex fn vs_main() {}",
            BokehParams::default(),
        );
        assert!(matches!(
            result,
            Err(PassError::MissingEntryPoint {
                pass: "bokeh",
                entry_point: "fs_main",
            })
        ));
    }

    #[test]
    fn test_resize_applies_while_disabled() {
        let mut pass = BokehPass::new(BokehParams::default()).unwrap();
        pass.set_enabled(false);
        pass.resize(320, 240);
        assert_eq!(pass.depth_target_size(), (320, 240));
    }

    #[test]
    fn test_uniforms_follow_field_and_camera_mutations() {
        let mut renderer = RecordingRenderer::new();
        let scene = Scene::new();
        let mut camera = PerspectiveCamera::new(60.0, 2.0, 0.5, 100.0);
        let (mut read, mut write) = targets();
        let mut pass = BokehPass::new(BokehParams::default()).unwrap();

        let frame = FrameContext {
            scene: &scene,
            camera: &camera,
        };
        pass.render(&mut renderer, &frame, &mut read, &mut write, false);

        pass.focus = 7.5;
        pass.max_blur = 0.01;
        camera.near = 0.25;
        camera.far = 50.0;
        let frame = FrameContext {
            scene: &scene,
            camera: &camera,
        };
        pass.render(&mut renderer, &frame, &mut read, &mut write, false);

        let draws = renderer.fullscreen_draws();
        assert_eq!(draws.len(), 2);
        let RenderEvent::Fullscreen { uniforms, .. } = draws[1] else {
            unreachable!()
        };
        let block: BokehUniforms = bytemuck::pod_read_unaligned(uniforms);
        assert_eq!(block.focus, 7.5);
        assert_eq!(block.max_blur, 0.01);
        assert_eq!(block.aspect, 2.0);
        assert_eq!(block.near, 0.25);
        assert_eq!(block.far, 50.0);
    }

    #[test]
    fn test_fixed_aspect_overrides_camera() {
        let mut renderer = RecordingRenderer::new();
        let scene = Scene::new();
        let camera = PerspectiveCamera::new(60.0, 2.0, 0.5, 100.0);
        let (mut read, mut write) = targets();
        let mut pass = BokehPass::new(BokehParams {
            aspect: Some(1.25),
            ..Default::default()
        })
        .unwrap();

        let frame = FrameContext {
            scene: &scene,
            camera: &camera,
        };
        pass.render(&mut renderer, &frame, &mut read, &mut write, false);

        let RenderEvent::Fullscreen { uniforms, .. } = renderer.fullscreen_draws()[0] else {
            unreachable!()
        };
        let block: BokehUniforms = bytemuck::pod_read_unaligned(uniforms);
        assert_eq!(block.aspect, 1.25);
    }

    #[test]
    fn test_depth_capture_clears_white_into_private_target() {
        let mut renderer = RecordingRenderer::new();
        let scene = Scene::new();
        let camera = PerspectiveCamera::default();
        let (mut read, mut write) = targets();
        let mut pass = BokehPass::new(BokehParams::default()).unwrap();
        let depth_id = pass.depth_target.id();

        let frame = FrameContext {
            scene: &scene,
            camera: &camera,
        };
        pass.render(&mut renderer, &frame, &mut read, &mut write, false);

        assert!(renderer.events.iter().any(|e| matches!(
            e,
            RenderEvent::Clear {
                target: Some(target),
                color,
                alpha,
            } if *target == depth_id && *color == Color::WHITE && *alpha == 1.0
        )));
    }

    #[test]
    fn test_renderer_state_restored_on_both_output_paths() {
        let scene = Scene::new();
        let camera = PerspectiveCamera::default();
        for to_screen in [false, true] {
            let mut renderer = RecordingRenderer::new();
            let before = (
                renderer.clear_color(),
                renderer.clear_alpha(),
                renderer.auto_clear(),
            );
            let (mut read, mut write) = targets();
            let mut pass = BokehPass::new(BokehParams::default()).unwrap();
            let frame = FrameContext {
                scene: &scene,
                camera: &camera,
            };
            pass.render(&mut renderer, &frame, &mut read, &mut write, to_screen);
            let after = (
                renderer.clear_color(),
                renderer.clear_alpha(),
                renderer.auto_clear(),
            );
            assert_eq!(before, after);
        }
    }

    #[test]
    fn test_screen_path_skips_intermediate_clear() {
        let mut renderer = RecordingRenderer::new();
        let scene = Scene::new();
        let camera = PerspectiveCamera::default();
        let (mut read, mut write) = targets();
        let mut pass = BokehPass::new(BokehParams::default()).unwrap();

        let frame = FrameContext {
            scene: &scene,
            camera: &camera,
        };
        pass.render(&mut renderer, &frame, &mut read, &mut write, true);

        // One clear for the depth target, none for the display surface.
        let clears = renderer
            .events
            .iter()
            .filter(|e| matches!(e, RenderEvent::Clear { .. }))
            .count();
        assert_eq!(clears, 1);
        assert!(matches!(
            renderer.events.last(),
            Some(RenderEvent::Fullscreen { target: None, .. })
        ));
    }

    #[test]
    fn test_pipeline_swaps_and_restores_materials() {
        let mut scene = Scene::new();

        let a = mesh("a");
        let a_original = a.drawable().unwrap().material.id();
        let a_id = a.id();

        let d = mesh("d");
        let d_original = d.drawable().unwrap().material.id();
        let d_id = d.id();

        let mut b = mesh("b");
        let b_original = b.drawable().unwrap().material.id();
        let b_id = b.id();
        let override_material: MaterialRef = Arc::new(DepthMaterial::new());
        let override_id = override_material.id();
        b.drawable_mut().unwrap().depth_material = Some(override_material);

        let mut c = mesh("c");
        let c_id = c.id();
        let c_original = c.drawable().unwrap().material.id();
        c.drawable_mut().unwrap().skip_depth_of_field = true;

        scene.add(a.into_handle());
        scene.add(d.into_handle());
        scene.add(b.into_handle());
        scene.add(c.into_handle());

        let camera = PerspectiveCamera::default();
        let mut renderer = RecordingRenderer::new();
        let mut composer = EffectComposer::new(64, 64, wgpu::TextureFormat::Rgba8Unorm);
        composer.add_pass(Box::new(ScenePass::new()));
        composer.add_pass(Box::new(BokehPass::new(BokehParams::default()).unwrap()));

        composer.render(&mut renderer, &scene, &camera);

        let scene_renders = renderer.scene_renders();
        assert_eq!(scene_renders.len(), 2);

        // The second scene render is the depth capture.
        let RenderEvent::RenderScene { materials, .. } = scene_renders[1] else {
            unreachable!()
        };
        let id_of = |name: &str| {
            materials
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, id)| *id)
                .unwrap()
        };
        // Uniform nodes share the generic depth material.
        assert_eq!(id_of("a"), id_of("d"));
        assert_ne!(id_of("a"), a_original);
        // Per-node override wins over the generic material.
        assert_eq!(id_of("b"), override_id);
        // Excluded nodes keep their display material.
        assert_eq!(id_of("c"), c_original);

        // All display materials restored after the frame.
        for (id, expected) in [
            (a_id, a_original),
            (d_id, d_original),
            (b_id, b_original),
            (c_id, c_original),
        ] {
            let handle = scene.find_by_id(id).unwrap();
            let guard = handle.read().unwrap();
            assert_eq!(guard.drawable().unwrap().material.id(), expected);
        }

        // Terminal composite lands on the display surface.
        assert!(matches!(
            renderer.events.last(),
            Some(RenderEvent::Fullscreen { target: None, .. })
        ));
    }
}
