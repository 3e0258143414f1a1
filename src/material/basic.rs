//! Basic unlit color material.

use super::Material;
use crate::core::Id;
use crate::math::Color;

/// A basic unlit material with a single solid color.
pub struct BasicMaterial {
    /// Unique ID.
    id: Id,
    /// Material name.
    name: String,
    /// Surface color.
    pub color: Color,
}

impl BasicMaterial {
    /// Create a new basic material.
    pub fn new(color: Color) -> Self {
        Self {
            id: Id::new(),
            name: "basic".to_string(),
            color,
        }
    }

    /// Create with a custom name.
    pub fn with_name(color: Color, name: impl Into<String>) -> Self {
        Self {
            id: Id::new(),
            name: name.into(),
            color,
        }
    }
}

impl Material for BasicMaterial {
    fn id(&self) -> Id {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn shader_source(&self) -> &str {
        BASIC_SHADER
    }

    fn uniform_data(&self) -> Vec<u8> {
        let block: [f32; 4] = [self.color.r, self.color.g, self.color.b, 1.0];
        bytemuck::cast_slice(&block).to_vec()
    }
}

const BASIC_SHADER: &str = r#"
struct Camera {
    view_proj: mat4x4<f32>,
}

struct Model {
    model: mat4x4<f32>,
}

struct MaterialParams {
    color: vec4<f32>,
}

@group(0) @binding(0) var<uniform> camera: Camera;
@group(0) @binding(1) var<uniform> model: Model;
@group(0) @binding(2) var<uniform> material: MaterialParams;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
}

struct VertexOutput {
    @builtin(position) position: vec4<f32>,
    @location(0) normal: vec3<f32>,
}

@vertex
fn vs_main(in: VertexInput) -> VertexOutput {
    var out: VertexOutput;
    out.position = camera.view_proj * model.model * vec4<f32>(in.position, 1.0);
    out.normal = (model.model * vec4<f32>(in.normal, 0.0)).xyz;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    // Cheap hemisphere shading so unlit geometry still reads as 3D.
    let light = normalize(vec3<f32>(0.4, 0.8, 0.2));
    let n = normalize(in.normal);
    let shade = 0.6 + 0.4 * max(dot(n, light), 0.0);
    return vec4<f32>(material.color.rgb * shade, material.color.a);
}
"#;
