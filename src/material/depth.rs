//! Depth-packing material for the depth pre-pass.

use super::Material;
use crate::core::Id;

/// Material that encodes fragment depth into the RGBA color channels.
///
/// One shared instance serves every node that lacks an override; the
/// depth-of-field pass creates it once and swaps it in for the duration
/// of the depth capture.
pub struct DepthMaterial {
    /// Unique ID.
    id: Id,
    /// Material name.
    name: String,
}

impl Default for DepthMaterial {
    fn default() -> Self {
        Self::new()
    }
}

impl DepthMaterial {
    /// Create a new depth material.
    pub fn new() -> Self {
        Self {
            id: Id::new(),
            name: "depth".to_string(),
        }
    }
}

impl Material for DepthMaterial {
    fn id(&self) -> Id {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn shader_source(&self) -> &str {
        DEPTH_SHADER
    }

    fn uniform_data(&self) -> Vec<u8> {
        // The shader takes no parameters; the block is padding only.
        vec![0u8; 16]
    }
}

const DEPTH_SHADER: &str = r#"
struct Camera {
    view_proj: mat4x4<f32>,
}

struct Model {
    model: mat4x4<f32>,
}

struct MaterialParams {
    _pad: vec4<f32>,
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
}

@vertex
fn vs_main(in: VertexInput) -> VertexOutput {
    var out: VertexOutput;
    out.position = camera.view_proj * model.model * vec4<f32>(in.position, 1.0);
    return out;
}

// Pack normalized device depth into 8-bit RGBA channels, highest
// precision in red.
fn pack_depth(depth: f32) -> vec4<f32> {
    let bit_shift = vec4<f32>(256.0 * 256.0 * 256.0, 256.0 * 256.0, 256.0, 1.0);
    let bit_mask = vec4<f32>(0.0, 1.0 / 256.0, 1.0 / 256.0, 1.0 / 256.0);
    var res = fract(depth * bit_shift);
    res = res - res.xxyz * bit_mask;
    return res;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    return pack_depth(in.position.z);
}
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_each_instance_has_distinct_identity() {
        let a = DepthMaterial::new();
        let b = DepthMaterial::new();
        assert_ne!(a.id(), b.id());
    }
}
