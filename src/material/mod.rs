//! # Material Module
//!
//! Materials are shader programs plus a small parameter block. Scene
//! nodes hold them through [`MaterialRef`] handles, so replacing a
//! node's material is a handle swap rather than a GPU operation, and
//! the depth pre-pass relies on exactly that.

mod basic;
mod depth;

pub use basic::BasicMaterial;
pub use depth::DepthMaterial;

use crate::core::Id;
use std::sync::Arc;

/// Shared handle to a material.
pub type MaterialRef = Arc<dyn Material>;

/// A material: an opaque WGSL artifact with a fixed bind-group contract
/// (group 0: camera, model, material parameters) plus its parameter
/// block bytes.
pub trait Material: Send + Sync {
    /// Unique ID, used for pipeline caching and identity checks.
    fn id(&self) -> Id;

    /// Human-readable name for diagnostics.
    fn name(&self) -> &str;

    /// WGSL source of the shader program.
    fn shader_source(&self) -> &str;

    /// Packed parameter block, at most 64 bytes. May be empty when the
    /// shader takes no parameters.
    fn uniform_data(&self) -> Vec<u8> {
        Vec::new()
    }
}

/// Whether two handles refer to the same material instance.
#[inline]
pub fn same_material(a: &MaterialRef, b: &MaterialRef) -> bool {
    a.id() == b.id()
}
