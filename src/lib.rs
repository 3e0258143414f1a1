//! # Fathom - wgpu 3D engine with depth-of-field post-processing
//!
//! Fathom is a small 3D rendering engine built with Rust, targeting
//! WebGPU through wgpu. Its centerpiece is a depth-of-field (bokeh)
//! post-process that runs a depth-only pre-pass over the scene graph by
//! transiently swapping node materials, then composites the packed
//! depth buffer with the previous pipeline stage through a
//! circle-of-confusion shader.
//!
//! ## Features
//!
//! - **Core**: wgpu context management, renderer with explicit clear
//!   state, off-screen render targets
//! - **Scene**: scene graph with drawable nodes and swappable materials
//! - **Postprocessing**: ping-pong effect composer with an ordered pass
//!   chain
//!
//! ## Example
//!
//! ```ignore
//! use fathom::prelude::*;
//!
//! let mut engine = Engine::new(canvas, 1280, 720).await?;
//! let mut scene = Scene::new();
//! let camera = PerspectiveCamera::new(75.0, 16.0 / 9.0, 0.1, 100.0);
//!
//! let mut composer = EffectComposer::new(1280, 720, engine.surface_format());
//! composer.add_pass(Box::new(ScenePass::new()));
//! composer.add_pass(Box::new(BokehPass::new(BokehParams::default())?));
//!
//! engine.render(&mut composer, &mut scene, &camera)?;
//! ```

#![warn(missing_docs)]

#[cfg(feature = "web")]
use wasm_bindgen::prelude::*;

pub mod core;
pub mod math;
pub mod camera;
pub mod geometry;
pub mod material;
pub mod scene;
pub mod postprocessing;

// Re-export commonly used types
pub mod prelude {
    //! Convenient re-exports of commonly used types.

    pub use crate::core::*;
    pub use crate::math::*;
    pub use crate::camera::*;
    pub use crate::geometry::*;
    pub use crate::material::*;
    pub use crate::scene::*;
    pub use crate::postprocessing::*;
}

#[cfg(test)]
pub(crate) mod test_support;

/// Initialize the engine for WASM environments.
/// Sets up panic hooks for better error messages in the browser console.
#[cfg(feature = "web")]
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// Engine version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine name.
pub const NAME: &str = "Fathom";
