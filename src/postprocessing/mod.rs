//! # Postprocessing Module
//!
//! Full-screen pass chain: an effect composer feeding each pass's
//! output into the next through two ping-pong render targets.

mod effect_composer;
pub mod effects;
mod material_swap;
mod pass;

pub use effect_composer::EffectComposer;
pub use effects::{BokehParams, BokehPass, ScenePass};
pub use material_swap::MaterialSwap;
pub use pass::{FrameContext, FullscreenVertex, Pass, FULLSCREEN_QUAD_VERTICES};

use thiserror::Error;

/// Errors raised while constructing a post-processing pass.
#[derive(Error, Debug)]
pub enum PassError {
    /// The pass's shader artifact is missing or empty.
    #[error("{pass} pass is missing its shader artifact")]
    MissingShader {
        /// Name of the pass.
        pass: &'static str,
    },

    /// The shader artifact lacks a required entry point.
    #[error("{pass} pass shader has no `{entry_point}` entry point")]
    MissingEntryPoint {
        /// Name of the pass.
        pass: &'static str,
        /// The absent entry point.
        entry_point: &'static str,
    },
}
