//! Built-in post-processing passes.

mod bokeh_pass;
mod scene_pass;

pub use bokeh_pass::{BokehParams, BokehPass};
pub use scene_pass::ScenePass;
