//! # Scene Module
//!
//! Scene graph with hierarchical transforms and drawable nodes.

mod object3d;
mod scene;
mod transform;

pub use object3d::{Drawable, Object3D, ObjectHandle};
pub use scene::{DrawItem, Scene};
pub use transform::Transform;
