//! # Geometry Module
//!
//! Vertex layout and GPU geometry buffers.

mod buffer_geometry;
mod vertex;

pub use buffer_geometry::BufferGeometry;
pub use vertex::Vertex;
