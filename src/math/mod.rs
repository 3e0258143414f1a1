//! # Math Module
//!
//! Color type plus re-exports of the glam linear-algebra types used
//! throughout the engine.

mod color;

pub use color::Color;

pub use glam::{Mat4, Quat, Vec2, Vec3, Vec4};
