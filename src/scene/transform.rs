//! Local and world transforms for scene objects.

use glam::{Mat4, Quat, Vec3};

/// Transform component: position, rotation, scale, and cached matrices.
#[derive(Debug, Clone)]
pub struct Transform {
    /// Local position.
    pub position: Vec3,
    /// Local rotation.
    pub rotation: Quat,
    /// Local scale.
    pub scale: Vec3,
    /// Cached local matrix.
    local_matrix: Mat4,
    /// Cached world matrix.
    world_matrix: Mat4,
    /// Whether the local matrix is stale.
    dirty: bool,
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}

impl Transform {
    /// Create an identity transform.
    pub fn new() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
            local_matrix: Mat4::IDENTITY,
            world_matrix: Mat4::IDENTITY,
            dirty: false,
        }
    }

    /// Set the local position.
    pub fn set_position(&mut self, x: f32, y: f32, z: f32) {
        self.position = Vec3::new(x, y, z);
        self.dirty = true;
    }

    /// Set the local rotation.
    pub fn set_rotation(&mut self, rotation: Quat) {
        self.rotation = rotation;
        self.dirty = true;
    }

    /// Set the local scale.
    pub fn set_scale(&mut self, x: f32, y: f32, z: f32) {
        self.scale = Vec3::new(x, y, z);
        self.dirty = true;
    }

    /// Mark the cached local matrix stale.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Rebuild the local matrix if stale.
    pub fn update_local_matrix(&mut self) {
        if self.dirty {
            self.local_matrix =
                Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position);
            self.dirty = false;
        }
    }

    /// Rebuild the world matrix from an optional parent world matrix.
    pub fn update_world_matrix(&mut self, parent_world: Option<&Mat4>) {
        self.update_local_matrix();
        self.world_matrix = match parent_world {
            Some(parent) => *parent * self.local_matrix,
            None => self.local_matrix,
        };
    }

    /// Get the cached local matrix.
    #[inline]
    pub fn local_matrix(&self) -> &Mat4 {
        &self.local_matrix
    }

    /// Get the cached world matrix.
    #[inline]
    pub fn world_matrix(&self) -> &Mat4 {
        &self.world_matrix
    }
}
