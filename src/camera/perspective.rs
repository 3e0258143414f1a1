//! Perspective camera.

use crate::core::Id;
use glam::{Mat4, Vec3};

/// A perspective projection camera.
///
/// The clip planes and aspect ratio are plain public fields: consumers
/// that need them each frame (the depth-of-field compositor reads
/// `near`/`far`/`aspect` at composite time) read the current values
/// rather than caching them at construction.
pub struct PerspectiveCamera {
    /// Unique ID.
    id: Id,
    /// Field of view in degrees.
    pub fov: f32,
    /// Aspect ratio (width / height).
    pub aspect: f32,
    /// Near clipping plane.
    pub near: f32,
    /// Far clipping plane.
    pub far: f32,
    /// Camera position.
    pub position: Vec3,
    /// Camera target (look-at point).
    pub target: Vec3,
    /// Up vector.
    pub up: Vec3,
    /// View matrix.
    view_matrix: Mat4,
    /// Projection matrix.
    projection_matrix: Mat4,
    /// Combined view-projection matrix.
    view_projection_matrix: Mat4,
}

impl Default for PerspectiveCamera {
    fn default() -> Self {
        Self::new(60.0, 16.0 / 9.0, 0.1, 1000.0)
    }
}

impl PerspectiveCamera {
    /// Create a new perspective camera.
    pub fn new(fov: f32, aspect: f32, near: f32, far: f32) -> Self {
        let mut camera = Self {
            id: Id::new(),
            fov,
            aspect,
            near,
            far,
            position: Vec3::new(0.0, 0.0, 5.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
            view_matrix: Mat4::IDENTITY,
            projection_matrix: Mat4::IDENTITY,
            view_projection_matrix: Mat4::IDENTITY,
        };
        camera.update_matrices();
        camera
    }

    /// Get the unique ID.
    #[inline]
    pub fn id(&self) -> Id {
        self.id
    }

    /// Set the aspect ratio and rebuild the projection.
    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
        self.update_matrices();
    }

    /// Position the camera and look at a target.
    pub fn look_at(&mut self, position: Vec3, target: Vec3) {
        self.position = position;
        self.target = target;
        self.update_matrices();
    }

    /// Recompute view, projection, and combined matrices from the
    /// current public fields.
    pub fn update_matrices(&mut self) {
        self.view_matrix = Mat4::look_at_rh(self.position, self.target, self.up);
        self.projection_matrix =
            Mat4::perspective_rh(self.fov.to_radians(), self.aspect, self.near, self.far);
        self.view_projection_matrix = self.projection_matrix * self.view_matrix;
    }

    /// Get the view matrix.
    #[inline]
    pub fn view_matrix(&self) -> Mat4 {
        self.view_matrix
    }

    /// Get the projection matrix.
    #[inline]
    pub fn projection_matrix(&self) -> Mat4 {
        self.projection_matrix
    }

    /// Get the combined view-projection matrix.
    #[inline]
    pub fn view_projection_matrix(&self) -> Mat4 {
        self.view_projection_matrix
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_aspect_rebuilds_projection() {
        let mut camera = PerspectiveCamera::new(60.0, 1.0, 0.1, 100.0);
        let before = camera.projection_matrix();
        camera.set_aspect(2.0);
        assert_ne!(before, camera.projection_matrix());
        assert_eq!(camera.aspect, 2.0);
    }

    #[test]
    fn test_view_projection_composition() {
        let mut camera = PerspectiveCamera::new(75.0, 16.0 / 9.0, 0.5, 50.0);
        camera.look_at(Vec3::new(0.0, 2.0, 10.0), Vec3::ZERO);
        let expected = camera.projection_matrix() * camera.view_matrix();
        assert_eq!(camera.view_projection_matrix(), expected);
    }
}
