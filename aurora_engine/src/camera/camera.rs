/// Camera - low-level passive data container.
///
/// The Camera computes nothing beyond the uniform block it hands to the
/// frame. The caller (game engine) is responsible for computing and setting
/// the view and projection matrices.

use glam::{Mat4, Vec3};

use crate::render_system::CameraUniform;

/// Low-level camera. A passive data container.
#[derive(Debug, Clone)]
pub struct Camera {
    view_matrix: Mat4,
    projection_matrix: Mat4,
    position: Vec3,
}

impl Camera {
    /// Create a new camera with the given parameters.
    pub fn new(view: Mat4, projection: Mat4, position: Vec3) -> Self {
        Self {
            view_matrix: view,
            projection_matrix: projection,
            position,
        }
    }

    /// Right-handed perspective camera looking from `eye` at `target`
    ///
    /// Uses a zero-to-one depth range and flips Y for Vulkan clip space.
    pub fn look_at(eye: Vec3, target: Vec3, fov_y: f32, aspect: f32, near: f32, far: f32) -> Self {
        let view = Mat4::look_at_rh(eye, target, Vec3::Y);
        let mut projection = Mat4::perspective_rh(fov_y, aspect, near, far);
        projection.y_axis.y *= -1.0;
        Self::new(view, projection, eye)
    }

    // ===== GETTERS =====

    /// View matrix (inverse of the camera's world transform).
    pub fn view_matrix(&self) -> &Mat4 {
        &self.view_matrix
    }

    /// Projection matrix (perspective or orthographic).
    pub fn projection_matrix(&self) -> &Mat4 {
        &self.projection_matrix
    }

    /// Combined view-projection matrix (projection * view).
    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix * self.view_matrix
    }

    /// World-space position.
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Uniform block uploaded into the global descriptor set
    pub fn uniform(&self) -> CameraUniform {
        CameraUniform {
            view: self.view_matrix,
            projection: self.projection_matrix,
            view_projection: self.view_projection_matrix(),
            position: self.position.extend(1.0),
        }
    }

    // ===== SETTERS (store, compute nothing) =====

    /// Set the view matrix.
    pub fn set_view(&mut self, matrix: Mat4) {
        self.view_matrix = matrix;
    }

    /// Set the projection matrix.
    pub fn set_projection(&mut self, matrix: Mat4) {
        self.projection_matrix = matrix;
    }

    /// Set the world-space position.
    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }
}

#[cfg(test)]
#[path = "camera_tests.rs"]
mod tests;
