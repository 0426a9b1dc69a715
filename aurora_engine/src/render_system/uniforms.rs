/// Standard uniform blocks of the global, material and entity sets
///
/// All blocks are `#[repr(C)]` and `Pod`, laid out for std140 without
/// implicit padding (only `Mat4` and `Vec4` members).

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec4};

/// Global set (set 0), binding 0
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct CameraUniform {
    pub view: Mat4,
    pub projection: Mat4,
    pub view_projection: Mat4,
    /// World-space position (w = 1)
    pub position: Vec4,
}

/// Material set (set 1), binding 0
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct MaterialUniform {
    pub base_color: Vec4,
    /// x = metallic, y = roughness, z = emissive strength, w = unused
    pub params: Vec4,
}

impl MaterialUniform {
    pub fn new(base_color: Vec4, metallic: f32, roughness: f32) -> Self {
        Self {
            base_color,
            params: Vec4::new(metallic, roughness, 0.0, 0.0),
        }
    }
}

impl Default for MaterialUniform {
    fn default() -> Self {
        Self::new(Vec4::ONE, 0.0, 1.0)
    }
}

/// Entity set (set 2), binding 0
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct EntityUniform {
    pub model: Mat4,
    /// Inverse transpose of `model`, for normals
    pub normal: Mat4,
}

impl EntityUniform {
    pub fn from_model(model: Mat4) -> Self {
        Self {
            model,
            normal: model.inverse().transpose(),
        }
    }
}

impl Default for EntityUniform {
    fn default() -> Self {
        Self::from_model(Mat4::IDENTITY)
    }
}

#[cfg(test)]
#[path = "uniforms_tests.rs"]
mod tests;
