//! Uniform block layouts and binding points shared with shaders

// bytemuck's Pod derive expands to unsafe impls
#![allow(unsafe_code)]

use bytemuck::{Pod, Zeroable};

use crate::foundation::math::{pack_vec4, to_gpu, GpuMat4, Mat4};
use crate::render::camera::SceneRenderCamera;
use crate::render::shadow::MAX_CASCADES;

/// Binding points of the scene renderer's uniform blocks
pub mod bindings {
    /// [`CameraUniformData`](super::CameraUniformData)
    pub const CAMERA: u32 = 0;
    /// [`TransformUniformData`](super::TransformUniformData)
    pub const TRANSFORM: u32 = 1;
    /// [`LightMatricesUniformData`](super::LightMatricesUniformData)
    pub const LIGHT_MATRICES: u32 = 2;
    /// Directional light block
    pub const DIRECTIONAL_LIGHTS: u32 = 3;
    /// Point light block
    pub const POINT_LIGHTS: u32 = 4;
}

/// Per-frame camera block
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct CameraUniformData {
    /// Projection times view
    pub view_projection: GpuMat4,
    /// View matrix
    pub view: GpuMat4,
    /// xyz = eye position
    pub position: [f32; 4],
    /// near, far, fov, aspect
    pub clip: [f32; 4],
}

impl Default for CameraUniformData {
    fn default() -> Self {
        Self::zeroed()
    }
}

impl From<&SceneRenderCamera> for CameraUniformData {
    fn from(camera: &SceneRenderCamera) -> Self {
        Self {
            view_projection: to_gpu(&camera.view_projection()),
            view: to_gpu(&camera.view_matrix),
            position: pack_vec4(&camera.position, 1.0),
            clip: [camera.near, camera.far, camera.fov, camera.aspect_ratio],
        }
    }
}

/// Model matrix of the mesh being drawn
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct TransformUniformData {
    /// Model-to-world transform
    pub model: GpuMat4,
}

impl From<&Mat4> for TransformUniformData {
    fn from(model: &Mat4) -> Self {
        Self { model: to_gpu(model) }
    }
}

/// Cascade matrices and split distances of the directional shadow map
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct LightMatricesUniformData {
    /// Light view-projection per cascade
    pub matrices: [GpuMat4; MAX_CASCADES],
    /// Far distance of each cascade in view space
    pub cascade_splits: [f32; MAX_CASCADES],
    /// Cascades in use
    pub cascade_count: u32,
    /// std140 padding
    pub _padding: [u32; 3],
}

impl Default for LightMatricesUniformData {
    fn default() -> Self {
        Self::zeroed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_sizes_are_std140_friendly() {
        assert_eq!(std::mem::size_of::<CameraUniformData>(), 160);
        assert_eq!(std::mem::size_of::<TransformUniformData>(), 64);
        assert_eq!(std::mem::size_of::<LightMatricesUniformData>(), 4 * 64 + 16 + 16);
        assert_eq!(std::mem::size_of::<LightMatricesUniformData>() % 16, 0);
    }
}
