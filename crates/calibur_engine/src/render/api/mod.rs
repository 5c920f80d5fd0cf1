//! Public rendering API
//!
//! The backend trait plus the GPU resource interfaces it produces.

pub mod renderer_api;
pub mod resources;

pub use renderer_api::{BackendResult, RendererApi};
pub use resources::{
    Framebuffer, FramebufferSpec, Mesh, TextureArray, TextureArraySpec, TextureFormat,
    UniformBuffer, VertexArray,
};
