//! Rendering system
//!
//! Backend-agnostic pieces of the renderer:
//!
//! - [`api`]: the [`RendererApi`] backend trait and GPU resource interfaces
//! - [`RenderCommand`]: the owning draw-command façade
//! - [`camera`], [`lighting`], [`shadow`], [`uniforms`]: per-frame data the
//!   scene renderer feeds into uniform blocks
//! - [`headless`]: a recording backend for tests and headless runs

pub mod api;
pub mod camera;
pub mod headless;
pub mod lighting;
pub mod render_command;
pub mod shadow;
pub mod uniforms;

pub use api::{
    BackendResult, Framebuffer, FramebufferSpec, Mesh, RendererApi, TextureArray,
    TextureArraySpec, TextureFormat, UniformBuffer, VertexArray,
};
pub use camera::{Camera, SceneRenderCamera};
pub use headless::{HeadlessMesh, HeadlessProbe, HeadlessRendererApi, RecordedCommand};
pub use lighting::{
    DirectionalLight, DirectionalLightBlock, LightKind, PointLight, PointLightBlock,
    SceneLightData, MAX_DIRECTIONAL_LIGHTS, MAX_POINT_LIGHTS,
};
pub use render_command::{RenderCommand, Viewport};

use thiserror::Error;

/// Rendering errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    /// Upload would write past the end of a uniform block
    #[error("Upload of {len} bytes at offset {offset} overflows binding {binding} ({size} bytes)")]
    UniformOverflow {
        /// Binding point
        binding: u32,
        /// Requested offset
        offset: usize,
        /// Requested length
        len: usize,
        /// Block size
        size: usize,
    },

    /// Backend refused to create a resource
    #[error("Resource creation failed: {0}")]
    ResourceCreation(String),

    /// Framebuffer attachments are inconsistent
    #[error("Invalid framebuffer: {0}")]
    InvalidFramebuffer(String),
}
