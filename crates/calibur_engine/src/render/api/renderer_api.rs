//! Backend abstraction trait for the rendering system
//!
//! This module defines the trait that graphics backends implement. The
//! engine never talks to a graphics API directly; everything goes through
//! [`RenderCommand`](crate::render::RenderCommand), which owns one
//! `RendererApi`.

use super::resources::{
    Framebuffer, FramebufferSpec, Mesh, TextureArray, TextureArraySpec, UniformBuffer, VertexArray,
};
use crate::foundation::math::Vec4;
use crate::foundation::memory::Ref;
use crate::render::RenderError;

/// Result type for backend operations
pub type BackendResult<T> = Result<T, RenderError>;

/// Stateless draw-command interface of a graphics backend
pub trait RendererApi {
    /// One-time pipeline state setup
    fn init(&mut self);

    /// Set the viewport rectangle in pixels
    fn set_viewport(&mut self, x: u32, y: u32, width: u32, height: u32);

    /// Set the color used by [`RendererApi::clear`]
    fn set_clear_color(&mut self, color: Vec4);

    /// Enable or disable depth testing
    fn set_depth_test(&mut self, enabled: bool);

    /// Clear the bound target's color and depth
    fn clear(&mut self);

    /// Draw `index_count` indices from `vertex_array`
    fn draw_indexed(&mut self, vertex_array: &Ref<dyn VertexArray>, index_count: u32);

    /// Draw one submesh of `mesh`
    fn render_mesh(&mut self, mesh: &Ref<dyn Mesh>, submesh_index: u32);

    /// Allocate a uniform block of `size` bytes at `binding`
    fn create_uniform_buffer(
        &mut self,
        size: usize,
        binding: u32,
    ) -> BackendResult<Ref<dyn UniformBuffer>>;

    /// Allocate a layered texture
    fn create_texture_array(
        &mut self,
        spec: &TextureArraySpec,
    ) -> BackendResult<Ref<dyn TextureArray>>;

    /// Allocate a framebuffer
    fn create_framebuffer(&mut self, spec: &FramebufferSpec) -> BackendResult<Ref<dyn Framebuffer>>;
}
