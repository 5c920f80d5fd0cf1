//! Draw-command façade
//!
//! `RenderCommand` owns the active [`RendererApi`] and forwards to it. It is
//! an ordinary value owned by the application, not a global. It also keeps
//! the last viewport and depth-test state so passes that retarget rendering
//! (shadow maps) can restore them afterwards.

use super::api::{
    BackendResult, Framebuffer, FramebufferSpec, Mesh, RendererApi, TextureArray,
    TextureArraySpec, UniformBuffer, VertexArray,
};
use crate::foundation::math::Vec4;
use crate::foundation::memory::Ref;

/// Viewport rectangle in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Viewport {
    /// Left edge
    pub x: u32,
    /// Bottom edge
    pub y: u32,
    /// Width
    pub width: u32,
    /// Height
    pub height: u32,
}

impl Viewport {
    /// Viewport anchored at the origin
    pub const fn from_size(width: u32, height: u32) -> Self {
        Self { x: 0, y: 0, width, height }
    }

    /// Width divided by height, 1.0 for a degenerate viewport
    pub fn aspect_ratio(&self) -> f32 {
        if self.height == 0 {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }
}

/// Owning façade over the graphics backend
pub struct RenderCommand {
    api: Box<dyn RendererApi>,
    viewport: Viewport,
    depth_test: bool,
    clear_color: Vec4,
}

impl RenderCommand {
    /// Wrap a backend
    pub fn new(api: Box<dyn RendererApi>) -> Self {
        Self {
            api,
            viewport: Viewport::default(),
            depth_test: false,
            clear_color: Vec4::new(0.0, 0.0, 0.0, 1.0),
        }
    }

    /// One-time pipeline state setup
    pub fn init(&mut self) {
        log::debug!("Initializing renderer backend");
        self.api.init();
    }

    /// Set the viewport and remember it
    pub fn set_viewport(&mut self, x: u32, y: u32, width: u32, height: u32) {
        self.viewport = Viewport { x, y, width, height };
        self.api.set_viewport(x, y, width, height);
    }

    /// Restore a previously captured viewport
    pub fn restore_viewport(&mut self, viewport: Viewport) {
        self.set_viewport(viewport.x, viewport.y, viewport.width, viewport.height);
    }

    /// Last viewport set through this façade
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Set the clear color
    pub fn set_clear_color(&mut self, color: Vec4) {
        self.clear_color = color;
        self.api.set_clear_color(color);
    }

    /// Last clear color set through this façade
    pub fn clear_color(&self) -> Vec4 {
        self.clear_color
    }

    /// Enable or disable depth testing
    pub fn set_depth_test(&mut self, enabled: bool) {
        self.depth_test = enabled;
        self.api.set_depth_test(enabled);
    }

    /// Last depth-test state set through this façade
    pub fn depth_test(&self) -> bool {
        self.depth_test
    }

    /// Clear the bound target
    pub fn clear(&mut self) {
        self.api.clear();
    }

    /// Draw indexed geometry; an `index_count` of 0 draws the whole index buffer
    pub fn draw_indexed(&mut self, vertex_array: &Ref<dyn VertexArray>, index_count: u32) {
        let count = if index_count == 0 {
            vertex_array.index_count()
        } else {
            index_count
        };
        self.api.draw_indexed(vertex_array, count);
    }

    /// Draw one submesh
    pub fn render_mesh(&mut self, mesh: &Ref<dyn Mesh>, submesh_index: u32) {
        self.api.render_mesh(mesh, submesh_index);
    }

    /// Allocate a uniform block
    pub fn create_uniform_buffer(
        &mut self,
        size: usize,
        binding: u32,
    ) -> BackendResult<Ref<dyn UniformBuffer>> {
        self.api.create_uniform_buffer(size, binding)
    }

    /// Allocate a layered texture
    pub fn create_texture_array(
        &mut self,
        spec: &TextureArraySpec,
    ) -> BackendResult<Ref<dyn TextureArray>> {
        self.api.create_texture_array(spec)
    }

    /// Allocate a framebuffer
    pub fn create_framebuffer(
        &mut self,
        spec: &FramebufferSpec,
    ) -> BackendResult<Ref<dyn Framebuffer>> {
        self.api.create_framebuffer(spec)
    }
}
