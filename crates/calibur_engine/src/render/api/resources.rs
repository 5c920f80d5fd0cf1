//! GPU resource interfaces
//!
//! Backends hand these out as shared [`Ref`](crate::foundation::memory::Ref)
//! handles. Methods take `&self`: the GPU object is shared, and uploads or
//! binds go through the backend's own state.

use std::fmt::Debug;

use crate::foundation::memory::Ref;
use crate::render::RenderError;

/// Uniform block bound at a fixed binding point
pub trait UniformBuffer: Debug {
    /// Binding point the block is attached to
    fn binding(&self) -> u32;

    /// Block size in bytes
    fn size(&self) -> usize;

    /// Replace `data.len()` bytes starting at `offset`
    ///
    /// Writing past the end of the block is an error, never a partial write.
    fn set_data(&self, data: &[u8], offset: usize) -> Result<(), RenderError>;
}

/// Depth formats usable for texture arrays
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureFormat {
    /// 32-bit float depth
    Depth32F,
}

/// Creation parameters for a texture array
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureArraySpec {
    /// Width of every layer
    pub width: u32,
    /// Height of every layer
    pub height: u32,
    /// Number of layers
    pub layers: u32,
    /// Texel format
    pub format: TextureFormat,
}

/// Layered 2D texture, e.g. one slice per shadow cascade
pub trait TextureArray: Debug {
    /// Creation parameters
    fn spec(&self) -> TextureArraySpec;
}

/// Creation parameters for a framebuffer
#[derive(Debug, Clone)]
pub struct FramebufferSpec {
    /// Attachment width
    pub width: u32,
    /// Attachment height
    pub height: u32,
    /// Layered depth attachment; every layer is writable in one pass
    pub depth_array: Option<Ref<dyn TextureArray>>,
    /// Whether a color attachment is created
    pub color_attachment: bool,
}

/// Off-screen render target
pub trait Framebuffer: Debug {
    /// Route subsequent draws into this target
    fn bind(&self);

    /// Route subsequent draws back to the default framebuffer
    fn unbind(&self);

    /// Recreate the attachments at a new size
    fn resize(&self, width: u32, height: u32);

    /// Current creation parameters
    fn spec(&self) -> FramebufferSpec;
}

/// Vertex array with an attached index buffer
pub trait VertexArray: Debug {
    /// Number of indices in the attached index buffer
    fn index_count(&self) -> u32;
}

/// Loaded mesh made of one or more submeshes
pub trait Mesh: Debug {
    /// Debug name
    fn name(&self) -> &str;

    /// Number of submeshes that can be drawn individually
    fn submesh_count(&self) -> u32;
}
