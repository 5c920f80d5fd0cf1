//! Recording backend
//!
//! `HeadlessRendererApi` implements [`RendererApi`] without a GPU. Every
//! command, upload and bind is appended to a shared log, and uniform
//! buffers keep their bytes in memory. Tests inspect both through a
//! [`HeadlessProbe`]; the sandbox uses the backend for headless runs.
//!
//! Long-running hosts that never read the log should build the backend with
//! [`HeadlessRendererApi::without_recording`]: commands are then counted but
//! not stored.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use super::api::{
    BackendResult, Framebuffer, FramebufferSpec, Mesh, RendererApi, TextureArray,
    TextureArraySpec, UniformBuffer, VertexArray,
};
use super::render_command::Viewport;
use super::RenderError;
use crate::foundation::math::Vec4;
use crate::foundation::memory::Ref;

/// One entry of the command log
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCommand {
    /// Backend initialised
    Init,
    /// Viewport changed
    SetViewport(Viewport),
    /// Clear color changed
    SetClearColor([f32; 4]),
    /// Depth test toggled
    SetDepthTest(bool),
    /// Bound target cleared
    Clear,
    /// Indexed draw
    DrawIndexed {
        /// Indices drawn
        index_count: u32,
    },
    /// Submesh draw
    RenderMesh {
        /// Mesh debug name
        mesh: String,
        /// Submesh drawn
        submesh: u32,
    },
    /// Uniform block written
    UploadUniform {
        /// Binding point
        binding: u32,
        /// Byte offset
        offset: usize,
        /// Bytes written
        len: usize,
    },
    /// Framebuffer bound
    BindFramebuffer(u64),
    /// Default framebuffer restored
    UnbindFramebuffer(u64),
    /// Framebuffer attachments recreated
    ResizeFramebuffer {
        /// Framebuffer id
        id: u64,
        /// New width
        width: u32,
        /// New height
        height: u32,
    },
}

#[derive(Debug)]
struct CommandLog {
    entries: RefCell<Vec<RecordedCommand>>,
    recording: Cell<bool>,
    total: Cell<u64>,
}

impl CommandLog {
    fn new(recording: bool) -> Rc<Self> {
        Rc::new(Self {
            entries: RefCell::new(Vec::new()),
            recording: Cell::new(recording),
            total: Cell::new(0),
        })
    }

    fn push(&self, command: RecordedCommand) {
        log::trace!("headless: {command:?}");
        self.total.set(self.total.get() + 1);
        if self.recording.get() {
            self.entries.borrow_mut().push(command);
        }
    }
}

type UniformRegistry = Rc<RefCell<HashMap<u32, Ref<HeadlessUniformBuffer>>>>;

/// Read access to what a [`HeadlessRendererApi`] recorded
#[derive(Clone)]
pub struct HeadlessProbe {
    log: Rc<CommandLog>,
    uniforms: UniformRegistry,
}

impl HeadlessProbe {
    /// Snapshot of the command log
    pub fn commands(&self) -> Vec<RecordedCommand> {
        self.log.entries.borrow().clone()
    }

    /// Number of entries currently held in the log
    pub fn command_len(&self) -> usize {
        self.log.entries.borrow().len()
    }

    /// Commands issued since creation, stored or not
    pub fn total_commands(&self) -> u64 {
        self.log.total.get()
    }

    /// Whether new commands are stored
    pub fn is_recording(&self) -> bool {
        self.log.recording.get()
    }

    /// Start or stop storing commands; counting continues either way
    pub fn set_recording(&self, recording: bool) {
        self.log.recording.set(recording);
    }

    /// Forget everything recorded so far
    pub fn clear(&self) {
        self.log.entries.borrow_mut().clear();
    }

    /// Contents of the most recent uniform buffer created at `binding`
    pub fn uniform_data(&self, binding: u32) -> Option<Vec<u8>> {
        self.uniforms
            .borrow()
            .get(&binding)
            .map(|buffer| buffer.contents())
    }

    /// Number of uploads recorded for `binding`
    pub fn upload_count(&self, binding: u32) -> usize {
        self.log
            .entries
            .borrow()
            .iter()
            .filter(|command| match command {
                RecordedCommand::UploadUniform { binding: b, .. } => *b == binding,
                _ => false,
            })
            .count()
    }
}

/// GPU-less backend that records instead of drawing
pub struct HeadlessRendererApi {
    log: Rc<CommandLog>,
    uniforms: UniformRegistry,
    next_id: u64,
}

impl Default for HeadlessRendererApi {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessRendererApi {
    /// Create an empty recorder
    pub fn new() -> Self {
        Self::with_log(CommandLog::new(true))
    }

    /// Backend that counts commands without storing them
    pub fn without_recording() -> Self {
        Self::with_log(CommandLog::new(false))
    }

    fn with_log(log: Rc<CommandLog>) -> Self {
        Self {
            log,
            uniforms: Rc::new(RefCell::new(HashMap::new())),
            next_id: 1,
        }
    }

    /// Probe that stays valid after the backend is moved into a `RenderCommand`
    pub fn probe(&self) -> HeadlessProbe {
        HeadlessProbe {
            log: Rc::clone(&self.log),
            uniforms: Rc::clone(&self.uniforms),
        }
    }

    fn record(&self, command: RecordedCommand) {
        self.log.push(command);
    }

    fn allocate_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

impl RendererApi for HeadlessRendererApi {
    fn init(&mut self) {
        self.record(RecordedCommand::Init);
    }

    fn set_viewport(&mut self, x: u32, y: u32, width: u32, height: u32) {
        self.record(RecordedCommand::SetViewport(Viewport { x, y, width, height }));
    }

    fn set_clear_color(&mut self, color: Vec4) {
        self.record(RecordedCommand::SetClearColor([color.x, color.y, color.z, color.w]));
    }

    fn set_depth_test(&mut self, enabled: bool) {
        self.record(RecordedCommand::SetDepthTest(enabled));
    }

    fn clear(&mut self) {
        self.record(RecordedCommand::Clear);
    }

    fn draw_indexed(&mut self, _vertex_array: &Ref<dyn VertexArray>, index_count: u32) {
        self.record(RecordedCommand::DrawIndexed { index_count });
    }

    fn render_mesh(&mut self, mesh: &Ref<dyn Mesh>, submesh_index: u32) {
        self.record(RecordedCommand::RenderMesh {
            mesh: mesh.name().to_string(),
            submesh: submesh_index,
        });
    }

    fn create_uniform_buffer(
        &mut self,
        size: usize,
        binding: u32,
    ) -> BackendResult<Ref<dyn UniformBuffer>> {
        if size == 0 {
            return Err(RenderError::ResourceCreation(format!(
                "uniform buffer at binding {binding} has zero size"
            )));
        }
        let buffer = Rc::new(HeadlessUniformBuffer {
            binding,
            data: RefCell::new(vec![0; size]),
            log: Rc::clone(&self.log),
        });
        self.uniforms.borrow_mut().insert(binding, Rc::clone(&buffer));
        Ok(buffer)
    }

    fn create_texture_array(
        &mut self,
        spec: &TextureArraySpec,
    ) -> BackendResult<Ref<dyn TextureArray>> {
        if spec.width == 0 || spec.height == 0 || spec.layers == 0 {
            return Err(RenderError::ResourceCreation(format!(
                "texture array {}x{}x{} has an empty dimension",
                spec.width, spec.height, spec.layers
            )));
        }
        Ok(Rc::new(HeadlessTextureArray { spec: *spec }))
    }

    fn create_framebuffer(
        &mut self,
        spec: &FramebufferSpec,
    ) -> BackendResult<Ref<dyn Framebuffer>> {
        if let Some(depth) = &spec.depth_array {
            let depth_spec = depth.spec();
            if depth_spec.width != spec.width || depth_spec.height != spec.height {
                return Err(RenderError::InvalidFramebuffer(format!(
                    "depth array is {}x{} but framebuffer is {}x{}",
                    depth_spec.width, depth_spec.height, spec.width, spec.height
                )));
            }
        }
        let id = self.allocate_id();
        Ok(Rc::new(HeadlessFramebuffer {
            id,
            spec: RefCell::new(spec.clone()),
            log: Rc::clone(&self.log),
        }))
    }
}

/// In-memory uniform block
#[derive(Debug)]
pub struct HeadlessUniformBuffer {
    binding: u32,
    data: RefCell<Vec<u8>>,
    log: Rc<CommandLog>,
}

impl HeadlessUniformBuffer {
    /// Copy of the current block contents
    pub fn contents(&self) -> Vec<u8> {
        self.data.borrow().clone()
    }
}

impl UniformBuffer for HeadlessUniformBuffer {
    fn binding(&self) -> u32 {
        self.binding
    }

    fn size(&self) -> usize {
        self.data.borrow().len()
    }

    fn set_data(&self, data: &[u8], offset: usize) -> Result<(), RenderError> {
        let mut block = self.data.borrow_mut();
        let end = offset.checked_add(data.len()).filter(|end| *end <= block.len());
        let Some(end) = end else {
            return Err(RenderError::UniformOverflow {
                binding: self.binding,
                offset,
                len: data.len(),
                size: block.len(),
            });
        };
        block[offset..end].copy_from_slice(data);
        self.log.push(RecordedCommand::UploadUniform {
            binding: self.binding,
            offset,
            len: data.len(),
        });
        Ok(())
    }
}

/// Texture array that only remembers its spec
#[derive(Debug)]
pub struct HeadlessTextureArray {
    spec: TextureArraySpec,
}

impl TextureArray for HeadlessTextureArray {
    fn spec(&self) -> TextureArraySpec {
        self.spec
    }
}

/// Framebuffer that logs binds
#[derive(Debug)]
pub struct HeadlessFramebuffer {
    id: u64,
    spec: RefCell<FramebufferSpec>,
    log: Rc<CommandLog>,
}

impl HeadlessFramebuffer {
    /// Identifier used in the command log
    pub fn id(&self) -> u64 {
        self.id
    }
}

impl Framebuffer for HeadlessFramebuffer {
    fn bind(&self) {
        self.log.push(RecordedCommand::BindFramebuffer(self.id));
    }

    fn unbind(&self) {
        self.log.push(RecordedCommand::UnbindFramebuffer(self.id));
    }

    fn resize(&self, width: u32, height: u32) {
        {
            let mut spec = self.spec.borrow_mut();
            spec.width = width;
            spec.height = height;
        }
        self.log.push(RecordedCommand::ResizeFramebuffer {
            id: self.id,
            width,
            height,
        });
    }

    fn spec(&self) -> FramebufferSpec {
        self.spec.borrow().clone()
    }
}

/// Vertex array with a fixed index count
#[derive(Debug)]
pub struct HeadlessVertexArray {
    index_count: u32,
}

impl HeadlessVertexArray {
    /// Create a vertex array reporting `index_count` indices
    pub fn new(index_count: u32) -> Self {
        Self { index_count }
    }
}

impl VertexArray for HeadlessVertexArray {
    fn index_count(&self) -> u32 {
        self.index_count
    }
}

/// Named mesh with a fixed number of submeshes
#[derive(Debug)]
pub struct HeadlessMesh {
    name: String,
    submeshes: u32,
}

impl HeadlessMesh {
    /// Create a mesh
    pub fn new(name: impl Into<String>, submeshes: u32) -> Self {
        Self {
            name: name.into(),
            submeshes,
        }
    }
}

impl Mesh for HeadlessMesh {
    fn name(&self) -> &str {
        &self.name
    }

    fn submesh_count(&self) -> u32 {
        self.submeshes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::api::TextureFormat;

    #[test]
    fn test_uniform_upload_is_bounds_checked() {
        let mut api = HeadlessRendererApi::new();
        let probe = api.probe();
        let buffer = api.create_uniform_buffer(8, 3).unwrap();

        buffer.set_data(&[1, 2, 3, 4], 4).unwrap();
        assert_eq!(probe.uniform_data(3).unwrap(), vec![0, 0, 0, 0, 1, 2, 3, 4]);

        let err = buffer.set_data(&[9; 4], 6).unwrap_err();
        assert!(matches!(
            err,
            RenderError::UniformOverflow { binding: 3, offset: 6, len: 4, size: 8 }
        ));
        assert_eq!(probe.upload_count(3), 1);
    }

    #[test]
    fn test_framebuffer_rejects_mismatched_depth_array() {
        let mut api = HeadlessRendererApi::new();
        let depth = api
            .create_texture_array(&TextureArraySpec {
                width: 512,
                height: 512,
                layers: 2,
                format: TextureFormat::Depth32F,
            })
            .unwrap();
        let result = api.create_framebuffer(&FramebufferSpec {
            width: 1024,
            height: 1024,
            depth_array: Some(depth),
            color_attachment: false,
        });
        assert!(matches!(result, Err(RenderError::InvalidFramebuffer(_))));
    }

    #[test]
    fn test_framebuffer_binds_are_logged() {
        let mut api = HeadlessRendererApi::new();
        let probe = api.probe();
        let framebuffer = api
            .create_framebuffer(&FramebufferSpec {
                width: 64,
                height: 64,
                depth_array: None,
                color_attachment: true,
            })
            .unwrap();
        framebuffer.bind();
        framebuffer.resize(32, 32);
        framebuffer.unbind();

        assert_eq!(framebuffer.spec().width, 32);
        assert_eq!(
            probe.commands(),
            vec![
                RecordedCommand::BindFramebuffer(1),
                RecordedCommand::ResizeFramebuffer { id: 1, width: 32, height: 32 },
                RecordedCommand::UnbindFramebuffer(1),
            ]
        );
    }

    #[test]
    fn test_disabled_recording_keeps_log_bounded() {
        let mut api = HeadlessRendererApi::without_recording();
        let probe = api.probe();
        let buffer = api.create_uniform_buffer(16, 0).unwrap();
        let mesh: Ref<dyn Mesh> = Rc::new(HeadlessMesh::new("cube", 2));

        for _ in 0..1000 {
            api.clear();
            api.render_mesh(&mesh, 0);
            buffer.set_data(&[7; 16], 0).unwrap();
        }

        assert!(!probe.is_recording());
        assert_eq!(probe.command_len(), 0);
        assert_eq!(probe.total_commands(), 3000);
        assert_eq!(probe.uniform_data(0).unwrap(), vec![7; 16]);

        probe.set_recording(true);
        api.clear();
        assert_eq!(probe.commands(), vec![RecordedCommand::Clear]);
        assert_eq!(probe.total_commands(), 3001);
    }
}
