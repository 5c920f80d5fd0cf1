//! Layer trait and the per-frame context handed to layer hooks

use thiserror::Error;

use crate::events::Event;
use crate::foundation::time::TimeStep;
use crate::render::RenderCommand;
use crate::scene::SceneRendererError;

/// Errors a layer hook may return
///
/// Any error returned from `on_update` or `on_render` stops the frame loop.
#[derive(Error, Debug)]
pub enum LayerError {
    /// Scene renderer failure
    #[error(transparent)]
    SceneRenderer(#[from] SceneRendererError),

    /// Layer-specific failure
    #[error("{0}")]
    Custom(String),
}

/// Result type for layer hooks
pub type LayerResult = Result<(), LayerError>;

/// What a layer can reach while its hooks run
pub struct FrameContext<'a> {
    /// Draw-command façade
    pub commands: &'a mut RenderCommand,
    /// Current window size in pixels
    pub window_size: (u32, u32),
    /// Frames completed before this one
    pub frame_index: u64,
    close_requested: bool,
}

impl<'a> FrameContext<'a> {
    /// Create a context for one hook invocation round
    pub fn new(commands: &'a mut RenderCommand, window_size: (u32, u32), frame_index: u64) -> Self {
        Self {
            commands,
            window_size,
            frame_index,
            close_requested: false,
        }
    }

    /// Ask the application to stop after the current frame
    pub fn request_close(&mut self) {
        self.close_requested = true;
    }

    /// Whether a hook asked the application to stop
    pub fn close_requested(&self) -> bool {
        self.close_requested
    }

    /// Window width over height, 1.0 while minimized
    pub fn aspect_ratio(&self) -> f32 {
        let (width, height) = self.window_size;
        if width == 0 || height == 0 {
            1.0
        } else {
            width as f32 / height as f32
        }
    }
}

/// Unit of update, render and event handling owned by a
/// [`LayerStack`](super::LayerStack)
///
/// Every hook has a default no-op implementation.
pub trait Layer {
    /// Debug name
    fn name(&self) -> &str;

    /// Called once before the layer joins the stack
    fn on_attach(&mut self, _ctx: &mut FrameContext<'_>) -> LayerResult {
        Ok(())
    }

    /// Called once when the layer leaves the stack
    fn on_detach(&mut self) {}

    /// Per-frame logic; skipped while the window is minimized
    fn on_update(&mut self, _ctx: &mut FrameContext<'_>, _ts: TimeStep) -> LayerResult {
        Ok(())
    }

    /// Per-frame drawing and debug UI
    fn on_render(&mut self, _ctx: &mut FrameContext<'_>) -> LayerResult {
        Ok(())
    }

    /// Handle an event; set `event.handled` to stop propagation
    fn on_event(&mut self, _event: &mut Event) {}
}
