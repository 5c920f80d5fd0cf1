//! Platform window abstraction
//!
//! The application only talks to a [`Window`]: once per frame it polls the
//! pending events and, after rendering, swaps the back buffer. Two
//! implementations ship with the engine:
//!
//! - [`GlfwWindow`]: a desktop window backed by GLFW
//! - [`HeadlessWindow`]: no OS window; events are scripted per frame, which
//!   is what tests and CI runs use

mod glfw_window;
mod headless;

pub use glfw_window::GlfwWindow;
pub use headless::{HeadlessWindow, HeadlessWindowHandle};

use thiserror::Error;

use crate::events::Event;

/// Desktop window as seen by the application loop
///
/// All calls happen on the main thread, so implementations are not required
/// to be `Send`.
pub trait Window {
    /// Collect the events that arrived since the last call, in arrival order
    fn poll_events(&mut self) -> Vec<Event>;

    /// Present the back buffer
    fn swap_buffers(&mut self);

    /// Current client area size in pixels
    fn size(&self) -> (u32, u32);

    /// Window title
    fn title(&self) -> &str;

    /// Enable or disable vertical sync
    fn set_vsync(&mut self, enabled: bool);

    /// Whether vertical sync is enabled
    fn is_vsync(&self) -> bool;
}

/// Window management errors
///
/// These are fatal: the application cannot start without a window.
#[derive(Error, Debug)]
pub enum WindowError {
    /// The windowing library failed to start
    #[error("GLFW initialization failed: {0}")]
    InitializationFailed(String),

    /// The OS refused to create the window or its context
    #[error("Window creation failed for '{title}' ({width}x{height})")]
    CreationFailed {
        /// Requested title
        title: String,
        /// Requested width
        width: u32,
        /// Requested height
        height: u32,
    },
}

/// Result type for window operations
pub type WindowResult<T> = Result<T, WindowError>;
