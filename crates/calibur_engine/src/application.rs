//! Application context and frame loop
//!
//! [`Application`] owns the window, the draw-command façade and the layer
//! stack. It is an explicit value created by the client, not a global.
//!
//! Each frame:
//!
//! ```text
//! PollEvents ──▶ UpdateLayers ──▶ RenderLayers ──▶ SwapBuffers
//!                (skipped while minimized)
//! ```
//!
//! Every polled event goes to [`Application::on_event`] first and then to the
//! layers, top-down, until one consumes it. A consumed window-close (or a
//! layer calling [`FrameContext::request_close`]) lets the current frame
//! finish; the loop stops before the next one starts.

use thiserror::Error;

use crate::config::ConfigError;
use crate::core::config::ApplicationConfig;
use crate::events::{Event, EventDispatcher, WindowCloseEvent, WindowResizeEvent};
use crate::foundation::logging;
use crate::foundation::math::Vec4;
use crate::foundation::time::FrameTimer;
use crate::layers::{FrameContext, Layer, LayerError, LayerId, LayerStack, LayerStackError};
use crate::render::{HeadlessProbe, HeadlessRendererApi, RenderCommand, RendererApi};
use crate::window::{GlfwWindow, HeadlessWindow, HeadlessWindowHandle, Window, WindowError};

/// Application-level errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Window could not be created
    #[error("Window error: {0}")]
    Window(#[from] WindowError),

    /// Configuration could not be loaded or is invalid
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A layer hook failed
    #[error("Layer '{name}' failed: {source}")]
    Layer {
        /// Debug name of the failing layer
        name: String,
        /// Error returned by the hook
        source: LayerError,
    },

    /// Layer stack misuse
    #[error(transparent)]
    LayerStack(#[from] LayerStackError),

    /// Custom application error
    #[error("Application error: {0}")]
    Custom(String),
}

/// Main loop state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    /// Updating and rendering every frame
    Running,
    /// Window has zero area; rendering continues, updates are suspended
    Minimized,
    /// The loop has been asked to exit
    Stopped,
}

/// Window, renderer and layers of a running program
pub struct Application {
    // Declared first so layers detach before the window and backend go away
    layer_stack: LayerStack,
    window: Box<dyn Window>,
    commands: RenderCommand,
    timer: FrameTimer,
    running: bool,
    minimized: bool,
    frame_index: u64,
    config: ApplicationConfig,
}

impl Application {
    /// Create an application from an existing window and backend
    pub fn new(
        config: ApplicationConfig,
        window: Box<dyn Window>,
        api: Box<dyn RendererApi>,
    ) -> Result<Self, AppError> {
        config.validate()?;
        logging::init(config.log_filter());
        log::info!("Initializing application '{}'", window.title());

        let mut commands = RenderCommand::new(api);
        commands.init();
        let [r, g, b, a] = config.renderer.clear_color;
        commands.set_clear_color(Vec4::new(r, g, b, a));
        commands.set_depth_test(config.renderer.depth_test);

        let (width, height) = window.size();
        commands.set_viewport(0, 0, width, height);

        let mut window = window;
        window.set_vsync(config.window.vsync);

        Ok(Self {
            layer_stack: LayerStack::new(),
            window,
            commands,
            timer: FrameTimer::new(),
            running: true,
            minimized: width == 0 || height == 0,
            frame_index: 0,
            config,
        })
    }

    /// Create an application with a GLFW window
    pub fn with_glfw(
        config: ApplicationConfig,
        api: Box<dyn RendererApi>,
    ) -> Result<Self, AppError> {
        let window = GlfwWindow::new(&config.window)?;
        Self::new(config, Box::new(window), api)
    }

    /// Create an application with a scripted window and the recording backend
    ///
    /// The returned handle scripts events; the probe reads what was drawn.
    pub fn headless(
        config: ApplicationConfig,
    ) -> Result<(Self, HeadlessWindowHandle, HeadlessProbe), AppError> {
        let window = HeadlessWindow::new(&config.window);
        let handle = window.handle();
        let api = HeadlessRendererApi::new();
        let probe = api.probe();
        let app = Self::new(config, Box::new(window), Box::new(api))?;
        Ok((app, handle, probe))
    }

    /// Attach a layer and push it below the overlays
    pub fn push_layer(&mut self, layer: Box<dyn Layer>) -> Result<LayerId, AppError> {
        let layer = self.attach(layer)?;
        Ok(self.layer_stack.push_layer(layer))
    }

    /// Attach a layer and push it as the topmost overlay
    pub fn push_overlay(&mut self, layer: Box<dyn Layer>) -> Result<LayerId, AppError> {
        let layer = self.attach(layer)?;
        Ok(self.layer_stack.push_overlay(layer))
    }

    /// Detach and destroy a normal layer
    pub fn pop_layer(&mut self, id: LayerId) -> Result<(), AppError> {
        Ok(self.layer_stack.pop_layer(id)?)
    }

    /// Detach and destroy an overlay
    pub fn pop_overlay(&mut self, id: LayerId) -> Result<(), AppError> {
        Ok(self.layer_stack.pop_overlay(id)?)
    }

    fn attach(&mut self, mut layer: Box<dyn Layer>) -> Result<Box<dyn Layer>, AppError> {
        let mut ctx = FrameContext::new(&mut self.commands, self.window.size(), self.frame_index);
        layer.on_attach(&mut ctx).map_err(|source| AppError::Layer {
            name: layer.name().to_string(),
            source,
        })?;
        if ctx.close_requested() {
            self.running = false;
        }
        Ok(layer)
    }

    /// Application-level event handling, then the layers top-down
    pub fn on_event(&mut self, event: &mut Event) {
        log::trace!("{event}");
        let mut dispatcher = EventDispatcher::new(event);
        dispatcher.dispatch::<WindowCloseEvent, _>(|_| self.on_window_close());
        dispatcher.dispatch::<WindowResizeEvent, _>(|resize| self.on_window_resize(resize));

        self.layer_stack.dispatch_event(event);
    }

    fn on_window_close(&mut self) -> bool {
        log::info!("Window close requested");
        self.running = false;
        true
    }

    fn on_window_resize(&mut self, resize: &WindowResizeEvent) -> bool {
        if resize.is_zero_area() {
            if !self.minimized {
                log::debug!("Window minimized, suspending updates");
            }
            self.minimized = true;
        } else {
            if self.minimized {
                log::debug!("Window restored to {}x{}", resize.width, resize.height);
            }
            self.minimized = false;
            self.commands.set_viewport(0, 0, resize.width, resize.height);
        }
        // Layers still need to see resizes
        false
    }

    /// Run one iteration of the frame loop
    pub fn run_frame(&mut self) -> Result<(), AppError> {
        let ts = self.timer.tick();

        for mut event in self.window.poll_events() {
            self.on_event(&mut event);
        }

        let mut ctx = FrameContext::new(&mut self.commands, self.window.size(), self.frame_index);

        if !self.minimized {
            for layer in self.layer_stack.iter_mut() {
                layer.on_update(&mut ctx, ts).map_err(|source| AppError::Layer {
                    name: layer.name().to_string(),
                    source,
                })?;
            }
        }

        for layer in self.layer_stack.iter_mut() {
            layer.on_render(&mut ctx).map_err(|source| AppError::Layer {
                name: layer.name().to_string(),
                source,
            })?;
        }

        let close_requested = ctx.close_requested();
        self.window.swap_buffers();
        self.frame_index += 1;

        if close_requested {
            log::info!("Close requested by a layer");
            self.running = false;
        }
        Ok(())
    }

    /// Run frames until a close is requested or a layer fails
    pub fn run(&mut self) -> Result<(), AppError> {
        log::info!("Starting main loop...");
        while self.running {
            self.run_frame()?;
        }
        log::info!(
            "Main loop stopped after {} frames ({:.1} fps average)",
            self.frame_index,
            self.timer.average_fps()
        );
        Ok(())
    }

    /// Ask the loop to stop after the current frame
    pub fn close(&mut self) {
        self.running = false;
    }

    /// Detach all layers and release the window
    pub fn shutdown(mut self) {
        log::info!("Shutting down application");
        self.layer_stack.clear();
    }

    /// Current loop state
    pub fn state(&self) -> AppState {
        if !self.running {
            AppState::Stopped
        } else if self.minimized {
            AppState::Minimized
        } else {
            AppState::Running
        }
    }

    /// True until a close is requested
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// True while the window has zero area
    pub fn is_minimized(&self) -> bool {
        self.minimized
    }

    /// Frames completed so far
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    /// The window
    pub fn window(&self) -> &dyn Window {
        self.window.as_ref()
    }

    /// Draw-command façade
    pub fn commands(&self) -> &RenderCommand {
        &self.commands
    }

    /// Mutable draw-command façade, e.g. for creating resources before layers are pushed
    pub fn commands_mut(&mut self) -> &mut RenderCommand {
        &mut self.commands
    }

    /// The layer stack
    pub fn layer_stack(&self) -> &LayerStack {
        &self.layer_stack
    }

    /// Configuration the application was created with
    pub fn config(&self) -> &ApplicationConfig {
        &self.config
    }
}
