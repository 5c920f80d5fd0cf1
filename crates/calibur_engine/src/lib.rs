//! # Calibur Engine
//!
//! Core of a small layered game engine.
//!
//! ## Features
//!
//! - **Layer stack**: ordered update/render units with overlays on top
//! - **Events**: typed, synchronous dispatch that stops once consumed
//! - **Scene renderer**: per-frame camera, light and cascaded-shadow uniforms
//! - **Backends**: GLFW windows, plus headless window and renderer for tests
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use calibur_engine::prelude::*;
//!
//! struct Hello;
//!
//! impl Layer for Hello {
//!     fn name(&self) -> &str {
//!         "Hello"
//!     }
//!
//!     fn on_update(&mut self, _ctx: &mut FrameContext<'_>, ts: TimeStep) -> LayerResult {
//!         log::info!("frame took {:.2} ms", ts.milliseconds());
//!         Ok(())
//!     }
//! }
//!
//! fn main() -> Result<(), AppError> {
//!     let config = ApplicationConfig::default();
//!     let backend = Box::new(HeadlessRendererApi::without_recording());
//!     let mut app = Application::with_glfw(config, backend)?;
//!     app.push_layer(Box::new(Hello))?;
//!     app.run()
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod core;
pub mod foundation;
pub mod config;
pub mod events;
pub mod input;
pub mod layers;
pub mod render;
pub mod scene;
pub mod window;

mod application;

pub use application::{AppError, AppState, Application};

#[cfg(test)]
mod tests;

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        AppError, AppState, Application,
        core::config::{ApplicationConfig, Config, RendererConfig, WindowConfig},
        events::{
            Event, EventCategory, EventDispatcher, EventType, KeyPressedEvent, KeyReleasedEvent,
            MouseButtonPressedEvent, WindowCloseEvent, WindowResizeEvent,
        },
        foundation::{
            math::{Mat4, Transform, Vec3, Vec4},
            memory::Ref,
            time::TimeStep,
        },
        input::{KeyCode, MouseButton},
        layers::{FrameContext, Layer, LayerError, LayerId, LayerResult},
        render::{
            DirectionalLight, HeadlessMesh, HeadlessRendererApi, Mesh, PointLight,
            RenderCommand, SceneLightData, SceneRenderCamera,
        },
        scene::{Scene, SceneEntity, SceneRef, SceneRenderer, SceneRendererConfig},
    };
}
