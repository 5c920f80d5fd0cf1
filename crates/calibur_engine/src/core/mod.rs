//! # Core Engine Module
//!
//! Shared configuration types used by the application and its subsystems.

pub mod config;

pub use config::{
    ApplicationConfig,
    Config,
    ConfigError,
    RendererConfig,
    SceneRendererConfig,
    WindowConfig,
};
