//! # Application Configuration
//!
//! Everything an [`Application`](crate::Application) needs at
//! startup, grouped by subsystem:
//!
//! - **Window**: title, size, vsync
//! - **Renderer**: clear color, depth test
//! - **Scene**: shadow and light-overflow settings for scene renderers
//! - **Logging**: default log filter, overridable with `RUST_LOG`
//!
//! All sections have defaults, so a config file only needs the values it
//! changes:
//!
//! ```toml
//! log_level = "debug"
//!
//! [window]
//! title = "My Game"
//! width = 1280
//! height = 720
//! ```

use serde::{Deserialize, Serialize};

pub use crate::config::{Config, ConfigError};
pub use crate::scene::SceneRendererConfig;

/// Window creation parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Title bar text
    pub title: String,
    /// Client area width in pixels
    pub width: u32,
    /// Client area height in pixels
    pub height: u32,
    /// Vertical sync
    pub vsync: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Calibur Sandbox".to_string(),
            width: 1600,
            height: 900,
            vsync: true,
        }
    }
}

/// Initial render state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    /// RGBA clear color
    pub clear_color: [f32; 4],
    /// Depth testing for the main pass
    pub depth_test: bool,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            clear_color: [0.1, 0.1, 0.1, 1.0],
            depth_test: true,
        }
    }
}

/// Top-level application configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationConfig {
    /// Window settings
    pub window: WindowConfig,
    /// Renderer settings
    pub renderer: RendererConfig,
    /// Defaults for scene renderers created by layers
    pub scene: SceneRendererConfig,
    /// Log filter used unless `RUST_LOG` is set
    pub log_level: String,
}

impl Config for ApplicationConfig {}

impl ApplicationConfig {
    /// Check every section
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window.width == 0 || self.window.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "window size must be nonzero, got {}x{}",
                self.window.width, self.window.height
            )));
        }
        if self
            .renderer
            .clear_color
            .iter()
            .any(|c| !(0.0..=1.0).contains(c))
        {
            return Err(ConfigError::Invalid(format!(
                "clear_color components must be in [0, 1], got {:?}",
                self.renderer.clear_color
            )));
        }
        self.scene.validate().map_err(ConfigError::Invalid)?;
        Ok(())
    }

    /// Log filter, falling back to `info` when unset
    pub fn log_filter(&self) -> &str {
        if self.log_level.is_empty() {
            "info"
        } else {
            &self.log_level
        }
    }
}
