//! Foundation module - Core utilities and types
//!
//! This module provides fundamental utilities used throughout the engine:
//! - Math types and operations
//! - Shared ownership handles for GPU resources
//! - Frame timing
//! - Logging utilities

pub mod math;
pub mod memory;
pub mod time;
pub mod logging;
