//! Layers and the layer stack
//!
//! A [`Layer`] is a unit of per-frame work: game scenes, debug overlays,
//! editor panels. The [`LayerStack`] owns them and fixes the order they run
//! in: normal layers first, overlays last; events go the other way.

mod layer;
mod layer_stack;

pub use layer::{FrameContext, Layer, LayerError, LayerResult};
pub use layer_stack::{LayerId, LayerStack, LayerStackError};
