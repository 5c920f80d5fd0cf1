//! Shared ownership handles
//!
//! GPU-side resources (uniform buffers, framebuffers, meshes) are shared
//! between the renderer and whoever created them. Everything runs on the
//! main thread, so handles are plain reference counted pointers.

use std::rc::Rc;

/// Reference counted handle to a shared resource
///
/// The resource is released when the last holder drops its handle.
pub type Ref<T> = Rc<T>;
