//! Event system
//!
//! Key principles:
//! - One payload struct per event type, wrapped in [`Event`]
//! - Handlers return bool (true = consumed, stops forwarding)
//! - Dispatch is immediate and synchronous; there is no queue

mod dispatcher;
mod event;

pub use dispatcher::EventDispatcher;
pub use event::{
    Event, EventCategory, EventKind, EventType, TypedEvent,
    KeyPressedEvent, KeyReleasedEvent, KeyTypedEvent,
    MouseButtonPressedEvent, MouseButtonReleasedEvent, MouseMovedEvent, MouseScrolledEvent,
    WindowCloseEvent, WindowFocusEvent, WindowLostFocusEvent, WindowMovedEvent, WindowResizeEvent,
};
