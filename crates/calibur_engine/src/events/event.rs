//! Event values produced by the window layer
//!
//! An [`Event`] wraps one concrete payload struct plus a `handled` flag.
//! Handlers mutate the flag in place; once it is set, propagation through
//! the layer stack stops.

use std::fmt;

use bitflags::bitflags;

use crate::input::{KeyCode, MouseButton};

/// Runtime kind of an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    /// Window close requested
    WindowClose,
    /// Window client area resized
    WindowResize,
    /// Window gained focus
    WindowFocus,
    /// Window lost focus
    WindowLostFocus,
    /// Window moved on screen
    WindowMoved,
    /// Key pressed or auto-repeated
    KeyPressed,
    /// Key released
    KeyReleased,
    /// Unicode character typed
    KeyTyped,
    /// Mouse button pressed
    MouseButtonPressed,
    /// Mouse button released
    MouseButtonReleased,
    /// Cursor moved
    MouseMoved,
    /// Scroll wheel moved
    MouseScrolled,
}

bitflags! {
    /// Coarse grouping of event types, used for filtering
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct EventCategory: u8 {
        /// Window and application lifecycle
        const APPLICATION = 1 << 0;
        /// Any user input
        const INPUT = 1 << 1;
        /// Keyboard input
        const KEYBOARD = 1 << 2;
        /// Mouse movement and scrolling
        const MOUSE = 1 << 3;
        /// Mouse buttons
        const MOUSE_BUTTON = 1 << 4;
    }
}

/// Window close request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WindowCloseEvent;

/// Window resized to a new client area size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowResizeEvent {
    /// New width in pixels
    pub width: u32,
    /// New height in pixels
    pub height: u32,
}

impl WindowResizeEvent {
    /// True when either dimension is zero (minimized window)
    pub fn is_zero_area(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Window gained focus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WindowFocusEvent;

/// Window lost focus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WindowLostFocusEvent;

/// Window moved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowMovedEvent {
    /// New x position of the top-left corner
    pub x: i32,
    /// New y position of the top-left corner
    pub y: i32,
}

/// Key pressed; `repeat_count` is nonzero for auto-repeat
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyPressedEvent {
    /// Key that went down
    pub key: KeyCode,
    /// Number of repeats, zero for the initial press
    pub repeat_count: u32,
}

/// Key released
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyReleasedEvent {
    /// Key that went up
    pub key: KeyCode,
}

/// Character typed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyTypedEvent {
    /// Unicode character produced by the key press
    pub character: char,
}

/// Mouse button pressed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MouseButtonPressedEvent {
    /// Button that went down
    pub button: MouseButton,
}

/// Mouse button released
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MouseButtonReleasedEvent {
    /// Button that went up
    pub button: MouseButton,
}

/// Cursor moved
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MouseMovedEvent {
    /// Cursor x in window coordinates
    pub x: f32,
    /// Cursor y in window coordinates
    pub y: f32,
}

/// Scroll wheel moved
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MouseScrolledEvent {
    /// Horizontal scroll delta
    pub x_offset: f32,
    /// Vertical scroll delta
    pub y_offset: f32,
}

/// Payload of an event, one variant per [`EventType`]
#[derive(Debug, Clone, PartialEq)]
pub enum EventKind {
    /// See [`WindowCloseEvent`]
    WindowClose(WindowCloseEvent),
    /// See [`WindowResizeEvent`]
    WindowResize(WindowResizeEvent),
    /// See [`WindowFocusEvent`]
    WindowFocus(WindowFocusEvent),
    /// See [`WindowLostFocusEvent`]
    WindowLostFocus(WindowLostFocusEvent),
    /// See [`WindowMovedEvent`]
    WindowMoved(WindowMovedEvent),
    /// See [`KeyPressedEvent`]
    KeyPressed(KeyPressedEvent),
    /// See [`KeyReleasedEvent`]
    KeyReleased(KeyReleasedEvent),
    /// See [`KeyTypedEvent`]
    KeyTyped(KeyTypedEvent),
    /// See [`MouseButtonPressedEvent`]
    MouseButtonPressed(MouseButtonPressedEvent),
    /// See [`MouseButtonReleasedEvent`]
    MouseButtonReleased(MouseButtonReleasedEvent),
    /// See [`MouseMovedEvent`]
    MouseMoved(MouseMovedEvent),
    /// See [`MouseScrolledEvent`]
    MouseScrolled(MouseScrolledEvent),
}

/// Statically typed access to one event payload
///
/// Implemented for every payload struct so [`EventDispatcher`](super::EventDispatcher)
/// can match on the runtime kind without the caller writing the `match`.
pub trait TypedEvent: Sized {
    /// Runtime kind this payload corresponds to
    const EVENT_TYPE: EventType;

    /// Categories this payload belongs to
    const CATEGORY: EventCategory;

    /// Borrow the payload if `kind` holds this type
    fn from_kind(kind: &EventKind) -> Option<&Self>;
}

macro_rules! typed_event {
    ($payload:ident, $variant:ident, $category:expr) => {
        impl TypedEvent for $payload {
            const EVENT_TYPE: EventType = EventType::$variant;
            const CATEGORY: EventCategory = $category;

            fn from_kind(kind: &EventKind) -> Option<&Self> {
                match kind {
                    EventKind::$variant(payload) => Some(payload),
                    _ => None,
                }
            }
        }

        impl From<$payload> for EventKind {
            fn from(payload: $payload) -> Self {
                EventKind::$variant(payload)
            }
        }

        impl From<$payload> for Event {
            fn from(payload: $payload) -> Self {
                Event::new(EventKind::$variant(payload))
            }
        }
    };
}

typed_event!(WindowCloseEvent, WindowClose, EventCategory::APPLICATION);
typed_event!(WindowResizeEvent, WindowResize, EventCategory::APPLICATION);
typed_event!(WindowFocusEvent, WindowFocus, EventCategory::APPLICATION);
typed_event!(WindowLostFocusEvent, WindowLostFocus, EventCategory::APPLICATION);
typed_event!(WindowMovedEvent, WindowMoved, EventCategory::APPLICATION);
typed_event!(
    KeyPressedEvent,
    KeyPressed,
    EventCategory::INPUT.union(EventCategory::KEYBOARD)
);
typed_event!(
    KeyReleasedEvent,
    KeyReleased,
    EventCategory::INPUT.union(EventCategory::KEYBOARD)
);
typed_event!(
    KeyTypedEvent,
    KeyTyped,
    EventCategory::INPUT.union(EventCategory::KEYBOARD)
);
typed_event!(
    MouseButtonPressedEvent,
    MouseButtonPressed,
    EventCategory::INPUT
        .union(EventCategory::MOUSE)
        .union(EventCategory::MOUSE_BUTTON)
);
typed_event!(
    MouseButtonReleasedEvent,
    MouseButtonReleased,
    EventCategory::INPUT
        .union(EventCategory::MOUSE)
        .union(EventCategory::MOUSE_BUTTON)
);
typed_event!(
    MouseMovedEvent,
    MouseMoved,
    EventCategory::INPUT.union(EventCategory::MOUSE)
);
typed_event!(
    MouseScrolledEvent,
    MouseScrolled,
    EventCategory::INPUT.union(EventCategory::MOUSE)
);

fn metadata_of<E: TypedEvent>(_: &E) -> (EventType, EventCategory) {
    (E::EVENT_TYPE, E::CATEGORY)
}

impl EventKind {
    fn metadata(&self) -> (EventType, EventCategory) {
        match self {
            Self::WindowClose(e) => metadata_of(e),
            Self::WindowResize(e) => metadata_of(e),
            Self::WindowFocus(e) => metadata_of(e),
            Self::WindowLostFocus(e) => metadata_of(e),
            Self::WindowMoved(e) => metadata_of(e),
            Self::KeyPressed(e) => metadata_of(e),
            Self::KeyReleased(e) => metadata_of(e),
            Self::KeyTyped(e) => metadata_of(e),
            Self::MouseButtonPressed(e) => metadata_of(e),
            Self::MouseButtonReleased(e) => metadata_of(e),
            Self::MouseMoved(e) => metadata_of(e),
            Self::MouseScrolled(e) => metadata_of(e),
        }
    }
}

/// A window/input event travelling through the application
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    kind: EventKind,
    /// Set once a handler consumed the event; stops further propagation
    pub handled: bool,
}

impl Event {
    /// Wrap a payload in a fresh, unhandled event
    pub fn new(kind: EventKind) -> Self {
        Self { kind, handled: false }
    }

    /// Payload of this event
    pub fn kind(&self) -> &EventKind {
        &self.kind
    }

    /// Runtime kind of this event
    pub fn event_type(&self) -> EventType {
        self.kind.metadata().0
    }

    /// Category flags of this event
    pub fn category(&self) -> EventCategory {
        self.kind.metadata().1
    }

    /// True if this event belongs to any of the given categories
    pub fn is_in_category(&self, category: EventCategory) -> bool {
        self.category().intersects(category)
    }

    /// Borrow the payload as `E` if the runtime kind matches
    pub fn payload<E: TypedEvent>(&self) -> Option<&E> {
        E::from_kind(&self.kind)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            EventKind::WindowResize(e) => write!(f, "WindowResizeEvent: {}, {}", e.width, e.height),
            EventKind::WindowMoved(e) => write!(f, "WindowMovedEvent: {}, {}", e.x, e.y),
            EventKind::KeyPressed(e) => {
                write!(f, "KeyPressedEvent: {} ({} repeats)", e.key, e.repeat_count)
            }
            EventKind::KeyReleased(e) => write!(f, "KeyReleasedEvent: {}", e.key),
            EventKind::KeyTyped(e) => write!(f, "KeyTypedEvent: {:?}", e.character),
            EventKind::MouseButtonPressed(e) => write!(f, "MouseButtonPressedEvent: {}", e.button),
            EventKind::MouseButtonReleased(e) => {
                write!(f, "MouseButtonReleasedEvent: {}", e.button)
            }
            EventKind::MouseMoved(e) => write!(f, "MouseMovedEvent: {}, {}", e.x, e.y),
            EventKind::MouseScrolled(e) => {
                write!(f, "MouseScrolledEvent: {}, {}", e.x_offset, e.y_offset)
            }
            _ => write!(f, "{:?}", self.event_type()),
        }
    }
}
