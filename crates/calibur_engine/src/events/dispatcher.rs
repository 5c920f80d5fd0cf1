//! Typed, synchronous event dispatch

use super::event::{Event, TypedEvent};

/// Routes one event to the handler registered for its runtime kind
///
/// The handler runs immediately on the caller's stack; its return value is
/// OR-ed into [`Event::handled`], so a handler can consume an event but never
/// un-consume it.
///
/// ```
/// use calibur_engine::events::{Event, EventDispatcher, WindowCloseEvent, WindowResizeEvent};
///
/// let mut event = Event::from(WindowCloseEvent);
/// let mut dispatcher = EventDispatcher::new(&mut event);
/// assert!(!dispatcher.dispatch::<WindowResizeEvent, _>(|_| true));
/// assert!(dispatcher.dispatch::<WindowCloseEvent, _>(|_| true));
/// assert!(event.handled);
/// ```
pub struct EventDispatcher<'a> {
    event: &'a mut Event,
}

impl<'a> EventDispatcher<'a> {
    /// Wrap an event for dispatch
    pub fn new(event: &'a mut Event) -> Self {
        Self { event }
    }

    /// Invoke `handler` if the event is an `E`
    ///
    /// Returns true if the kind matched and the handler ran.
    pub fn dispatch<E, F>(&mut self, handler: F) -> bool
    where
        E: TypedEvent,
        F: FnOnce(&E) -> bool,
    {
        let Some(payload) = E::from_kind(self.event.kind()) else {
            return false;
        };
        let consumed = handler(payload);
        self.event.handled |= consumed;
        true
    }

    /// Whether the wrapped event has been consumed
    pub fn is_handled(&self) -> bool {
        self.event.handled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{KeyPressedEvent, KeyReleasedEvent, WindowResizeEvent};
    use crate::input::KeyCode;

    #[test]
    fn test_dispatch_matches_runtime_kind_once() {
        let mut event = Event::from(KeyPressedEvent { key: KeyCode::A, repeat_count: 0 });
        let mut calls = 0;
        let mut dispatcher = EventDispatcher::new(&mut event);

        assert!(!dispatcher.dispatch::<KeyReleasedEvent, _>(|_| {
            calls += 100;
            true
        }));
        assert!(dispatcher.dispatch::<KeyPressedEvent, _>(|e| {
            calls += 1;
            e.key == KeyCode::A
        }));

        assert_eq!(calls, 1);
        assert!(event.handled);
    }

    #[test]
    fn test_unconsumed_event_stays_unhandled() {
        let mut event = Event::from(WindowResizeEvent { width: 640, height: 480 });
        let mut dispatcher = EventDispatcher::new(&mut event);
        assert!(dispatcher.dispatch::<WindowResizeEvent, _>(|_| false));
        assert!(!dispatcher.is_handled());
    }

    #[test]
    fn test_handled_flag_is_sticky() {
        let mut event = Event::from(WindowResizeEvent { width: 1, height: 1 });
        event.handled = true;
        let mut dispatcher = EventDispatcher::new(&mut event);
        dispatcher.dispatch::<WindowResizeEvent, _>(|_| false);
        assert!(event.handled);
    }
}
