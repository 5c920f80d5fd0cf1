//! Ordered layer ownership
//!
//! ```text
//! index:   0 .. overlay_start        overlay_start .. len
//!          [ normal layers ........ | overlays .......... ]
//! update/render  ───────────────────────────────────────────▶
//! events         ◀───────────────────────────────────────────
//! ```

use std::fmt;

use thiserror::Error;

use super::layer::Layer;
use crate::events::Event;

/// Handle returned when a layer is pushed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LayerId(u64);

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "layer#{}", self.0)
    }
}

/// Layer stack errors
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerStackError {
    /// No layer with this id in the requested region
    #[error("{id} is not in the {region} region of the layer stack")]
    NotFound {
        /// Requested id
        id: LayerId,
        /// "layer" or "overlay"
        region: &'static str,
    },
}

struct LayerEntry {
    id: LayerId,
    layer: Box<dyn Layer>,
}

/// Normal layers followed by overlays
#[derive(Default)]
pub struct LayerStack {
    layers: Vec<LayerEntry>,
    overlay_start: usize,
    next_id: u64,
}

impl LayerStack {
    /// Empty stack
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate_id(&mut self) -> LayerId {
        self.next_id += 1;
        LayerId(self.next_id)
    }

    /// Insert a layer after the existing normal layers, before any overlay
    pub fn push_layer(&mut self, layer: Box<dyn Layer>) -> LayerId {
        let id = self.allocate_id();
        log::debug!("Pushing layer '{}' ({id})", layer.name());
        self.layers.insert(self.overlay_start, LayerEntry { id, layer });
        self.overlay_start += 1;
        id
    }

    /// Append an overlay at the top of the stack
    pub fn push_overlay(&mut self, layer: Box<dyn Layer>) -> LayerId {
        let id = self.allocate_id();
        log::debug!("Pushing overlay '{}' ({id})", layer.name());
        self.layers.push(LayerEntry { id, layer });
        id
    }

    /// Detach and destroy a normal layer
    pub fn pop_layer(&mut self, id: LayerId) -> Result<(), LayerStackError> {
        let Some(index) = self.layers[..self.overlay_start]
            .iter()
            .position(|entry| entry.id == id)
        else {
            return Err(not_found(id, "layer"));
        };
        let entry = self.layers.remove(index);
        self.overlay_start -= 1;
        detach(entry);
        Ok(())
    }

    /// Detach and destroy an overlay
    pub fn pop_overlay(&mut self, id: LayerId) -> Result<(), LayerStackError> {
        let Some(offset) = self.layers[self.overlay_start..]
            .iter()
            .position(|entry| entry.id == id)
        else {
            return Err(not_found(id, "overlay"));
        };
        let entry = self.layers.remove(self.overlay_start + offset);
        detach(entry);
        Ok(())
    }

    /// Layers in update/render order
    pub fn iter_mut(&mut self) -> impl DoubleEndedIterator<Item = &mut (dyn Layer + 'static)> + '_ {
        self.layers.iter_mut().map(|entry| entry.layer.as_mut())
    }

    /// Offer an event to layers from the top down until one handles it
    pub fn dispatch_event(&mut self, event: &mut Event) {
        if event.handled {
            return;
        }
        for layer in self.iter_mut().rev() {
            layer.on_event(event);
            if event.handled {
                log::trace!("{event} handled by '{}'", layer.name());
                break;
            }
        }
    }

    /// Detach and destroy every layer, top first
    pub fn clear(&mut self) {
        while let Some(entry) = self.layers.pop() {
            detach(entry);
        }
        self.overlay_start = 0;
    }

    /// Total number of layers and overlays
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// True if the stack holds nothing
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Number of normal layers
    pub fn layer_count(&self) -> usize {
        self.overlay_start
    }

    /// Number of overlays
    pub fn overlay_count(&self) -> usize {
        self.layers.len() - self.overlay_start
    }

    /// Debug names in update/render order
    pub fn names(&self) -> Vec<&str> {
        self.layers.iter().map(|entry| entry.layer.name()).collect()
    }

    /// Whether a layer or overlay with this id is on the stack
    pub fn contains(&self, id: LayerId) -> bool {
        self.layers.iter().any(|entry| entry.id == id)
    }
}

impl Drop for LayerStack {
    fn drop(&mut self) {
        self.clear();
    }
}

fn detach(mut entry: LayerEntry) {
    log::debug!("Detaching '{}' ({})", entry.layer.name(), entry.id);
    entry.layer.on_detach();
}

fn not_found(id: LayerId, region: &'static str) -> LayerStackError {
    let error = LayerStackError::NotFound { id, region };
    log::error!("{error}");
    error
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::events::{KeyPressedEvent, WindowResizeEvent};
    use crate::input::KeyCode;

    type Journal = Rc<RefCell<Vec<String>>>;

    struct Probe {
        name: &'static str,
        journal: Journal,
        consume: bool,
    }

    impl Probe {
        fn boxed(name: &'static str, journal: &Journal, consume: bool) -> Box<dyn Layer> {
            Box::new(Self {
                name,
                journal: Rc::clone(journal),
                consume,
            })
        }
    }

    impl Layer for Probe {
        fn name(&self) -> &str {
            self.name
        }

        fn on_detach(&mut self) {
            self.journal.borrow_mut().push(format!("detach:{}", self.name));
        }

        fn on_event(&mut self, event: &mut Event) {
            self.journal.borrow_mut().push(format!("event:{}", self.name));
            if self.consume {
                event.handled = true;
            }
        }
    }

    fn key_event() -> Event {
        KeyPressedEvent { key: KeyCode::A, repeat_count: 0 }.into()
    }

    #[test]
    fn test_normal_layers_precede_overlays() {
        let journal = Journal::default();
        let mut stack = LayerStack::new();
        stack.push_overlay(Probe::boxed("o1", &journal, false));
        stack.push_layer(Probe::boxed("l1", &journal, false));
        stack.push_overlay(Probe::boxed("o2", &journal, false));
        stack.push_layer(Probe::boxed("l2", &journal, false));

        assert_eq!(stack.names(), vec!["l1", "l2", "o1", "o2"]);
        assert_eq!(stack.layer_count(), 2);
        assert_eq!(stack.overlay_count(), 2);
    }

    #[test]
    fn test_events_travel_top_down_and_stop_when_handled() {
        let journal = Journal::default();
        let mut stack = LayerStack::new();
        stack.push_layer(Probe::boxed("a", &journal, false));
        stack.push_layer(Probe::boxed("b", &journal, true));
        stack.push_overlay(Probe::boxed("c", &journal, false));

        let mut event = key_event();
        stack.dispatch_event(&mut event);

        assert!(event.handled);
        assert_eq!(*journal.borrow(), vec!["event:c", "event:b"]);
    }

    #[test]
    fn test_already_handled_event_is_not_delivered() {
        let journal = Journal::default();
        let mut stack = LayerStack::new();
        stack.push_layer(Probe::boxed("a", &journal, false));

        let mut event: Event = WindowResizeEvent { width: 10, height: 10 }.into();
        event.handled = true;
        stack.dispatch_event(&mut event);

        assert!(journal.borrow().is_empty());
    }

    #[test]
    fn test_pop_detaches_and_respects_regions() {
        let journal = Journal::default();
        let mut stack = LayerStack::new();
        let layer = stack.push_layer(Probe::boxed("a", &journal, false));
        let overlay = stack.push_overlay(Probe::boxed("o", &journal, false));

        assert_eq!(
            stack.pop_layer(overlay),
            Err(LayerStackError::NotFound { id: overlay, region: "layer" })
        );
        assert_eq!(
            stack.pop_overlay(layer),
            Err(LayerStackError::NotFound { id: layer, region: "overlay" })
        );
        assert_eq!(stack.len(), 2);

        stack.pop_layer(layer).unwrap();
        assert_eq!(stack.layer_count(), 0);
        assert_eq!(stack.names(), vec!["o"]);
        assert!(!stack.contains(layer));
        assert_eq!(*journal.borrow(), vec!["detach:a"]);

        // A popped id stays invalid
        assert!(stack.pop_layer(layer).is_err());
    }

    #[test]
    fn test_drop_detaches_in_reverse_order() {
        let journal = Journal::default();
        {
            let mut stack = LayerStack::new();
            stack.push_layer(Probe::boxed("a", &journal, false));
            stack.push_layer(Probe::boxed("b", &journal, false));
            stack.push_overlay(Probe::boxed("o", &journal, false));
        }
        assert_eq!(*journal.borrow(), vec!["detach:o", "detach:b", "detach:a"]);
    }
}
