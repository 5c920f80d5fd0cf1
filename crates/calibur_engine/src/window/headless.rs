//! Window without an OS surface
//!
//! Each call to [`Window::poll_events`] pops one scripted frame of events.
//! A [`HeadlessWindowHandle`] stays with the caller after the window has been
//! moved into the application, so more frames can be scripted and presented
//! frames counted.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use super::Window;
use crate::core::config::WindowConfig;
use crate::events::{Event, WindowResizeEvent};

/// Shared view of a [`HeadlessWindow`]'s script and counters
#[derive(Clone, Default)]
pub struct HeadlessWindowHandle {
    frames: Rc<RefCell<VecDeque<Vec<Event>>>>,
    swaps: Rc<Cell<u64>>,
    polls: Rc<Cell<u64>>,
}

impl HeadlessWindowHandle {
    /// Script the events delivered by one future poll
    pub fn push_frame(&self, events: Vec<Event>) {
        self.frames.borrow_mut().push_back(events);
    }

    /// Number of scripted frames not yet polled
    pub fn pending_frames(&self) -> usize {
        self.frames.borrow().len()
    }

    /// Number of buffer swaps so far
    pub fn swap_count(&self) -> u64 {
        self.swaps.get()
    }

    /// Number of event polls so far
    pub fn poll_count(&self) -> u64 {
        self.polls.get()
    }
}

/// Window backed by a script instead of the OS
pub struct HeadlessWindow {
    title: String,
    width: u32,
    height: u32,
    vsync: bool,
    handle: HeadlessWindowHandle,
}

impl HeadlessWindow {
    /// Create a headless window with the configured size and title
    pub fn new(config: &WindowConfig) -> Self {
        log::debug!(
            "Created headless window '{}' ({}x{})",
            config.title,
            config.width,
            config.height
        );
        Self {
            title: config.title.clone(),
            width: config.width,
            height: config.height,
            vsync: config.vsync,
            handle: HeadlessWindowHandle::default(),
        }
    }

    /// Handle for scripting events and reading counters
    pub fn handle(&self) -> HeadlessWindowHandle {
        self.handle.clone()
    }
}

impl Window for HeadlessWindow {
    fn poll_events(&mut self) -> Vec<Event> {
        self.handle.polls.set(self.handle.polls.get() + 1);
        let events = self.handle.frames.borrow_mut().pop_front().unwrap_or_default();
        for event in &events {
            if let Some(resize) = event.payload::<WindowResizeEvent>() {
                self.width = resize.width;
                self.height = resize.height;
            }
        }
        events
    }

    fn swap_buffers(&mut self) {
        self.handle.swaps.set(self.handle.swaps.get() + 1);
    }

    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn set_vsync(&mut self, enabled: bool) {
        self.vsync = enabled;
    }

    fn is_vsync(&self) -> bool {
        self.vsync
    }
}
