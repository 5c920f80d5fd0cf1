//! Integration tests driving the application through the headless window
//! and recording renderer

mod scene_rendering;
