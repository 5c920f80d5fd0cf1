//! Window management using GLFW
//!
//! Creates an OpenGL-capable window and translates GLFW's event stream into
//! engine [`Event`]s.

use glfw::{Action, Context, WindowEvent};

use super::{Window, WindowError, WindowResult};
use crate::core::config::WindowConfig;
use crate::events::{
    Event, KeyPressedEvent, KeyReleasedEvent, KeyTypedEvent, MouseButtonPressedEvent,
    MouseButtonReleasedEvent, MouseMovedEvent, MouseScrolledEvent, WindowCloseEvent,
    WindowFocusEvent, WindowLostFocusEvent, WindowMovedEvent, WindowResizeEvent,
};
use crate::input::{KeyCode, MouseButton};

/// GLFW window wrapper with proper resource management
pub struct GlfwWindow {
    glfw: glfw::Glfw,
    window: glfw::PWindow,
    events: glfw::GlfwReceiver<(f64, WindowEvent)>,
    title: String,
    vsync: bool,
}

impl GlfwWindow {
    /// Create and show a window described by `config`
    pub fn new(config: &WindowConfig) -> WindowResult<Self> {
        let mut glfw = glfw::init(glfw::fail_on_errors)
            .map_err(|e| WindowError::InitializationFailed(format!("{e:?}")))?;

        glfw.window_hint(glfw::WindowHint::ContextVersion(4, 5));
        glfw.window_hint(glfw::WindowHint::OpenGlProfile(glfw::OpenGlProfileHint::Core));
        glfw.window_hint(glfw::WindowHint::Resizable(true));

        let (mut window, events) = glfw
            .create_window(config.width, config.height, &config.title, glfw::WindowMode::Windowed)
            .ok_or_else(|| WindowError::CreationFailed {
                title: config.title.clone(),
                width: config.width,
                height: config.height,
            })?;

        window.make_current();
        window.set_close_polling(true);
        window.set_size_polling(true);
        window.set_focus_polling(true);
        window.set_pos_polling(true);
        window.set_key_polling(true);
        window.set_char_polling(true);
        window.set_mouse_button_polling(true);
        window.set_cursor_pos_polling(true);
        window.set_scroll_polling(true);

        log::info!(
            "Created window '{}' ({}x{})",
            config.title,
            config.width,
            config.height
        );

        let mut result = Self {
            glfw,
            window,
            events,
            title: config.title.clone(),
            vsync: config.vsync,
        };
        result.set_vsync(config.vsync);
        Ok(result)
    }
}

impl Window for GlfwWindow {
    fn poll_events(&mut self) -> Vec<Event> {
        self.glfw.poll_events();
        glfw::flush_messages(&self.events)
            .filter_map(|(_, event)| translate_event(event))
            .collect()
    }

    fn swap_buffers(&mut self) {
        self.window.swap_buffers();
    }

    fn size(&self) -> (u32, u32) {
        let (width, height) = self.window.get_size();
        (width.max(0) as u32, height.max(0) as u32)
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn set_vsync(&mut self, enabled: bool) {
        let interval = if enabled {
            glfw::SwapInterval::Sync(1)
        } else {
            glfw::SwapInterval::None
        };
        self.glfw.set_swap_interval(interval);
        self.vsync = enabled;
    }

    fn is_vsync(&self) -> bool {
        self.vsync
    }
}

fn translate_event(event: WindowEvent) -> Option<Event> {
    let event = match event {
        WindowEvent::Close => Event::from(WindowCloseEvent),
        WindowEvent::Size(width, height) => Event::from(WindowResizeEvent {
            width: width.max(0) as u32,
            height: height.max(0) as u32,
        }),
        WindowEvent::Focus(true) => Event::from(WindowFocusEvent),
        WindowEvent::Focus(false) => Event::from(WindowLostFocusEvent),
        WindowEvent::Pos(x, y) => Event::from(WindowMovedEvent { x, y }),
        WindowEvent::Key(key, _scancode, action, _mods) => {
            let key = translate_key(key);
            match action {
                Action::Press => Event::from(KeyPressedEvent { key, repeat_count: 0 }),
                Action::Repeat => Event::from(KeyPressedEvent { key, repeat_count: 1 }),
                Action::Release => Event::from(KeyReleasedEvent { key }),
            }
        }
        WindowEvent::Char(character) => Event::from(KeyTypedEvent { character }),
        WindowEvent::MouseButton(button, action, _mods) => {
            let button = translate_mouse_button(button);
            match action {
                Action::Release => Event::from(MouseButtonReleasedEvent { button }),
                Action::Press | Action::Repeat => Event::from(MouseButtonPressedEvent { button }),
            }
        }
        WindowEvent::CursorPos(x, y) => Event::from(MouseMovedEvent {
            x: x as f32,
            y: y as f32,
        }),
        WindowEvent::Scroll(x_offset, y_offset) => Event::from(MouseScrolledEvent {
            x_offset: x_offset as f32,
            y_offset: y_offset as f32,
        }),
        _ => return None,
    };
    Some(event)
}

fn translate_mouse_button(button: glfw::MouseButton) -> MouseButton {
    match button {
        glfw::MouseButton::Button1 => MouseButton::Left,
        glfw::MouseButton::Button2 => MouseButton::Right,
        glfw::MouseButton::Button3 => MouseButton::Middle,
        other => MouseButton::Other(other as u8),
    }
}

fn translate_key(key: glfw::Key) -> KeyCode {
    use glfw::Key;

    match key {
        Key::A => KeyCode::A,
        Key::B => KeyCode::B,
        Key::C => KeyCode::C,
        Key::D => KeyCode::D,
        Key::E => KeyCode::E,
        Key::F => KeyCode::F,
        Key::G => KeyCode::G,
        Key::H => KeyCode::H,
        Key::I => KeyCode::I,
        Key::J => KeyCode::J,
        Key::K => KeyCode::K,
        Key::L => KeyCode::L,
        Key::M => KeyCode::M,
        Key::N => KeyCode::N,
        Key::O => KeyCode::O,
        Key::P => KeyCode::P,
        Key::Q => KeyCode::Q,
        Key::R => KeyCode::R,
        Key::S => KeyCode::S,
        Key::T => KeyCode::T,
        Key::U => KeyCode::U,
        Key::V => KeyCode::V,
        Key::W => KeyCode::W,
        Key::X => KeyCode::X,
        Key::Y => KeyCode::Y,
        Key::Z => KeyCode::Z,
        Key::Space => KeyCode::Space,
        Key::Enter => KeyCode::Enter,
        Key::Escape => KeyCode::Escape,
        Key::Tab => KeyCode::Tab,
        Key::Backspace => KeyCode::Backspace,
        Key::LeftShift => KeyCode::LeftShift,
        Key::LeftControl => KeyCode::LeftControl,
        Key::Up => KeyCode::Up,
        Key::Down => KeyCode::Down,
        Key::Left => KeyCode::Left,
        Key::Right => KeyCode::Right,
        other => KeyCode::Unknown(other as i32),
    }
}
