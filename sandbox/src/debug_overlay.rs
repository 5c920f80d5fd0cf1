//! Frame statistics overlay; Escape closes the sandbox

use calibur_engine::events::{EventDispatcher, WindowResizeEvent};
use calibur_engine::prelude::*;

const REPORT_INTERVAL: u64 = 120;

/// Topmost overlay: consumes Escape and logs frame timings
#[derive(Default)]
pub struct DebugOverlay {
    close_pending: bool,
    frame_time_sum: f32,
    frames: u64,
}

impl DebugOverlay {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Layer for DebugOverlay {
    fn name(&self) -> &str {
        "DebugOverlay"
    }

    fn on_update(&mut self, ctx: &mut FrameContext<'_>, ts: TimeStep) -> LayerResult {
        self.frame_time_sum += ts.milliseconds();
        self.frames += 1;
        if self.frames == REPORT_INTERVAL {
            let average = self.frame_time_sum / self.frames as f32;
            log::info!(
                "frame {}: {average:.2} ms average ({:.0} fps)",
                ctx.frame_index,
                if average > 0.0 { 1000.0 / average } else { 0.0 }
            );
            self.frame_time_sum = 0.0;
            self.frames = 0;
        }
        Ok(())
    }

    // Render runs while minimized, so Escape closes in that state too
    fn on_render(&mut self, ctx: &mut FrameContext<'_>) -> LayerResult {
        if self.close_pending {
            ctx.request_close();
        }
        Ok(())
    }

    fn on_event(&mut self, event: &mut Event) {
        let mut dispatcher = EventDispatcher::new(event);
        dispatcher.dispatch::<KeyPressedEvent, _>(|key| {
            if key.key == KeyCode::Escape {
                log::info!("Escape pressed, closing");
                self.close_pending = true;
                return true;
            }
            false
        });
        dispatcher.dispatch::<WindowResizeEvent, _>(|resize| {
            log::debug!("Viewport now {}x{}", resize.width, resize.height);
            false
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calibur_engine::window::HeadlessWindowHandle;

    fn app_with_overlay() -> (Application, HeadlessWindowHandle) {
        let config = ApplicationConfig::default();
        let (mut app, window, _probe) = Application::headless(config).unwrap();
        app.push_overlay(Box::new(DebugOverlay::new())).unwrap();
        (app, window)
    }

    fn escape() -> Event {
        KeyPressedEvent { key: KeyCode::Escape, repeat_count: 0 }.into()
    }

    #[test]
    fn test_escape_closes_at_end_of_same_frame() {
        let (mut app, window) = app_with_overlay();

        window.push_frame(vec![escape()]);
        app.run_frame().unwrap();

        assert!(!app.is_running());
        assert_eq!(window.swap_count(), 1);
    }

    #[test]
    fn test_escape_closes_while_minimized() {
        let (mut app, window) = app_with_overlay();

        window.push_frame(vec![WindowResizeEvent { width: 0, height: 0 }.into()]);
        window.push_frame(vec![escape()]);
        app.run_frame().unwrap();
        assert!(app.is_minimized());
        assert!(app.is_running());

        app.run_frame().unwrap();
        assert!(app.is_minimized());
        assert!(!app.is_running());
    }
}
