//! Sandbox application
//!
//! Runs the demo scene either in a GLFW window or, with `--headless`, for a
//! fixed number of scripted frames.
//!
//! ```text
//! sandbox [--headless] [--frames N] [--config path/to/app.toml]
//! ```

mod debug_overlay;
mod scene_layer;

use std::env;

use calibur_engine::events::{KeyPressedEvent, WindowResizeEvent};
use calibur_engine::foundation::logging;
use calibur_engine::prelude::*;

use debug_overlay::DebugOverlay;
use scene_layer::SceneLayer;

const DEFAULT_HEADLESS_FRAMES: u64 = 240;

struct Options {
    headless: bool,
    frames: u64,
    config_path: Option<String>,
}

fn parse_options() -> Result<Options, AppError> {
    let mut options = Options {
        headless: false,
        frames: DEFAULT_HEADLESS_FRAMES,
        config_path: None,
    };

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--headless" => options.headless = true,
            "--frames" => {
                let value = args.next().unwrap_or_default();
                options.frames = value.parse().map_err(|_| {
                    AppError::Custom(format!("--frames expects a number, got '{value}'"))
                })?;
            }
            "--config" => options.config_path = args.next(),
            other => return Err(AppError::Custom(format!("unknown argument '{other}'"))),
        }
    }
    Ok(options)
}

fn load_config(options: &Options) -> Result<ApplicationConfig, AppError> {
    match &options.config_path {
        Some(path) => Ok(ApplicationConfig::load_from_file(path)?),
        None => Ok(ApplicationConfig::default()),
    }
}

fn push_layers(app: &mut Application) -> Result<(), AppError> {
    let scene_config = app.config().scene.clone();
    app.push_layer(Box::new(SceneLayer::new(scene_config)))?;
    app.push_overlay(Box::new(DebugOverlay::new()))?;
    Ok(())
}

fn run_headless(config: ApplicationConfig, frames: u64) -> Result<(), AppError> {
    let (width, height) = (config.window.width, config.window.height);
    let (mut app, window, probe) = Application::headless(config)?;
    // Nothing reads the log, only the command count
    probe.set_recording(false);
    push_layers(&mut app)?;

    // Minimize and restore halfway through, then close with Escape
    for frame in 0..frames {
        let events: Vec<Event> = match frame {
            f if f == frames / 2 => vec![WindowResizeEvent { width: 0, height: 0 }.into()],
            f if f == frames / 2 + 1 => vec![WindowResizeEvent { width, height }.into()],
            f if f + 1 == frames => {
                vec![KeyPressedEvent { key: KeyCode::Escape, repeat_count: 0 }.into()]
            }
            _ => Vec::new(),
        };
        window.push_frame(events);
    }
    // Fallback in case Escape landed in a minimized frame
    window.push_frame(vec![Event::from(WindowCloseEvent)]);

    app.run()?;
    log::info!(
        "Headless run finished: {} frames presented, {} backend commands recorded",
        window.swap_count(),
        probe.total_commands()
    );
    app.shutdown();
    Ok(())
}

fn run_windowed(config: ApplicationConfig) -> Result<(), AppError> {
    let backend = Box::new(HeadlessRendererApi::without_recording());
    let mut app = Application::with_glfw(config, backend)?;
    push_layers(&mut app)?;
    app.run()?;
    app.shutdown();
    Ok(())
}

fn run() -> Result<(), AppError> {
    let options = parse_options()?;
    let config = load_config(&options)?;
    logging::init(config.log_filter());
    if let Some(path) = &options.config_path {
        log::info!("Loaded configuration from {path}");
    }

    if options.headless {
        run_headless(config, options.frames.max(1))
    } else {
        run_windowed(config)
    }
}

fn main() {
    if let Err(e) = run() {
        // Startup may fail before the configured logger exists
        logging::init("error");
        log::error!("Sandbox failed: {e}");
        std::process::exit(1);
    }
}
