//! PBR model viewer
//!
//! Loads `viewer.toml` (or the file given as the first argument), opens a
//! window and renders the configured model under a gradient sky. WASD moves,
//! the mouse looks around, the wheel zooms and Escape quits.

mod input;

use std::path::PathBuf;

use render_core::config::{Config, ViewerConfig};
use render_core::foundation::time::FrameTimer;
use render_core::render::vulkan::{FrameStatus, Window};
use render_core::render::ForwardRenderer;
use render_core::scene::Camera;

use input::{apply_movement, CameraController, InputState};

const DEFAULT_CONFIG_PATH: &str = "viewer.toml";

/// Configuration plus the file it came from, if any
fn load_config() -> Result<(ViewerConfig, Option<PathBuf>), Box<dyn std::error::Error>> {
    let explicit = std::env::args().nth(1).map(PathBuf::from);
    let path = explicit.clone().unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));

    let (config, source) = if path.exists() {
        (ViewerConfig::load_from_file(&path)?, Some(path))
    } else if explicit.is_some() {
        return Err(format!("config file {} not found", path.display()).into());
    } else {
        (ViewerConfig::default(), None)
    };
    config.validate()?;
    Ok((config, source))
}

fn run(config: &ViewerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let mut window = Window::new(&config.window)?;
    let mut renderer = ForwardRenderer::new(&mut window, &config.renderer)?;
    renderer.load_scene(&config.scene)?;

    let mut camera = Camera::default();
    let mut input = InputState::default();
    let mut timer = FrameTimer::new();

    log::info!("Renderer initialized, entering main loop");
    while !window.should_close() {
        window.poll_events();
        window.dispatch_events(&mut CameraController::new(&mut camera, &mut input));

        if input.quit {
            window.set_should_close(true);
            break;
        }
        if std::mem::take(&mut input.resized) {
            renderer.request_resize();
        }

        let delta_time = timer.tick();
        apply_movement(&mut camera, delta_time, |key| window.is_key_pressed(key));

        if let FrameStatus::Skipped = renderer.draw_frame(&mut window, &camera)? {
            log::debug!("Frame skipped while the swapchain was rebuilt");
        }
    }

    renderer.wait_idle()?;
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (config, source) = load_config()?;

    env_logger::Builder::from_default_env()
        .parse_filters(&std::env::var("RUST_LOG").unwrap_or_else(|_| config.log_level.clone()))
        .init();

    match source {
        Some(path) => log::info!("Configuration loaded from {}", path.display()),
        None => log::info!("No {DEFAULT_CONFIG_PATH} found, using default configuration"),
    }
    log::info!("Starting {}", config.window.title);
    if let Err(e) = run(&config) {
        log::error!("Viewer error: {e}");
        return Err(e);
    }
    log::info!("Viewer shut down cleanly");
    Ok(())
}
