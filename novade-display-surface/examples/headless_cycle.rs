//! Drives a full surface lifecycle against the headless backend.
//!
//! Usage: `headless_cycle [config.toml]`

use std::rc::Rc;

use anyhow::Context;
use novade_display_surface::headless::{
    DesktopResolutions, HeadlessBinding, HeadlessDisplayService, HeadlessRenderer,
};
use novade_display_surface::{
    init_logging, DisplaySurfaceManager, ResolutionDescriptor, SurfaceConfig, WindowSystem,
};
use tracing::info;

fn main() -> anyhow::Result<()> {
    let config = match std::env::args().nth(1) {
        Some(path) => SurfaceConfig::load(&path).with_context(|| format!("loading {}", path))?,
        None => SurfaceConfig::default(),
    };
    init_logging(&config.logging)?;

    let service = Rc::new(HeadlessDisplayService::default());
    let mut manager = DisplaySurfaceManager::new(
        Rc::clone(&service),
        HeadlessBinding::default(),
        HeadlessRenderer::default(),
        DesktopResolutions::new(),
        config,
    );

    manager.init_window_system()?;
    let mode = manager.display_mode().context("no display mode after init")?;
    info!(%mode, "Display connected.");

    manager.create_new_window(mode.width, mode.height, true)?;
    info!(vsync = ?manager.vsync_mode(), "Surface ready.");
    for _ in 0..3 {
        manager.present_render(&[])?;
    }

    manager.set_full_screen(true, &ResolutionDescriptor::new(1280, 720), false)?;
    manager.present_render(&[])?;
    info!(
        swaps = manager.binding().swaps(),
        visible = service.visible_elements().len(),
        "Frames presented."
    );

    manager.destroy_window()?;
    manager.destroy_window_system()?;
    drop(manager);

    info!(connected = service.is_connected(), "Shut down.");
    Ok(())
}
