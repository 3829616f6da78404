#![allow(dead_code)]

use std::rc::Rc;

use novade_display_surface::headless::{
    DesktopResolutions, HeadlessBinding, HeadlessDisplayService, HeadlessRenderer, Journal,
};
use novade_display_surface::{DisplayMode, DisplaySurfaceManager, SurfaceConfig};

pub type HeadlessManager = DisplaySurfaceManager<
    HeadlessDisplayService,
    HeadlessBinding,
    HeadlessRenderer,
    DesktopResolutions,
>;

pub const FULL_HD: DisplayMode = DisplayMode {
    width: 1920,
    height: 1080,
    bit_depth: 32,
};

/// A manager wired to headless collaborators that share one journal.
pub struct Rig {
    pub journal: Journal,
    pub service: Rc<HeadlessDisplayService>,
    pub manager: HeadlessManager,
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

pub fn rig() -> Rig {
    rig_with(HeadlessDisplayService::new(FULL_HD), DesktopResolutions::new())
}

pub fn rig_with(service: HeadlessDisplayService, base: DesktopResolutions) -> Rig {
    rig_configured(service, base, SurfaceConfig::default())
}

pub fn rig_configured(
    service: HeadlessDisplayService,
    base: DesktopResolutions,
    config: SurfaceConfig,
) -> Rig {
    init_tracing();
    let journal = Journal::new();
    let service = Rc::new(service.with_journal(journal.clone()));
    let manager = DisplaySurfaceManager::new(
        Rc::clone(&service),
        HeadlessBinding::default().with_journal(journal.clone()),
        HeadlessRenderer::default().with_journal(journal.clone()),
        base.with_journal(journal.clone()),
        config,
    );
    Rig {
        journal,
        service,
        manager,
    }
}
