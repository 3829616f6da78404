//! Display surface lifecycle.
//!
//! [`DisplaySurfaceManager`] sequences the compositor and the context
//! binding:
//!
//! ```text
//! init_window_system    open connection -> query mode -> add layer (sync)
//!                       -> window handle -> base init
//! create_new_window     binding.create_window(display, handle)
//!                       -> report desktop resolution -> apply configured vsync
//! set_full_screen       check geometry -> release surface -> remove layer
//!                       -> add layer (sync) -> create_new_window -> renderer reset
//! destroy_window_system destroy live surface -> drop handle -> remove layer
//! drop                  destroy_window_system -> close display -> disconnect channel
//! ```
//!
//! Resources are torn down in the reverse order of their creation: the
//! rendering surface before the layer it is bound to, the layer before the
//! display connection.

use std::rc::Rc;

use tracing::{debug, error, info, warn};

use crate::binding::{ContextBinding, BINDING_EXTENSION_PREFIX};
use crate::config::SurfaceConfig;
use crate::connection::DisplayConnection;
use crate::display::{DisplayMode, DisplayService};
use crate::error::SurfaceError;
use crate::geometry::LayerGeometry;
use crate::layer::{CompositorLayer, NativeWindowHandle};
use crate::window_system::{
    DirtyRegion, RenderSystem, ResolutionDescriptor, VSyncMode, WindowSystem, WindowSystemBase,
    WindowSystemKind, DESKTOP_RESOLUTION_INDEX,
};

/// Window system for a single full-screen surface on a fixed-function
/// compositor.
///
/// Not thread-safe: the display service is shared through `Rc` and every
/// operation runs to completion on the calling thread.
pub struct DisplaySurfaceManager<S, B, R, G>
where
    S: DisplayService,
    B: ContextBinding,
    R: RenderSystem,
    G: WindowSystemBase,
{
    service: Rc<S>,
    binding: B,
    renderer: R,
    base: G,
    config: SurfaceConfig,

    connection: Option<Rc<DisplayConnection<S>>>,
    layer: Option<CompositorLayer<S>>,
    window: Option<NativeWindowHandle>,

    width: u32,
    height: u32,
    full_screen: bool,
    window_created: bool,
    vsync_mode: VSyncMode,
    visible: bool,
}

impl<S, B, R, G> DisplaySurfaceManager<S, B, R, G>
where
    S: DisplayService,
    B: ContextBinding,
    R: RenderSystem,
    G: WindowSystemBase,
{
    pub fn new(service: Rc<S>, binding: B, renderer: R, base: G, config: SurfaceConfig) -> Self {
        Self {
            service,
            binding,
            renderer,
            base,
            config,
            connection: None,
            layer: None,
            window: None,
            width: 0,
            height: 0,
            full_screen: false,
            window_created: false,
            vsync_mode: VSyncMode::Disabled,
            visible: true,
        }
    }

    /// Opens the display connection on first use and reuses it afterwards.
    fn open_connection(&mut self) -> Result<Rc<DisplayConnection<S>>, SurfaceError> {
        if let Some(connection) = &self.connection {
            debug!("Reusing open display connection.");
            return Ok(Rc::clone(connection));
        }
        let connection = DisplayConnection::open(Rc::clone(&self.service), self.config.display_id)?;
        self.connection = Some(Rc::clone(&connection));
        Ok(connection)
    }

    /// Drops the window handle, then the layer it points at.
    fn release_layer(&mut self) {
        self.window = None;
        if self.layer.take().is_some() {
            debug!("Compositor layer released.");
        }
    }

    /// Replaces the live layer with one covering `geometry`.
    fn recreate_layer(
        &mut self,
        connection: Rc<DisplayConnection<S>>,
        geometry: LayerGeometry,
    ) -> NativeWindowHandle {
        self.release_layer();
        let layer = CompositorLayer::with_geometry(
            connection,
            self.config.layer,
            self.config.update_priority,
            geometry,
        );
        let window = layer.native_window();
        self.layer = Some(layer);
        self.window = Some(window);
        window
    }

    pub fn window_system_kind(&self) -> WindowSystemKind {
        WindowSystemKind::Egl
    }

    /// Mode queried when the display connection was opened.
    pub fn display_mode(&self) -> Option<DisplayMode> {
        self.connection.as_ref().map(|connection| connection.mode())
    }

    /// Requested window width.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Requested window height.
    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn is_full_screen(&self) -> bool {
        self.full_screen
    }

    /// Whether a rendering surface is live.
    pub fn is_window_created(&self) -> bool {
        self.window_created
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn vsync_mode(&self) -> VSyncMode {
        self.vsync_mode
    }

    pub fn native_window(&self) -> Option<NativeWindowHandle> {
        self.window
    }

    pub fn compositor_layer(&self) -> Option<&CompositorLayer<S>> {
        self.layer.as_ref()
    }

    pub fn config(&self) -> &SurfaceConfig {
        &self.config
    }

    pub fn binding(&self) -> &B {
        &self.binding
    }

    pub fn binding_mut(&mut self) -> &mut B {
        &mut self.binding
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn registry(&self) -> &G {
        &self.base
    }

    pub fn egl_context(&self) -> B::Context {
        self.binding.context()
    }

    pub fn egl_display(&self) -> B::Display {
        self.binding.display()
    }
}

impl<S, B, R, G> WindowSystem for DisplaySurfaceManager<S, B, R, G>
where
    S: DisplayService,
    B: ContextBinding,
    R: RenderSystem,
    G: WindowSystemBase,
{
    type Error = SurfaceError;

    fn init_window_system(&mut self) -> Result<(), SurfaceError> {
        if self.window_created {
            warn!("init_window_system called while a rendering surface is live.");
            return Err(SurfaceError::SurfaceAlreadyLive);
        }

        let connection = self.open_connection()?;
        let mode = connection.mode();
        let geometry = LayerGeometry::full_screen(mode.width, mode.height).map_err(|e| {
            error!("Display mode {} does not fit a compositor layer.", mode);
            e
        })?;
        self.recreate_layer(connection, geometry);

        self.base.init_window_system().map_err(|e| {
            error!("Base window system initialization failed: {}", e);
            SurfaceError::BaseInit(e)
        })?;

        debug!(
            "Video mode: {}x{} with {} bits per pixel.",
            mode.width, mode.height, mode.bit_depth
        );
        Ok(())
    }

    fn destroy_window_system(&mut self) -> Result<(), SurfaceError> {
        if self.window_created {
            if let Err(e) = self.binding.destroy_window() {
                warn!("Rendering surface teardown failed during shutdown: {}", e);
            }
            self.window_created = false;
        }
        self.release_layer();
        Ok(())
    }

    fn create_new_window(
        &mut self,
        width: u32,
        height: u32,
        full_screen: bool,
    ) -> Result<(), SurfaceError> {
        let (Some(connection), Some(window)) = (self.connection.as_ref(), self.window) else {
            error!("create_new_window called before init_window_system.");
            return Err(SurfaceError::NotInitialized);
        };
        if self.window_created {
            return Err(SurfaceError::SurfaceAlreadyLive);
        }
        let display = connection.native_display();

        self.width = width;
        self.height = height;
        self.full_screen = full_screen;

        self.binding.create_window(display, window).map_err(|e| {
            error!("Context binding refused to create a surface: {}", e);
            SurfaceError::WindowCreation(e)
        })?;

        self.base.update_desktop_resolution(
            DESKTOP_RESOLUTION_INDEX,
            ResolutionDescriptor::new(width, height),
        );
        self.window_created = true;
        info!(width, height, full_screen, "Rendering surface created.");

        self.set_vsync(self.config.vsync);
        Ok(())
    }

    fn destroy_window(&mut self) -> Result<(), SurfaceError> {
        self.binding.destroy_window().map_err(|e| {
            error!("Context binding could not destroy the surface: {}", e);
            SurfaceError::WindowDestruction(e)
        })?;
        self.window_created = false;
        debug!("Rendering surface destroyed.");
        Ok(())
    }

    fn resize_window(
        &mut self,
        new_width: u32,
        new_height: u32,
        _new_left: i32,
        _new_top: i32,
    ) -> Result<(), SurfaceError> {
        self.renderer.reset_render_system(new_width, new_height, true, 0.0);
        Ok(())
    }

    fn set_full_screen(
        &mut self,
        full_screen: bool,
        resolution: &ResolutionDescriptor,
        _blank_other_displays: bool,
    ) -> Result<(), SurfaceError> {
        debug!(full_screen, %resolution, "Changing full-screen mode.");
        let Some(connection) = self.connection.clone() else {
            return Err(SurfaceError::NotInitialized);
        };
        // Nothing is torn down for a size the compositor cannot take.
        let geometry =
            LayerGeometry::full_screen(resolution.width, resolution.height).map_err(|e| {
                error!("Resolution {} does not fit a compositor layer.", resolution);
                e
            })?;

        self.width = resolution.width;
        self.height = resolution.height;
        self.full_screen = full_screen;

        self.binding.release_surface();
        self.window_created = false;
        self.recreate_layer(connection, geometry);

        let recreated = self.create_new_window(resolution.width, resolution.height, full_screen);
        if recreated.is_err() {
            warn!("Surface recreation failed; resetting renderer regardless.");
        }

        self.renderer
            .reset_render_system(resolution.width, resolution.height, true, 0.0);
        recreated
    }

    fn update_resolutions(&mut self) {
        self.base.update_resolutions();

        // Only the mode seen at connection time is known; the compositor
        // path offers no mode enumeration.
        if let Some(mode) = self.display_mode() {
            self.base.update_desktop_resolution(
                DESKTOP_RESOLUTION_INDEX,
                ResolutionDescriptor::new(mode.width, mode.height),
            );
        }
    }

    fn is_ext_supported(&self, name: &str) -> bool {
        if name.starts_with(BINDING_EXTENSION_PREFIX) {
            self.binding.is_ext_supported(name)
        } else {
            self.renderer.is_ext_supported(name)
        }
    }

    fn present_render(&mut self, _dirty: &[DirtyRegion]) -> Result<(), SurfaceError> {
        self.binding.swap_buffers();
        Ok(())
    }

    fn set_vsync(&mut self, enable: bool) {
        self.vsync_mode = VSyncMode::from(enable);
        if let Err(e) = self.binding.set_vsync(enable) {
            error!("Could not set vsync: {}", e);
        }
    }

    fn show_os_mouse(&mut self, _show: bool) {}

    fn notify_app_active_change(&mut self, _activated: bool) {}

    fn minimize(&mut self) -> bool {
        self.hide();
        true
    }

    /// Shows the surface but reports `false`.
    fn restore(&mut self) -> bool {
        self.show(true);
        false
    }

    fn hide(&mut self) -> bool {
        self.visible = false;
        true
    }

    fn show(&mut self, _raise: bool) -> bool {
        self.visible = true;
        true
    }
}

impl<S, B, R, G> Drop for DisplaySurfaceManager<S, B, R, G>
where
    S: DisplayService,
    B: ContextBinding,
    R: RenderSystem,
    G: WindowSystemBase,
{
    fn drop(&mut self) {
        // Surface and layer go first; the connection closes once its last
        // reference is released.
        let _ = self.destroy_window_system();
        if self.connection.take().is_some() {
            info!("Display surface manager released its display connection.");
        }
    }
}
