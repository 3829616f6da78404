//! # NovaDE display surface (`novade-display-surface`)
//!
//! Window system for embedded targets whose display is driven by a
//! fixed-function compositor: no window manager, one full-screen layer, an
//! EGL-style context binding on top.
//!
//! The crate is organised around [`DisplaySurfaceManager`], which owns the
//! display connection, the compositor layer and the native window handle,
//! and implements the [`WindowSystem`] contract the render loop drives.
//! Everything it talks to is a trait:
//!
//! - [`DisplayService`]: the compositor firmware API (channel, display,
//!   synchronous element updates).
//! - [`ContextBinding`]: creates and presents the rendering surface.
//! - [`RenderSystem`]: renderer base reconfigured on geometry changes.
//! - [`WindowSystemBase`]: base initializer and resolution registry.
//!
//! The [`headless`] module implements all four in memory.
//!
//! ```rust,ignore
//! use std::rc::Rc;
//! use novade_display_surface::headless::*;
//! use novade_display_surface::{DisplaySurfaceManager, SurfaceConfig, WindowSystem};
//!
//! let service = Rc::new(HeadlessDisplayService::default());
//! let mut manager = DisplaySurfaceManager::new(
//!     service,
//!     HeadlessBinding::default(),
//!     HeadlessRenderer::default(),
//!     DesktopResolutions::new(),
//!     SurfaceConfig::default(),
//! );
//! manager.init_window_system()?;
//! let mode = manager.display_mode().unwrap();
//! manager.create_new_window(mode.width, mode.height, true)?;
//! manager.present_render(&[])?;
//! ```

pub mod binding;
pub mod config;
pub mod connection;
pub mod display;
pub mod error;
pub mod geometry;
pub mod headless;
pub mod layer;
pub mod logging;
pub mod manager;
pub mod window_system;

pub use binding::{ContextBinding, NativeDisplay, BINDING_EXTENSION_PREFIX};
pub use config::{LoggingConfig, SurfaceConfig};
pub use connection::DisplayConnection;
pub use display::{
    ChannelHandle, DisplayHandle, DisplayMode, DisplayService, ElementHandle, UpdateHandle,
};
pub use error::{BaseInitError, BindingError, ConfigError, LoggingError, ServiceError, SurfaceError};
pub use geometry::{FixedRect, LayerGeometry, Rect};
pub use layer::{CompositorLayer, NativeWindowHandle};
pub use logging::{init_logging, init_minimal_logging};
pub use manager::DisplaySurfaceManager;
pub use window_system::{
    DirtyRegion, RenderSystem, ResolutionDescriptor, VSyncMode, WindowSystem, WindowSystemBase,
    WindowSystemKind, DESKTOP_RESOLUTION_INDEX,
};
