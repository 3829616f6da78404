//! Window-system contracts shared with the rest of the application.
//!
//! [`WindowSystem`] is what the rendering loop drives. [`WindowSystemBase`]
//! and [`RenderSystem`] are the generic base layers the manager delegates to.

use std::fmt;

use crate::error::BaseInitError;

/// Registry slot holding the desktop resolution.
pub const DESKTOP_RESOLUTION_INDEX: usize = 0;

/// A resolution reported to the registry.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ResolutionDescriptor {
    pub width: u32,
    pub height: u32,
    /// Always `0.0` on this platform; the compositor path does not expose it.
    pub refresh_rate: f32,
}

impl ResolutionDescriptor {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            refresh_rate: 0.0,
        }
    }
}

impl fmt::Display for ResolutionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{} @ {:.2}Hz", self.width, self.height, self.refresh_rate)
    }
}

/// Screen region touched since the last present.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DirtyRegion {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Vertical-sync mode code as read by the settings registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum VSyncMode {
    #[default]
    Disabled,
    Enabled,
}

impl VSyncMode {
    pub fn code(self) -> i32 {
        match self {
            VSyncMode::Disabled => 0,
            VSyncMode::Enabled => 10,
        }
    }
}

impl From<bool> for VSyncMode {
    fn from(enable: bool) -> Self {
        if enable {
            VSyncMode::Enabled
        } else {
            VSyncMode::Disabled
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WindowSystemKind {
    Egl,
}

/// Generic window-system bookkeeping: base initialization and the
/// resolution registry.
pub trait WindowSystemBase {
    fn init_window_system(&mut self) -> Result<(), BaseInitError>;

    /// Refreshes the registry's own resolution entries.
    fn update_resolutions(&mut self);

    fn update_desktop_resolution(&mut self, index: usize, resolution: ResolutionDescriptor);
}

/// Renderer base the window system reconfigures on geometry changes.
pub trait RenderSystem {
    fn reset_render_system(
        &mut self,
        width: u32,
        height: u32,
        full_screen: bool,
        refresh_rate: f32,
    );

    fn is_ext_supported(&self, name: &str) -> bool;
}

/// Window-system operations driven by the rendering and presentation loop.
pub trait WindowSystem {
    type Error;

    fn init_window_system(&mut self) -> Result<(), Self::Error>;

    fn destroy_window_system(&mut self) -> Result<(), Self::Error>;

    fn create_new_window(
        &mut self,
        width: u32,
        height: u32,
        full_screen: bool,
    ) -> Result<(), Self::Error>;

    fn destroy_window(&mut self) -> Result<(), Self::Error>;

    fn resize_window(
        &mut self,
        new_width: u32,
        new_height: u32,
        new_left: i32,
        new_top: i32,
    ) -> Result<(), Self::Error>;

    fn set_full_screen(
        &mut self,
        full_screen: bool,
        resolution: &ResolutionDescriptor,
        blank_other_displays: bool,
    ) -> Result<(), Self::Error>;

    fn update_resolutions(&mut self);

    fn is_ext_supported(&self, name: &str) -> bool;

    fn present_render(&mut self, dirty: &[DirtyRegion]) -> Result<(), Self::Error>;

    fn set_vsync(&mut self, enable: bool);

    fn show_os_mouse(&mut self, show: bool);

    fn notify_app_active_change(&mut self, activated: bool);

    fn minimize(&mut self) -> bool;

    fn restore(&mut self) -> bool;

    fn hide(&mut self) -> bool;

    fn show(&mut self, raise: bool) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vsync_codes() {
        assert_eq!(VSyncMode::from(true).code(), 10);
        assert_eq!(VSyncMode::from(false).code(), 0);
        assert_eq!(VSyncMode::default(), VSyncMode::Disabled);
    }

    #[test]
    fn resolution_refresh_rate_is_unmeasured() {
        let res = ResolutionDescriptor::new(1920, 1080);
        assert_eq!(res.refresh_rate, 0.0);
        assert_eq!(res.to_string(), "1920x1080 @ 0.00Hz");
    }
}
