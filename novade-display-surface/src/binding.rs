//! Context-binding capability.
//!
//! The binding owns the accelerated rendering surface and context (EGL on
//! the target). The manager never touches the surface directly; it only asks
//! the binding to create, release, present and reconfigure it.

use crate::error::BindingError;
use crate::layer::NativeWindowHandle;

/// Extension names in this namespace are answered by the context binding.
pub const BINDING_EXTENSION_PREFIX: &str = "EGL_";

/// Native display token passed to the binding alongside the window handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NativeDisplay(pub usize);

impl NativeDisplay {
    /// The platform's default display (`EGL_DEFAULT_DISPLAY`).
    pub const DEFAULT: NativeDisplay = NativeDisplay(0);
}

pub trait ContextBinding {
    /// Rendering context handle exposed to renderers.
    type Context: Copy;
    /// Binding-level display handle exposed to renderers.
    type Display: Copy;

    /// Creates the rendering surface bound to `window`.
    fn create_window(
        &mut self,
        display: NativeDisplay,
        window: NativeWindowHandle,
    ) -> Result<(), BindingError>;

    /// Destroys the rendering surface and its context.
    fn destroy_window(&mut self) -> Result<(), BindingError>;

    /// Releases the rendering surface without tearing the context down.
    fn release_surface(&mut self);

    fn swap_buffers(&mut self);

    fn set_vsync(&mut self, enable: bool) -> Result<(), BindingError>;

    fn is_ext_supported(&self, name: &str) -> bool;

    fn context(&self) -> Self::Context;

    fn display(&self) -> Self::Display;
}
