//! The display service contract.
//!
//! [`DisplayService`] is the narrow slice of the compositor firmware API the
//! manager needs: an IPC channel, one opened display, and element updates
//! that are batched and then submitted synchronously. Handles are plain
//! integers, as handed out by the firmware.

use std::fmt;

use crate::error::ServiceError;
use crate::geometry::{FixedRect, Rect};

/// Display mode snapshot taken when the display is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DisplayMode {
    pub width: u32,
    pub height: u32,
    /// Bits per pixel of the framebuffer.
    pub bit_depth: u32,
}

impl DisplayMode {
    pub fn new(width: u32, height: u32, bit_depth: u32) -> Self {
        Self {
            width,
            height,
            bit_depth,
        }
    }
}

impl fmt::Display for DisplayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}@{}bpp", self.width, self.height, self.bit_depth)
    }
}

macro_rules! service_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(pub u32);
    };
}

service_handle!(
    /// Open IPC channel to the display service.
    ChannelHandle
);
service_handle!(
    /// An opened physical display.
    DisplayHandle
);
service_handle!(
    /// A pending batch of element changes.
    UpdateHandle
);
service_handle!(
    /// An element (layer) registered with the compositor.
    ElementHandle
);

/// Compositor/display-service API.
///
/// Methods take `&self`: implementations wrap firmware calls that are
/// handle-based. The API is not thread-safe and callers must serialize use.
pub trait DisplayService {
    /// Opens the IPC channel to the display service.
    fn open_channel(&self) -> Result<ChannelHandle, ServiceError>;

    /// Connects the channel opened by [`open_channel`](Self::open_channel).
    fn connect(&self, channel: ChannelHandle) -> Result<(), ServiceError>;

    /// Starts the display-management service on a connected channel.
    fn init_display_service(&self, channel: ChannelHandle);

    fn open_display(&self, display_id: u32) -> DisplayHandle;

    fn display_info(&self, display: DisplayHandle) -> DisplayMode;

    /// Begins a batch of element changes.
    fn update_start(&self, priority: i32) -> UpdateHandle;

    /// Queues a new element on `layer` within `update`.
    fn element_add(
        &self,
        update: UpdateHandle,
        display: DisplayHandle,
        layer: i32,
        destination: &Rect,
        source: &FixedRect,
    ) -> ElementHandle;

    /// Queues removal of `element` within `update`.
    fn element_remove(&self, update: UpdateHandle, element: ElementHandle);

    /// Submits `update` and blocks until the compositor has applied it.
    fn update_submit_sync(&self, update: UpdateHandle);

    fn close_display(&self, display: DisplayHandle);

    fn disconnect(&self, channel: ChannelHandle);
}
