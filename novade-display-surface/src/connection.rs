//! Reference-counted connection to the display service.

use std::fmt;
use std::rc::Rc;

use tracing::{debug, error, info};

use crate::binding::NativeDisplay;
use crate::display::{ChannelHandle, DisplayHandle, DisplayMode, DisplayService};
use crate::error::SurfaceError;

/// An open, connected display-service channel plus the opened display.
///
/// Shared through `Rc`: the manager holds one reference and every live
/// [`CompositorLayer`](crate::CompositorLayer) holds another, so the display
/// is only closed after the last layer is gone. Dropping the final reference
/// closes the display and then disconnects the channel.
pub struct DisplayConnection<S: DisplayService> {
    service: Rc<S>,
    channel: ChannelHandle,
    display: DisplayHandle,
    display_id: u32,
    mode: DisplayMode,
}

impl<S: DisplayService> DisplayConnection<S> {
    /// Opens the channel, connects it, starts the display service and opens
    /// `display_id`, taking a snapshot of its current mode.
    pub fn open(service: Rc<S>, display_id: u32) -> Result<Rc<Self>, SurfaceError> {
        let channel = service.open_channel().map_err(|e| {
            error!("Failed to open display service channel: {}", e);
            SurfaceError::ChannelOpen(e)
        })?;

        service.connect(channel).map_err(|e| {
            error!("Display service connection failed: {}", e);
            SurfaceError::ChannelConnect(e)
        })?;

        service.init_display_service(channel);
        let display = service.open_display(display_id);
        let mode = service.display_info(display);
        info!(display_id, %mode, "Display connection opened.");

        Ok(Rc::new(Self {
            service,
            channel,
            display,
            display_id,
            mode,
        }))
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    pub fn display(&self) -> DisplayHandle {
        self.display
    }

    pub fn display_id(&self) -> u32 {
        self.display_id
    }

    /// Mode queried when the display was opened.
    pub fn mode(&self) -> DisplayMode {
        self.mode
    }

    /// Native display token handed to the context binding.
    ///
    /// The firmware EGL exposes a single display, so this is always
    /// [`NativeDisplay::DEFAULT`].
    pub fn native_display(&self) -> NativeDisplay {
        NativeDisplay::DEFAULT
    }
}

impl<S: DisplayService> fmt::Debug for DisplayConnection<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DisplayConnection")
            .field("channel", &self.channel)
            .field("display", &self.display)
            .field("display_id", &self.display_id)
            .field("mode", &self.mode)
            .finish()
    }
}

impl<S: DisplayService> Drop for DisplayConnection<S> {
    fn drop(&mut self) {
        debug!("Closing display {}...", self.display_id);
        self.service.close_display(self.display);
        self.service.disconnect(self.channel);
        info!("Display connection closed.");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::{HeadlessDisplayService, ServiceCall};

    #[test]
    fn open_queries_mode_once_and_drop_closes_in_reverse() {
        let service = Rc::new(HeadlessDisplayService::new(DisplayMode::new(1280, 720, 16)));
        let connection = DisplayConnection::open(Rc::clone(&service), 2).unwrap();
        assert_eq!(connection.mode(), DisplayMode::new(1280, 720, 16));
        assert_eq!(connection.display_id(), 2);
        assert_eq!(service.open_displays(), 1);

        drop(connection);
        assert_eq!(service.open_displays(), 0);
        assert!(!service.is_connected());

        let calls = service.calls();
        let tail = &calls[calls.len() - 2..];
        assert!(matches!(tail[0], ServiceCall::CloseDisplay(_)));
        assert!(matches!(tail[1], ServiceCall::Disconnect(_)));
    }

    #[test]
    fn channel_open_failure_stops_before_connect() {
        let service = Rc::new(HeadlessDisplayService::default().failing_channel_open());
        let err = DisplayConnection::open(Rc::clone(&service), 0).unwrap_err();
        assert!(matches!(err, SurfaceError::ChannelOpen(_)));
        assert_eq!(service.calls(), vec![ServiceCall::OpenChannel]);
    }

    #[test]
    fn connect_failure_is_reported_and_display_never_opened() {
        let service = Rc::new(HeadlessDisplayService::default().failing_connect());
        let err = DisplayConnection::open(Rc::clone(&service), 0).unwrap_err();
        assert!(matches!(err, SurfaceError::ChannelConnect(_)));
        assert_eq!(service.open_displays(), 0);
    }
}
