//! Full-screen compositor layer and the native window handle bound to it.

use std::fmt;
use std::rc::Rc;

use tracing::debug;

use crate::connection::DisplayConnection;
use crate::display::{DisplayService, ElementHandle};
use crate::error::SurfaceError;
use crate::geometry::{FixedRect, LayerGeometry, Rect};

/// What the context binding needs to bind a rendering surface to a layer.
///
/// Passed to the binding by value. It is only valid while the layer it was
/// derived from is alive; the manager discards its copy together with the
/// layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NativeWindowHandle {
    pub element: ElementHandle,
    pub width: u32,
    pub height: u32,
}

/// A full-screen element registered with the hardware compositor.
///
/// Creation and removal are each submitted synchronously, so once
/// [`create`](Self::create) returns the compositor already shows the layer.
/// Dropping the layer removes the element.
pub struct CompositorLayer<S: DisplayService> {
    connection: Rc<DisplayConnection<S>>,
    element: ElementHandle,
    layer: i32,
    priority: i32,
    geometry: LayerGeometry,
}

impl<S: DisplayService> CompositorLayer<S> {
    /// Registers a `width` x `height` full-screen element on `layer` and
    /// waits until the compositor has applied it.
    pub fn create(
        connection: Rc<DisplayConnection<S>>,
        layer: i32,
        priority: i32,
        width: u32,
        height: u32,
    ) -> Result<Self, SurfaceError> {
        let geometry = LayerGeometry::full_screen(width, height)?;
        Ok(Self::with_geometry(connection, layer, priority, geometry))
    }

    /// Registers an element with already validated `geometry`.
    ///
    /// Removal on drop is submitted with the same `priority`.
    pub fn with_geometry(
        connection: Rc<DisplayConnection<S>>,
        layer: i32,
        priority: i32,
        geometry: LayerGeometry,
    ) -> Self {
        let service = connection.service();
        let update = service.update_start(priority);
        let element = service.element_add(
            update,
            connection.display(),
            layer,
            &geometry.destination,
            &geometry.source,
        );
        service.update_submit_sync(update);
        debug!(
            ?element,
            layer,
            width = geometry.width(),
            height = geometry.height(),
            "Compositor layer created."
        );

        Self {
            connection,
            element,
            layer,
            priority,
            geometry,
        }
    }

    pub fn native_window(&self) -> NativeWindowHandle {
        NativeWindowHandle {
            element: self.element,
            width: self.geometry.width(),
            height: self.geometry.height(),
        }
    }

    pub fn element(&self) -> ElementHandle {
        self.element
    }

    pub fn layer(&self) -> i32 {
        self.layer
    }

    /// Priority used for this layer's compositor updates.
    pub fn priority(&self) -> i32 {
        self.priority
    }

    pub fn geometry(&self) -> LayerGeometry {
        self.geometry
    }

    pub fn destination(&self) -> Rect {
        self.geometry.destination
    }

    pub fn source(&self) -> FixedRect {
        self.geometry.source
    }
}

impl<S: DisplayService> fmt::Debug for CompositorLayer<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositorLayer")
            .field("element", &self.element)
            .field("layer", &self.layer)
            .field("priority", &self.priority)
            .field("geometry", &self.geometry)
            .finish_non_exhaustive()
    }
}

impl<S: DisplayService> Drop for CompositorLayer<S> {
    fn drop(&mut self) {
        let service = self.connection.service();
        let update = service.update_start(self.priority);
        service.element_remove(update, self.element);
        service.update_submit_sync(update);
        debug!(element = ?self.element, "Compositor layer removed.");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::DisplayMode;
    use crate::headless::HeadlessDisplayService;

    fn connection() -> (Rc<HeadlessDisplayService>, Rc<DisplayConnection<HeadlessDisplayService>>) {
        let service = Rc::new(HeadlessDisplayService::new(DisplayMode::new(800, 480, 16)));
        let connection = DisplayConnection::open(Rc::clone(&service), 0).unwrap();
        (service, connection)
    }

    #[test]
    fn layer_is_visible_as_soon_as_create_returns() {
        let (service, connection) = connection();
        let layer = CompositorLayer::create(connection, 0, 0, 800, 480).unwrap();

        let visible = service.visible_elements();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].element, layer.element());
        assert_eq!(visible[0].destination, Rect::new(0, 0, 800, 480));
        assert_eq!(visible[0].source.width, 800 << 16);
    }

    #[test]
    fn native_window_mirrors_layer_geometry() {
        let (_service, connection) = connection();
        let layer = CompositorLayer::create(connection, 3, 0, 640, 360).unwrap();
        let window = layer.native_window();
        assert_eq!(window.element, layer.element());
        assert_eq!((window.width, window.height), (640, 360));
        assert_eq!(layer.layer(), 3);
    }

    #[test]
    fn dropping_layer_removes_element_before_connection_closes() {
        let (service, connection) = connection();
        let layer = CompositorLayer::create(Rc::clone(&connection), 0, 0, 800, 480).unwrap();
        drop(connection);
        // The layer still holds the connection open.
        assert_eq!(service.open_displays(), 1);

        drop(layer);
        assert!(service.visible_elements().is_empty());
        assert_eq!(service.open_displays(), 0);
    }

    #[test]
    fn removal_reuses_creation_priority() {
        let (service, connection) = connection();
        let layer = CompositorLayer::create(connection, 0, 7, 800, 480).unwrap();
        assert_eq!(layer.priority(), 7);

        drop(layer);
        assert_eq!(service.update_priorities(), vec![7, 7]);
    }

    #[test]
    fn oversized_layer_never_reaches_the_compositor() {
        let (service, connection) = connection();
        let calls_before = service.calls().len();
        let err = CompositorLayer::create(connection, 0, 0, 1 << 15, 480).unwrap_err();
        assert!(matches!(err, SurfaceError::Geometry { .. }));
        assert_eq!(service.calls().len(), calls_before);
    }
}
