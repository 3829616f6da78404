//! In-memory backend for running the window system without display hardware.
//!
//! Every collaborator trait has a headless implementation here. The
//! compositor model is deliberately literal: element changes queued on an
//! update only become visible when the update is submitted, which is the
//! barrier the manager relies on before binding a rendering surface.
//!
//! Each type can record into a shared [`Journal`] so that the relative order
//! of compositor and binding calls can be inspected afterwards.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use tracing::{debug, trace};

use crate::binding::{ContextBinding, NativeDisplay};
use crate::display::{
    ChannelHandle, DisplayHandle, DisplayMode, DisplayService, ElementHandle, UpdateHandle,
};
use crate::error::{BaseInitError, BindingError, ServiceError};
use crate::geometry::{FixedRect, Rect};
use crate::layer::NativeWindowHandle;
use crate::window_system::{RenderSystem, ResolutionDescriptor, WindowSystemBase};

/// A call made on [`HeadlessDisplayService`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceCall {
    OpenChannel,
    Connect(ChannelHandle),
    InitDisplayService(ChannelHandle),
    OpenDisplay(u32),
    DisplayInfo(DisplayHandle),
    UpdateStart(UpdateHandle),
    ElementAdd {
        element: ElementHandle,
        layer: i32,
        destination: Rect,
        source: FixedRect,
    },
    ElementRemove(ElementHandle),
    SubmitSync(UpdateHandle),
    CloseDisplay(DisplayHandle),
    Disconnect(ChannelHandle),
}

/// A call made on [`HeadlessBinding`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindingCall {
    CreateWindow(NativeWindowHandle),
    DestroyWindow,
    ReleaseSurface,
    SwapBuffers,
    SetVSync(bool),
}

/// A call made on [`HeadlessRenderer`] or [`DesktopResolutions`].
#[derive(Debug, Clone, PartialEq)]
pub enum BaseCall {
    InitWindowSystem,
    UpdateResolutions,
    UpdateDesktopResolution(usize, ResolutionDescriptor),
    ResetRenderSystem(RenderReset),
}

#[derive(Debug, Clone, PartialEq)]
pub enum JournalEntry {
    Service(ServiceCall),
    Binding(BindingCall),
    Base(BaseCall),
}

/// Ordered record shared between headless collaborators.
#[derive(Debug, Clone, Default)]
pub struct Journal(Rc<RefCell<Vec<JournalEntry>>>);

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, entry: JournalEntry) {
        self.0.borrow_mut().push(entry);
    }

    pub fn entries(&self) -> Vec<JournalEntry> {
        self.0.borrow().clone()
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }

    pub fn service_calls(&self) -> Vec<ServiceCall> {
        self.0
            .borrow()
            .iter()
            .filter_map(|entry| match entry {
                JournalEntry::Service(call) => Some(call.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn binding_calls(&self) -> Vec<BindingCall> {
        self.0
            .borrow()
            .iter()
            .filter_map(|entry| match entry {
                JournalEntry::Binding(call) => Some(call.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn base_calls(&self) -> Vec<BaseCall> {
        self.0
            .borrow()
            .iter()
            .filter_map(|entry| match entry {
                JournalEntry::Base(call) => Some(call.clone()),
                _ => None,
            })
            .collect()
    }
}

/// An element the headless compositor is currently showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeadlessElement {
    pub element: ElementHandle,
    pub display: DisplayHandle,
    pub layer: i32,
    pub destination: Rect,
    pub source: FixedRect,
}

#[derive(Debug)]
enum PendingChange {
    Add(HeadlessElement),
    Remove(ElementHandle),
}

#[derive(Debug, Default)]
struct CompositorState {
    next_handle: u32,
    pending: BTreeMap<UpdateHandle, Vec<PendingChange>>,
    visible: BTreeMap<ElementHandle, HeadlessElement>,
    open_displays: u32,
    connected: bool,
    submitted_updates: u32,
    update_priorities: Vec<i32>,
}

impl CompositorState {
    fn next_handle(&mut self) -> u32 {
        self.next_handle += 1;
        self.next_handle
    }
}

/// Compositor with a fixed display mode and no hardware behind it.
#[derive(Debug)]
pub struct HeadlessDisplayService {
    mode: DisplayMode,
    fail_channel_open: bool,
    fail_connect: bool,
    journal: Journal,
    state: RefCell<CompositorState>,
}

impl Default for HeadlessDisplayService {
    fn default() -> Self {
        Self::new(DisplayMode::new(1920, 1080, 32))
    }
}

impl HeadlessDisplayService {
    pub fn new(mode: DisplayMode) -> Self {
        Self {
            mode,
            fail_channel_open: false,
            fail_connect: false,
            journal: Journal::new(),
            state: RefCell::new(CompositorState::default()),
        }
    }

    /// Records into `journal` instead of a private one.
    pub fn with_journal(mut self, journal: Journal) -> Self {
        self.journal = journal;
        self
    }

    /// Makes `open_channel` fail.
    pub fn failing_channel_open(mut self) -> Self {
        self.fail_channel_open = true;
        self
    }

    /// Makes `connect` fail.
    pub fn failing_connect(mut self) -> Self {
        self.fail_connect = true;
        self
    }

    pub fn journal(&self) -> &Journal {
        &self.journal
    }

    pub fn calls(&self) -> Vec<ServiceCall> {
        self.journal.service_calls()
    }

    /// Elements applied by a submitted update, ordered by handle.
    pub fn visible_elements(&self) -> Vec<HeadlessElement> {
        self.state.borrow().visible.values().copied().collect()
    }

    pub fn open_displays(&self) -> u32 {
        self.state.borrow().open_displays
    }

    pub fn is_connected(&self) -> bool {
        self.state.borrow().connected
    }

    pub fn submitted_updates(&self) -> u32 {
        self.state.borrow().submitted_updates
    }

    /// Priority of every update started, in order.
    pub fn update_priorities(&self) -> Vec<i32> {
        self.state.borrow().update_priorities.clone()
    }

    /// Updates started but never submitted.
    pub fn pending_updates(&self) -> usize {
        self.state.borrow().pending.len()
    }

    fn record(&self, call: ServiceCall) {
        trace!(?call, "headless display service");
        self.journal.push(JournalEntry::Service(call));
    }
}

impl DisplayService for HeadlessDisplayService {
    fn open_channel(&self) -> Result<ChannelHandle, ServiceError> {
        self.record(ServiceCall::OpenChannel);
        if self.fail_channel_open {
            return Err(ServiceError::new("vchi_initialise", -1));
        }
        Ok(ChannelHandle(self.state.borrow_mut().next_handle()))
    }

    fn connect(&self, channel: ChannelHandle) -> Result<(), ServiceError> {
        self.record(ServiceCall::Connect(channel));
        if self.fail_connect {
            return Err(ServiceError::new("vchi_connect", -1));
        }
        self.state.borrow_mut().connected = true;
        Ok(())
    }

    fn init_display_service(&self, channel: ChannelHandle) {
        self.record(ServiceCall::InitDisplayService(channel));
    }

    fn open_display(&self, display_id: u32) -> DisplayHandle {
        self.record(ServiceCall::OpenDisplay(display_id));
        let mut state = self.state.borrow_mut();
        state.open_displays += 1;
        DisplayHandle(state.next_handle())
    }

    fn display_info(&self, display: DisplayHandle) -> DisplayMode {
        self.record(ServiceCall::DisplayInfo(display));
        self.mode
    }

    fn update_start(&self, priority: i32) -> UpdateHandle {
        let update = {
            let mut state = self.state.borrow_mut();
            let update = UpdateHandle(state.next_handle());
            state.pending.insert(update, Vec::new());
            state.update_priorities.push(priority);
            update
        };
        self.record(ServiceCall::UpdateStart(update));
        update
    }

    fn element_add(
        &self,
        update: UpdateHandle,
        display: DisplayHandle,
        layer: i32,
        destination: &Rect,
        source: &FixedRect,
    ) -> ElementHandle {
        let element = {
            let mut state = self.state.borrow_mut();
            let element = ElementHandle(state.next_handle());
            let added = HeadlessElement {
                element,
                display,
                layer,
                destination: *destination,
                source: *source,
            };
            state.pending.entry(update).or_default().push(PendingChange::Add(added));
            element
        };
        self.record(ServiceCall::ElementAdd {
            element,
            layer,
            destination: *destination,
            source: *source,
        });
        element
    }

    fn element_remove(&self, update: UpdateHandle, element: ElementHandle) {
        self.state
            .borrow_mut()
            .pending
            .entry(update)
            .or_default()
            .push(PendingChange::Remove(element));
        self.record(ServiceCall::ElementRemove(element));
    }

    fn update_submit_sync(&self, update: UpdateHandle) {
        {
            let mut state = self.state.borrow_mut();
            let changes = state.pending.remove(&update).unwrap_or_default();
            for change in changes {
                match change {
                    PendingChange::Add(element) => {
                        state.visible.insert(element.element, element);
                    }
                    PendingChange::Remove(element) => {
                        state.visible.remove(&element);
                    }
                }
            }
            state.submitted_updates += 1;
        }
        self.record(ServiceCall::SubmitSync(update));
    }

    fn close_display(&self, display: DisplayHandle) {
        {
            let mut state = self.state.borrow_mut();
            state.open_displays = state.open_displays.saturating_sub(1);
        }
        self.record(ServiceCall::CloseDisplay(display));
    }

    fn disconnect(&self, channel: ChannelHandle) {
        self.state.borrow_mut().connected = false;
        self.record(ServiceCall::Disconnect(channel));
    }
}

/// Rendering context handle of the headless binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HeadlessContext(pub u32);

/// Context binding that tracks a rendering surface without rendering.
#[derive(Debug)]
pub struct HeadlessBinding {
    extensions: Vec<String>,
    fail_create: bool,
    fail_destroy: bool,
    fail_vsync: bool,
    surface: Option<NativeWindowHandle>,
    display: Option<NativeDisplay>,
    contexts_created: u32,
    swaps: u64,
    vsync: Option<bool>,
    queries: RefCell<Vec<String>>,
    journal: Journal,
}

impl Default for HeadlessBinding {
    fn default() -> Self {
        Self::new(["EGL_KHR_image_base", "EGL_KHR_fence_sync"])
    }
}

impl HeadlessBinding {
    pub fn new<I, T>(extensions: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            extensions: extensions.into_iter().map(Into::into).collect(),
            fail_create: false,
            fail_destroy: false,
            fail_vsync: false,
            surface: None,
            display: None,
            contexts_created: 0,
            swaps: 0,
            vsync: None,
            queries: RefCell::new(Vec::new()),
            journal: Journal::new(),
        }
    }

    pub fn with_journal(mut self, journal: Journal) -> Self {
        self.journal = journal;
        self
    }

    pub fn set_fail_create(&mut self, fail: bool) {
        self.fail_create = fail;
    }

    pub fn set_fail_destroy(&mut self, fail: bool) {
        self.fail_destroy = fail;
    }

    pub fn set_fail_vsync(&mut self, fail: bool) {
        self.fail_vsync = fail;
    }

    /// Window the live surface is bound to.
    pub fn surface(&self) -> Option<NativeWindowHandle> {
        self.surface
    }

    pub fn bound_display(&self) -> Option<NativeDisplay> {
        self.display
    }

    pub fn swaps(&self) -> u64 {
        self.swaps
    }

    /// Last vsync state the binding accepted.
    pub fn vsync(&self) -> Option<bool> {
        self.vsync
    }

    /// Extension names queried so far.
    pub fn queries(&self) -> Vec<String> {
        self.queries.borrow().clone()
    }

    pub fn calls(&self) -> Vec<BindingCall> {
        self.journal.binding_calls()
    }

    fn record(&self, call: BindingCall) {
        trace!(?call, "headless binding");
        self.journal.push(JournalEntry::Binding(call));
    }
}

impl ContextBinding for HeadlessBinding {
    type Context = HeadlessContext;
    type Display = Option<NativeDisplay>;

    fn create_window(
        &mut self,
        display: NativeDisplay,
        window: NativeWindowHandle,
    ) -> Result<(), BindingError> {
        self.record(BindingCall::CreateWindow(window));
        if self.fail_create {
            return Err(BindingError::new("create_window", "no matching surface configuration"));
        }
        self.surface = Some(window);
        self.display = Some(display);
        self.contexts_created += 1;
        debug!(?window, "Headless surface created.");
        Ok(())
    }

    fn destroy_window(&mut self) -> Result<(), BindingError> {
        self.record(BindingCall::DestroyWindow);
        if self.fail_destroy {
            return Err(BindingError::new("destroy_window", "surface is busy"));
        }
        self.surface = None;
        self.display = None;
        Ok(())
    }

    fn release_surface(&mut self) {
        self.record(BindingCall::ReleaseSurface);
        self.surface = None;
    }

    fn swap_buffers(&mut self) {
        self.record(BindingCall::SwapBuffers);
        self.swaps += 1;
    }

    fn set_vsync(&mut self, enable: bool) -> Result<(), BindingError> {
        self.record(BindingCall::SetVSync(enable));
        if self.fail_vsync {
            return Err(BindingError::new("set_vsync", "swap interval rejected"));
        }
        self.vsync = Some(enable);
        Ok(())
    }

    fn is_ext_supported(&self, name: &str) -> bool {
        self.queries.borrow_mut().push(name.to_string());
        self.extensions.iter().any(|ext| ext == name)
    }

    fn context(&self) -> HeadlessContext {
        HeadlessContext(self.contexts_created)
    }

    fn display(&self) -> Option<NativeDisplay> {
        self.display
    }
}

/// Arguments of one `reset_render_system` call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderReset {
    pub width: u32,
    pub height: u32,
    pub full_screen: bool,
    pub refresh_rate: f32,
}

/// Renderer base that records reconfiguration requests.
#[derive(Debug)]
pub struct HeadlessRenderer {
    extensions: Vec<String>,
    resets: Vec<RenderReset>,
    queries: RefCell<Vec<String>>,
    journal: Journal,
}

impl Default for HeadlessRenderer {
    fn default() -> Self {
        Self::new(["GL_OES_EGL_image", "GL_EXT_texture_format_BGRA8888"])
    }
}

impl HeadlessRenderer {
    pub fn new<I, T>(extensions: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            extensions: extensions.into_iter().map(Into::into).collect(),
            resets: Vec::new(),
            queries: RefCell::new(Vec::new()),
            journal: Journal::new(),
        }
    }

    pub fn with_journal(mut self, journal: Journal) -> Self {
        self.journal = journal;
        self
    }

    pub fn resets(&self) -> &[RenderReset] {
        &self.resets
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.borrow().clone()
    }
}

impl RenderSystem for HeadlessRenderer {
    fn reset_render_system(
        &mut self,
        width: u32,
        height: u32,
        full_screen: bool,
        refresh_rate: f32,
    ) {
        let reset = RenderReset {
            width,
            height,
            full_screen,
            refresh_rate,
        };
        self.journal.push(JournalEntry::Base(BaseCall::ResetRenderSystem(reset)));
        self.resets.push(reset);
    }

    fn is_ext_supported(&self, name: &str) -> bool {
        self.queries.borrow_mut().push(name.to_string());
        self.extensions.iter().any(|ext| ext == name)
    }
}

/// Base window system holding the resolution table in memory.
#[derive(Debug, Default)]
pub struct DesktopResolutions {
    fail_init: bool,
    initialized: bool,
    base_updates: u32,
    resolutions: Vec<ResolutionDescriptor>,
    journal: Journal,
}

impl DesktopResolutions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_journal(mut self, journal: Journal) -> Self {
        self.journal = journal;
        self
    }

    /// Makes `init_window_system` fail.
    pub fn failing_init(mut self) -> Self {
        self.fail_init = true;
        self
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Number of base `update_resolutions` passes.
    pub fn base_updates(&self) -> u32 {
        self.base_updates
    }

    pub fn resolution(&self, index: usize) -> Option<ResolutionDescriptor> {
        self.resolutions.get(index).copied()
    }

    pub fn resolutions(&self) -> &[ResolutionDescriptor] {
        &self.resolutions
    }
}

impl WindowSystemBase for DesktopResolutions {
    fn init_window_system(&mut self) -> Result<(), BaseInitError> {
        self.journal.push(JournalEntry::Base(BaseCall::InitWindowSystem));
        if self.fail_init {
            return Err(BaseInitError("resolution table unavailable".to_string()));
        }
        self.initialized = true;
        Ok(())
    }

    fn update_resolutions(&mut self) {
        self.journal.push(JournalEntry::Base(BaseCall::UpdateResolutions));
        self.base_updates += 1;
    }

    fn update_desktop_resolution(&mut self, index: usize, resolution: ResolutionDescriptor) {
        self.journal
            .push(JournalEntry::Base(BaseCall::UpdateDesktopResolution(index, resolution)));
        if self.resolutions.len() <= index {
            self.resolutions.resize(index + 1, ResolutionDescriptor::default());
        }
        self.resolutions[index] = resolution;
    }
}
