// Copyright 2026 the Casement Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scriptable host and platform doubles for unit tests.

use std::sync::{Arc, Weak};

use kurbo::{Insets, Point, Rect};
use parking_lot::Mutex;

use crate::config::SurfaceConfig;
use crate::device::{Screen, SharedDisplayDevice};
use crate::error::SurfaceError;
use crate::handle::{DisplayHandle, DrawableHandle, LayerHandle};
use crate::host::{
    Ancestor, ChangedComponent, ComponentEvent, ComponentListener, HierarchyChange,
    HierarchyEvent, HostComponent,
};
use crate::layer::DetachNotify;
use crate::platform::{
    FetchHints, NativeAccess, OffscreenLayerPlatform, PlatformLock, PlatformStatus,
    SurfacePlatform,
};
use crate::surface::SurfaceWindow;

#[derive(Debug)]
struct HostState {
    displayable: bool,
    visible: bool,
    ancestors_showing: bool,
    bounds: Rect,
    insets: Insets,
    ancestors: Vec<Ancestor>,
    repaints: usize,
    set_visible_calls: Vec<bool>,
    listeners: Vec<Weak<dyn ComponentListener>>,
}

/// A host that dispatches like a toolkit: synchronously, with no lock held.
#[derive(Debug)]
pub(crate) struct MockHost {
    state: Mutex<HostState>,
}

impl Default for MockHost {
    fn default() -> Self {
        Self {
            state: Mutex::new(HostState {
                displayable: true,
                visible: true,
                ancestors_showing: true,
                bounds: Rect::new(0.0, 0.0, 100.0, 100.0),
                insets: Insets::ZERO,
                ancestors: Vec::new(),
                repaints: 0,
                set_visible_calls: Vec::new(),
                listeners: Vec::new(),
            }),
        }
    }
}

impl MockHost {
    fn listeners(&self) -> Vec<Arc<dyn ComponentListener>> {
        self.state
            .lock()
            .listeners
            .iter()
            .filter_map(Weak::upgrade)
            .collect()
    }

    fn showing(state: &HostState) -> bool {
        state.displayable && state.visible && state.ancestors_showing
    }

    fn dispatch_component(&self, event: ComponentEvent) {
        for listener in self.listeners() {
            listener.component_changed(event);
        }
    }

    fn dispatch_hierarchy(&self, event: HierarchyEvent) {
        for listener in self.listeners() {
            listener.hierarchy_changed(&event);
        }
    }

    pub(crate) fn set_displayable(&self, displayable: bool) {
        self.state.lock().displayable = displayable;
    }

    pub(crate) fn set_bounds(&self, bounds: Rect) {
        self.state.lock().bounds = bounds;
    }

    pub(crate) fn set_insets(&self, insets: Insets) {
        self.state.lock().insets = insets;
    }

    pub(crate) fn set_ancestors(&self, ancestors: Vec<Ancestor>) {
        self.state.lock().ancestors = ancestors;
    }

    pub(crate) fn repaints(&self) -> usize {
        self.state.lock().repaints
    }

    pub(crate) fn set_visible_calls(&self) -> Vec<bool> {
        self.state.lock().set_visible_calls.clone()
    }

    pub(crate) fn clear_set_visible_calls(&self) {
        self.state.lock().set_visible_calls.clear();
    }

    pub(crate) fn fire_resized(&self) {
        self.dispatch_component(ComponentEvent::Resized);
    }

    pub(crate) fn fire_moved(&self) {
        self.dispatch_component(ComponentEvent::Moved);
    }

    /// Simulates an ancestor being shown or hidden.
    pub(crate) fn fire_ancestor_showing(&self, showing: bool) {
        self.state.lock().ancestors_showing = showing;
        self.dispatch_hierarchy(HierarchyEvent {
            changed: ChangedComponent::Ancestor,
            change: HierarchyChange::SHOWING_CHANGED,
            displayable: true,
            showing,
        });
    }
}

impl MockHost {
    /// Simulates the native peer going away. Like a toolkit tearing down a
    /// peer, this also clears the host's own visibility flag.
    pub(crate) fn fire_peer_lost(&self) {
        let was_showing = {
            let mut state = self.state.lock();
            let was = Self::showing(&state);
            state.displayable = false;
            state.visible = false;
            was
        };
        let change = if was_showing {
            HierarchyChange::DISPLAYABILITY_CHANGED | HierarchyChange::SHOWING_CHANGED
        } else {
            HierarchyChange::DISPLAYABILITY_CHANGED
        };
        self.dispatch_hierarchy(HierarchyEvent {
            changed: ChangedComponent::Own,
            change,
            displayable: false,
            showing: false,
        });
    }
}

impl HostComponent for MockHost {
    fn is_displayable(&self) -> bool {
        self.state.lock().displayable
    }

    fn is_visible(&self) -> bool {
        self.state.lock().visible
    }

    fn set_visible(&self, visible: bool) {
        let (was_showing, now_showing, displayable) = {
            let mut state = self.state.lock();
            state.set_visible_calls.push(visible);
            if state.visible == visible {
                return;
            }
            let was = Self::showing(&state);
            state.visible = visible;
            (was, Self::showing(&state), state.displayable)
        };
        if was_showing != now_showing {
            self.dispatch_hierarchy(HierarchyEvent {
                changed: ChangedComponent::Own,
                change: HierarchyChange::SHOWING_CHANGED,
                displayable,
                showing: now_showing,
            });
        }
        self.dispatch_component(if visible {
            ComponentEvent::Shown
        } else {
            ComponentEvent::Hidden
        });
    }

    fn is_showing(&self) -> bool {
        Self::showing(&self.state.lock())
    }

    fn bounds(&self) -> Rect {
        self.state.lock().bounds
    }

    fn insets(&self) -> Insets {
        self.state.lock().insets
    }

    fn ancestors(&self) -> Vec<Ancestor> {
        self.state.lock().ancestors.clone()
    }

    fn repaint(&self) {
        self.state.lock().repaints += 1;
    }

    fn add_component_listener(&self, listener: Weak<dyn ComponentListener>) {
        self.state.lock().listeners.push(listener);
    }
}

#[derive(Debug)]
struct ProbeState {
    offscreen: bool,
    drawable: DrawableHandle,
    bounds: Rect,
    status: PlatformStatus,
    fail_next_fetch: bool,
    location: Option<Point>,
    defer_detach: bool,
    pending_detaches: Vec<DetachNotify>,
    last_hints: Option<FetchHints>,
    fetches: usize,
    locks: usize,
    unlocks: usize,
    invalidations: usize,
    layouts: Vec<(LayerHandle, bool)>,
}

/// Test-side view of a [`MockPlatform`].
#[derive(Clone, Debug)]
pub(crate) struct MockProbe {
    state: Arc<Mutex<ProbeState>>,
    device: Arc<SharedDisplayDevice>,
}

impl MockProbe {
    pub(crate) fn fetches(&self) -> usize {
        self.state.lock().fetches
    }

    pub(crate) fn locks(&self) -> usize {
        self.state.lock().locks
    }

    pub(crate) fn unlocks(&self) -> usize {
        self.state.lock().unlocks
    }

    pub(crate) fn invalidations(&self) -> usize {
        self.state.lock().invalidations
    }

    pub(crate) fn layouts(&self) -> Vec<(LayerHandle, bool)> {
        self.state.lock().layouts.clone()
    }

    pub(crate) fn last_hints(&self) -> Option<FetchHints> {
        self.state.lock().last_hints
    }

    pub(crate) fn set_drawable(&self, drawable: DrawableHandle) {
        self.state.lock().drawable = drawable;
    }

    pub(crate) fn set_bounds(&self, bounds: Rect) {
        self.state.lock().bounds = bounds;
    }

    pub(crate) fn set_status(&self, status: PlatformStatus) {
        self.state.lock().status = status;
    }

    pub(crate) fn set_location(&self, location: Option<Point>) {
        self.state.lock().location = location;
    }

    pub(crate) fn fail_next_fetch(&self) {
        self.state.lock().fail_next_fetch = true;
    }

    pub(crate) fn defer_detach(&self, defer: bool) {
        self.state.lock().defer_detach = defer;
    }

    pub(crate) fn complete_pending_detaches(&self) {
        let pending = core::mem::take(&mut self.state.lock().pending_detaches);
        for notify in pending {
            notify.complete();
        }
    }

    pub(crate) fn device_locked(&self) -> bool {
        self.device.raw_lock().is_locked()
    }
}

/// A platform that records every call and answers from [`MockProbe`].
#[derive(Debug)]
pub(crate) struct MockPlatform {
    state: Arc<Mutex<ProbeState>>,
}

impl SurfacePlatform for MockPlatform {
    fn fetch(
        &mut self,
        _host: &dyn HostComponent,
        hints: FetchHints,
    ) -> Result<NativeAccess, SurfaceError> {
        let mut state = self.state.lock();
        state.last_hints = Some(hints);
        if core::mem::take(&mut state.fail_next_fetch) {
            return Err(SurfaceError::platform("fetch", "peer unavailable"));
        }
        state.fetches += 1;
        Ok(NativeAccess {
            handle: 0xa11,
            offscreen_layer: state.offscreen && hints.prefer_offscreen_layer,
        })
    }

    fn lock(
        &mut self,
        _host: &dyn HostComponent,
        _access: &NativeAccess,
    ) -> Result<PlatformLock, SurfaceError> {
        let mut state = self.state.lock();
        if state.status != PlatformStatus::Success {
            return Ok(PlatformLock::declined(state.status));
        }
        state.locks += 1;
        Ok(PlatformLock::success(state.drawable, state.bounds))
    }

    fn unlock(&mut self, _access: &NativeAccess) -> Result<(), SurfaceError> {
        self.state.lock().unlocks += 1;
        Ok(())
    }

    fn invalidate_native(&mut self) {
        self.state.lock().invalidations += 1;
    }

    fn location_on_screen(&mut self, _access: &NativeAccess) -> Option<Point> {
        self.state.lock().location
    }

    fn offscreen_layers(&mut self) -> Option<&mut dyn OffscreenLayerPlatform> {
        if self.state.lock().offscreen {
            Some(self)
        } else {
            None
        }
    }
}

impl OffscreenLayerPlatform for MockPlatform {
    fn attach_layer(&mut self, _layer: LayerHandle) -> Result<(), SurfaceError> {
        Ok(())
    }

    fn detach_layer(
        &mut self,
        _layer: LayerHandle,
        notify: DetachNotify,
    ) -> Result<(), SurfaceError> {
        let mut state = self.state.lock();
        if state.defer_detach {
            state.pending_detaches.push(notify);
        } else {
            notify.complete();
        }
        Ok(())
    }

    fn layout_layer(&mut self, layer: LayerHandle, visible: bool) -> Result<(), SurfaceError> {
        self.state.lock().layouts.push((layer, visible));
        Ok(())
    }
}

/// Builds a window over a displayable, visible mock host.
///
/// With `offscreen`, the window prefers an offscreen layer and the platform
/// grants one.
pub(crate) fn window_with(
    offscreen: bool,
) -> (Arc<MockHost>, MockProbe, Arc<SurfaceWindow<MockPlatform>>) {
    let state = Arc::new(Mutex::new(ProbeState {
        offscreen,
        drawable: DrawableHandle(0x1),
        bounds: Rect::new(0.0, 0.0, 100.0, 100.0),
        status: PlatformStatus::Success,
        fail_next_fetch: false,
        location: None,
        defer_detach: false,
        pending_detaches: Vec::new(),
        last_hints: None,
        fetches: 0,
        locks: 0,
        unlocks: 0,
        invalidations: 0,
        layouts: Vec::new(),
    }));
    let device = Arc::new(SharedDisplayDevice::new(DisplayHandle(0xd1)));
    let probe = MockProbe {
        state: Arc::clone(&state),
        device: Arc::clone(&device),
    };
    let host = Arc::new(MockHost::default());
    let dyn_host: Arc<dyn HostComponent> = host.clone();
    let config = if offscreen {
        SurfaceConfig::offscreen()
    } else {
        SurfaceConfig::onscreen()
    };
    let window = SurfaceWindow::new(
        &dyn_host,
        Screen::new(device, 0),
        MockPlatform { state },
        config,
    );
    (host, probe, window)
}
