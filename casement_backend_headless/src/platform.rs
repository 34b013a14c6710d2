// Copyright 2026 the Casement Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Software surface platform.
//!
//! [`HeadlessPlatform`] implements [`SurfacePlatform`] and
//! [`OffscreenLayerPlatform`] without any native windowing system. Each fetch
//! allocates a fresh drawable; each lock reports the host's current bounds.
//!
//! A [`HeadlessProbe`] shares the platform's state so tests and tools can
//! script it (decline locks, recreate the drawable, defer layer teardown)
//! and inspect what the window asked for.
//!
//! Offscreen layers are offered when the platform supports them and either
//! the window prefers one or the host sits inside a plugin container.

use std::fmt;
use std::sync::Arc;

use casement_core::SurfaceError;
use casement_core::handle::{DrawableHandle, LayerHandle};
use casement_core::host::HostComponent;
use casement_core::layer::DetachNotify;
use casement_core::platform::{
    FetchHints, NativeAccess, OffscreenLayerPlatform, PlatformLock, PlatformStatus,
    SurfacePlatform,
};
use hashbrown::HashMap;
use kurbo::{Point, Rect};
use parking_lot::Mutex;

/// Native access handle value reported by every fetch.
const ACCESS_HANDLE: u64 = 0x4a41_5754;

/// Counters of platform calls.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PlatformStats {
    /// Successful fetches.
    pub fetches: usize,
    /// Successful lock steps.
    pub locks: usize,
    /// Unlock steps.
    pub unlocks: usize,
    /// Native invalidations.
    pub invalidations: usize,
}

/// State of one attached layer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayerState {
    /// Whether the last layout showed the layer.
    pub visible: bool,
    /// Surface bounds at the last layout.
    pub frame: Rect,
    /// How many times the layer was laid out.
    pub layouts: usize,
}

#[derive(Debug)]
struct State {
    supports_offscreen: bool,
    next_drawable: u64,
    drawable: DrawableHandle,
    bounds: Rect,
    status: PlatformStatus,
    fail_next_fetch: bool,
    screen_origin: Option<Point>,
    last_hints: Option<FetchHints>,
    layers: HashMap<LayerHandle, LayerState>,
    defer_detach: bool,
    pending_detaches: Vec<DetachNotify>,
    stats: PlatformStats,
}

impl State {
    fn allocate_drawable(&mut self) -> DrawableHandle {
        self.next_drawable += 1;
        self.drawable = DrawableHandle(self.next_drawable);
        self.drawable
    }
}

/// A [`SurfacePlatform`] backed by process memory.
pub struct HeadlessPlatform {
    state: Arc<Mutex<State>>,
}

impl fmt::Debug for HeadlessPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("HeadlessPlatform")
            .field("supports_offscreen", &state.supports_offscreen)
            .field("drawable", &state.drawable)
            .field("layers", &state.layers.len())
            .finish_non_exhaustive()
    }
}

impl HeadlessPlatform {
    /// Creates a platform that draws onscreen only.
    #[must_use]
    pub fn new() -> Self {
        Self::with_offscreen_layers(false)
    }

    /// Creates a platform, optionally with offscreen layer support.
    #[must_use]
    pub fn with_offscreen_layers(supported: bool) -> Self {
        Self {
            state: Arc::new(Mutex::new(State {
                supports_offscreen: supported,
                next_drawable: 0,
                drawable: DrawableHandle::NONE,
                bounds: Rect::ZERO,
                status: PlatformStatus::Success,
                fail_next_fetch: false,
                screen_origin: None,
                last_hints: None,
                layers: HashMap::new(),
                defer_detach: false,
                pending_detaches: Vec::new(),
                stats: PlatformStats::default(),
            })),
        }
    }

    /// Returns a probe sharing this platform's state.
    #[must_use]
    pub fn probe(&self) -> HeadlessProbe {
        HeadlessProbe {
            state: self.state.clone(),
        }
    }
}

impl Default for HeadlessPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl SurfacePlatform for HeadlessPlatform {
    fn fetch(
        &mut self,
        host: &dyn HostComponent,
        hints: FetchHints,
    ) -> Result<NativeAccess, SurfaceError> {
        let mut state = self.state.lock();
        state.last_hints = Some(hints);
        if core::mem::take(&mut state.fail_next_fetch) {
            return Err(SurfaceError::platform("fetch", "native peer unavailable"));
        }
        if !host.is_displayable() {
            return Err(SurfaceError::platform("fetch", "component has no peer"));
        }
        state.stats.fetches += 1;
        state.allocate_drawable();
        Ok(NativeAccess {
            handle: ACCESS_HANDLE,
            offscreen_layer: state.supports_offscreen
                && (hints.prefer_offscreen_layer || hints.plugin_hosted),
        })
    }

    fn lock(
        &mut self,
        host: &dyn HostComponent,
        _access: &NativeAccess,
    ) -> Result<PlatformLock, SurfaceError> {
        let mut state = self.state.lock();
        if state.status != PlatformStatus::Success {
            return Ok(PlatformLock::declined(state.status));
        }
        state.stats.locks += 1;
        state.bounds = host.bounds();
        Ok(PlatformLock::success(state.drawable, state.bounds))
    }

    fn unlock(&mut self, _access: &NativeAccess) -> Result<(), SurfaceError> {
        self.state.lock().stats.unlocks += 1;
        Ok(())
    }

    fn invalidate_native(&mut self) {
        let mut state = self.state.lock();
        state.stats.invalidations += 1;
        state.drawable = DrawableHandle::NONE;
    }

    fn location_on_screen(&mut self, _access: &NativeAccess) -> Option<Point> {
        self.state.lock().screen_origin
    }

    fn offscreen_layers(&mut self) -> Option<&mut dyn OffscreenLayerPlatform> {
        if self.state.lock().supports_offscreen {
            Some(self)
        } else {
            None
        }
    }
}

impl OffscreenLayerPlatform for HeadlessPlatform {
    fn attach_layer(&mut self, layer: LayerHandle) -> Result<(), SurfaceError> {
        let mut state = self.state.lock();
        if state.layers.contains_key(&layer) {
            return Err(SurfaceError::platform("attach", "layer already attached"));
        }
        let frame = state.bounds;
        state.layers.insert(
            layer,
            LayerState {
                visible: false,
                frame,
                layouts: 0,
            },
        );
        Ok(())
    }

    fn detach_layer(
        &mut self,
        layer: LayerHandle,
        notify: DetachNotify,
    ) -> Result<(), SurfaceError> {
        let mut state = self.state.lock();
        if !state.layers.contains_key(&layer) {
            return Err(SurfaceError::platform("detach", "layer not attached"));
        }
        if state.defer_detach {
            state.pending_detaches.push(notify);
        } else {
            state.layers.remove(&layer);
            notify.complete();
        }
        Ok(())
    }

    fn layout_layer(&mut self, layer: LayerHandle, visible: bool) -> Result<(), SurfaceError> {
        let mut state = self.state.lock();
        let frame = state.bounds;
        let entry = state
            .layers
            .get_mut(&layer)
            .ok_or_else(|| SurfaceError::platform("layout", "layer not attached"))?;
        entry.visible = visible;
        entry.frame = frame;
        entry.layouts += 1;
        Ok(())
    }
}

/// Scripting and inspection handle for a [`HeadlessPlatform`].
///
/// Cheap to clone. Usable from any thread.
#[derive(Clone)]
pub struct HeadlessProbe {
    state: Arc<Mutex<State>>,
}

impl fmt::Debug for HeadlessProbe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HeadlessProbe")
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}

impl HeadlessProbe {
    /// Call counters so far.
    #[must_use]
    pub fn stats(&self) -> PlatformStats {
        self.state.lock().stats
    }

    /// The drawable the next lock reports.
    #[must_use]
    pub fn drawable(&self) -> DrawableHandle {
        self.state.lock().drawable
    }

    /// Simulates the native system recreating the drawable behind the
    /// cached handle. Returns the new drawable.
    pub fn recreate_drawable(&self) -> DrawableHandle {
        self.state.lock().allocate_drawable()
    }

    /// Makes subsequent lock steps report `status` instead of locking.
    pub fn set_status(&self, status: PlatformStatus) {
        self.state.lock().status = status;
    }

    /// Makes the next fetch fail.
    pub fn fail_next_fetch(&self) {
        self.state.lock().fail_next_fetch = true;
    }

    /// Sets the screen origin reported natively. `None` leaves the window
    /// to compute it from the component tree.
    pub fn set_screen_origin(&self, origin: Option<Point>) {
        self.state.lock().screen_origin = origin;
    }

    /// Hints passed to the most recent fetch.
    #[must_use]
    pub fn last_hints(&self) -> Option<FetchHints> {
        self.state.lock().last_hints
    }

    /// State of an attached layer.
    #[must_use]
    pub fn layer(&self, layer: LayerHandle) -> Option<LayerState> {
        self.state.lock().layers.get(&layer).copied()
    }

    /// Number of layers currently bound.
    #[must_use]
    pub fn attached_layers(&self) -> usize {
        self.state.lock().layers.len()
    }

    /// Holds detach completions until
    /// [`complete_pending_detaches`](Self::complete_pending_detaches).
    pub fn defer_detach(&self, defer: bool) {
        self.state.lock().defer_detach = defer;
    }

    /// Finishes deferred detaches, in request order. Returns how many
    /// cleared the window's record.
    pub fn complete_pending_detaches(&self) -> usize {
        let pending = {
            let mut state = self.state.lock();
            let pending = core::mem::take(&mut state.pending_detaches);
            for notify in &pending {
                state.layers.remove(&notify.layer());
            }
            pending
        };
        pending
            .into_iter()
            .map(DetachNotify::complete)
            .filter(|&cleared| cleared)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use casement_core::handle::LayerHandle;
    use casement_core::platform::{OffscreenLayerPlatform, PlatformStatus, SurfacePlatform};

    use super::HeadlessPlatform;

    #[test]
    fn layers_need_support() {
        let mut plain = HeadlessPlatform::new();
        assert!(plain.offscreen_layers().is_none());

        let mut layered = HeadlessPlatform::with_offscreen_layers(true);
        assert!(layered.offscreen_layers().is_some());
    }

    #[test]
    fn attach_twice_is_rejected() {
        let mut platform = HeadlessPlatform::with_offscreen_layers(true);
        let probe = platform.probe();
        let layer = LayerHandle::new(7).unwrap();
        platform.attach_layer(layer).unwrap();
        assert!(platform.attach_layer(layer).is_err());
        assert_eq!(probe.attached_layers(), 1);
    }

    #[test]
    fn layout_of_unknown_layer_fails() {
        let mut platform = HeadlessPlatform::with_offscreen_layers(true);
        let layer = LayerHandle::new(9).unwrap();
        assert!(platform.layout_layer(layer, true).is_err());
    }

    #[test]
    fn recreate_drawable_allocates_fresh_handles() {
        let platform = HeadlessPlatform::new();
        let probe = platform.probe();
        let first = probe.recreate_drawable();
        let second = probe.recreate_drawable();
        assert_ne!(first, second);
        assert_eq!(probe.drawable(), second);
    }

    #[test]
    fn status_override_is_sticky() {
        let platform = HeadlessPlatform::new();
        let probe = platform.probe();
        probe.set_status(PlatformStatus::NotReady);
        assert_eq!(probe.state.lock().status, PlatformStatus::NotReady);
        probe.set_status(PlatformStatus::Success);
        assert_eq!(probe.state.lock().status, PlatformStatus::Success);
    }
}
