// Copyright 2026 the Casement Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for the lock protocol and visibility machine.
//!
//! This module provides a [`TraceSink`] trait with per-event methods that the
//! window calls at each interesting transition. All method bodies default to
//! no-ops, so implementing only the events you care about is fine.
//!
//! [`Tracer`] owns an optional boxed sink. When the `trace` feature is
//! **off**, every `Tracer` method compiles to nothing and installing a sink
//! just drops it. When **on**, each method takes a short internal lock and
//! performs a single `Option` branch before dispatching.
//!
//! Sinks are called from whichever thread triggered the event (client
//! threads for lock events, the toolkit event thread for visibility events)
//! and must not call back into the window.
//!
//! # Crate features
//!
//! - `trace` — enables the `Tracer` method bodies.

use std::sync::Arc;

use kurbo::Rect;
use parking_lot::Mutex;

use crate::handle::{DrawableHandle, LayerHandle};
use crate::surface::LockStatus;

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted after every [`lock_surface`](crate::surface::SurfaceWindow::lock_surface)
/// call, successful or not.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LockEvent {
    /// Microseconds since the window was created.
    pub timestamp_us: u64,
    /// Surface lock hold count after the call.
    pub hold_count: usize,
    /// Outcome reported to the caller.
    pub status: LockStatus,
    /// Whether this was the outermost acquisition.
    pub cold: bool,
}

/// Emitted after every [`unlock_surface`](crate::surface::SurfaceWindow::unlock_surface).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UnlockEvent {
    /// Microseconds since the window was created.
    pub timestamp_us: u64,
    /// Surface lock hold count after the call.
    pub hold_count: usize,
    /// Whether the platform and device locks were released.
    pub outermost: bool,
}

/// Emitted when a cold lock observes a drawable different from the one
/// recorded at the previous unlock.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SurfaceChangeEvent {
    /// Microseconds since the window was created.
    pub timestamp_us: u64,
    /// Drawable recorded at the previous unlock.
    pub previous: DrawableHandle,
    /// Drawable reported by this lock.
    pub current: DrawableHandle,
}

/// Emitted when a cold lock stores new surface bounds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundsEvent {
    /// Microseconds since the window was created.
    pub timestamp_us: u64,
    /// Bounds before the update.
    pub previous: Rect,
    /// Bounds after the update.
    pub current: Rect,
}

/// Emitted when the window drops its cached native state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InvalidateEvent {
    /// Microseconds since the window was created.
    pub timestamp_us: u64,
    /// A layer that was still attached at the time, if any.
    pub attached_layer: Option<LayerHandle>,
}

/// What happened to the offscreen layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LayerEventKind {
    /// The layer was attached and recorded.
    Attached,
    /// A detach was handed to the platform. Completion may come later.
    DetachRequested,
    /// The layer was laid out with the given visibility.
    Layout {
        /// Visibility passed to the platform.
        visible: bool,
    },
}

/// Emitted for offscreen layer lifecycle steps.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LayerEvent {
    /// Microseconds since the window was created.
    pub timestamp_us: u64,
    /// Which step.
    pub kind: LayerEventKind,
    /// The layer involved.
    pub layer: LayerHandle,
}

/// Emitted after the visibility machine handles a hierarchy notification
/// that touched its state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VisibilityEvent {
    /// Microseconds since the window was created.
    pub timestamp_us: u64,
    /// Component-local visibility.
    pub local: bool,
    /// Visibility inherited from ancestors.
    pub global: bool,
    /// Whether a forced write is waiting for its echo.
    pub propagating: bool,
    /// The visibility forced onto the host, if any.
    pub forced: Option<bool>,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from a window.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called after a lock attempt.
    fn on_lock(&mut self, e: &LockEvent) {
        _ = e;
    }

    /// Called after an unlock.
    fn on_unlock(&mut self, e: &UnlockEvent) {
        _ = e;
    }

    /// Called when the drawable changed between lock cycles.
    fn on_surface_changed(&mut self, e: &SurfaceChangeEvent) {
        _ = e;
    }

    /// Called when cached bounds changed.
    fn on_bounds_changed(&mut self, e: &BoundsEvent) {
        _ = e;
    }

    /// Called when cached native state is dropped.
    fn on_invalidate(&mut self, e: &InvalidateEvent) {
        _ = e;
    }

    /// Called for offscreen layer lifecycle steps.
    fn on_layer(&mut self, e: &LayerEvent) {
        _ = e;
    }

    /// Called after a visibility state transition.
    fn on_visibility(&mut self, e: &VisibilityEvent) {
        _ = e;
    }
}

/// A sink shared between the window and its installer, so the installer can
/// inspect what was collected while the window keeps emitting.
pub type SharedSink<S> = Arc<Mutex<S>>;

/// Wraps `sink` for shared use. Install one clone on the window and keep the
/// other.
pub fn share<S: TraceSink>(sink: S) -> SharedSink<S> {
    Arc::new(Mutex::new(sink))
}

impl<S: TraceSink + ?Sized> TraceSink for Arc<Mutex<S>> {
    fn on_lock(&mut self, e: &LockEvent) {
        self.lock().on_lock(e);
    }

    fn on_unlock(&mut self, e: &UnlockEvent) {
        self.lock().on_unlock(e);
    }

    fn on_surface_changed(&mut self, e: &SurfaceChangeEvent) {
        self.lock().on_surface_changed(e);
    }

    fn on_bounds_changed(&mut self, e: &BoundsEvent) {
        self.lock().on_bounds_changed(e);
    }

    fn on_invalidate(&mut self, e: &InvalidateEvent) {
        self.lock().on_invalidate(e);
    }

    fn on_layer(&mut self, e: &LayerEvent) {
        self.lock().on_layer(e);
    }

    fn on_visibility(&mut self, e: &VisibilityEvent) {
        self.lock().on_visibility(e);
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// A boxed sink that can be installed on a window.
pub type BoxedSink = Box<dyn TraceSink + Send>;

/// Owner of an optional [`TraceSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing and
/// [`timestamp_us`](Self::timestamp_us) is always zero.
pub struct Tracer {
    #[cfg(feature = "trace")]
    sink: Mutex<Option<BoxedSink>>,
    #[cfg(feature = "trace")]
    epoch: std::time::Instant,
}

impl core::fmt::Debug for Tracer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

impl Default for Tracer {
    fn default() -> Self {
        Self::new()
    }
}

macro_rules! dispatch {
    ($(#[$meta:meta])* $name:ident, $method:ident, $event:ty) => {
        $(#[$meta])*
        #[inline]
        pub fn $name(&self, e: &$event) {
            #[cfg(feature = "trace")]
            if let Some(s) = self.sink.lock().as_mut() {
                s.$method(e);
            }
            #[cfg(not(feature = "trace"))]
            {
                _ = e;
            }
        }
    };
}

impl Tracer {
    /// Creates a tracer with no sink installed. Timestamps count from now.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        #[cfg(feature = "trace")]
        {
            Self {
                sink: Mutex::new(None),
                epoch: std::time::Instant::now(),
            }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {}
        }
    }

    /// Installs `sink`, returning the previously installed one.
    ///
    /// Without the `trace` feature the sink is dropped and `None` returned.
    pub fn set_sink(&self, sink: Option<BoxedSink>) -> Option<BoxedSink> {
        #[cfg(feature = "trace")]
        {
            core::mem::replace(&mut *self.sink.lock(), sink)
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            None
        }
    }

    /// Microseconds since this tracer was created.
    #[inline]
    #[must_use]
    pub fn timestamp_us(&self) -> u64 {
        #[cfg(feature = "trace")]
        {
            u64::try_from(self.epoch.elapsed().as_micros()).unwrap_or(u64::MAX)
        }
        #[cfg(not(feature = "trace"))]
        {
            0
        }
    }

    dispatch!(
        /// Emits a [`LockEvent`].
        lock, on_lock, LockEvent
    );
    dispatch!(
        /// Emits an [`UnlockEvent`].
        unlock, on_unlock, UnlockEvent
    );
    dispatch!(
        /// Emits a [`SurfaceChangeEvent`].
        surface_changed, on_surface_changed, SurfaceChangeEvent
    );
    dispatch!(
        /// Emits a [`BoundsEvent`].
        bounds_changed, on_bounds_changed, BoundsEvent
    );
    dispatch!(
        /// Emits an [`InvalidateEvent`].
        invalidate, on_invalidate, InvalidateEvent
    );
    dispatch!(
        /// Emits a [`LayerEvent`].
        layer, on_layer, LayerEvent
    );
    dispatch!(
        /// Emits a [`VisibilityEvent`].
        visibility, on_visibility, VisibilityEvent
    );
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
