// Copyright 2026 the Casement Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Platform strategy contract.
//!
//! Each windowing system (X11, Win32, Cocoa, headless) provides one
//! [`SurfacePlatform`] implementation. The core calls it at fixed points of
//! the lock protocol and never branches on which platform it is talking to.
//!
//! Capabilities are split in two:
//!
//! - **Native surface** — [`SurfacePlatform`]: fetch the native access
//!   handle, lock and unlock the drawable, report screen location.
//! - **Offscreen layer** — [`OffscreenLayerPlatform`]: attach, detach, and
//!   lay out a compositing layer. Optional; exposed through
//!   [`SurfacePlatform::offscreen_layers`].
//!
//! # Call discipline
//!
//! The core serializes every call into a platform instance, so methods take
//! `&mut self`. [`fetch`](SurfacePlatform::fetch),
//! [`lock`](SurfacePlatform::lock), and [`unlock`](SurfacePlatform::unlock)
//! are only called with the display device locked and the surface lock held
//! by the calling thread. Layer operations may be called from the toolkit's
//! event thread without the surface lock.

use kurbo::{Point, Rect};

use crate::error::SurfaceError;
use crate::handle::{DrawableHandle, LayerHandle};
use crate::host::HostComponent;
use crate::layer::DetachNotify;

/// Hints handed to [`SurfacePlatform::fetch`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FetchHints {
    /// The user asked for an offscreen-layer surface.
    pub prefer_offscreen_layer: bool,
    /// The host component sits inside a plugin/applet container.
    pub plugin_hosted: bool,
}

/// The native access handle produced by a fetch.
///
/// Cached by the window until [`invalidate`](crate::surface::SurfaceWindow::invalidate).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NativeAccess {
    /// Opaque native handle (e.g. a toolkit native-interface table).
    pub handle: u64,
    /// Whether drawing goes through an offscreen layer rather than the
    /// onscreen surface.
    pub offscreen_layer: bool,
}

/// Outcome of the platform lock step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PlatformStatus {
    /// The drawable is locked and usable.
    Success,
    /// The drawable is temporarily unavailable; retry on a later frame.
    NotReady,
    /// The drawable cannot be locked.
    Unlockable,
}

/// Result of [`SurfacePlatform::lock`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlatformLock {
    /// Lock outcome.
    pub status: PlatformStatus,
    /// The drawable now backing the surface. Only read on success.
    pub drawable: DrawableHandle,
    /// The drawable's bounds as reported by the native layer. Only read on
    /// success.
    pub bounds: Rect,
}

impl PlatformLock {
    /// A successful lock of `drawable` with the given bounds.
    #[must_use]
    pub fn success(drawable: DrawableHandle, bounds: Rect) -> Self {
        Self {
            status: PlatformStatus::Success,
            drawable,
            bounds,
        }
    }

    /// A lock attempt that did not succeed.
    #[must_use]
    pub fn declined(status: PlatformStatus) -> Self {
        Self {
            status,
            drawable: DrawableHandle::NONE,
            bounds: Rect::ZERO,
        }
    }
}

/// Native surface strategy for one windowing system.
pub trait SurfacePlatform: Send {
    /// Acquires the native access handle for `host`.
    ///
    /// Called at most once per cold lock, and only when no handle is cached.
    ///
    /// # Errors
    ///
    /// Returns [`SurfaceError::Platform`] if the native peer is unavailable.
    fn fetch(
        &mut self,
        host: &dyn HostComponent,
        hints: FetchHints,
    ) -> Result<NativeAccess, SurfaceError>;

    /// Locks the native drawable.
    ///
    /// # Errors
    ///
    /// Returns [`SurfaceError::Platform`] on native failure. A drawable that
    /// is merely unavailable is reported through [`PlatformStatus`] instead.
    fn lock(
        &mut self,
        host: &dyn HostComponent,
        access: &NativeAccess,
    ) -> Result<PlatformLock, SurfaceError>;

    /// Unlocks the native drawable. Called once per successful outermost
    /// lock, before the device lock is released.
    ///
    /// # Errors
    ///
    /// Returns [`SurfaceError::Platform`] on native failure.
    fn unlock(&mut self, access: &NativeAccess) -> Result<(), SurfaceError>;

    /// Drops any native state tied to the cached access handle.
    fn invalidate_native(&mut self) {}

    /// Returns the surface origin in screen coordinates, if the platform can
    /// compute it natively. Called with the surface locked.
    fn location_on_screen(&mut self, access: &NativeAccess) -> Option<Point> {
        _ = access;
        None
    }

    /// Returns the offscreen-layer capability, if this platform has one.
    fn offscreen_layers(&mut self) -> Option<&mut dyn OffscreenLayerPlatform> {
        None
    }
}

/// Offscreen compositing layer strategy.
pub trait OffscreenLayerPlatform {
    /// Binds `layer` to the surface.
    ///
    /// # Errors
    ///
    /// Returns [`SurfaceError::Platform`] on native failure. Nothing is
    /// recorded by the window in that case.
    fn attach_layer(&mut self, layer: LayerHandle) -> Result<(), SurfaceError>;

    /// Unbinds `layer` from the surface.
    ///
    /// `notify` must be completed once native teardown has finished; it may
    /// be completed before returning or later from another thread. Dropping
    /// it without completing leaves the layer recorded as attached.
    ///
    /// # Errors
    ///
    /// Returns [`SurfaceError::Platform`] on native failure.
    fn detach_layer(&mut self, layer: LayerHandle, notify: DetachNotify)
    -> Result<(), SurfaceError>;

    /// Re-lays-out `layer` against the surface, showing or hiding it.
    ///
    /// # Errors
    ///
    /// Returns [`SurfaceError::Platform`] on native failure.
    fn layout_layer(&mut self, layer: LayerHandle, visible: bool) -> Result<(), SurfaceError>;
}
