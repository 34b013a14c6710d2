// Copyright 2026 the Casement Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The surface window: lock protocol, native handle cache, and offscreen
//! layer lifecycle for one host component.
//!
//! # Lock protocol
//!
//! [`SurfaceWindow::lock_surface`] takes the window's [`RecursiveLock`]. Only
//! the outermost ("cold") acquisition does native work:
//!
//! 1. If the host component is gone or not displayable, the lock is released
//!    and [`LockStatus::NotReady`] returned.
//! 2. Plugin-host ancestry is recomputed and the display device is locked.
//! 3. The native access handle is fetched if none is cached.
//! 4. The platform locks the drawable. On success the drawable, bounds, and
//!    insets are refreshed; a drawable different from the one recorded at the
//!    previous unlock upgrades the result to [`LockStatus::SurfaceChanged`].
//!
//! Every cold path that does not end in a locked surface, including native
//! errors, releases the device lock and then the surface lock before
//! returning. Nested acquisitions by the owning thread return
//! [`LockStatus::Success`] immediately.
//!
//! [`SurfaceWindow::unlock_surface`] mirrors this: the outermost unlock calls
//! the platform unlock step, releases the device lock, and releases the
//! surface lock last.

use std::fmt;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::thread::ThreadId;

use kurbo::{Insets, Point, Rect};
use parking_lot::Mutex;

use crate::config::SurfaceConfig;
use crate::device::{DisplayDevice, Screen};
use crate::error::SurfaceError;
use crate::geometry::SurfaceGeometry;
use crate::handle::{DisplayHandle, DrawableHandle, LayerHandle};
use crate::host::{
    ComponentEvent, ComponentListener, ContainerKind, HierarchyEvent, HostComponent,
};
use crate::layer::LayerSlot;
use crate::lock::RecursiveLock;
use crate::platform::{FetchHints, NativeAccess, PlatformStatus, SurfacePlatform};
use crate::trace::{
    BoundsEvent, BoxedSink, InvalidateEvent, LayerEvent, LayerEventKind, LockEvent,
    SurfaceChangeEvent, Tracer, UnlockEvent, VisibilityEvent,
};
use crate::visibility::VisibilityTracker;

/// Outcome of [`SurfaceWindow::lock_surface`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LockStatus {
    /// The surface is locked and the drawable is the same as last time.
    Success,
    /// The surface is locked, but the drawable changed since the previous
    /// unlock. Rendering state bound to the old drawable must be rebuilt.
    SurfaceChanged,
    /// The surface is not locked. The component has no native peer yet or
    /// the platform reported the drawable as temporarily unavailable.
    NotReady,
    /// The surface is not locked. The platform could not lock the drawable.
    Unlockable,
}

impl LockStatus {
    /// Whether the caller now holds the surface lock and must balance it
    /// with [`SurfaceWindow::unlock_surface`].
    #[inline]
    #[must_use]
    pub const fn is_locked(self) -> bool {
        matches!(self, Self::Success | Self::SurfaceChanged)
    }
}

/// Native state owned by the thread holding the surface lock.
struct Session<P> {
    platform: P,
    access: Option<NativeAccess>,
    drawable: DrawableHandle,
    previous_drawable: DrawableHandle,
    geometry: SurfaceGeometry,
    is_applet: bool,
}

impl<P> Session<P> {
    fn reset(&mut self) {
        self.access = None;
        self.drawable = DrawableHandle::NONE;
        self.previous_drawable = DrawableHandle::NONE;
        self.geometry.clear();
    }
}

/// Releases the locks taken by a cold acquisition unless disarmed.
///
/// Device first, then surface: the reverse of acquisition.
struct ColdUnwind<'a> {
    surface: &'a RecursiveLock,
    device: Option<&'a dyn DisplayDevice>,
    armed: bool,
}

impl<'a> ColdUnwind<'a> {
    fn new(surface: &'a RecursiveLock) -> Self {
        Self {
            surface,
            device: None,
            armed: true,
        }
    }

    fn lock_device(&mut self, device: &'a dyn DisplayDevice) {
        device.lock();
        self.device = Some(device);
    }

    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for ColdUnwind<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        if let Some(device) = self.device {
            device.unlock();
        }
        self.surface.unlock();
    }
}

/// A native surface owned by a host toolkit component, exposed to an
/// external rendering client.
///
/// Created with [`SurfaceWindow::new`], which registers the window as a
/// [`ComponentListener`] on the host. The host is held weakly: once it is
/// dropped, cold locks report [`LockStatus::NotReady`] and host queries
/// return neutral values.
pub struct SurfaceWindow<P: SurfacePlatform> {
    host: Weak<dyn HostComponent>,
    screen: Screen,
    surface_lock: RecursiveLock,
    session: Mutex<Session<P>>,
    layer: LayerSlot,
    shall_use_offscreen_layer: AtomicBool,
    visibility: Mutex<VisibilityTracker>,
    tracer: Tracer,
}

impl<P: SurfacePlatform> fmt::Debug for SurfaceWindow<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SurfaceWindow")
            .field("screen", &self.screen)
            .field("surface_lock", &self.surface_lock)
            .field("layer", &self.layer)
            .field(
                "shall_use_offscreen_layer",
                &self.shall_use_offscreen_layer.load(Ordering::Relaxed),
            )
            .finish_non_exhaustive()
    }
}

impl<P: SurfacePlatform + 'static> SurfaceWindow<P> {
    /// Creates a window for `host` on `screen`, driven by `platform`.
    ///
    /// The window starts invalidated: nothing is fetched until the first
    /// cold lock. Local visibility is seeded from the host's current flag.
    pub fn new(
        host: &Arc<dyn HostComponent>,
        screen: Screen,
        platform: P,
        config: SurfaceConfig,
    ) -> Arc<Self> {
        let window = Arc::new(Self {
            host: Arc::downgrade(host),
            screen,
            surface_lock: RecursiveLock::new(),
            session: Mutex::new(Session {
                platform,
                access: None,
                drawable: DrawableHandle::NONE,
                previous_drawable: DrawableHandle::NONE,
                geometry: SurfaceGeometry::default(),
                is_applet: false,
            }),
            layer: LayerSlot::default(),
            shall_use_offscreen_layer: AtomicBool::new(config.prefer_offscreen_layer),
            visibility: Mutex::new(VisibilityTracker::new(host.is_visible())),
            tracer: Tracer::new(),
        });
        let listener: Weak<dyn ComponentListener> = Arc::downgrade(&window) as Weak<Self>;
        host.add_component_listener(listener);
        window
    }
}

impl<P: SurfacePlatform> SurfaceWindow<P> {
    // -----------------------------------------------------------------------
    // Lock protocol
    // -----------------------------------------------------------------------

    /// Locks the surface for rendering.
    ///
    /// Blocks while another thread holds the surface lock. When the returned
    /// status [`is_locked`](LockStatus::is_locked), the caller must call
    /// [`unlock_surface`](Self::unlock_surface) once; otherwise nothing is
    /// held.
    ///
    /// # Errors
    ///
    /// Returns [`SurfaceError::Platform`] if the native fetch or lock step
    /// fails. All locks taken by this call have been released by then and
    /// previously cached state is unchanged.
    pub fn lock_surface(&self) -> Result<LockStatus, SurfaceError> {
        let holds = self.surface_lock.lock();
        if holds > 1 {
            self.trace_lock(holds, LockStatus::Success, false);
            return Ok(LockStatus::Success);
        }

        let status = self.lock_cold();
        let holds = self.surface_lock.hold_count();
        match &status {
            Ok(status) => self.trace_lock(holds, *status, true),
            Err(_) => self.trace_lock(holds, LockStatus::Unlockable, true),
        }
        status
    }

    fn lock_cold(&self) -> Result<LockStatus, SurfaceError> {
        let mut unwind = ColdUnwind::new(&self.surface_lock);

        let Some(host) = self.host.upgrade() else {
            return Ok(LockStatus::NotReady);
        };
        if !host.is_displayable() {
            return Ok(LockStatus::NotReady);
        }
        let is_applet = host
            .ancestors()
            .iter()
            .any(|a| a.kind == ContainerKind::PluginHost)
            || host.kind() == ContainerKind::PluginHost;

        unwind.lock_device(self.screen.device());

        let mut guard = self.session.lock();
        let session = &mut *guard;
        session.is_applet = is_applet;
        let access = match session.access {
            Some(access) => access,
            None => {
                let hints = FetchHints {
                    prefer_offscreen_layer: self.shall_use_offscreen_layer(),
                    plugin_hosted: is_applet,
                };
                let access = session.platform.fetch(&*host, hints)?;
                session.access = Some(access);
                access
            }
        };

        let locked = session.platform.lock(&*host, &access)?;
        let status = match locked.status {
            PlatformStatus::NotReady => return Ok(LockStatus::NotReady),
            PlatformStatus::Unlockable => return Ok(LockStatus::Unlockable),
            PlatformStatus::Success => {
                session.drawable = locked.drawable;
                if let Some(previous) = session.geometry.update_bounds(locked.bounds) {
                    self.tracer.bounds_changed(&BoundsEvent {
                        timestamp_us: self.tracer.timestamp_us(),
                        previous,
                        current: locked.bounds,
                    });
                }
                session.geometry.update_insets(host.insets());

                let previous = session.previous_drawable;
                if !previous.is_none() && previous != session.drawable {
                    self.tracer.surface_changed(&SurfaceChangeEvent {
                        timestamp_us: self.tracer.timestamp_us(),
                        previous,
                        current: session.drawable,
                    });
                    LockStatus::SurfaceChanged
                } else {
                    LockStatus::Success
                }
            }
        };

        drop(guard);
        unwind.disarm();
        Ok(status)
    }

    /// Releases one hold of the surface lock.
    ///
    /// Records the current drawable as the baseline for change detection.
    /// The outermost unlock also unlocks the platform drawable (if a native
    /// handle was fetched) and the display device.
    ///
    /// # Errors
    ///
    /// Returns [`SurfaceError::Platform`] if the native unlock step fails.
    /// The device and surface locks are released regardless.
    ///
    /// # Panics
    ///
    /// Panics if the calling thread does not hold the surface lock. Use
    /// [`try_unlock_surface`](Self::try_unlock_surface) to get an error
    /// instead.
    pub fn unlock_surface(&self) -> Result<(), SurfaceError> {
        self.surface_lock.validate_locked();
        self.try_unlock_surface()
    }

    /// Releases one hold of the surface lock, like
    /// [`unlock_surface`](Self::unlock_surface).
    ///
    /// # Errors
    ///
    /// Returns [`SurfaceError::Lock`] without touching any state if the
    /// calling thread does not hold the surface lock. Native unlock failures
    /// are reported as in [`unlock_surface`](Self::unlock_surface).
    pub fn try_unlock_surface(&self) -> Result<(), SurfaceError> {
        self.surface_lock.check_locked()?;
        let outermost = self.surface_lock.hold_count() == 1;

        let result = {
            let mut guard = self.session.lock();
            let session = &mut *guard;
            session.previous_drawable = session.drawable;
            if outermost {
                let result = match session.access {
                    Some(access) => session.platform.unlock(&access),
                    None => Ok(()),
                };
                drop(guard);
                self.screen.device().unlock();
                result
            } else {
                Ok(())
            }
        };

        let holds = self.surface_lock.unlock();
        self.tracer.unlock(&UnlockEvent {
            timestamp_us: self.tracer.timestamp_us(),
            hold_count: holds,
            outermost,
        });
        result
    }

    /// Locks the surface and returns a guard that unlocks it on drop.
    ///
    /// When the surface could not be locked, the inner result carries the
    /// status instead, so callers can tell [`LockStatus::NotReady`] from
    /// [`LockStatus::Unlockable`].
    ///
    /// # Errors
    ///
    /// Same as [`lock_surface`](Self::lock_surface).
    pub fn lock_guard(&self) -> Result<Result<SurfaceGuard<'_, P>, LockStatus>, SurfaceError> {
        let status = self.lock_surface()?;
        if status.is_locked() {
            Ok(Ok(SurfaceGuard {
                window: self,
                status,
                armed: true,
                _not_send: PhantomData,
            }))
        } else {
            Ok(Err(status))
        }
    }

    /// Drops the cached native handle, both drawables, and the cached
    /// geometry. The next cold lock fetches again.
    ///
    /// Takes the surface lock reentrantly, so it may be called while the
    /// current thread holds it. An attached offscreen layer stays recorded.
    pub fn invalidate(&self) {
        self.surface_lock.lock();
        {
            let mut session = self.session.lock();
            session.platform.invalidate_native();
            session.reset();
        }
        self.tracer.invalidate(&InvalidateEvent {
            timestamp_us: self.tracer.timestamp_us(),
            attached_layer: self.layer.get(),
        });
        self.surface_lock.unlock();
    }

    /// Tears down native state. Equivalent to [`invalidate`](Self::invalidate).
    pub fn destroy(&self) {
        self.invalidate();
    }

    /// The window's surface lock, for diagnostics.
    #[must_use]
    pub fn surface_lock(&self) -> &RecursiveLock {
        &self.surface_lock
    }

    /// Whether a thread other than the caller holds the surface lock.
    #[must_use]
    pub fn is_surface_locked_by_other_thread(&self) -> bool {
        self.surface_lock.is_locked_by_other_thread()
    }

    /// The thread holding the surface lock, if any.
    #[must_use]
    pub fn surface_lock_owner(&self) -> Option<ThreadId> {
        self.surface_lock.owner()
    }

    /// Current surface lock hold count.
    #[must_use]
    pub fn surface_lock_hold_count(&self) -> usize {
        self.surface_lock.hold_count()
    }

    /// Always `false`: buffer swaps are performed by the toolkit.
    #[must_use]
    pub fn surface_swap(&self) -> bool {
        false
    }

    // -----------------------------------------------------------------------
    // Cached native state
    // -----------------------------------------------------------------------

    /// The drawable from the most recent successful lock.
    #[must_use]
    pub fn surface_handle(&self) -> DrawableHandle {
        self.session.lock().drawable
    }

    /// Same as [`surface_handle`](Self::surface_handle); the window and its
    /// surface share one drawable.
    #[must_use]
    pub fn window_handle(&self) -> DrawableHandle {
        self.surface_handle()
    }

    /// The cached native access handle, if fetched.
    #[must_use]
    pub fn native_access(&self) -> Option<NativeAccess> {
        self.session.lock().access
    }

    /// Surface bounds from the most recent successful lock.
    #[must_use]
    pub fn bounds(&self) -> Rect {
        self.session.lock().geometry.bounds()
    }

    /// Host insets from the most recent successful lock.
    #[must_use]
    pub fn insets(&self) -> Insets {
        self.session.lock().geometry.insets()
    }

    /// Whether the host sat inside a plugin container at the last cold lock.
    #[must_use]
    pub fn is_applet(&self) -> bool {
        self.session.lock().is_applet
    }

    /// The screen this window was created on.
    #[must_use]
    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    /// The native display connection of the window's device.
    #[must_use]
    pub fn display_handle(&self) -> DisplayHandle {
        self.screen.device().handle()
    }

    /// The window's screen index on its device.
    #[must_use]
    pub fn screen_index(&self) -> u32 {
        self.screen.index()
    }

    // -----------------------------------------------------------------------
    // Host delegation
    // -----------------------------------------------------------------------

    /// The live host component, if it has not been dropped.
    #[must_use]
    pub fn host(&self) -> Option<Arc<dyn HostComponent>> {
        self.host.upgrade()
    }

    fn host_bounds(&self) -> Rect {
        self.host.upgrade().map_or(Rect::ZERO, |host| host.bounds())
    }

    /// Host x position relative to its parent.
    #[must_use]
    pub fn x(&self) -> f64 {
        self.host_bounds().x0
    }

    /// Host y position relative to its parent.
    #[must_use]
    pub fn y(&self) -> f64 {
        self.host_bounds().y0
    }

    /// Host width.
    #[must_use]
    pub fn width(&self) -> f64 {
        self.host_bounds().width()
    }

    /// Host height.
    #[must_use]
    pub fn height(&self) -> f64 {
        self.host_bounds().height()
    }

    /// Whether the host and all its ancestors are visible and displayable.
    #[must_use]
    pub fn is_showing(&self) -> bool {
        self.host.upgrade().is_some_and(|host| host.is_showing())
    }

    /// Whether the host has keyboard focus.
    #[must_use]
    pub fn has_focus(&self) -> bool {
        self.host.upgrade().is_some_and(|host| host.has_focus())
    }

    /// The surface origin in screen coordinates.
    ///
    /// Asks the platform under a surface lock first. If the surface cannot be
    /// locked or the platform has no answer, sums the origins of the host and
    /// its ancestors up to and including the first top-level container,
    /// without taking any lock.
    ///
    /// # Errors
    ///
    /// Propagates native failures of the lock protocol.
    pub fn location_on_screen(&self) -> Result<Point, SurfaceError> {
        if let Some(point) = self.location_on_screen_native()? {
            return Ok(point);
        }
        Ok(self.location_on_screen_non_blocking())
    }

    fn location_on_screen_native(&self) -> Result<Option<Point>, SurfaceError> {
        let guard = match self.lock_guard()? {
            Ok(guard) => guard,
            Err(_) => return Ok(None),
        };
        let point = {
            let mut session = self.session.lock();
            let session = &mut *session;
            session
                .access
                .and_then(|access| session.platform.location_on_screen(&access))
        };
        guard.unlock()?;
        Ok(point)
    }

    /// Sums host and ancestor origins up to and including the first
    /// top-level container. Takes no locks.
    #[must_use]
    pub fn location_on_screen_non_blocking(&self) -> Point {
        let Some(host) = self.host.upgrade() else {
            return Point::ZERO;
        };
        let mut location = host.bounds().origin();
        if host.kind() == ContainerKind::TopLevel {
            return location;
        }
        for ancestor in host.ancestors() {
            location += ancestor.origin.to_vec2();
            if ancestor.kind == ContainerKind::TopLevel {
                break;
            }
        }
        location
    }

    // -----------------------------------------------------------------------
    // Offscreen layer
    // -----------------------------------------------------------------------

    /// Sets the offscreen-layer preference handed to the next native fetch.
    pub fn set_shall_use_offscreen_layer(&self, value: bool) {
        self.shall_use_offscreen_layer.store(value, Ordering::Relaxed);
    }

    /// The offscreen-layer preference.
    #[must_use]
    pub fn shall_use_offscreen_layer(&self) -> bool {
        self.shall_use_offscreen_layer.load(Ordering::Relaxed)
    }

    /// Whether the fetched native handle draws through an offscreen layer.
    ///
    /// `false` until the first successful fetch and after invalidation.
    #[must_use]
    pub fn is_offscreen_layer_surface_enabled(&self) -> bool {
        self.session
            .lock()
            .access
            .is_some_and(|access| access.offscreen_layer)
    }

    /// Binds `layer` to the surface and requests a host repaint.
    ///
    /// # Errors
    ///
    /// - [`SurfaceError::NotOffscreenLayerSurface`] if the surface does not
    ///   use an offscreen layer.
    /// - [`SurfaceError::Unsupported`] if the platform has no layer support.
    /// - [`SurfaceError::Platform`] if the native attach fails.
    ///
    /// Nothing is recorded on error.
    pub fn attach_surface_layer(&self, layer: LayerHandle) -> Result<(), SurfaceError> {
        {
            let mut session = self.session.lock();
            if !session.access.is_some_and(|access| access.offscreen_layer) {
                return Err(SurfaceError::NotOffscreenLayerSurface);
            }
            session
                .platform
                .offscreen_layers()
                .ok_or(SurfaceError::Unsupported("offscreen layer"))?
                .attach_layer(layer)?;
            self.layer.set(layer);
        }
        self.tracer.layer(&LayerEvent {
            timestamp_us: self.tracer.timestamp_us(),
            kind: LayerEventKind::Attached,
            layer,
        });
        if let Some(host) = self.host.upgrade() {
            host.repaint();
        }
        Ok(())
    }

    /// Unbinds the attached layer.
    ///
    /// The record is cleared when the platform completes the detach, which
    /// may happen after this call returns.
    ///
    /// # Errors
    ///
    /// - [`SurfaceError::NoLayerAttached`] if nothing is attached.
    /// - [`SurfaceError::Unsupported`] if the platform has no layer support.
    /// - [`SurfaceError::Platform`] if the native detach fails.
    pub fn detach_surface_layer(&self) -> Result<(), SurfaceError> {
        let layer = {
            let mut session = self.session.lock();
            let layer = self.layer.get().ok_or(SurfaceError::NoLayerAttached)?;
            let notify = self.layer.detach_notify(layer);
            session
                .platform
                .offscreen_layers()
                .ok_or(SurfaceError::Unsupported("offscreen layer"))?
                .detach_layer(layer, notify)?;
            layer
        };
        self.tracer.layer(&LayerEvent {
            timestamp_us: self.tracer.timestamp_us(),
            kind: LayerEventKind::DetachRequested,
            layer,
        });
        Ok(())
    }

    /// The attached layer, if any.
    #[must_use]
    pub fn attached_surface_layer(&self) -> Option<LayerHandle> {
        self.layer.get()
    }

    /// Whether a layer is attached.
    #[must_use]
    pub fn is_surface_layer_attached(&self) -> bool {
        self.layer.get().is_some()
    }

    /// Re-lays-out the attached layer with the given visibility.
    ///
    /// Does nothing unless the surface uses an offscreen layer and one is
    /// attached. Returns whether the platform was asked to lay out. The
    /// window calls this itself on every resize, move, show, and hide of the
    /// host; toolkits may call it after an ancestor's layout changed.
    ///
    /// # Errors
    ///
    /// Propagates native layout failures.
    pub fn layout_surface_layer_if_enabled(&self, visible: bool) -> Result<bool, SurfaceError> {
        let layer = {
            let mut session = self.session.lock();
            if !session.access.is_some_and(|access| access.offscreen_layer) {
                return Ok(false);
            }
            let Some(layer) = self.layer.get() else {
                return Ok(false);
            };
            let Some(layers) = session.platform.offscreen_layers() else {
                return Ok(false);
            };
            layers.layout_layer(layer, visible)?;
            layer
        };
        self.tracer.layer(&LayerEvent {
            timestamp_us: self.tracer.timestamp_us(),
            kind: LayerEventKind::Layout { visible },
            layer,
        });
        Ok(true)
    }

    // -----------------------------------------------------------------------
    // Visibility
    // -----------------------------------------------------------------------

    /// A snapshot of the visibility state machine.
    #[must_use]
    pub fn visibility(&self) -> VisibilityTracker {
        *self.visibility.lock()
    }

    fn layout_for_visibility(&self) {
        let visible = self.visibility.lock().effective();
        // Notifications never fail; a failed layout is retried on the next one.
        _ = self.layout_surface_layer_if_enabled(visible);
    }

    // -----------------------------------------------------------------------
    // Diagnostics
    // -----------------------------------------------------------------------

    /// Installs a trace sink, returning the previous one.
    ///
    /// Without the `trace` feature on `casement_core` the sink is dropped.
    pub fn set_trace_sink(&self, sink: Option<BoxedSink>) -> Option<BoxedSink> {
        self.tracer.set_sink(sink)
    }

    fn trace_lock(&self, hold_count: usize, status: LockStatus, cold: bool) {
        self.tracer.lock(&LockEvent {
            timestamp_us: self.tracer.timestamp_us(),
            hold_count,
            status,
            cold,
        });
    }
}

impl<P: SurfacePlatform> ComponentListener for SurfaceWindow<P> {
    fn component_changed(&self, event: ComponentEvent) {
        match event {
            ComponentEvent::Resized
            | ComponentEvent::Moved
            | ComponentEvent::Shown
            | ComponentEvent::Hidden => self.layout_for_visibility(),
        }
    }

    fn hierarchy_changed(&self, event: &HierarchyEvent) {
        let Some(host) = self.host.upgrade() else {
            return;
        };
        let host_visible = host.is_visible();
        let (forced, state) = {
            let mut tracker = self.visibility.lock();
            let before = *tracker;
            let forced = tracker.on_hierarchy_changed(event, host_visible);
            if forced.is_none() && *tracker == before {
                return;
            }
            (forced, *tracker)
        };
        self.tracer.visibility(&VisibilityEvent {
            timestamp_us: self.tracer.timestamp_us(),
            local: state.local(),
            global: state.global(),
            propagating: state.is_propagating(),
            forced,
        });
        // No window lock may be held here: the host may echo synchronously.
        if let Some(visible) = forced {
            host.set_visible(visible);
        }
    }
}

/// Scoped surface lock from [`SurfaceWindow::lock_guard`].
///
/// Unlocks on drop. Bound to the locking thread.
#[must_use = "the surface is unlocked as soon as the guard is dropped"]
pub struct SurfaceGuard<'a, P: SurfacePlatform> {
    window: &'a SurfaceWindow<P>,
    status: LockStatus,
    armed: bool,
    _not_send: PhantomData<*const ()>,
}

impl<P: SurfacePlatform> fmt::Debug for SurfaceGuard<'_, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SurfaceGuard")
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}

impl<P: SurfacePlatform> SurfaceGuard<'_, P> {
    /// The status the lock was acquired with.
    #[must_use]
    pub fn status(&self) -> LockStatus {
        self.status
    }

    /// Whether the drawable changed since the previous unlock.
    #[must_use]
    pub fn surface_changed(&self) -> bool {
        self.status == LockStatus::SurfaceChanged
    }

    /// Unlocks now, reporting native unlock failures.
    ///
    /// # Errors
    ///
    /// Same as [`SurfaceWindow::unlock_surface`].
    pub fn unlock(mut self) -> Result<(), SurfaceError> {
        self.armed = false;
        self.window.unlock_surface()
    }
}

impl<P: SurfacePlatform> Drop for SurfaceGuard<'_, P> {
    fn drop(&mut self) {
        if self.armed {
            _ = self.window.unlock_surface();
        }
    }
}
