// Copyright 2026 the Casement Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Display devices and screens.
//!
//! A [`DisplayDevice`] represents a native display connection (an X11
//! `Display*`, a Win32 device context owner, …). Its lock is coarser than
//! any single surface lock: it serializes native calls against the whole
//! connection. [`SurfaceWindow`](crate::surface::SurfaceWindow) acquires it
//! only after winning the cold surface acquisition and releases it before
//! releasing the surface lock.

use std::fmt;
use std::sync::Arc;

use crate::handle::DisplayHandle;
use crate::lock::RecursiveLock;

/// A native display connection with a reentrant-safe lock.
pub trait DisplayDevice: Send + Sync {
    /// Acquires the device lock, blocking as needed. Must be reentrant for
    /// the owning thread.
    fn lock(&self);

    /// Releases one hold of the device lock.
    fn unlock(&self);

    /// Returns the native display handle.
    fn handle(&self) -> DisplayHandle;
}

/// A [`DisplayDevice`] whose lock is a process-local [`RecursiveLock`].
///
/// Suitable for toolkits whose native connection is already thread-safe, and
/// for tests.
pub struct SharedDisplayDevice {
    handle: DisplayHandle,
    lock: RecursiveLock,
}

impl fmt::Debug for SharedDisplayDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedDisplayDevice")
            .field("handle", &self.handle)
            .field("lock", &self.lock)
            .finish()
    }
}

impl SharedDisplayDevice {
    /// Creates a device for the given native display handle.
    #[must_use]
    pub fn new(handle: DisplayHandle) -> Self {
        Self {
            handle,
            lock: RecursiveLock::new(),
        }
    }

    /// Returns the underlying lock, for diagnostics.
    #[must_use]
    pub fn raw_lock(&self) -> &RecursiveLock {
        &self.lock
    }
}

impl DisplayDevice for SharedDisplayDevice {
    fn lock(&self) {
        self.lock.lock();
    }

    fn unlock(&self) {
        self.lock.unlock();
    }

    fn handle(&self) -> DisplayHandle {
        self.handle
    }
}

/// A screen on a display device. Windows are created against a screen.
#[derive(Clone)]
pub struct Screen {
    device: Arc<dyn DisplayDevice>,
    index: u32,
}

impl fmt::Debug for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Screen")
            .field("device", &self.device.handle())
            .field("index", &self.index)
            .finish()
    }
}

impl Screen {
    /// Creates a screen with the given index on `device`.
    #[must_use]
    pub fn new(device: Arc<dyn DisplayDevice>, index: u32) -> Self {
        Self { device, index }
    }

    /// Returns the device this screen belongs to.
    #[must_use]
    pub fn device(&self) -> &dyn DisplayDevice {
        &*self.device
    }

    /// Returns the screen index on its device.
    #[must_use]
    pub fn index(&self) -> u32 {
        self.index
    }
}
