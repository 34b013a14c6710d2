// Copyright 2026 the Casement Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Opaque native handle types.
//!
//! Native windowing systems identify drawables, compositing layers, and
//! display connections by pointer-sized integers. The core never interprets
//! them; it only compares, stores, and hands them back to the platform.

use core::fmt;
use core::num::NonZeroU64;

/// A native drawable (window or surface) handle.
///
/// `DrawableHandle::NONE` (zero) means "no drawable". Two lock cycles that
/// observe different drawables signal a
/// [`SurfaceChanged`](crate::surface::LockStatus::SurfaceChanged) outcome.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct DrawableHandle(pub u64);

impl DrawableHandle {
    /// The absent drawable.
    pub const NONE: Self = Self(0);

    /// Returns whether this handle is [`NONE`](Self::NONE).
    #[inline]
    #[must_use]
    pub const fn is_none(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Debug for DrawableHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DrawableHandle({:#x})", self.0)
    }
}

/// A native offscreen compositing layer handle.
///
/// Never zero; an absent layer is represented as `Option<LayerHandle>::None`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LayerHandle(NonZeroU64);

impl LayerHandle {
    /// Wraps a raw native layer handle, returning `None` for zero.
    #[inline]
    #[must_use]
    pub const fn new(raw: u64) -> Option<Self> {
        match NonZeroU64::new(raw) {
            Some(raw) => Some(Self(raw)),
            None => None,
        }
    }

    /// Returns the raw native value.
    #[inline]
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0.get()
    }
}

impl fmt::Debug for LayerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LayerHandle({:#x})", self.get())
    }
}

/// A native display connection handle, owned by a
/// [`DisplayDevice`](crate::device::DisplayDevice).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct DisplayHandle(pub u64);

impl fmt::Debug for DisplayHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DisplayHandle({:#x})", self.0)
    }
}
