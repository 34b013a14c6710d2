// Copyright 2026 the Casement Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Cached surface geometry.

use kurbo::{Insets, Rect};

/// Bounds and insets cached from the most recent successful lock.
///
/// Both are empty after invalidation. Updates compare by value so a platform
/// that re-reports identical geometry every frame does not look like a
/// change to downstream consumers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfaceGeometry {
    bounds: Rect,
    insets: Insets,
}

impl Default for SurfaceGeometry {
    fn default() -> Self {
        Self {
            bounds: Rect::ZERO,
            insets: Insets::ZERO,
        }
    }
}

impl SurfaceGeometry {
    /// Returns the cached surface bounds.
    #[must_use]
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Returns the cached host insets.
    #[must_use]
    pub fn insets(&self) -> Insets {
        self.insets
    }

    /// Stores `bounds` if it differs from the cached value.
    ///
    /// Returns the previous bounds when a change was recorded.
    pub fn update_bounds(&mut self, bounds: Rect) -> Option<Rect> {
        if self.bounds == bounds {
            return None;
        }
        let previous = self.bounds;
        self.bounds = bounds;
        Some(previous)
    }

    /// Stores `insets` if they differ from the cached value.
    ///
    /// Returns whether a change was recorded.
    pub fn update_insets(&mut self, insets: Insets) -> bool {
        if self.insets == insets {
            return false;
        }
        self.insets = insets;
        true
    }

    /// Resets bounds and insets to empty.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
