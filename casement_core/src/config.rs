// Copyright 2026 the Casement Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Window configuration.

/// Configuration for a [`SurfaceWindow`](crate::surface::SurfaceWindow).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SurfaceConfig {
    /// Ask the platform for an offscreen-layer surface when it fetches the
    /// native handle.
    ///
    /// This is a hint. Whether the surface actually uses an offscreen layer
    /// is decided by the platform and reported by
    /// [`is_offscreen_layer_surface_enabled`](crate::surface::SurfaceWindow::is_offscreen_layer_surface_enabled).
    /// Can be changed later with
    /// [`set_shall_use_offscreen_layer`](crate::surface::SurfaceWindow::set_shall_use_offscreen_layer);
    /// the new value takes effect at the next native fetch.
    pub prefer_offscreen_layer: bool,
}

impl SurfaceConfig {
    /// Draw directly into the onscreen surface.
    #[must_use]
    pub const fn onscreen() -> Self {
        Self {
            prefer_offscreen_layer: false,
        }
    }

    /// Prefer compositing through an offscreen layer.
    #[must_use]
    pub const fn offscreen() -> Self {
        Self {
            prefer_offscreen_layer: true,
        }
    }
}
