// Copyright 2026 the Casement Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Headless backend for casement.
//!
//! Runs the full [`SurfaceWindow`](casement_core::SurfaceWindow) protocol
//! without a windowing system:
//!
//! - [`toolkit`] — [`HeadlessToolkit`](toolkit::HeadlessToolkit), a
//!   component tree that tracks visibility, native peers, and bounds, and
//!   delivers component and hierarchy notifications synchronously.
//! - [`platform`] — [`HeadlessPlatform`](platform::HeadlessPlatform), a
//!   software surface with scriptable lock outcomes and offscreen layers,
//!   inspected through a [`HeadlessProbe`](platform::HeadlessProbe).
//!
//! ```
//! use casement_backend_headless::{HeadlessPlatform, HeadlessToolkit, screen};
//! use casement_core::host::ContainerKind;
//! use casement_core::{LockStatus, SurfaceConfig, SurfaceWindow};
//! use kurbo::Rect;
//!
//! let toolkit = HeadlessToolkit::new();
//! let frame = toolkit.create(ContainerKind::TopLevel, Rect::new(0.0, 0.0, 640.0, 480.0));
//! let canvas = toolkit.create(ContainerKind::Plain, Rect::new(8.0, 30.0, 328.0, 270.0));
//! toolkit.add_child(frame, canvas);
//! toolkit.realize(frame);
//!
//! let window = SurfaceWindow::new(
//!     &toolkit.host(canvas),
//!     screen(0),
//!     HeadlessPlatform::new(),
//!     SurfaceConfig::onscreen(),
//! );
//! assert_eq!(window.lock_surface().unwrap(), LockStatus::Success);
//! assert_eq!(window.width(), 320.0);
//! window.unlock_surface().unwrap();
//! ```

pub mod platform;
pub mod toolkit;

use std::sync::Arc;

use casement_core::DisplayHandle;
use casement_core::device::{Screen, SharedDisplayDevice};

pub use platform::{HeadlessPlatform, HeadlessProbe};
pub use toolkit::{ComponentId, HeadlessToolkit};

/// Native handle of the headless display connection.
pub const DISPLAY_HANDLE: DisplayHandle = DisplayHandle(0x4845_4144);

/// Creates screen `index` on a fresh headless display device.
///
/// Windows on screens from separate calls do not share a device lock; clone
/// the returned [`Screen`] to share one.
#[must_use]
pub fn screen(index: u32) -> Screen {
    Screen::new(Arc::new(SharedDisplayDevice::new(DISPLAY_HANDLE)), index)
}
