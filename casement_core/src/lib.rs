// Copyright 2026 the Casement Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Surface locking, offscreen layers, and visibility propagation for native
//! windows owned by a host toolkit.
//!
//! `casement_core` sits between a host windowing toolkit, which owns a
//! component's lifecycle, layout, and visibility, and an external rendering
//! client that wants to draw into the component's native surface. The host
//! keeps ownership; this crate only mediates access.
//!
//! # Architecture
//!
//! ```text
//!   client thread                          toolkit event thread
//!       │                                          │
//!       ▼                                          ▼
//!   SurfaceWindow::lock_surface()        ComponentListener::hierarchy_changed()
//!       │                                          │
//!       ├─► RecursiveLock (cold?) ──► DisplayDevice::lock()
//!       │        │                                 │
//!       │        ▼                                 ▼
//!       │   SurfacePlatform::fetch / lock    VisibilityTracker
//!       │        │                                 │
//!       ▼        ▼                                 ▼
//!   LockStatus (Success / SurfaceChanged /   HostComponent::set_visible()
//!               NotReady / Unlockable)       layout_surface_layer_if_enabled()
//! ```
//!
//! **[`lock`]** — [`RecursiveLock`](lock::RecursiveLock), a thread-owned
//! reentrant lock with a hold counter. Backs both the per-surface lock and
//! the default device lock.
//!
//! **[`device`]** — The coarse per-display [`DisplayDevice`](device::DisplayDevice)
//! lock and the [`Screen`](device::Screen) a window lives on.
//!
//! **[`host`]** — The [`HostComponent`](host::HostComponent) contract the
//! toolkit implements, and the notifications it delivers.
//!
//! **[`platform`]** — The [`SurfacePlatform`](platform::SurfacePlatform)
//! strategy that each windowing system implements (native fetch, lock,
//! unlock, and the optional offscreen-layer steps).
//!
//! **[`surface`]** — [`SurfaceWindow`](surface::SurfaceWindow), which ties the
//! pieces together: the lock protocol, the handle cache, geometry, and
//! offscreen layer lifecycle.
//!
//! **[`visibility`]** — The [`VisibilityTracker`](visibility::VisibilityTracker)
//! state machine that reconciles local and inherited visibility.
//!
//! **[`trace`]** — [`TraceSink`](trace::TraceSink) trait and event types,
//! with a [`Tracer`](trace::Tracer) wrapper that is free when the `trace`
//! feature is off.
//!
//! # Crate features
//!
//! - `trace` (disabled by default): Enables `Tracer` dispatch to an installed
//!   sink.

pub mod config;
pub mod device;
pub mod error;
pub mod geometry;
pub mod handle;
pub mod host;
pub mod layer;
pub mod lock;
pub mod platform;
pub mod surface;
pub mod trace;
pub mod visibility;

#[cfg(test)]
pub(crate) mod testing;

pub use config::SurfaceConfig;
pub use error::{LockError, SurfaceError};
pub use handle::{DisplayHandle, DrawableHandle, LayerHandle};
pub use surface::{LockStatus, SurfaceGuard, SurfaceWindow};
