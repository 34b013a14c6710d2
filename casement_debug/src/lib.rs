// Copyright 2026 the Casement Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Recording, pretty-printing, and Chrome trace export for casement
//! diagnostics.
//!
//! This crate provides [`TraceSink`](casement_core::trace::TraceSink)
//! implementations for development and post-mortem analysis:
//!
//! - [`pretty::PrettyPrintSink`] — human-readable one-line-per-event output.
//! - [`recorder::RecorderSink`] — compact binary recording with
//!   [`recorder::decode`] for playback.
//! - [`chrome::export`] — writes Chrome Trace Event Format JSON from recorded
//!   bytes.
//!
//! Sinks are installed with
//! [`SurfaceWindow::set_trace_sink`](casement_core::SurfaceWindow::set_trace_sink).
//! To inspect a sink while the window still owns it, wrap it with
//! [`trace::share`](casement_core::trace::share) and install a clone.

pub mod chrome;
pub mod pretty;
pub mod recorder;
