// Copyright 2026 the Casement Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr). Timestamps
//! are printed in milliseconds since the window was created.

use std::io::Write;

use casement_core::trace::{
    BoundsEvent, InvalidateEvent, LayerEvent, LayerEventKind, LockEvent, SurfaceChangeEvent,
    TraceSink, UnlockEvent, VisibilityEvent,
};
use kurbo::Rect;

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write + Send = Box<dyn Write + Send>> {
    writer: W,
}

impl<W: Write + Send> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink").finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self {
            writer: Box::new(std::io::stderr()),
        }
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write + Send>) -> Self {
        Self { writer }
    }
}

impl<W: Write + Send> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self { writer }
    }

    /// Consumes the sink and returns the destination.
    #[must_use]
    pub fn into_writer(self) -> W {
        self.writer
    }
}

fn ms(timestamp_us: u64) -> f64 {
    timestamp_us as f64 / 1000.0
}

fn rect(r: Rect) -> String {
    format!("{}x{}@{},{}", r.width(), r.height(), r.x0, r.y0)
}

fn flag(value: bool, name: &'static str) -> &'static str {
    if value { name } else { "-" }
}

impl<W: Write + Send> TraceSink for PrettyPrintSink<W> {
    fn on_lock(&mut self, e: &LockEvent) {
        let _ = writeln!(
            self.writer,
            "[lock] {:.3}ms hold={} status={:?} {}",
            ms(e.timestamp_us),
            e.hold_count,
            e.status,
            if e.cold { "cold" } else { "nested" },
        );
    }

    fn on_unlock(&mut self, e: &UnlockEvent) {
        let _ = writeln!(
            self.writer,
            "[unlock] {:.3}ms hold={} {}",
            ms(e.timestamp_us),
            e.hold_count,
            if e.outermost { "outermost" } else { "nested" },
        );
    }

    fn on_surface_changed(&mut self, e: &SurfaceChangeEvent) {
        let _ = writeln!(
            self.writer,
            "[surface] {:.3}ms {:#x} -> {:#x}",
            ms(e.timestamp_us),
            e.previous.0,
            e.current.0,
        );
    }

    fn on_bounds_changed(&mut self, e: &BoundsEvent) {
        let _ = writeln!(
            self.writer,
            "[bounds] {:.3}ms {} -> {}",
            ms(e.timestamp_us),
            rect(e.previous),
            rect(e.current),
        );
    }

    fn on_invalidate(&mut self, e: &InvalidateEvent) {
        match e.attached_layer {
            Some(layer) => {
                let _ = writeln!(
                    self.writer,
                    "[invalidate] {:.3}ms layer {:#x} still attached",
                    ms(e.timestamp_us),
                    layer.get(),
                );
            }
            None => {
                let _ = writeln!(self.writer, "[invalidate] {:.3}ms", ms(e.timestamp_us));
            }
        }
    }

    fn on_layer(&mut self, e: &LayerEvent) {
        let step = match e.kind {
            LayerEventKind::Attached => "attach",
            LayerEventKind::DetachRequested => "detach",
            LayerEventKind::Layout { visible: true } => "layout visible",
            LayerEventKind::Layout { visible: false } => "layout hidden",
        };
        let _ = writeln!(
            self.writer,
            "[layer] {:.3}ms {step} {:#x}",
            ms(e.timestamp_us),
            e.layer.get(),
        );
    }

    fn on_visibility(&mut self, e: &VisibilityEvent) {
        let forced = match e.forced {
            Some(true) => "show",
            Some(false) => "hide",
            None => "none",
        };
        let _ = writeln!(
            self.writer,
            "[visibility] {:.3}ms {} {} {} forced={forced}",
            ms(e.timestamp_us),
            flag(e.local, "local"),
            flag(e.global, "global"),
            flag(e.propagating, "propagating"),
        );
    }
}
