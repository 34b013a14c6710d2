// Copyright 2026 the Casement Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chrome Trace Event Format exporter.
//!
//! [`export`] reads recorded bytes from a [`RecorderSink`](super::recorder::RecorderSink)
//! and writes [Chrome Trace Event Format][format] JSON to the given writer.
//!
//! A cold lock that succeeds opens a `SurfaceLock` duration slice and the
//! matching outermost unlock closes it, so held sessions show up as spans.
//! Everything else is an instant event.
//!
//! [format]: https://docs.google.com/document/d/1CvAClvFfyA5R-PhYUmn5OOQtYMH4h6I0nSsKchNAySU

use std::io::{self, Write};

use casement_core::trace::LayerEventKind;
use serde_json::{Value, json};

use crate::recorder::{RecordedEvent, decode};

const LOCK_TID: u32 = 0;
const LAYER_TID: u32 = 1;
const VISIBILITY_TID: u32 = 2;

fn instant(name: &str, cat: &str, ts: u64, tid: u32, args: Value) -> Value {
    json!({
        "ph": "i",
        "name": name,
        "cat": cat,
        "ts": ts,
        "pid": 0,
        "tid": tid,
        "s": "t",
        "args": args,
    })
}

/// Exports recorded events as Chrome Trace Event Format JSON.
///
/// The output is a complete JSON array of trace event objects, suitable for
/// loading into `chrome://tracing` or [Perfetto](https://ui.perfetto.dev/).
/// Timestamps are the recorded microseconds since window creation.
pub fn export(bytes: &[u8], writer: &mut dyn Write) -> io::Result<()> {
    let mut events: Vec<Value> = Vec::new();

    for recorded in decode(bytes) {
        match recorded {
            RecordedEvent::Lock(e) => {
                if e.cold && e.status.is_locked() {
                    events.push(json!({
                        "ph": "B",
                        "name": "SurfaceLock",
                        "cat": "Lock",
                        "ts": e.timestamp_us,
                        "pid": 0,
                        "tid": LOCK_TID,
                        "args": {
                            "status": format!("{:?}", e.status),
                        }
                    }));
                } else {
                    events.push(instant(
                        if e.cold { "LockFailed" } else { "NestedLock" },
                        "Lock",
                        e.timestamp_us,
                        LOCK_TID,
                        json!({
                            "hold_count": e.hold_count,
                            "status": format!("{:?}", e.status),
                        }),
                    ));
                }
            }
            RecordedEvent::Unlock(e) => {
                if e.outermost {
                    events.push(json!({
                        "ph": "E",
                        "name": "SurfaceLock",
                        "cat": "Lock",
                        "ts": e.timestamp_us,
                        "pid": 0,
                        "tid": LOCK_TID,
                    }));
                } else {
                    events.push(instant(
                        "NestedUnlock",
                        "Lock",
                        e.timestamp_us,
                        LOCK_TID,
                        json!({ "hold_count": e.hold_count }),
                    ));
                }
            }
            RecordedEvent::SurfaceChanged(e) => {
                events.push(instant(
                    "SurfaceChanged",
                    "Surface",
                    e.timestamp_us,
                    LOCK_TID,
                    json!({
                        "previous": format!("{:#x}", e.previous.0),
                        "current": format!("{:#x}", e.current.0),
                    }),
                ));
            }
            RecordedEvent::BoundsChanged(e) => {
                events.push(instant(
                    "BoundsChanged",
                    "Surface",
                    e.timestamp_us,
                    LOCK_TID,
                    json!({
                        "x": e.current.x0,
                        "y": e.current.y0,
                        "width": e.current.width(),
                        "height": e.current.height(),
                    }),
                ));
            }
            RecordedEvent::Invalidate(e) => {
                events.push(instant(
                    "Invalidate",
                    "Surface",
                    e.timestamp_us,
                    LOCK_TID,
                    json!({
                        "attached_layer": e.attached_layer.map(|l| format!("{:#x}", l.get())),
                    }),
                ));
            }
            RecordedEvent::Layer(e) => {
                let (name, visible) = match e.kind {
                    LayerEventKind::Attached => ("LayerAttach", None),
                    LayerEventKind::DetachRequested => ("LayerDetach", None),
                    LayerEventKind::Layout { visible } => ("LayerLayout", Some(visible)),
                };
                events.push(instant(
                    name,
                    "Layer",
                    e.timestamp_us,
                    LAYER_TID,
                    json!({
                        "layer": format!("{:#x}", e.layer.get()),
                        "visible": visible,
                    }),
                ));
            }
            RecordedEvent::Visibility(e) => {
                events.push(instant(
                    "Visibility",
                    "Visibility",
                    e.timestamp_us,
                    VISIBILITY_TID,
                    json!({
                        "local": e.local,
                        "global": e.global,
                        "propagating": e.propagating,
                        "forced": e.forced,
                    }),
                ));
            }
        }
    }

    serde_json::to_writer_pretty(writer, &events)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recorder::RecorderSink;
    use casement_core::LockStatus;
    use casement_core::trace::{LockEvent, TraceSink, UnlockEvent};

    #[test]
    fn export_produces_lock_span() {
        let mut rec = RecorderSink::new();
        rec.on_lock(&LockEvent {
            timestamp_us: 100,
            hold_count: 1,
            status: LockStatus::Success,
            cold: true,
        });
        rec.on_lock(&LockEvent {
            timestamp_us: 110,
            hold_count: 2,
            status: LockStatus::Success,
            cold: false,
        });
        rec.on_unlock(&UnlockEvent {
            timestamp_us: 120,
            hold_count: 1,
            outermost: false,
        });
        rec.on_unlock(&UnlockEvent {
            timestamp_us: 130,
            hold_count: 0,
            outermost: true,
        });

        let mut out = Vec::new();
        export(rec.as_bytes(), &mut out).unwrap();
        let json_str = String::from_utf8(out).unwrap();

        let parsed: Vec<Value> = serde_json::from_str(&json_str).unwrap();
        assert_eq!(parsed.len(), 4);

        assert_eq!(parsed[0]["ph"], "B");
        assert_eq!(parsed[0]["name"], "SurfaceLock");
        assert_eq!(parsed[1]["name"], "NestedLock");
        assert_eq!(parsed[2]["name"], "NestedUnlock");
        assert_eq!(parsed[3]["ph"], "E");
        assert_eq!(parsed[3]["ts"], 130);
    }

    #[test]
    fn failed_cold_lock_is_an_instant() {
        let mut rec = RecorderSink::new();
        rec.on_lock(&LockEvent {
            timestamp_us: 5,
            hold_count: 0,
            status: LockStatus::NotReady,
            cold: true,
        });
        let mut out = Vec::new();
        export(rec.as_bytes(), &mut out).unwrap();
        let parsed: Vec<Value> = serde_json::from_slice(&out).unwrap();
        assert_eq!(parsed[0]["ph"], "i");
        assert_eq!(parsed[0]["name"], "LockFailed");
        assert_eq!(parsed[0]["args"]["status"], "NotReady");
    }

    #[test]
    fn export_empty_recording() {
        let mut out = Vec::new();
        export(&[], &mut out).unwrap();
        let json_str = String::from_utf8(out).unwrap();
        let parsed: Vec<Value> = serde_json::from_str(&json_str).unwrap();
        assert!(parsed.is_empty());
    }
}
