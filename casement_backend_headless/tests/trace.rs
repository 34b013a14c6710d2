// Copyright 2026 the Casement Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Recording a window's trace and exporting it.

use casement_backend_headless::{HeadlessPlatform, HeadlessToolkit, screen};
use casement_core::host::ContainerKind;
use casement_core::trace::{self, LayerEventKind};
use casement_core::{LayerHandle, LockStatus, SurfaceConfig, SurfaceWindow};
use casement_debug::chrome;
use casement_debug::recorder::{RecordedEvent, RecorderSink, decode};
use kurbo::Rect;
use serde_json::Value;

#[test]
fn lock_cycle_and_visibility_are_recorded() {
    let toolkit = HeadlessToolkit::new();
    let frame = toolkit.create(ContainerKind::TopLevel, Rect::new(0.0, 0.0, 200.0, 200.0));
    let canvas = toolkit.create(ContainerKind::Plain, Rect::new(0.0, 0.0, 64.0, 64.0));
    toolkit.add_child(frame, canvas);
    toolkit.realize(frame);

    let window = SurfaceWindow::new(
        &toolkit.host(canvas),
        screen(0),
        HeadlessPlatform::with_offscreen_layers(true),
        SurfaceConfig::offscreen(),
    );
    let recorder = trace::share(RecorderSink::new());
    assert!(window.set_trace_sink(Some(Box::new(recorder.clone()))).is_none());

    assert_eq!(window.lock_surface().unwrap(), LockStatus::Success);
    assert_eq!(window.lock_surface().unwrap(), LockStatus::Success);
    window.unlock_surface().unwrap();
    window.unlock_surface().unwrap();
    let layer = LayerHandle::new(0x99).unwrap();
    window.attach_surface_layer(layer).unwrap();
    toolkit.set_visible(frame, false);
    window.invalidate();

    let bytes = recorder.lock().as_bytes().to_vec();
    let events: Vec<RecordedEvent> = decode(&bytes).collect();

    let locks: Vec<_> = events
        .iter()
        .filter_map(|e| match e {
            RecordedEvent::Lock(l) => Some((l.hold_count, l.cold)),
            _ => None,
        })
        .collect();
    assert_eq!(locks, vec![(1, true), (2, false)]);

    let unlocks: Vec<_> = events
        .iter()
        .filter_map(|e| match e {
            RecordedEvent::Unlock(u) => Some(u.outermost),
            _ => None,
        })
        .collect();
    assert_eq!(unlocks, vec![false, true]);

    assert!(events.iter().any(|e| matches!(
        e,
        RecordedEvent::BoundsChanged(b) if b.current == Rect::new(0.0, 0.0, 64.0, 64.0)
    )));
    assert!(events.iter().any(|e| matches!(
        e,
        RecordedEvent::Layer(l) if l.kind == LayerEventKind::Attached && l.layer == layer
    )));
    assert!(events.iter().any(|e| matches!(
        e,
        RecordedEvent::Visibility(v) if v.forced == Some(false) && !v.global
    )));
    assert!(matches!(
        events.last(),
        Some(RecordedEvent::Invalidate(i)) if i.attached_layer == Some(layer)
    ));
    assert!(
        events
            .windows(2)
            .all(|w| w[0].timestamp_us() <= w[1].timestamp_us())
    );

    let mut out = Vec::new();
    chrome::export(&bytes, &mut out).unwrap();
    let parsed: Vec<Value> = serde_json::from_slice(&out).unwrap();
    assert_eq!(parsed.len(), events.len());
    assert_eq!(parsed.iter().filter(|e| e["ph"] == "B").count(), 1);
    assert_eq!(parsed.iter().filter(|e| e["ph"] == "E").count(), 1);
}

#[test]
fn replacing_the_sink_returns_the_previous_one() {
    let toolkit = HeadlessToolkit::new();
    let canvas = toolkit.create(ContainerKind::Plain, Rect::new(0.0, 0.0, 8.0, 8.0));
    let window = SurfaceWindow::new(
        &toolkit.host(canvas),
        screen(0),
        HeadlessPlatform::new(),
        SurfaceConfig::onscreen(),
    );

    let first = trace::share(RecorderSink::new());
    assert!(window.set_trace_sink(Some(Box::new(first.clone()))).is_none());
    assert_eq!(window.lock_surface().unwrap(), LockStatus::NotReady);
    assert!(window.set_trace_sink(None).is_some());
    assert_eq!(window.lock_surface().unwrap(), LockStatus::NotReady);

    let recorded: Vec<_> = decode(first.lock().as_bytes()).collect();
    assert_eq!(recorded.len(), 1);
    assert!(matches!(
        &recorded[0],
        RecordedEvent::Lock(l) if l.status == LockStatus::NotReady && l.cold
    ));
}
