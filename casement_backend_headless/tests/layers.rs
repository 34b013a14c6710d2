// Copyright 2026 the Casement Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Offscreen layer lifecycle on the headless platform.

use std::sync::Arc;
use std::thread;

use casement_backend_headless::{HeadlessPlatform, HeadlessProbe, HeadlessToolkit, screen};
use casement_core::host::ContainerKind;
use casement_core::{LayerHandle, SurfaceConfig, SurfaceError, SurfaceWindow};
use kurbo::Rect;

fn layer(raw: u64) -> LayerHandle {
    LayerHandle::new(raw).unwrap()
}

/// A realized canvas in a frame, optionally inside a plugin container.
fn setup(
    supported: bool,
    config: SurfaceConfig,
    plugin_hosted: bool,
) -> (HeadlessToolkit, HeadlessProbe, Arc<SurfaceWindow<HeadlessPlatform>>) {
    let toolkit = HeadlessToolkit::new();
    let frame = toolkit.create(ContainerKind::TopLevel, Rect::new(0.0, 0.0, 640.0, 480.0));
    let canvas = toolkit.create(ContainerKind::Plain, Rect::new(0.0, 0.0, 320.0, 240.0));
    if plugin_hosted {
        let applet = toolkit.create(ContainerKind::PluginHost, Rect::new(0.0, 0.0, 640.0, 480.0));
        toolkit.add_child(frame, applet);
        toolkit.add_child(applet, canvas);
    } else {
        toolkit.add_child(frame, canvas);
    }
    toolkit.realize(frame);

    let platform = HeadlessPlatform::with_offscreen_layers(supported);
    let probe = platform.probe();
    let window = SurfaceWindow::new(&toolkit.host(canvas), screen(0), platform, config);
    assert!(window.lock_surface().unwrap().is_locked());
    window.unlock_surface().unwrap();
    (toolkit, probe, window)
}

#[test]
fn onscreen_surfaces_reject_layers() {
    let (_tk, probe, window) = setup(false, SurfaceConfig::offscreen(), false);
    assert!(!window.is_offscreen_layer_surface_enabled());
    assert_eq!(
        window.attach_surface_layer(layer(1)),
        Err(SurfaceError::NotOffscreenLayerSurface)
    );

    let (_tk, _probe, onscreen) = setup(true, SurfaceConfig::onscreen(), false);
    assert_eq!(
        onscreen.attach_surface_layer(layer(1)),
        Err(SurfaceError::NotOffscreenLayerSurface)
    );
    assert!(!onscreen.is_surface_layer_attached());
    assert_eq!(probe.attached_layers(), 0);
}

#[test]
fn plugin_containers_get_offscreen_layers() {
    let (_tk, probe, window) = setup(true, SurfaceConfig::onscreen(), true);
    assert!(window.is_applet());
    assert!(window.is_offscreen_layer_surface_enabled());
    window.attach_surface_layer(layer(5)).unwrap();
    assert_eq!(probe.attached_layers(), 1);
}

#[test]
fn preference_applies_at_next_fetch() {
    let (_tk, probe, window) = setup(true, SurfaceConfig::onscreen(), false);
    assert!(!window.is_offscreen_layer_surface_enabled());

    window.set_shall_use_offscreen_layer(true);
    assert!(!window.is_offscreen_layer_surface_enabled());

    window.invalidate();
    assert!(window.lock_surface().unwrap().is_locked());
    window.unlock_surface().unwrap();
    assert!(probe.last_hints().unwrap().prefer_offscreen_layer);
    assert!(window.is_offscreen_layer_surface_enabled());
}

#[test]
fn attach_layout_detach() {
    let (_tk, probe, window) = setup(true, SurfaceConfig::offscreen(), false);

    window.attach_surface_layer(layer(0x10)).unwrap();
    assert_eq!(window.attached_surface_layer(), Some(layer(0x10)));

    assert!(window.layout_surface_layer_if_enabled(true).unwrap());
    let state = probe.layer(layer(0x10)).unwrap();
    assert!(state.visible);
    assert_eq!(state.frame, Rect::new(0.0, 0.0, 320.0, 240.0));

    window.detach_surface_layer().unwrap();
    assert!(!window.is_surface_layer_attached());
    assert_eq!(probe.layer(layer(0x10)), None);
    assert!(!window.layout_surface_layer_if_enabled(true).unwrap());
}

#[test]
fn failed_attach_records_nothing() {
    let (_tk, probe, window) = setup(true, SurfaceConfig::offscreen(), false);
    window.attach_surface_layer(layer(3)).unwrap();
    window.detach_surface_layer().unwrap();

    // Binding an already bound handle fails natively.
    window.attach_surface_layer(layer(4)).unwrap();
    assert!(matches!(
        window.attach_surface_layer(layer(4)),
        Err(SurfaceError::Platform { .. })
    ));
    assert_eq!(window.attached_surface_layer(), Some(layer(4)));
    assert_eq!(probe.attached_layers(), 1);
}

#[test]
fn deferred_detach_completes_from_another_thread() {
    let (_tk, probe, window) = setup(true, SurfaceConfig::offscreen(), false);
    probe.defer_detach(true);

    window.attach_surface_layer(layer(1)).unwrap();
    window.detach_surface_layer().unwrap();
    assert_eq!(window.attached_surface_layer(), Some(layer(1)));

    let completer = probe.clone();
    let cleared = thread::spawn(move || completer.complete_pending_detaches())
        .join()
        .unwrap();
    assert_eq!(cleared, 1);
    assert_eq!(window.attached_surface_layer(), None);
    assert_eq!(probe.attached_layers(), 0);
}

#[test]
fn late_detach_completion_keeps_newer_layer() {
    let (_tk, probe, window) = setup(true, SurfaceConfig::offscreen(), false);
    probe.defer_detach(true);

    window.attach_surface_layer(layer(1)).unwrap();
    window.detach_surface_layer().unwrap();
    window.attach_surface_layer(layer(2)).unwrap();

    assert_eq!(probe.complete_pending_detaches(), 0);
    assert_eq!(window.attached_surface_layer(), Some(layer(2)));
    assert!(probe.layer(layer(2)).is_some());
    assert!(probe.layer(layer(1)).is_none());
}

#[test]
fn layer_outlives_invalidate() {
    let (_tk, _probe, window) = setup(true, SurfaceConfig::offscreen(), false);
    window.attach_surface_layer(layer(8)).unwrap();
    window.destroy();
    assert_eq!(window.attached_surface_layer(), Some(layer(8)));
    assert!(!window.is_offscreen_layer_surface_enabled());
    assert!(!window.layout_surface_layer_if_enabled(true).unwrap());
}
