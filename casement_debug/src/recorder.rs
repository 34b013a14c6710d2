// Copyright 2026 the Casement Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compact binary event recording and decoding.
//!
//! [`RecorderSink`] implements [`TraceSink`] and encodes events into a
//! `Vec<u8>` as tagged little-endian records. [`decode`] reads them back as
//! an iterator of [`RecordedEvent`].
//!
//! Hold counts are stored as `u32`, saturating.

use casement_core::handle::{DrawableHandle, LayerHandle};
use casement_core::surface::LockStatus;
use casement_core::trace::{
    BoundsEvent, InvalidateEvent, LayerEvent, LayerEventKind, LockEvent, SurfaceChangeEvent,
    TraceSink, UnlockEvent, VisibilityEvent,
};
use kurbo::Rect;

// ---------------------------------------------------------------------------
// Event type discriminants
// ---------------------------------------------------------------------------

const TAG_LOCK: u8 = 1;
const TAG_UNLOCK: u8 = 2;
const TAG_SURFACE_CHANGED: u8 = 3;
const TAG_BOUNDS_CHANGED: u8 = 4;
const TAG_INVALIDATE: u8 = 5;
const TAG_LAYER: u8 = 6;
const TAG_VISIBILITY: u8 = 7;

// ---------------------------------------------------------------------------
// RecorderSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that encodes events into a compact binary buffer.
#[derive(Debug, Default)]
pub struct RecorderSink {
    buf: Vec<u8>,
}

impl RecorderSink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a view of the recorded bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consumes the recorder and returns the recorded bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    // -- encoding helpers --------------------------------------------------

    fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn write_bool(&mut self, v: bool) {
        self.write_u8(u8::from(v));
    }

    fn write_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_f64(&mut self, v: f64) {
        self.write_u64(v.to_bits());
    }

    fn write_hold_count(&mut self, holds: usize) {
        self.write_u32(u32::try_from(holds).unwrap_or(u32::MAX));
    }

    fn write_rect(&mut self, r: Rect) {
        self.write_f64(r.x0);
        self.write_f64(r.y0);
        self.write_f64(r.x1);
        self.write_f64(r.y1);
    }

    fn write_option_bool(&mut self, v: Option<bool>) {
        match v {
            Some(true) => self.write_u8(2),
            Some(false) => self.write_u8(1),
            None => self.write_u8(0),
        }
    }

    fn write_status(&mut self, s: LockStatus) {
        self.write_u8(match s {
            LockStatus::Success => 0,
            LockStatus::SurfaceChanged => 1,
            LockStatus::NotReady => 2,
            LockStatus::Unlockable => 3,
        });
    }
}

impl TraceSink for RecorderSink {
    fn on_lock(&mut self, e: &LockEvent) {
        self.write_u8(TAG_LOCK);
        self.write_u64(e.timestamp_us);
        self.write_hold_count(e.hold_count);
        self.write_status(e.status);
        self.write_bool(e.cold);
    }

    fn on_unlock(&mut self, e: &UnlockEvent) {
        self.write_u8(TAG_UNLOCK);
        self.write_u64(e.timestamp_us);
        self.write_hold_count(e.hold_count);
        self.write_bool(e.outermost);
    }

    fn on_surface_changed(&mut self, e: &SurfaceChangeEvent) {
        self.write_u8(TAG_SURFACE_CHANGED);
        self.write_u64(e.timestamp_us);
        self.write_u64(e.previous.0);
        self.write_u64(e.current.0);
    }

    fn on_bounds_changed(&mut self, e: &BoundsEvent) {
        self.write_u8(TAG_BOUNDS_CHANGED);
        self.write_u64(e.timestamp_us);
        self.write_rect(e.previous);
        self.write_rect(e.current);
    }

    fn on_invalidate(&mut self, e: &InvalidateEvent) {
        self.write_u8(TAG_INVALIDATE);
        self.write_u64(e.timestamp_us);
        self.write_u64(e.attached_layer.map_or(0, LayerHandle::get));
    }

    fn on_layer(&mut self, e: &LayerEvent) {
        self.write_u8(TAG_LAYER);
        self.write_u64(e.timestamp_us);
        self.write_u8(match e.kind {
            LayerEventKind::Attached => 0,
            LayerEventKind::DetachRequested => 1,
            LayerEventKind::Layout { visible: false } => 2,
            LayerEventKind::Layout { visible: true } => 3,
        });
        self.write_u64(e.layer.get());
    }

    fn on_visibility(&mut self, e: &VisibilityEvent) {
        self.write_u8(TAG_VISIBILITY);
        self.write_u64(e.timestamp_us);
        self.write_bool(e.local);
        self.write_bool(e.global);
        self.write_bool(e.propagating);
        self.write_option_bool(e.forced);
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// A decoded event from a binary recording.
#[derive(Clone, Debug, PartialEq)]
pub enum RecordedEvent {
    /// A [`LockEvent`].
    Lock(LockEvent),
    /// An [`UnlockEvent`].
    Unlock(UnlockEvent),
    /// A [`SurfaceChangeEvent`].
    SurfaceChanged(SurfaceChangeEvent),
    /// A [`BoundsEvent`].
    BoundsChanged(BoundsEvent),
    /// An [`InvalidateEvent`].
    Invalidate(InvalidateEvent),
    /// A [`LayerEvent`].
    Layer(LayerEvent),
    /// A [`VisibilityEvent`].
    Visibility(VisibilityEvent),
}

impl RecordedEvent {
    /// The event's timestamp in microseconds.
    #[must_use]
    pub fn timestamp_us(&self) -> u64 {
        match self {
            Self::Lock(e) => e.timestamp_us,
            Self::Unlock(e) => e.timestamp_us,
            Self::SurfaceChanged(e) => e.timestamp_us,
            Self::BoundsChanged(e) => e.timestamp_us,
            Self::Invalidate(e) => e.timestamp_us,
            Self::Layer(e) => e.timestamp_us,
            Self::Visibility(e) => e.timestamp_us,
        }
    }
}

/// Decodes a byte slice produced by [`RecorderSink`] into an iterator of
/// [`RecordedEvent`].
///
/// Iteration stops at the first truncated or unrecognized record.
pub fn decode(bytes: &[u8]) -> DecodeIter<'_> {
    DecodeIter {
        data: bytes,
        pos: 0,
    }
}

/// Iterator over decoded events.
#[derive(Debug)]
pub struct DecodeIter<'a> {
    data: &'a [u8],
    pos: usize,
}

impl DecodeIter<'_> {
    fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn read_u8(&mut self) -> Option<u8> {
        if self.remaining() < 1 {
            return None;
        }
        let v = self.data[self.pos];
        self.pos += 1;
        Some(v)
    }

    fn read_bool(&mut self) -> Option<bool> {
        Some(self.read_u8()? != 0)
    }

    fn read_u32(&mut self) -> Option<u32> {
        if self.remaining() < 4 {
            return None;
        }
        let v = u32::from_le_bytes(self.data[self.pos..self.pos + 4].try_into().ok()?);
        self.pos += 4;
        Some(v)
    }

    fn read_u64(&mut self) -> Option<u64> {
        if self.remaining() < 8 {
            return None;
        }
        let v = u64::from_le_bytes(self.data[self.pos..self.pos + 8].try_into().ok()?);
        self.pos += 8;
        Some(v)
    }

    fn read_f64(&mut self) -> Option<f64> {
        Some(f64::from_bits(self.read_u64()?))
    }

    fn read_hold_count(&mut self) -> Option<usize> {
        usize::try_from(self.read_u32()?).ok()
    }

    fn read_rect(&mut self) -> Option<Rect> {
        Some(Rect::new(
            self.read_f64()?,
            self.read_f64()?,
            self.read_f64()?,
            self.read_f64()?,
        ))
    }

    fn read_option_bool(&mut self) -> Option<Option<bool>> {
        let v = self.read_u8()?;
        Some(match v {
            0 => None,
            1 => Some(false),
            _ => Some(true),
        })
    }

    fn read_status(&mut self) -> Option<LockStatus> {
        Some(match self.read_u8()? {
            0 => LockStatus::Success,
            1 => LockStatus::SurfaceChanged,
            2 => LockStatus::NotReady,
            _ => LockStatus::Unlockable,
        })
    }

    fn decode_lock(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Lock(LockEvent {
            timestamp_us: self.read_u64()?,
            hold_count: self.read_hold_count()?,
            status: self.read_status()?,
            cold: self.read_bool()?,
        }))
    }

    fn decode_unlock(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Unlock(UnlockEvent {
            timestamp_us: self.read_u64()?,
            hold_count: self.read_hold_count()?,
            outermost: self.read_bool()?,
        }))
    }

    fn decode_surface_changed(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::SurfaceChanged(SurfaceChangeEvent {
            timestamp_us: self.read_u64()?,
            previous: DrawableHandle(self.read_u64()?),
            current: DrawableHandle(self.read_u64()?),
        }))
    }

    fn decode_bounds_changed(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::BoundsChanged(BoundsEvent {
            timestamp_us: self.read_u64()?,
            previous: self.read_rect()?,
            current: self.read_rect()?,
        }))
    }

    fn decode_invalidate(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Invalidate(InvalidateEvent {
            timestamp_us: self.read_u64()?,
            attached_layer: LayerHandle::new(self.read_u64()?),
        }))
    }

    fn decode_layer(&mut self) -> Option<RecordedEvent> {
        let timestamp_us = self.read_u64()?;
        let kind = match self.read_u8()? {
            0 => LayerEventKind::Attached,
            1 => LayerEventKind::DetachRequested,
            2 => LayerEventKind::Layout { visible: false },
            _ => LayerEventKind::Layout { visible: true },
        };
        let layer = LayerHandle::new(self.read_u64()?)?;
        Some(RecordedEvent::Layer(LayerEvent {
            timestamp_us,
            kind,
            layer,
        }))
    }

    fn decode_visibility(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Visibility(VisibilityEvent {
            timestamp_us: self.read_u64()?,
            local: self.read_bool()?,
            global: self.read_bool()?,
            propagating: self.read_bool()?,
            forced: self.read_option_bool()?,
        }))
    }
}

impl Iterator for DecodeIter<'_> {
    type Item = RecordedEvent;

    fn next(&mut self) -> Option<Self::Item> {
        let tag = self.read_u8()?;
        match tag {
            TAG_LOCK => self.decode_lock(),
            TAG_UNLOCK => self.decode_unlock(),
            TAG_SURFACE_CHANGED => self.decode_surface_changed(),
            TAG_BOUNDS_CHANGED => self.decode_bounds_changed(),
            TAG_INVALIDATE => self.decode_invalidate(),
            TAG_LAYER => self.decode_layer(),
            TAG_VISIBILITY => self.decode_visibility(),
            _ => None, // unknown tag → stop iteration
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn layer(raw: u64) -> LayerHandle {
        LayerHandle::new(raw).unwrap()
    }

    #[test]
    fn lock_cycle_decodes_in_order() {
        let mut rec = RecorderSink::new();
        rec.on_lock(&LockEvent {
            timestamp_us: 10,
            hold_count: 1,
            status: LockStatus::SurfaceChanged,
            cold: true,
        });
        rec.on_surface_changed(&SurfaceChangeEvent {
            timestamp_us: 10,
            previous: DrawableHandle(0x10),
            current: DrawableHandle(0x20),
        });
        rec.on_unlock(&UnlockEvent {
            timestamp_us: 25,
            hold_count: 0,
            outermost: true,
        });

        let events: Vec<_> = decode(rec.as_bytes()).collect();
        assert_eq!(events.len(), 3);
        match &events[0] {
            RecordedEvent::Lock(e) => {
                assert_eq!(e.hold_count, 1);
                assert_eq!(e.status, LockStatus::SurfaceChanged);
                assert!(e.cold);
            }
            other => panic!("expected Lock, got {other:?}"),
        }
        match &events[1] {
            RecordedEvent::SurfaceChanged(e) => {
                assert_eq!(e.previous, DrawableHandle(0x10));
                assert_eq!(e.current, DrawableHandle(0x20));
            }
            other => panic!("expected SurfaceChanged, got {other:?}"),
        }
        assert_eq!(events[2].timestamp_us(), 25);
    }

    #[test]
    fn bounds_keep_fractional_coordinates() {
        let mut rec = RecorderSink::new();
        let current = Rect::new(0.5, 1.25, 640.5, 481.25);
        rec.on_bounds_changed(&BoundsEvent {
            timestamp_us: 3,
            previous: Rect::ZERO,
            current,
        });
        match decode(rec.as_bytes()).next() {
            Some(RecordedEvent::BoundsChanged(e)) => assert_eq!(e.current, current),
            other => panic!("expected BoundsChanged, got {other:?}"),
        }
    }

    #[test]
    fn layer_and_visibility_events() {
        let mut rec = RecorderSink::new();
        rec.on_layer(&LayerEvent {
            timestamp_us: 1,
            kind: LayerEventKind::Layout { visible: true },
            layer: layer(7),
        });
        rec.on_invalidate(&InvalidateEvent {
            timestamp_us: 2,
            attached_layer: None,
        });
        rec.on_visibility(&VisibilityEvent {
            timestamp_us: 3,
            local: true,
            global: false,
            propagating: true,
            forced: Some(false),
        });

        let events: Vec<_> = decode(rec.as_bytes()).collect();
        assert_eq!(
            events,
            vec![
                RecordedEvent::Layer(LayerEvent {
                    timestamp_us: 1,
                    kind: LayerEventKind::Layout { visible: true },
                    layer: layer(7),
                }),
                RecordedEvent::Invalidate(InvalidateEvent {
                    timestamp_us: 2,
                    attached_layer: None,
                }),
                RecordedEvent::Visibility(VisibilityEvent {
                    timestamp_us: 3,
                    local: true,
                    global: false,
                    propagating: true,
                    forced: Some(false),
                }),
            ]
        );
    }

    #[test]
    fn truncated_record_stops_iteration() {
        let mut rec = RecorderSink::new();
        rec.on_unlock(&UnlockEvent {
            timestamp_us: 1,
            hold_count: 0,
            outermost: true,
        });
        rec.on_unlock(&UnlockEvent {
            timestamp_us: 2,
            hold_count: 0,
            outermost: true,
        });
        let bytes = rec.into_bytes();
        let events: Vec<_> = decode(&bytes[..bytes.len() - 1]).collect();
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn empty_buffer_decodes_to_nothing() {
        let events: Vec<_> = decode(&[]).collect();
        assert!(events.is_empty());
    }
}
