// Copyright 2026 the Casement Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Offscreen layer slot.
//!
//! A window records at most one attached offscreen layer. The record lives in
//! a shared atomic so that a platform can finish native teardown on another
//! thread and clear it through a [`DetachNotify`] without touching any of the
//! window's locks.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::handle::LayerHandle;

/// The attached-layer record of one window.
#[derive(Clone, Default)]
pub(crate) struct LayerSlot {
    raw: Arc<AtomicU64>,
}

impl fmt::Debug for LayerSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("LayerSlot").field(&self.get()).finish()
    }
}

impl LayerSlot {
    pub(crate) fn get(&self) -> Option<LayerHandle> {
        LayerHandle::new(self.raw.load(Ordering::Acquire))
    }

    pub(crate) fn set(&self, layer: LayerHandle) {
        self.raw.store(layer.get(), Ordering::Release);
    }

    /// Creates the completion token for detaching `layer`.
    pub(crate) fn detach_notify(&self, layer: LayerHandle) -> DetachNotify {
        DetachNotify {
            slot: Arc::clone(&self.raw),
            layer,
        }
    }
}

/// Completion token for an offscreen layer detach.
///
/// Handed to [`OffscreenLayerPlatform::detach_layer`](crate::platform::OffscreenLayerPlatform::detach_layer).
/// Calling [`complete`](Self::complete) clears the window's attached-layer
/// record, but only if it still names the layer this token was created for.
/// A newer layer attached in the meantime is left alone.
#[must_use = "the layer stays recorded as attached until the notify is completed"]
pub struct DetachNotify {
    slot: Arc<AtomicU64>,
    layer: LayerHandle,
}

impl fmt::Debug for DetachNotify {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DetachNotify")
            .field("layer", &self.layer)
            .finish_non_exhaustive()
    }
}

impl DetachNotify {
    /// The layer being detached.
    #[must_use]
    pub fn layer(&self) -> LayerHandle {
        self.layer
    }

    /// Signals that native teardown has finished.
    ///
    /// Returns whether the record was cleared.
    pub fn complete(self) -> bool {
        self.slot
            .compare_exchange(self.layer.get(), 0, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}
