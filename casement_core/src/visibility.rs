// Copyright 2026 the Casement Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Visibility propagation state machine.
//!
//! A component has its own visibility flag, but whether it is actually on
//! screen also depends on every ancestor. Toolkits do not always push an
//! ancestor's hide/show down into the component's own flag, and they reset
//! that flag when the component loses its native peer. [`VisibilityTracker`]
//! keeps the two apart:
//!
//! - `local` — what the component itself was last asked to be.
//! - `global` — what the ancestor chain was last reported as.
//! - `propagating` — a forced write is in flight and its echo must not be
//!   mistaken for a user-driven change of `local`.
//!
//! The tracker is pure: it looks only at the event and at the host's current
//! visibility flag, and returns the value to force onto the host, if any.
//! Callers perform that write after releasing whatever lock guards the
//! tracker, because toolkits may deliver the echo synchronously.

use crate::host::{ChangedComponent, HierarchyChange, HierarchyEvent};

/// Local/global visibility bookkeeping for one window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VisibilityTracker {
    local: bool,
    global: bool,
    propagating: bool,
}

impl VisibilityTracker {
    /// Starts tracking a component whose visibility flag is `visible`.
    ///
    /// Ancestors are assumed to agree until told otherwise.
    #[must_use]
    pub const fn new(visible: bool) -> Self {
        Self {
            local: visible,
            global: visible,
            propagating: false,
        }
    }

    /// Visibility the component itself was last asked to have.
    #[must_use]
    pub const fn local(&self) -> bool {
        self.local
    }

    /// Visibility last inherited from the ancestor chain.
    #[must_use]
    pub const fn global(&self) -> bool {
        self.global
    }

    /// Whether a forced visibility write is awaiting its echo.
    #[must_use]
    pub const fn is_propagating(&self) -> bool {
        self.propagating
    }

    /// `local && global`: whether the layer should be shown.
    #[must_use]
    pub const fn effective(&self) -> bool {
        self.local && self.global
    }

    /// Applies a hierarchy notification.
    ///
    /// `host_visible` is the host component's own visibility flag at the time
    /// of delivery. Returns the visibility that must be written back to the
    /// host, if any.
    ///
    /// Displayability changes take precedence: when an event carries both
    /// displayability and showing bits, only the former is considered.
    pub fn on_hierarchy_changed(
        &mut self,
        event: &HierarchyEvent,
        host_visible: bool,
    ) -> Option<bool> {
        if event.change.contains(HierarchyChange::DISPLAYABILITY_CHANGED) {
            // Losing the peer resets the host's flag; restore ours.
            let reset = event.changed == ChangedComponent::Own
                && !event.displayable
                && self.local != host_visible;
            if reset {
                self.propagating = true;
                return Some(self.local);
            }
            return None;
        }

        if !event.change.contains(HierarchyChange::SHOWING_CHANGED) {
            return None;
        }

        let showing = event.showing;
        match event.changed {
            ChangedComponent::Ancestor => {
                let visible = showing && self.local;
                if visible == host_visible {
                    return None;
                }
                self.propagating = true;
                self.global = showing;
                Some(visible)
            }
            ChangedComponent::Own => {
                if !self.propagating {
                    self.local = showing;
                }
                self.propagating = false;
                None
            }
        }
    }
}
