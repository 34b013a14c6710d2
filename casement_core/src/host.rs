// Copyright 2026 the Casement Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Host toolkit contract.
//!
//! The host toolkit owns the component tree, dispatches events, and lays
//! components out. A [`SurfaceWindow`](crate::surface::SurfaceWindow) only
//! needs the narrow view defined here: a few queries on the component and
//! its ancestors, a visibility setter, and listener registration.
//!
//! # Notification delivery
//!
//! Toolkits deliver [`ComponentEvent`]s and [`HierarchyEvent`]s to every
//! registered [`ComponentListener`]. Delivery may be synchronous with the
//! change that caused it, including changes the window itself makes through
//! [`HostComponent::set_visible`]. Listeners must therefore tolerate being
//! re-entered from within their own calls into the host, and hosts must not
//! hold internal locks while dispatching.

use std::sync::Weak;

use kurbo::{Insets, Point, Rect};

/// What kind of container a component or ancestor is.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ContainerKind {
    /// An ordinary lightweight or heavyweight component.
    #[default]
    Plain,
    /// A plugin or applet container embedded in a foreign host (e.g. a
    /// browser). Platforms may prefer offscreen layers inside one.
    PluginHost,
    /// A top-level window. Ancestor walks for screen location stop here.
    TopLevel,
}

/// A snapshot of one ancestor of the host component.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ancestor {
    /// What kind of container this ancestor is.
    pub kind: ContainerKind,
    /// Origin of the ancestor relative to its own parent.
    pub origin: Point,
    /// Whether the ancestor is currently showing on screen.
    pub showing: bool,
}

/// The toolkit component that owns the native surface.
///
/// All methods are queries or requests against toolkit state; none of them
/// may call back into the window synchronously except through listener
/// dispatch (see the [module docs](self)).
pub trait HostComponent: Send + Sync {
    /// Whether the component currently has a native peer.
    fn is_displayable(&self) -> bool;

    /// The component's own visibility flag.
    fn is_visible(&self) -> bool;

    /// Sets the component's own visibility flag.
    fn set_visible(&self, visible: bool);

    /// Whether the component and all its ancestors are visible and
    /// displayable.
    fn is_showing(&self) -> bool;

    /// Bounds relative to the parent.
    fn bounds(&self) -> Rect;

    /// Container insets (title bars, borders). Zero for non-containers.
    fn insets(&self) -> Insets;

    /// Container kind of the component itself.
    fn kind(&self) -> ContainerKind {
        ContainerKind::Plain
    }

    /// Ancestors from the immediate parent outwards.
    fn ancestors(&self) -> Vec<Ancestor>;

    /// Whether the component has keyboard focus.
    fn has_focus(&self) -> bool {
        false
    }

    /// Requests an asynchronous repaint.
    fn repaint(&self) {}

    /// Registers a listener for component and hierarchy notifications.
    ///
    /// The host keeps only a weak reference; dead listeners may be pruned
    /// silently.
    fn add_component_listener(&self, listener: Weak<dyn ComponentListener>);
}

/// Geometry and visibility notifications about the component itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ComponentEvent {
    /// The component was resized.
    Resized,
    /// The component was moved within its parent.
    Moved,
    /// The component's visibility flag became `true`.
    Shown,
    /// The component's visibility flag became `false`.
    Hidden,
}

/// Which kinds of hierarchy change a [`HierarchyEvent`] carries.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct HierarchyChange(u32);

impl HierarchyChange {
    /// The changed component's parent was replaced.
    pub const PARENT_CHANGED: Self = Self(1 << 0);
    /// The changed component gained or lost its native peer.
    pub const DISPLAYABILITY_CHANGED: Self = Self(1 << 1);
    /// The changed component's on-screen "showing" state flipped.
    pub const SHOWING_CHANGED: Self = Self(1 << 2);

    /// No change bits.
    pub const NONE: Self = Self(0);

    /// Returns whether every bit of `other` is set in `self`.
    #[inline]
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0 && other.0 != 0
    }

    /// Returns the raw bits.
    #[inline]
    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }
}

impl core::ops::BitOr for HierarchyChange {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl core::fmt::Debug for HierarchyChange {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "HierarchyChange({:#x})", self.0)
    }
}

/// Which component a [`HierarchyEvent`] is about, relative to the listener's
/// own component.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChangedComponent {
    /// The listener's own component changed.
    Own,
    /// An ancestor of the listener's component changed.
    Ancestor,
}

/// A change to the component hierarchy, delivered to the component and all
/// of its descendants.
///
/// `displayable` and `showing` describe the *changed* component at the time
/// of delivery.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct HierarchyEvent {
    /// Which component changed.
    pub changed: ChangedComponent,
    /// Which kinds of change occurred.
    pub change: HierarchyChange,
    /// Whether the changed component is displayable.
    pub displayable: bool,
    /// Whether the changed component is showing.
    pub showing: bool,
}

/// Receives notifications from a [`HostComponent`].
pub trait ComponentListener: Send + Sync {
    /// Called for geometry and visibility changes of the component itself.
    fn component_changed(&self, event: ComponentEvent);

    /// Called for changes to the component or any of its ancestors.
    fn hierarchy_changed(&self, event: &HierarchyEvent);
}

#[cfg(test)]
mod tests {
    use super::HierarchyChange;

    #[test]
    fn change_bits_combine() {
        let both = HierarchyChange::DISPLAYABILITY_CHANGED | HierarchyChange::SHOWING_CHANGED;
        assert!(both.contains(HierarchyChange::SHOWING_CHANGED));
        assert!(both.contains(HierarchyChange::DISPLAYABILITY_CHANGED));
        assert!(!both.contains(HierarchyChange::PARENT_CHANGED));
        assert!(!both.contains(HierarchyChange::NONE));
    }
}
