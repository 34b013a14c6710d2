// Copyright 2026 the Casement Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Simulated toolkit component tree.
//!
//! [`HeadlessToolkit`] keeps a tree of components with the state a real
//! toolkit tracks (visibility, native peer, bounds, insets, focus) and
//! dispatches [`ComponentEvent`]s and [`HierarchyEvent`]s the way a
//! retained-mode toolkit does:
//!
//! - Realizing or unrealizing a subtree sends each affected component a
//!   `DISPLAYABILITY_CHANGED` event about itself, with `SHOWING_CHANGED` set
//!   as well when its showing state flipped.
//! - Showing or hiding a component sends a `SHOWING_CHANGED` event to it
//!   and every descendant if its showing state flipped, then `Shown` or
//!   `Hidden` to the component itself.
//! - Changing bounds sends `Resized` and/or `Moved`.
//!
//! Dispatch is synchronous and happens after the tree lock is released, so
//! listeners may call back into the toolkit.

use std::fmt;
use std::sync::{Arc, Weak};

use casement_core::host::{
    Ancestor, ChangedComponent, ComponentEvent, ComponentListener, ContainerKind,
    HierarchyChange, HierarchyEvent, HostComponent,
};
use hashbrown::HashMap;
use kurbo::{Insets, Rect};
use parking_lot::Mutex;

/// Identifies a component in a [`HeadlessToolkit`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ComponentId(u32);

#[derive(Debug)]
struct Node {
    parent: Option<ComponentId>,
    children: Vec<ComponentId>,
    kind: ContainerKind,
    visible: bool,
    displayable: bool,
    bounds: Rect,
    insets: Insets,
    focused: bool,
    repaints: usize,
    visibility_writes: usize,
    listeners: Vec<Weak<dyn ComponentListener>>,
    view: Arc<HeadlessComponent>,
}

#[derive(Debug, Default)]
struct Tree {
    nodes: HashMap<ComponentId, Node>,
    next_id: u32,
}

#[derive(Clone, Copy)]
enum Notice {
    Component(ComponentEvent),
    Hierarchy(HierarchyEvent),
}

/// Listener deliveries collected under the tree lock, sent after release.
type Outbox = Vec<(Arc<dyn ComponentListener>, Notice)>;

impl Tree {
    fn node(&self, id: ComponentId) -> &Node {
        &self.nodes[&id]
    }

    fn node_mut(&mut self, id: ComponentId) -> &mut Node {
        self.nodes
            .get_mut(&id)
            .unwrap_or_else(|| panic!("unknown component {id:?}"))
    }

    fn showing(&self, id: ComponentId) -> bool {
        let node = self.node(id);
        node.displayable && node.visible && node.parent.is_none_or(|p| self.showing(p))
    }

    /// `id` followed by all of its descendants, depth first.
    fn subtree(&self, id: ComponentId) -> Vec<ComponentId> {
        let mut out = vec![id];
        let mut i = 0;
        while i < out.len() {
            out.extend(self.node(out[i]).children.iter().copied());
            i += 1;
        }
        out
    }

    fn post(&mut self, outbox: &mut Outbox, id: ComponentId, notice: Notice) {
        let node = self.node_mut(id);
        node.listeners.retain(|l| l.strong_count() > 0);
        for listener in node.listeners.iter().filter_map(Weak::upgrade) {
            outbox.push((listener, notice));
        }
    }

    fn set_subtree_displayable(
        &mut self,
        outbox: &mut Outbox,
        root: ComponentId,
        displayable: bool,
    ) {
        let subtree = self.subtree(root);
        let before: Vec<bool> = subtree.iter().map(|&id| self.showing(id)).collect();
        let mut flipped = Vec::new();
        for &id in &subtree {
            let node = self.node_mut(id);
            if node.displayable != displayable {
                node.displayable = displayable;
                flipped.push(id);
            }
        }
        for (id, was_showing) in subtree.into_iter().zip(before) {
            if !flipped.contains(&id) {
                continue;
            }
            let showing = self.showing(id);
            let mut change = HierarchyChange::DISPLAYABILITY_CHANGED;
            if showing != was_showing {
                change = change | HierarchyChange::SHOWING_CHANGED;
            }
            let event = HierarchyEvent {
                changed: ChangedComponent::Own,
                change,
                displayable,
                showing,
            };
            self.post(outbox, id, Notice::Hierarchy(event));
        }
    }
}

fn deliver(outbox: Outbox) {
    for (listener, notice) in outbox {
        match notice {
            Notice::Component(e) => listener.component_changed(e),
            Notice::Hierarchy(e) => listener.hierarchy_changed(&e),
        }
    }
}

/// A simulated toolkit. Cheap to clone; clones share the tree.
#[derive(Clone, Default)]
pub struct HeadlessToolkit {
    tree: Arc<Mutex<Tree>>,
}

impl fmt::Debug for HeadlessToolkit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HeadlessToolkit")
            .field("components", &self.tree.lock().nodes.len())
            .finish_non_exhaustive()
    }
}

impl HeadlessToolkit {
    /// Creates an empty toolkit.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a visible, unparented, non-displayable component.
    pub fn create(&self, kind: ContainerKind, bounds: Rect) -> ComponentId {
        let mut tree = self.tree.lock();
        let id = ComponentId(tree.next_id);
        tree.next_id += 1;
        let view = Arc::new(HeadlessComponent {
            tree: Arc::downgrade(&self.tree),
            id,
        });
        tree.nodes.insert(
            id,
            Node {
                parent: None,
                children: Vec::new(),
                kind,
                visible: true,
                displayable: false,
                bounds,
                insets: Insets::ZERO,
                focused: false,
                repaints: 0,
                visibility_writes: 0,
                listeners: Vec::new(),
                view,
            },
        );
        id
    }

    /// Returns the host view of `id` for building a
    /// [`SurfaceWindow`](casement_core::SurfaceWindow).
    ///
    /// The toolkit owns the view. Once every clone of the toolkit is
    /// dropped, windows built on it see their host as gone.
    #[must_use]
    pub fn host(&self, id: ComponentId) -> Arc<dyn HostComponent> {
        self.tree.lock().node(id).view.clone()
    }

    /// Gives `root` and its subtree native peers.
    pub fn realize(&self, root: ComponentId) {
        let mut outbox = Outbox::new();
        self.tree
            .lock()
            .set_subtree_displayable(&mut outbox, root, true);
        deliver(outbox);
    }

    /// Destroys the native peers of `root` and its subtree.
    pub fn unrealize(&self, root: ComponentId) {
        let mut outbox = Outbox::new();
        self.tree
            .lock()
            .set_subtree_displayable(&mut outbox, root, false);
        deliver(outbox);
    }

    /// Adds `child` to `parent`. The child subtree takes on the parent's
    /// displayability.
    ///
    /// # Panics
    ///
    /// Panics if `child` already has a parent.
    pub fn add_child(&self, parent: ComponentId, child: ComponentId) {
        let mut outbox = Outbox::new();
        {
            let mut tree = self.tree.lock();
            assert!(
                tree.node(child).parent.is_none(),
                "component {child:?} already has a parent"
            );
            tree.node_mut(child).parent = Some(parent);
            tree.node_mut(parent).children.push(child);
            let parent_displayable = tree.node(parent).displayable;
            let displayable = tree.node(child).displayable;
            let showing = tree.showing(child);
            for id in tree.subtree(child) {
                let changed = if id == child {
                    ChangedComponent::Own
                } else {
                    ChangedComponent::Ancestor
                };
                let event = HierarchyEvent {
                    changed,
                    change: HierarchyChange::PARENT_CHANGED,
                    displayable,
                    showing,
                };
                tree.post(&mut outbox, id, Notice::Hierarchy(event));
            }
            tree.set_subtree_displayable(&mut outbox, child, parent_displayable);
        }
        deliver(outbox);
    }

    /// Removes `child` from its parent, destroying the subtree's peers.
    pub fn remove(&self, child: ComponentId) {
        let mut outbox = Outbox::new();
        {
            let mut tree = self.tree.lock();
            tree.set_subtree_displayable(&mut outbox, child, false);
            if let Some(parent) = tree.node_mut(child).parent.take() {
                tree.node_mut(parent).children.retain(|&c| c != child);
            }
        }
        deliver(outbox);
    }

    /// Sets the visibility flag of `id`, notifying as a toolkit would.
    pub fn set_visible(&self, id: ComponentId, visible: bool) {
        let mut outbox = Outbox::new();
        {
            let mut tree = self.tree.lock();
            tree.node_mut(id).visibility_writes += 1;
            if tree.node(id).visible == visible {
                return;
            }
            let was_showing = tree.showing(id);
            tree.node_mut(id).visible = visible;
            let showing = tree.showing(id);

            if showing != was_showing {
                let displayable = tree.node(id).displayable;
                for target in tree.subtree(id) {
                    let changed = if target == id {
                        ChangedComponent::Own
                    } else {
                        ChangedComponent::Ancestor
                    };
                    let event = HierarchyEvent {
                        changed,
                        change: HierarchyChange::SHOWING_CHANGED,
                        displayable,
                        showing,
                    };
                    tree.post(&mut outbox, target, Notice::Hierarchy(event));
                }
            }

            let event = if visible {
                ComponentEvent::Shown
            } else {
                ComponentEvent::Hidden
            };
            tree.post(&mut outbox, id, Notice::Component(event));
        }
        deliver(outbox);
    }

    /// Moves and/or resizes `id`.
    pub fn set_bounds(&self, id: ComponentId, bounds: Rect) {
        let mut outbox = Outbox::new();
        {
            let mut tree = self.tree.lock();
            let old = tree.node(id).bounds;
            tree.node_mut(id).bounds = bounds;
            if old.size() != bounds.size() {
                tree.post(&mut outbox, id, Notice::Component(ComponentEvent::Resized));
            }
            if old.origin() != bounds.origin() {
                tree.post(&mut outbox, id, Notice::Component(ComponentEvent::Moved));
            }
        }
        deliver(outbox);
    }

    /// Sets the container insets of `id`.
    pub fn set_insets(&self, id: ComponentId, insets: Insets) {
        self.tree.lock().node_mut(id).insets = insets;
    }

    /// Gives or takes keyboard focus.
    pub fn set_focus(&self, id: ComponentId, focused: bool) {
        self.tree.lock().node_mut(id).focused = focused;
    }

    /// The visibility flag of `id`.
    #[must_use]
    pub fn is_visible(&self, id: ComponentId) -> bool {
        self.tree.lock().node(id).visible
    }

    /// Whether `id` and all its ancestors are visible and displayable.
    #[must_use]
    pub fn is_showing(&self, id: ComponentId) -> bool {
        self.tree.lock().showing(id)
    }

    /// How many repaints have been requested for `id`.
    #[must_use]
    pub fn repaints(&self, id: ComponentId) -> usize {
        self.tree.lock().node(id).repaints
    }

    /// How many times the visibility of `id` has been written, including
    /// writes that did not change it.
    #[must_use]
    pub fn visibility_writes(&self, id: ComponentId) -> usize {
        self.tree.lock().node(id).visibility_writes
    }
}

/// The [`HostComponent`] view of one toolkit component.
///
/// Queries against a dropped toolkit return neutral values.
struct HeadlessComponent {
    tree: Weak<Mutex<Tree>>,
    id: ComponentId,
}

impl fmt::Debug for HeadlessComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HeadlessComponent")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

impl HeadlessComponent {
    fn with_tree<R>(&self, default: R, f: impl FnOnce(&mut Tree) -> R) -> R {
        match self.tree.upgrade() {
            Some(tree) => f(&mut tree.lock()),
            None => default,
        }
    }
}

impl HostComponent for HeadlessComponent {
    fn is_displayable(&self) -> bool {
        self.with_tree(false, |t| t.node(self.id).displayable)
    }

    fn is_visible(&self) -> bool {
        self.with_tree(false, |t| t.node(self.id).visible)
    }

    fn set_visible(&self, visible: bool) {
        if let Some(tree) = self.tree.upgrade() {
            HeadlessToolkit { tree }.set_visible(self.id, visible);
        }
    }

    fn is_showing(&self) -> bool {
        self.with_tree(false, |t| t.showing(self.id))
    }

    fn bounds(&self) -> Rect {
        self.with_tree(Rect::ZERO, |t| t.node(self.id).bounds)
    }

    fn insets(&self) -> Insets {
        self.with_tree(Insets::ZERO, |t| t.node(self.id).insets)
    }

    fn kind(&self) -> ContainerKind {
        self.with_tree(ContainerKind::Plain, |t| t.node(self.id).kind)
    }

    fn ancestors(&self) -> Vec<Ancestor> {
        self.with_tree(Vec::new(), |t| {
            let mut out = Vec::new();
            let mut cursor = t.node(self.id).parent;
            while let Some(id) = cursor {
                let node = t.node(id);
                out.push(Ancestor {
                    kind: node.kind,
                    origin: node.bounds.origin(),
                    showing: t.showing(id),
                });
                cursor = node.parent;
            }
            out
        })
    }

    fn has_focus(&self) -> bool {
        self.with_tree(false, |t| t.node(self.id).focused)
    }

    fn repaint(&self) {
        self.with_tree((), |t| t.node_mut(self.id).repaints += 1);
    }

    fn add_component_listener(&self, listener: Weak<dyn ComponentListener>) {
        self.with_tree((), |t| t.node_mut(self.id).listeners.push(listener));
    }
}
