//! Per-UI-instance state: the component arena, layer stack, keyboard
//! focus, mouse hover, and the single terminal cursor.

use std::sync::Arc;

use slotmap::SlotMap;

use crate::core::{
    bindings::{FeatureBindings, FeatureSet},
    component::{Component, ComponentState},
    feature::FeatureGroup,
    id::ComponentId,
};
use crate::geom::{Expanse, Point, Rect};

/// Cursor glyph shape variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorShape {
    /// Block cursor.
    Block,
    /// Vertical bar cursor.
    Line,
    /// Underscore cursor.
    Underscore,
}

/// The single terminal cursor: owned by at most one component at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    /// Component owning the cursor.
    pub owner: ComponentId,
    /// Screen position.
    pub pos: Point,
    /// Cursor shape.
    pub shape: CursorShape,
}

/// How children divide a component's rectangle.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// Children stacked vertically.
    #[default]
    Stacked,
    /// Children chained horizontally.
    Chained,
}

/// Placement of an overlay layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerPos {
    /// The overlay covers the host.
    Fill,
    /// The overlay is centered on the host with the given extent.
    Centered(Expanse),
    /// The overlay sits at a host-local position with the given extent.
    At(Point, Expanse),
}

/// An overlay layer hosted by a component.
#[derive(Debug)]
pub(crate) struct Layer {
    /// The hosting component.
    pub(crate) host: ComponentId,
    /// The overlay component root.
    pub(crate) overlay: ComponentId,
    /// Overlay placement.
    pub(crate) pos: LayerPos,
    /// Whether the overlay claims exclusive focus and intercepts
    /// out-of-bounds pointer input.
    pub(crate) modal: bool,
}

/// A node in the component arena.
pub(crate) struct Node {
    /// The user component; `None` while taken out for a callback.
    pub(crate) comp: Option<Box<dyn Component>>,
    /// Internal component state.
    pub(crate) state: ComponentState,
    /// Parent in the tree.
    pub(crate) parent: Option<ComponentId>,
    /// Children in the tree.
    pub(crate) children: Vec<ComponentId>,
    /// How children divide this node's rectangle.
    pub(crate) axis: Axis,
    /// True only while a callback on this component is running.
    pub(crate) enabled: bool,
    /// Whether the init callback has run.
    pub(crate) initialized: bool,
}

/// Result of pointer hit-testing through the layer stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Locate {
    /// The innermost component under the point.
    Hit(ComponentId),
    /// A modal layer intercepted the point outside its bounds.
    Blocked,
    /// No component under the point.
    Miss,
}

/// Screen-level operations queued during a callback and applied by the
/// dispatcher once the callback has returned.
#[derive(Debug)]
pub(crate) enum PendingOp {
    /// Transfer keyboard focus to a component.
    FocusTransfer(ComponentId),
    /// Remove the topmost layer hosted by a component.
    RemoveLayer(ComponentId),
    /// Recompute component rectangles after a structural change.
    Relayout,
}

/// The root component behind every screen.
struct Root;

impl Component for Root {}

/// The component tree plus all per-UI mutable state. Mutated only by the
/// event loop, during event processing.
pub struct Screen {
    /// Component storage arena.
    pub(crate) nodes: SlotMap<ComponentId, Node>,
    /// The tree root.
    pub(crate) root: ComponentId,
    /// Ordered overlay layers, bottom to top.
    pub(crate) layers: Vec<Layer>,
    /// The focused component.
    pub(crate) focus: ComponentId,
    /// The component under the mouse.
    pub(crate) hover: Option<ComponentId>,
    /// The terminal cursor, if any component claims one.
    pub(crate) cursor: Option<Cursor>,
    /// Current terminal size.
    pub(crate) size: Expanse,
    /// Shared default binding tables for new components.
    pub(crate) bindings: Arc<FeatureBindings>,
    /// Screen-level operations queued during callbacks.
    pub(crate) pending: Vec<PendingOp>,
}

impl Screen {
    /// Construct a screen with a root component carrying the given
    /// recursively inherited features.
    pub(crate) fn new(bindings: Arc<FeatureBindings>, root_features: FeatureGroup) -> Self {
        let mut nodes = SlotMap::with_key();
        let mut features = FeatureSet::new(bindings.clone(), FeatureGroup::EMPTY);
        features.add(root_features);
        features.set_recursive(true);
        let root_comp = Root;
        let state = ComponentState::new(root_comp.name(), features);
        let root = nodes.insert(Node {
            comp: Some(Box::new(root_comp)),
            state,
            parent: None,
            children: Vec::new(),
            axis: Axis::default(),
            enabled: false,
            initialized: false,
        });
        Self {
            nodes,
            root,
            layers: Vec::new(),
            focus: root,
            hover: None,
            cursor: None,
            size: Expanse::default(),
            bindings,
            pending: Vec::new(),
        }
    }

    /// The root component id.
    pub fn root(&self) -> ComponentId {
        self.root
    }

    /// The focused component id.
    pub fn focus(&self) -> ComponentId {
        self.focus
    }

    /// The current cursor, if any.
    pub fn cursor(&self) -> Option<Cursor> {
        self.cursor
    }

    /// Attach a new component as the last child of `parent`. The wrapper
    /// state is constructed here, once; the component's init callback runs
    /// before its first layout.
    pub fn add_child(&mut self, parent: ComponentId, comp: Box<dyn Component>) -> ComponentId {
        let features = FeatureSet::new(self.bindings.clone(), FeatureGroup::EMPTY);
        let state = ComponentState::new(comp.name(), features);
        let id = self.nodes.insert(Node {
            comp: Some(comp),
            state,
            parent: Some(parent),
            children: Vec::new(),
            axis: Axis::default(),
            enabled: false,
            initialized: false,
        });
        if let Some(p) = self.nodes.get_mut(parent) {
            p.children.push(id);
        }
        id
    }

    /// Set how a component's children divide its rectangle.
    pub fn set_axis(&mut self, id: ComponentId, axis: Axis) {
        if let Some(n) = self.nodes.get_mut(id) {
            n.axis = axis;
        }
    }

    /// Re-attach an existing component under a new parent. Attaching a
    /// component that is already in place is a no-op; state survives.
    pub fn attach(&mut self, parent: ComponentId, child: ComponentId) {
        if child == self.root || !self.nodes.contains_key(child) {
            return;
        }
        if self.nodes[child].parent == Some(parent) {
            return;
        }
        if let Some(old) = self.nodes[child].parent
            && let Some(n) = self.nodes.get_mut(old)
        {
            n.children.retain(|c| *c != child);
        }
        self.nodes[child].parent = Some(parent);
        if let Some(p) = self.nodes.get_mut(parent) {
            p.children.push(child);
        }
    }

    /// Remove a component and its subtree. Children are owned by their
    /// parent and destroyed with it. Focus, hover, cursor, and layers
    /// referring into the subtree are repaired.
    pub fn remove(&mut self, id: ComponentId) {
        if id == self.root || !self.nodes.contains_key(id) {
            return;
        }
        let mut doomed = vec![id];
        let mut i = 0;
        while i < doomed.len() {
            let n = doomed[i];
            if let Some(node) = self.nodes.get(n) {
                doomed.extend(node.children.iter().copied());
            }
            i += 1;
        }
        if let Some(parent) = self.nodes[id].parent
            && let Some(p) = self.nodes.get_mut(parent)
        {
            p.children.retain(|c| *c != id);
        }
        let fallback = self.nodes[id].parent.unwrap_or(self.root);
        for n in &doomed {
            self.nodes.remove(*n);
        }
        self.layers
            .retain(|l| self.nodes.contains_key(l.host) && self.nodes.contains_key(l.overlay));
        if !self.nodes.contains_key(self.focus) {
            self.focus = fallback;
        }
        if let Some(h) = self.hover
            && !self.nodes.contains_key(h)
        {
            self.hover = None;
        }
        if let Some(c) = self.cursor
            && !self.nodes.contains_key(c.owner)
        {
            self.cursor = None;
        }
    }

    /// The path from a component to the root, innermost first.
    pub fn path_to_root(&self, id: ComponentId) -> Vec<ComponentId> {
        let mut path = Vec::new();
        let mut current = Some(id);
        while let Some(n) = current {
            let Some(node) = self.nodes.get(n) else {
                break;
            };
            path.push(n);
            current = node.parent;
        }
        path
    }

    /// Access a component's state. Panics when the component is not
    /// enabled: state is only observable during its own callback.
    pub(crate) fn state(&self, id: ComponentId) -> &ComponentState {
        let node = &self.nodes[id];
        assert!(
            node.enabled,
            "access to disabled component state: {}",
            node.state.name()
        );
        &node.state
    }

    /// Mutable access to a component's state; same discipline as
    /// [`Screen::state`].
    pub(crate) fn state_mut(&mut self, id: ComponentId) -> &mut ComponentState {
        let node = &mut self.nodes[id];
        assert!(
            node.enabled,
            "access to disabled component state: {}",
            node.state.name()
        );
        &mut node.state
    }

    /// The layer a component hosts, if any (topmost).
    pub(crate) fn layer_of(&self, host: ComponentId) -> Option<&Layer> {
        self.layers.iter().rev().find(|l| l.host == host)
    }

    /// The topmost modal layer, if any.
    pub(crate) fn top_modal(&self) -> Option<&Layer> {
        self.layers.iter().rev().find(|l| l.modal)
    }

    /// Hit-test a screen point through the layer stack, topmost first.
    /// Points outside a modal overlay are blocked rather than delivered
    /// to the layers beneath it.
    pub(crate) fn locate(&self, p: Point) -> Locate {
        for layer in self.layers.iter().rev() {
            if let Some(hit) = self.locate_in(layer.overlay, p) {
                return Locate::Hit(hit);
            }
            if layer.modal {
                return Locate::Blocked;
            }
        }
        match self.locate_in(self.root, p) {
            Some(hit) => Locate::Hit(hit),
            None => Locate::Miss,
        }
    }

    /// Innermost component whose rectangle contains `p` within the subtree
    /// at `id`. Overlay subtrees are skipped when walking the base tree.
    fn locate_in(&self, id: ComponentId, p: Point) -> Option<ComponentId> {
        let node = self.nodes.get(id)?;
        if !node.state.dim().contains(p) {
            return None;
        }
        for child in node.children.iter().rev() {
            if self.is_overlay(*child) {
                continue;
            }
            if let Some(hit) = self.locate_in(*child, p) {
                return Some(hit);
            }
        }
        Some(id)
    }

    /// True if a component is the root of an overlay layer.
    pub(crate) fn is_overlay(&self, id: ComponentId) -> bool {
        self.layers.iter().any(|l| l.overlay == id)
    }

    /// Queue a screen-level operation for the dispatcher.
    pub(crate) fn push_pending(&mut self, op: PendingOp) {
        self.pending.push(op);
    }

    /// Drain queued screen-level operations.
    pub(crate) fn take_pending(&mut self) -> Vec<PendingOp> {
        std::mem::take(&mut self.pending)
    }

    /// Recompute the cursor from the focused component's cell focus. The
    /// cursor belongs to at most one component: any previous owner's
    /// cursor is dropped here.
    pub(crate) fn sync_cursor(&mut self) {
        let fid = self.focus;
        let Some(node) = self.nodes.get(fid) else {
            self.cursor = None;
            return;
        };
        let st = &node.state;
        let dim = st.dim();
        let cursor = st.line_focus().line().and_then(|line| {
            let cell = st.line_focus().cell()?;
            let first = st.scroll().first();
            if line < first || line >= first + dim.h as usize {
                return None;
            }
            let row = (line - first) as u32;
            Some(Cursor {
                owner: fid,
                pos: Point::new(dim.tl.x + cell.col as u32, dim.tl.y + row),
                shape: CursorShape::Block,
            })
        });
        self.cursor = cursor;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn screen() -> Screen {
        Screen::new(
            Arc::new(FeatureBindings::standard()),
            FeatureGroup::EMPTY.with(crate::core::feature::Feature::Quit),
        )
    }

    struct Pane;

    impl Component for Pane {}

    #[test]
    fn add_and_path() {
        let mut s = screen();
        let a = s.add_child(s.root(), Box::new(Pane));
        let b = s.add_child(a, Box::new(Pane));
        assert_eq!(s.path_to_root(b), vec![b, a, s.root()]);
    }

    #[test]
    fn remove_destroys_the_subtree_and_repairs_focus() {
        let mut s = screen();
        let a = s.add_child(s.root(), Box::new(Pane));
        let b = s.add_child(a, Box::new(Pane));
        s.focus = b;
        s.remove(a);
        assert!(!s.nodes.contains_key(a));
        assert!(!s.nodes.contains_key(b));
        assert_eq!(s.focus(), s.root());
    }

    #[test]
    fn reattach_is_a_noop_for_the_same_parent() {
        let mut s = screen();
        let a = s.add_child(s.root(), Box::new(Pane));
        let b = s.add_child(s.root(), Box::new(Pane));
        s.attach(s.root(), a);
        assert_eq!(s.nodes[s.root()].children, vec![a, b]);
        s.attach(b, a);
        assert_eq!(s.nodes[s.root()].children, vec![b]);
        assert_eq!(s.nodes[b].children, vec![a]);
    }

    #[test]
    #[should_panic(expected = "access to disabled component state")]
    fn state_access_outside_a_callback_panics() {
        let mut s = screen();
        let a = s.add_child(s.root(), Box::new(Pane));
        let _ = s.state(a);
    }

    #[test]
    fn locate_finds_the_innermost_component() {
        let mut s = screen();
        let a = s.add_child(s.root(), Box::new(Pane));
        let b = s.add_child(a, Box::new(Pane));
        s.nodes[s.root].state.set_dim(Rect::new(0, 0, 10, 10));
        s.nodes[a].state.set_dim(Rect::new(0, 0, 10, 5));
        s.nodes[b].state.set_dim(Rect::new(0, 0, 5, 5));
        assert_eq!(s.locate(Point::new(1, 1)), Locate::Hit(b));
        assert_eq!(s.locate(Point::new(7, 1)), Locate::Hit(a));
        assert_eq!(s.locate(Point::new(7, 7)), Locate::Hit(s.root));
        assert_eq!(s.locate(Point::new(20, 20)), Locate::Miss);
    }

    #[test]
    fn modal_layers_block_outside_points() {
        let mut s = screen();
        let host = s.add_child(s.root(), Box::new(Pane));
        let overlay = s.add_child(host, Box::new(Pane));
        s.nodes[s.root].state.set_dim(Rect::new(0, 0, 10, 10));
        s.nodes[host].state.set_dim(Rect::new(0, 0, 10, 10));
        s.nodes[overlay].state.set_dim(Rect::new(2, 2, 4, 4));
        s.layers.push(Layer {
            host,
            overlay,
            pos: LayerPos::At(Point::new(2, 2), Expanse::new(4, 4)),
            modal: true,
        });
        assert_eq!(s.locate(Point::new(3, 3)), Locate::Hit(overlay));
        assert_eq!(s.locate(Point::new(8, 8)), Locate::Blocked);
    }
}
