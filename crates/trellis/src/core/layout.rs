//! Rectangle assignment for the component tree.
//!
//! This is the narrow seam to the geometry solver: components are stacked
//! or chained into even shares of their parent's rectangle, and overlay
//! layers are placed against their host. The dispatch core only consumes
//! the resulting rectangles; a richer solver can replace this module
//! without touching dispatch.

use crate::core::{
    id::ComponentId,
    screen::{Axis, LayerPos, Screen},
};
use crate::geom::{Expanse, Rect};

/// Recompute every component rectangle from the current screen size.
/// Returns the components whose rectangle changed.
pub(crate) fn solve(screen: &mut Screen) -> Vec<ComponentId> {
    let mut changed = Vec::new();
    let root = screen.root();
    let size = screen.size;
    place(screen, root, size.rect(), &mut changed);

    let layers: Vec<(ComponentId, ComponentId, LayerPos)> = screen
        .layers
        .iter()
        .map(|l| (l.host, l.overlay, l.pos))
        .collect();
    for (host, overlay, pos) in layers {
        let host_rect = screen
            .nodes
            .get(host)
            .map(|n| n.state.dim())
            .unwrap_or_else(Rect::zero);
        let rect = overlay_rect(host_rect, pos, size);
        place(screen, overlay, rect, &mut changed);
    }
    changed
}

/// Assign `rect` to a node and divide it among the node's children.
fn place(screen: &mut Screen, id: ComponentId, rect: Rect, changed: &mut Vec<ComponentId>) {
    let (axis, all_children) = {
        let Some(node) = screen.nodes.get_mut(id) else {
            return;
        };
        if node.state.set_dim(rect) {
            changed.push(id);
        }
        (node.axis, node.children.clone())
    };
    let children: Vec<ComponentId> = all_children
        .into_iter()
        .filter(|c| !screen.is_overlay(*c))
        .collect();
    if children.is_empty() {
        return;
    }
    let n = children.len() as u32;
    for (i, child) in children.iter().enumerate() {
        let i = i as u32;
        let r = match axis {
            Axis::Stacked => {
                let share = rect.h / n;
                let h = if i == n - 1 { rect.h - share * i } else { share };
                Rect::new(rect.tl.x, rect.tl.y + share * i, rect.w, h)
            }
            Axis::Chained => {
                let share = rect.w / n;
                let w = if i == n - 1 { rect.w - share * i } else { share };
                Rect::new(rect.tl.x + share * i, rect.tl.y, w, rect.h)
            }
        };
        place(screen, *child, r, changed);
    }
}

/// Compute an overlay's rectangle against its host, clamped to the screen.
fn overlay_rect(host: Rect, pos: LayerPos, screen_size: Expanse) -> Rect {
    let bounds = screen_size.rect();
    let want = match pos {
        LayerPos::Fill => host,
        LayerPos::Centered(e) => {
            let w = e.w.min(host.w);
            let h = e.h.min(host.h);
            Rect::new(
                host.tl.x + (host.w - w) / 2,
                host.tl.y + (host.h - h) / 2,
                w,
                h,
            )
        }
        LayerPos::At(p, e) => Rect::new(host.tl.x + p.x, host.tl.y + p.y, e.w, e.h),
    };
    want.intersect(&bounds).unwrap_or_else(Rect::zero)
}
