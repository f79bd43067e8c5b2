//! The event dispatcher: one logical loop that owns all component and
//! screen state, processes one event at a time to completion, and is the
//! only writer of that state.

use std::{
    any::Any,
    sync::{Arc, mpsc},
};

use tracing::{debug, trace, warn};

use crate::core::{
    bindings::{FeatureBindings, FeatureSet},
    component::{Component, EventOutcome, Report},
    context::Context,
    error::{Error, Result},
    event::{Event, Update, UpdateListener, key::Key, mouse},
    feature::{Feature, FeatureGroup},
    id::ComponentId,
    layout,
    render,
    screen::{Axis, Layer, LayerPos, Locate, PendingOp, Screen},
    termbuf::TermBuf,
};
use crate::{backend::RenderBackend, geom::Expanse};

/// Dispatcher configuration. The default binding table travels here — the
/// kiosk (no-quit) variant is a different configuration value, not a
/// mutation of shared defaults.
pub struct Config {
    /// Default binding tables shared by all components.
    bindings: Arc<FeatureBindings>,
    /// Features enabled recursively on the root component.
    root_features: FeatureGroup,
    /// Bounded event queue capacity.
    queue_cap: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    /// The standard configuration: full default bindings, quit enabled
    /// tree-wide through the root.
    pub fn new() -> Self {
        Self {
            bindings: Arc::new(FeatureBindings::standard()),
            root_features: FeatureGroup::EMPTY.with(Feature::Quit),
            queue_cap: 128,
        }
    }

    /// The kiosk configuration: no quit bindings anywhere.
    pub fn kiosk() -> Self {
        Self {
            bindings: Arc::new(FeatureBindings::kiosk()),
            root_features: FeatureGroup::EMPTY,
            queue_cap: 128,
        }
    }

    /// Override the event queue capacity.
    pub fn queue_cap(mut self, cap: usize) -> Self {
        self.queue_cap = cap.max(1);
        self
    }
}

/// A cloneable, thread-safe posting handle into the event loop.
///
/// Posting is non-blocking: a full queue surfaces as
/// [`Error::QueueFull`] to the caller and is never fatal to the loop.
#[derive(Clone)]
pub struct Events {
    /// Bounded channel into the loop.
    tx: mpsc::SyncSender<Event>,
}

impl Events {
    /// Post an event.
    pub fn post(&self, ev: Event) -> Result<()> {
        self.tx.try_send(ev).map_err(|e| match e {
            mpsc::TrySendError::Full(_) => Error::QueueFull,
            mpsc::TrySendError::Disconnected(_) => Error::LoopClosed,
        })
    }

    /// Post an update with an opaque payload to a target component. A
    /// `None` target is a no-op that still succeeds; a stale target is
    /// dropped at dispatch time.
    pub fn update(&self, target: Option<ComponentId>, payload: impl Any + Send) -> Result<Sent> {
        self.update_with(target, payload, None)
    }

    /// Post an update with an explicit listener, which takes precedence
    /// over the target's own update handler.
    pub fn update_with(
        &self,
        target: Option<ComponentId>,
        payload: impl Any + Send,
        listener: Option<UpdateListener>,
    ) -> Result<Sent> {
        let Some(target) = target else {
            return Ok(Sent { rx: None });
        };
        let (done, rx) = mpsc::sync_channel(1);
        self.post(Event::Update(Update {
            target,
            payload: Box::new(payload),
            listener,
            done: Some(done),
        }))?;
        Ok(Sent { rx: Some(rx) })
    }

    /// Post a focus transfer.
    pub fn focus(&self, target: ComponentId) -> Result<()> {
        self.post(Event::MoveFocus(target))
    }

    /// Post a quit event.
    pub fn quit(&self) -> Result<()> {
        self.post(Event::Quit)
    }
}

/// Completion handle for a posted event. Waiting on it blocks until the
/// loop has processed that specific post, which makes posted effects
/// synchronously observable to the poster.
#[derive(Debug)]
pub struct Sent {
    /// Completion channel; absent for no-op posts.
    rx: Option<mpsc::Receiver<()>>,
}

impl Sent {
    /// Block until the post has been processed. Returns immediately for
    /// no-op posts and when the loop has shut down.
    pub fn wait(self) {
        if let Some(rx) = self.rx {
            let _ = rx.recv();
        }
    }
}

/// The dispatcher: screen state plus the event queue endpoints.
pub struct Trellis {
    /// All per-UI state.
    pub(crate) screen: Screen,
    /// Posting endpoint, cloned into [`Events`] handles.
    event_tx: mpsc::SyncSender<Event>,
    /// Receiving endpoint, taken by the run loop.
    event_rx: Option<mpsc::Receiver<Event>>,
    /// Buffer from the last render, for diffing.
    termbuf: Option<TermBuf>,
    /// Whether a render is pending after the most recent event.
    render_pending: bool,
    /// Set once a quit event has been broadcast.
    quitting: bool,
}

impl Trellis {
    /// Construct a dispatcher from a configuration.
    pub fn new(config: Config) -> Self {
        let (tx, rx) = mpsc::sync_channel(config.queue_cap);
        Self {
            screen: Screen::new(config.bindings, config.root_features),
            event_tx: tx,
            event_rx: Some(rx),
            termbuf: None,
            render_pending: true,
            quitting: false,
        }
    }

    /// The root component id.
    pub fn root(&self) -> ComponentId {
        self.screen.root()
    }

    /// The focused component id.
    pub fn focus(&self) -> ComponentId {
        self.screen.focus()
    }

    /// A posting handle for this loop.
    pub fn events(&self) -> Events {
        Events {
            tx: self.event_tx.clone(),
        }
    }

    /// True once a quit event has been processed.
    pub fn quitting(&self) -> bool {
        self.quitting
    }

    /// Take the queue's receiving end; used by the run loop.
    pub(crate) fn take_rx(&mut self) -> Option<mpsc::Receiver<Event>> {
        self.event_rx.take()
    }

    /// The raw posting endpoint, for the input thread. Unlike [`Events`],
    /// sends on this block when the queue is full instead of erroring, so
    /// polled input is never dropped.
    pub(crate) fn events_tx(&self) -> mpsc::SyncSender<Event> {
        self.event_tx.clone()
    }

    /// Attach a component as the last child of `parent`.
    pub fn add_child(&mut self, parent: ComponentId, comp: impl Component) -> ComponentId {
        self.screen.add_child(parent, Box::new(comp))
    }

    /// Set how a component's children divide its rectangle.
    pub fn set_axis(&mut self, id: ComponentId, axis: Axis) {
        self.screen.set_axis(id, axis);
    }

    /// Host an overlay on a component. A modal overlay receives focus
    /// immediately and holds it until the layer is removed.
    pub fn layer(
        &mut self,
        host: ComponentId,
        overlay: impl Component,
        pos: LayerPos,
        modal: bool,
    ) -> ComponentId {
        let id = self.screen.add_child(host, Box::new(overlay));
        self.screen.layers.push(Layer {
            host,
            overlay: id,
            pos,
            modal,
        });
        self.init_sweep();
        self.relayout();
        if modal {
            self.transfer_focus(id);
        }
        self.pump();
        id
    }

    /// Remove the topmost layer hosted by `host`, destroying the overlay.
    /// If the overlay held focus, focus returns to the host.
    pub fn remove_layer(&mut self, host: ComponentId) {
        let Some(idx) = self.screen.layers.iter().rposition(|l| l.host == host) else {
            return;
        };
        let layer = self.screen.layers.remove(idx);
        let had_focus = self
            .screen
            .path_to_root(self.screen.focus)
            .contains(&layer.overlay);
        self.screen.remove(layer.overlay);
        if had_focus {
            self.screen.focus = host;
            self.raw_call(host, |c, ctx| c.on_focus(ctx));
        }
        self.screen.sync_cursor();
        self.render_pending = true;
        self.pump();
    }

    /// Process a single event to completion. This is the only writer of
    /// component and screen state; events are handled strictly in post
    /// order by the run loop.
    pub fn process(&mut self, ev: Event) -> Result<()> {
        trace!(target: "trellis::dispatch", ?ev, "process");
        self.init_sweep();
        match ev {
            Event::Key(k) => self.key(k),
            Event::Mouse(m) => self.mouse(m),
            Event::Resize(s) => self.resize(s),
            Event::Update(u) => self.update(u),
            Event::MoveFocus(t) => self.transfer_focus(t),
            Event::Quit => self.quit_broadcast(),
        }
        self.pump();
        self.screen.sync_cursor();
        Ok(())
    }

    /// Whether the screen needs a redraw.
    pub fn render_pending(&self) -> bool {
        self.render_pending || self.screen.nodes.iter().any(|(_, n)| n.state.is_dirty())
    }

    /// Render the component tree and flush it to a backend.
    pub fn render(&mut self, be: &mut dyn RenderBackend) -> Result<()> {
        if self.screen.size.is_zero() {
            return Ok(());
        }
        let next = render::draw(&self.screen);
        next.diff(self.termbuf.as_ref(), be)?;
        be.set_cursor(self.screen.cursor().map(|c| (c.pos, c.shape)))?;
        be.flush()?;
        for (_, n) in self.screen.nodes.iter_mut() {
            n.state.clear_dirty();
        }
        self.termbuf = Some(next);
        self.render_pending = false;
        Ok(())
    }

    /// The buffer from the last render, if any.
    pub fn buf(&self) -> Option<&TermBuf> {
        self.termbuf.as_ref()
    }

    /// Render only if an event left the screen dirty. Returns whether a
    /// render happened.
    pub fn render_if_pending(&mut self, be: &mut dyn RenderBackend) -> Result<bool> {
        if !self.render_pending() {
            return Ok(false);
        }
        self.render(be)?;
        Ok(true)
    }

    // -- dispatch internals -----------------------------------------------

    /// Run a callback on a component: take the component out of its slot,
    /// enable its state for the duration, and restore both afterward.
    fn raw_call<R>(
        &mut self,
        id: ComponentId,
        f: impl FnOnce(&mut dyn Component, &mut Context<'_>) -> R,
    ) -> Option<R> {
        let node = self.screen.nodes.get_mut(id)?;
        let Some(mut comp) = node.comp.take() else {
            warn!(target: "trellis::dispatch", name = %node.state.name(), "reentrant callback skipped");
            return None;
        };
        node.enabled = true;
        let events = Events {
            tx: self.event_tx.clone(),
        };
        let r = {
            let mut ctx = Context {
                screen: &mut self.screen,
                id,
                events,
            };
            f(comp.as_mut(), &mut ctx)
        };
        if let Some(node) = self.screen.nodes.get_mut(id) {
            node.enabled = false;
            node.comp = Some(comp);
        }
        Some(r)
    }

    /// Run init callbacks for components that have not seen one, before
    /// their first layout. Components created inside an init callback are
    /// swept too.
    fn init_sweep(&mut self) {
        loop {
            let fresh: Vec<ComponentId> = self
                .screen
                .nodes
                .iter()
                .filter(|(_, n)| !n.initialized)
                .map(|(id, _)| id)
                .collect();
            if fresh.is_empty() {
                return;
            }
            for id in fresh {
                if let Some(n) = self.screen.nodes.get_mut(id) {
                    n.initialized = true;
                }
                self.raw_call(id, |c, ctx| c.on_init(ctx));
            }
        }
    }

    /// Deliver queued derived reports and screen-level operations until
    /// the system is quiescent.
    fn pump(&mut self) {
        loop {
            self.init_sweep();
            let mut work: Vec<(ComponentId, Report)> = Vec::new();
            for (id, node) in self.screen.nodes.iter_mut() {
                for r in node.state.take_reports() {
                    work.push((id, r));
                }
            }
            let pending = self.screen.take_pending();
            if work.is_empty() && pending.is_empty() {
                return;
            }
            self.render_pending = true;
            for (id, r) in work {
                match r {
                    Report::LineFocus(i) => {
                        self.raw_call(id, |c, ctx| c.on_line_focus(ctx, i));
                    }
                    Report::LineFocusLost(i) => {
                        self.raw_call(id, |c, ctx| c.on_line_focus_lost(ctx, i));
                    }
                    Report::LineSelected(i) => {
                        self.raw_call(id, |c, ctx| c.on_line_selected(ctx, i));
                    }
                    Report::Cursor(col, row) => {
                        self.raw_call(id, |c, ctx| c.on_cursor(ctx, col, row));
                    }
                    Report::LineOverflow(left, right) => {
                        self.raw_call(id, |c, ctx| c.on_line_overflow(ctx, left, right));
                    }
                }
            }
            for op in pending {
                match op {
                    PendingOp::FocusTransfer(t) => self.transfer_focus(t),
                    PendingOp::RemoveLayer(host) => self.remove_layer(host),
                    PendingOp::Relayout => self.relayout(),
                }
            }
        }
    }

    /// Move keyboard focus, firing the focus callbacks. The previous
    /// owner's cursor is cleared before the new component may claim one.
    fn transfer_focus(&mut self, target: ComponentId) {
        if !self.screen.nodes.contains_key(target) || self.screen.focus == target {
            return;
        }
        let old = self.screen.focus;
        debug!(target: "trellis::focus", ?old, ?target, "focus transfer");
        self.screen.focus = target;
        if let Some(c) = self.screen.cursor
            && c.owner == old
        {
            self.screen.cursor = None;
        }
        self.raw_call(old, |c, ctx| c.on_focus_lost(ctx));
        self.raw_call(target, |c, ctx| c.on_focus(ctx));
        self.screen.sync_cursor();
        self.render_pending = true;
    }

    /// Keyboard dispatch: bubble along the focus path, then execute the
    /// feature bound on the focused component.
    fn key(&mut self, k: Key) {
        let rune = k.as_rune();
        let start = if self.screen.nodes.contains_key(self.screen.focus) {
            self.screen.focus
        } else {
            self.screen.root
        };
        let mut cancelled = false;
        for id in self.screen.path_to_root(start) {
            // Explicit single-key/rune listener first.
            let taken = match rune {
                Some(r) => self
                    .screen
                    .nodes
                    .get_mut(id)
                    .and_then(|n| n.state.take_rune_listener(r)),
                None => self
                    .screen
                    .nodes
                    .get_mut(id)
                    .and_then(|n| n.state.take_key_listener(k)),
            };
            if let Some(mut l) = taken {
                let out = self
                    .raw_call(id, |c, ctx| l(c, ctx))
                    .unwrap_or(EventOutcome::Ignore);
                if let Some(n) = self.screen.nodes.get_mut(id) {
                    match rune {
                        Some(r) => n.state.put_rune_listener(r, l),
                        None => n.state.put_key_listener(k, l),
                    }
                }
                if out != EventOutcome::Ignore {
                    cancelled = true;
                    break;
                }
            }
            // Then the generic handler.
            let out = self
                .raw_call(id, |c, ctx| match rune {
                    Some(r) => c.on_rune(ctx, r, k.mods),
                    None => c.on_key(ctx, k),
                })
                .unwrap_or(EventOutcome::Ignore);
            if out != EventOutcome::Ignore {
                self.render_pending |= out == EventOutcome::Handle;
                cancelled = true;
                break;
            }
        }
        if cancelled {
            return;
        }
        // The walk completed uncancelled: execute the bound feature.
        let feature = self.lookup_feature(start, |fs| match rune {
            Some(r) => fs.of_rune(r),
            None => fs.of_key(k),
        });
        if let Some(f) = feature {
            self.exec_feature(f, start);
        } else if let Some(r) = rune
            && self.has_feature(start, Feature::Editable)
        {
            if let Some(n) = self.screen.nodes.get_mut(start) {
                n.state.insert_rune(r);
            }
            self.render_pending = true;
        }
    }

    /// Pointer dispatch: hit-test through the layer stack, optionally move
    /// focus, bubble from the hit component, then execute the bound
    /// feature on the focused component.
    fn mouse(&mut self, m: mouse::MouseEvent) {
        let hit = match self.screen.locate(m.location) {
            Locate::Hit(hit) => hit,
            Locate::Blocked => {
                trace!(target: "trellis::dispatch", "pointer blocked by modal layer");
                return;
            }
            Locate::Miss => {
                if m.action == mouse::Action::Move {
                    self.screen.hover = None;
                }
                return;
            }
        };
        if m.action == mouse::Action::Move {
            self.screen.hover = Some(hit);
        }

        // Move focus first when the hit component (or an ancestor) binds
        // this exact button and modifiers to the focus feature.
        if m.is_press() {
            for id in self.screen.path_to_root(hit) {
                let Some(node) = self.screen.nodes.get_mut(id) else {
                    continue;
                };
                if node.state.features().of_button(m.button, m.modifiers) != Some(Feature::Focusable)
                {
                    continue;
                }
                if let Some(local) = node.state.dim().to_local(m.location) {
                    let has_line_focus = node.state.features().has(Feature::NextLineFocusable)
                        || node.state.features().has(Feature::PrevLineFocusable);
                    if has_line_focus {
                        node.state.focus_line_at(local.y as usize);
                    }
                }
                self.transfer_focus(id);
                break;
            }
        }

        let mut cancelled = false;
        for id in self.screen.path_to_root(hit) {
            let Some(local) = self
                .screen
                .nodes
                .get(id)
                .and_then(|n| n.state.dim().to_local(m.location))
            else {
                continue;
            };
            let local_evt = mouse::MouseEvent {
                location: local,
                ..m
            };
            let out = self
                .raw_call(id, |c, ctx| {
                    if local_evt.is_press() {
                        match c.on_click(ctx, &local_evt) {
                            EventOutcome::Ignore => c.on_mouse(ctx, &local_evt),
                            o => o,
                        }
                    } else {
                        c.on_mouse(ctx, &local_evt)
                    }
                })
                .unwrap_or(EventOutcome::Ignore);
            if out != EventOutcome::Ignore {
                self.render_pending |= out == EventOutcome::Handle;
                cancelled = true;
                break;
            }
        }
        if cancelled || !m.is_press() {
            return;
        }
        let focused = self.screen.focus;
        if let Some(f) = self.lookup_feature(focused, |fs| fs.of_button(m.button, m.modifiers))
            && f != Feature::Focusable
        {
            self.exec_feature(f, focused);
        }
    }

    /// Look up a binding on a component's own tables, then walk ancestors
    /// honoring their recursive flag.
    fn lookup_feature(
        &self,
        start: ComponentId,
        look: impl Fn(&FeatureSet) -> Option<Feature>,
    ) -> Option<Feature> {
        let mut own = true;
        for id in self.screen.path_to_root(start) {
            if let Some(node) = self.screen.nodes.get(id) {
                let fs = node.state.features();
                if (own || fs.recursive())
                    && let Some(f) = look(fs)
                {
                    return Some(f);
                }
            }
            own = false;
        }
        None
    }

    /// True if a component's own feature set enables `f`.
    fn has_feature(&self, id: ComponentId, f: Feature) -> bool {
        self.screen
            .nodes
            .get(id)
            .map(|n| n.state.features().has(f))
            .unwrap_or(false)
    }

    /// Execute a feature against the focused component.
    fn exec_feature(&mut self, f: Feature, target: ComponentId) {
        debug!(target: "trellis::dispatch", ?f, "feature");
        if f == Feature::Quit {
            self.quit_broadcast();
            return;
        }
        let Some(node) = self.screen.nodes.get_mut(target) else {
            return;
        };
        let st = &mut node.state;
        match f {
            Feature::UpScrollable => st.scroll_up(),
            Feature::DownScrollable => st.scroll_down(),
            Feature::PrevLineFocusable => st.focus_prev_line(),
            Feature::NextLineFocusable => st.focus_next_line(),
            Feature::LineSelectable => st.select_line(),
            Feature::LineUnfocusable => st.reset_line_focus(),
            Feature::PrevCellFocusable => st.focus_prev_cell(),
            Feature::NextCellFocusable => st.focus_next_cell(),
            Feature::FirstCellFocusable => st.focus_first_cell(),
            Feature::LastCellFocusable => st.focus_last_cell(),
            // Applied before bubbling, on pointer events.
            Feature::Focusable => {}
            // Runes reach editable components through the dispatch path.
            Feature::Editable => {}
            Feature::Quit => unreachable!(),
        }
        self.render_pending = true;
    }

    /// Deliver a posted update. A stale target is a no-op; the completion
    /// signal fires either way.
    fn update(&mut self, u: Update) {
        let Update {
            target,
            payload,
            listener,
            done,
        } = u;
        if self.screen.nodes.contains_key(target) {
            match listener {
                Some(l) => {
                    self.raw_call(target, move |c, ctx| l(c, ctx, payload.as_ref()));
                }
                None => {
                    self.raw_call(target, |c, ctx| c.on_update(ctx, payload.as_ref()));
                }
            }
            self.render_pending = true;
        }
        if let Some(done) = done {
            let _ = done.try_send(());
        }
    }

    /// Broadcast quit to every component in the tree, then mark the loop
    /// for shutdown.
    fn quit_broadcast(&mut self) {
        let mut order = Vec::new();
        let mut stack = vec![self.screen.root];
        while let Some(id) = stack.pop() {
            order.push(id);
            if let Some(node) = self.screen.nodes.get(id) {
                for child in node.children.iter().rev() {
                    stack.push(*child);
                }
            }
        }
        for id in order {
            self.raw_call(id, |c, _| c.on_quit());
        }
        self.quitting = true;
    }

    /// Handle a terminal resize. Zero dimensions are a no-op.
    fn resize(&mut self, size: Expanse) {
        if size.is_zero() {
            return;
        }
        self.screen.size = size;
        self.relayout();
    }

    /// Recompute rectangles and notify moved components.
    fn relayout(&mut self) {
        let changed = layout::solve(&mut self.screen);
        for id in changed {
            self.raw_call(id, |c, ctx| c.on_layout(ctx));
        }
        for (_, node) in self.screen.nodes.iter_mut() {
            node.state.validate_focus();
        }
        self.render_pending = true;
    }

    /// Enable a component's state for an out-of-band inspection. Only the
    /// testing facility uses this; production reads go through callbacks.
    #[cfg(any(test, feature = "testing"))]
    pub(crate) fn inspect<R>(
        &mut self,
        id: ComponentId,
        f: impl FnOnce(&crate::core::component::ComponentState) -> R,
    ) -> Option<R> {
        let node = self.screen.nodes.get_mut(id)?;
        node.enabled = true;
        let r = f(&node.state);
        node.enabled = false;
        Some(r)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::core::{
        event::key::{self, KeyCode},
        feature::{CELL_FOCUSABLE, LINE_SELECTABLE, SCROLLABLE},
        linefocus::Highlight,
        screen::LayerPos,
    };
    use crate::geom::Point;
    use crate::testing::Fixture;

    /// Shared callback log.
    #[derive(Clone, Default)]
    struct Log(Arc<Mutex<Vec<String>>>);

    impl Log {
        fn push(&self, entry: impl Into<String>) {
            self.0.lock().unwrap().push(entry.into());
        }

        fn take(&self) -> Vec<String> {
            std::mem::take(&mut self.0.lock().unwrap())
        }
    }

    /// An instrumented component recording its callbacks.
    struct Pane {
        tag: &'static str,
        log: Log,
        outcome: EventOutcome,
        lines: Vec<&'static str>,
    }

    impl Pane {
        fn new(tag: &'static str, log: &Log) -> Self {
            Self {
                tag,
                log: log.clone(),
                outcome: EventOutcome::Ignore,
                lines: Vec::new(),
            }
        }

        fn with_outcome(mut self, outcome: EventOutcome) -> Self {
            self.outcome = outcome;
            self
        }

        fn with_lines(mut self, lines: &[&'static str]) -> Self {
            self.lines = lines.to_vec();
            self
        }
    }

    impl Pane {
        fn log(&self, event: &str) {
            self.log.push(format!("{}@{event}", self.tag));
        }
    }

    impl Component for Pane {
        fn on_init(&mut self, ctx: &mut Context<'_>) {
            if !self.lines.is_empty() {
                ctx.set_lines(self.lines.clone());
                ctx.features_mut().add(LINE_SELECTABLE);
                ctx.features_mut().add(SCROLLABLE);
            }
        }

        fn on_key(&mut self, _ctx: &mut Context<'_>, _key: Key) -> EventOutcome {
            self.log("key");
            self.outcome
        }

        fn on_rune(&mut self, _ctx: &mut Context<'_>, rune: char, _mods: key::Mods) -> EventOutcome {
            self.log.push(format!("{}@rune:{rune}", self.tag));
            self.outcome
        }

        fn on_mouse(&mut self, _ctx: &mut Context<'_>, _evt: &mouse::MouseEvent) -> EventOutcome {
            self.log("mouse");
            self.outcome
        }

        fn on_focus(&mut self, _ctx: &mut Context<'_>) {
            self.log("focus");
        }

        fn on_focus_lost(&mut self, _ctx: &mut Context<'_>) {
            self.log("focus_lost");
        }

        fn on_line_focus(&mut self, _ctx: &mut Context<'_>, idx: usize) {
            self.log.push(format!("{}@line_focus:{idx}", self.tag));
        }

        fn on_line_focus_lost(&mut self, _ctx: &mut Context<'_>, idx: usize) {
            self.log.push(format!("{}@line_focus_lost:{idx}", self.tag));
        }

        fn on_line_selected(&mut self, _ctx: &mut Context<'_>, idx: usize) {
            self.log.push(format!("{}@selected:{idx}", self.tag));
        }

        fn on_update(&mut self, _ctx: &mut Context<'_>, payload: &(dyn std::any::Any + Send)) {
            let n = payload.downcast_ref::<i32>().copied().unwrap_or(-1);
            self.log.push(format!("{}@update:{n}", self.tag));
        }

        fn on_quit(&mut self) {
            self.log("quit");
        }

        fn name(&self) -> crate::core::name::Name {
            crate::core::name::Name::convert(self.tag)
        }
    }

    fn nested(log: &Log) -> (Fixture, ComponentId, ComponentId, ComponentId) {
        let mut fx = Fixture::new(Expanse::new(20, 10));
        let outer = fx.add(fx.root(), Pane::new("outer", log));
        let mid = fx.add(outer, Pane::new("mid", log));
        let inner = fx.add(mid, Pane::new("inner", log));
        (fx, outer, mid, inner)
    }

    #[test]
    fn keys_bubble_innermost_to_root() {
        let log = Log::default();
        let (mut fx, _, _, inner) = nested(&log);
        fx.process(Event::MoveFocus(inner));
        log.take();
        fx.key(KeyCode::Tab);
        assert_eq!(log.take(), vec!["inner@key", "mid@key", "outer@key"]);
    }

    #[test]
    fn handling_stops_bubbling() {
        let log = Log::default();
        let mut fx = Fixture::new(Expanse::new(20, 10));
        let outer = fx.add(fx.root(), Pane::new("outer", &log));
        let mid = fx.add(outer, Pane::new("mid", &log).with_outcome(EventOutcome::Handle));
        let inner = fx.add(mid, Pane::new("inner", &log));
        fx.process(Event::MoveFocus(inner));
        log.take();
        fx.key(KeyCode::Tab);
        assert_eq!(log.take(), vec!["inner@key", "mid@key"]);
    }

    #[test]
    fn explicit_listener_runs_before_the_generic_handler() {
        let log = Log::default();
        let mut fx = Fixture::new(Expanse::new(20, 10));
        let log2 = log.clone();
        struct WithListener {
            log: Log,
        }
        impl Component for WithListener {
            fn on_init(&mut self, ctx: &mut Context<'_>) {
                let log = self.log.clone();
                ctx.on_rune('x', move |_, _| {
                    log.push("listener:x");
                    EventOutcome::Handle
                });
            }

            fn on_rune(
                &mut self,
                _ctx: &mut Context<'_>,
                rune: char,
                _mods: key::Mods,
            ) -> EventOutcome {
                self.log.push(format!("generic:{rune}"));
                EventOutcome::Ignore
            }
        }
        let id = fx.add(fx.root(), WithListener { log: log2 });
        fx.process(Event::MoveFocus(id));
        fx.key('x');
        fx.key('y');
        assert_eq!(log.take(), vec!["listener:x", "generic:y"]);
    }

    #[test]
    fn features_execute_only_after_an_uncancelled_walk() {
        let log = Log::default();
        let mut fx = Fixture::new(Expanse::new(20, 10));
        let list = fx.add(fx.root(), Pane::new("list", &log).with_lines(&["a", "b"]));
        fx.process(Event::MoveFocus(list));
        fx.key(KeyCode::Down);
        assert_eq!(fx.inspect(list, |st| st.line_focus().line()), Some(0));

        let blocker = fx.add(
            list,
            Pane::new("blocker", &log).with_outcome(EventOutcome::Consume),
        );
        fx.process(Event::MoveFocus(blocker));
        fx.key(KeyCode::Down);
        // The walk was cancelled; the focused component's binding did not run.
        assert_eq!(fx.inspect(blocker, |st| st.line_focus().line()), None);
    }

    #[test]
    fn derived_reports_survive_stopped_bubbling() {
        let mut fx = Fixture::new(Expanse::new(20, 10));
        struct SelfMover;
        impl Component for SelfMover {
            fn on_init(&mut self, ctx: &mut Context<'_>) {
                ctx.set_lines(["a", "b"]);
                ctx.features_mut().add(LINE_SELECTABLE);
            }

            fn on_key(&mut self, ctx: &mut Context<'_>, _key: Key) -> EventOutcome {
                ctx.focus_next_line();
                EventOutcome::Handle
            }
        }
        let id = fx.add(fx.root(), SelfMover);
        fx.process(Event::MoveFocus(id));
        fx.key(KeyCode::Tab);
        // Bubbling stopped at the component itself, but the line focus
        // change it triggered still landed.
        assert_eq!(fx.inspect(id, |st| st.line_focus().line()), Some(0));
    }

    #[test]
    fn line_selection_reports_to_the_component() {
        let log = Log::default();
        let mut fx = Fixture::new(Expanse::new(20, 10));
        let list = fx.add(fx.root(), Pane::new("list", &log).with_lines(&["a", "b"]));
        fx.process(Event::MoveFocus(list));
        log.take();
        fx.key(KeyCode::Down);
        fx.key(KeyCode::Enter);
        assert_eq!(log.take(), vec!["list@line_focus:0", "list@selected:0"]);
    }

    #[test]
    fn update_with_nil_target_is_a_noop() {
        let fx = Fixture::new(Expanse::new(10, 5));
        let sent = fx.trellis.events().update(None, 42i32).expect("no error");
        sent.wait();
    }

    #[test]
    fn update_to_a_stale_target_is_dropped() {
        let log = Log::default();
        let mut fx = Fixture::new(Expanse::new(10, 5));
        let a = fx.add(fx.root(), Pane::new("a", &log));
        fx.trellis.screen.remove(a);
        let sent = fx.trellis.events().update(Some(a), 1i32).expect("queued");
        fx.drain();
        sent.wait();
        assert!(log.take().is_empty());
    }

    #[test]
    fn updates_are_processed_in_post_order() {
        let log = Log::default();
        let mut fx = Fixture::new(Expanse::new(10, 5));
        let a = fx.add(fx.root(), Pane::new("a", &log));
        let b = fx.add(fx.root(), Pane::new("b", &log));
        log.take();
        let events = fx.trellis.events();
        events.update(Some(a), 1i32).unwrap();
        events.update(Some(b), 2i32).unwrap();
        fx.drain();
        assert_eq!(log.take(), vec!["a@update:1", "b@update:2"]);
    }

    #[test]
    fn post_time_listener_takes_precedence() {
        let log = Log::default();
        let mut fx = Fixture::new(Expanse::new(10, 5));
        let a = fx.add(fx.root(), Pane::new("a", &log));
        log.take();
        let listener_log = log.clone();
        let listener: UpdateListener = Box::new(move |_, _, payload| {
            let n = payload.downcast_ref::<i32>().copied().unwrap_or(-1);
            listener_log.push(format!("explicit:{n}"));
        });
        fx.trellis
            .events()
            .update_with(Some(a), 7i32, Some(listener))
            .unwrap();
        fx.drain();
        assert_eq!(log.take(), vec!["explicit:7"]);
    }

    #[test]
    fn a_full_queue_surfaces_as_an_error() {
        let fx = Fixture::with_config(Config::new().queue_cap(1), Expanse::new(10, 5));
        let events = fx.trellis.events();
        events.update(Some(fx.root()), 1i32).unwrap();
        let err = events.update(Some(fx.root()), 2i32).unwrap_err();
        assert_eq!(err, Error::QueueFull);
    }

    #[test]
    fn quit_broadcasts_to_the_whole_tree() {
        let log = Log::default();
        let (mut fx, _, _, inner) = nested(&log);
        fx.process(Event::MoveFocus(inner));
        log.take();
        fx.key('q');
        assert!(fx.trellis.quitting());
        let entries = log.take();
        for tag in ["outer", "mid", "inner"] {
            assert!(entries.contains(&format!("{tag}@quit")), "{tag} missed quit");
        }
    }

    #[test]
    fn kiosk_configuration_has_no_quit() {
        let log = Log::default();
        let mut fx = Fixture::with_config(Config::kiosk(), Expanse::new(10, 5));
        let a = fx.add(fx.root(), Pane::new("a", &log));
        fx.process(Event::MoveFocus(a));
        fx.key('q');
        assert!(!fx.trellis.quitting());
        fx.process(Event::Key(key::Ctrl + 'c'));
        assert!(!fx.trellis.quitting());
    }

    #[test]
    fn reserved_quit_bindings_survive_deletion() {
        let log = Log::default();
        // Kiosk config, so no ambient quit binding can interfere.
        let mut fx = Fixture::with_config(Config::kiosk(), Expanse::new(10, 5));
        let a = fx.add(fx.root(), Pane::new("a", &log));
        let listener: UpdateListener = Box::new(|_, ctx, _| {
            ctx.features_mut().add(Feature::Quit);
            ctx.features_mut().delete(Feature::Quit);
        });
        fx.trellis
            .events()
            .update_with(Some(a), (), Some(listener))
            .unwrap();
        fx.drain();
        fx.process(Event::MoveFocus(a));
        // The rune binding was deleted.
        fx.key('q');
        assert!(!fx.trellis.quitting());
        // The reserved pair is immutable.
        fx.process(Event::Key(key::Ctrl + 'c'));
        assert!(fx.trellis.quitting());
    }

    #[test]
    fn modal_layer_takes_and_returns_focus() {
        let log = Log::default();
        let mut fx = Fixture::new(Expanse::new(10, 10));
        let host = fx.add(fx.root(), Pane::new("host", &log));
        fx.process(Event::MoveFocus(host));
        log.take();
        let overlay = fx.trellis.layer(
            host,
            Pane::new("overlay", &log),
            LayerPos::Centered(Expanse::new(4, 4)),
            true,
        );
        fx.drain();
        assert_eq!(fx.trellis.focus(), overlay);
        assert_eq!(log.take(), vec!["host@focus_lost", "overlay@focus"]);

        fx.trellis.remove_layer(host);
        fx.drain();
        assert_eq!(fx.trellis.focus(), host);
        assert_eq!(log.take(), vec!["host@focus"]);
    }

    #[test]
    fn modal_layer_intercepts_outside_clicks() {
        let log = Log::default();
        let mut fx = Fixture::new(Expanse::new(10, 10));
        let host = fx.add(fx.root(), Pane::new("host", &log));
        fx.trellis.layer(
            host,
            Pane::new("overlay", &log),
            LayerPos::At(Point::new(4, 4), Expanse::new(2, 2)),
            true,
        );
        fx.drain();
        log.take();
        fx.click(0, 0);
        assert!(log.take().is_empty());
        // In-bounds pointer input bubbles from the overlay into its host.
        fx.click(4, 4);
        assert_eq!(log.take(), vec!["overlay@mouse", "host@mouse"]);
    }

    #[test]
    fn click_focuses_a_focusable_component_and_its_line() {
        let log = Log::default();
        let mut fx = Fixture::new(Expanse::new(10, 4));
        struct Clickable;
        impl Component for Clickable {
            fn on_init(&mut self, ctx: &mut Context<'_>) {
                ctx.set_lines(["a", "b", "c"]);
                ctx.features_mut().add(LINE_SELECTABLE);
                ctx.features_mut().add(Feature::Focusable);
            }
        }
        let id = fx.add(fx.root(), Clickable);
        assert_ne!(fx.trellis.focus(), id);
        fx.click(1, 2);
        assert_eq!(fx.trellis.focus(), id);
        assert_eq!(fx.inspect(id, |st| st.line_focus().line()), Some(2));
    }

    #[test]
    fn wheel_scrolls_the_focused_component() {
        let log = Log::default();
        let mut fx = Fixture::new(Expanse::new(10, 2));
        let list = fx.add(
            fx.root(),
            Pane::new("list", &log).with_lines(&["a", "b", "c"]),
        );
        fx.process(Event::MoveFocus(list));
        fx.process(Event::Mouse(mouse::MouseEvent {
            action: mouse::Action::Down,
            button: mouse::Button::WheelDown,
            modifiers: key::Empty,
            location: Point::new(1, 1),
        }));
        // Three lines in a two-row viewport: one page is a single line.
        assert_eq!(fx.inspect(list, |st| st.scroll().first()), 1);
    }

    #[test]
    fn cell_focus_pans_content_at_the_viewport_edge() {
        let mut fx = Fixture::new(Expanse::new(3, 1));
        struct Editorish;
        impl Component for Editorish {
            fn on_init(&mut self, ctx: &mut Context<'_>) {
                ctx.set_lines(["12345"]);
                ctx.features_mut().add(LINE_SELECTABLE);
                ctx.features_mut().add(CELL_FOCUSABLE);
                ctx.set_highlight(Highlight::None);
            }
        }
        let id = fx.add(fx.root(), Editorish);
        fx.process(Event::MoveFocus(id));
        fx.key(KeyCode::Down);
        assert_eq!(fx.screen(), vec!["123"]);
        fx.key(KeyCode::Right);
        fx.key(KeyCode::Right);
        fx.key(KeyCode::Right);
        let cell = fx.inspect(id, |st| st.line_focus().cell().unwrap());
        assert_eq!((cell.col, cell.pan), (2, 0));
        fx.key(KeyCode::Right);
        let cell = fx.inspect(id, |st| st.line_focus().cell().unwrap());
        assert!(cell.col <= 2);
        assert_eq!(fx.screen(), vec!["234"]);
    }

    #[test]
    fn editable_components_insert_runes_at_the_cursor() {
        let mut fx = Fixture::new(Expanse::new(10, 1));
        struct Input;
        impl Component for Input {
            fn on_init(&mut self, ctx: &mut Context<'_>) {
                ctx.set_lines(["ab"]);
                ctx.features_mut().add(LINE_SELECTABLE);
                ctx.features_mut().add(CELL_FOCUSABLE);
                ctx.features_mut().add(Feature::Editable);
                ctx.set_eol_policy(crate::core::linefocus::EolPolicy::PastLastRune);
            }
        }
        let id = fx.add(fx.root(), Input);
        fx.process(Event::MoveFocus(id));
        fx.key(KeyCode::Down);
        fx.key(KeyCode::End);
        fx.runes("cd");
        assert_eq!(
            fx.inspect(id, |st| st.line(0).unwrap().text().to_string()),
            "abcd"
        );
    }

    #[test]
    fn focus_transfer_moves_the_cursor_ownership() {
        let log = Log::default();
        let mut fx = Fixture::new(Expanse::new(10, 2));
        struct Cursory;
        impl Component for Cursory {
            fn on_init(&mut self, ctx: &mut Context<'_>) {
                ctx.set_lines(["ab"]);
                ctx.features_mut().add(LINE_SELECTABLE);
                ctx.features_mut().add(CELL_FOCUSABLE);
            }
        }
        let a = fx.add(fx.root(), Cursory);
        let b = fx.add(fx.root(), Pane::new("b", &log));
        fx.process(Event::MoveFocus(a));
        fx.key(KeyCode::Down);
        fx.key(KeyCode::Right);
        let cur = fx.trellis.screen.cursor().expect("cursor set");
        assert_eq!(cur.owner, a);
        fx.process(Event::MoveFocus(b));
        assert!(fx.trellis.screen.cursor().is_none());
    }

    #[test]
    fn zero_resize_is_a_noop() {
        let mut fx = Fixture::new(Expanse::new(10, 5));
        fx.process(Event::Resize(Expanse::new(0, 0)));
        assert_eq!(fx.trellis.screen.size, Expanse::new(10, 5));
    }
}
