//! The scoped handle components receive in callbacks.
//!
//! A [`Context`] is only ever constructed by the dispatcher, for the
//! duration of a single callback; it is the sole route to a component's
//! own state and to the control surface. It cannot escape the callback,
//! which is what makes component state unobservable from outside.

use std::any::Any;

use crate::core::{
    bindings::FeatureSet,
    component::{Component, ComponentState, EventOutcome, InputListener},
    content::Liner,
    error::Result,
    event::key::Key,
    id::ComponentId,
    line::Line,
    linefocus::{EolPolicy, Highlight},
    screen::{Axis, Layer, LayerPos, PendingOp, Screen},
    trellis::{Events, Sent},
};
use crate::geom::Rect;

/// Callback-scoped access to a component's state and the control surface.
pub struct Context<'a> {
    /// The screen, mutably borrowed for the callback.
    pub(crate) screen: &'a mut Screen,
    /// The component the callback runs on.
    pub(crate) id: ComponentId,
    /// Posting handle for synthetic events.
    pub(crate) events: Events,
}

impl Context<'_> {
    /// The id of the component this callback runs on.
    pub fn id(&self) -> ComponentId {
        self.id
    }

    /// A cloneable posting handle, safe to hand to other threads.
    pub fn events(&self) -> Events {
        self.events.clone()
    }

    /// The component's state.
    pub fn state(&self) -> &ComponentState {
        self.screen.state(self.id)
    }

    /// The component's state, mutably.
    pub fn state_mut(&mut self) -> &mut ComponentState {
        self.screen.state_mut(self.id)
    }

    /// The component's rectangle.
    pub fn dim(&self) -> Rect {
        self.state().dim()
    }

    /// The component's feature set, mutably.
    pub fn features_mut(&mut self) -> &mut FeatureSet {
        self.state_mut().features_mut()
    }

    // -- content ----------------------------------------------------------

    /// Append a content line.
    pub fn push_line(&mut self, line: impl Into<Line>) {
        self.state_mut().push_line(line);
    }

    /// Replace the content lines.
    pub fn set_lines<I, L>(&mut self, lines: I)
    where
        I: IntoIterator<Item = L>,
        L: Into<Line>,
    {
        self.state_mut().set_lines(lines);
    }

    /// Mutate a buffered content line in place.
    pub fn with_line(&mut self, idx: usize, f: impl FnOnce(&mut Line)) {
        self.state_mut().with_line(idx, f);
    }

    /// Attach a pull-based content provider.
    pub fn set_source(&mut self, liner: Box<dyn Liner>) {
        self.state_mut().set_source(liner);
    }

    /// Set the focused-line highlight policy.
    pub fn set_highlight(&mut self, highlight: Highlight) {
        self.state_mut().set_highlight(highlight);
    }

    /// Set the end-of-line cursor policy.
    pub fn set_eol_policy(&mut self, eol: EolPolicy) {
        self.state_mut().set_eol_policy(eol);
    }

    // -- scrolling and focus ----------------------------------------------

    /// Scroll one page up.
    pub fn scroll_up(&mut self) {
        self.state_mut().scroll_up();
    }

    /// Scroll one page down.
    pub fn scroll_down(&mut self) {
        self.state_mut().scroll_down();
    }

    /// Scroll to the top.
    pub fn scroll_to_top(&mut self) {
        self.state_mut().scroll_to_top();
    }

    /// Scroll to the bottom.
    pub fn scroll_to_bottom(&mut self) {
        self.state_mut().scroll_to_bottom();
    }

    /// Move line focus to the next focusable line.
    pub fn focus_next_line(&mut self) {
        self.state_mut().focus_next_line();
    }

    /// Move line focus to the previous focusable line.
    pub fn focus_prev_line(&mut self) {
        self.state_mut().focus_prev_line();
    }

    /// Reset line focus.
    pub fn reset_line_focus(&mut self) {
        self.state_mut().reset_line_focus();
    }

    // -- listener registration --------------------------------------------

    /// Register a listener for a single key. The NUL key is silently
    /// ignored.
    pub fn on_key(
        &mut self,
        k: impl Into<Key>,
        f: impl FnMut(&mut dyn Component, &mut Context<'_>) -> EventOutcome + Send + 'static,
    ) {
        let listener: InputListener = Box::new(f);
        self.state_mut().on_key(k, listener);
    }

    /// Register a listener for a single rune. NUL is silently ignored.
    pub fn on_rune(
        &mut self,
        rune: char,
        f: impl FnMut(&mut dyn Component, &mut Context<'_>) -> EventOutcome + Send + 'static,
    ) {
        let listener: InputListener = Box::new(f);
        self.state_mut().on_rune(rune, listener);
    }

    // -- tree and control surface -----------------------------------------

    /// Attach a new child component under this one.
    pub fn add_child(&mut self, comp: impl Component) -> ComponentId {
        let id = self.screen.add_child(self.id, Box::new(comp));
        self.screen.push_pending(PendingOp::Relayout);
        id
    }

    /// Set how this component's children divide its rectangle.
    pub fn set_axis(&mut self, axis: Axis) {
        self.screen.set_axis(self.id, axis);
        self.screen.push_pending(PendingOp::Relayout);
    }

    /// Move keyboard focus to another component once this callback
    /// returns.
    pub fn focus(&mut self, target: ComponentId) {
        self.screen.push_pending(PendingOp::FocusTransfer(target));
    }

    /// Host an overlay layer on this component. A modal overlay claims
    /// exclusive focus until the layer is removed.
    pub fn layer(&mut self, overlay: impl Component, pos: LayerPos, modal: bool) -> ComponentId {
        let id = self.screen.add_child(self.id, Box::new(overlay));
        self.screen.layers.push(Layer {
            host: self.id,
            overlay: id,
            pos,
            modal,
        });
        self.screen.push_pending(PendingOp::Relayout);
        if modal {
            self.screen.push_pending(PendingOp::FocusTransfer(id));
        }
        id
    }

    /// Remove the topmost layer hosted by this component once this
    /// callback returns.
    pub fn remove_layer(&mut self) {
        self.screen.push_pending(PendingOp::RemoveLayer(self.id));
    }

    /// Post an update event. A `None` target makes this a no-op that
    /// still succeeds.
    pub fn update(
        &self,
        target: Option<ComponentId>,
        payload: impl Any + Send,
    ) -> Result<Sent> {
        self.events.update(target, payload)
    }

    /// Post a quit event.
    pub fn quit(&self) -> Result<()> {
        self.events.quit()
    }
}
