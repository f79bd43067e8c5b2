//! User components and their per-node state.
//!
//! A [`Component`] is user behavior; its internal state — feature set, line
//! content, scroll position, line focus, listeners — lives on the arena node
//! as a [`ComponentState`]. State is only reachable through the [`Context`]
//! handle passed into a callback: the dispatcher enables the node around the
//! call and disables it again afterward, and the crate-internal accessors
//! panic on disabled access.

use std::{any::Any, collections::HashMap};

use crate::core::{
    bindings::FeatureSet,
    content::{Content, Liner, SourceCaps},
    context::Context,
    event::{
        key::{self, Key, KeyCode},
        mouse::MouseEvent,
    },
    feature::Feature,
    line::Line,
    linefocus::{CellFocus, EolPolicy, Highlight, LineFocus},
    name::Name,
    scroll::Scroll,
};
use crate::geom::Rect;

/// The result of an event handler.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum EventOutcome {
    /// The event was processed and propagation stops.
    Handle,
    /// The event was processed without a state change and propagation stops.
    Consume,
    /// The event was not handled and bubbles to the parent.
    Ignore,
}

/// A listener registered for a single key or rune.
pub type InputListener =
    Box<dyn FnMut(&mut dyn Component, &mut Context<'_>) -> EventOutcome + Send>;

/// Behavior attached to a node in the component tree.
///
/// Every callback is optional; the defaults ignore events and do nothing.
/// Key, rune, and mouse handlers take part in bubbling: returning
/// [`EventOutcome::Ignore`] passes the event to the parent, anything else
/// stops it.
#[allow(unused_variables)]
pub trait Component: Any + Send {
    /// Name used in traces and debug output.
    fn name(&self) -> Name {
        Name::of::<Self>()
    }

    /// Called once, before the component's first layout.
    fn on_init(&mut self, ctx: &mut Context<'_>) {}

    /// Called after the component's rectangle changed.
    fn on_layout(&mut self, ctx: &mut Context<'_>) {}

    /// Called when the component gains keyboard focus.
    fn on_focus(&mut self, ctx: &mut Context<'_>) {}

    /// Called when the component loses keyboard focus.
    fn on_focus_lost(&mut self, ctx: &mut Context<'_>) {}

    /// Called when a content line gains line focus.
    fn on_line_focus(&mut self, ctx: &mut Context<'_>, idx: usize) {}

    /// Called when a content line loses line focus.
    fn on_line_focus_lost(&mut self, ctx: &mut Context<'_>, idx: usize) {}

    /// Called when the focused line is selected.
    fn on_line_selected(&mut self, ctx: &mut Context<'_>, idx: usize) {}

    /// Called when the focused line pans horizontally; the flags report
    /// whether content is hidden to the left and right.
    fn on_line_overflow(&mut self, ctx: &mut Context<'_>, left: bool, right: bool) {}

    /// Called when the cell cursor moved; coordinates are local.
    fn on_cursor(&mut self, ctx: &mut Context<'_>, col: usize, row: usize) {}

    /// Generic key handler.
    fn on_key(&mut self, ctx: &mut Context<'_>, key: Key) -> EventOutcome {
        EventOutcome::Ignore
    }

    /// Generic rune handler: a printable character without control or alt.
    fn on_rune(&mut self, ctx: &mut Context<'_>, rune: char, mods: key::Mods) -> EventOutcome {
        EventOutcome::Ignore
    }

    /// Targeted button-press handler; the event location is local.
    fn on_click(&mut self, ctx: &mut Context<'_>, evt: &MouseEvent) -> EventOutcome {
        EventOutcome::Ignore
    }

    /// Generic mouse handler; the event location is local.
    fn on_mouse(&mut self, ctx: &mut Context<'_>, evt: &MouseEvent) -> EventOutcome {
        EventOutcome::Ignore
    }

    /// Called for a posted update without an explicit listener.
    fn on_update(&mut self, ctx: &mut Context<'_>, payload: &(dyn Any + Send)) {}

    /// Called on every component when the application quits.
    fn on_quit(&mut self) {}
}

/// A derived event produced by a state operation, delivered to the owning
/// component after the current callback returns. Queuing these is what
/// keeps derived reports alive when bubbling of the originating input was
/// stopped, and lets a component trigger focus operations on itself from
/// inside its own callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Report {
    /// A line gained line focus.
    LineFocus(usize),
    /// A line lost line focus.
    LineFocusLost(usize),
    /// The focused line was selected.
    LineSelected(usize),
    /// The cell cursor moved to a local column/row.
    Cursor(usize, usize),
    /// The focused line panned; content hidden left/right.
    LineOverflow(bool, bool),
}

/// Internal state of a component, constructed once on first attach.
pub struct ComponentState {
    /// Component name, for traces.
    name: Name,
    /// The component's rectangle, assigned by layout.
    dim: Rect,
    /// Enabled features and binding tables.
    features: FeatureSet,
    /// Line content.
    content: Content,
    /// Vertical scroll position.
    scroll: Scroll,
    /// Line and cell focus.
    focus: LineFocus,
    /// Explicit per-key listeners.
    key_listeners: HashMap<Key, InputListener>,
    /// Explicit per-rune listeners.
    rune_listeners: HashMap<char, InputListener>,
    /// Derived reports pending delivery.
    reports: Vec<Report>,
    /// Content or focus changed since the last screen sync.
    dirty: bool,
}

impl ComponentState {
    /// Construct state for a freshly attached component.
    pub(crate) fn new(name: Name, features: FeatureSet) -> Self {
        Self {
            name,
            dim: Rect::zero(),
            features,
            content: Content::Buffer(Vec::new()),
            scroll: Scroll::default(),
            focus: LineFocus::default(),
            key_listeners: HashMap::new(),
            rune_listeners: HashMap::new(),
            reports: Vec::new(),
            dirty: true,
        }
    }

    /// The component name.
    pub fn name(&self) -> &Name {
        &self.name
    }

    /// The component's rectangle in screen coordinates.
    pub fn dim(&self) -> Rect {
        self.dim
    }

    /// Viewport height in rows.
    fn height(&self) -> usize {
        self.dim.h as usize
    }

    /// Viewport width in cells.
    fn width(&self) -> usize {
        self.dim.w as usize
    }

    /// The feature set.
    pub fn features(&self) -> &FeatureSet {
        &self.features
    }

    /// Mutable access to the feature set.
    pub fn features_mut(&mut self) -> &mut FeatureSet {
        self.dirty = true;
        &mut self.features
    }

    /// The vertical scroll state.
    pub fn scroll(&self) -> Scroll {
        self.scroll
    }

    /// The line/cell focus state.
    pub fn line_focus(&self) -> &LineFocus {
        &self.focus
    }

    /// Set the highlight policy applied to focused lines.
    pub fn set_highlight(&mut self, highlight: Highlight) {
        self.focus.set_highlight(highlight);
        self.dirty = true;
    }

    /// Set the end-of-line cursor policy.
    pub fn set_eol_policy(&mut self, eol: EolPolicy) {
        self.focus.set_eol_policy(eol);
    }

    // -- content ----------------------------------------------------------

    /// Number of content lines.
    pub fn len(&self) -> usize {
        self.content.len()
    }

    /// True if there is no content.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// A copy of the content line at `idx`.
    pub fn line(&self, idx: usize) -> Option<Line> {
        self.content.line(idx)
    }

    /// Append a line to the in-memory buffer. Ignored for provider-backed
    /// content.
    pub fn push_line(&mut self, line: impl Into<Line>) {
        if let Some(buf) = self.content.buffer_mut() {
            buf.push(line.into());
            self.dirty = true;
        }
    }

    /// Replace the in-memory buffer wholesale, resetting focus and scroll.
    pub fn set_lines<I, L>(&mut self, lines: I)
    where
        I: IntoIterator<Item = L>,
        L: Into<Line>,
    {
        self.content = Content::Buffer(lines.into_iter().map(Into::into).collect());
        self.focus.reset();
        self.scroll.to_top();
        self.dirty = true;
    }

    /// Mutate a buffered line in place. Out-of-range indices and
    /// provider-backed content are silent no-ops.
    pub fn with_line(&mut self, idx: usize, f: impl FnOnce(&mut Line)) {
        if let Some(l) = self.content.buffer_mut().and_then(|b| b.get_mut(idx)) {
            f(l);
            self.dirty = true;
        }
    }

    /// Attach a pull-based content provider, enabling the features its
    /// capabilities support.
    pub fn set_source(&mut self, liner: Box<dyn Liner>) {
        let caps = SourceCaps::resolve(liner.as_ref());
        self.features.add(caps.features());
        self.content = Content::Source { liner, caps };
        self.focus.reset();
        self.scroll.to_top();
        self.dirty = true;
    }

    /// The capabilities of an attached provider, if any.
    pub fn source_caps(&self) -> Option<SourceCaps> {
        match &self.content {
            Content::Buffer(_) => None,
            Content::Source { caps, .. } => Some(*caps),
        }
    }

    // -- listeners --------------------------------------------------------

    /// Register a listener for a single key. Registering the NUL key is
    /// silently ignored, since it is the common "no binding" sentinel.
    pub fn on_key(&mut self, k: impl Into<Key>, listener: InputListener) {
        let k = k.into();
        if k.code == KeyCode::Null {
            return;
        }
        self.key_listeners.insert(k.normalize(), listener);
    }

    /// Register a listener for a single rune. NUL is silently ignored.
    pub fn on_rune(&mut self, rune: char, listener: InputListener) {
        if rune == '\0' {
            return;
        }
        self.rune_listeners.insert(rune, listener);
    }

    /// Take a key listener out for invocation.
    pub(crate) fn take_key_listener(&mut self, k: Key) -> Option<InputListener> {
        self.key_listeners.remove(&k.normalize())
    }

    /// Reinstall a key listener after invocation.
    pub(crate) fn put_key_listener(&mut self, k: Key, listener: InputListener) {
        self.key_listeners.entry(k.normalize()).or_insert(listener);
    }

    /// Take a rune listener out for invocation.
    pub(crate) fn take_rune_listener(&mut self, rune: char) -> Option<InputListener> {
        self.rune_listeners.remove(&rune)
    }

    /// Reinstall a rune listener after invocation.
    pub(crate) fn put_rune_listener(&mut self, rune: char, listener: InputListener) {
        self.rune_listeners.entry(rune).or_insert(listener);
    }

    // -- scrolling --------------------------------------------------------

    /// Scroll one page up.
    pub fn scroll_up(&mut self) {
        self.scroll.up(self.height());
        self.sync_focus_visibility();
    }

    /// Scroll one page down.
    pub fn scroll_down(&mut self) {
        self.scroll.down(self.len(), self.height());
        self.sync_focus_visibility();
    }

    /// Scroll to the top.
    pub fn scroll_to_top(&mut self) {
        self.scroll.to_top();
        self.sync_focus_visibility();
    }

    /// Scroll to the bottom.
    pub fn scroll_to_bottom(&mut self) {
        self.scroll.to_bottom(self.len(), self.height());
        self.sync_focus_visibility();
    }

    /// Scroll so `idx` is the first visible line, clamped to the content.
    pub fn scroll_to(&mut self, idx: usize) {
        self.scroll.to(idx, self.len(), self.height());
        self.sync_focus_visibility();
    }

    /// After a scroll, toggle the focused line's highlight with its
    /// visibility and stash or restore the cell cursor.
    fn sync_focus_visibility(&mut self) {
        self.dirty = true;
        let Some(cur) = self.focus.line() else {
            return;
        };
        if self.scroll.is_visible(cur, self.height()) {
            self.apply_highlight(cur);
            self.focus.restore_cell();
            if let Some(cell) = self.focus.cell() {
                self.report(Report::Cursor(cell.col, cur - self.scroll.first()));
            }
        } else {
            self.clear_highlight(cur);
            self.focus.stash_cell();
        }
    }

    // -- line focus -------------------------------------------------------

    /// Scan forward for the next focusable line. With none left the state
    /// resets and the component scrolls to the bottom.
    pub fn focus_next_line(&mut self) {
        let len = self.len();
        let start = self.focus.line().map(|c| c + 1).unwrap_or(0);
        for idx in start..len {
            if self.content.focusable(idx) {
                self.move_line_focus(idx);
                return;
            }
        }
        self.reset_line_focus();
        self.scroll.to_bottom(len, self.height());
        self.dirty = true;
    }

    /// Scan backward for the previous focusable line. With none left the
    /// state resets and the component scrolls to the top.
    pub fn focus_prev_line(&mut self) {
        let len = self.len();
        let start = self.focus.line().unwrap_or(len);
        for idx in (0..start.min(len)).rev() {
            if self.content.focusable(idx) {
                self.move_line_focus(idx);
                return;
            }
        }
        self.reset_line_focus();
        self.scroll.to_top();
        self.dirty = true;
    }

    /// Focus the line under local screen row `y`, honoring the
    /// not-focusable flag. Out-of-range rows are no-ops.
    pub fn focus_line_at(&mut self, y: usize) {
        let idx = self.scroll.first() + y;
        if idx < self.len() && self.content.focusable(idx) {
            self.move_line_focus(idx);
        }
    }

    /// Reset to the unfocused state, clearing highlight and cursor. Always
    /// legal and idempotent.
    pub fn reset_line_focus(&mut self) {
        if let Some(old) = self.focus.line() {
            self.clear_highlight(old);
            self.report(Report::LineFocusLost(old));
        }
        self.focus.reset();
        self.dirty = true;
    }

    /// Report the focused line as selected.
    pub fn select_line(&mut self) {
        if let Some(cur) = self.focus.line() {
            self.report(Report::LineSelected(cur));
        }
    }

    /// Move line focus to `idx`: clear the old highlight, auto-scroll the
    /// new line into view, re-apply highlight, and re-fit the cell cursor.
    fn move_line_focus(&mut self, idx: usize) {
        if let Some(old) = self.focus.line() {
            if old == idx {
                return;
            }
            self.clear_highlight(old);
            self.report(Report::LineFocusLost(old));
        }
        self.focus.set_line(idx);
        self.scroll.ensure_visible(idx, self.height());
        self.apply_highlight(idx);
        let rune_len = self.rune_len(idx);
        self.focus.cell_refit(rune_len, self.width());
        self.report(Report::LineFocus(idx));
        if let Some(cell) = self.focus.cell() {
            self.report(Report::Cursor(cell.col, idx - self.scroll.first()));
        }
        self.dirty = true;
    }

    // -- cell focus -------------------------------------------------------

    /// Rune length of line `idx`, zero when it does not exist.
    fn rune_len(&self, idx: usize) -> usize {
        self.content.line(idx).map(|l| l.rune_count()).unwrap_or(0)
    }

    /// The rune length of the focused line, if cell operations are legal.
    fn focused_rune_len(&self) -> Option<(usize, usize)> {
        self.focus.line().map(|cur| (cur, self.rune_len(cur)))
    }

    /// Move the cell cursor right, activating it on first use.
    pub fn focus_next_cell(&mut self) {
        let Some((cur, rune_len)) = self.focused_rune_len() else {
            return;
        };
        let before = self.focus.cell();
        if !self.focus.activate_cell() {
            self.focus.cell_right(rune_len, self.width());
        }
        self.after_cell_move(cur, rune_len, before);
    }

    /// Move the cell cursor left.
    pub fn focus_prev_cell(&mut self) {
        let Some((cur, rune_len)) = self.focused_rune_len() else {
            return;
        };
        let before = self.focus.cell();
        if !self.focus.activate_cell() {
            self.focus.cell_left();
        }
        self.after_cell_move(cur, rune_len, before);
    }

    /// Jump the cell cursor to the first cell.
    pub fn focus_first_cell(&mut self) {
        let Some((cur, rune_len)) = self.focused_rune_len() else {
            return;
        };
        let before = self.focus.cell();
        if !self.focus.activate_cell() {
            self.focus.cell_first();
        }
        self.after_cell_move(cur, rune_len, before);
    }

    /// Jump the cell cursor to the last cell per the end-of-line policy.
    pub fn focus_last_cell(&mut self) {
        let Some((cur, rune_len)) = self.focused_rune_len() else {
            return;
        };
        let before = self.focus.cell();
        self.focus.activate_cell();
        self.focus.cell_last(rune_len, self.width());
        self.after_cell_move(cur, rune_len, before);
    }

    /// Report cursor movement and panning after a cell operation.
    fn after_cell_move(&mut self, cur: usize, rune_len: usize, before: Option<CellFocus>) {
        let Some(cell) = self.focus.cell() else {
            return;
        };
        if before == Some(cell) {
            return;
        }
        self.dirty = true;
        let row = cur.saturating_sub(self.scroll.first());
        self.report(Report::Cursor(cell.col, row));
        let panned = before.map(|b| b.pan != cell.pan).unwrap_or(cell.pan != 0);
        if panned {
            let right = cell.pan + self.width() < rune_len;
            self.report(Report::LineOverflow(cell.pan > 0, right));
        }
    }

    // -- editing ----------------------------------------------------------

    /// Insert a rune at the cell cursor and advance it. A no-op without an
    /// active cell cursor or when the content rejects the edit.
    pub fn insert_rune(&mut self, rune: char) {
        let Some((cur, _)) = self.focused_rune_len() else {
            return;
        };
        let Some(cell) = self.focus.cell() else {
            return;
        };
        if !self.content.insert(cur, cell.rune_index(), rune) {
            return;
        }
        self.dirty = true;
        let rune_len = self.rune_len(cur);
        let before = self.focus.cell();
        self.focus.cell_right(rune_len, self.width());
        self.after_cell_move(cur, rune_len, before);
    }

    // -- dispatch plumbing ------------------------------------------------

    /// Queue a derived report for delivery after the current callback.
    fn report(&mut self, r: Report) {
        self.reports.push(r);
    }

    /// Drain pending derived reports.
    pub(crate) fn take_reports(&mut self) -> Vec<Report> {
        std::mem::take(&mut self.reports)
    }

    /// True if the state changed since the last screen sync.
    pub(crate) fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Clear the dirty flag after a screen sync.
    pub(crate) fn clear_dirty(&mut self) {
        self.dirty = false;
        if let Some(buf) = self.content.buffer_mut() {
            for l in buf {
                l.clear_dirty();
            }
        }
    }

    /// Set the component rectangle. Returns true if it changed.
    pub(crate) fn set_dim(&mut self, dim: Rect) -> bool {
        if self.dim == dim {
            return false;
        }
        self.dim = dim;
        self.dirty = true;
        // Content can have shrunk below the current scroll or cursor.
        let (len, h, w) = (self.len(), self.height(), self.width());
        self.scroll.to(self.scroll.first(), len, h);
        if let Some((_, rune_len)) = self.focused_rune_len() {
            self.focus.cell_refit(rune_len, w);
        }
        self.sync_focus_visibility();
        true
    }

    /// Re-establish focus legality after arbitrary state mutation: an
    /// out-of-range or no-longer-focusable focused line resets the state,
    /// as does losing the line focus features.
    pub(crate) fn validate_focus(&mut self) {
        let Some(cur) = self.focus.line() else {
            return;
        };
        let feature_ok = self.features.has(Feature::NextLineFocusable)
            || self.features.has(Feature::PrevLineFocusable);
        if !feature_ok || cur >= self.len() || !self.content.focusable(cur) {
            self.reset_line_focus();
        }
    }

    /// Apply the configured highlight to a buffered line.
    fn apply_highlight(&mut self, idx: usize) {
        let highlight = self.focus.highlight();
        if let Some(l) = self.content.buffer_mut().and_then(|b| b.get_mut(idx)) {
            match highlight {
                Highlight::None => l.set_highlighted(false, false),
                Highlight::Full => l.set_highlighted(true, false),
                Highlight::Trimmed => l.set_highlighted(false, true),
            }
        }
    }

    /// Clear any highlight on a buffered line.
    fn clear_highlight(&mut self, idx: usize) {
        if let Some(l) = self.content.buffer_mut().and_then(|b| b.get_mut(idx)) {
            l.set_highlighted(false, false);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::core::{
        bindings::FeatureBindings,
        feature::{FeatureGroup, LINE_SELECTABLE},
    };

    fn state(lines: &[&str], w: u32, h: u32) -> ComponentState {
        let mut st = ComponentState::new(
            Name::convert("test"),
            FeatureSet::new(Arc::new(FeatureBindings::standard()), FeatureGroup::EMPTY),
        );
        st.features_mut().add(LINE_SELECTABLE);
        st.set_lines(lines.iter().copied());
        st.set_dim(Rect::new(0, 0, w, h));
        st.take_reports();
        st
    }

    #[test]
    fn next_walks_focusable_lines_only() {
        let mut st = state(&["a", "b", "c"], 10, 3);
        st.with_line(1, |l| l.set_focusable(false));
        st.focus_next_line();
        assert_eq!(st.line_focus().line(), Some(0));
        st.focus_next_line();
        assert_eq!(st.line_focus().line(), Some(2));
        assert_eq!(
            st.take_reports(),
            vec![
                Report::LineFocus(0),
                Report::LineFocusLost(0),
                Report::LineFocus(2)
            ]
        );
    }

    #[test]
    fn next_past_the_end_resets_and_scrolls_to_bottom() {
        let mut st = state(&["a", "b", "c", "d"], 10, 2);
        st.focus_next_line();
        st.focus_next_line();
        st.focus_next_line();
        st.focus_next_line();
        assert_eq!(st.line_focus().line(), Some(3));
        st.focus_next_line();
        assert_eq!(st.line_focus().line(), None);
        assert_eq!(st.scroll().first(), 2);
    }

    #[test]
    fn prev_past_the_start_resets_and_scrolls_to_top() {
        let mut st = state(&["a", "b", "c", "d"], 10, 2);
        st.scroll_to_bottom();
        st.focus_prev_line();
        assert_eq!(st.line_focus().line(), Some(3));
        st.focus_prev_line();
        st.focus_prev_line();
        st.focus_prev_line();
        assert_eq!(st.line_focus().line(), Some(0));
        st.focus_prev_line();
        assert_eq!(st.line_focus().line(), None);
        assert_eq!(st.scroll().first(), 0);
    }

    #[test]
    fn focus_moves_apply_and_clear_highlight() {
        let mut st = state(&["a", "b"], 10, 2);
        st.set_highlight(Highlight::Full);
        st.focus_next_line();
        assert!(st.line(0).unwrap().flags().highlighted);
        st.focus_next_line();
        assert!(!st.line(0).unwrap().flags().highlighted);
        assert!(st.line(1).unwrap().flags().highlighted);
    }

    #[test]
    fn reset_restores_prefocus_state_and_is_idempotent() {
        let mut st = state(&["a", "b"], 10, 2);
        st.set_highlight(Highlight::Trimmed);
        st.focus_next_line();
        st.focus_next_cell();
        st.reset_line_focus();
        assert_eq!(st.line_focus().line(), None);
        assert!(st.line_focus().cell().is_none());
        assert!(!st.line(0).unwrap().flags().trimmed_highlighted);
        let flags_after = st.line(0).unwrap().flags();
        st.reset_line_focus();
        assert_eq!(st.line(0).unwrap().flags(), flags_after);
    }

    #[test]
    fn cell_panning_keeps_the_cursor_in_view() {
        // "12345" shown in a width-three viewport.
        let mut st = state(&["12345"], 3, 1);
        st.focus_next_line();
        st.take_reports();
        // First press activates at the first cell, the next two walk to
        // the last visible cell, the fourth pans "123" to "234".
        st.focus_next_cell();
        st.focus_next_cell();
        st.focus_next_cell();
        let cell = st.line_focus().cell().unwrap();
        assert_eq!((cell.col, cell.pan), (2, 0));
        st.focus_next_cell();
        let cell = st.line_focus().cell().unwrap();
        assert_eq!((cell.col, cell.pan), (2, 1));
        assert!(
            st.take_reports()
                .contains(&Report::LineOverflow(true, true))
        );
    }

    #[test]
    fn append_editing_past_the_last_rune() {
        let mut st = state(&["ab"], 10, 1);
        st.set_eol_policy(EolPolicy::PastLastRune);
        st.focus_next_line();
        st.focus_last_cell();
        assert_eq!(st.line_focus().cell().unwrap().rune_index(), 2);
        st.insert_rune('c');
        assert_eq!(st.line(0).unwrap().text(), "abc");
        assert_eq!(st.line_focus().cell().unwrap().rune_index(), 3);
    }

    #[test]
    fn scrolling_away_stashes_the_cursor_and_highlight() {
        let mut st = state(&["a", "b", "c", "d", "e"], 10, 2);
        st.set_highlight(Highlight::Full);
        st.focus_next_line();
        st.focus_next_cell();
        st.scroll_down();
        assert!(!st.line(0).unwrap().flags().highlighted);
        assert!(st.line_focus().cell().is_none());
        st.scroll_to_top();
        assert!(st.line(0).unwrap().flags().highlighted);
        assert!(st.line_focus().cell().is_some());
    }

    #[test]
    fn shrinking_content_invalidates_focus() {
        let mut st = state(&["a", "b", "c"], 10, 3);
        st.focus_next_line();
        st.focus_next_line();
        st.set_lines(["only"]);
        st.validate_focus();
        assert_eq!(st.line_focus().line(), None);
    }

    #[test]
    fn selection_reports_the_focused_line() {
        let mut st = state(&["a", "b"], 10, 2);
        st.select_line();
        assert!(st.take_reports().is_empty());
        st.focus_next_line();
        st.take_reports();
        st.select_line();
        assert_eq!(st.take_reports(), vec![Report::LineSelected(0)]);
    }

    mod properties {
        use proptest::prelude::*;

        use super::*;

        proptest! {
            // Any sequence of next/previous calls either leaves the
            // component unfocused or lands on a focusable line.
            #[test]
            fn focus_walks_land_on_focusable_lines(
                ops in proptest::collection::vec(proptest::bool::ANY, 1..40),
                mask in proptest::collection::vec(proptest::bool::ANY, 1..12),
            ) {
                let mut st = state(&[], 10, 4);
                st.set_lines(mask.iter().enumerate().map(|(i, focusable)| {
                    let mut l = Line::new(format!("line {i}"));
                    l.set_focusable(*focusable);
                    l
                }));
                for forward in ops {
                    if forward {
                        st.focus_next_line();
                    } else {
                        st.focus_prev_line();
                    }
                    if let Some(cur) = st.line_focus().line() {
                        prop_assert!(cur < mask.len());
                        prop_assert!(mask[cur]);
                    }
                }
            }

            // A walk past either end always resets to the unfocused state.
            #[test]
            fn walking_off_either_end_unfocuses(len in 1usize..8, height in 1u32..6) {
                let mut st = state(&[], 10, height);
                st.set_lines((0..len).map(|i| Line::new(format!("{i}"))));
                for _ in 0..=len {
                    st.focus_next_line();
                }
                prop_assert_eq!(st.line_focus().line(), None);
                prop_assert!(st.scroll().is_at_bottom(len, height as usize));
            }
        }
    }
}
