//! Line and cell focus state.
//!
//! A component is unfocused, line-focused, or cell-focused. This module
//! owns the state and the cell-cursor arithmetic; the scanning and
//! callback coordination live on the component state, which also holds
//! the content and scroll position.

/// How a focused line is marked.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Highlight {
    /// No visual mark.
    #[default]
    None,
    /// The whole screen line is highlighted.
    Full,
    /// Only the whitespace-trimmed content span is highlighted.
    Trimmed,
}

/// Where the cell cursor may rest at the end of a line.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum EolPolicy {
    /// The cursor rests on the last rune.
    #[default]
    OnLastRune,
    /// The cursor may rest one cell past the last rune, as needed for
    /// append editing.
    PastLastRune,
}

/// An active cell cursor within the focused line.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CellFocus {
    /// Visible column of the cursor, relative to the component's left edge.
    pub col: usize,
    /// The line's own horizontal scroll start, in runes.
    pub pan: usize,
}

impl CellFocus {
    /// The rune index under the cursor.
    pub fn rune_index(&self) -> usize {
        self.pan + self.col
    }
}

/// Per-component focus state over content lines.
#[derive(Debug, Default)]
pub struct LineFocus {
    /// Focused content line; `None` is the unfocused state.
    cur: Option<usize>,
    /// Highlight applied to the focused line.
    highlight: Highlight,
    /// Active cell cursor, if cell-focused.
    cell: Option<CellFocus>,
    /// End-of-line cursor policy.
    eol: EolPolicy,
    /// Cell cursor saved while the focused line is scrolled out of view.
    stash: Option<CellFocus>,
}

impl LineFocus {
    /// The focused content line, if any.
    pub fn line(&self) -> Option<usize> {
        self.cur
    }

    /// The active cell cursor, if any.
    pub fn cell(&self) -> Option<CellFocus> {
        self.cell
    }

    /// The highlight policy.
    pub fn highlight(&self) -> Highlight {
        self.highlight
    }

    /// Set the highlight policy for subsequent focus moves.
    pub fn set_highlight(&mut self, highlight: Highlight) {
        self.highlight = highlight;
    }

    /// The end-of-line policy.
    pub fn eol_policy(&self) -> EolPolicy {
        self.eol
    }

    /// Set the end-of-line policy.
    pub fn set_eol_policy(&mut self, eol: EolPolicy) {
        self.eol = eol;
    }

    /// Enter the line-focused state on `idx`.
    pub(crate) fn set_line(&mut self, idx: usize) {
        self.cur = Some(idx);
    }

    /// Return to the unfocused state, clearing cursor and stash. Always
    /// legal; calling it twice is the same as calling it once.
    pub(crate) fn reset(&mut self) {
        self.cur = None;
        self.cell = None;
        self.stash = None;
    }

    /// The largest legal rune index for a line of `rune_len` runes.
    fn max_index(&self, rune_len: usize) -> usize {
        match self.eol {
            EolPolicy::OnLastRune => rune_len.saturating_sub(1),
            EolPolicy::PastLastRune => rune_len,
        }
    }

    /// Activate the cell cursor at the first cell if it is not active.
    /// Returns true if the cursor was newly activated.
    pub(crate) fn activate_cell(&mut self) -> bool {
        if self.cur.is_none() || self.cell.is_some() {
            return false;
        }
        self.cell = Some(CellFocus::default());
        true
    }

    /// Move the cursor one cell right. At the right edge of the viewport
    /// the line pans by one column instead, keeping the cursor visible.
    /// Returns true if anything moved.
    pub(crate) fn cell_right(&mut self, rune_len: usize, width: usize) -> bool {
        let max = self.max_index(rune_len);
        let Some(cell) = self.cell.as_mut() else {
            return false;
        };
        if width == 0 || cell.rune_index() >= max {
            return false;
        }
        if cell.col + 1 < width {
            cell.col += 1;
        } else {
            cell.pan += 1;
        }
        true
    }

    /// Move the cursor one cell left, panning at the left edge.
    pub(crate) fn cell_left(&mut self) -> bool {
        let Some(cell) = self.cell.as_mut() else {
            return false;
        };
        if cell.col > 0 {
            cell.col -= 1;
            true
        } else if cell.pan > 0 {
            cell.pan -= 1;
            true
        } else {
            false
        }
    }

    /// Jump to the first cell of the line.
    pub(crate) fn cell_first(&mut self) -> bool {
        let Some(cell) = self.cell.as_mut() else {
            return false;
        };
        let moved = cell.col != 0 || cell.pan != 0;
        *cell = CellFocus::default();
        moved
    }

    /// Jump to the last cell of the line. Under [`EolPolicy::PastLastRune`]
    /// this is one past the final rune.
    pub(crate) fn cell_last(&mut self, rune_len: usize, width: usize) -> bool {
        let target = self.max_index(rune_len);
        let Some(cell) = self.cell.as_mut() else {
            return false;
        };
        let prev = *cell;
        if width == 0 || target < width {
            *cell = CellFocus {
                col: target,
                pan: 0,
            };
        } else {
            *cell = CellFocus {
                col: width - 1,
                pan: target - (width - 1),
            };
        }
        *cell != prev
    }

    /// Re-fit the cursor after focus moved to a line of `rune_len` runes:
    /// the cursor keeps its position unless the new line is shorter, in
    /// which case it clamps to the line's last cell.
    pub(crate) fn cell_refit(&mut self, rune_len: usize, width: usize) {
        let max = self.max_index(rune_len);
        if let Some(cell) = self.cell
            && cell.rune_index() > max
        {
            self.cell_last(rune_len, width);
        }
    }

    /// Save the cell cursor while the focused line is out of view.
    pub(crate) fn stash_cell(&mut self) {
        if let Some(cell) = self.cell.take() {
            self.stash = Some(cell);
        }
    }

    /// Restore a stashed cell cursor when the line scrolls back in.
    pub(crate) fn restore_cell(&mut self) {
        if self.cell.is_none()
            && let Some(cell) = self.stash.take()
        {
            self.cell = Some(cell);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell_focused() -> LineFocus {
        let mut lf = LineFocus::default();
        lf.set_line(0);
        lf.activate_cell();
        lf
    }

    #[test]
    fn right_pans_one_column_at_the_edge() {
        // "12345" in a three-cell viewport.
        let mut lf = cell_focused();
        assert!(lf.cell_right(5, 3));
        assert!(lf.cell_right(5, 3));
        assert_eq!(lf.cell().unwrap(), CellFocus { col: 2, pan: 0 });
        // The next step crosses the visible boundary: the column stays at
        // the last cell and the content pans from "123" to "234".
        assert!(lf.cell_right(5, 3));
        assert_eq!(lf.cell().unwrap(), CellFocus { col: 2, pan: 1 });
    }

    #[test]
    fn right_stops_at_the_last_rune() {
        let mut lf = cell_focused();
        for _ in 0..10 {
            lf.cell_right(3, 5);
        }
        assert_eq!(lf.cell().unwrap().rune_index(), 2);
        lf.set_eol_policy(EolPolicy::PastLastRune);
        assert!(lf.cell_right(3, 5));
        assert_eq!(lf.cell().unwrap().rune_index(), 3);
    }

    #[test]
    fn left_pans_back() {
        let mut lf = cell_focused();
        for _ in 0..4 {
            lf.cell_right(5, 3);
        }
        assert_eq!(lf.cell().unwrap(), CellFocus { col: 2, pan: 2 });
        assert!(lf.cell_left());
        assert!(lf.cell_left());
        assert_eq!(lf.cell().unwrap(), CellFocus { col: 0, pan: 2 });
        assert!(lf.cell_left());
        assert_eq!(lf.cell().unwrap(), CellFocus { col: 0, pan: 1 });
    }

    #[test]
    fn last_cell_honors_eol_policy() {
        let mut lf = cell_focused();
        assert!(lf.cell_last(5, 3));
        assert_eq!(lf.cell().unwrap(), CellFocus { col: 2, pan: 2 });
        assert_eq!(lf.cell().unwrap().rune_index(), 4);

        lf.set_eol_policy(EolPolicy::PastLastRune);
        assert!(lf.cell_last(5, 3));
        assert_eq!(lf.cell().unwrap().rune_index(), 5);

        lf.cell_first();
        assert_eq!(lf.cell().unwrap(), CellFocus::default());
    }

    #[test]
    fn refit_clamps_only_shorter_lines() {
        let mut lf = cell_focused();
        lf.cell_last(5, 10);
        lf.cell_refit(8, 10);
        assert_eq!(lf.cell().unwrap().rune_index(), 4);
        lf.cell_refit(3, 10);
        assert_eq!(lf.cell().unwrap().rune_index(), 2);
    }

    #[test]
    fn stash_roundtrip() {
        let mut lf = cell_focused();
        lf.cell_right(5, 3);
        lf.stash_cell();
        assert!(lf.cell().is_none());
        lf.restore_cell();
        assert_eq!(lf.cell().unwrap(), CellFocus { col: 1, pan: 0 });
    }

    #[test]
    fn reset_is_idempotent() {
        let mut lf = cell_focused();
        lf.cell_right(5, 3);
        lf.reset();
        assert!(lf.line().is_none());
        assert!(lf.cell().is_none());
        lf.reset();
        assert!(lf.line().is_none());
    }
}
