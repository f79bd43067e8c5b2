//! A single content line: rune text, styled ranges, and state flags.

use std::ops::Range;

use unicode_segmentation::UnicodeSegmentation;

use crate::core::style::Style;

/// A styled span over a line, in rune indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleRange {
    /// Rune range the style applies to.
    pub range: Range<usize>,
    /// Style applied over the range.
    pub style: Style,
}

/// Per-line state flags.
///
/// At most one of `highlighted`/`trimmed_highlighted` is set at a time;
/// use [`Line::set_highlighted`] to maintain that.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LineFlags {
    /// Line focus skips this line.
    pub not_focusable: bool,
    /// Whole line rendered highlighted.
    pub highlighted: bool,
    /// Highlight applied to the whitespace-trimmed span only.
    pub trimmed_highlighted: bool,
    /// Content changed since the last screen sync.
    pub dirty: bool,
}

/// A line of component content.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Line {
    /// Rune content.
    content: String,
    /// Styled spans.
    styles: Vec<StyleRange>,
    /// State flags.
    flags: LineFlags,
}

impl Line {
    /// Construct a line from its text.
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            styles: Vec::new(),
            flags: LineFlags {
                dirty: true,
                ..LineFlags::default()
            },
        }
    }

    /// A line that line focus skips.
    pub fn unfocusable(content: impl Into<String>) -> Self {
        let mut l = Self::new(content);
        l.flags.not_focusable = true;
        l
    }

    /// The line text.
    pub fn text(&self) -> &str {
        &self.content
    }

    /// Replace the line text.
    pub fn set_text(&mut self, content: impl Into<String>) {
        self.content = content.into();
        self.flags.dirty = true;
    }

    /// The styled spans.
    pub fn styles(&self) -> &[StyleRange] {
        &self.styles
    }

    /// Style a rune range.
    pub fn style(&mut self, range: Range<usize>, style: Style) {
        self.styles.push(StyleRange { range, style });
        self.flags.dirty = true;
    }

    /// The line flags.
    pub fn flags(&self) -> LineFlags {
        self.flags
    }

    /// Set or clear the not-focusable flag.
    pub fn set_focusable(&mut self, focusable: bool) {
        self.flags.not_focusable = !focusable;
    }

    /// Number of runes in the line.
    pub fn rune_count(&self) -> usize {
        self.content.graphemes(true).count()
    }

    /// Byte offset of the rune at `idx`, or the end of the line.
    fn byte_at_rune(&self, idx: usize) -> usize {
        self.content
            .grapheme_indices(true)
            .nth(idx)
            .map(|(b, _)| b)
            .unwrap_or(self.content.len())
    }

    /// Insert a rune at a rune index, clamped to the end of the line.
    pub fn insert_rune(&mut self, idx: usize, rune: char) {
        let at = self.byte_at_rune(idx);
        self.content.insert(at, rune);
        self.flags.dirty = true;
    }

    /// Apply one highlight flag, clearing the other. `None` for both
    /// clears any highlight.
    pub(crate) fn set_highlighted(&mut self, full: bool, trimmed: bool) {
        debug_assert!(!(full && trimmed));
        if self.flags.highlighted != full || self.flags.trimmed_highlighted != trimmed {
            self.flags.dirty = true;
        }
        self.flags.highlighted = full;
        self.flags.trimmed_highlighted = trimmed;
    }

    /// Clear the dirty flag after a screen sync.
    pub(crate) fn clear_dirty(&mut self) {
        self.flags.dirty = false;
    }
}

impl From<&str> for Line {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Line {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rune_insertion() {
        let mut l = Line::new("ab");
        l.insert_rune(1, 'x');
        assert_eq!(l.text(), "axb");
        l.insert_rune(99, 'z');
        assert_eq!(l.text(), "axbz");
        assert!(l.flags().dirty);
    }

    #[test]
    fn rune_count_is_grapheme_based() {
        let l = Line::new("a\u{0301}bc");
        assert_eq!(l.rune_count(), 3);
    }

    #[test]
    fn highlight_flags_are_exclusive() {
        let mut l = Line::new("x");
        l.set_highlighted(true, false);
        assert!(l.flags().highlighted);
        l.set_highlighted(false, true);
        assert!(!l.flags().highlighted);
        assert!(l.flags().trimmed_highlighted);
        l.set_highlighted(false, false);
        assert_eq!(l.flags(), LineFlags {
            dirty: true,
            ..LineFlags::default()
        });
    }
}
