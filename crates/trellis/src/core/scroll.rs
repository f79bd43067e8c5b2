//! Vertical scrolling over content lines.

/// Scroll state: the index of the first visible content line.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Scroll {
    /// First visible content line.
    first: usize,
}

/// Rows moved per page for a viewport of the given height: single-line
/// steps for a one-row viewport, height minus one up to ten rows, and
/// height less a tenth above that.
fn page(height: usize) -> usize {
    if height <= 1 {
        1
    } else if height <= 10 {
        height - 1
    } else {
        height - height / 10
    }
}

impl Scroll {
    /// The first visible content line.
    pub fn first(&self) -> usize {
        self.first
    }

    /// True if scrolled to the very top.
    pub fn is_at_top(&self) -> bool {
        self.first == 0
    }

    /// True if the last content line is visible.
    pub fn is_at_bottom(&self, len: usize, height: usize) -> bool {
        self.first >= len.saturating_sub(height)
    }

    /// Scroll one page towards the top.
    pub fn up(&mut self, height: usize) {
        self.first = self.first.saturating_sub(page(height));
    }

    /// Scroll one page towards the bottom, clamped so the viewport never
    /// runs past the content.
    pub fn down(&mut self, len: usize, height: usize) {
        self.first = (self.first + page(height)).min(len.saturating_sub(height));
    }

    /// Scroll to the top.
    pub fn to_top(&mut self) {
        self.first = 0;
    }

    /// Scroll so the last content line is the bottom screen line.
    pub fn to_bottom(&mut self, len: usize, height: usize) {
        self.first = len.saturating_sub(height);
    }

    /// Scroll to a specific first line, clamped to the valid range.
    /// Out-of-range requests are clamped, not errors.
    pub fn to(&mut self, idx: usize, len: usize, height: usize) {
        self.first = idx.min(len.saturating_sub(height));
    }

    /// Scroll the minimum amount to bring `idx` into view. Returns true
    /// if the viewport moved.
    pub fn ensure_visible(&mut self, idx: usize, height: usize) -> bool {
        if idx < self.first {
            self.first = idx;
            true
        } else if height > 0 && idx >= self.first + height {
            self.first = idx + 1 - height;
            true
        } else {
            false
        }
    }

    /// True if `idx` falls inside the visible window.
    pub fn is_visible(&self, idx: usize, height: usize) -> bool {
        idx >= self.first && idx < self.first + height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_sizes() {
        assert_eq!(page(1), 1);
        assert_eq!(page(2), 1);
        assert_eq!(page(10), 9);
        assert_eq!(page(20), 18);
        assert_eq!(page(30), 27);
    }

    #[test]
    fn down_moves_one_line_for_two_row_viewport() {
        // Three lines in a two-row viewport: a page is height - 1 = 1.
        let mut s = Scroll::default();
        s.down(3, 2);
        assert_eq!(s.first(), 1);
        // Clamped at len - height.
        s.down(3, 2);
        assert_eq!(s.first(), 1);
    }

    #[test]
    fn up_clamps_at_top() {
        let mut s = Scroll::default();
        s.down(30, 5);
        s.up(5);
        assert!(s.is_at_top());
        s.up(5);
        assert!(s.is_at_top());
    }

    #[test]
    fn short_content_never_scrolls() {
        let mut s = Scroll::default();
        s.down(2, 5);
        assert_eq!(s.first(), 0);
        s.to_bottom(2, 5);
        assert_eq!(s.first(), 0);
    }

    #[test]
    fn ensure_visible_moves_minimally() {
        let mut s = Scroll::default();
        assert!(s.ensure_visible(7, 3));
        assert_eq!(s.first(), 5);
        assert!(!s.ensure_visible(6, 3));
        assert!(s.ensure_visible(2, 3));
        assert_eq!(s.first(), 2);
    }
}
