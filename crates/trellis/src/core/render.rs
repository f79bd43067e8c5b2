//! Painting component content into a terminal buffer.
//!
//! Each component's visible content lines are padded to its width and
//! written into its rectangle; focused-line highlights and styled spans
//! are applied here. Overlay layers paint after the base tree, bottom to
//! top. Wrapping and tab arithmetic are deliberately out of scope.

use pad::{Alignment, PadStr};
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

use crate::core::{
    component::ComponentState,
    id::ComponentId,
    line::Line,
    linefocus::Highlight,
    screen::Screen,
    style::Style,
    termbuf::TermBuf,
};
use crate::geom::Point;

/// Draw the whole screen into a fresh buffer.
pub(crate) fn draw(screen: &Screen) -> TermBuf {
    let mut buf = TermBuf::new(screen.size, ' ', Style::default());
    paint_tree(screen, screen.root, &mut buf);
    for layer in &screen.layers {
        paint_tree(screen, layer.overlay, &mut buf);
    }
    buf
}

/// Paint a component and its non-overlay descendants.
fn paint_tree(screen: &Screen, id: ComponentId, buf: &mut TermBuf) {
    let Some(node) = screen.nodes.get(id) else {
        return;
    };
    paint_node(&node.state, buf);
    for child in &node.children {
        if screen.is_overlay(*child) {
            continue;
        }
        paint_tree(screen, *child, buf);
    }
}

/// Paint one component's visible lines into its rectangle.
fn paint_node(st: &ComponentState, buf: &mut TermBuf) {
    let dim = st.dim();
    if dim.is_zero() {
        return;
    }
    let width = dim.w as usize;
    let first = st.scroll().first();
    for row in 0..dim.h {
        let idx = first + row as usize;
        let Some(line) = st.line(idx) else {
            continue;
        };
        let focused = st.line_focus().line() == Some(idx);
        let pan = if focused {
            st.line_focus().cell().map(|c| c.pan).unwrap_or(0)
        } else {
            0
        };
        paint_line(st, &line, focused, pan, width, dim.tl, row, buf);
    }
}

/// Paint a single content line at a screen row.
#[allow(clippy::too_many_arguments)]
fn paint_line(
    st: &ComponentState,
    line: &Line,
    focused: bool,
    pan: usize,
    width: usize,
    origin: Point,
    row: u32,
    buf: &mut TermBuf,
) {
    let visible: String = line
        .text()
        .graphemes(true)
        .skip(pan)
        .take(width)
        .collect();
    let padded = visible.pad(width, ' ', Alignment::Left, true);

    let flags = line.flags();
    // Buffered lines carry highlight flags; provider-backed lines derive
    // the highlight from the focus state at paint time.
    let full = flags.highlighted || (focused && st.line_focus().highlight() == Highlight::Full);
    let trimmed = flags.trimmed_highlighted
        || (focused && st.line_focus().highlight() == Highlight::Trimmed);
    let trim_span = trimmed.then(|| trimmed_span(&padded));

    let mut col = 0usize;
    for (gi, g) in padded.graphemes(true).enumerate() {
        if col >= width {
            break;
        }
        let rune_idx = pan + gi;
        let mut style = span_style(line, rune_idx).unwrap_or_default();
        let highlit = full || trim_span.map(|(s, e)| gi >= s && gi < e).unwrap_or(false);
        if highlit {
            style = style.reversed();
        }
        let ch = g.chars().next().unwrap_or(' ');
        buf.put(
            Point::new(origin.x + col as u32, origin.y + row),
            ch,
            style,
        );
        // Wide graphemes occupy two cells.
        col += UnicodeWidthStr::width(g).max(1);
    }
}

/// The style of the span covering a rune index, if any.
fn span_style(line: &Line, rune_idx: usize) -> Option<Style> {
    line.styles()
        .iter()
        .find(|s| s.range.contains(&rune_idx))
        .map(|s| s.style)
}

/// The grapheme range of a padded line with surrounding blanks stripped.
fn trimmed_span(padded: &str) -> (usize, usize) {
    let total = padded.graphemes(true).count();
    let lead = padded
        .graphemes(true)
        .take_while(|g| g.trim().is_empty())
        .count();
    let trail = padded
        .graphemes(true)
        .rev()
        .take_while(|g| g.trim().is_empty())
        .count();
    if lead >= total {
        (0, 0)
    } else {
        (lead, total - trail)
    }
}
