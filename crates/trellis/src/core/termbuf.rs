//! A cell buffer for screen synchronization.
//!
//! Rendering draws the whole tree into a fresh buffer; the buffer then
//! diffs itself against the previous frame and only emits rows that
//! changed.

use bitvec::vec::BitVec;

use crate::{
    backend::RenderBackend,
    core::{error::Result, style::Style},
    geom::{Expanse, Point},
};

/// A single screen cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    /// The character in the cell.
    pub ch: char,
    /// The cell style.
    pub style: Style,
}

/// A rectangular grid of cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermBuf {
    /// Buffer extent.
    size: Expanse,
    /// Cells in row-major order.
    cells: Vec<Cell>,
}

impl TermBuf {
    /// Construct a buffer filled with a character and style.
    pub fn new(size: Expanse, fill: char, style: Style) -> Self {
        Self {
            size,
            cells: vec![
                Cell { ch: fill, style };
                (size.w as usize) * (size.h as usize)
            ],
        }
    }

    /// The buffer extent.
    pub fn size(&self) -> Expanse {
        self.size
    }

    /// The cell at a point, if in bounds.
    pub fn cell(&self, p: Point) -> Option<&Cell> {
        if p.x >= self.size.w || p.y >= self.size.h {
            return None;
        }
        self.cells
            .get((p.y as usize) * (self.size.w as usize) + p.x as usize)
    }

    /// Write a character at a point. Out-of-bounds writes are dropped.
    pub fn put(&mut self, p: Point, ch: char, style: Style) {
        if p.x >= self.size.w || p.y >= self.size.h {
            return;
        }
        let idx = (p.y as usize) * (self.size.w as usize) + p.x as usize;
        self.cells[idx] = Cell { ch, style };
    }

    /// The text of one row.
    pub fn row_text(&self, y: u32) -> String {
        (0..self.size.w)
            .filter_map(|x| self.cell(Point::new(x, y)).map(|c| c.ch))
            .collect()
    }

    /// The text of every row.
    pub fn rows(&self) -> Vec<String> {
        (0..self.size.h).map(|y| self.row_text(y)).collect()
    }

    /// Emit this buffer to a backend, skipping rows unchanged since
    /// `prev`. A missing or differently sized previous frame repaints
    /// everything.
    pub(crate) fn diff(&self, prev: Option<&Self>, be: &mut dyn RenderBackend) -> Result<()> {
        let h = self.size.h as usize;
        let w = self.size.w as usize;
        let mut dirty: BitVec = BitVec::repeat(true, h);
        if let Some(prev) = prev
            && prev.size == self.size
        {
            for y in 0..h {
                let row = &self.cells[y * w..(y + 1) * w];
                let prev_row = &prev.cells[y * w..(y + 1) * w];
                dirty.set(y, row != prev_row);
            }
        }
        for y in 0..h {
            if !dirty[y] {
                continue;
            }
            self.emit_row(y as u32, be)?;
        }
        Ok(())
    }

    /// Emit one row as style-grouped text runs.
    fn emit_row(&self, y: u32, be: &mut dyn RenderBackend) -> Result<()> {
        let mut run = String::new();
        let mut run_start = 0u32;
        let mut run_style: Option<Style> = None;
        for x in 0..self.size.w {
            let Some(cell) = self.cell(Point::new(x, y)) else {
                continue;
            };
            match run_style {
                Some(s) if s == cell.style => run.push(cell.ch),
                Some(s) => {
                    be.style(&s)?;
                    be.text(Point::new(run_start, y), &run)?;
                    run.clear();
                    run.push(cell.ch);
                    run_start = x;
                    run_style = Some(cell.style);
                }
                None => {
                    run.push(cell.ch);
                    run_start = x;
                    run_style = Some(cell.style);
                }
            }
        }
        if let Some(s) = run_style {
            be.style(&s)?;
            be.text(Point::new(run_start, y), &run)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::screen::CursorShape;

    /// A backend that records emitted rows.
    #[derive(Default)]
    struct Sink {
        texts: Vec<(Point, String)>,
    }

    impl RenderBackend for Sink {
        fn style(&mut self, _s: &Style) -> Result<()> {
            Ok(())
        }

        fn text(&mut self, loc: Point, txt: &str) -> Result<()> {
            self.texts.push((loc, txt.to_string()));
            Ok(())
        }

        fn set_cursor(&mut self, _cursor: Option<(Point, CursorShape)>) -> Result<()> {
            Ok(())
        }

        fn flush(&mut self) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn initial_diff_paints_everything() {
        let mut buf = TermBuf::new(Expanse::new(3, 2), ' ', Style::default());
        buf.put(Point::new(0, 0), 'a', Style::default());
        let mut sink = Sink::default();
        buf.diff(None, &mut sink).unwrap();
        assert_eq!(sink.texts.len(), 2);
        assert_eq!(sink.texts[0], (Point::new(0, 0), "a  ".into()));
    }

    #[test]
    fn diff_skips_unchanged_rows() {
        let prev = TermBuf::new(Expanse::new(3, 2), ' ', Style::default());
        let mut next = prev.clone();
        next.put(Point::new(1, 1), 'x', Style::default());
        let mut sink = Sink::default();
        next.diff(Some(&prev), &mut sink).unwrap();
        assert_eq!(sink.texts, vec![(Point::new(0, 1), " x ".into())]);
    }

    #[test]
    fn style_change_splits_runs() {
        let mut buf = TermBuf::new(Expanse::new(4, 1), ' ', Style::default());
        buf.put(Point::new(2, 0), 'h', Style::default().reversed());
        let mut sink = Sink::default();
        buf.diff(None, &mut sink).unwrap();
        assert_eq!(sink.texts.len(), 3);
        assert_eq!(sink.texts[1], (Point::new(2, 0), "h".into()));
    }
}
