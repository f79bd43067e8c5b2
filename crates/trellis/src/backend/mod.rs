//! Terminal backends.
//!
//! The dispatch core consumes two narrow traits: [`BackendControl`] to
//! acquire and release the terminal, and [`RenderBackend`] for the raw
//! paint primitives used during screen synchronization.

/// Crossterm backend implementation.
pub mod crossterm;

use crate::{
    core::{error::Result, screen::CursorShape, style::Style},
    geom::Point,
};

/// A handle for acquiring and releasing the terminal.
pub trait BackendControl {
    /// Take over the terminal: raw mode, alternate screen, mouse capture.
    fn start(&mut self) -> Result<()>;

    /// Release the terminal, restoring its previous state.
    fn stop(&mut self) -> Result<()>;
}

/// Raw paint primitives invoked during screen synchronization.
pub trait RenderBackend {
    /// Apply a style to subsequent text output.
    fn style(&mut self, s: &Style) -> Result<()>;

    /// Write text at a screen position.
    fn text(&mut self, loc: Point, txt: &str) -> Result<()>;

    /// Place or hide the terminal cursor.
    fn set_cursor(&mut self, cursor: Option<(Point, CursorShape)>) -> Result<()>;

    /// Flush pending output.
    fn flush(&mut self) -> Result<()>;
}
