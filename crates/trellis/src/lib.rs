//! Trellis: a terminal UI dispatch core.
//!
//! Trellis routes keyboard, mouse, and posted events through a tree of
//! user components with bubbling and cancellable propagation, translates
//! configurable key/rune/button bindings into named default behaviors
//! ("features"), and keeps line focus, cell cursors, scrolling, and the
//! single terminal cursor consistent across resizes and tree mutation.
//!
//! # Quick start
//!
//! The main entry points are:
//! - [`Trellis`] - the dispatcher owning all component state
//! - [`Component`] - the trait user components implement
//! - [`Events`] - the thread-safe posting handle into the event loop
//!
//! A component's internal state is only observable during its own
//! callbacks, through the [`Context`] handle; external code communicates
//! with components by posting update events.

#![warn(missing_docs)]

// Internal core module - re-export specific items below.
mod core;

// Public modules.
pub mod backend;
pub mod geom;
pub mod logging;
/// Testing utilities.
#[cfg(any(test, feature = "testing"))]
pub mod testing;

// Re-export core application types.
pub use core::{
    component::{Component, ComponentState, EventOutcome, InputListener},
    context::Context,
    id::ComponentId,
    trellis::{Config, Events, Sent, Trellis},
};
// Re-export the input and content vocabulary.
pub use core::{
    bindings::{FeatureBindings, FeatureSet},
    content::{Liner, SourceCaps},
    error::{Error, Result},
    event::{Event, Update, UpdateListener, key, mouse},
    feature::{self, Feature, FeatureGroup},
    line::{Line, LineFlags, StyleRange},
    linefocus::{CellFocus, EolPolicy, Highlight, LineFocus},
    name::Name,
    screen::{Axis, Cursor, CursorShape, LayerPos},
    scroll::Scroll,
    style::{AttrSet, Color, Style},
    termbuf::{Cell, TermBuf},
};
