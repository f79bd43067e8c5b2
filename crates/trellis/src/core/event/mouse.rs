//! Mouse input primitives.

use std::ops::Add;

use crate::{core::event::key, geom::Point};

/// Mouse button codes. Scroll wheel ticks are modeled as button presses so
/// wheel bindings live in the ordinary button tables.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum Button {
    /// Left mouse button.
    Left,
    /// Right mouse button.
    Right,
    /// Middle mouse button.
    Middle,
    /// Scroll wheel up tick.
    WheelUp,
    /// Scroll wheel down tick.
    WheelDown,
    /// No button (plain movement).
    None,
}

/// Mouse action kinds.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum Action {
    /// Button press.
    Down,
    /// Button release.
    Up,
    /// Movement with a button held.
    Drag,
    /// Button release that ends a drag.
    Drop,
    /// Movement without a button.
    Move,
}

/// A mouse input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MouseEvent {
    /// Action kind.
    pub action: Action,
    /// Button involved, if any.
    pub button: Button,
    /// Keyboard modifiers held.
    pub modifiers: key::Mods,
    /// Cursor location in screen space.
    pub location: Point,
}

impl MouseEvent {
    /// True for actions that should consult the button binding tables.
    pub fn is_press(&self) -> bool {
        self.action == Action::Down && self.button != Button::None
    }
}

/// Synthesize a modified button, for binding table construction.
impl Add<Button> for key::Mods {
    type Output = (Button, key::Mods);

    fn add(self, b: Button) -> (Button, key::Mods) {
        (b, self)
    }
}
