//! Input and synthetic event types.

pub mod key;
pub mod mouse;

use std::{any::Any, fmt, sync::mpsc};

use crate::{
    core::{component::Component, context::Context, id::ComponentId},
    geom::Expanse,
};

/// A one-shot listener supplied at post time for an update event. When
/// present it takes precedence over the target component's own
/// update handler.
pub type UpdateListener =
    Box<dyn FnOnce(&mut dyn Component, &mut Context<'_>, &(dyn Any + Send)) + Send>;

/// A posted update carrying an opaque payload to a target component.
pub struct Update {
    /// The component the update is delivered to.
    pub target: ComponentId,
    /// Opaque payload handed to the listener.
    pub payload: Box<dyn Any + Send>,
    /// Optional listener overriding the component's update handler.
    pub listener: Option<UpdateListener>,
    /// Completion signal, fired after the update has been processed.
    pub(crate) done: Option<mpsc::SyncSender<()>>,
}

impl fmt::Debug for Update {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Update")
            .field("target", &self.target)
            .field("listener", &self.listener.is_some())
            .finish_non_exhaustive()
    }
}

/// The event types that drive the application.
///
/// An event is created at poll or post time, consumed by exactly one
/// dispatch pass, and never retained afterward.
#[derive(Debug)]
pub enum Event {
    /// A keystroke.
    Key(key::Key),
    /// A mouse action.
    Mouse(mouse::MouseEvent),
    /// Terminal resize.
    Resize(Expanse),
    /// A posted update targeting a specific component.
    Update(Update),
    /// A posted focus transfer.
    MoveFocus(ComponentId),
    /// Application shutdown; broadcast to the whole tree.
    Quit,
}
