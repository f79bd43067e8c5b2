use std::{result::Result as StdResult, sync::mpsc};

use thiserror::Error;

/// Result type for trellis operations.
pub type Result<T> = StdResult<T, Error>;

/// Core error type.
#[derive(PartialEq, Eq, Error, Debug, Clone)]
pub enum Error {
    /// The bounded event queue is full; the post was not accepted.
    #[error("event queue full")]
    QueueFull,

    /// The event loop has shut down and no longer accepts posts.
    #[error("event loop closed")]
    LoopClosed,

    /// Rendering failure.
    #[error("render: {0}")]
    Render(String),

    /// Run loop failure.
    #[error("runloop: {0}")]
    RunLoop(String),

    /// Invalid input error.
    #[error("invalid: {0}")]
    Invalid(String),

    /// Internal error.
    #[error("internal: {0}")]
    Internal(String),
}

impl From<mpsc::RecvError> for Error {
    fn from(e: mpsc::RecvError) -> Self {
        Self::RunLoop(e.to_string())
    }
}
