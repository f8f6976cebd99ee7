//! Crate error type.
//!
//! Acquisition failures and frames without a tracked body are not errors;
//! they reach the controller as ordinary frame events.

use std::path::PathBuf;

/// Result alias used across the library.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the controller and its external collaborators.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The frame source could not be opened. Fatal to initialization.
    #[error("sensor unavailable: {0}")]
    SensorUnavailable(String),

    /// A pointer injection call was rejected by the platform.
    #[error("pointer sink failure: {0}")]
    Pointer(String),

    /// A recorded frame file contained a line that could not be parsed.
    #[error("{}:{line}: {reason}", path.display())]
    Replay {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    /// The event loop could not be created or a source could not be registered.
    #[error("event loop: {0}")]
    EventLoop(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
