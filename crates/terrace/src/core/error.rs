use std::{io, result::Result as StdResult, sync::mpsc};

use thiserror::Error;

/// Result type for terrace operations.
pub type Result<T> = StdResult<T, Error>;

/// Core error type.
#[derive(PartialEq, Eq, Error, Debug, Clone)]
pub enum Error {
    /// A message was dispatched before anyone subscribed to the event loop.
    #[error("event loop has no subscribers")]
    NoSubscribers,

    /// The event loop is being, or has been, torn down.
    #[error("event loop terminated")]
    Terminated,

    #[error("geometry: {0}")]
    /// Geometry failure, for instance a negative screen size.
    Geometry(String),

    #[error("invalid: {0}")]
    /// Invalid argument or configuration.
    Invalid(String),

    #[error("terminal: {0}")]
    /// Terminal provider failure.
    Terminal(String),

    #[error("runloop: {0}")]
    /// Run loop or worker failure.
    RunLoop(String),

    #[error("config: {0}")]
    /// Configuration could not be parsed.
    Config(String),
}

impl From<mpsc::RecvError> for Error {
    fn from(e: mpsc::RecvError) -> Self {
        Self::RunLoop(e.to_string())
    }
}

impl From<geom::Error> for Error {
    fn from(e: geom::Error) -> Self {
        Self::Geometry(e.to_string())
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Self::Terminal(e.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self::Config(e.to_string())
    }
}
