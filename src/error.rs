//! Error types for the connection handle and the run trackers.

use thiserror::Error;

/// Failures raised by a [`crate::connection::PinTransport`].
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("dashboard request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("dashboard rejected request with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("transport used before the connection handshake")]
    NotConnected,

    #[error("injected transport failure: {0}")]
    Injected(String),
}

/// Which counter an increment targeted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Counter {
    Succeeded,
    Failed,
    Blocked,
}

impl std::fmt::Display for Counter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Counter::Succeeded => write!(f, "succeeded"),
            Counter::Failed => write!(f, "failed"),
            Counter::Blocked => write!(f, "blocked"),
        }
    }
}

#[derive(Debug, Error)]
pub enum StatusError {
    #[error("run {run} has not been started (total is 0)")]
    NotStarted { run: usize },

    #[error("increment of {counter} by 0 is not allowed")]
    ZeroIncrement { counter: Counter },

    #[error("run index {run} is out of range ({slots} run slots)")]
    RunOutOfRange { run: usize, slots: usize },

    #[error("run {run} cannot start with a total of 0")]
    EmptyRun { run: usize },

    #[error(transparent)]
    Transport(#[from] TransportError),
}

pub type Result<T> = std::result::Result<T, StatusError>;
