//! app-status -- relay test-run progress to a Blynk mobile dashboard.
//!
//! A [`connection::Connection`] owns the authenticated session and pushes
//! ordered pin writes. [`tracker::RunTracker`] (several runs) and
//! [`tracker::RunStatus`] (one run) keep the counters and mirror them onto
//! each run's block of ten virtual pins.

pub mod clock;
pub mod config;
pub mod connection;
pub mod error;
pub mod pins;
pub mod simulate;
pub mod tracker;

pub use connection::{Connection, PinTransport};
pub use error::{StatusError, TransportError};
pub use pins::{PinPayload, PinValue};
pub use tracker::{CounterUpdate, RunRecord, RunStatus, RunTracker};
