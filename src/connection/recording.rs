//! In-memory transport that records calls instead of talking to a server.
//!
//! Backs the CLI's `--dry-run` mode and the test suite.

use super::PinTransport;
use crate::error::TransportError;
use crate::pins::PinValue;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub enum TransportCall {
    Connect,
    Write(u16, PinValue),
    Sync,
}

#[derive(Debug, Default)]
struct State {
    calls: Vec<TransportCall>,
    failure: Option<String>,
}

/// Cloning shares the underlying log, so a test can keep a handle after
/// moving a clone into a [`super::Connection`].
#[derive(Debug, Clone, Default)]
pub struct RecordingTransport {
    state: Arc<Mutex<State>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn calls(&self) -> Vec<TransportCall> {
        self.lock().calls.clone()
    }

    /// Only the pin writes, in order.
    pub fn writes(&self) -> Vec<(u16, PinValue)> {
        self.lock()
            .calls
            .iter()
            .filter_map(|c| match c {
                TransportCall::Write(pin, value) => Some((*pin, value.clone())),
                _ => None,
            })
            .collect()
    }

    pub fn sync_count(&self) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|c| matches!(c, TransportCall::Sync))
            .count()
    }

    pub fn clear(&self) {
        self.lock().calls.clear();
    }

    /// Make every following call fail with `message`.
    pub fn fail_with(&self, message: &str) {
        self.lock().failure = Some(message.to_string());
    }

    pub fn recover(&self) {
        self.lock().failure = None;
    }

    fn record(&self, call: TransportCall) -> Result<(), TransportError> {
        let mut state = self.lock();
        if let Some(msg) = &state.failure {
            return Err(TransportError::Injected(msg.clone()));
        }
        debug!(?call, "recorded transport call");
        state.calls.push(call);
        Ok(())
    }
}

#[async_trait::async_trait]
impl PinTransport for RecordingTransport {
    async fn connect(&self) -> Result<(), TransportError> {
        self.record(TransportCall::Connect)
    }

    async fn write_pin(&self, pin: u16, value: &PinValue) -> Result<(), TransportError> {
        self.record(TransportCall::Write(pin, value.clone()))
    }

    async fn sync(&self) -> Result<(), TransportError> {
        self.record(TransportCall::Sync)
    }
}
