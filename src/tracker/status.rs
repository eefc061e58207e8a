//! Single-run tracker bound to one fixed run index.

use std::sync::Arc;

use super::{CounterUpdate, RunRecord, RunSlot};
use crate::clock::{Clock, SystemClock};
use crate::connection::Connection;
use crate::error::{Counter, Result};

/// A single run bound to a fixed run index.
///
/// Several of these can share one [`Connection`]; each writes only to its own
/// pin range. Explicit zero increments are always rejected.
pub struct RunStatus {
    connection: Arc<Connection>,
    clock: Arc<dyn Clock>,
    slot: RunSlot,
}

impl RunStatus {
    /// Fails with [`crate::StatusError::RunOutOfRange`] when the run's pin
    /// range does not fit the pin space.
    pub fn new(connection: Arc<Connection>, run_index: usize) -> Result<Self> {
        Ok(Self {
            connection,
            clock: Arc::new(SystemClock),
            slot: RunSlot::new(run_index)?,
        })
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn record(&self) -> &RunRecord {
        self.slot.record()
    }

    pub async fn start(&mut self, total: u32, name: Option<&str>) -> Result<()> {
        self.slot
            .start(&self.connection, self.clock.as_ref(), total, name)
            .await
    }

    pub async fn update(&mut self, update: CounterUpdate) -> Result<()> {
        self.slot.update(&self.connection, update).await
    }

    pub async fn add_succeeded(&mut self) -> Result<()> {
        self.add_succeeded_by(1).await
    }

    pub async fn add_succeeded_by(&mut self, amount: u32) -> Result<()> {
        self.slot
            .add(&self.connection, Counter::Succeeded, amount, true)
            .await
    }

    pub async fn add_failed(&mut self) -> Result<()> {
        self.add_failed_by(1).await
    }

    pub async fn add_failed_by(&mut self, amount: u32) -> Result<()> {
        self.slot
            .add(&self.connection, Counter::Failed, amount, true)
            .await
    }

    pub async fn add_blocked(&mut self) -> Result<()> {
        self.add_blocked_by(1).await
    }

    pub async fn add_blocked_by(&mut self, amount: u32) -> Result<()> {
        self.slot
            .add(&self.connection, Counter::Blocked, amount, true)
            .await
    }

    pub async fn stop(&mut self) -> Result<()> {
        self.slot.stop(&self.connection).await
    }
}
