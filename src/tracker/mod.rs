//! Run bookkeeping and the pin pushes that mirror it on the dashboard.
//!
//! Run `i` owns pins `i * 10 ..`: name, start time, progress, percent,
//! outcome summary and the running LED.

pub mod record;
pub mod status;

pub use record::{CounterUpdate, RunRecord};
pub use status::RunStatus;

use std::sync::Arc;

use tracing::info;

use crate::clock::{Clock, SystemClock};
use crate::config::TrackerConfig;
use crate::connection::Connection;
use crate::error::{Counter, Result, StatusError};
use crate::pins::{layout, run_offset, PinPayload, LED_OFF, MAX_RUNS};

/// Default number of runs a [`RunTracker`] follows.
pub const DEFAULT_RUN_SLOTS: usize = 4;

/// One run index plus its record. Shared by [`RunTracker`] and [`RunStatus`].
///
/// `offset` is resolved once at construction, so every pin of the run's range
/// is known to fit.
#[derive(Debug, Clone)]
pub(crate) struct RunSlot {
    index: usize,
    offset: u16,
    record: RunRecord,
}

impl RunSlot {
    pub(crate) fn new(index: usize) -> Result<Self> {
        let offset = run_offset(index).ok_or(StatusError::RunOutOfRange {
            run: index,
            slots: MAX_RUNS,
        })?;
        Ok(Self {
            index,
            offset,
            record: RunRecord::default(),
        })
    }

    pub(crate) fn record(&self) -> &RunRecord {
        &self.record
    }

    pub(crate) async fn start(
        &mut self,
        conn: &Connection,
        clock: &dyn Clock,
        total: u32,
        name: Option<&str>,
    ) -> Result<()> {
        if total == 0 {
            return Err(StatusError::EmptyRun { run: self.index });
        }
        self.record = RunRecord::started(total, name, clock.stamp());
        info!(
            run = self.index,
            name = %self.record.name(),
            total,
            started_at = %self.record.started_at(),
            "run started"
        );
        conn.push(&self.record.full_snapshot(self.offset)).await?;
        Ok(())
    }

    pub(crate) async fn update(&mut self, conn: &Connection, update: CounterUpdate) -> Result<()> {
        self.ensure_started()?;
        self.record.apply(update);
        self.push_progress(conn).await
    }

    pub(crate) async fn add(
        &mut self,
        conn: &Connection,
        counter: Counter,
        amount: u32,
        reject_zero: bool,
    ) -> Result<()> {
        self.ensure_started()?;
        if amount == 0 && reject_zero {
            return Err(StatusError::ZeroIncrement { counter });
        }
        self.record.add(counter, amount);
        self.push_progress(conn).await
    }

    pub(crate) async fn stop(&mut self, conn: &Connection) -> Result<()> {
        let mut payload = PinPayload::new();
        payload.set(self.offset + layout::LED, LED_OFF);
        info!(run = self.index, "run stopped");
        conn.push(&payload).await?;
        Ok(())
    }

    fn ensure_started(&self) -> Result<()> {
        if self.record.is_started() {
            Ok(())
        } else {
            Err(StatusError::NotStarted { run: self.index })
        }
    }

    async fn push_progress(&self, conn: &Connection) -> Result<()> {
        let r = &self.record;
        info!(
            run = self.index,
            started_at = %r.started_at(),
            completed = r.completed(),
            total = r.total(),
            succeeded = r.succeeded(),
            failed = r.failed(),
            blocked = r.blocked(),
            "status sent"
        );
        conn.push(&r.progress_snapshot(self.offset)).await?;
        Ok(())
    }
}

/// Tracks several runs side by side over one shared connection.
pub struct RunTracker {
    connection: Arc<Connection>,
    clock: Arc<dyn Clock>,
    slots: Vec<RunSlot>,
    reject_zero_increment: bool,
}

impl RunTracker {
    /// Fails with [`StatusError::RunOutOfRange`] when `run_slots` exceeds
    /// [`MAX_RUNS`].
    pub fn new(connection: Arc<Connection>, run_slots: usize) -> Result<Self> {
        let slots = (0..run_slots)
            .map(RunSlot::new)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            connection,
            clock: Arc::new(SystemClock),
            slots,
            reject_zero_increment: true,
        })
    }

    pub fn from_config(connection: Arc<Connection>, config: &TrackerConfig) -> Result<Self> {
        Ok(Self::new(connection, config.run_slots)?
            .reject_zero_increment(config.reject_zero_increment))
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// When disabled, `add_*_by(run, 0)` pushes an unchanged snapshot.
    pub fn reject_zero_increment(mut self, reject: bool) -> Self {
        self.reject_zero_increment = reject;
        self
    }

    pub fn run_slots(&self) -> usize {
        self.slots.len()
    }

    pub fn record(&self, run: usize) -> Result<&RunRecord> {
        self.slot(run).map(RunSlot::record)
    }

    pub fn records(&self) -> impl Iterator<Item = &RunRecord> {
        self.slots.iter().map(RunSlot::record)
    }

    fn slot(&self, run: usize) -> Result<&RunSlot> {
        self.slots.get(run).ok_or(StatusError::RunOutOfRange {
            run,
            slots: self.slots.len(),
        })
    }

    fn slot_mut(&mut self, run: usize) -> Result<&mut RunSlot> {
        let slots = self.slots.len();
        self.slots
            .get_mut(run)
            .ok_or(StatusError::RunOutOfRange { run, slots })
    }

    /// Reset run `run`, stamp its start time and push its full pin snapshot.
    pub async fn start(&mut self, run: usize, total: u32, name: Option<&str>) -> Result<()> {
        let conn = Arc::clone(&self.connection);
        let clock = Arc::clone(&self.clock);
        self.slot_mut(run)?
            .start(&conn, clock.as_ref(), total, name)
            .await
    }

    /// Overwrite the given counters and push progress pins.
    pub async fn update(&mut self, run: usize, update: CounterUpdate) -> Result<()> {
        let conn = Arc::clone(&self.connection);
        self.slot_mut(run)?.update(&conn, update).await
    }

    pub async fn add_succeeded(&mut self, run: usize) -> Result<()> {
        self.add(run, Counter::Succeeded, 1).await
    }

    pub async fn add_succeeded_by(&mut self, run: usize, amount: u32) -> Result<()> {
        self.add(run, Counter::Succeeded, amount).await
    }

    pub async fn add_failed(&mut self, run: usize) -> Result<()> {
        self.add(run, Counter::Failed, 1).await
    }

    pub async fn add_failed_by(&mut self, run: usize, amount: u32) -> Result<()> {
        self.add(run, Counter::Failed, amount).await
    }

    pub async fn add_blocked(&mut self, run: usize) -> Result<()> {
        self.add(run, Counter::Blocked, 1).await
    }

    pub async fn add_blocked_by(&mut self, run: usize, amount: u32) -> Result<()> {
        self.add(run, Counter::Blocked, amount).await
    }

    async fn add(&mut self, run: usize, counter: Counter, amount: u32) -> Result<()> {
        let conn = Arc::clone(&self.connection);
        let reject_zero = self.reject_zero_increment;
        self.slot_mut(run)?
            .add(&conn, counter, amount, reject_zero)
            .await
    }

    /// Turn off the run's LED. Counters are kept and stay mutable.
    pub async fn stop(&mut self, run: usize) -> Result<()> {
        let conn = Arc::clone(&self.connection);
        self.slot_mut(run)?.stop(&conn).await
    }
}
