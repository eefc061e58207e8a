//! Per-run counters and the pin snapshots derived from them.

use serde::Serialize;

use crate::clock::UNSET_START;
use crate::error::Counter;
use crate::pins::{layout, PinPayload, LED_ON};

pub const DEFAULT_RUN_NAME: &str = "no name";

/// Counters and labels of one tracked run.
///
/// `completed` is derived: every mutation goes through methods that keep it
/// equal to `succeeded + failed + blocked`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunRecord {
    name: String,
    started_at: String,
    total: u32,
    succeeded: u32,
    failed: u32,
    blocked: u32,
    completed: u32,
}

impl Default for RunRecord {
    fn default() -> Self {
        Self {
            name: DEFAULT_RUN_NAME.to_string(),
            started_at: UNSET_START.to_string(),
            total: 0,
            succeeded: 0,
            failed: 0,
            blocked: 0,
            completed: 0,
        }
    }
}

/// Counter values to overwrite; `None` leaves the counter unchanged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CounterUpdate {
    pub succeeded: Option<u32>,
    pub failed: Option<u32>,
    pub blocked: Option<u32>,
}

impl CounterUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn succeeded(mut self, n: u32) -> Self {
        self.succeeded = Some(n);
        self
    }

    pub fn failed(mut self, n: u32) -> Self {
        self.failed = Some(n);
        self
    }

    pub fn blocked(mut self, n: u32) -> Self {
        self.blocked = Some(n);
        self
    }
}

impl RunRecord {
    /// A fresh record for a run that is being started.
    pub fn started(total: u32, name: Option<&str>, started_at: String) -> Self {
        let mut record = Self::default();
        if let Some(name) = name {
            record.name = name.to_string();
        }
        record.total = total;
        record.started_at = started_at;
        record
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn started_at(&self) -> &str {
        &self.started_at
    }

    pub fn total(&self) -> u32 {
        self.total
    }

    pub fn succeeded(&self) -> u32 {
        self.succeeded
    }

    pub fn failed(&self) -> u32 {
        self.failed
    }

    pub fn blocked(&self) -> u32 {
        self.blocked
    }

    pub fn completed(&self) -> u32 {
        self.completed
    }

    pub fn is_started(&self) -> bool {
        self.total > 0
    }

    /// `"{completed}/{total}"`
    pub fn progress_label(&self) -> String {
        format!("{}/{}", self.completed, self.total)
    }

    /// Completion percentage. Not clamped: overshooting `total` reads above 100.
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        // Multiply first so whole percentages stay exact (3/10 -> 30.0).
        f64::from(self.completed) * 100.0 / f64::from(self.total)
    }

    /// `"S{succeeded} F{failed} B{blocked}"`
    pub fn summary(&self) -> String {
        format!("S{} F{} B{}", self.succeeded, self.failed, self.blocked)
    }

    pub(crate) fn apply(&mut self, update: CounterUpdate) {
        if let Some(n) = update.succeeded {
            self.succeeded = n;
        }
        if let Some(n) = update.failed {
            self.failed = n;
        }
        if let Some(n) = update.blocked {
            self.blocked = n;
        }
        self.recompute();
    }

    pub(crate) fn add(&mut self, counter: Counter, amount: u32) {
        let slot = match counter {
            Counter::Succeeded => &mut self.succeeded,
            Counter::Failed => &mut self.failed,
            Counter::Blocked => &mut self.blocked,
        };
        *slot = slot.saturating_add(amount);
        self.recompute();
    }

    fn recompute(&mut self) {
        self.completed = self
            .succeeded
            .saturating_add(self.failed)
            .saturating_add(self.blocked);
    }

    /// Pins 0-5: name, start time, progress, percent, summary, LED on.
    pub(crate) fn full_snapshot(&self, offset: u16) -> PinPayload {
        let mut payload = PinPayload::new();
        payload
            .set(offset + layout::NAME, self.name.as_str())
            .set(offset + layout::STARTED_AT, self.started_at.as_str());
        self.append_progress(&mut payload, offset);
        payload
    }

    /// Pins 2-5 only; name and start time are not re-sent.
    pub(crate) fn progress_snapshot(&self, offset: u16) -> PinPayload {
        let mut payload = PinPayload::new();
        self.append_progress(&mut payload, offset);
        payload
    }

    fn append_progress(&self, payload: &mut PinPayload, offset: u16) {
        payload
            .set(offset + layout::PROGRESS, self.progress_label())
            .set(offset + layout::PERCENT, self.percent())
            .set(offset + layout::SUMMARY, self.summary())
            .set(offset + layout::LED, LED_ON);
    }
}
