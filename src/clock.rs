//! Wall-clock source used to stamp run start times.

use chrono::{DateTime, Local, TimeZone};

/// Display format of a run's start time, e.g. `16-10-2026 (14:05)`.
pub const START_FORMAT: &str = "%d-%m-%Y (%H:%M)";

/// Placeholder shown before a run has been started.
pub const UNSET_START: &str = "--/--/---- (--:--)";

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Local>;

    /// Current local time in [`START_FORMAT`].
    fn stamp(&self) -> String {
        self.now().format(START_FORMAT).to_string()
    }
}

/// Local system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// Always returns the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(DateTime<Local>);

impl FixedClock {
    pub fn new(at: DateTime<Local>) -> Self {
        Self(at)
    }

    /// Build from local calendar fields. Returns `None` for an invalid or
    /// ambiguous local time.
    pub fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> Option<Self> {
        Local
            .with_ymd_and_hms(year, month, day, hour, minute, 0)
            .single()
            .map(Self)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Local> {
        self.0
    }
}
