//! Virtual pin values and the ordered payloads pushed to the dashboard.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of pins reserved per run: run `i` owns pins `i * 10 .. i * 10 + 10`.
pub const PINS_PER_RUN: u16 = 10;

/// Largest number of runs whose pin ranges fit in the `u16` pin space.
pub const MAX_RUNS: usize = (u16::MAX / PINS_PER_RUN) as usize;

/// First pin of run `run`, or `None` when the run's whole range does not fit.
pub fn run_offset(run: usize) -> Option<u16> {
    let base = u16::try_from(run).ok()?.checked_mul(PINS_PER_RUN)?;
    base.checked_add(PINS_PER_RUN - 1)?;
    Some(base)
}

/// Pin offsets inside a run's range.
pub mod layout {
    pub const NAME: u16 = 0;
    pub const STARTED_AT: u16 = 1;
    pub const PROGRESS: u16 = 2;
    pub const PERCENT: u16 = 3;
    pub const SUMMARY: u16 = 4;
    pub const LED: u16 = 5;
}

/// LED brightness while a run is in progress.
pub const LED_ON: i64 = 255;
/// LED brightness once a run is stopped.
pub const LED_OFF: i64 = 0;

/// A value written to a virtual pin: either text or a number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PinValue {
    Text(String),
    Integer(i64),
    Float(f64),
}

impl fmt::Display for PinValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PinValue::Text(s) => write!(f, "{}", s),
            PinValue::Integer(i) => write!(f, "{}", i),
            PinValue::Float(v) => write!(f, "{}", v),
        }
    }
}

impl From<&str> for PinValue {
    fn from(s: &str) -> Self {
        PinValue::Text(s.to_string())
    }
}

impl From<String> for PinValue {
    fn from(s: String) -> Self {
        PinValue::Text(s)
    }
}

impl From<i64> for PinValue {
    fn from(i: i64) -> Self {
        PinValue::Integer(i)
    }
}

impl From<f64> for PinValue {
    fn from(v: f64) -> Self {
        PinValue::Float(v)
    }
}

impl PinValue {
    /// Parse a raw CLI value: integers first, then floats, else text.
    pub fn parse_loose(raw: &str) -> Self {
        if let Ok(i) = raw.parse::<i64>() {
            return PinValue::Integer(i);
        }
        if let Ok(v) = raw.parse::<f64>() {
            if v.is_finite() {
                return PinValue::Float(v);
            }
        }
        PinValue::Text(raw.to_string())
    }
}

/// Pin writes in the order they must reach the dashboard.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PinPayload {
    entries: Vec<(u16, PinValue)>,
}

impl PinPayload {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a write. A pin set twice keeps its first position and the last value.
    pub fn set(&mut self, pin: u16, value: impl Into<PinValue>) -> &mut Self {
        let value = value.into();
        match self.entries.iter_mut().find(|(p, _)| *p == pin) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((pin, value)),
        }
        self
    }

    pub fn get(&self, pin: u16) -> Option<&PinValue> {
        self.entries.iter().find(|(p, _)| *p == pin).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = &(u16, PinValue)> {
        self.entries.iter()
    }

    pub fn pins(&self) -> Vec<u16> {
        self.entries.iter().map(|(p, _)| *p).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(u16, PinValue)> for PinPayload {
    fn from_iter<I: IntoIterator<Item = (u16, PinValue)>>(iter: I) -> Self {
        let mut payload = PinPayload::new();
        for (pin, value) in iter {
            payload.set(pin, value);
        }
        payload
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_keeps_insertion_order() {
        let mut payload = PinPayload::new();
        payload.set(5, LED_ON).set(2, "1/10").set(3, 10.0);
        assert_eq!(payload.pins(), vec![5, 2, 3]);
    }

    #[test]
    fn test_payload_overwrite_keeps_position() {
        let mut payload = PinPayload::new();
        payload.set(1, "a").set(2, "b").set(1, "c");
        assert_eq!(payload.pins(), vec![1, 2]);
        assert_eq!(payload.get(1), Some(&PinValue::Text("c".into())));
    }

    #[test]
    fn test_display_matches_wire_format() {
        assert_eq!(PinValue::Float(90.0).to_string(), "90");
        assert_eq!(PinValue::Float(12.5).to_string(), "12.5");
        assert_eq!(PinValue::Integer(255).to_string(), "255");
        assert_eq!(PinValue::from("S1 F0 B0").to_string(), "S1 F0 B0");
    }

    #[test]
    fn test_run_offset_bounds() {
        assert_eq!(run_offset(0), Some(0));
        assert_eq!(run_offset(2), Some(20));
        assert_eq!(run_offset(MAX_RUNS - 1), Some(65520));
        assert_eq!(run_offset(MAX_RUNS), None);
        assert_eq!(run_offset(7000), None);
        assert_eq!(run_offset(65536), None);
    }

    #[test]
    fn test_parse_loose() {
        assert_eq!(PinValue::parse_loose("255"), PinValue::Integer(255));
        assert_eq!(PinValue::parse_loose("33.5"), PinValue::Float(33.5));
        assert_eq!(PinValue::parse_loose("Run 1"), PinValue::Text("Run 1".into()));
        assert_eq!(PinValue::parse_loose("NaN"), PinValue::Text("NaN".into()));
    }
}
