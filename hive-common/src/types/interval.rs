//! Half-open time ranges used by the availability engine.
//!
//! All three types share the `[start, end)` convention: `start` belongs to
//! the range, `end` does not.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{HiveError, Result};

/// Bounding window of an availability request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self> {
        if start >= end {
            return Err(HiveError::InvalidInput(format!(
                "window start {} must be before end {}",
                start, end
            )));
        }
        Ok(Self { start, end })
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }
}

/// A range during which a member is unavailable, as reported by a calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusyInterval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl BusyInterval {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Clips the interval to `window`, or `None` when nothing of it is left.
    pub fn clip_to(&self, window: &TimeWindow) -> Option<BusyInterval> {
        let start = self.start.max(window.start);
        let end = self.end.min(window.end);
        (start < end).then_some(BusyInterval { start, end })
    }
}

/// A range with no recorded busy interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FreeSlot {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl FreeSlot {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    pub fn overlaps(&self, other: &FreeSlot) -> bool {
        self.start < other.end && other.start < self.end
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }

    /// Common part of two slots, `None` when they do not overlap.
    pub fn intersect(&self, other: &FreeSlot) -> Option<FreeSlot> {
        if !self.overlaps(other) {
            return None;
        }
        Some(FreeSlot {
            start: self.start.max(other.start),
            end: self.end.min(other.end),
        })
    }
}

impl From<TimeWindow> for FreeSlot {
    fn from(window: TimeWindow) -> Self {
        FreeSlot::new(window.start, window.end)
    }
}
