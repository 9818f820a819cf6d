//! Half-open UTC time ranges.

use chrono::{DateTime, Utc};

/// A half-open UTC range `[start, end)`.
///
/// Every range in this crate follows the same convention: `start` is
/// included, `end` is not. A range with `end <= start` is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    /// Inclusive start instant.
    pub start: DateTime<Utc>,
    /// Exclusive end instant.
    pub end: DateTime<Utc>,
}

impl TimeRange {
    /// Build a range from its endpoints.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// True when the range contains no instants.
    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// True when `ts` falls inside the range.
    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        ts >= self.start && ts < self.end
    }
}

impl std::fmt::Display for TimeRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}
