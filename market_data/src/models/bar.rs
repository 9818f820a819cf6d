//! Canonical in-memory representation of a time-series bar (OHLCV).
//!
//! This struct is the standard output of every [`BarProvider`](crate::providers::BarProvider)
//! implementation and the unit the local cache stores and returns.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single OHLCV bar for one ticker over one interval period.
///
/// `timestamp` marks the start of the bar; the bar covers the half-open span
/// `[timestamp, timestamp + interval)`. The ticker and interval live on the
/// request/storage key, not on the bar itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    /// Start-of-bar instant (UTC), aligned to the interval grid.
    pub timestamp: DateTime<Utc>,

    /// Opening price.
    pub open: f64,

    /// Highest price during the bar period.
    pub high: f64,

    /// Lowest price during the bar period.
    pub low: f64,

    /// Closing price. Providers may revise this after the fact (dividend and
    /// split adjustments), so a later fetch for the same key supersedes it.
    pub close: f64,

    /// Adjusted closing price. Not all intervals/providers supply this.
    pub adj_close: Option<f64>,

    /// Shares traded during the bar period.
    pub volume: i64,
}
