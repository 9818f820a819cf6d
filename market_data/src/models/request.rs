//! Universal parameters for requesting bar data from a provider.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::interval::Interval;

/// One fetch request: a single ticker, one interval, one half-open time range.
///
/// Providers return bars whose timestamps fall in `[start, end)`. The range is
/// expected to be pre-clamped to the interval's lookback window by the caller;
/// providers do not re-validate it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarsRequest {
    /// Ticker symbol (e.g. `"AAPL"`), already case-normalized.
    pub ticker: String,

    /// Sampling granularity of the requested bars.
    pub interval: Interval,

    /// Start of the requested range (inclusive, UTC).
    pub start: DateTime<Utc>,

    /// End of the requested range (exclusive, UTC).
    pub end: DateTime<Utc>,
}
