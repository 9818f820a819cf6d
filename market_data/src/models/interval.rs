//! The closed set of supported bar intervals.
//!
//! An [`Interval`] is a fixed-width sampling granularity. Every interval
//! defines a natural timestamp grid anchored at the Unix epoch: bucket `n`
//! covers `[epoch + n*step, epoch + (n+1)*step)`, and a valid bar timestamp
//! always sits on a bucket start. Each interval also carries the maximum
//! historical lookback the upstream provider allows for it, enforced at
//! fetch-planning time.
//!
//! The set is a closed enumeration rather than an (amount, unit) pair because
//! the provider only serves these exact granularities; parsing any other
//! string is rejected up front with [`ParseIntervalError`].

use std::{fmt, str::FromStr};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// An interval string the tool does not support.
///
/// Raised before any fetch or store access; the set of valid codes is fixed.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unsupported interval: {0} (expected one of 1m, 2m, 5m, 15m, 30m, 1h, 1d)")]
pub struct ParseIntervalError(pub String);

/// Sampling granularity of a bar series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Interval {
    /// One minute.
    #[serde(rename = "1m")]
    Min1,
    /// Two minutes.
    #[serde(rename = "2m")]
    Min2,
    /// Five minutes.
    #[serde(rename = "5m")]
    Min5,
    /// Fifteen minutes.
    #[serde(rename = "15m")]
    Min15,
    /// Thirty minutes.
    #[serde(rename = "30m")]
    Min30,
    /// One hour.
    #[serde(rename = "1h")]
    Hour1,
    /// One market day. Daily bars are stamped at 00:00:00 UTC of the trading
    /// date.
    #[serde(rename = "1d")]
    Day1,
}

const SECS_PER_MINUTE: i64 = 60;
const SECS_PER_HOUR: i64 = 60 * SECS_PER_MINUTE;
const SECS_PER_DAY: i64 = 24 * SECS_PER_HOUR;

impl Interval {
    /// Every supported interval, smallest step first.
    pub const ALL: [Interval; 7] = [
        Interval::Min1,
        Interval::Min2,
        Interval::Min5,
        Interval::Min15,
        Interval::Min30,
        Interval::Hour1,
        Interval::Day1,
    ];

    /// Width of one bucket in seconds.
    pub const fn step_secs(self) -> i64 {
        match self {
            Interval::Min1 => SECS_PER_MINUTE,
            Interval::Min2 => 2 * SECS_PER_MINUTE,
            Interval::Min5 => 5 * SECS_PER_MINUTE,
            Interval::Min15 => 15 * SECS_PER_MINUTE,
            Interval::Min30 => 30 * SECS_PER_MINUTE,
            Interval::Hour1 => SECS_PER_HOUR,
            Interval::Day1 => SECS_PER_DAY,
        }
    }

    /// Width of one bucket as a [`chrono::Duration`].
    pub fn step(self) -> Duration {
        Duration::seconds(self.step_secs())
    }

    /// Maximum historical depth the provider serves for this interval, or
    /// `None` when history is unbounded.
    ///
    /// These are the Yahoo chart-API limits: requests reaching further back
    /// return nothing or an error, so callers clamp before fetching.
    pub fn max_lookback(self) -> Option<Duration> {
        match self {
            Interval::Min1 => Some(Duration::days(7)),
            Interval::Min2 | Interval::Min5 | Interval::Min15 | Interval::Min30 => {
                Some(Duration::days(60))
            }
            Interval::Hour1 => Some(Duration::days(730)),
            Interval::Day1 => None,
        }
    }

    /// Canonical short code, also used as the storage key.
    pub const fn as_str(self) -> &'static str {
        match self {
            Interval::Min1 => "1m",
            Interval::Min2 => "2m",
            Interval::Min5 => "5m",
            Interval::Min15 => "15m",
            Interval::Min30 => "30m",
            Interval::Hour1 => "1h",
            Interval::Day1 => "1d",
        }
    }

    /// Interval code understood by the Yahoo chart API.
    pub const fn provider_code(self) -> &'static str {
        match self {
            Interval::Hour1 => "60m",
            other => other.as_str(),
        }
    }

    /// Bucket id of the grid bucket containing `ts`.
    pub fn bucket_id(self, ts: DateTime<Utc>) -> i64 {
        ts.timestamp().div_euclid(self.step_secs())
    }

    /// UTC start instant of bucket `id`.
    pub fn bucket_start(self, id: i64) -> DateTime<Utc> {
        DateTime::<Utc>::UNIX_EPOCH + Duration::seconds(id * self.step_secs())
    }

    /// Whether `ts` sits exactly on this interval's grid.
    pub fn is_aligned(self, ts: DateTime<Utc>) -> bool {
        ts.timestamp().rem_euclid(self.step_secs()) == 0 && ts.timestamp_subsec_nanos() == 0
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Interval {
    type Err = ParseIntervalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "1m" => Ok(Interval::Min1),
            "2m" => Ok(Interval::Min2),
            "5m" => Ok(Interval::Min5),
            "15m" => Ok(Interval::Min15),
            "30m" => Ok(Interval::Min30),
            // "60m" is the spelling the original provider uses for hourly.
            "1h" | "60m" => Ok(Interval::Hour1),
            "1d" => Ok(Interval::Day1),
            other => Err(ParseIntervalError(other.to_string())),
        }
    }
}
