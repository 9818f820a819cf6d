//! Date expressions accepted on the command line.
//!
//! Grammar:
//! - `now`          the current instant
//! - `_N<u>`        midnight (market time) N units before today
//! - `+N<u>`        midnight (market time) N units after today
//! - `YYYY-MM-DD`   midnight (market time) on that date
//!
//! where `<u>` is `d` (days), `m` (30-day months) or `y` (365-day years).
//! "Today" and midnights are taken in [`crate::tz::MARKET_TZ`], so `_1d`
//! asked at 01:00 UTC still means yesterday's US trading date.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use thiserror::Error;

use crate::tz::{self, MARKET_TZ};

/// A date expression that could not be interpreted.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DateExprError {
    /// The expression matched none of the accepted forms.
    #[error("unrecognized date expression: {0:?} (expected now, _N[dmy], +N[dmy] or YYYY-MM-DD)")]
    Unrecognized(String),
    /// The expression parsed but does not map to a unique UTC instant.
    #[error("date expression {0:?} does not resolve to a unique instant")]
    Unresolvable(String),
}

/// Resolve a date expression relative to `now`.
pub fn parse_date_expr(expr: &str, now: DateTime<Utc>) -> Result<DateTime<Utc>, DateExprError> {
    let expr = expr.trim();
    if expr == "now" {
        return Ok(now);
    }

    let today = now.with_timezone(&MARKET_TZ).date_naive();

    let date = if let Some(days) = expr.strip_prefix('_').and_then(parse_offset_days) {
        today - Duration::days(days)
    } else if let Some(days) = expr.strip_prefix('+').and_then(parse_offset_days) {
        today + Duration::days(days)
    } else if let Ok(d) = NaiveDate::parse_from_str(expr, "%Y-%m-%d") {
        d
    } else {
        return Err(DateExprError::Unrecognized(expr.to_string()));
    };

    let naive = date
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| DateExprError::Unresolvable(expr.to_string()))?;
    tz::from_market_naive(naive).map_err(|_| DateExprError::Unresolvable(expr.to_string()))
}

fn parse_offset_days(s: &str) -> Option<i64> {
    let per_unit = match s.chars().last()? {
        'd' => 1,
        'm' => 30,
        'y' => 365,
        _ => return None,
    };
    let n = s[..s.len() - 1].parse::<i64>().ok().filter(|n| *n >= 0)?;
    Some(n * per_unit)
}
