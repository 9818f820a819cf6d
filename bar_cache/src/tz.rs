//! Time zone conversion helpers.
//!
//! All database writes are RFC-3339 UTC strings and all grid math uses UTC.
//! Market-local wall times are only accepted at the CLI edge, where a date
//! like `2024-03-08` means midnight in [`MARKET_TZ`]. Conversion is strict:
//! a wall time that does not resolve to a unique instant (DST gap or
//! fall-back ambiguity) is an error rather than a silent guess. Midnight
//! never falls on a US transition, so date expressions are unaffected in
//! practice.

use anyhow::Context;
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;

/// Exchange-local time zone used to interpret calendar dates.
pub const MARKET_TZ: Tz = chrono_tz::US::Eastern;

/// RFC-3339 with offset -> UTC.
pub fn parse_ts_to_utc(s: &str) -> anyhow::Result<DateTime<Utc>> {
    let dt = DateTime::parse_from_rfc3339(s).with_context(|| format!("bad rfc3339: {s}"))?;
    Ok(dt.with_timezone(&Utc))
}

/// Convert a naive market-local wall time to UTC.
///
/// Errors on ambiguous (fall-back) and nonexistent (spring-forward) wall
/// times instead of picking one of the candidates.
pub fn from_market_naive(naive: NaiveDateTime) -> anyhow::Result<DateTime<Utc>> {
    use chrono::offset::LocalResult::*;
    match MARKET_TZ.from_local_datetime(&naive) {
        Single(dt) => Ok(dt.with_timezone(&Utc)),
        Ambiguous(_, _) => Err(anyhow::anyhow!("ambiguous local time: {naive}")),
        None => Err(anyhow::anyhow!("nonexistent local time: {naive}")),
    }
}

/// Format a UTC datetime as an RFC-3339 string with millisecond precision.
///
/// The fixed width keeps lexicographic and chronological order in agreement,
/// which the store's range queries rely on.
pub fn to_rfc3339_millis(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};

    #[test]
    fn parse_rfc3339_offset_to_utc() {
        let got = parse_ts_to_utc("2024-03-10T09:30:00-05:00").expect("parse");
        let want = Utc.with_ymd_and_hms(2024, 3, 10, 14, 30, 0).unwrap();
        assert_eq!(got, want);
    }

    #[test]
    fn millis_format_round_trips() {
        let dt = Utc.with_ymd_and_hms(2024, 1, 2, 14, 30, 0).unwrap();
        let s = to_rfc3339_millis(dt);
        assert_eq!(s, "2024-01-02T14:30:00.000Z");
        assert_eq!(parse_ts_to_utc(&s).unwrap(), dt);
    }

    #[test]
    fn winter_midnight_is_est() {
        let naive = NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let got = from_market_naive(naive).expect("convert");
        assert_eq!(got, Utc.with_ymd_and_hms(2024, 1, 15, 5, 0, 0).unwrap());
    }

    #[test]
    fn spring_forward_gap_is_error() {
        // Eastern jumps from 02:00 to 03:00 on 2024-03-10; 02:30 never occurs.
        let naive = NaiveDate::from_ymd_opt(2024, 3, 10)
            .unwrap()
            .and_hms_opt(2, 30, 0)
            .unwrap();
        assert!(from_market_naive(naive).is_err());
    }

    #[test]
    fn fall_back_ambiguity_is_error() {
        // Eastern repeats 01:xx on 2024-11-03.
        let naive = NaiveDate::from_ymd_opt(2024, 11, 3)
            .unwrap()
            .and_hms_opt(1, 30, 0)
            .unwrap();
        assert!(from_market_naive(naive).is_err());
    }
}
