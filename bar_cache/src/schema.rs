//! Diesel table definitions for the bar cache.

// The table! expansion generates undocumented per-column items.
#![allow(missing_docs)]

diesel::table! {
    /// One row per (ticker, interval, bar start). `ts` and `fetched_at` are
    /// RFC-3339 UTC strings with millisecond precision.
    bars (ticker, interval, ts) {
        ticker -> Text,
        interval -> Text,
        ts -> Text,
        open -> Double,
        high -> Double,
        low -> Double,
        close -> Double,
        adj_close -> Nullable<Double>,
        volume -> BigInt,
        fetched_at -> Text,
    }
}
