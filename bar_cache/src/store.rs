//! SQLite-backed bar storage.
//!
//! Bars are keyed by (ticker, interval, bar start) and written with the
//! `fetched_at` instant of the batch. A stored bar counts as *complete* only
//! when its period had already closed at fetch time (`ts + step <=
//! fetched_at`); a bar fetched mid-period is kept for reads but excluded from
//! coverage, so the next refresh fetches it again with final values.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use market_data::models::{bar::Bar, interval::Interval};
use roaring::RoaringBitmap;
use thiserror::Error;
use tracing::debug;

use crate::{
    db,
    models::{BarRow, NewBarRow},
    range::TimeRange,
    tz,
};

/// Failures raised by [`BarStore`].
#[derive(Debug, Error)]
pub enum StoreError {
    /// The database could not be opened or migrated.
    #[error("failed to open bar store: {0}")]
    Open(#[source] anyhow::Error),
    /// A query or write failed inside SQLite.
    #[error(transparent)]
    Query(#[from] diesel::result::Error),
    /// A bar in an upsert batch does not sit on the interval grid.
    #[error("bar at {ts} is not aligned to the {interval} grid")]
    MisalignedBar {
        /// Offending bar start.
        ts: DateTime<Utc>,
        /// Grid the batch was written against.
        interval: Interval,
    },
    /// A stored row holds a timestamp this crate cannot read back.
    #[error("stored row for {ticker}/{interval} has unreadable timestamp {ts:?}")]
    Decode {
        /// Row's ticker.
        ticker: String,
        /// Row's interval.
        interval: Interval,
        /// Raw column value.
        ts: String,
    },
    /// A timestamp maps to a bucket id outside the coverage bitmap's domain.
    #[error("timestamp {ts} cannot be mapped to a coverage bucket")]
    BucketRange {
        /// Offending instant.
        ts: DateTime<Utc>,
    },
}

/// Handle on the bars table of one workspace database.
pub struct BarStore {
    conn: Mutex<SqliteConnection>,
}

impl BarStore {
    /// Open (creating and migrating if needed) the database at `path`.
    pub fn open_path(path: &Path) -> Result<Self, StoreError> {
        let url = path.to_string_lossy();
        db::migrate::run_sqlite(&url).map_err(StoreError::Open)?;
        let conn = db::connection::connect_sqlite(&url).map_err(StoreError::Open)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> MutexGuard<'_, SqliteConnection> {
        // A poisoned lock only means another thread panicked mid-query; the
        // connection itself is still usable.
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Read the bars of `ticker`/`interval` within `range`, oldest first.
    ///
    /// An unknown ticker is indistinguishable from an empty range: both
    /// return an empty vector.
    pub fn get_range(
        &self,
        ticker: &str,
        interval: Interval,
        range: TimeRange,
    ) -> Result<Vec<Bar>, StoreError> {
        use crate::schema::bars::dsl as b;

        if range.is_empty() {
            return Ok(vec![]);
        }
        let symbol = normalize_ticker(ticker);
        let lo = tz::to_rfc3339_millis(range.start);
        let hi = tz::to_rfc3339_millis(range.end);

        let mut guard = self.lock();
        let rows: Vec<BarRow> = b::bars
            .filter(b::ticker.eq(&symbol))
            .filter(b::interval.eq(interval.as_str()))
            .filter(b::ts.ge(&lo))
            .filter(b::ts.lt(&hi))
            .order(b::ts.asc())
            .select(BarRow::as_select())
            .load(&mut *guard)?;

        rows.into_iter()
            .map(|row| decode_bar(&symbol, interval, row))
            .collect()
    }

    /// Write a batch of bars, replacing any existing row with the same key.
    ///
    /// The whole batch lands in one transaction: either every bar is written
    /// or none is. Every bar must sit on the interval grid.
    pub fn upsert_many(
        &self,
        ticker: &str,
        interval: Interval,
        bars: &[Bar],
        fetched_at: DateTime<Utc>,
    ) -> Result<usize, StoreError> {
        use crate::schema::bars::dsl as b;

        for bar in bars {
            if !interval.is_aligned(bar.timestamp) {
                return Err(StoreError::MisalignedBar {
                    ts: bar.timestamp,
                    interval,
                });
            }
        }
        if bars.is_empty() {
            return Ok(0);
        }

        let symbol = normalize_ticker(ticker);
        let fetched = tz::to_rfc3339_millis(fetched_at);

        let mut guard = self.lock();
        guard.immediate_transaction(|conn| {
            for bar in bars {
                let ts = tz::to_rfc3339_millis(bar.timestamp);
                let row = NewBarRow {
                    ticker: &symbol,
                    interval: interval.as_str(),
                    ts: &ts,
                    open: bar.open,
                    high: bar.high,
                    low: bar.low,
                    close: bar.close,
                    adj_close: bar.adj_close,
                    volume: bar.volume,
                    fetched_at: &fetched,
                };
                diesel::insert_into(b::bars)
                    .values(&row)
                    .on_conflict((b::ticker, b::interval, b::ts))
                    .do_update()
                    .set(&row)
                    .execute(conn)?;
            }
            debug!(ticker = %symbol, interval = %interval, count = bars.len(), "wrote bars");
            Ok(bars.len())
        })
    }

    /// Contiguous sub-ranges of `window` already covered by complete bars.
    pub fn covered_ranges(
        &self,
        ticker: &str,
        interval: Interval,
        window: TimeRange,
    ) -> Result<Vec<TimeRange>, StoreError> {
        let present = self.coverage_bitmap(ticker, interval, window)?;
        Ok(crate::gaps::coalesce_runs(&present, interval))
    }

    /// Bucket-id bitmap of complete bars within `window`.
    pub(crate) fn coverage_bitmap(
        &self,
        ticker: &str,
        interval: Interval,
        window: TimeRange,
    ) -> Result<RoaringBitmap, StoreError> {
        use crate::schema::bars::dsl as b;

        let mut present = RoaringBitmap::new();
        if window.is_empty() {
            return Ok(present);
        }
        let symbol = normalize_ticker(ticker);
        let lo = tz::to_rfc3339_millis(window.start);
        let hi = tz::to_rfc3339_millis(window.end);

        let mut guard = self.lock();
        let rows: Vec<(String, String)> = b::bars
            .filter(b::ticker.eq(&symbol))
            .filter(b::interval.eq(interval.as_str()))
            .filter(b::ts.ge(&lo))
            .filter(b::ts.lt(&hi))
            .select((b::ts, b::fetched_at))
            .load(&mut *guard)?;
        drop(guard);

        for (ts_raw, fetched_raw) in rows {
            let ts = tz::parse_ts_to_utc(&ts_raw).map_err(|_| StoreError::Decode {
                ticker: symbol.clone(),
                interval,
                ts: ts_raw.clone(),
            })?;
            let fetched = tz::parse_ts_to_utc(&fetched_raw).map_err(|_| StoreError::Decode {
                ticker: symbol.clone(),
                interval,
                ts: fetched_raw.clone(),
            })?;
            // Provisional bar: its period was still open when we fetched it.
            if ts + interval.step() > fetched {
                continue;
            }
            present.insert(bucket_u32(interval.bucket_id(ts), ts)?);
        }
        Ok(present)
    }
}

/// Map a bucket id into the roaring domain (u32).
pub(crate) fn bucket_u32(id: i64, ts: DateTime<Utc>) -> Result<u32, StoreError> {
    u32::try_from(id).map_err(|_| StoreError::BucketRange { ts })
}

fn normalize_ticker(ticker: &str) -> String {
    ticker.trim().to_uppercase()
}

fn decode_bar(ticker: &str, interval: Interval, row: BarRow) -> Result<Bar, StoreError> {
    let timestamp = tz::parse_ts_to_utc(&row.ts).map_err(|_| StoreError::Decode {
        ticker: ticker.to_string(),
        interval,
        ts: row.ts.clone(),
    })?;
    Ok(Bar {
        timestamp,
        open: row.open,
        high: row.high,
        low: row.low,
        close: row.close,
        adj_close: row.adj_close,
        volume: row.volume,
    })
}
