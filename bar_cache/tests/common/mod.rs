#![allow(dead_code)]

use std::sync::Mutex;

use async_trait::async_trait;
use bar_cache::{range::TimeRange, store::BarStore};
use chrono::{DateTime, TimeZone, Utc};
use market_data::{
    models::{bar::Bar, interval::Interval, request::BarsRequest},
    providers::{BarProvider, FetchError},
};
use tempfile::TempDir;

/// Fresh store on a temp database. Keep the TempDir alive for the test.
pub fn setup_store() -> (TempDir, BarStore) {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = BarStore::open_path(&dir.path().join("stocks.db")).expect("open store");
    (dir, store)
}

pub fn day(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
}

pub fn range(start: DateTime<Utc>, end: DateTime<Utc>) -> TimeRange {
    TimeRange::new(start, end)
}

/// Deterministic bar for a grid slot. The close encodes the bucket so tests
/// can tell bars apart; `shift` distinguishes fetch generations.
pub fn grid_bar(ts: DateTime<Utc>, interval: Interval, shift: f64) -> Bar {
    let id = interval.bucket_id(ts) as f64;
    Bar {
        timestamp: ts,
        open: 100.0 + shift,
        high: 101.0 + shift,
        low: 99.0 + shift,
        close: 100.0 + id.rem_euclid(10.0) + shift,
        adj_close: Some(99.5 + shift),
        volume: 1_000 + interval.bucket_id(ts),
    }
}

/// A `fetched_at` far enough after `ts` that the bar counts as complete.
pub fn settled(ts: DateTime<Utc>, interval: Interval) -> DateTime<Utc> {
    ts + interval.step() * 2
}

/// In-memory provider that synthesizes one bar per requested grid slot.
///
/// Ranges whose start is listed in `fail_starts` error out; `data_end` caps
/// how far the synthetic feed extends. Every request is recorded.
pub struct ScriptedProvider {
    fail_starts: Vec<DateTime<Utc>>,
    data_end: Option<DateTime<Utc>>,
    price_shift: f64,
    calls: Mutex<Vec<(DateTime<Utc>, DateTime<Utc>)>>,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self {
            fail_starts: vec![],
            data_end: None,
            price_shift: 0.0,
            calls: Mutex::new(vec![]),
        }
    }

    pub fn failing_at(mut self, starts: Vec<DateTime<Utc>>) -> Self {
        self.fail_starts = starts;
        self
    }

    pub fn with_data_end(mut self, end: DateTime<Utc>) -> Self {
        self.data_end = Some(end);
        self
    }

    pub fn with_price_shift(mut self, shift: f64) -> Self {
        self.price_shift = shift;
        self
    }

    pub fn calls(&self) -> Vec<(DateTime<Utc>, DateTime<Utc>)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl BarProvider for ScriptedProvider {
    async fn fetch_bars(&self, req: &BarsRequest) -> Result<Vec<Bar>, FetchError> {
        self.calls.lock().unwrap().push((req.start, req.end));

        if self.fail_starts.contains(&req.start) {
            return Err(FetchError::Api("scripted failure".into()));
        }

        let step = req.interval.step();
        let cap = match self.data_end {
            Some(end) if end < req.end => end,
            _ => req.end,
        };
        let mut bars = Vec::new();
        let mut ts = req.start;
        while ts < cap {
            bars.push(grid_bar(ts, req.interval, self.price_shift));
            ts += step;
        }
        Ok(bars)
    }
}
