//! Refresh orchestration: fill a window's gaps, then serve it from cache.

use std::time::Duration;

use chrono::Utc;
use market_data::{
    models::{bar::Bar, interval::Interval, request::BarsRequest},
    providers::{BarProvider, FetchError},
};
use thiserror::Error;
use tracing::{debug, warn};

use crate::{
    gaps::{self, Truncation},
    range::TimeRange,
    store::{BarStore, StoreError},
};

const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Fatal refresh failures. Provider errors are not fatal; they are carried
/// per-range in [`RefreshOutcome::failures`].
#[derive(Debug, Error)]
pub enum RefreshError {
    /// The local store failed; cached data can no longer be trusted to land.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// One gap range that could not be fetched.
#[derive(Debug)]
pub struct RangeFailure {
    /// The range that was requested.
    pub range: TimeRange,
    /// Why the fetch failed.
    pub error: FetchError,
}

/// What a refresh produced.
#[derive(Debug)]
pub struct RefreshOutcome {
    /// Every cached bar in the originally requested window, oldest first,
    /// including bars that were already present before the refresh.
    pub bars: Vec<Bar>,
    /// Set when the window reached past the provider lookback.
    pub truncation: Option<Truncation>,
    /// Gap ranges the provider could not serve this time.
    pub failures: Vec<RangeFailure>,
}

/// Fetch-and-store coordinator for one provider over one store.
pub struct Refresher<'a> {
    store: &'a BarStore,
    provider: &'a (dyn BarProvider + Send + Sync),
    fetch_timeout: Duration,
}

impl<'a> Refresher<'a> {
    /// Pair a store with a provider.
    pub fn new(store: &'a BarStore, provider: &'a (dyn BarProvider + Send + Sync)) -> Self {
        Self {
            store,
            provider,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }

    /// Override the per-range fetch timeout.
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    /// Make `window` as complete as the provider allows, then read it back.
    ///
    /// Each gap range is fetched independently: one failing range is recorded
    /// in the outcome and does not stop the others. Store failures abort the
    /// whole call.
    pub async fn ensure_range(
        &self,
        ticker: &str,
        interval: Interval,
        window: TimeRange,
    ) -> Result<RefreshOutcome, RefreshError> {
        let now = Utc::now();
        let plan = gaps::missing_ranges(self.store, ticker, interval, window, now)?;
        debug!(
            %ticker, %interval, gaps = plan.ranges.len(),
            truncated = plan.truncation.is_some(), "resolved gaps"
        );

        let mut failures = Vec::new();
        for range in plan.ranges {
            match self.fetch_range(ticker, interval, range).await {
                Ok(bars) => {
                    self.store
                        .upsert_many(ticker, interval, &bars, Utc::now())?;
                }
                Err(error) => {
                    warn!(%ticker, %interval, %range, %error, "gap fetch failed");
                    failures.push(RangeFailure { range, error });
                }
            }
        }

        // Serve the caller's original window, not the clamped one: bars older
        // than the lookback may still be cached from earlier runs.
        let bars = self.store.get_range(ticker, interval, window)?;
        Ok(RefreshOutcome {
            bars,
            truncation: plan.truncation,
            failures,
        })
    }

    async fn fetch_range(
        &self,
        ticker: &str,
        interval: Interval,
        range: TimeRange,
    ) -> Result<Vec<Bar>, FetchError> {
        let req = BarsRequest {
            ticker: ticker.to_string(),
            interval,
            start: range.start,
            end: range.end,
        };
        let mut bars = tokio::time::timeout(self.fetch_timeout, self.provider.fetch_bars(&req))
            .await
            .map_err(|_| FetchError::Timeout {
                secs: self.fetch_timeout.as_secs(),
            })??;

        // Providers may pad the window; only the requested gap gets written.
        bars.retain(|b| range.contains(b.timestamp));
        Ok(bars)
    }
}
