//! Gap resolution: which parts of a requested window still need fetching.
//!
//! The window is first clamped to the provider's lookback for the interval,
//! then snapped to the bar grid and compared bucket-by-bucket against the
//! store's coverage bitmap. The difference, coalesced into maximal runs, is
//! the fetch plan.

use chrono::{DateTime, Utc};
use market_data::models::interval::Interval;
use roaring::RoaringBitmap;
use tracing::debug;

use crate::{
    range::TimeRange,
    store::{BarStore, StoreError, bucket_u32},
};

/// Notice that a requested window reached past the provider's lookback and
/// was clamped rather than rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Truncation {
    /// Start the caller asked for.
    pub requested_start: DateTime<Utc>,
    /// Earliest start the provider can serve.
    pub clamped_start: DateTime<Utc>,
}

/// Result of gap resolution over one window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GapPlan {
    /// Grid-aligned, disjoint, ascending ranges that need fetching.
    pub ranges: Vec<TimeRange>,
    /// Present when the window was clamped to the provider lookback.
    pub truncation: Option<Truncation>,
}

impl GapPlan {
    fn empty() -> Self {
        Self {
            ranges: vec![],
            truncation: None,
        }
    }
}

/// Compute the minimal set of ranges in `window` not covered by complete
/// bars, as of `now`.
///
/// Windows older than the interval's lookback are clamped and reported via
/// [`GapPlan::truncation`]; a window entirely outside the lookback yields no
/// ranges at all.
pub fn missing_ranges(
    store: &BarStore,
    ticker: &str,
    interval: Interval,
    window: TimeRange,
    now: DateTime<Utc>,
) -> Result<GapPlan, StoreError> {
    if window.is_empty() {
        return Ok(GapPlan::empty());
    }

    let mut window = window;
    let mut truncation = None;
    if let Some(lookback) = interval.max_lookback() {
        let floor = now - lookback;
        if window.start < floor {
            truncation = Some(Truncation {
                requested_start: window.start,
                clamped_start: floor,
            });
            debug!(
                %ticker, %interval, requested = %window.start, floor = %floor,
                "window clamped to provider lookback"
            );
            window.start = floor;
            if window.is_empty() {
                return Ok(GapPlan {
                    ranges: vec![],
                    truncation,
                });
            }
        }
    }

    let Some((start_id, end_id)) = bucket_window(window, interval)? else {
        return Ok(GapPlan {
            ranges: vec![],
            truncation,
        });
    };

    // Coverage lookup over the snapped window; stored rows are grid-aligned
    // so the snapped bounds see exactly the buckets in [start_id, end_id).
    let snapped = TimeRange::new(
        interval.bucket_start(start_id as i64),
        interval.bucket_start(end_id as i64),
    );
    let present = store.coverage_bitmap(ticker, interval, snapped)?;

    let missing = missing_in_window(start_id..end_id, &present);
    Ok(GapPlan {
        ranges: coalesce_runs(&missing, interval),
        truncation,
    })
}

/// Snap a non-empty window to bucket ids: the first bucket starting at or
/// after `window.start`, and an exclusive end covering any bucket the window
/// overlaps. `None` when no bucket fits.
fn bucket_window(window: TimeRange, interval: Interval) -> Result<Option<(u32, u32)>, StoreError> {
    let mut start_id = interval.bucket_id(window.start);
    if interval.bucket_start(start_id) < window.start {
        start_id += 1;
    }

    let mut end_id = interval.bucket_id(window.end);
    if interval.bucket_start(end_id) < window.end {
        end_id += 1;
    }

    if end_id <= start_id {
        return Ok(None);
    }
    Ok(Some((
        bucket_u32(start_id, window.start)?,
        bucket_u32(end_id, window.end)?,
    )))
}

fn missing_in_window(window: std::ops::Range<u32>, present: &RoaringBitmap) -> RoaringBitmap {
    let mut want = RoaringBitmap::new();
    want.insert_range(window);
    &want - present
}

/// Coalesce a bucket-id bitmap into maximal contiguous UTC ranges.
pub(crate) fn coalesce_runs(rb: &RoaringBitmap, interval: Interval) -> Vec<TimeRange> {
    let mut out = Vec::new();
    let mut it = rb.iter();
    if let Some(mut run_start) = it.next() {
        let mut prev = run_start;
        for x in it {
            if x == prev + 1 {
                prev = x;
                continue;
            }
            out.push(run_to_range(run_start, prev, interval));
            run_start = x;
            prev = x;
        }
        out.push(run_to_range(run_start, prev, interval));
    }
    out
}

fn run_to_range(first: u32, last: u32, interval: Interval) -> TimeRange {
    TimeRange::new(
        interval.bucket_start(first as i64),
        interval.bucket_start(last as i64 + 1),
    )
}
