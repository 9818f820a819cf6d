mod common;

use bar_cache::refresh::Refresher;
use chrono::{Duration, Utc};
use common::{ScriptedProvider, day, grid_bar, range, settled, setup_store};
use market_data::models::{bar::Bar, interval::Interval};

const D1: Interval = Interval::Day1;

#[tokio::test]
async fn fills_gaps_and_merges_with_cached_bars() {
    let (_dir, store) = setup_store();
    let seeded: Vec<Bar> = [1, 2]
        .into_iter()
        .map(|d| grid_bar(day(2024, 1, d), D1, 0.0))
        .collect();
    store
        .upsert_many("AAPL", D1, &seeded, settled(day(2024, 1, 2), D1))
        .unwrap();

    let provider = ScriptedProvider::new();
    let outcome = Refresher::new(&store, &provider)
        .ensure_range("AAPL", D1, range(day(2024, 1, 1), day(2024, 1, 7)))
        .await
        .unwrap();

    // One gap (Jan 3..7), one fetch.
    assert_eq!(provider.calls(), vec![(day(2024, 1, 3), day(2024, 1, 7))]);
    assert_eq!(outcome.bars.len(), 6);
    assert!(outcome.failures.is_empty());
    assert!(outcome.truncation.is_none());
    // Cached bars survive, fetched bars fill the rest, oldest first.
    assert_eq!(outcome.bars[0], seeded[0]);
    assert_eq!(outcome.bars[5].timestamp, day(2024, 1, 6));
}

#[tokio::test]
async fn one_failing_gap_does_not_stop_the_others() {
    let (_dir, store) = setup_store();
    // Coverage at Jan 3 and Jan 6 splits the window into three gaps:
    // [1,3), [4,6), [7,8).
    let seeded: Vec<Bar> = [3, 6]
        .into_iter()
        .map(|d| grid_bar(day(2024, 1, d), D1, 0.0))
        .collect();
    store
        .upsert_many("AAPL", D1, &seeded, settled(day(2024, 1, 6), D1))
        .unwrap();

    let provider = ScriptedProvider::new().failing_at(vec![day(2024, 1, 4)]);
    let outcome = Refresher::new(&store, &provider)
        .ensure_range("AAPL", D1, range(day(2024, 1, 1), day(2024, 1, 8)))
        .await
        .unwrap();

    assert_eq!(provider.call_count(), 3);
    assert_eq!(outcome.failures.len(), 1);
    assert_eq!(outcome.failures[0].range, range(day(2024, 1, 4), day(2024, 1, 6)));

    // Everything outside the failed range is served: 7 buckets - 2 failed.
    let got: Vec<_> = outcome.bars.iter().map(|b| b.timestamp).collect();
    assert_eq!(
        got,
        vec![
            day(2024, 1, 1),
            day(2024, 1, 2),
            day(2024, 1, 3),
            day(2024, 1, 6),
            day(2024, 1, 7),
        ]
    );
}

#[tokio::test]
async fn short_provider_feed_leaves_the_tail_as_a_gap() {
    let (_dir, store) = setup_store();
    let window = range(day(2024, 1, 1), day(2024, 1, 7));

    // The feed runs out at Jan 4: the fetch succeeds but returns only
    // three of the six requested bars.
    let first = ScriptedProvider::new().with_data_end(day(2024, 1, 4));
    let outcome = Refresher::new(&store, &first)
        .ensure_range("AAPL", D1, window)
        .await
        .unwrap();

    assert!(outcome.failures.is_empty());
    let got: Vec<_> = outcome.bars.iter().map(|b| b.timestamp).collect();
    assert_eq!(got, vec![day(2024, 1, 1), day(2024, 1, 2), day(2024, 1, 3)]);

    // The unreturned buckets stay uncovered, so a later refresh asks for
    // exactly the tail again.
    let second = ScriptedProvider::new();
    Refresher::new(&store, &second)
        .ensure_range("AAPL", D1, window)
        .await
        .unwrap();
    assert_eq!(second.calls(), vec![(day(2024, 1, 4), day(2024, 1, 7))]);
}

#[tokio::test]
async fn completed_window_refreshes_without_provider_calls() {
    let (_dir, store) = setup_store();
    let window = range(day(2024, 1, 1), day(2024, 1, 7));

    let first = ScriptedProvider::new();
    let initial = Refresher::new(&store, &first)
        .ensure_range("AAPL", D1, window)
        .await
        .unwrap();
    assert_eq!(first.call_count(), 1);

    let second = ScriptedProvider::new().with_price_shift(42.0);
    let repeat = Refresher::new(&store, &second)
        .ensure_range("AAPL", D1, window)
        .await
        .unwrap();

    assert_eq!(second.call_count(), 0, "covered window must not refetch");
    assert_eq!(repeat.bars, initial.bars, "cache is the source of truth");
}

#[tokio::test]
async fn provisional_last_bar_is_refetched_next_time() {
    let (_dir, store) = setup_store();
    let now = Utc::now();
    let today = D1.bucket_start(D1.bucket_id(now));
    let window = range(today - Duration::days(3), now);

    let first = ScriptedProvider::new();
    Refresher::new(&store, &first)
        .ensure_range("AAPL", D1, window)
        .await
        .unwrap();
    assert_eq!(first.call_count(), 1);

    // Today's bar was fetched mid-day, so it is provisional. A second refresh
    // must fetch exactly that bucket again and keep the settled ones.
    let second = ScriptedProvider::new().with_price_shift(10.0);
    let outcome = Refresher::new(&store, &second)
        .ensure_range("AAPL", D1, window)
        .await
        .unwrap();

    assert_eq!(second.calls(), vec![(today, today + Duration::days(1))]);
    let last = outcome.bars.last().unwrap();
    assert_eq!(last.timestamp, today);
    assert_eq!(last.open, 110.0, "provisional bar must carry refetched values");
    assert_eq!(outcome.bars[0].open, 100.0, "settled bars are untouched");
}

#[tokio::test]
async fn window_outside_lookback_serves_old_cache_without_fetching() {
    let (_dir, store) = setup_store();
    let iv = Interval::Min30;
    let now = Utc::now();

    // Five settled bars roughly 70 days back, beyond the 60-day lookback.
    let start = iv.bucket_start(iv.bucket_id(now - Duration::days(70)));
    let seeded: Vec<Bar> = (0..5)
        .map(|i| grid_bar(start + iv.step() * i, iv, 0.0))
        .collect();
    store
        .upsert_many("AAPL", iv, &seeded, settled(start + iv.step() * 5, iv))
        .unwrap();

    let provider = ScriptedProvider::new();
    let outcome = Refresher::new(&store, &provider)
        .ensure_range("AAPL", iv, range(start, start + iv.step() * 5))
        .await
        .unwrap();

    assert_eq!(provider.call_count(), 0);
    assert!(outcome.truncation.is_some());
    assert_eq!(outcome.bars, seeded);
}
