mod common;

use bar_cache::store::StoreError;
use chrono::Duration;
use common::{day, grid_bar, range, settled, setup_store};
use market_data::models::{bar::Bar, interval::Interval};

const D1: Interval = Interval::Day1;

#[test]
fn roundtrip_preserves_values_and_orders_by_time() {
    let (_dir, store) = setup_store();

    // Write out of order; reads come back oldest first.
    let bars = vec![
        grid_bar(day(2024, 1, 4), D1, 0.0),
        grid_bar(day(2024, 1, 2), D1, 0.0),
        grid_bar(day(2024, 1, 3), D1, 0.0),
    ];
    store
        .upsert_many("AAPL", D1, &bars, settled(day(2024, 1, 4), D1))
        .unwrap();

    let got = store
        .get_range("AAPL", D1, range(day(2024, 1, 1), day(2024, 1, 10)))
        .unwrap();
    assert_eq!(got.len(), 3);
    assert_eq!(got[0].timestamp, day(2024, 1, 2));
    assert_eq!(got[2].timestamp, day(2024, 1, 4));
    assert_eq!(got[1], grid_bar(day(2024, 1, 3), D1, 0.0));
}

#[test]
fn unknown_ticker_reads_empty() {
    let (_dir, store) = setup_store();
    let got = store
        .get_range("ZZZZ", D1, range(day(2024, 1, 1), day(2024, 1, 10)))
        .unwrap();
    assert!(got.is_empty());
}

#[test]
fn range_bounds_are_half_open() {
    let (_dir, store) = setup_store();
    let bars: Vec<Bar> = (2..=4).map(|d| grid_bar(day(2024, 1, d), D1, 0.0)).collect();
    store
        .upsert_many("AAPL", D1, &bars, settled(day(2024, 1, 4), D1))
        .unwrap();

    let got = store
        .get_range("AAPL", D1, range(day(2024, 1, 2), day(2024, 1, 4)))
        .unwrap();
    assert_eq!(got.len(), 2);
    assert_eq!(got.last().unwrap().timestamp, day(2024, 1, 3));
}

#[test]
fn upsert_overwrites_only_the_matching_key() {
    let (_dir, store) = setup_store();
    let first = vec![
        grid_bar(day(2024, 1, 2), D1, 0.0),
        grid_bar(day(2024, 1, 3), D1, 0.0),
    ];
    store
        .upsert_many("AAPL", D1, &first, settled(day(2024, 1, 3), D1))
        .unwrap();

    // Re-fetch of Jan 2 with revised values.
    let revised = vec![grid_bar(day(2024, 1, 2), D1, 5.0)];
    store
        .upsert_many("AAPL", D1, &revised, settled(day(2024, 1, 3), D1))
        .unwrap();

    let got = store
        .get_range("AAPL", D1, range(day(2024, 1, 1), day(2024, 1, 10)))
        .unwrap();
    assert_eq!(got.len(), 2, "overwrite must not duplicate the row");
    assert_eq!(got[0], grid_bar(day(2024, 1, 2), D1, 5.0));
    assert_eq!(got[1], grid_bar(day(2024, 1, 3), D1, 0.0));
}

#[test]
fn upsert_without_adj_close_clears_a_stored_one() {
    let (_dir, store) = setup_store();
    let ts = day(2024, 1, 2);

    let with_adj = grid_bar(ts, D1, 0.0);
    assert!(with_adj.adj_close.is_some());
    store
        .upsert_many("AAPL", D1, &[with_adj], settled(ts, D1))
        .unwrap();

    // The provider stopped adjusting: the re-fetched bar has no adj_close,
    // and the stored value must not leak through the overwrite.
    let mut plain = grid_bar(ts, D1, 0.0);
    plain.adj_close = None;
    store
        .upsert_many("AAPL", D1, &[plain], settled(ts, D1))
        .unwrap();

    let got = store
        .get_range("AAPL", D1, range(day(2024, 1, 1), day(2024, 1, 10)))
        .unwrap();
    assert_eq!(got.len(), 1);
    assert_eq!(got[0].adj_close, None);
}

#[test]
fn misaligned_bar_rejects_the_whole_batch() {
    let (_dir, store) = setup_store();
    let mut off_grid = grid_bar(day(2024, 1, 3), D1, 0.0);
    off_grid.timestamp += Duration::minutes(7);

    let batch = vec![grid_bar(day(2024, 1, 2), D1, 0.0), off_grid];
    let err = store
        .upsert_many("AAPL", D1, &batch, settled(day(2024, 1, 3), D1))
        .unwrap_err();
    assert!(matches!(err, StoreError::MisalignedBar { .. }));

    // Nothing from the batch may land, including the aligned bar.
    let got = store
        .get_range("AAPL", D1, range(day(2024, 1, 1), day(2024, 1, 10)))
        .unwrap();
    assert!(got.is_empty());
}

#[test]
fn tickers_are_case_insensitive() {
    let (_dir, store) = setup_store();
    let bars = vec![grid_bar(day(2024, 1, 2), D1, 0.0)];
    store
        .upsert_many("aapl", D1, &bars, settled(day(2024, 1, 2), D1))
        .unwrap();

    let got = store
        .get_range("AaPl", D1, range(day(2024, 1, 1), day(2024, 1, 10)))
        .unwrap();
    assert_eq!(got.len(), 1);
}

#[test]
fn covered_ranges_split_on_missing_bars() {
    let (_dir, store) = setup_store();
    let bars: Vec<Bar> = [2, 3, 5, 6]
        .into_iter()
        .map(|d| grid_bar(day(2024, 1, d), D1, 0.0))
        .collect();
    store
        .upsert_many("AAPL", D1, &bars, settled(day(2024, 1, 6), D1))
        .unwrap();

    let covered = store
        .covered_ranges("AAPL", D1, range(day(2024, 1, 1), day(2024, 1, 10)))
        .unwrap();
    assert_eq!(covered.len(), 2);
    assert_eq!(covered[0], range(day(2024, 1, 2), day(2024, 1, 4)));
    assert_eq!(covered[1], range(day(2024, 1, 5), day(2024, 1, 7)));
}

#[test]
fn provisional_bars_read_back_but_do_not_count_as_coverage() {
    let (_dir, store) = setup_store();
    let ts = day(2024, 1, 2);

    // Fetched an hour into the trading day: the daily bar is still open.
    store
        .upsert_many("AAPL", D1, &[grid_bar(ts, D1, 0.0)], ts + Duration::hours(1))
        .unwrap();

    let got = store
        .get_range("AAPL", D1, range(day(2024, 1, 1), day(2024, 1, 10)))
        .unwrap();
    assert_eq!(got.len(), 1, "provisional bars are still served");

    let covered = store
        .covered_ranges("AAPL", D1, range(day(2024, 1, 1), day(2024, 1, 10)))
        .unwrap();
    assert!(covered.is_empty(), "provisional bars are not coverage");
}

#[test]
fn intervals_do_not_bleed_into_each_other() {
    let (_dir, store) = setup_store();
    store
        .upsert_many(
            "AAPL",
            D1,
            &[grid_bar(day(2024, 1, 2), D1, 0.0)],
            settled(day(2024, 1, 2), D1),
        )
        .unwrap();

    let got = store
        .get_range(
            "AAPL",
            Interval::Hour1,
            range(day(2024, 1, 1), day(2024, 1, 10)),
        )
        .unwrap();
    assert!(got.is_empty());
}
