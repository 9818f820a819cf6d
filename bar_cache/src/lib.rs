//! Point-in-time bar cache backed by SQLite.
//!
//! The crate is organized around three operations:
//! - [`store::BarStore`] persists OHLCV bars keyed by (ticker, interval,
//!   timestamp) and reports which parts of a window it already holds.
//! - [`gaps::missing_ranges`] turns a requested window into the minimal set
//!   of grid-aligned ranges that still need to be fetched, clamped to the
//!   provider's per-interval lookback.
//! - [`refresh::Refresher`] fetches those ranges from a provider, writes them
//!   back, and returns the cached view of the originally requested window.

#![deny(missing_docs)]

pub mod datexpr;
pub mod db;
pub mod gaps;
pub mod models;
pub mod range;
pub mod refresh;
pub mod schema;
pub mod store;
pub mod tz;
pub mod workspace;
