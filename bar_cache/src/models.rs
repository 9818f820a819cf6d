//! Row types mapped onto [`crate::schema::bars`].

use diesel::prelude::*;

use crate::schema::bars;

/// A stored bar as read back from SQLite.
#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = bars)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct BarRow {
    /// Upper-cased ticker symbol.
    pub ticker: String,
    /// Interval code, e.g. `1d`.
    pub interval: String,
    /// Bar start, RFC-3339 UTC.
    pub ts: String,
    /// Open price.
    pub open: f64,
    /// High price.
    pub high: f64,
    /// Low price.
    pub low: f64,
    /// Close price.
    pub close: f64,
    /// Split/dividend adjusted close, when the provider supplied one.
    pub adj_close: Option<f64>,
    /// Traded volume.
    pub volume: i64,
    /// Instant the row was written, RFC-3339 UTC.
    pub fetched_at: String,
}

/// Borrowed row for insert/upsert. `AsChangeset` skips the primary key
/// columns, so a conflict update rewrites every value column;
/// `treat_none_as_null` makes a `None` adj_close clear a stored value
/// instead of leaving it behind.
#[derive(Debug, Insertable, AsChangeset)]
#[diesel(table_name = bars)]
#[diesel(treat_none_as_null = true)]
pub struct NewBarRow<'a> {
    /// Upper-cased ticker symbol.
    pub ticker: &'a str,
    /// Interval code, e.g. `1d`.
    pub interval: &'a str,
    /// Bar start, RFC-3339 UTC.
    pub ts: &'a str,
    /// Open price.
    pub open: f64,
    /// High price.
    pub high: f64,
    /// Low price.
    pub low: f64,
    /// Close price.
    pub close: f64,
    /// Adjusted close, if any.
    pub adj_close: Option<f64>,
    /// Traded volume.
    pub volume: i64,
    /// Instant the row was written, RFC-3339 UTC.
    pub fetched_at: &'a str,
}
