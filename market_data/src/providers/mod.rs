//! Provider abstraction for market data sources.
//!
//! [`BarProvider`] is the unified interface for fetching time-series bars
//! from any vendor. Implementations handle vendor-specific endpoints,
//! pagination, and error mapping; callers only see [`Bar`]s and
//! [`FetchError`]s. The trait is async and object-safe so the provider can be
//! selected at runtime (`dyn BarProvider`).

pub mod errors;
pub mod yahoo;

use async_trait::async_trait;

pub use errors::FetchError;

use crate::models::{bar::Bar, request::BarsRequest};

/// A source of historical OHLCV bars.
#[async_trait]
pub trait BarProvider {
    /// Fetch all bars for the request's ticker/interval whose timestamps fall
    /// in `[start, end)`, ordered ascending.
    ///
    /// An empty result is valid (e.g. the market was closed for the whole
    /// range) and is not an error.
    async fn fetch_bars(&self, req: &BarsRequest) -> Result<Vec<Bar>, FetchError>;
}
