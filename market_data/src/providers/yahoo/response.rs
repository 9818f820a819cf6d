//! Serde mapping of the Yahoo v8 chart API response envelope.

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub(crate) struct ChartResponse {
    pub chart: ChartResult,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChartResult {
    pub result: Option<Vec<ChartData>>,
    pub error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChartError {
    pub code: String,
    pub description: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChartData {
    pub timestamp: Option<Vec<i64>>,
    pub indicators: Indicators,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Indicators {
    pub quote: Vec<QuoteData>,
    pub adjclose: Option<Vec<AdjCloseData>>,
}

/// Column-oriented quote arrays. Entries are `null` for timestamps where the
/// market produced no trade (halts, holidays on some feeds).
#[derive(Debug, Deserialize)]
pub(crate) struct QuoteData {
    pub open: Vec<Option<f64>>,
    pub high: Vec<Option<f64>>,
    pub low: Vec<Option<f64>>,
    pub close: Vec<Option<f64>>,
    pub volume: Vec<Option<u64>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AdjCloseData {
    pub adjclose: Vec<Option<f64>>,
}
