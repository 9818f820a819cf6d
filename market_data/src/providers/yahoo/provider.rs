use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use tracing::debug;

use crate::{
    models::{bar::Bar, interval::Interval, request::BarsRequest},
    providers::{BarProvider, FetchError},
};

use super::response::ChartResponse;

const BASE_URL: &str = "https://query2.finance.yahoo.com/v8/finance/chart";

/// Fetches bars from Yahoo's v8 chart endpoint.
///
/// No credentials are required, but Yahoo rejects non-browser user agents,
/// so the client announces itself as one.
pub struct YahooProvider {
    client: Client,
    base_url: String,
}

impl YahooProvider {
    /// Build a provider with a 30s request timeout.
    pub fn new() -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .build()?;

        Ok(Self {
            client,
            base_url: BASE_URL.to_string(),
        })
    }

    /// Same as [`YahooProvider::new`] but pointed at a different endpoint.
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, FetchError> {
        let mut p = Self::new()?;
        p.base_url = base_url.into();
        Ok(p)
    }

    fn chart_url(&self, req: &BarsRequest) -> String {
        format!(
            "{}/{}?period1={}&period2={}&interval={}&includeAdjustedClose=true",
            self.base_url,
            req.ticker,
            req.start.timestamp(),
            req.end.timestamp(),
            req.interval.provider_code(),
        )
    }
}

/// Daily bars come back stamped at the session open (13:30Z or 14:30Z for US
/// equities depending on DST); snap them to 00:00Z of the trading date so
/// they sit on the day grid. Intraday timestamps are already grid-aligned.
fn normalize_timestamp(ts: DateTime<Utc>, interval: Interval) -> DateTime<Utc> {
    match interval {
        Interval::Day1 => interval.bucket_start(interval.bucket_id(ts)),
        _ => ts,
    }
}

pub(super) fn parse_chart(
    ticker: &str,
    interval: Interval,
    resp: ChartResponse,
) -> Result<Vec<Bar>, FetchError> {
    let result = resp.chart.result.ok_or_else(|| match resp.chart.error {
        Some(err) if err.code == "Not Found" => FetchError::UnknownTicker(ticker.to_string()),
        Some(err) => FetchError::Api(format!("{}: {}", err.code, err.description)),
        None => FetchError::ResponseFormat("empty result with no error".into()),
    })?;

    let data = result
        .into_iter()
        .next()
        .ok_or_else(|| FetchError::ResponseFormat("result array is empty".into()))?;

    // A valid range with no trading activity has no timestamp array at all.
    let Some(timestamps) = data.timestamp else {
        return Ok(vec![]);
    };

    let quote = data
        .indicators
        .quote
        .into_iter()
        .next()
        .ok_or_else(|| FetchError::ResponseFormat("no quote data".into()))?;

    let adj_closes = data
        .indicators
        .adjclose
        .and_then(|v| v.into_iter().next())
        .map(|a| a.adjclose);

    let mut bars = Vec::with_capacity(timestamps.len());
    for (i, &ts) in timestamps.iter().enumerate() {
        let instant = DateTime::from_timestamp(ts, 0)
            .ok_or_else(|| FetchError::ResponseFormat(format!("invalid timestamp: {ts}")))?;

        let open = quote.open.get(i).copied().flatten();
        let high = quote.high.get(i).copied().flatten();
        let low = quote.low.get(i).copied().flatten();
        let close = quote.close.get(i).copied().flatten();
        let volume = quote.volume.get(i).copied().flatten();

        // Null rows are non-trading timestamps; skip rather than invent data.
        let (Some(open), Some(high), Some(low), Some(close)) = (open, high, low, close) else {
            continue;
        };

        let adj_close = adj_closes.as_ref().and_then(|v| v.get(i).copied().flatten());

        bars.push(Bar {
            timestamp: normalize_timestamp(instant, interval),
            open,
            high,
            low,
            close,
            adj_close,
            volume: volume.unwrap_or(0) as i64,
        });
    }

    Ok(bars)
}

#[async_trait]
impl BarProvider for YahooProvider {
    async fn fetch_bars(&self, req: &BarsRequest) -> Result<Vec<Bar>, FetchError> {
        let url = self.chart_url(req);
        debug!(ticker = %req.ticker, interval = %req.interval, "requesting chart data");

        let resp = self.client.get(&url).send().await?;
        let status = resp.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = resp
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(60);
            return Err(FetchError::RateLimited { retry_after_secs });
        }

        // 404 still carries a chart.error body we want to interpret.
        if !status.is_success() && status != StatusCode::NOT_FOUND {
            return Err(FetchError::Api(format!("HTTP {status} for {}", req.ticker)));
        }

        let chart: ChartResponse = resp
            .json()
            .await
            .map_err(|e| FetchError::ResponseFormat(format!("{}: {e}", req.ticker)))?;

        let mut bars = parse_chart(&req.ticker, req.interval, chart)?;

        // Yahoo pads the edges of the window; keep the contract tight.
        bars.retain(|b| b.timestamp >= req.start && b.timestamp < req.end);
        Ok(bars)
    }
}
