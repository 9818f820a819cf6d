use thiserror::Error;

/// Errors a [`BarProvider`](super::BarProvider) fetch can fail with.
///
/// The orchestrator treats every variant as local to the sub-range being
/// fetched; [`FetchError::is_transient`] only affects how callers may choose
/// to retry or report.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The HTTP request itself failed (connect, TLS, protocol).
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The fetch did not complete within the caller's per-range timeout.
    #[error("fetch timed out after {secs}s")]
    Timeout {
        /// Timeout that elapsed, in seconds.
        secs: u64,
    },

    /// The provider throttled the request.
    #[error("rate limited by provider (retry after {retry_after_secs}s)")]
    RateLimited {
        /// Seconds the provider asked us to wait, from the `retry-after`
        /// header when present.
        retry_after_secs: u64,
    },

    /// The provider does not know this ticker.
    #[error("unknown ticker: {0}")]
    UnknownTicker(String),

    /// The provider rejected the request with an explicit error payload.
    #[error("provider rejected request: {0}")]
    Api(String),

    /// The response did not have the shape we expect. Yahoo has no official
    /// API contract, so this also covers unannounced format changes.
    #[error("unexpected response shape: {0}")]
    ResponseFormat(String),
}

impl FetchError {
    /// Whether retrying the same request later could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            FetchError::Request(_) | FetchError::Timeout { .. } | FetchError::RateLimited { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_classification() {
        assert!(FetchError::Timeout { secs: 30 }.is_transient());
        assert!(FetchError::RateLimited { retry_after_secs: 60 }.is_transient());
        assert!(!FetchError::UnknownTicker("ZZZZ".into()).is_transient());
        assert!(!FetchError::Api("bad range".into()).is_transient());
        assert!(!FetchError::ResponseFormat("no quote data".into()).is_transient());
    }
}
