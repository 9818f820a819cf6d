//! Yahoo Finance v8 chart API provider.
//!
//! Yahoo has no official API; this talks to the JSON endpoint the finance
//! site itself uses. Any response shape drift maps to
//! [`FetchError::ResponseFormat`](super::FetchError) rather than a panic.

mod provider;
mod response;

pub use provider::YahooProvider;
