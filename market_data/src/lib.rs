//! Vendor-agnostic retrieval of historical OHLCV bars.
//!
//! This crate owns the provider boundary: the canonical [`models::bar::Bar`]
//! type, the closed [`models::interval::Interval`] enumeration (with its
//! timestamp grid and provider lookback limits), the async
//! [`providers::BarProvider`] trait, and the Yahoo Finance chart-API
//! implementation behind it.

pub mod models;
pub mod providers;
