//! Data types shared between providers and their callers.

pub mod bar;
pub mod interval;
pub mod request;
