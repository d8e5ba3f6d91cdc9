//! HTTP networking module
//!
//! Provides the HTTP client used by the API layer.

mod client;

pub use client::HttpClient;
