//! video-collector: bounded video metadata collection from the YouTube Data API
//!
//! For each search query the collector walks the paginated search results,
//! fetches full details for every hit, and stops at a per-query cap. Queries
//! run one after another and their records are concatenated.

pub mod api;
pub mod collector;
pub mod config;
pub mod network;
pub mod output;
pub mod results;

pub use api::{ApiError, Error, YouTubeClient};
pub use collector::{Collector, Harvest};
pub use config::Settings;
pub use results::VideoRecord;

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
