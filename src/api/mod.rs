//! Video platform API module
//!
//! Defines the page and detail source capabilities the collector consumes,
//! the YouTube Data API implementation of both, and the retry decorator.

mod error;
mod retry;
mod traits;

pub mod youtube;

pub use error::{ApiError, Error, Result};
pub use retry::{RetryPolicy, Retrying};
pub use traits::*;
pub use youtube::{YouTubeApi, YouTubeClient};
