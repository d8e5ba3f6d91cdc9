//! Bounded retry around a page or detail source
//!
//! Wraps any source and retries transient failures (transport errors, 429,
//! 5xx) a fixed number of times with a fixed delay. The collector itself
//! never retries.

use super::error::Result;
use super::traits::{DetailSource, PageSource, SearchParams};
use crate::collector::{Clock, TokioClock};
use crate::config::{secs_to_duration, RetrySettings};
use crate::results::{ResultStub, SearchPage, VideoRecord};
use async_trait::async_trait;
use std::time::Duration;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts including the first; 1 disables retrying
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 1,
            delay: Duration::from_secs(2),
        }
    }
}

impl RetryPolicy {
    pub fn from_settings(settings: &RetrySettings) -> Self {
        Self {
            max_attempts: settings.max_attempts.max(1),
            delay: secs_to_duration(settings.delay_secs).unwrap_or_default(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.max_attempts > 1
    }
}

pub struct Retrying<S, C = TokioClock> {
    inner: S,
    clock: C,
    policy: RetryPolicy,
}

impl<S> Retrying<S, TokioClock> {
    pub fn new(inner: S, policy: RetryPolicy) -> Self {
        Self::with_clock(inner, TokioClock, policy)
    }
}

impl<S, C: Clock> Retrying<S, C> {
    pub fn with_clock(inner: S, clock: C, policy: RetryPolicy) -> Self {
        Self {
            inner,
            clock,
            policy,
        }
    }

    /// Sleep before the next attempt if `attempt` may be retried
    async fn should_retry(&self, attempt: u32, what: &str, error: &super::Error) -> bool {
        if attempt >= self.policy.max_attempts || !error.is_transient() {
            return false;
        }
        warn!(
            "{} failed (attempt {}/{}): {}, retrying in {:?}",
            what, attempt, self.policy.max_attempts, error, self.policy.delay
        );
        self.clock.sleep(self.policy.delay).await;
        true
    }
}

#[async_trait]
impl<S: PageSource, C: Clock> PageSource for Retrying<S, C> {
    async fn fetch_page(&self, params: &SearchParams) -> Result<SearchPage> {
        let mut attempt = 1;
        loop {
            match self.inner.fetch_page(params).await {
                Ok(page) => return Ok(page),
                Err(e) => {
                    let what = format!("search '{}'", params.query);
                    if !self.should_retry(attempt, &what, &e).await {
                        return Err(e);
                    }
                }
            }
            attempt += 1;
        }
    }
}

#[async_trait]
impl<S: DetailSource, C: Clock> DetailSource for Retrying<S, C> {
    async fn fetch_details(&self, stub: &ResultStub) -> Result<VideoRecord> {
        let mut attempt = 1;
        loop {
            match self.inner.fetch_details(stub).await {
                Ok(record) => return Ok(record),
                Err(e) => {
                    let what = format!("details for {}", stub.video_id);
                    if !self.should_retry(attempt, &what, &e).await {
                        return Err(e);
                    }
                }
            }
            attempt += 1;
        }
    }
}
