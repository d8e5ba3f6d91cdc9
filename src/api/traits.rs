//! API request/response types and the source capabilities used by the collector

use super::error::{ApiError, Error, Result};
use crate::results::{PageCursor, ResultStub, SearchPage, VideoRecord};
use async_trait::async_trait;
use std::sync::Arc;

/// Largest page the search endpoint accepts
pub const MAX_PAGE_SIZE: u32 = 50;

/// Parameters for one search page request
#[derive(Debug, Clone)]
pub struct SearchParams {
    /// Search text, used verbatim
    pub query: String,
    /// Continuation token from the previous page
    pub cursor: Option<PageCursor>,
    /// Results per page, `1..=MAX_PAGE_SIZE`
    pub page_size: u32,
}

impl SearchParams {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            cursor: None,
            page_size: MAX_PAGE_SIZE,
        }
    }

    pub fn with_cursor(mut self, cursor: Option<PageCursor>) -> Self {
        self.cursor = cursor;
        self
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    /// Reject parameters the API would refuse
    pub fn validate(&self) -> Result<()> {
        if self.query.trim().is_empty() {
            return Err(Error::InvalidRequest("query must not be empty".to_string()));
        }
        if self.page_size == 0 || self.page_size > MAX_PAGE_SIZE {
            return Err(Error::InvalidRequest(format!(
                "page size {} outside 1..={}",
                self.page_size, MAX_PAGE_SIZE
            )));
        }
        Ok(())
    }
}

/// HTTP request to be made against the API
#[derive(Debug, Clone)]
pub struct ApiRequest {
    /// URL to request
    pub url: String,
    /// Query parameters, in insertion order
    pub params: Vec<(String, String)>,
}

impl ApiRequest {
    /// Create a GET request
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            params: Vec::new(),
        }
    }

    /// Add a query parameter
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }

    /// Look up a query parameter
    pub fn get_param(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// HTTP response from an API request
#[derive(Debug)]
pub struct ApiResponse {
    /// HTTP status code
    pub status: u16,
    /// Response body as text
    pub text: String,
}

impl ApiResponse {
    pub fn new(status: u16, text: impl Into<String>) -> Self {
        Self {
            status,
            text: text.into(),
        }
    }

    /// Parse response as JSON
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_str(&self.text)?)
    }

    /// Check if response is successful (2xx)
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Fail with the matching `ApiError` unless the status is 2xx
    pub fn error_for_status(self) -> Result<Self> {
        if self.is_success() {
            return Ok(self);
        }
        Err(classify_error(self.status, &self.text).into())
    }
}

/// Map a failed response onto an `ApiError` sub-kind.
///
/// The Data API reports quota exhaustion as a 403 whose error reason is
/// `quotaExceeded`, `dailyLimitExceeded` or `rateLimitExceeded`, so the body
/// has to be inspected before calling a 403 an authentication failure. A bad
/// key comes back as a 400 with reason `keyInvalid`.
fn classify_error(status: u16, body: &str) -> ApiError {
    let parsed: Option<serde_json::Value> = serde_json::from_str(body).ok();
    let error = parsed.as_ref().and_then(|v| v.get("error"));

    let message = error
        .and_then(|e| e.get("message"))
        .and_then(|m| m.as_str())
        .map(str::to_string)
        .unwrap_or_else(|| body.chars().take(200).collect());

    let reasons: Vec<&str> = error
        .and_then(|e| e.get("errors"))
        .and_then(|e| e.as_array())
        .map(|errors| {
            errors
                .iter()
                .filter_map(|e| e.get("reason").and_then(|r| r.as_str()))
                .collect()
        })
        .unwrap_or_default();

    let quota = reasons
        .iter()
        .any(|r| matches!(*r, "quotaExceeded" | "dailyLimitExceeded" | "rateLimitExceeded"));
    let bad_key = reasons
        .iter()
        .any(|r| matches!(*r, "keyInvalid" | "keyExpired"));

    match status {
        429 => ApiError::QuotaExceeded(message),
        403 if quota => ApiError::QuotaExceeded(message),
        400 if bad_key => ApiError::Unauthorized { status, message },
        401 | 403 => ApiError::Unauthorized { status, message },
        _ => ApiError::Status { status, message },
    }
}

/// Produces pages of search results for a query
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Fetch exactly one page. Never retries.
    async fn fetch_page(&self, params: &SearchParams) -> Result<SearchPage>;
}

/// Expands a search stub into a full record
#[async_trait]
pub trait DetailSource: Send + Sync {
    /// Fetch details for one stub. Never retries.
    async fn fetch_details(&self, stub: &ResultStub) -> Result<VideoRecord>;
}

#[async_trait]
impl<'a, T: PageSource + ?Sized> PageSource for &'a T {
    async fn fetch_page(&self, params: &SearchParams) -> Result<SearchPage> {
        (**self).fetch_page(params).await
    }
}

#[async_trait]
impl<'a, T: DetailSource + ?Sized> DetailSource for &'a T {
    async fn fetch_details(&self, stub: &ResultStub) -> Result<VideoRecord> {
        (**self).fetch_details(stub).await
    }
}

#[async_trait]
impl<T: PageSource + ?Sized> PageSource for Arc<T> {
    async fn fetch_page(&self, params: &SearchParams) -> Result<SearchPage> {
        (**self).fetch_page(params).await
    }
}

#[async_trait]
impl<T: DetailSource + ?Sized> DetailSource for Arc<T> {
    async fn fetch_details(&self, stub: &ResultStub) -> Result<VideoRecord> {
        (**self).fetch_details(stub).await
    }
}
