//! YouTube Data API v3 client
//!
//! Search goes through `search.list` restricted to videos; enrichment goes
//! through `videos.list` with the snippet, statistics and contentDetails parts.

use super::error::{ApiError, Error, Result};
use super::traits::*;
use crate::config::ApiSettings;
use crate::network::HttpClient;
use crate::results::{PageCursor, ResultStub, SearchPage, VideoRecord};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Deserialize;
use tracing::{debug, warn};

/// Request building and response parsing for the Data API
#[derive(Debug, Clone)]
pub struct YouTubeApi {
    base_url: String,
    api_key: String,
    order: String,
    published_after: DateTime<Utc>,
}

impl YouTubeApi {
    pub fn new(settings: &ApiSettings) -> Result<Self> {
        let base = url::Url::parse(&settings.base_url).map_err(|e| {
            Error::InvalidRequest(format!("bad API base url {}: {}", settings.base_url, e))
        })?;

        Ok(Self {
            base_url: base.as_str().trim_end_matches('/').to_string(),
            api_key: settings.api_key.clone().unwrap_or_default(),
            order: settings.order.clone(),
            published_after: settings.published_after,
        })
    }

    /// Build the `search.list` request for one page
    pub fn search_request(&self, params: &SearchParams) -> Result<ApiRequest> {
        params.validate()?;

        let mut request = ApiRequest::get(format!("{}/search", self.base_url))
            .param("part", "snippet")
            .param("q", params.query.as_str())
            .param("type", "video")
            .param("order", self.order.as_str())
            .param(
                "publishedAfter",
                self.published_after
                    .to_rfc3339_opts(SecondsFormat::Secs, true),
            )
            .param("maxResults", params.page_size.to_string());

        if let Some(ref cursor) = params.cursor {
            request = request.param("pageToken", cursor.as_str());
        }

        Ok(request.param("key", self.api_key.as_str()))
    }

    /// Parse a `search.list` response into a page of stubs
    pub fn parse_search(&self, response: ApiResponse) -> Result<SearchPage> {
        let response = response.error_for_status()?;
        let body: SearchListResponse = response.json()?;

        let mut stubs = Vec::with_capacity(body.items.len());
        for item in body.items {
            let video_id = match item.id.video_id {
                Some(id) if !id.is_empty() => id,
                _ => {
                    warn!("Skipping search item without a video id: {:?}", item.id.kind);
                    continue;
                }
            };

            let mut stub = ResultStub::new(video_id);
            if let Some(title) = item.snippet.and_then(|s| s.title) {
                stub = stub.with_title(title);
            }
            stubs.push(stub);
        }

        Ok(SearchPage::new(
            stubs,
            PageCursor::from_token(body.next_page_token),
        ))
    }

    /// Build the `videos.list` request for one video
    pub fn details_request(&self, video_id: &str) -> Result<ApiRequest> {
        if video_id.is_empty() {
            return Err(Error::InvalidRequest("video id must not be empty".to_string()));
        }

        Ok(ApiRequest::get(format!("{}/videos", self.base_url))
            .param("part", "snippet,statistics,contentDetails")
            .param("id", video_id)
            .param("key", self.api_key.as_str()))
    }

    /// Parse a `videos.list` response into a record
    pub fn parse_details(&self, video_id: &str, response: ApiResponse) -> Result<VideoRecord> {
        let response = response.error_for_status()?;
        let body: VideoListResponse = response.json()?;

        let item = body
            .items
            .into_iter()
            .next()
            .ok_or_else(|| ApiError::NotFound(video_id.to_string()))?;

        Ok(item.into_record(video_id))
    }
}

/// `YouTubeApi` bound to an HTTP client; the collector's page and detail source
#[derive(Clone)]
pub struct YouTubeClient {
    api: YouTubeApi,
    http: HttpClient,
}

impl YouTubeClient {
    pub fn new(api: YouTubeApi, http: HttpClient) -> Self {
        Self { api, http }
    }
}

#[async_trait]
impl PageSource for YouTubeClient {
    async fn fetch_page(&self, params: &SearchParams) -> Result<SearchPage> {
        let request = self.api.search_request(params)?;
        let response = self.http.execute(request).await?;
        let page = self.api.parse_search(response)?;

        debug!(
            "Search '{}' returned {} stubs (last page: {})",
            params.query,
            page.len(),
            page.is_last()
        );
        Ok(page)
    }
}

#[async_trait]
impl DetailSource for YouTubeClient {
    async fn fetch_details(&self, stub: &ResultStub) -> Result<VideoRecord> {
        let request = self.api.details_request(&stub.video_id)?;
        let response = self.http.execute(request).await?;
        self.api.parse_details(&stub.video_id, response)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchListResponse {
    items: Vec<SearchItem>,
    #[serde(default)]
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    id: SearchItemId,
    #[serde(default)]
    snippet: Option<SearchSnippet>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchItemId {
    #[serde(default)]
    kind: Option<String>,
    #[serde(default)]
    video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchSnippet {
    #[serde(default)]
    title: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VideoListResponse {
    items: Vec<VideoItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoItem {
    #[serde(default)]
    snippet: VideoSnippet,
    #[serde(default)]
    statistics: VideoStatistics,
    #[serde(default)]
    content_details: ContentDetails,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct VideoSnippet {
    title: String,
    description: String,
    channel_title: String,
    published_at: String,
}

/// Statistics arrive as decimal strings; any of them may be hidden
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct VideoStatistics {
    view_count: Option<Count>,
    like_count: Option<Count>,
    comment_count: Option<Count>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ContentDetails {
    duration: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Count {
    Number(u64),
    Text(String),
}

/// Missing or unparseable counts become 0
fn normalize_count(count: Option<Count>) -> u64 {
    match count {
        Some(Count::Number(n)) => n,
        Some(Count::Text(s)) => s.trim().parse().unwrap_or(0),
        None => 0,
    }
}

impl VideoItem {
    fn into_record(self, video_id: &str) -> VideoRecord {
        VideoRecord {
            video_id: video_id.to_string(),
            title: self.snippet.title,
            description: self.snippet.description,
            channel: self.snippet.channel_title,
            published_at: self.snippet.published_at,
            view_count: normalize_count(self.statistics.view_count),
            like_count: normalize_count(self.statistics.like_count),
            comment_count: normalize_count(self.statistics.comment_count),
            duration: self.content_details.duration,
        }
    }
}
