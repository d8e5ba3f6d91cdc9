//! Record and page type definitions

use serde::{Deserialize, Serialize};

/// A single collected video, fully populated at enrichment time
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoRecord {
    /// Platform video identifier
    pub video_id: String,
    /// Video title
    pub title: String,
    /// Full description text
    pub description: String,
    /// Channel display name
    pub channel: String,
    /// Publication timestamp as the platform encodes it (RFC 3339)
    pub published_at: String,
    /// View count, 0 when hidden or omitted
    pub view_count: u64,
    /// Like count, 0 when hidden or omitted
    pub like_count: u64,
    /// Comment count, 0 when disabled or omitted
    pub comment_count: u64,
    /// Duration as the platform encodes it (ISO 8601, e.g. `PT4M13S`)
    pub duration: String,
}

impl VideoRecord {
    /// Create a record with only the identifier set
    pub fn new(video_id: impl Into<String>) -> Self {
        Self {
            video_id: video_id.into(),
            ..Default::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }
}

/// A search hit, only good for requesting full details
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultStub {
    /// Platform video identifier
    pub video_id: String,
    /// Snippet title, used for logging only
    pub title: Option<String>,
}

impl ResultStub {
    pub fn new(video_id: impl Into<String>) -> Self {
        Self {
            video_id: video_id.into(),
            title: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

/// Opaque continuation token returned by the search endpoint
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PageCursor(String);

impl PageCursor {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Build a cursor from an optional API token; empty tokens mean "no more pages"
    pub fn from_token(token: Option<String>) -> Option<Self> {
        token.filter(|t| !t.is_empty()).map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// One page of search results
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchPage {
    /// Stubs in the order the API ranked them
    pub stubs: Vec<ResultStub>,
    /// Token for the next page, `None` on the last page
    pub next_cursor: Option<PageCursor>,
}

impl SearchPage {
    pub fn new(stubs: Vec<ResultStub>, next_cursor: Option<PageCursor>) -> Self {
        Self { stubs, next_cursor }
    }

    pub fn is_last(&self) -> bool {
        self.next_cursor.is_none()
    }

    pub fn len(&self) -> usize {
        self.stubs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stubs.is_empty()
    }
}
