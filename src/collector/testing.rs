//! In-memory page and detail source for collector tests

use super::clock::{Clock, ManualClock};
use crate::api::{ApiError, DetailSource, Error, PageSource, Result, SearchParams};
use crate::results::{PageCursor, ResultStub, SearchPage, VideoRecord};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Instant;

/// `n` stubs with ids `{prefix}0..{prefix}{n-1}`
pub fn page(prefix: &str, n: usize, next: Option<&str>) -> SearchPage {
    SearchPage::new(
        (0..n)
            .map(|i| ResultStub::new(format!("{}{}", prefix, i)))
            .collect(),
        next.map(PageCursor::new),
    )
}

/// Replays scripted search pages per query; details echo the id
#[derive(Default)]
pub struct ScriptedSource {
    pages: Mutex<HashMap<String, VecDeque<Result<SearchPage>>>>,
    failing_ids: HashSet<String>,
    clock: Option<Arc<ManualClock>>,
    search_calls: Mutex<Vec<SearchParams>>,
    search_times: Mutex<Vec<Instant>>,
    detail_calls: Mutex<Vec<String>>,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pages(self, query: &str, pages: Vec<SearchPage>) -> Self {
        if let Ok(mut map) = self.pages.lock() {
            map.entry(query.to_string())
                .or_default()
                .extend(pages.into_iter().map(Ok));
        }
        self
    }

    /// Queue an error after the pages already scripted for `query`
    pub fn fail_search_after(self, query: &str, error: ApiError) -> Self {
        if let Ok(mut map) = self.pages.lock() {
            map.entry(query.to_string())
                .or_default()
                .push_back(Err(Error::Api(error)));
        }
        self
    }

    pub fn fail_details(mut self, video_id: &str) -> Self {
        self.failing_ids.insert(video_id.to_string());
        self
    }

    /// Stamp each search call with this clock's time
    pub fn with_clock(mut self, clock: Arc<ManualClock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn search_calls(&self) -> Vec<SearchParams> {
        self.search_calls.lock().unwrap().clone()
    }

    pub fn search_times(&self) -> Vec<Instant> {
        self.search_times.lock().unwrap().clone()
    }

    pub fn detail_calls(&self) -> Vec<String> {
        self.detail_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageSource for ScriptedSource {
    async fn fetch_page(&self, params: &SearchParams) -> Result<SearchPage> {
        params.validate()?;
        self.search_calls.lock().unwrap().push(params.clone());
        if let Some(ref clock) = self.clock {
            self.search_times.lock().unwrap().push(clock.now());
        }

        self.pages
            .lock()
            .unwrap()
            .get_mut(&params.query)
            .and_then(|queue| queue.pop_front())
            .unwrap_or_else(|| Ok(SearchPage::default()))
    }
}

#[async_trait]
impl DetailSource for ScriptedSource {
    async fn fetch_details(&self, stub: &ResultStub) -> Result<VideoRecord> {
        self.detail_calls.lock().unwrap().push(stub.video_id.clone());

        if self.failing_ids.contains(&stub.video_id) {
            return Err(Error::Api(ApiError::Status {
                status: 500,
                message: format!("backend error for {}", stub.video_id),
            }));
        }

        Ok(VideoRecord::new(stub.video_id.clone()).with_title(format!("title {}", stub.video_id)))
    }
}
