//! Per-query collection loop

use super::clock::{Clock, TokioClock};
use super::state::{CollectState, Event, Progress};
use crate::api::{DetailSource, PageSource, Result, SearchParams, MAX_PAGE_SIZE};
use crate::config::{secs_to_duration, CollectionSettings, ItemErrorPolicy};
use crate::results::VideoRecord;
use std::time::Duration;
use tracing::{debug, warn};

/// Knobs for a single query's collection
#[derive(Debug, Clone)]
pub struct CollectOptions {
    /// Results requested per search call
    pub page_size: u32,
    /// Courtesy delay between consecutive page fetches
    pub page_delay: Duration,
    /// What to do when one item's details cannot be fetched
    pub on_item_error: ItemErrorPolicy,
}

impl Default for CollectOptions {
    fn default() -> Self {
        Self {
            page_size: MAX_PAGE_SIZE,
            page_delay: Duration::from_secs(1),
            on_item_error: ItemErrorPolicy::Abort,
        }
    }
}

impl CollectOptions {
    pub fn from_settings(settings: &CollectionSettings) -> Self {
        Self {
            page_size: settings.page_size,
            page_delay: secs_to_duration(settings.page_delay_secs).unwrap_or_default(),
            on_item_error: settings.on_item_error,
        }
    }
}

/// Drives paginated search plus per-item enrichment for one query at a time
pub struct Collector<P, D, C = TokioClock> {
    pages: P,
    details: D,
    clock: C,
    options: CollectOptions,
}

impl<P, D> Collector<P, D, TokioClock>
where
    P: PageSource,
    D: DetailSource,
{
    /// Create a collector that paces with real time
    pub fn new(pages: P, details: D, options: CollectOptions) -> Self {
        Self::with_clock(pages, details, TokioClock, options)
    }
}

impl<P, D, C> Collector<P, D, C>
where
    P: PageSource,
    D: DetailSource,
    C: Clock,
{
    pub fn with_clock(pages: P, details: D, clock: C, options: CollectOptions) -> Self {
        Self {
            pages,
            details,
            clock,
            options,
        }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Collect up to `cap` records for `query`, in API ranking order.
    ///
    /// The cap is only checked between pages, so the last page is always
    /// enriched in full and the result is then truncated to `cap`. Any search
    /// error, and any enrichment error under `ItemErrorPolicy::Abort`, fails
    /// the whole query.
    pub async fn collect(&self, query: &str, cap: usize) -> Result<Vec<VideoRecord>> {
        let mut records: Vec<VideoRecord> = Vec::new();
        let mut state = CollectState::start(cap);
        let mut page_count = 0u32;

        while !state.is_terminal() {
            let event = match &state {
                CollectState::FetchingPage { cursor } => {
                    let params = SearchParams::new(query)
                        .with_cursor(cursor.clone())
                        .with_page_size(self.options.page_size);

                    match self.pages.fetch_page(&params).await {
                        Ok(page) => {
                            page_count += 1;
                            debug!(
                                "Query '{}' page {}: {} stubs",
                                query,
                                page_count,
                                page.len()
                            );
                            Event::PageFetched(page)
                        }
                        Err(e) => Event::Failed(e),
                    }
                }
                CollectState::Enriching { pending, .. } => match pending.front() {
                    Some(stub) => match self.details.fetch_details(stub).await {
                        Ok(record) => {
                            records.push(record);
                            Event::ItemEnriched
                        }
                        Err(e) => {
                            if self.options.on_item_error == ItemErrorPolicy::Skip {
                                warn!("Skipping video {} for '{}': {}", stub.video_id, query, e);
                            }
                            Event::ItemFailed(e)
                        }
                    },
                    None => Event::PageExhausted,
                },
                CollectState::Paced { .. } => {
                    self.clock.sleep(self.options.page_delay).await;
                    Event::Slept
                }
                CollectState::Done | CollectState::Failed(_) => break,
            };

            let progress = Progress {
                collected: records.len(),
                cap,
                on_item_error: self.options.on_item_error,
            };
            state = state.advance(event, &progress);
        }

        match state {
            CollectState::Failed(e) => Err(e),
            _ => {
                if records.len() > cap {
                    debug!(
                        "Query '{}' overshot cap by {}, truncating",
                        query,
                        records.len() - cap
                    );
                }
                records.truncate(cap);
                Ok(records)
            }
        }
    }
}
