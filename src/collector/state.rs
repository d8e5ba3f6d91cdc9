//! Collection state machine
//!
//! `CollectState::advance` is a pure transition function. The executor looks
//! at the current state, performs the one I/O action it calls for, and feeds
//! the outcome back in as an `Event`.

use crate::api::Error;
use crate::config::ItemErrorPolicy;
use crate::results::{PageCursor, ResultStub, SearchPage};
use std::collections::VecDeque;

/// Where a single query's collection currently stands
#[derive(Debug)]
pub enum CollectState {
    /// Request the page at `cursor` (`None` for the first page)
    FetchingPage { cursor: Option<PageCursor> },
    /// Enrich the stubs of the current page, front first
    Enriching {
        pending: VecDeque<ResultStub>,
        next_cursor: Option<PageCursor>,
    },
    /// Wait the inter-page delay before fetching `cursor`
    Paced { cursor: PageCursor },
    /// Finished; the accumulator is truncated to the cap
    Done,
    /// Aborted; no records are returned for this query
    Failed(Error),
}

/// Outcome of the action the executor performed for the current state
#[derive(Debug)]
pub enum Event {
    PageFetched(SearchPage),
    /// The front stub was enriched and its record appended
    ItemEnriched,
    /// Enriching the front stub failed
    ItemFailed(Error),
    /// No stubs left on the current page
    PageExhausted,
    Slept,
    /// A page fetch failed
    Failed(Error),
}

/// Inputs to the transition that live outside the state
#[derive(Debug, Clone, Copy)]
pub struct Progress {
    /// Records accumulated so far, after applying the event
    pub collected: usize,
    pub cap: usize,
    pub on_item_error: ItemErrorPolicy,
}

impl CollectState {
    /// Initial state. The cap is checked before every page, the first included.
    pub fn start(cap: usize) -> Self {
        if cap == 0 {
            CollectState::Done
        } else {
            CollectState::FetchingPage { cursor: None }
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, CollectState::Done | CollectState::Failed(_))
    }

    pub fn name(&self) -> &'static str {
        match self {
            CollectState::FetchingPage { .. } => "fetching_page",
            CollectState::Enriching { .. } => "enriching",
            CollectState::Paced { .. } => "paced",
            CollectState::Done => "done",
            CollectState::Failed(_) => "failed",
        }
    }

    /// Apply one event. Events that do not fit the state leave it unchanged.
    pub fn advance(self, event: Event, progress: &Progress) -> Self {
        match (self, event) {
            (state, _) if state.is_terminal() => state,

            (CollectState::FetchingPage { .. }, Event::PageFetched(page)) => {
                CollectState::Enriching {
                    pending: page.stubs.into(),
                    next_cursor: page.next_cursor,
                }
            }
            (CollectState::FetchingPage { .. }, Event::Failed(e)) => CollectState::Failed(e),

            (
                CollectState::Enriching {
                    mut pending,
                    next_cursor,
                },
                Event::ItemEnriched,
            ) => {
                pending.pop_front();
                CollectState::Enriching {
                    pending,
                    next_cursor,
                }
            }
            (
                CollectState::Enriching {
                    mut pending,
                    next_cursor,
                },
                Event::ItemFailed(e),
            ) => match progress.on_item_error {
                ItemErrorPolicy::Abort => CollectState::Failed(e),
                ItemErrorPolicy::Skip => {
                    pending.pop_front();
                    CollectState::Enriching {
                        pending,
                        next_cursor,
                    }
                }
            },
            (CollectState::Enriching { next_cursor, .. }, Event::PageExhausted) => {
                match next_cursor {
                    None => CollectState::Done,
                    Some(_) if progress.collected >= progress.cap => CollectState::Done,
                    Some(cursor) => CollectState::Paced { cursor },
                }
            }

            (CollectState::Paced { cursor }, Event::Slept) => CollectState::FetchingPage {
                cursor: Some(cursor),
            },

            (state, _) => state,
        }
    }
}
