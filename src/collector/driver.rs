//! Multi-query driver
//!
//! Runs the collector over each query in list order, one at a time, and
//! concatenates the results.

use super::clock::Clock;
use super::executor::Collector;
use crate::api::{DetailSource, PageSource, Result};
use crate::config::{secs_to_duration, CollectionSettings, QueryErrorPolicy};
use crate::results::VideoRecord;
use std::time::Duration;
use tracing::{error, info, warn};

/// What happened to one query
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryOutcome {
    Collected(usize),
    /// Failed and skipped under `QueryErrorPolicy::Skip`
    Skipped(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryReport {
    pub query: String,
    pub outcome: QueryOutcome,
}

/// Aggregate of a whole run
#[derive(Debug, Default)]
pub struct HarvestResult {
    /// Records from every query, in query-list order, not deduplicated
    pub records: Vec<VideoRecord>,
    pub reports: Vec<QueryReport>,
}

impl HarvestResult {
    pub fn skipped(&self) -> impl Iterator<Item = &QueryReport> {
        self.reports
            .iter()
            .filter(|r| matches!(r.outcome, QueryOutcome::Skipped(_)))
    }
}

pub struct Harvest<P, D, C> {
    collector: Collector<P, D, C>,
    max_results_per_query: usize,
    query_delay: Duration,
    on_query_error: QueryErrorPolicy,
}

impl<P, D, C> Harvest<P, D, C>
where
    P: PageSource,
    D: DetailSource,
    C: Clock,
{
    pub fn new(collector: Collector<P, D, C>, settings: &CollectionSettings) -> Self {
        Self {
            collector,
            max_results_per_query: settings.max_results_per_query,
            query_delay: secs_to_duration(settings.query_delay_secs).unwrap_or_default(),
            on_query_error: settings.on_query_error,
        }
    }

    /// Collect every query in order, pausing `query_delay` between queries.
    ///
    /// Under `QueryErrorPolicy::Abort` the first failing query fails the run.
    pub async fn run<S: AsRef<str>>(&self, queries: &[S]) -> Result<HarvestResult> {
        let mut result = HarvestResult::default();

        for (index, query) in queries.iter().enumerate() {
            let query = query.as_ref();
            if index > 0 {
                self.collector.clock().sleep(self.query_delay).await;
            }

            info!("Collecting '{}'...", query);
            match self
                .collector
                .collect(query, self.max_results_per_query)
                .await
            {
                Ok(records) => {
                    info!("Collected {} videos for '{}'", records.len(), query);
                    result.reports.push(QueryReport {
                        query: query.to_string(),
                        outcome: QueryOutcome::Collected(records.len()),
                    });
                    result.records.extend(records);
                }
                Err(e) => match self.on_query_error {
                    QueryErrorPolicy::Abort => {
                        error!("Collection for '{}' failed: {}", query, e);
                        return Err(e);
                    }
                    QueryErrorPolicy::Skip => {
                        warn!("Skipping '{}': {}", query, e);
                        result.reports.push(QueryReport {
                            query: query.to_string(),
                            outcome: QueryOutcome::Skipped(e.to_string()),
                        });
                    }
                },
            }
        }

        info!(
            "Collected {} videos across {} queries",
            result.records.len(),
            queries.len()
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ApiError, Error};
    use crate::collector::testing::{page, ScriptedSource};
    use crate::collector::{CollectOptions, ManualClock};
    use std::sync::Arc;

    fn harvest(
        source: &Arc<ScriptedSource>,
        clock: &Arc<ManualClock>,
        settings: &CollectionSettings,
    ) -> Harvest<Arc<ScriptedSource>, Arc<ScriptedSource>, Arc<ManualClock>> {
        let collector = Collector::with_clock(
            source.clone(),
            source.clone(),
            clock.clone(),
            CollectOptions::from_settings(settings),
        );
        Harvest::new(collector, settings)
    }

    fn settings(cap: usize) -> CollectionSettings {
        CollectionSettings {
            max_results_per_query: cap,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_concatenates_in_query_order_without_dedup() {
        let clock = Arc::new(ManualClock::new());
        let source = Arc::new(
            ScriptedSource::new()
                .with_pages("Gaza war", vec![page("dup", 2, None)])
                .with_pages("غزة", vec![page("dup", 3, None)]),
        );

        let result = harvest(&source, &clock, &settings(50))
            .run(&["Gaza war", "غزة"])
            .await
            .unwrap();

        let ids: Vec<_> = result.records.iter().map(|r| r.video_id.as_str()).collect();
        assert_eq!(ids, vec!["dup0", "dup1", "dup0", "dup1", "dup2"]);
        assert_eq!(
            result.reports[1],
            QueryReport {
                query: "غزة".to_string(),
                outcome: QueryOutcome::Collected(3),
            }
        );
    }

    #[tokio::test]
    async fn test_query_delay_between_queries_only() {
        let clock = Arc::new(ManualClock::new());
        let source = Arc::new(ScriptedSource::new());
        let settings = CollectionSettings {
            query_delay_secs: 2.0,
            ..settings(10)
        };

        harvest(&source, &clock, &settings)
            .run(&["a", "b", "c"])
            .await
            .unwrap();

        assert_eq!(clock.sleeps(), vec![Duration::from_secs(2); 2]);
    }

    #[tokio::test]
    async fn test_abort_policy_fails_run() {
        let clock = Arc::new(ManualClock::new());
        let source = Arc::new(
            ScriptedSource::new()
                .fail_search_after("bad", ApiError::QuotaExceeded("daily".to_string()))
                .with_pages("later", vec![page("x", 1, None)]),
        );

        let err = harvest(&source, &clock, &settings(10))
            .run(&["bad", "later"])
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Api(ApiError::QuotaExceeded(_))));
        assert_eq!(source.search_calls().len(), 1);
    }

    #[tokio::test]
    async fn test_skip_policy_continues() {
        let clock = Arc::new(ManualClock::new());
        let source = Arc::new(
            ScriptedSource::new()
                .with_pages("first", vec![page("f", 2, None)])
                .fail_search_after("bad", ApiError::Malformed("missing items".to_string()))
                .with_pages("last", vec![page("l", 1, None)]),
        );
        let settings = CollectionSettings {
            on_query_error: QueryErrorPolicy::Skip,
            ..settings(10)
        };

        let result = harvest(&source, &clock, &settings)
            .run(&["first", "bad", "last"])
            .await
            .unwrap();

        assert_eq!(result.records.len(), 3);
        let skipped: Vec<_> = result.skipped().map(|r| r.query.as_str()).collect();
        assert_eq!(skipped, vec!["bad"]);
    }

    #[tokio::test]
    async fn test_per_query_cap_applied() {
        let clock = Arc::new(ManualClock::new());
        let source = Arc::new(
            ScriptedSource::new()
                .with_pages("a", vec![page("a", 10, None)])
                .with_pages("b", vec![page("b", 10, None)]),
        );

        let result = harvest(&source, &clock, &settings(4))
            .run(&["a", "b"])
            .await
            .unwrap();

        assert_eq!(result.records.len(), 8);
    }
}
