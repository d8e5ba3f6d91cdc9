//! video-collector: collects video metadata for a list of search queries
//!
//! This is the main entry point for the application.

use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;
use video_collector::{
    api::{RetryPolicy, Retrying, YouTubeApi, YouTubeClient},
    collector::{CollectOptions, Collector, Harvest},
    config,
    network::HttpClient,
    output,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    info!("Starting video-collector v{}", video_collector::VERSION);

    let settings = config::load()?;
    settings.validate()?;
    info!(
        "{} queries, up to {} videos each",
        settings.queries.len(),
        settings.collection.max_results_per_query
    );

    // One client for the whole run
    let http = HttpClient::with_settings(&settings.outgoing)?;
    let client = YouTubeClient::new(YouTubeApi::new(&settings.api)?, http);

    let policy = RetryPolicy::from_settings(&settings.retry);
    if policy.is_enabled() {
        info!("Retrying transient API errors up to {} attempts", policy.max_attempts);
    }
    let source = Retrying::new(client, policy);

    let collector = Collector::new(
        &source,
        &source,
        CollectOptions::from_settings(&settings.collection),
    );
    let harvest = Harvest::new(collector, &settings.collection);

    let result = harvest.run(settings.queries.as_slice()).await?;
    for report in result.skipped() {
        info!("Skipped '{}'", report.query);
    }

    output::write_json(&settings.output.path, &result.records)?;

    info!(
        "Collected {} videos → {}",
        result.records.len(),
        settings.output.path.display()
    );
    Ok(())
}
