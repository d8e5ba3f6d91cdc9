//! Settings structures for video-collector configuration

use crate::api::MAX_PAGE_SIZE;
use anyhow::{bail, Result};
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

/// Main settings structure, loaded from `settings.yml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub api: ApiSettings,
    pub collection: CollectionSettings,
    pub retry: RetrySettings,
    pub outgoing: OutgoingSettings,
    pub output: OutputSettings,
    /// Search queries, collected in this order
    pub queries: Vec<String>,
}

impl Settings {
    /// Load settings from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        let settings: Settings = serde_yaml::from_str(content)?;
        Ok(settings)
    }

    /// Merge with environment variables
    pub fn merge_env(&mut self) {
        self.merge_vars(|name| std::env::var(name).ok());
    }

    /// Apply overrides from `lookup`; a value that does not parse is logged and ignored
    fn merge_vars(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(val) = lookup("YOUTUBE_API_KEY") {
            if !val.is_empty() {
                self.api.api_key = Some(val);
            }
        }
        if let Some(val) = lookup("VIDEO_COLLECTOR_OUTPUT") {
            self.output.path = PathBuf::from(val);
        }
        if let Some(val) = lookup("VIDEO_COLLECTOR_MAX_RESULTS") {
            match val.parse() {
                Ok(max) => self.collection.max_results_per_query = max,
                Err(_) => warn!(
                    "Ignoring VIDEO_COLLECTOR_MAX_RESULTS={:?}: not a non-negative integer",
                    val
                ),
            }
        }
    }

    /// Check everything the API or the collector would otherwise reject later
    pub fn validate(&self) -> Result<()> {
        if self.api.api_key.as_deref().map_or(true, str::is_empty) {
            bail!("no API key configured (set api.api_key or YOUTUBE_API_KEY)");
        }
        if self.queries.is_empty() {
            bail!("no queries configured");
        }
        if let Some(empty) = self.queries.iter().position(|q| q.trim().is_empty()) {
            bail!("query #{} is empty", empty + 1);
        }
        let page_size = self.collection.page_size;
        if page_size == 0 || page_size > MAX_PAGE_SIZE {
            bail!(
                "collection.page_size must be within 1..={}, got {}",
                MAX_PAGE_SIZE,
                page_size
            );
        }
        for (name, secs) in [
            ("collection.page_delay_secs", self.collection.page_delay_secs),
            ("collection.query_delay_secs", self.collection.query_delay_secs),
            ("retry.delay_secs", self.retry.delay_secs),
        ] {
            if secs_to_duration(secs).is_none() {
                bail!("{} must be a finite number of seconds >= 0, got {}", name, secs);
            }
        }
        if secs_to_duration(self.outgoing.request_timeout).map_or(true, |d| d.is_zero()) {
            bail!(
                "outgoing.request_timeout must be a finite number of seconds > 0, got {}",
                self.outgoing.request_timeout
            );
        }
        Ok(())
    }
}

/// Seconds from configuration as a `Duration`; `None` for negative, NaN or infinite values
pub fn secs_to_duration(secs: f64) -> Option<Duration> {
    Duration::try_from_secs_f64(secs).ok()
}

/// Remote API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
    /// Data API key
    pub api_key: Option<String>,
    /// API root, without the trailing resource name
    pub base_url: String,
    /// Result ordering passed to search (`viewCount`, `relevance`, `date`, ...)
    pub order: String,
    /// Only videos published at or after this instant are searched
    pub published_after: DateTime<Utc>,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://www.googleapis.com/youtube/v3".to_string(),
            order: "viewCount".to_string(),
            published_after: default_published_after(),
        }
    }
}

fn default_published_after() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2023, 10, 7, 0, 0, 0)
        .single()
        .unwrap_or_default()
}

/// Collection loop settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectionSettings {
    /// Cap on records contributed by a single query
    pub max_results_per_query: usize,
    /// Results per search call (API maximum is 50)
    pub page_size: u32,
    /// Delay between page fetches of one query, in seconds
    pub page_delay_secs: f64,
    /// Delay between queries, in seconds
    pub query_delay_secs: f64,
    pub on_item_error: ItemErrorPolicy,
    pub on_query_error: QueryErrorPolicy,
}

impl Default for CollectionSettings {
    fn default() -> Self {
        Self {
            max_results_per_query: 50,
            page_size: MAX_PAGE_SIZE,
            page_delay_secs: 1.0,
            query_delay_secs: 2.0,
            on_item_error: ItemErrorPolicy::default(),
            on_query_error: QueryErrorPolicy::default(),
        }
    }
}

/// Handling of a failed details lookup inside a query
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemErrorPolicy {
    /// Fail the whole query
    #[default]
    Abort,
    /// Drop the item and keep going
    Skip,
}

/// Handling of a failed query inside a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryErrorPolicy {
    /// Fail the whole run
    #[default]
    Abort,
    /// Log it and move on to the next query
    Skip,
}

/// Retry decorator settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    /// Total attempts per call; 1 means no retry
    pub max_attempts: u32,
    pub delay_secs: f64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: 1,
            delay_secs: 2.0,
        }
    }
}

/// Outgoing request settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutgoingSettings {
    /// Request timeout in seconds
    pub request_timeout: f64,
    /// User agent string (none = crate default)
    pub user_agent: Option<String>,
    /// Verify SSL certificates
    pub verify_ssl: bool,
    /// Proxy settings
    pub proxies: ProxySettings,
}

impl Default for OutgoingSettings {
    fn default() -> Self {
        Self {
            request_timeout: 30.0,
            user_agent: None,
            verify_ssl: true,
            proxies: ProxySettings::default(),
        }
    }
}

/// Proxy settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxySettings {
    pub http: Option<String>,
    pub https: Option<String>,
    pub all: Option<String>,
}

/// Where the aggregate is written
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    pub path: PathBuf,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            path: PathBuf::from("videos.json"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> Settings {
        Settings {
            api: ApiSettings {
                api_key: Some("key".to_string()),
                ..Default::default()
            },
            queries: vec!["Gaza war".to_string()],
            ..Default::default()
        }
    }

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.collection.max_results_per_query, 50);
        assert_eq!(settings.collection.page_size, 50);
        assert_eq!(settings.api.order, "viewCount");
        assert_eq!(
            settings.api.published_after.to_rfc3339(),
            "2023-10-07T00:00:00+00:00"
        );
        assert_eq!(settings.collection.on_item_error, ItemErrorPolicy::Abort);
        assert!(settings.queries.is_empty());
    }

    #[test]
    fn test_from_yaml() {
        let yaml = r#"
api:
  api_key: abc
  published_after: "2024-01-01T00:00:00Z"
collection:
  max_results_per_query: 200
  page_delay_secs: 0.5
  on_item_error: skip
  on_query_error: skip
queries:
  - "Gaza war"
  - "غزة"
  - "guerra de Gaza"
"#;
        let settings = Settings::from_yaml(yaml).unwrap();
        assert_eq!(settings.api.api_key.as_deref(), Some("abc"));
        assert_eq!(settings.api.published_after.to_rfc3339(), "2024-01-01T00:00:00+00:00");
        assert_eq!(settings.collection.max_results_per_query, 200);
        assert_eq!(settings.collection.page_size, 50);
        assert_eq!(settings.collection.on_item_error, ItemErrorPolicy::Skip);
        assert_eq!(settings.collection.on_query_error, QueryErrorPolicy::Skip);
        assert_eq!(settings.queries[1], "غزة");
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_validate_requires_key_and_queries() {
        let mut settings = valid();
        settings.api.api_key = None;
        assert!(settings.validate().is_err());

        let mut settings = valid();
        settings.queries.clear();
        assert!(settings.validate().is_err());

        let mut settings = valid();
        settings.queries.push("   ".to_string());
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_unusable_delays() {
        for bad in [f64::INFINITY, f64::NAN, -1.0] {
            let mut settings = valid();
            settings.collection.page_delay_secs = bad;
            assert!(settings.validate().is_err(), "page delay {}", bad);

            let mut settings = valid();
            settings.collection.query_delay_secs = bad;
            assert!(settings.validate().is_err(), "query delay {}", bad);

            let mut settings = valid();
            settings.retry.delay_secs = bad;
            assert!(settings.validate().is_err(), "retry delay {}", bad);
        }

        let mut settings = valid();
        settings.collection.page_delay_secs = 0.0;
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_unusable_timeout() {
        for bad in [0.0, -1.0, f64::INFINITY, f64::NAN] {
            let mut settings = valid();
            settings.outgoing.request_timeout = bad;
            assert!(settings.validate().is_err(), "timeout {}", bad);
        }
    }

    #[test]
    fn test_infinite_delay_from_yaml_rejected() {
        let yaml = r#"
api:
  api_key: abc
collection:
  page_delay_secs: .inf
queries: ["Gaza war"]
"#;
        let settings = Settings::from_yaml(yaml).unwrap();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_secs_to_duration() {
        assert_eq!(secs_to_duration(1.5), Some(Duration::from_millis(1500)));
        assert_eq!(secs_to_duration(-0.1), None);
        assert_eq!(secs_to_duration(f64::INFINITY), None);
        assert_eq!(secs_to_duration(f64::NAN), None);
    }

    #[test]
    fn test_env_overrides() {
        let mut settings = Settings::default();
        settings.merge_vars(|name| match name {
            "YOUTUBE_API_KEY" => Some("from-env".to_string()),
            "VIDEO_COLLECTOR_MAX_RESULTS" => Some("120".to_string()),
            _ => None,
        });
        assert_eq!(settings.api.api_key.as_deref(), Some("from-env"));
        assert_eq!(settings.collection.max_results_per_query, 120);
        assert_eq!(settings.output.path, PathBuf::from("videos.json"));
    }

    #[test]
    fn test_unparseable_max_results_keeps_configured_cap() {
        let mut settings = Settings::default();
        settings.collection.max_results_per_query = 75;
        for bad in ["lots", "-5", "1.5", ""] {
            settings.merge_vars(|name| {
                (name == "VIDEO_COLLECTOR_MAX_RESULTS").then(|| bad.to_string())
            });
            assert_eq!(settings.collection.max_results_per_query, 75, "value {:?}", bad);
        }
    }

    #[test]
    fn test_empty_api_key_env_ignored() {
        let mut settings = valid();
        settings.merge_vars(|name| (name == "YOUTUBE_API_KEY").then(String::new));
        assert_eq!(settings.api.api_key.as_deref(), Some("key"));
    }

    #[test]
    fn test_validate_page_size() {
        let mut settings = valid();
        settings.collection.page_size = 51;
        assert!(settings.validate().is_err());

        settings.collection.page_size = 0;
        assert!(settings.validate().is_err());

        settings.collection.page_size = 25;
        assert!(settings.validate().is_ok());
    }
}
