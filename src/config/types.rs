use clap::ValueEnum;
use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for sitemapper
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub http: HttpConfig,
}

/// How the crawl decides it is finished
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum TerminationStrategy {
    /// Count queued URLs and stop when none are outstanding
    #[default]
    OutstandingWork,

    /// Stop once every worker has reported idle for the debounce interval
    Debounce,
}

/// Crawl engine configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Number of fetch workers
    #[serde(rename = "fetch-workers")]
    pub fetch_workers: usize,

    /// Number of index workers
    #[serde(rename = "index-workers")]
    pub index_workers: usize,

    /// Fetched pages that may wait for indexing before fetch workers block
    #[serde(rename = "page-queue-capacity")]
    pub page_queue_capacity: usize,

    /// Termination detection strategy
    pub termination: TerminationStrategy,

    /// How long every worker must stay idle before a debounce crawl ends (milliseconds)
    #[serde(rename = "debounce-ms")]
    pub debounce_ms: u64,

    /// Period of the debounce monitor's status check (milliseconds)
    #[serde(rename = "monitor-tick-ms")]
    pub monitor_tick_ms: u64,
}

impl CrawlerConfig {
    pub fn debounce_interval(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn monitor_tick(&self) -> Duration {
        Duration::from_millis(self.monitor_tick_ms)
    }

    /// Total number of workers the monitor expects to hear from
    pub fn total_workers(&self) -> usize {
        self.fetch_workers + self.index_workers
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            fetch_workers: 10,
            index_workers: 10,
            page_queue_capacity: 400,
            termination: TerminationStrategy::OutstandingWork,
            debounce_ms: 2000,
            monitor_tick_ms: 10,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: Option<String>,
}

impl UserAgentConfig {
    /// Formats the User-Agent header: `Name/Version (+ContactURL)`
    pub fn header_value(&self) -> String {
        match &self.contact_url {
            Some(contact) => format!(
                "{}/{} (+{})",
                self.crawler_name, self.crawler_version, contact
            ),
            None => format!("{}/{}", self.crawler_name, self.crawler_version),
        }
    }
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "sitemapper".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: None,
        }
    }
}

/// HTTP client configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Whole-request timeout (seconds)
    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,

    /// Connection timeout (seconds)
    #[serde(rename = "connect-timeout-secs")]
    pub connect_timeout_secs: u64,

    /// Redirects followed before a fetch fails
    #[serde(rename = "max-redirects")]
    pub max_redirects: usize,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            connect_timeout_secs: 10,
            max_redirects: 10,
        }
    }
}
