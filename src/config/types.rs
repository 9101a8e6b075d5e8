use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration structure for HN-Harvester
///
/// Every section and key has a default, so an empty file (or no file at all)
/// yields a working configuration aimed at news.ycombinator.com.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crawler: CrawlerConfig,
    pub site: SiteConfig,
    pub output: OutputConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Number of concurrent story dispatchers
    pub parsers: usize,

    /// Number of concurrent download workers
    pub downloaders: usize,

    /// Per-request timeout (seconds)
    pub timeout: u64,

    /// Pause between discovery cycles (seconds)
    #[serde(rename = "refresh-interval")]
    pub refresh_interval: u64,

    /// Request ceiling for the aggregator's own pages
    #[serde(rename = "requests-per-second")]
    pub requests_per_second: u32,

    /// How many recently seen story titles are remembered
    #[serde(rename = "seen-capacity")]
    pub seen_capacity: usize,

    /// User-Agent header sent with every request
    #[serde(rename = "user-agent")]
    pub user_agent: String,
}

impl CrawlerConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval)
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            parsers: 3,
            downloaders: 5,
            timeout: 30,
            refresh_interval: 60,
            requests_per_second: 3,
            seen_capacity: 30,
            user_agent: format!("hn-harvester/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// The aggregator being crawled
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Home page URL; discussion pages and relative links resolve against it
    #[serde(rename = "home-page")]
    pub home_page: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            home_page: "https://news.ycombinator.com/".to_string(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory under which one folder per story is created
    #[serde(rename = "base-dir")]
    pub base_dir: PathBuf,

    /// Optional log file; logs go to stderr when unset
    #[serde(rename = "log-file")]
    pub log_file: Option<PathBuf>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from("download"),
            log_file: None,
        }
    }
}
