//! Handles shared by the poller, dispatchers and download workers

use crate::config::Config;
use crate::crawler::extractor::{PageExtractor, Story};
use crate::crawler::fetcher::build_http_client;
use crate::crawler::queue::WorkQueue;
use crate::crawler::rate_limiter::RateLimiter;
use crate::crawler::stats::HarvestStats;
use crate::crawler::worker::DownloadJob;
use crate::HarvestError;
use reqwest::Client;
use std::path::PathBuf;
use std::sync::Arc;
use url::Url;

/// Everything a crawl task needs; cloning is cheap
#[derive(Clone)]
pub struct CrawlContext {
    /// HTTP client with the configured timeout
    pub client: Client,

    /// Aggregator home page; base for discussion pages and relative links
    pub home_page: Url,

    /// Directory under which story directories are created
    pub base_dir: PathBuf,

    /// Gate for requests to the aggregator's own pages
    pub limiter: Arc<RateLimiter>,

    pub extractor: Arc<dyn PageExtractor>,

    /// Poller -> dispatchers
    pub stories: WorkQueue<Story>,

    /// Dispatchers -> download workers
    pub downloads: WorkQueue<DownloadJob>,

    pub stats: Arc<HarvestStats>,
}

impl CrawlContext {
    /// Builds a context from configuration with empty queues
    pub fn new(config: &Config, extractor: Arc<dyn PageExtractor>) -> Result<Self, HarvestError> {
        Ok(Self {
            client: build_http_client(&config.crawler)?,
            home_page: Url::parse(&config.site.home_page)?,
            base_dir: config.output.base_dir.clone(),
            limiter: Arc::new(RateLimiter::new(config.crawler.requests_per_second)),
            extractor,
            stories: WorkQueue::new(),
            downloads: WorkQueue::new(),
            stats: Arc::new(HarvestStats::new()),
        })
    }
}
