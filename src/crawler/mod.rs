//! Crawler module for the discovery and download pipeline
//!
//! This module contains the core crawling logic, including:
//! - The discovery poller and its recently-seen window
//! - Story dispatchers fanning discussion pages out into downloads
//! - Download workers streaming pages to disk
//! - The rate limiter and completion-tracked queues connecting them

mod context;
mod coordinator;
mod dispatcher;
mod extractor;
mod fetcher;
mod poller;
mod queue;
mod rate_limiter;
mod stats;
mod worker;

pub use context::CrawlContext;
pub use coordinator::{run_crawl, Coordinator};
pub use dispatcher::Dispatcher;
pub use extractor::{HnExtractor, PageExtractor, Story};
pub use fetcher::{build_http_client, download_to_file, fetch_page, FetchResult};
pub use poller::Poller;
pub use queue::{Claimed, WorkQueue};
pub use rate_limiter::RateLimiter;
pub use stats::{HarvestStats, StatsSnapshot};
pub use worker::{DownloadJob, DownloadOutcome, DownloadWorker};

use crate::config::Config;
use crate::HarvestError;

/// Runs the crawler forever
///
/// This is the main entry point. It will:
/// 1. Build the HTTP client, rate limiter and queues
/// 2. Spawn the dispatcher and download worker pools
/// 3. Poll the home page every refresh interval, dispatching new stories
pub async fn crawl(config: Config) -> Result<(), HarvestError> {
    run_crawl(config).await
}
