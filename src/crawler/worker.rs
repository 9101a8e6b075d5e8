//! Download workers
//!
//! Workers pull jobs from the download queue and stream each target to disk.
//! Every outcome is logged and the job is always marked processed, so a dead
//! link or a hung server never blocks the poller's drain.

use crate::crawler::context::CrawlContext;
use crate::crawler::fetcher::download_to_file;
use crate::url::resolve_target;
use crate::{HarvestError, Result};
use std::path::PathBuf;

/// A single file to download
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadJob {
    /// Where to write the body (the extension may be switched to `.pdf`)
    pub destination: PathBuf,

    /// Absolute URL, or a link relative to the aggregator's home page
    pub url: String,
}

/// What happened to a download job
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    /// Body written to the given path
    Saved(PathBuf),
    /// The request did not finish within the timeout
    TimedOut,
    /// Any other failure (bad URL, network, HTTP status, filesystem)
    Failed,
}

#[derive(Clone)]
pub struct DownloadWorker {
    ctx: CrawlContext,
}

impl DownloadWorker {
    pub fn new(ctx: CrawlContext) -> Self {
        Self { ctx }
    }

    /// Downloads jobs until the download queue closes
    pub async fn run(self) {
        while let Some(job) = self.ctx.downloads.get().await {
            self.download(&job).await;
        }
    }

    /// Downloads one job and records the outcome
    pub async fn download(&self, job: &DownloadJob) -> DownloadOutcome {
        match self.fetch(job).await {
            Ok(path) => {
                tracing::info!("SUCCESS LINK {} -> {}", job.url, path.display());
                self.ctx.stats.record_download_success();
                DownloadOutcome::Saved(path)
            }
            Err(e) if e.is_timeout() => {
                tracing::warn!("EXCEPTION timeout error for {}", job.url);
                self.ctx.stats.record_download_timeout();
                DownloadOutcome::TimedOut
            }
            Err(HarvestError::Url(e)) => {
                tracing::error!("EXCEPTION invalid link {}: {}", job.url, e);
                self.ctx.stats.record_download_failure();
                DownloadOutcome::Failed
            }
            Err(e) => {
                tracing::error!("EXCEPTION unknown error for {}: {}", job.url, e);
                self.ctx.stats.record_download_failure();
                DownloadOutcome::Failed
            }
        }
    }

    async fn fetch(&self, job: &DownloadJob) -> Result<PathBuf> {
        let url = resolve_target(&job.url, &self.ctx.home_page)?;
        download_to_file(&self.ctx.client, &url, &job.destination).await
    }
}
