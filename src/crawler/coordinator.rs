//! Crawler coordinator - lifecycle glue
//!
//! This module wires the crawl pipeline together:
//! - Building the shared client, rate limiter, queues and extractor
//! - Spawning the dispatcher and download worker pools
//! - Restarting a pool member that panics
//! - Driving the discovery poller forever

use crate::config::Config;
use crate::crawler::context::CrawlContext;
use crate::crawler::dispatcher::Dispatcher;
use crate::crawler::extractor::{HnExtractor, PageExtractor};
use crate::crawler::poller::Poller;
use crate::crawler::stats::StatsSnapshot;
use crate::crawler::worker::DownloadWorker;
use crate::state::RecentlySeen;
use crate::HarvestError;
use std::future::Future;
use std::sync::Arc;
use tokio::task::{AbortHandle, JoinSet};

/// Main crawler coordinator structure
pub struct Coordinator {
    config: Arc<Config>,
    ctx: CrawlContext,
    poller: Poller,
}

impl Coordinator {
    /// Creates a coordinator using the Hacker News extractor
    pub fn new(config: Config) -> Result<Self, HarvestError> {
        Self::with_extractor(config, Arc::new(HnExtractor::new()))
    }

    /// Creates a coordinator with a custom page-structure extractor
    pub fn with_extractor(
        config: Config,
        extractor: Arc<dyn PageExtractor>,
    ) -> Result<Self, HarvestError> {
        let ctx = CrawlContext::new(&config, extractor)?;
        let poller = Poller::new(
            ctx.clone(),
            config.crawler.seen_capacity,
            config.crawler.refresh_interval(),
        );

        Ok(Self {
            config: Arc::new(config),
            ctx,
            poller,
        })
    }

    /// Spawns the dispatcher and download worker pools
    ///
    /// Each pool member runs under a supervisor that restarts it after a panic.
    /// Dropping the returned set stops every member.
    pub fn spawn_pipeline(&self) -> JoinSet<()> {
        let mut tasks = JoinSet::new();

        for index in 0..self.config.crawler.parsers {
            let dispatcher = Dispatcher::new(self.ctx.clone());
            spawn_supervised(&mut tasks, "dispatcher", index, move || {
                dispatcher.clone().run()
            });
        }

        for index in 0..self.config.crawler.downloaders {
            let worker = DownloadWorker::new(self.ctx.clone());
            spawn_supervised(&mut tasks, "downloader", index, move || worker.clone().run());
        }

        tracing::info!(
            "Started {} dispatchers and {} download workers",
            self.config.crawler.parsers,
            self.config.crawler.downloaders
        );
        tasks
    }

    /// Runs a single discovery cycle and waits for all of its work to drain
    ///
    /// Requires the pipeline to be running (see [`Coordinator::spawn_pipeline`]).
    pub async fn run_cycle(&mut self) -> usize {
        self.poller.run_cycle().await
    }

    /// Runs the crawler until the process is terminated
    pub async fn run(self) -> Result<(), HarvestError> {
        tracing::info!(
            "Start crawler of {} into {}",
            self.ctx.home_page,
            self.ctx.base_dir.display()
        );

        let _pipeline = self.spawn_pipeline();
        self.poller.run().await;
        Ok(())
    }

    pub fn recently_seen(&self) -> &RecentlySeen {
        self.poller.recently_seen()
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.ctx.stats.snapshot()
    }

    pub fn context(&self) -> &CrawlContext {
        &self.ctx
    }
}

/// Aborts the wrapped task when dropped
struct AbortOnDrop(AbortHandle);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        self.0.abort();
    }
}

fn spawn_supervised<F, Fut>(tasks: &mut JoinSet<()>, role: &'static str, index: usize, make: F)
where
    F: Fn() -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    tasks.spawn(async move {
        loop {
            let handle = tokio::spawn(make());
            let _guard = AbortOnDrop(handle.abort_handle());

            match handle.await {
                Ok(()) => {
                    tracing::warn!("{} {} stopped: its queue was closed", role, index);
                    return;
                }
                Err(e) if e.is_panic() => {
                    tracing::error!("{} {} panicked, restarting", role, index);
                }
                Err(_) => return,
            }
        }
    });
}

/// Runs the main crawl operation
///
/// # Example
///
/// ```no_run
/// use hn_harvester::config::Config;
/// use hn_harvester::crawler::run_crawl;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// run_crawl(Config::default()).await?;
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(config: Config) -> Result<(), HarvestError> {
    Coordinator::new(config)?.run().await
}
