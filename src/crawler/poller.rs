//! Discovery poller
//!
//! Each cycle fetches the home page, diffs its story titles against the
//! recently-seen window and hands new stories to the dispatchers. The next cycle
//! starts only after every story from this one, including its comment fan-out
//! downloads, has been processed and the refresh interval has elapsed.

use crate::crawler::context::CrawlContext;
use crate::crawler::fetcher::{fetch_page, FetchResult};
use crate::state::RecentlySeen;
use std::time::Duration;

pub struct Poller {
    ctx: CrawlContext,
    seen: RecentlySeen,
    refresh_interval: Duration,
}

impl Poller {
    pub fn new(ctx: CrawlContext, seen_capacity: usize, refresh_interval: Duration) -> Self {
        Self {
            ctx,
            seen: RecentlySeen::new(seen_capacity),
            refresh_interval,
        }
    }

    /// Fetches the home page once and dispatches every story not seen before
    ///
    /// Returns the number of stories pushed onto the discovery queue. A failed
    /// fetch is logged and counts as a cycle with no new stories.
    pub async fn poll_once(&mut self) -> usize {
        let home_page = &self.ctx.home_page;

        self.ctx.limiter.acquire().await;
        let body = match fetch_page(&self.ctx.client, home_page).await {
            FetchResult::Success { final_url, body } => {
                tracing::debug!("Fetched HOME_PAGE {} ({} bytes)", final_url, body.len());
                body
            }
            FetchResult::Timeout => {
                tracing::warn!("EXCEPTION timeout error for HOME_PAGE {}", home_page);
                self.ctx.stats.record_failed_poll();
                return 0;
            }
            FetchResult::HttpError { status_code } => {
                tracing::error!("EXCEPTION HTTP {} for HOME_PAGE {}", status_code, home_page);
                self.ctx.stats.record_failed_poll();
                return 0;
            }
            FetchResult::NetworkError { error } => {
                tracing::error!("EXCEPTION unknown error for HOME_PAGE {}: {}", home_page, error);
                self.ctx.stats.record_failed_poll();
                return 0;
            }
        };

        let current = self.ctx.extractor.extract_stories(&body);
        let fresh = self.seen.unseen(current.iter().map(|s| s.title.as_str()));
        if fresh.is_empty() {
            tracing::debug!("No new stories among {} on the home page", current.len());
            return 0;
        }

        for title in &fresh {
            if let Some(evicted) = self.seen.insert(*title) {
                tracing::trace!("Forgetting story '{}'", evicted);
            }
        }

        let mut dispatched = 0;
        for title in fresh {
            if let Some(story) = current.iter().find(|s| s.title == title) {
                tracing::debug!("New story '{}'", story.title);
                self.ctx.stories.put(story.clone());
                dispatched += 1;
            }
        }

        self.ctx.stats.record_stories(dispatched);
        tracing::info!("Dispatched {} new stories", dispatched);
        dispatched
    }

    /// Waits until the discovery and download queues have fully drained
    pub async fn wait_for_drain(&self) {
        self.ctx.stories.join().await;
        self.ctx.downloads.join().await;
    }

    /// One discovery cycle: poll, then wait for all resulting work to finish
    pub async fn run_cycle(&mut self) -> usize {
        self.ctx.stats.record_cycle();
        let dispatched = self.poll_once().await;
        self.wait_for_drain().await;
        dispatched
    }

    /// Polls forever
    pub async fn run(mut self) {
        loop {
            tracing::info!("HEARTBEAT {}", self.ctx.stats.snapshot());
            self.run_cycle().await;
            tokio::time::sleep(self.refresh_interval).await;
        }
    }

    pub fn recently_seen(&self) -> &RecentlySeen {
        &self.seen
    }
}
