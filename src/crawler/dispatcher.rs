//! Story dispatcher
//!
//! A dispatcher takes one story at a time from the discovery queue, creates the
//! story's directory, queues the landing page download and, when the story has
//! a discussion page, fetches it and queues one download per outbound comment link.

use crate::crawler::context::CrawlContext;
use crate::crawler::extractor::Story;
use crate::crawler::fetcher::{fetch_page, FetchResult};
use crate::crawler::worker::DownloadJob;
use crate::storage::{comment_file_name, create_story_dir, COMMENTS_FILE, LANDING_FILE};
use crate::url::{discussion_url, is_self_reference, normalize_link};
use std::path::Path;

#[derive(Clone)]
pub struct Dispatcher {
    ctx: CrawlContext,
}

impl Dispatcher {
    pub fn new(ctx: CrawlContext) -> Self {
        Self { ctx }
    }

    /// Processes stories until the discovery queue closes
    ///
    /// Each story is marked processed once its discussion page has been handled,
    /// whether that succeeded or not.
    pub async fn run(self) {
        while let Some(story) = self.ctx.stories.get().await {
            self.dispatch(&story).await;
        }
    }

    /// Handles a single story
    pub async fn dispatch(&self, story: &Story) {
        tracing::info!("MAIN LINK: {}", story.landing_url);

        let story_dir = match create_story_dir(&self.ctx.base_dir, &story.title).await {
            Ok(dir) => dir,
            Err(e) => {
                tracing::error!("Abandoning story '{}': {}", story.title, e);
                return;
            }
        };

        self.ctx.downloads.put(DownloadJob {
            destination: story_dir.join(LANDING_FILE),
            url: story.landing_url.clone(),
        });

        if let Some(id) = story.discussion_id {
            self.queue_comment_links(id, &story_dir).await;
        }
    }

    /// Fetches a discussion page, saves it and queues its outbound links
    ///
    /// Returns the number of download jobs queued.
    async fn queue_comment_links(&self, id: u64, story_dir: &Path) -> usize {
        let url = match discussion_url(&self.ctx.home_page, id) {
            Ok(url) => url,
            Err(e) => {
                tracing::error!("Cannot build discussion URL for id {}: {}", id, e);
                return 0;
            }
        };

        self.ctx.limiter.acquire().await;
        let html = match fetch_page(&self.ctx.client, &url).await {
            FetchResult::Success { final_url, body } => {
                tracing::debug!("Fetched discussion {} ({} bytes)", final_url, body.len());
                body
            }
            FetchResult::Timeout => {
                tracing::warn!("EXCEPTION timeout error for {}", url);
                return 0;
            }
            FetchResult::HttpError { status_code } => {
                tracing::error!("EXCEPTION HTTP {} for {}", status_code, url);
                return 0;
            }
            FetchResult::NetworkError { error } => {
                tracing::error!("EXCEPTION unknown error for {}: {}", url, error);
                return 0;
            }
        };

        let comments_path = story_dir.join(COMMENTS_FILE);
        if let Err(e) = tokio::fs::write(&comments_path, &html).await {
            tracing::error!("Failed to write {}: {}", comments_path.display(), e);
        }

        let mut queued = 0;
        for href in self.ctx.extractor.extract_comment_links(&html) {
            let link = match normalize_link(&href) {
                Ok(link) => link,
                Err(e) => {
                    tracing::debug!("Skipping comment link {}: {}", href, e);
                    continue;
                }
            };
            if is_self_reference(&link, &self.ctx.home_page) {
                tracing::debug!("Skipping self-referential comment link {}", link);
                continue;
            }

            queued += 1;
            let destination = story_dir.join(comment_file_name(queued));
            tracing::info!(
                "COMMENT LINK: {} FILENAME: {}",
                link,
                destination.display()
            );
            self.ctx.downloads.put(DownloadJob {
                destination,
                url: link.to_string(),
            });
        }

        self.ctx.stats.record_comment_links(queued);
        queued
    }
}
