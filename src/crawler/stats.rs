//! Running counters reported with every heartbeat

use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Cumulative crawl counters, shared by every task
#[derive(Debug)]
pub struct HarvestStats {
    started_at: DateTime<Utc>,
    cycles: AtomicU64,
    failed_polls: AtomicU64,
    stories_dispatched: AtomicU64,
    comment_links_queued: AtomicU64,
    downloads_succeeded: AtomicU64,
    downloads_timed_out: AtomicU64,
    downloads_failed: AtomicU64,
}

/// Point-in-time copy of [`HarvestStats`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub uptime_secs: i64,
    pub cycles: u64,
    pub failed_polls: u64,
    pub stories_dispatched: u64,
    pub comment_links_queued: u64,
    pub downloads_succeeded: u64,
    pub downloads_timed_out: u64,
    pub downloads_failed: u64,
}

impl HarvestStats {
    pub fn new() -> Self {
        Self {
            started_at: Utc::now(),
            cycles: AtomicU64::new(0),
            failed_polls: AtomicU64::new(0),
            stories_dispatched: AtomicU64::new(0),
            comment_links_queued: AtomicU64::new(0),
            downloads_succeeded: AtomicU64::new(0),
            downloads_timed_out: AtomicU64::new(0),
            downloads_failed: AtomicU64::new(0),
        }
    }

    pub fn record_cycle(&self) {
        self.cycles.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failed_poll(&self) {
        self.failed_polls.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_stories(&self, count: usize) {
        self.stories_dispatched.fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn record_comment_links(&self, count: usize) {
        self.comment_links_queued.fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn record_download_success(&self) {
        self.downloads_succeeded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_download_timeout(&self) {
        self.downloads_timed_out.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_download_failure(&self) {
        self.downloads_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            uptime_secs: (Utc::now() - self.started_at).num_seconds(),
            cycles: self.cycles.load(Ordering::Relaxed),
            failed_polls: self.failed_polls.load(Ordering::Relaxed),
            stories_dispatched: self.stories_dispatched.load(Ordering::Relaxed),
            comment_links_queued: self.comment_links_queued.load(Ordering::Relaxed),
            downloads_succeeded: self.downloads_succeeded.load(Ordering::Relaxed),
            downloads_timed_out: self.downloads_timed_out.load(Ordering::Relaxed),
            downloads_failed: self.downloads_failed.load(Ordering::Relaxed),
        }
    }
}

impl Default for HarvestStats {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for StatsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "uptime={}s cycles={} failed_polls={} stories={} comment_links={} downloads_ok={} timeouts={} errors={}",
            self.uptime_secs,
            self.cycles,
            self.failed_polls,
            self.stories_dispatched,
            self.comment_links_queued,
            self.downloads_succeeded,
            self.downloads_timed_out,
            self.downloads_failed
        )
    }
}
