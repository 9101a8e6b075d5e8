//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `RecentlySeen`: bounded window of story titles already dispatched, owned by the poller

mod recently_seen;

pub use recently_seen::{RecentlySeen, DEFAULT_SEEN_CAPACITY};
