//! URL handling module for HN-Harvester
//!
//! This module turns scraped hrefs into requestable URLs and decides which
//! comment links point back at the aggregator.

mod domain;
mod normalize;

pub use domain::is_self_reference;
pub use normalize::{discussion_url, normalize_link, resolve_target};
