//! Configuration module for HN-Harvester
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every knob has a default, so the file itself is optional.
//!
//! # Example
//!
//! ```no_run
//! use hn_harvester::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvester.toml")).unwrap();
//! println!("Polling every {}s", config.crawler.refresh_interval);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlerConfig, OutputConfig, SiteConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, parse_config, read_config_with_hash};
pub use validation::validate;
