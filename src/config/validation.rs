use crate::config::types::{Config, CrawlerConfig, OutputConfig, SiteConfig};
use crate::ConfigError;
use url::Url;

const MAX_CONCURRENCY: usize = 100;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_site_config(&config.site)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.parsers < 1 || config.parsers > MAX_CONCURRENCY {
        return Err(ConfigError::Validation(format!(
            "parsers must be between 1 and {}, got {}",
            MAX_CONCURRENCY, config.parsers
        )));
    }

    if config.downloaders < 1 || config.downloaders > MAX_CONCURRENCY {
        return Err(ConfigError::Validation(format!(
            "downloaders must be between 1 and {}, got {}",
            MAX_CONCURRENCY, config.downloaders
        )));
    }

    if config.timeout < 1 {
        return Err(ConfigError::Validation(
            "timeout must be >= 1 second".to_string(),
        ));
    }

    if config.refresh_interval < 1 {
        return Err(ConfigError::Validation(
            "refresh-interval must be >= 1 second".to_string(),
        ));
    }

    if config.requests_per_second < 1 {
        return Err(ConfigError::Validation(
            "requests-per-second must be >= 1".to_string(),
        ));
    }

    if config.seen_capacity < 1 {
        return Err(ConfigError::Validation(
            "seen-capacity must be >= 1".to_string(),
        ));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates the aggregator site configuration
fn validate_site_config(config: &SiteConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.home_page)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid home-page: {}", e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "home-page '{}' must use http or https",
            config.home_page
        )));
    }

    if url.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(format!(
            "home-page '{}' has no host",
            config.home_page
        )));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.base_dir.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "base-dir cannot be empty".to_string(),
        ));
    }

    Ok(())
}
