//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building the shared HTTP client with the configured user agent and timeout
//! - GET requests for aggregator pages (home page, discussion pages)
//! - Streaming downloads of landing pages and comment links to disk
//! - Error classification (timeout vs. other network failures)

use crate::config::CrawlerConfig;
use crate::storage::{looks_like_pdf, with_pdf_extension};
use crate::HarvestError;
use reqwest::{header::CONTENT_TYPE, Client};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use url::Url;

/// Upper bound on connection setup, independent of the overall request timeout
const MAX_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Result of a page fetch
#[derive(Debug)]
pub enum FetchResult {
    /// Successfully fetched the page
    Success {
        /// Final URL after redirects
        final_url: String,
        /// Raw page body
        body: Vec<u8>,
    },

    /// Server answered with a non-success status
    HttpError {
        /// The HTTP status code
        status_code: u16,
    },

    /// The request did not complete within the configured timeout
    Timeout,

    /// Connection refused, reset, DNS failure, TLS error, ...
    NetworkError {
        /// Error description
        error: String,
    },
}

/// Builds the HTTP client shared by every task
///
/// Every request made through it is bounded by `config.timeout`, including the
/// time spent reading the body.
///
/// # Example
///
/// ```no_run
/// use hn_harvester::config::CrawlerConfig;
/// use hn_harvester::crawler::build_http_client;
///
/// let client = build_http_client(&CrawlerConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &CrawlerConfig) -> Result<Client, reqwest::Error> {
    let timeout = config.request_timeout();

    Client::builder()
        .user_agent(config.user_agent.clone())
        .timeout(timeout)
        .connect_timeout(timeout.min(MAX_CONNECT_TIMEOUT))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a page into memory
///
/// Only used for aggregator pages, which are small; arbitrary downloads go
/// through [`download_to_file`].
pub async fn fetch_page(client: &Client, url: &Url) -> FetchResult {
    let response = match client.get(url.as_str()).send().await {
        Ok(response) => response,
        Err(e) => return classify_error(e),
    };

    let status = response.status();
    if !status.is_success() {
        return FetchResult::HttpError {
            status_code: status.as_u16(),
        };
    }

    let final_url = response.url().to_string();
    match response.bytes().await {
        Ok(body) => FetchResult::Success {
            final_url,
            body: body.to_vec(),
        },
        Err(e) => classify_error(e),
    }
}

fn classify_error(e: reqwest::Error) -> FetchResult {
    if e.is_timeout() {
        FetchResult::Timeout
    } else if e.is_connect() {
        FetchResult::NetworkError {
            error: format!("Connection failed: {}", e),
        }
    } else {
        FetchResult::NetworkError {
            error: e.to_string(),
        }
    }
}

/// Streams a URL's body to `destination`, chunk by chunk
///
/// If the URL or the response's Content-Type indicates a PDF, the file is
/// written with a `.pdf` extension instead. A partially written file is
/// removed when the transfer fails.
///
/// # Returns
///
/// * `Ok(PathBuf)` - The path actually written
/// * `Err(HarvestError::Timeout)` - The request or body transfer timed out
/// * `Err(HarvestError)` - Any other network, HTTP status or filesystem failure
pub async fn download_to_file(
    client: &Client,
    url: &Url,
    destination: &Path,
) -> Result<PathBuf, HarvestError> {
    let mut response = client
        .get(url.as_str())
        .send()
        .await
        .map_err(|e| request_error(url, e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(HarvestError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok());
    let path = if looks_like_pdf(url, content_type) {
        with_pdf_extension(destination)
    } else {
        destination.to_path_buf()
    };

    tracing::debug!("WRITING TO {}", path.display());
    let mut file = tokio::fs::File::create(&path)
        .await
        .map_err(|source| HarvestError::Filesystem {
            path: path.clone(),
            source,
        })?;

    let written: Result<(), HarvestError> = async {
        while let Some(chunk) = response.chunk().await.map_err(|e| request_error(url, e))? {
            file.write_all(&chunk)
                .await
                .map_err(|source| HarvestError::Filesystem {
                    path: path.clone(),
                    source,
                })?;
        }
        file.flush().await.map_err(|source| HarvestError::Filesystem {
            path: path.clone(),
            source,
        })
    }
    .await;

    if let Err(e) = written {
        drop(file);
        if let Err(remove_err) = tokio::fs::remove_file(&path).await {
            tracing::debug!(
                "Could not remove partial file {}: {}",
                path.display(),
                remove_err
            );
        }
        return Err(e);
    }

    Ok(path)
}

fn request_error(url: &Url, e: reqwest::Error) -> HarvestError {
    if e.is_timeout() {
        HarvestError::Timeout {
            url: url.to_string(),
        }
    } else {
        HarvestError::Http {
            url: url.to_string(),
            source: e,
        }
    }
}
