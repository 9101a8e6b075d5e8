//! Integration tests for the crawler
//!
//! These tests use wiremock to stand in for the aggregator and the sites it
//! links to, and drive full discovery cycles end-to-end.

use hn_harvester::config::{Config, CrawlerConfig, OutputConfig, SiteConfig};
use hn_harvester::crawler::Coordinator;
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration pointing at a mock aggregator
fn create_test_config(home_page: &str, base_dir: &Path, timeout: u64) -> Config {
    Config {
        crawler: CrawlerConfig {
            parsers: 2,
            downloaders: 3,
            timeout,
            refresh_interval: 1,
            requests_per_second: 50, // Fast for testing
            seen_capacity: 30,
            user_agent: "hn-harvester-tests/1.0".to_string(),
        },
        site: SiteConfig {
            home_page: format!("{}/", home_page),
        },
        output: OutputConfig {
            base_dir: base_dir.to_path_buf(),
            log_file: None,
        },
    }
}

/// Renders a minimal front page with one `tr.athing` row per story
fn front_page(stories: &[(&str, &str, Option<u64>)]) -> String {
    let rows: String = stories
        .iter()
        .map(|(title, href, id)| {
            let id_attr = id.map(|id| format!(r#" id="{}""#, id)).unwrap_or_default();
            format!(
                r#"<tr class="athing submission"{}><td class="title"><span class="titleline"><a href="{}">{}</a></span></td></tr>
                <tr><td class="subtext">1 point</td></tr>"#,
                id_attr, href, title
            )
        })
        .collect();
    format!("<html><body><table>{}</table></body></html>", rows)
}

async fn mount_page(server: &MockServer, route: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body.to_string())
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_cycle_downloads_landing_pages_and_dedups() {
    let aggregator = MockServer::start().await;
    let base_url = aggregator.uri();

    let home = front_page(&[
        ("Foo", "foo", None),
        ("Bar", &format!("{}/bar", base_url), None),
    ]);
    mount_page(&aggregator, "/", &home).await;
    mount_page(&aggregator, "/foo", "<html>foo landing</html>").await;
    mount_page(&aggregator, "/bar", "<html>bar landing</html>").await;

    let output = tempfile::tempdir().unwrap();
    let config = create_test_config(&base_url, output.path(), 5);

    let mut coordinator = Coordinator::new(config).expect("Failed to create coordinator");
    let _pipeline = coordinator.spawn_pipeline();

    let dispatched = coordinator.run_cycle().await;
    assert_eq!(dispatched, 2);

    // Relative landing links resolve against the home page
    assert_eq!(
        std::fs::read_to_string(output.path().join("Foo/index.html")).unwrap(),
        "<html>foo landing</html>"
    );
    assert_eq!(
        std::fs::read_to_string(output.path().join("Bar/index.html")).unwrap(),
        "<html>bar landing</html>"
    );

    let seen: HashSet<&str> = coordinator.recently_seen().iter().collect();
    assert_eq!(seen, HashSet::from(["Foo", "Bar"]));

    // Same home page again: nothing new
    let dispatched = coordinator.run_cycle().await;
    assert_eq!(dispatched, 0);
    assert_eq!(coordinator.recently_seen().len(), 2);

    let stats = coordinator.stats();
    assert_eq!(stats.cycles, 2);
    assert_eq!(stats.stories_dispatched, 2);
    assert_eq!(stats.downloads_succeeded, 2);

    // Only the two home page polls are rate limited; landing pages are not
    assert_eq!(coordinator.context().limiter.issued(), 2);
}

#[tokio::test]
async fn test_comment_links_fan_out_into_numbered_files() {
    let aggregator = MockServer::start().await;
    let external = MockServer::start().await;
    let base_url = aggregator.uri();
    let ext_url = external.uri();

    mount_page(
        &aggregator,
        "/",
        &front_page(&[("Show HN: Fan-out", "landing", Some(42))]),
    )
    .await;
    mount_page(&aggregator, "/landing", "<html>landing</html>").await;

    let discussion = format!(
        r#"<html><body><table class="comment-tree">
        <tr class="athing comtr" id="1"><td><div class="comment">
          <span class="commtext c00">Read <a href="{ext}/x" rel="nofollow">this</a></span>
        </div></td></tr>
        <tr class="athing comtr" id="2"><td><div class="comment">
          <span class="commtext c00">Prior discussion: <a href="{home}/item?id=7">here</a></span>
        </div></td></tr>
        <tr class="athing comtr" id="3"><td><div class="comment">
          <span class="commtext c00">Paper: <a href="{ext}/paper.pdf">pdf</a></span>
        </div></td></tr>
        </table></body></html>"#,
        ext = ext_url,
        home = base_url
    );
    Mock::given(method("GET"))
        .and(path("/item"))
        .and(query_param("id", "42"))
        .respond_with(ResponseTemplate::new(200).set_body_string(discussion.clone()))
        .mount(&aggregator)
        .await;

    mount_page(&external, "/x", "<html>external x</html>").await;
    Mock::given(method("GET"))
        .and(path("/paper.pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"%PDF-1.5 test".to_vec()))
        .mount(&external)
        .await;

    let output = tempfile::tempdir().unwrap();
    let config = create_test_config(&base_url, output.path(), 5);

    let mut coordinator = Coordinator::new(config).expect("Failed to create coordinator");
    let _pipeline = coordinator.spawn_pipeline();

    assert_eq!(coordinator.run_cycle().await, 1);

    let story_dir = output.path().join("Show_HN__Fan_out");
    assert_eq!(
        std::fs::read_to_string(story_dir.join("index.html")).unwrap(),
        "<html>landing</html>"
    );
    assert_eq!(
        std::fs::read_to_string(story_dir.join("comments.html")).unwrap(),
        discussion
    );
    assert_eq!(
        std::fs::read_to_string(story_dir.join("00001.html")).unwrap(),
        "<html>external x</html>"
    );
    // The self-referential link is skipped without consuming a sequence number
    assert_eq!(
        std::fs::read(story_dir.join("00002.pdf")).unwrap(),
        b"%PDF-1.5 test"
    );
    assert!(!story_dir.join("00002.html").exists());
    assert!(!story_dir.join("00003.html").exists());

    let stats = coordinator.stats();
    assert_eq!(stats.comment_links_queued, 2);
    assert_eq!(stats.downloads_succeeded, 3);

    // One home page poll plus one discussion page; the three downloads bypass the limiter
    assert_eq!(coordinator.context().limiter.issued(), 2);
}

#[tokio::test]
async fn test_download_timeout_does_not_block_cycle() {
    let aggregator = MockServer::start().await;
    let base_url = aggregator.uri();

    mount_page(&aggregator, "/", &front_page(&[("Slow", "slow", None)])).await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("too late")
                .set_delay(Duration::from_secs(30)),
        )
        .mount(&aggregator)
        .await;

    let output = tempfile::tempdir().unwrap();
    let config = create_test_config(&base_url, output.path(), 1);

    let mut coordinator = Coordinator::new(config).expect("Failed to create coordinator");
    let _pipeline = coordinator.spawn_pipeline();

    let dispatched = tokio::time::timeout(Duration::from_secs(15), coordinator.run_cycle())
        .await
        .expect("cycle should finish once the download times out");
    assert_eq!(dispatched, 1);

    let stats = coordinator.stats();
    assert_eq!(stats.downloads_timed_out, 1);
    assert_eq!(stats.downloads_succeeded, 0);
    assert!(output.path().join("Slow").is_dir());
    assert!(!output.path().join("Slow/index.html").exists());
    assert_eq!(coordinator.context().downloads.unfinished(), 0);
}

#[tokio::test]
async fn test_failed_discussion_still_completes_story() {
    let aggregator = MockServer::start().await;
    let base_url = aggregator.uri();

    mount_page(
        &aggregator,
        "/",
        &front_page(&[("Broken comments", "landing", Some(9))]),
    )
    .await;
    mount_page(&aggregator, "/landing", "<html>ok</html>").await;
    Mock::given(method("GET"))
        .and(path("/item"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&aggregator)
        .await;

    let output = tempfile::tempdir().unwrap();
    let config = create_test_config(&base_url, output.path(), 5);

    let mut coordinator = Coordinator::new(config).expect("Failed to create coordinator");
    let _pipeline = coordinator.spawn_pipeline();

    assert_eq!(coordinator.run_cycle().await, 1);

    let story_dir = output.path().join("Broken_comments");
    assert!(story_dir.join("index.html").exists());
    assert!(!story_dir.join("comments.html").exists());
    assert_eq!(coordinator.stats().comment_links_queued, 0);
}

#[tokio::test]
async fn test_home_page_failure_is_not_fatal() {
    let aggregator = MockServer::start().await;
    let base_url = aggregator.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .mount(&aggregator)
        .await;
    mount_page(&aggregator, "/", &front_page(&[("Later", "later", None)])).await;
    mount_page(&aggregator, "/later", "<html>later</html>").await;

    let output = tempfile::tempdir().unwrap();
    let config = create_test_config(&base_url, output.path(), 5);

    let mut coordinator = Coordinator::new(config).expect("Failed to create coordinator");
    let _pipeline = coordinator.spawn_pipeline();

    assert_eq!(coordinator.run_cycle().await, 0);
    assert_eq!(coordinator.stats().failed_polls, 1);
    assert!(coordinator.recently_seen().is_empty());

    // The next cycle picks the story up normally
    assert_eq!(coordinator.run_cycle().await, 1);
    assert!(output.path().join("Later/index.html").exists());
}

#[tokio::test]
async fn test_titles_beyond_window_are_rediscovered() {
    let aggregator = MockServer::start().await;
    let base_url = aggregator.uri();

    mount_page(
        &aggregator,
        "/",
        &front_page(&[("One", "one", None), ("Two", "two", None), ("Three", "three", None)]),
    )
    .await;
    for route in ["/one", "/two", "/three"] {
        mount_page(&aggregator, route, "<html></html>").await;
    }

    let output = tempfile::tempdir().unwrap();
    let mut config = create_test_config(&base_url, output.path(), 5);
    config.crawler.seen_capacity = 2;

    let mut coordinator = Coordinator::new(config).expect("Failed to create coordinator");
    let _pipeline = coordinator.spawn_pipeline();

    assert_eq!(coordinator.run_cycle().await, 3);
    let seen: Vec<&str> = coordinator.recently_seen().iter().collect();
    assert_eq!(seen, vec!["Two", "Three"]);

    // "One" fell out of the window, so it is dispatched again
    assert_eq!(coordinator.run_cycle().await, 1);
    let seen: Vec<&str> = coordinator.recently_seen().iter().collect();
    assert_eq!(seen, vec!["Three", "One"]);
}
