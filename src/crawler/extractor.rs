//! Page-structure extraction
//!
//! The crawler only depends on the [`PageExtractor`] trait: one function that
//! lists the stories on the home page and one that lists outbound links in a
//! discussion page. [`HnExtractor`] implements both for Hacker News markup with
//! `scraper` selectors.
//!
//! Extraction never fails. Malformed or unexpected markup yields an empty list.

use scraper::{ElementRef, Html, Selector};

/// A story discovered on the front page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Story {
    /// Headline text; also the story's identity for deduplication
    pub title: String,

    /// Landing page href, absolute or relative to the home page
    pub landing_url: String,

    /// Numeric id of the story's discussion page, if it has one
    pub discussion_id: Option<u64>,
}

/// Pulls stories and comment links out of raw page bytes
pub trait PageExtractor: Send + Sync {
    /// Lists the stories on a home page, in page order
    fn extract_stories(&self, html: &[u8]) -> Vec<Story>;

    /// Lists absolute http(s) hrefs found inside discussion comments, in page order
    fn extract_comment_links(&self, html: &[u8]) -> Vec<String>;
}

/// Extractor for Hacker News pages
///
/// # Story Rows
///
/// Each story is a `tr.athing` row. The headline anchor is
/// `span.titleline > a` (or the older `a.storylink`); the discussion id is the
/// row's numeric `id` attribute, falling back to the `up_<id>` vote anchor.
///
/// # Comment Links
///
/// Anchors inside `.comment` / `.commtext` blocks whose href starts with `http`.
#[derive(Debug, Clone, Copy, Default)]
pub struct HnExtractor;

impl HnExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl PageExtractor for HnExtractor {
    fn extract_stories(&self, html: &[u8]) -> Vec<Story> {
        let document = Html::parse_document(&String::from_utf8_lossy(html));

        let (Ok(row_selector), Ok(title_selector), Ok(vote_selector)) = (
            Selector::parse("tr.athing"),
            Selector::parse("span.titleline > a, a.storylink"),
            Selector::parse("a[id^='up_']"),
        ) else {
            return Vec::new();
        };

        document
            .select(&row_selector)
            .filter_map(|row| parse_story_row(row, &title_selector, &vote_selector))
            .collect()
    }

    fn extract_comment_links(&self, html: &[u8]) -> Vec<String> {
        let document = Html::parse_document(&String::from_utf8_lossy(html));

        let Ok(link_selector) = Selector::parse(".comment a[href], .commtext a[href]") else {
            return Vec::new();
        };

        document
            .select(&link_selector)
            .filter_map(|anchor| anchor.value().attr("href"))
            .map(str::trim)
            .filter(|href| href.starts_with("http"))
            .map(str::to_string)
            .collect()
    }
}

/// Builds a story from one `tr.athing` row
fn parse_story_row(
    row: ElementRef<'_>,
    title_selector: &Selector,
    vote_selector: &Selector,
) -> Option<Story> {
    let anchor = row.select(title_selector).next()?;

    let title = anchor.text().collect::<String>().trim().to_string();
    if title.is_empty() {
        return None;
    }

    let landing_url = anchor.value().attr("href")?.trim().to_string();
    if landing_url.is_empty() {
        return None;
    }

    let discussion_id = row
        .value()
        .attr("id")
        .and_then(|id| id.trim().parse::<u64>().ok())
        .or_else(|| {
            row.select(vote_selector)
                .filter_map(|vote| vote.value().attr("id"))
                .find_map(|id| id.strip_prefix("up_")?.parse::<u64>().ok())
        });

    Some(Story {
        title,
        landing_url,
        discussion_id,
    })
}
