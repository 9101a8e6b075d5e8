use crate::HarvestError;
use std::path::{Path, PathBuf};
use url::Url;

/// File name of a story's landing page
pub const LANDING_FILE: &str = "index.html";

/// File name of a story's discussion page
pub const COMMENTS_FILE: &str = "comments.html";

/// Derives a directory name from a story title
///
/// Every byte that is not an ASCII letter or digit becomes `_`, so multi-byte
/// characters expand to one underscore per byte.
///
/// # Examples
///
/// ```
/// use hn_harvester::storage::story_dir_name;
///
/// assert_eq!(story_dir_name("Show HN: Rust 2.0"), "Show_HN__Rust_2_0");
/// ```
pub fn story_dir_name(title: &str) -> String {
    title
        .bytes()
        .map(|b| if b.is_ascii_alphanumeric() { b as char } else { '_' })
        .collect()
}

/// Creates (if needed) the directory for a story and returns its path
///
/// An already existing directory is not an error.
pub async fn create_story_dir(base_dir: &Path, title: &str) -> Result<PathBuf, HarvestError> {
    let dir = base_dir.join(story_dir_name(title));
    tokio::fs::create_dir_all(&dir)
        .await
        .map_err(|source| HarvestError::Filesystem {
            path: dir.clone(),
            source,
        })?;
    Ok(dir)
}

/// Name of the `seq`-th comment-derived download (1-based)
pub fn comment_file_name(seq: usize) -> String {
    format!("{:05}.html", seq)
}

/// Returns true if a download should be stored with a `.pdf` extension
///
/// The URL path is checked first; a `Content-Type: application/pdf` response
/// header also counts.
pub fn looks_like_pdf(url: &Url, content_type: Option<&str>) -> bool {
    if url.path().to_ascii_lowercase().ends_with(".pdf") {
        return true;
    }
    content_type
        .map(|ct| ct.trim().to_ascii_lowercase().starts_with("application/pdf"))
        .unwrap_or(false)
}

/// Rewrites a destination path's extension to `.pdf`
pub fn with_pdf_extension(path: &Path) -> PathBuf {
    path.with_extension("pdf")
}
