//! Storage module for downloaded story content
//!
//! Every story gets one directory under the configured base directory:
//!
//! ```text
//! <base-dir>/<sanitized title>/index.html     landing page
//! <base-dir>/<sanitized title>/comments.html  discussion page
//! <base-dir>/<sanitized title>/00001.html     first comment-derived download
//! <base-dir>/<sanitized title>/00002.pdf      ...renamed when it is a PDF
//! ```

mod layout;

pub use layout::{
    comment_file_name, create_story_dir, looks_like_pdf, story_dir_name, with_pdf_extension,
    COMMENTS_FILE, LANDING_FILE,
};
