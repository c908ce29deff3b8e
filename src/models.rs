//! Data carried between pipeline stages.
//!
//! - [`NewsArticle`]: raw scraped text from one source
//! - [`PostRecord`]: what was generated and where it went, archived as JSON

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A raw article as scraped, before generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewsArticle {
    /// Rotation name of the source it came from.
    pub source: String,
    /// The article URL.
    pub url: String,
    /// Text content joined from the matched elements.
    pub content: String,
}

/// One pipeline run's outcome.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PostRecord {
    /// Rotation name of the source used.
    pub source: String,
    /// Article the text was generated from.
    pub article_url: String,
    /// The exact text that was (or would have been) posted.
    pub text: String,
    /// Id returned by the platform; `None` on a dry run.
    pub tweet_id: Option<String>,
    /// When the run finished.
    pub posted_at: DateTime<Utc>,
    pub dry_run: bool,
}
