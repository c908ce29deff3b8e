//! JSON archive of published posts.
//!
//! # Output Structure
//!
//! Files are grouped by UTC date, one per run:
//! ```text
//! json_output_dir/
//! └── 2025-05-06/
//!     ├── 080012_cnn.json
//!     └── 120003_npr.json
//! ```

use crate::models::PostRecord;
use crate::utils::slugify;
use std::error::Error;
use std::path::PathBuf;
use tokio::fs;
use tracing::{error, info, instrument};

/// Path a record is written to under `json_output_dir`.
pub fn record_path(record: &PostRecord, json_output_dir: &str) -> PathBuf {
    PathBuf::from(json_output_dir)
        .join(record.posted_at.format("%Y-%m-%d").to_string())
        .join(format!(
            "{}_{}.json",
            record.posted_at.format("%H%M%S"),
            slugify(&record.source)
        ))
}

/// Write a [`PostRecord`] as pretty JSON, creating the date directory.
#[instrument(level = "info", skip_all, fields(json_output_dir = %json_output_dir))]
pub async fn write_post_record(
    record: &PostRecord,
    json_output_dir: &str,
) -> Result<PathBuf, Box<dyn Error>> {
    let json = serde_json::to_string_pretty(record)?;
    let path = record_path(record, json_output_dir);

    if let Some(dir) = path.parent() {
        info!(dir = %dir.display(), "Ensuring JSON directory exists");
        if let Err(e) = fs::create_dir_all(dir).await {
            error!(dir = %dir.display(), error = %e, "Failed to create JSON dir");
            return Err(e.into());
        }
    }

    fs::write(&path, json).await?;
    info!(path = %path.display(), "Wrote post record");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn record() -> PostRecord {
        PostRecord {
            source: "CNN Lite".to_string(),
            article_url: "https://lite.cnn.com/x".to_string(),
            text: "Post text".to_string(),
            tweet_id: Some("99".to_string()),
            posted_at: Utc.with_ymd_and_hms(2025, 5, 6, 8, 0, 12).unwrap(),
            dry_run: false,
        }
    }

    #[test]
    fn test_record_path_layout() {
        let path = record_path(&record(), "/tmp/out");
        assert_eq!(path, PathBuf::from("/tmp/out/2025-05-06/080012_cnn-lite.json"));
    }

    #[tokio::test]
    async fn test_write_post_record_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().to_str().unwrap();

        let path = write_post_record(&record(), out).await.unwrap();
        assert!(path.starts_with(dir.path()));

        let raw = tokio::fs::read_to_string(&path).await.unwrap();
        let back: PostRecord = serde_json::from_str(&raw).unwrap();
        assert_eq!(back, record());
    }
}
