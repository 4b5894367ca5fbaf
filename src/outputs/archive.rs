//! The dated JSON archive on disk.
//!
//! # File Layout
//!
//! ```text
//! output_dir/
//! ├── news_articles_2025-07-13.json
//! └── news_articles_2025-07-14.json
//! ```
//!
//! Each file is `{"metadata": {...}, "articles": [...]}`. Saving rewrites
//! the whole file; the archive grows because callers always pass the
//! existing records followed by the new ones.
//!
//! Loading is forgiving: a missing or unreadable file means "no history".

use crate::models::{Archive, ArchiveMetadata, ArticleRecord};
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{error, info, instrument, warn};

#[derive(Serialize)]
struct ArchiveView<'a> {
    metadata: &'a ArchiveMetadata,
    articles: &'a [ArticleRecord],
}

/// On-disk shape tolerated when loading: metadata may be absent or stale.
#[derive(Deserialize)]
struct StoredArchive {
    #[serde(default)]
    metadata: Option<serde_json::Value>,
    #[serde(default)]
    articles: Vec<ArticleRecord>,
}

/// Load the full archive, or `None` when the file is missing or corrupt.
///
/// Unreadable metadata is recomputed from the articles.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn load_archive(path: &Path) -> Option<Archive> {
    let raw = match fs::read_to_string(path).await {
        Ok(raw) => raw,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            info!("No archive yet for this date");
            return None;
        }
        Err(e) => {
            warn!(error = %e, "Could not read archive; treating as empty");
            return None;
        }
    };

    let stored: StoredArchive = match serde_json::from_str(&raw) {
        Ok(stored) => stored,
        Err(e) => {
            warn!(error = %e, "Archive is not valid JSON; treating as empty");
            return None;
        }
    };

    let metadata = stored
        .metadata
        .and_then(|m| serde_json::from_value::<ArchiveMetadata>(m).ok())
        .unwrap_or_else(|| {
            let now = Local::now().fixed_offset();
            ArchiveMetadata::from_records(&stored.articles, now.date_naive(), now, None)
        });

    info!(count = stored.articles.len(), "Loaded existing articles");
    Some(Archive {
        metadata,
        articles: stored.articles,
    })
}

/// Load only the articles; empty when there is no usable archive.
pub async fn load(path: &Path) -> Vec<ArticleRecord> {
    load_archive(path)
        .await
        .map(|archive| archive.articles)
        .unwrap_or_default()
}

/// Write `records` to `path`, creating parent directories as needed.
///
/// The file is rewritten in full as pretty-printed JSON.
///
/// # Arguments
///
/// * `records` - Every article the archive should hold after the write
/// * `path` - Dated archive file
/// * `metadata` - Precomputed metadata; computed from `records` when `None`
///
/// # Returns
///
/// The path written, or the I/O or serialization error. Nothing is written
/// when serialization fails.
#[instrument(level = "info", skip_all, fields(path = %path.display(), count = records.len()))]
pub async fn save(
    records: &[ArticleRecord],
    path: &Path,
    metadata: Option<ArchiveMetadata>,
) -> Result<PathBuf, Box<dyn Error>> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if let Err(e) = fs::create_dir_all(parent).await {
            error!(dir = %parent.display(), error = %e, "Failed to create archive dir");
            return Err(e.into());
        }
    }

    let metadata = metadata.unwrap_or_else(|| {
        let now = Local::now().fixed_offset();
        ArchiveMetadata::from_records(records, now.date_naive(), now, None)
    });
    let json = serde_json::to_string_pretty(&ArchiveView {
        metadata: &metadata,
        articles: records,
    })?;

    fs::write(path, json).await?;
    info!(
        successful = metadata.successful_articles,
        failed = metadata.failed_articles,
        "Saved archive"
    );
    Ok(path.to_path_buf())
}
