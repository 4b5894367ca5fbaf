//! Utility functions for string truncation, archive paths, and file system checks.
//!
//! This module provides helper functions used throughout the application:
//! - String truncation for logging and prompt budgets
//! - JSON error detection for handling truncated LLM replies
//! - Dated archive file naming
//! - File system validation for the output directory

use chrono::NaiveDate;
use std::error::Error;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, instrument};

/// Name of the scratch file written by [`ensure_writable_dir`].
const WRITE_CHECK_FILE: &str = ".daily_news_digest_write_check";

/// Truncate a string for logging purposes.
///
/// Long strings are cut to `max` characters with an ellipsis and a count
/// of the omitted bytes appended. Cuts always land on a char boundary.
///
/// # Arguments
///
/// * `s` - The string to potentially truncate
/// * `max` - Maximum number of characters to keep
///
/// # Returns
///
/// `s` unchanged when it has at most `max` characters, otherwise the first
/// `max` characters followed by `"…(+N bytes)"`.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log(&"a".repeat(500), 10), "aaaaaaaaaa…(+490 bytes)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        None => s.to_string(),
        Some((cut, _)) => format!("{}…(+{} bytes)", &s[..cut], s.len() - cut),
    }
}

/// Keep the first `max` characters of `s`.
///
/// Used for the prompt budget and for the raw-reply summary fallback.
///
/// # Returns
///
/// `s` unchanged when it fits, otherwise the kept prefix with `...` appended.
pub fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        None => s.to_string(),
        Some((cut, _)) => format!("{}...", &s[..cut]),
    }
}

/// Detect if a serde_json error indicates truncated/incomplete JSON.
///
/// A reply cut off by the model's token limit fails to parse with an EOF
/// error rather than a syntax error.
///
/// # Arguments
///
/// * `e` - The error from a failed decode
///
/// # Returns
///
/// `true` if the error is an EOF, `false` for any other category.
pub fn looks_truncated(e: &serde_json::Error) -> bool {
    use serde_json::error::Category;
    matches!(e.classify(), Category::Eof)
}

/// Archive file for a calendar date.
///
/// # Arguments
///
/// * `output_dir` - Directory holding the dated archives
/// * `date` - The archive's calendar day
///
/// # Returns
///
/// `{output_dir}/news_articles_{YYYY-MM-DD}.json`
pub fn archive_path(output_dir: impl AsRef<Path>, date: NaiveDate) -> PathBuf {
    output_dir
        .as_ref()
        .join(format!("news_articles_{}.json", date.format("%Y-%m-%d")))
}

/// Make sure the output directory exists and accepts new files.
///
/// Missing parents are created. A scratch file is then written and removed
/// so that a read-only directory is reported before any scraping starts.
///
/// # Arguments
///
/// * `path` - Output directory from the command line
///
/// # Errors
///
/// Returns the I/O error from creating the directory or writing the
/// scratch file.
#[instrument(level = "info", skip_all, fields(path = %path))]
pub async fn ensure_writable_dir(path: &str) -> Result<(), Box<dyn Error>> {
    let dir = Path::new(path);
    fs::create_dir_all(dir).await?;

    let scratch = dir.join(WRITE_CHECK_FILE);
    fs::write(&scratch, b"ok").await?;
    if let Err(e) = fs::remove_file(&scratch).await {
        debug!(file = %scratch.display(), error = %e, "Could not remove write check file");
    }

    info!("Output directory is writable");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_for_log_short_string() {
        let s = "Hello, world!";
        assert_eq!(truncate_for_log(s, 100), "Hello, world!");
    }

    #[test]
    fn test_truncate_for_log_long_string() {
        let s = "a".repeat(500);
        let result = truncate_for_log(&s, 100);
        assert!(result.starts_with(&"a".repeat(100)));
        assert!(result.contains("…(+400 bytes)"));
    }

    #[test]
    fn test_truncate_for_log_multibyte() {
        assert_eq!(truncate_for_log("भारत news", 2), "भा…(+11 bytes)");
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("abcdef", 6), "abcdef");
        assert_eq!(truncate_chars("abcdefg", 6), "abcdef...");
        assert_eq!(truncate_chars("", 3), "");
    }

    #[test]
    fn test_archive_path() {
        let date = NaiveDate::from_ymd_opt(2025, 7, 4).unwrap();
        assert_eq!(
            archive_path("output", date),
            PathBuf::from("output/news_articles_2025-07-04.json")
        );
    }

    #[test]
    fn test_looks_truncated() {
        let json_eof = r#"{"summary": "value"#;
        let err = serde_json::from_str::<serde_json::Value>(json_eof).unwrap_err();
        assert!(looks_truncated(&err));

        let err = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        assert!(!looks_truncated(&err));
    }

    #[tokio::test]
    async fn test_ensure_writable_dir_creates_nested() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a/b");
        ensure_writable_dir(nested.to_str().unwrap()).await.unwrap();
        assert!(nested.is_dir());
        assert!(!nested.join(WRITE_CHECK_FILE).exists());
    }

    #[tokio::test]
    async fn test_ensure_writable_dir_rejects_file_path() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("taken");
        std::fs::write(&file, "x").unwrap();
        assert!(ensure_writable_dir(file.to_str().unwrap()).await.is_err());
    }
}
