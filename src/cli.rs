//! Command-line interface definitions for the daily news digest.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//! Global options can also come from environment variables.

use crate::api::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use crate::enrich::DEFAULT_MAX_CONTENT_CHARS;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Command-line arguments for the daily news digest.
///
/// Running without a subcommand performs a scrape with default settings.
///
/// # Examples
///
/// ```sh
/// # Scrape today's headlines into ./output
/// daily_news_digest
///
/// # Scrape with a custom source list and no pause between articles
/// daily_news_digest scrape --sources sources.yaml --delay-secs 0
///
/// # Browse an earlier day's archive
/// daily_news_digest --date 2025-07-14 list --favorite cricket
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Directory holding the dated archive files
    #[arg(short, long, env = "NEWS_OUTPUT_DIR", default_value = "output", global = true)]
    pub output_dir: String,

    /// Groq API key; enrichment and model search are skipped without it
    #[arg(long, env = "GROQ_API_KEY", hide_env_values = true, global = true)]
    pub groq_api_key: Option<String>,

    /// Chat model used for summaries and search
    #[arg(long, env = "GROQ_MODEL", default_value = DEFAULT_MODEL, global = true)]
    pub model: String,

    /// OpenAI-compatible API base URL
    #[arg(long, env = "GROQ_API_BASE_URL", default_value = DEFAULT_BASE_URL, global = true)]
    pub api_base_url: String,

    /// Archive date (YYYY-MM-DD); defaults to today
    #[arg(short, long, global = true)]
    pub date: Option<NaiveDate>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Scrape sources, enrich new articles and update the archive
    Scrape(ScrapeArgs),
    /// List archived articles, optionally filtered by favorite topics
    List {
        /// Keep articles mentioning this topic (repeatable)
        #[arg(short, long = "favorite")]
        favorites: Vec<String>,
    },
    /// Search archived articles
    Search {
        query: String,
    },
    /// Show one archived article in full
    Show {
        /// Position shown by `list`
        index: usize,
    },
    /// Keywords that recur across the archive
    Topics,
}

impl Default for Command {
    fn default() -> Self {
        Command::Scrape(ScrapeArgs::default())
    }
}

#[derive(Args, Debug, Clone, PartialEq)]
pub struct ScrapeArgs {
    /// YAML file listing news sources; built-in sources when omitted
    #[arg(short, long)]
    pub sources: Option<String>,

    /// Timeout for listing and article downloads
    #[arg(long, default_value_t = 10)]
    pub request_timeout_secs: u64,

    /// Page-load timeout for the headless browser
    #[arg(long, default_value_t = 30)]
    pub browser_timeout_secs: u64,

    /// Chrome/Chromium binary for redirect resolution; auto-detected when omitted
    #[arg(long, env = "CHROME_PATH")]
    pub chrome_path: Option<PathBuf>,

    /// Pause after each processed article
    #[arg(long, default_value_t = 2)]
    pub delay_secs: u64,

    /// Article characters sent to the model
    #[arg(long, default_value_t = DEFAULT_MAX_CONTENT_CHARS)]
    pub max_content_chars: usize,
}

impl Default for ScrapeArgs {
    fn default() -> Self {
        Self {
            sources: None,
            request_timeout_secs: 10,
            browser_timeout_secs: 30,
            chrome_path: None,
            delay_secs: 2,
            max_content_chars: DEFAULT_MAX_CONTENT_CHARS,
        }
    }
}
