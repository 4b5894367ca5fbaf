//! # Daily News Digest
//!
//! Scrapes headlines from Indian news front pages, downloads and extracts
//! each new article, summarizes it with a Groq-hosted LLM, and appends the
//! results to a dated JSON archive. A small browse surface lists, filters,
//! searches and displays what has been collected.
//!
//! ## Features
//!
//! - Data-driven listing scrapers (The Hindu and Times of India built in)
//! - Title-based duplicate detection against the day's archive
//! - Headless Chrome fallback for links that only resolve client-side
//! - Optional AI summary and keywords per article
//! - Browse commands: `list`, `search`, `show`, `topics`
//!
//! ## Usage
//!
//! ```sh
//! GROQ_API_KEY=gsk_... daily_news_digest
//! daily_news_digest search "monsoon"
//! ```
//!
//! ## Architecture
//!
//! A scrape run is one sequential pipeline:
//! 1. **Listing**: Discover candidate headlines on each source
//! 2. **Deduplication**: Drop headlines already archived today
//! 3. **Processing**: Extract, resolve redirects when needed, enrich
//! 4. **Persist**: Rewrite the archive with existing plus new records

use chrono::{Local, NaiveDate};
use clap::Parser;
use std::error::Error;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod api;
mod cli;
mod dedup;
mod enrich;
mod error;
mod extract;
mod fetch;
mod models;
mod outputs;
mod pipeline;
mod resolver;
mod scrapers;
mod search;
mod utils;

use api::GroqChat;
use cli::{Cli, Command, ScrapeArgs};
use enrich::Enricher;
use extract::ContentExtractor;
use fetch::HttpFetcher;
use outputs::{archive, digest};
use pipeline::{Pipeline, RunSettings};
use resolver::ChromeResolver;
use search::{Searcher, filter_by_favorites, suggested_topics};
use utils::{archive_path, ensure_writable_dir};

/// Timeout for a single chat-completions call.
const LLM_TIMEOUT: Duration = Duration::from_secs(30);
/// Wait after navigation before reading the browser's final URL.
const REDIRECT_SETTLE: Duration = Duration::from_secs(3);

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    let args = Cli::parse();
    debug!(output_dir = %args.output_dir, model = %args.model, date = ?args.date, "Parsed CLI arguments");

    let date = args.date.unwrap_or_else(|| Local::now().date_naive());
    let path = archive_path(&args.output_dir, date);

    // Built once and shared by enrichment and search.
    let chat = GroqChat::from_credential(
        args.groq_api_key.as_deref(),
        &args.model,
        &args.api_base_url,
        LLM_TIMEOUT,
    )?;
    if chat.is_none() {
        warn!("GROQ_API_KEY not set; AI summaries and model search are disabled");
    }

    match args.command.clone().unwrap_or_default() {
        Command::Scrape(scrape) => run_scrape(&args, scrape, chat, date, &path).await?,
        Command::List { favorites } => {
            let articles = archive::load(&path).await;
            let selection = filter_by_favorites(&articles, favorites.as_slice());
            print!("{}", digest::render_feed(&articles, &selection));
        }
        Command::Search { query } => {
            let articles = archive::load(&path).await;
            let found = Searcher::new(chat).search(&query, &articles).await;
            print!("{}", digest::render_feed(&articles, &found));
        }
        Command::Show { index } => {
            let articles = archive::load(&path).await;
            match articles.get(index) {
                Some(article) => print!("{}", digest::render_article(article)),
                None => {
                    error!(index, available = articles.len(), "No article at that index");
                    return Err(format!("no article at index {index}").into());
                }
            }
        }
        Command::Topics => {
            let articles = archive::load(&path).await;
            print!("{}", digest::render_topics(&suggested_topics(&articles)));
        }
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );
    Ok(())
}

#[instrument(level = "info", skip_all, fields(path = %path.display()))]
async fn run_scrape(
    args: &Cli,
    scrape: ScrapeArgs,
    chat: Option<GroqChat>,
    date: NaiveDate,
    path: &Path,
) -> Result<(), Box<dyn Error>> {
    // Early check: ensure the output dir is writable
    if let Err(e) = ensure_writable_dir(&args.output_dir).await {
        error!(
            path = %args.output_dir,
            error = %e,
            "Output directory is not writable (fix perms or choose a different path)"
        );
        return Err(e);
    }

    let sources = scrapers::sources::load_sources(scrape.sources.as_deref()).await?;
    let fetcher = HttpFetcher::new(Duration::from_secs(scrape.request_timeout_secs))?;
    let extractor = ContentExtractor::new(fetcher.clone());
    let resolver = ChromeResolver::new(
        Duration::from_secs(scrape.browser_timeout_secs),
        REDIRECT_SETTLE,
    )
    .with_executable(scrape.chrome_path.clone());
    let enricher = chat.map(|chat| Enricher::new(chat, scrape.max_content_chars));

    let settings = RunSettings {
        sources,
        archive_path: path.to_path_buf(),
        date,
        delay: Duration::from_secs(scrape.delay_secs),
    };
    info!(
        sources = settings.sources.len(),
        delay_secs = scrape.delay_secs,
        "Scrape configured"
    );

    let report = Pipeline::new(fetcher, extractor, resolver, enricher, settings)
        .run()
        .await?;
    report.log();
    Ok(())
}
