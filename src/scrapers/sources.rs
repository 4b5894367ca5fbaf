//! Listing-page configuration for each news source.
//!
//! A source is pure data: where its front page lives, which CSS selectors
//! surface headline anchors (in priority order), and which path fragments
//! mark an href as a real article. Adding a source means adding an entry
//! here or in a `--sources` YAML file.

use serde::{Deserialize, Serialize};
use std::error::Error;
use tokio::fs;
use tracing::{info, instrument};

fn default_per_selector_limit() -> usize {
    30
}

fn default_max_candidates() -> usize {
    15
}

/// Scraping rules for one news source.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SourceConfig {
    /// Display name stored on every record, e.g. "The Hindu".
    pub name: String,
    /// Front page to scrape for headlines.
    pub listing_url: String,
    /// Origin used to absolutize relative hrefs.
    pub base_url: String,
    /// CSS selectors for headline anchors, tried in order and unioned.
    pub selectors: Vec<String>,
    /// An href must contain at least one of these to count as an article.
    pub path_patterns: Vec<String>,
    /// Matches considered per selector.
    #[serde(default = "default_per_selector_limit")]
    pub per_selector_limit: usize,
    /// Candidates kept per source per run.
    #[serde(default = "default_max_candidates")]
    pub max_candidates: usize,
}

impl SourceConfig {
    pub fn matches_path(&self, href: &str) -> bool {
        self.path_patterns.iter().any(|p| href.contains(p.as_str()))
    }
}

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

pub fn the_hindu() -> SourceConfig {
    SourceConfig {
        name: "The Hindu".to_string(),
        listing_url: "https://www.thehindu.com/".to_string(),
        base_url: "https://www.thehindu.com".to_string(),
        selectors: owned(&[
            "h3.title a",
            "h2.title a",
            "div.story-card a",
            "a[href*=\"/news/\"]",
            "a[href*=\"/article\"]",
            ".story-block h2 a",
            ".element h4 a",
        ]),
        path_patterns: owned(&["/news/", "/article"]),
        per_selector_limit: 30,
        max_candidates: 15,
    }
}

pub fn times_of_india() -> SourceConfig {
    SourceConfig {
        name: "Times of India".to_string(),
        listing_url: "https://timesofindia.indiatimes.com/".to_string(),
        base_url: "https://timesofindia.indiatimes.com".to_string(),
        selectors: owned(&[
            "div.w_tle a",
            "div.top-story a",
            "a[href*=\"/articleshow/\"]",
            ".headline a",
            ".title a",
        ]),
        path_patterns: owned(&["/articleshow/"]),
        per_selector_limit: 25,
        max_candidates: 15,
    }
}

pub fn default_sources() -> Vec<SourceConfig> {
    vec![the_hindu(), times_of_india()]
}

/// Load sources from a YAML list, or fall back to the built-in pair.
#[instrument(level = "info")]
pub async fn load_sources(path: Option<&str>) -> Result<Vec<SourceConfig>, Box<dyn Error>> {
    let Some(path) = path else {
        return Ok(default_sources());
    };

    let yaml = fs::read_to_string(path).await?;
    let sources: Vec<SourceConfig> = serde_yaml::from_str(&yaml)?;
    info!(count = sources.len(), path, "Loaded source configuration");
    Ok(sources)
}
