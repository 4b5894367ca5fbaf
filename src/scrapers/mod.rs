//! Headline discovery on news source front pages.
//!
//! Each source is described by a [`SourceConfig`](sources::SourceConfig);
//! one routine handles all of them:
//!
//! 1. Fetch the listing page (failures yield no candidates)
//! 2. Run every selector in priority order, unioning the matches
//! 3. Keep anchors whose title is long enough and whose href looks like an article
//! 4. Absolutize hrefs against the source origin
//! 5. Drop repeated titles, then cap the list
//!
//! # Built-in Sources
//!
//! | Source | Listing page | Article path |
//! |--------|--------------|--------------|
//! | The Hindu | `https://www.thehindu.com/` | `/news/`, `/article` |
//! | Times of India | `https://timesofindia.indiatimes.com/` | `/articleshow/` |

pub mod sources;

use crate::fetch::FetchPage;
use crate::models::Candidate;
use chrono::{DateTime, FixedOffset, Local};
use scraper::{Html, Selector};
use sources::SourceConfig;
use std::collections::HashSet;
use tracing::{debug, info, instrument, warn};
use url::Url;

/// Titles must be strictly longer than this (in characters).
pub const MIN_TITLE_CHARS: usize = 15;

/// Fetch a source's listing page and extract its candidates.
///
/// Never fails: a transport error is logged and yields an empty list so
/// the run can continue with the other sources.
#[instrument(level = "info", skip_all, fields(source = %source.name))]
pub async fn index_articles<F: FetchPage>(fetcher: &F, source: &SourceConfig) -> Vec<Candidate> {
    let page = match fetcher.fetch(&source.listing_url).await {
        Ok(page) => page,
        Err(e) => {
            warn!(error = %e, url = %source.listing_url, "Listing fetch failed; no candidates");
            return Vec::new();
        }
    };

    let candidates = extract_candidates(&page.html, source, Local::now().fixed_offset());
    info!(count = candidates.len(), url = %source.listing_url, "Indexed candidates");
    debug!(titles = ?candidates.iter().map(|c| &c.title).collect::<Vec<_>>(), "Candidate titles");
    candidates
}

/// Apply a source's selector rules to an already-fetched listing page.
pub fn extract_candidates(
    html: &str,
    source: &SourceConfig,
    listed_at: DateTime<FixedOffset>,
) -> Vec<Candidate> {
    let Ok(base) = Url::parse(&source.base_url) else {
        warn!(base_url = %source.base_url, "Invalid source base URL");
        return Vec::new();
    };
    let document = Html::parse_document(html);
    let mut seen_titles = HashSet::new();
    let mut candidates = Vec::new();

    for raw in &source.selectors {
        let selector = match Selector::parse(raw) {
            Ok(selector) => selector,
            Err(e) => {
                warn!(selector = %raw, error = ?e, "Skipping invalid selector");
                continue;
            }
        };

        for element in document.select(&selector).take(source.per_selector_limit) {
            let title = element.text().collect::<Vec<_>>().join(" ");
            let title = title.split_whitespace().collect::<Vec<_>>().join(" ");
            let Some(href) = element.value().attr("href") else {
                continue;
            };
            if title.chars().count() <= MIN_TITLE_CHARS || !source.matches_path(href) {
                continue;
            }
            let Ok(link) = base.join(href) else {
                continue;
            };

            if seen_titles.insert(title.clone()) {
                candidates.push(Candidate {
                    title,
                    link: link.to_string(),
                    source: source.name.clone(),
                    listed_at,
                });
            }
        }
    }

    candidates.truncate(source.max_candidates);
    candidates
}
