//! The daily scrape run.
//!
//! ```text
//! Listing → Deduplication → PerArticleProcessing → Merge → Persist → Report
//! ```
//!
//! Every step is awaited in sequence. Each new candidate is extracted
//! directly first; a failed or suspiciously short extraction sends the link
//! through the redirect resolver and extracts again from wherever it lands.
//! Successful bodies are then enriched when a model is configured.
//!
//! Individual articles never abort the run. The only fatal outcome is a
//! failure to write the archive.

use crate::api::AskAsync;
use crate::dedup::filter_new;
use crate::enrich::Enricher;
use crate::extract::ExtractContent;
use crate::fetch::FetchPage;
use crate::models::{
    ArchiveMetadata, ArticleRecord, Candidate, Enrichment, ExtractedContent, ProcessedArticle,
};
use crate::outputs::archive;
use crate::outputs::report::RunReport;
use crate::resolver::ResolveRedirect;
use crate::scrapers::{self, sources::SourceConfig};
use crate::utils::truncate_for_log;
use chrono::{Local, NaiveDate};
use futures::FutureExt;
use std::error::Error;
use std::panic::AssertUnwindSafe;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{error, info, instrument, warn};

/// Bodies shorter than this (in characters) trigger the redirect resolver.
pub const MIN_BODY_CHARS: usize = 100;

/// Whether direct extraction was poor enough to retry via the resolver.
pub fn needs_resolver(content: Option<&ExtractedContent>) -> bool {
    content.is_none_or(|c| c.body_length < MIN_BODY_CHARS)
}

/// Where and how a run writes its results.
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub sources: Vec<SourceConfig>,
    pub archive_path: PathBuf,
    pub date: NaiveDate,
    /// Pause after each processed article.
    pub delay: Duration,
}

pub struct Pipeline<F, X, R, A> {
    fetcher: F,
    extractor: X,
    resolver: R,
    enricher: Option<Enricher<A>>,
    settings: RunSettings,
}

impl<F, X, R, A> Pipeline<F, X, R, A>
where
    F: FetchPage,
    X: ExtractContent,
    R: ResolveRedirect,
    A: AskAsync,
{
    pub fn new(
        fetcher: F,
        extractor: X,
        resolver: R,
        enricher: Option<Enricher<A>>,
        settings: RunSettings,
    ) -> Self {
        Self {
            fetcher,
            extractor,
            resolver,
            enricher,
            settings,
        }
    }

    /// Execute one full run and persist the merged archive.
    #[instrument(level = "info", skip_all, fields(path = %self.settings.archive_path.display()))]
    pub async fn run(&self) -> Result<RunReport, Box<dyn Error>> {
        let path = &self.settings.archive_path;
        let previous = archive::load_archive(path).await;
        let generated_at = previous.as_ref().map(|a| a.metadata.generated_at);
        let existing = previous.map(|a| a.articles).unwrap_or_default();
        info!(existing = existing.len(), enrichment = self.enricher.is_some(), "Starting scrape run");

        // ---- Listing ----
        let mut scraped = Vec::new();
        for source in &self.settings.sources {
            scraped.extend(scrapers::index_articles(&self.fetcher, source).await);
        }

        let mut report = RunReport {
            path: path.clone(),
            existing: existing.len(),
            scraped: scraped.len(),
            ..Default::default()
        };

        // ---- Deduplication ----
        let outcome = filter_new(scraped, &existing);
        report.duplicates_skipped = outcome.skipped;
        if outcome.fresh.is_empty() {
            info!("No new articles; refreshing archive metadata only");
        }

        // ---- Per-article processing ----
        let total = outcome.fresh.len();
        let mut fresh_records = Vec::with_capacity(total);
        for (i, candidate) in outcome.fresh.iter().enumerate() {
            info!(
                index = i + 1,
                total,
                source = %candidate.source,
                title = %truncate_for_log(&candidate.title, 60),
                "Processing article"
            );

            match AssertUnwindSafe(self.process(candidate)).catch_unwind().await {
                Ok(processed) => {
                    let record = ArticleRecord::new(candidate, processed, Local::now().fixed_offset());
                    if record.extraction_succeeded {
                        report.new_successful += 1;
                    } else {
                        report.new_failed += 1;
                    }
                    if record.used_redirect_resolver {
                        report.new_resolver_used += 1;
                    }
                    info!(
                        success = record.extraction_succeeded,
                        body_length = record.body_length,
                        used_redirect_resolver = record.used_redirect_resolver,
                        "Article processed"
                    );
                    fresh_records.push(record);
                }
                Err(_) => {
                    error!(link = %candidate.link, "Article processing panicked; skipping");
                    report.new_failed += 1;
                    report.aborted += 1;
                }
            }

            if !self.settings.delay.is_zero() {
                tokio::time::sleep(self.settings.delay).await;
            }
        }

        // ---- Merge & persist ----
        let mut merged = existing;
        merged.extend(fresh_records);
        let metadata = ArchiveMetadata::from_records(
            &merged,
            self.settings.date,
            Local::now().fixed_offset(),
            generated_at,
        );
        if let Err(e) = archive::save(&merged, path, Some(metadata)).await {
            error!(error = %e, "Failed to write archive");
            return Err(e);
        }

        Ok(report.with_archive(&merged))
    }

    async fn extract(&self, url: &str) -> Option<ExtractedContent> {
        match self.extractor.extract(url).await {
            Ok(content) => Some(content),
            Err(e) => {
                warn!(kind = e.kind(), error = %e, "Content extraction failed");
                None
            }
        }
    }

    /// Extract, fall back to the resolver, then enrich.
    async fn process(&self, candidate: &Candidate) -> ProcessedArticle {
        let mut final_url = candidate.link.clone();
        let mut used_redirect_resolver = false;
        let mut content = self.extract(&final_url).await;

        if needs_resolver(content.as_ref()) {
            info!("Direct extraction insufficient; resolving final URL");
            used_redirect_resolver = true;
            final_url = self.resolver.resolve(&candidate.link).await;
            content = self.extract(&final_url).await;
        }

        let enrichment = match (&self.enricher, &content) {
            (Some(enricher), Some(c)) if !c.body_text.is_empty() => {
                let title = if c.title.trim().is_empty() {
                    candidate.title.as_str()
                } else {
                    c.title.as_str()
                };
                enricher.enrich(title, &c.body_text).await
            }
            _ => Enrichment::default(),
        };

        ProcessedArticle {
            final_url,
            used_redirect_resolver,
            content,
            enrichment,
        }
    }
}
