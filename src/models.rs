//! Data models for scraped candidates, extracted content and the archive.
//!
//! This module defines the core data structures used throughout the application:
//! - [`Candidate`]: A headline discovered on a listing page, not yet processed
//! - [`ExtractedContent`]: The parsed body and metadata of one article page
//! - [`Enrichment`]: LLM-generated summary and keywords
//! - [`ArticleRecord`]: The persisted unit of the archive
//! - [`Archive`] / [`ArchiveMetadata`]: The dated JSON document on disk
//!
//! Persisted types serialize with camelCase field names.

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A headline discovered on a source's listing page.
///
/// Candidates live for one run only; they are either dropped as duplicates
/// or turned into an [`ArticleRecord`].
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    /// Headline text as shown on the listing page.
    pub title: String,
    /// Absolute article URL.
    pub link: String,
    /// Display name of the source, e.g. "The Hindu".
    pub source: String,
    /// When the listing page was scraped.
    pub listed_at: DateTime<FixedOffset>,
}

/// Article fields recovered from a downloaded page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedContent {
    pub title: String,
    pub authors: Vec<String>,
    pub publish_date: Option<DateTime<FixedOffset>>,
    pub body_text: String,
    pub lead_image: Option<String>,
    /// The page's own description (OpenGraph or meta), not the LLM summary.
    pub auto_summary: String,
    /// Length of `body_text` in characters.
    pub body_length: usize,
}

impl ExtractedContent {
    /// Build content from a body, keeping `body_length` in step with it.
    pub fn with_body(title: impl Into<String>, body_text: impl Into<String>) -> Self {
        let body_text = body_text.into();
        Self {
            title: title.into(),
            body_length: body_text.chars().count(),
            body_text,
            ..Default::default()
        }
    }
}

/// Summary and keywords produced by the enrichment model.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Enrichment {
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub keywords: Vec<String>,
}

/// One processed article as stored in the daily archive.
///
/// Construct through [`ArticleRecord::new`] so that `extraction_succeeded`
/// and `body_length` always agree with `body_text`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleRecord {
    pub title: String,
    pub source: String,
    pub link: String,
    pub final_url: String,
    pub listing_date: NaiveDate,
    pub published_at: Option<DateTime<FixedOffset>>,
    pub processed_at: DateTime<FixedOffset>,
    pub used_redirect_resolver: bool,
    pub extraction_succeeded: bool,
    pub body_text: String,
    pub body_length: usize,
    #[serde(default)]
    pub authors: Vec<String>,
    #[serde(default)]
    pub lead_image: Option<String>,
    /// The page's own description, kept alongside the AI summary.
    #[serde(default)]
    pub auto_summary: String,
    pub ai_summary: String,
    pub keywords: Vec<String>,
}

/// The outcome of processing a single candidate, before it becomes a record.
#[derive(Debug, Clone)]
pub struct ProcessedArticle {
    pub final_url: String,
    pub used_redirect_resolver: bool,
    pub content: Option<ExtractedContent>,
    pub enrichment: Enrichment,
}

impl ArticleRecord {
    pub fn new(
        candidate: &Candidate,
        processed: ProcessedArticle,
        processed_at: DateTime<FixedOffset>,
    ) -> Self {
        let content = processed.content.unwrap_or_default();
        let body_length = content.body_text.chars().count();

        Self {
            title: candidate.title.clone(),
            source: candidate.source.clone(),
            link: candidate.link.clone(),
            final_url: processed.final_url,
            listing_date: candidate.listed_at.date_naive(),
            published_at: content.publish_date,
            processed_at,
            used_redirect_resolver: processed.used_redirect_resolver,
            extraction_succeeded: !content.body_text.is_empty(),
            body_text: content.body_text,
            body_length,
            authors: content.authors,
            lead_image: content.lead_image,
            auto_summary: content.auto_summary,
            ai_summary: processed.enrichment.summary,
            keywords: processed.enrichment.keywords,
        }
    }

    /// Lowercased title, summary and keywords, used for topic matching.
    pub fn searchable_text(&self) -> String {
        format!(
            "{} {} {}",
            self.title,
            self.ai_summary,
            self.keywords.join(" ")
        )
        .to_lowercase()
    }
}

/// Summary counts written alongside the articles.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchiveMetadata {
    pub date: NaiveDate,
    pub total_articles: usize,
    pub successful_articles: usize,
    pub failed_articles: usize,
    pub resolver_used: usize,
    pub sources: BTreeSet<String>,
    pub generated_at: DateTime<FixedOffset>,
    pub updated_at: DateTime<FixedOffset>,
}

impl ArchiveMetadata {
    /// Compute counts from `records`. `generated_at` defaults to `now`.
    pub fn from_records(
        records: &[ArticleRecord],
        date: NaiveDate,
        now: DateTime<FixedOffset>,
        generated_at: Option<DateTime<FixedOffset>>,
    ) -> Self {
        let successful_articles = records.iter().filter(|r| r.extraction_succeeded).count();
        Self {
            date,
            total_articles: records.len(),
            successful_articles,
            failed_articles: records.len() - successful_articles,
            resolver_used: records.iter().filter(|r| r.used_redirect_resolver).count(),
            sources: records.iter().map(|r| r.source.clone()).collect(),
            generated_at: generated_at.unwrap_or(now),
            updated_at: now,
        }
    }
}

/// The dated archive document: metadata plus every article seen that day.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Archive {
    pub metadata: ArchiveMetadata,
    pub articles: Vec<ArticleRecord>,
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use chrono::TimeZone;

    pub fn at(hour: u32) -> DateTime<FixedOffset> {
        FixedOffset::east_opt(5 * 3600 + 1800)
            .unwrap()
            .with_ymd_and_hms(2025, 7, 14, hour, 0, 0)
            .unwrap()
    }

    pub fn candidate(title: &str, source: &str) -> Candidate {
        Candidate {
            title: title.to_string(),
            link: format!(
                "https://example.com/news/{}",
                title.to_lowercase().replace(' ', "-")
            ),
            source: source.to_string(),
            listed_at: at(9),
        }
    }

    pub fn record(title: &str, source: &str, body: &str) -> ArticleRecord {
        let candidate = candidate(title, source);
        ArticleRecord::new(
            &candidate,
            ProcessedArticle {
                final_url: candidate.link.clone(),
                used_redirect_resolver: false,
                content: Some(ExtractedContent::with_body(title, body)),
                enrichment: Enrichment::default(),
            },
            at(10),
        )
    }
}
