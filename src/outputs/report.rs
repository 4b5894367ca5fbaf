//! End-of-run summary.

use crate::models::ArticleRecord;
use crate::utils::truncate_for_log;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::info;

/// Per-source counts over the whole archive.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct SourceTally {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
    pub resolver_used: usize,
}

/// What a scrape run did, plus the state of the archive afterwards.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RunReport {
    pub path: PathBuf,
    pub existing: usize,
    pub scraped: usize,
    pub duplicates_skipped: usize,
    pub new_successful: usize,
    pub new_failed: usize,
    pub new_resolver_used: usize,
    /// Articles whose processing panicked; counted in `new_failed`, never stored.
    pub aborted: usize,
    pub total_in_archive: usize,
    pub per_source: BTreeMap<String, SourceTally>,
    /// Most recent successful article that has an AI summary.
    pub sample: Option<ArticleRecord>,
}

impl RunReport {
    /// Fill the archive-wide fields from the merged records.
    pub fn with_archive(mut self, records: &[ArticleRecord]) -> Self {
        self.total_in_archive = records.len();
        self.per_source = tally_by_source(records);
        self.sample = records
            .iter()
            .rev()
            .find(|r| r.extraction_succeeded && !r.ai_summary.is_empty())
            .cloned();
        self
    }

    pub fn log(&self) {
        info!(
            path = %self.path.display(),
            existing = self.existing,
            scraped = self.scraped,
            duplicates_skipped = self.duplicates_skipped,
            new_successful = self.new_successful,
            new_failed = self.new_failed,
            new_resolver_used = self.new_resolver_used,
            aborted = self.aborted,
            total = self.total_in_archive,
            "Run complete"
        );
        for (source, tally) in &self.per_source {
            info!(
                source = %source,
                total = tally.total,
                successful = tally.successful,
                failed = tally.failed,
                resolver_used = tally.resolver_used,
                "Source totals"
            );
        }
        match &self.sample {
            Some(sample) => info!(
                title = %sample.title,
                source = %sample.source,
                summary = %truncate_for_log(&sample.ai_summary, 300),
                keywords = %sample.keywords.join(", "),
                used_redirect_resolver = sample.used_redirect_resolver,
                "Sample enriched article"
            ),
            None => info!("No enriched articles to show"),
        }
    }
}

pub fn tally_by_source(records: &[ArticleRecord]) -> BTreeMap<String, SourceTally> {
    let mut tallies: BTreeMap<String, SourceTally> = BTreeMap::new();
    for record in records {
        let tally = tallies.entry(record.source.clone()).or_default();
        tally.total += 1;
        if record.extraction_succeeded {
            tally.successful += 1;
        } else {
            tally.failed += 1;
        }
        if record.used_redirect_resolver {
            tally.resolver_used += 1;
        }
    }
    tallies
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures::record;

    #[test]
    fn test_tally_by_source() {
        let mut resolved = record("Second Hindu story with resolver", "The Hindu", "");
        resolved.used_redirect_resolver = true;
        let records = vec![
            record("First Hindu story about the budget", "The Hindu", "body"),
            resolved,
            record("Times story on cricket selection", "Times of India", "body"),
        ];

        let tallies = tally_by_source(&records);
        assert_eq!(
            tallies["The Hindu"],
            SourceTally {
                total: 2,
                successful: 1,
                failed: 1,
                resolver_used: 1
            }
        );
        assert_eq!(tallies["Times of India"].successful, 1);
    }

    #[test]
    fn test_sample_is_latest_enriched_success() {
        let mut older = record("Older enriched story on rainfall", "The Hindu", "body");
        older.ai_summary = "Older summary".to_string();
        let mut newer = record("Newer enriched story on markets", "Times of India", "body");
        newer.ai_summary = "Newer summary".to_string();
        let plain = record("Unenriched story about traffic", "The Hindu", "body");

        let report = RunReport::default().with_archive(&[older, newer, plain]);
        assert_eq!(report.total_in_archive, 3);
        assert_eq!(report.sample.unwrap().ai_summary, "Newer summary");
    }

    #[test]
    fn test_no_sample_without_summaries() {
        let report = RunReport::default().with_archive(&[record("Plain", "The Hindu", "body")]);
        assert!(report.sample.is_none());
    }
}
