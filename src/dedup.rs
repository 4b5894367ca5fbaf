//! Title-based duplicate detection against the existing archive.
//!
//! Two titles are duplicates when, after trimming and lowercasing, they are
//! identical, or when both are longer than 20 characters and their word
//! sets overlap by more than 70% of the larger set.

use crate::models::{ArticleRecord, Candidate};
use crate::utils::truncate_for_log;
use std::collections::HashSet;
use tracing::{info, instrument};

/// Fuzzy comparison only applies to titles strictly longer than this.
pub const FUZZY_MIN_CHARS: usize = 20;
/// Similarity must be strictly greater than this to count.
pub const SIMILARITY_THRESHOLD: f64 = 0.7;

fn normalize(title: &str) -> String {
    title.trim().to_lowercase()
}

/// `|W1 ∩ W2| / max(|W1|, |W2|)` over whitespace-separated word sets.
pub fn title_similarity(a: &str, b: &str) -> f64 {
    let words_a: HashSet<&str> = a.split_whitespace().collect();
    let words_b: HashSet<&str> = b.split_whitespace().collect();
    let larger = words_a.len().max(words_b.len());
    if larger == 0 {
        return 0.0;
    }
    words_a.intersection(&words_b).count() as f64 / larger as f64
}

/// Whether `title` already appears in `existing`.
///
/// A title matches an archived one when the two are equal after trimming and
/// lowercasing, or when both are longer than 20 characters and their
/// [`title_similarity`] is above [`SIMILARITY_THRESHOLD`].
///
/// # Arguments
///
/// * `title` - Listing title of the candidate
/// * `existing` - Records already in the day's archive
///
/// # Returns
///
/// `true` on the first matching record.
pub fn is_duplicate(title: &str, existing: &[ArticleRecord]) -> bool {
    let title = normalize(title);
    let fuzzy = title.chars().count() > FUZZY_MIN_CHARS;

    existing.iter().any(|record| {
        let other = normalize(&record.title);
        if title == other {
            return true;
        }
        fuzzy
            && other.chars().count() > FUZZY_MIN_CHARS
            && title_similarity(&title, &other) > SIMILARITY_THRESHOLD
    })
}

/// Candidates split into the ones worth processing and the skip count.
#[derive(Debug, Default)]
pub struct DedupOutcome {
    pub fresh: Vec<Candidate>,
    pub skipped: usize,
}

/// Keep candidates not already in `existing`, preserving order.
///
/// Candidates are only compared with the archive, not with each other.
#[instrument(level = "info", skip_all, fields(candidates = candidates.len(), existing = existing.len()))]
pub fn filter_new(candidates: Vec<Candidate>, existing: &[ArticleRecord]) -> DedupOutcome {
    let mut outcome = DedupOutcome::default();
    for candidate in candidates {
        if is_duplicate(&candidate.title, existing) {
            info!(title = %truncate_for_log(&candidate.title, 60), "Skipping duplicate");
            outcome.skipped += 1;
        } else {
            outcome.fresh.push(candidate);
        }
    }
    info!(
        skipped = outcome.skipped,
        fresh = outcome.fresh.len(),
        "Filtered duplicate articles"
    );
    outcome
}
