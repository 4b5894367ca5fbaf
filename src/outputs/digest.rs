//! Plain-text views of archived articles for the browse commands.
//!
//! `list`, `search` and `topics` print a numbered feed; `show` prints one
//! article in full. Indices in the feed are positions in the archive, so a
//! number seen in `list` can be passed straight to `show`.

use crate::models::ArticleRecord;
use std::fmt::Write;

/// Keywords shown per feed entry.
const FEED_KEYWORDS: usize = 5;

/// One feed entry: title, source, date, summary and the first few keywords.
pub fn render_entry(index: usize, article: &ArticleRecord) -> String {
    let mut out = String::new();
    writeln!(out, "[{index}] {}", article.title).unwrap();
    writeln!(out, "    Source: {}  |  Date: {}", article.source, article.listing_date).unwrap();

    let summary = if article.ai_summary.is_empty() {
        "No summary available"
    } else {
        article.ai_summary.as_str()
    };
    writeln!(out, "    {summary}").unwrap();

    if !article.keywords.is_empty() {
        let shown = article.keywords.iter().take(FEED_KEYWORDS).cloned().collect::<Vec<_>>();
        writeln!(out, "    Keywords: {}", shown.join(", ")).unwrap();
    }
    out
}

/// A numbered feed for `selection`, indexed by position in `archive`.
pub fn render_feed(archive: &[ArticleRecord], selection: &[&ArticleRecord]) -> String {
    if selection.is_empty() {
        return "No articles found.\n".to_string();
    }

    let mut out = String::new();
    for article in selection {
        let index = archive
            .iter()
            .position(|a| std::ptr::eq(a, *article))
            .unwrap_or_default();
        writeln!(out, "{}", render_entry(index, article)).unwrap();
    }
    out
}

/// Full article view. Falls back to the summary when no body was extracted.
pub fn render_article(article: &ArticleRecord) -> String {
    let mut out = String::new();
    writeln!(out, "# {}\n", article.title).unwrap();
    writeln!(out, "Source: {}", article.source).unwrap();
    writeln!(out, "Date: {}", article.listing_date).unwrap();
    match article.published_at {
        Some(published) => writeln!(out, "Published: {}", published.to_rfc3339()).unwrap(),
        None => writeln!(out, "Published: Unknown").unwrap(),
    }
    if !article.authors.is_empty() {
        writeln!(out, "Authors: {}", article.authors.join(", ")).unwrap();
    }
    writeln!(out).unwrap();

    if !article.auto_summary.is_empty() {
        writeln!(out, "Description: {}\n", article.auto_summary).unwrap();
    }

    if article.body_text.is_empty() {
        let summary = if article.ai_summary.is_empty() {
            "No content available"
        } else {
            article.ai_summary.as_str()
        };
        writeln!(out, "Summary:\n{summary}\n").unwrap();
    } else {
        writeln!(out, "{}\n", article.body_text).unwrap();
    }

    writeln!(out, "Original article: {}", article.link).unwrap();
    if article.final_url != article.link {
        writeln!(out, "Resolved to: {}", article.final_url).unwrap();
    }
    if !article.keywords.is_empty() {
        writeln!(out, "Keywords: {}", article.keywords.join(", ")).unwrap();
    }
    out
}

/// Suggested topics as a bulleted list.
pub fn render_topics(topics: &[String]) -> String {
    if topics.is_empty() {
        return "No recurring topics yet.\n".to_string();
    }
    let mut out = String::from("Suggested topics:\n");
    for topic in topics {
        writeln!(out, "- {topic}").unwrap();
    }
    out
}
