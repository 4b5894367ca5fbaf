//! Browsing helpers over a loaded archive: topic filters, search, and
//! suggested topics.
//!
//! Search asks the model for the indices of relevant articles. The reply is
//! expected to contain a JSON array of integers such as `[0, 3]`; only the
//! first bracketed span is decoded. When no model is configured, the call
//! fails, or the reply can't be decoded, search falls back to a plain
//! case-insensitive substring match.

use crate::api::{AskAsync, ChatPrompt};
use crate::models::ArticleRecord;
use crate::utils::truncate_for_log;
use itertools::Itertools;
use tracing::{info, instrument, warn};

/// Suggested topics shown at most.
pub const MAX_SUGGESTED_TOPICS: usize = 10;

const SYSTEM_PROMPT: &str =
    "You are a helpful news search assistant. Return only the indices of relevant articles in list format.";

/// Articles whose title, summary, or any keyword contains `query`.
pub fn keyword_search<'a>(query: &str, articles: &'a [ArticleRecord]) -> Vec<&'a ArticleRecord> {
    let query = query.to_lowercase();
    articles
        .iter()
        .filter(|a| {
            a.title.to_lowercase().contains(&query)
                || a.ai_summary.to_lowercase().contains(&query)
                || a.keywords.iter().any(|k| k.to_lowercase().contains(&query))
        })
        .collect()
}

/// Articles mentioning any favorite topic; all articles when `favorites` is empty.
pub fn filter_by_favorites<'a, S: AsRef<str>>(
    articles: &'a [ArticleRecord],
    favorites: &[S],
) -> Vec<&'a ArticleRecord> {
    if favorites.is_empty() {
        return articles.iter().collect();
    }
    let favorites: Vec<String> = favorites.iter().map(|f| f.as_ref().to_lowercase()).collect();
    articles
        .iter()
        .filter(|a| {
            let text = a.searchable_text();
            favorites.iter().any(|f| text.contains(f.as_str()))
        })
        .collect()
}

/// Keywords used by more than one article entry, in first-seen order.
pub fn suggested_topics(articles: &[ArticleRecord]) -> Vec<String> {
    let all = articles.iter().flat_map(|a| a.keywords.iter());
    let counts = all.clone().counts();
    all.unique()
        .filter(|k| counts.get(k).copied().unwrap_or(0) > 1)
        .take(MAX_SUGGESTED_TOPICS)
        .cloned()
        .collect()
}

/// Decode the first `[...]` span of a model reply as article indices.
///
/// The span is parsed as JSON and never evaluated.
///
/// # Returns
///
/// `None` when there is no bracketed span or it is not a list of
/// non-negative integers. Range checks against the archive are left to
/// the caller.
pub fn parse_ranking(raw: &str) -> Option<Vec<usize>> {
    let start = raw.find('[')?;
    let end = start + raw[start..].find(']')?;
    serde_json::from_str(&raw[start..=end]).ok()
}

pub fn build_search_prompt(query: &str, articles: &[ArticleRecord]) -> ChatPrompt {
    let context = articles
        .iter()
        .map(|a| {
            format!(
                "Title: {}\nSummary: {}\nKeywords: {}",
                a.title,
                a.ai_summary,
                a.keywords.join(", ")
            )
        })
        .join("\n\n");

    let user = format!(
        "Based on the following news articles and the user query, find the most relevant articles.\n\n\
         Available Articles:\n{context}\n\n\
         User Query: {query}\n\n\
         Return only the indices of the most relevant articles (0-based) as a JSON array of integers, \
         for example [0, 2]. Be precise and only return articles that directly match the query."
    );

    ChatPrompt {
        system: SYSTEM_PROMPT.to_string(),
        user,
        temperature: 0.1,
        max_tokens: 50,
    }
}

/// Model-ranked search with a keyword fallback.
#[derive(Debug)]
pub struct Searcher<A> {
    chat: Option<A>,
}

impl<A: AskAsync> Searcher<A> {
    pub fn new(chat: Option<A>) -> Self {
        Self { chat }
    }

    #[instrument(level = "info", skip(self, articles), fields(articles = articles.len()))]
    pub async fn search<'a>(&self, query: &str, articles: &'a [ArticleRecord]) -> Vec<&'a ArticleRecord> {
        let Some(chat) = &self.chat else {
            return keyword_search(query, articles);
        };

        let raw = match chat.ask(&build_search_prompt(query, articles)).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(kind = e.kind(), error = %e, "Search ranking failed; using keyword search");
                return keyword_search(query, articles);
            }
        };

        match parse_ranking(&raw) {
            Some(indices) => {
                let ranked: Vec<_> = indices.into_iter().filter_map(|i| articles.get(i)).collect();
                info!(matches = ranked.len(), "Model-ranked search");
                ranked
            }
            None => {
                warn!(
                    response_preview = %truncate_for_log(&raw, 120),
                    "Could not decode ranking; using keyword search"
                );
                keyword_search(query, articles)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::stub::StubChat;
    use crate::models::fixtures::record;

    fn enriched(title: &str, summary: &str, keywords: &[&str]) -> ArticleRecord {
        let mut r = record(title, "The Hindu", "body");
        r.ai_summary = summary.to_string();
        r.keywords = keywords.iter().map(|k| k.to_string()).collect();
        r
    }

    fn archive() -> Vec<ArticleRecord> {
        vec![
            enriched("Monsoon reaches Kerala coast", "Rain arrives early.", &["Monsoon", "Kerala"]),
            enriched("India wins cricket series", "A clean sweep.", &["Cricket", "BCCI"]),
            enriched("Heavy rain floods Mumbai", "Local trains halted.", &["Monsoon", "Mumbai"]),
            enriched("Budget focuses on rail", "New Cricket stadium funds.", &["Budget", "Cricket"]),
        ]
    }

    fn titles(found: &[&ArticleRecord]) -> Vec<String> {
        found.iter().map(|a| a.title.clone()).collect()
    }

    #[test]
    fn test_keyword_search_fields() {
        let articles = archive();
        assert_eq!(keyword_search("KERALA", &articles).len(), 1);
        // Summary match.
        assert_eq!(
            titles(&keyword_search("trains", &articles)),
            vec!["Heavy rain floods Mumbai"]
        );
        // Keyword match on partial text.
        assert_eq!(keyword_search("bcc", &articles).len(), 1);
        assert!(keyword_search("election", &articles).is_empty());
    }

    #[test]
    fn test_filter_by_favorites() {
        let articles = archive();
        let none: [&str; 0] = [];
        assert_eq!(filter_by_favorites(&articles, &none).len(), 4);
        assert_eq!(filter_by_favorites(&articles, &["monsoon"]).len(), 2);
        assert_eq!(filter_by_favorites(&articles, &["Budget", "kerala"]).len(), 2);
    }

    #[test]
    fn test_suggested_topics() {
        assert_eq!(suggested_topics(&archive()), vec!["Monsoon", "Cricket"]);
        assert!(suggested_topics(&[]).is_empty());
    }

    #[test]
    fn test_suggested_topics_capped() {
        let keywords: Vec<String> = (0..12).map(|i| format!("topic{i}")).collect();
        let refs: Vec<&str> = keywords.iter().map(String::as_str).collect();
        let articles = vec![enriched("a", "", &refs), enriched("b", "", &refs)];
        let topics = suggested_topics(&articles);
        assert_eq!(topics.len(), MAX_SUGGESTED_TOPICS);
        assert_eq!(topics[0], "topic0");
    }

    #[test]
    fn test_parse_ranking() {
        assert_eq!(parse_ranking("[0, 2]"), Some(vec![0, 2]));
        assert_eq!(parse_ranking("Relevant: [3] and also [1]"), Some(vec![3]));
        assert_eq!(parse_ranking("[]"), Some(vec![]));
        assert_eq!(parse_ranking("none"), None);
        assert_eq!(parse_ranking("[-1]"), None);
        assert_eq!(parse_ranking("[__import__('os')]"), None);
    }

    #[tokio::test]
    async fn test_search_uses_ranking_and_drops_out_of_range() {
        let articles = archive();
        let searcher = Searcher::new(Some(StubChat::replying("Indices: [2, 0, 17]")));
        let found = searcher.search("rain", &articles).await;
        assert_eq!(
            titles(&found),
            vec!["Heavy rain floods Mumbai", "Monsoon reaches Kerala coast"]
        );
        let chat = searcher.chat.as_ref().unwrap();
        assert_eq!(chat.prompts.borrow()[0].max_tokens, 50);
    }

    #[tokio::test]
    async fn test_search_falls_back_on_undecodable_reply() {
        let articles = archive();
        let searcher = Searcher::new(Some(StubChat::replying("I think the cricket ones")));
        assert_eq!(searcher.search("cricket", &articles).await.len(), 2);
    }

    #[tokio::test]
    async fn test_search_falls_back_on_error_and_without_client() {
        let articles = archive();
        let failing = Searcher::new(Some(StubChat::failing(500)));
        assert_eq!(failing.search("mumbai", &articles).await.len(), 1);

        let offline: Searcher<StubChat> = Searcher::new(None);
        assert_eq!(offline.search("mumbai", &articles).await.len(), 1);
    }
}
