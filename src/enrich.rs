//! AI summary and keyword enrichment.
//!
//! The model is asked for a JSON object `{"summary": ..., "keywords": [...]}`.
//! Enrichment never fails the caller: transport errors give an empty
//! [`Enrichment`], and a reply that is not the expected JSON is kept as a
//! short plain-text summary with no keywords.

use crate::api::{AskAsync, ChatPrompt};
use crate::models::Enrichment;
use crate::utils::{looks_truncated, truncate_chars, truncate_for_log};
use itertools::Itertools;
use serde_json::Value;
use tracing::{info, instrument, warn};

pub const DEFAULT_MAX_CONTENT_CHARS: usize = 8000;
pub const MAX_KEYWORDS: usize = 7;
/// Characters of a non-JSON reply kept as the summary.
const FALLBACK_SUMMARY_CHARS: usize = 200;

const SYSTEM_PROMPT: &str = "You are a helpful assistant that summarizes news articles and extracts key information. Always respond with valid JSON.";

/// Summarizes article bodies through an [`AskAsync`] model.
#[derive(Debug)]
pub struct Enricher<A> {
    chat: A,
    max_content_chars: usize,
}

impl<A: AskAsync> Enricher<A> {
    pub fn new(chat: A, max_content_chars: usize) -> Self {
        Self {
            chat,
            max_content_chars,
        }
    }

    pub fn build_prompt(&self, title: &str, body: &str) -> ChatPrompt {
        let body = truncate_chars(body, self.max_content_chars);
        let user = format!(
            r#"Please analyze the following news article and provide:

1. A concise summary (2-3 sentences)
2. 5-7 important keywords/key phrases

Article Title: {title}
Article Content: {body}

Format your response as JSON:
{{
    "summary": "concise summary here",
    "keywords": ["keyword1", "keyword2", "keyword3"]
}}"#
        );

        ChatPrompt {
            system: SYSTEM_PROMPT.to_string(),
            user,
            temperature: 0.3,
            max_tokens: 500,
        }
    }

    /// Summary and keywords for one article; empty on any failure.
    #[instrument(level = "info", skip_all, fields(title = %truncate_for_log(title, 60)))]
    pub async fn enrich(&self, title: &str, body: &str) -> Enrichment {
        if body.trim().is_empty() {
            return Enrichment::default();
        }

        match self.chat.ask(&self.build_prompt(title, body)).await {
            Ok(raw) => {
                let enrichment = decode_enrichment(&raw);
                info!(keywords = enrichment.keywords.len(), "Generated summary and keywords");
                enrichment
            }
            Err(e) => {
                warn!(kind = e.kind(), error = %e, "Enrichment call failed");
                Enrichment::default()
            }
        }
    }
}

/// Remove a surrounding Markdown code fence, if any.
fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.split_once('\n').map(|(_, body)| body).unwrap_or("");
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}

/// Keyword strings from whatever shape the model used for `keywords`.
///
/// An array keeps its string entries; a bare string is split on commas.
/// Anything else yields nothing.
fn keyword_strings(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        Some(Value::String(joined)) => joined.split(',').map(str::to_string).collect(),
        _ => Vec::new(),
    }
}

/// Decode a model reply into an [`Enrichment`].
///
/// # Arguments
///
/// * `raw` - The model's text reply, optionally wrapped in a code fence
///
/// # Returns
///
/// For a JSON object, its `summary` and `keywords` fields. Missing or
/// wrongly typed fields come back empty, and keywords are trimmed,
/// de-duplicated and capped at [`MAX_KEYWORDS`]. A reply that is not a
/// JSON object becomes the first 200 characters of the reply as the
/// summary, with no keywords.
pub fn decode_enrichment(raw: &str) -> Enrichment {
    let parsed = serde_json::from_str::<Value>(strip_code_fence(raw));
    match parsed {
        Ok(Value::Object(fields)) => Enrichment {
            summary: fields
                .get("summary")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .trim()
                .to_string(),
            keywords: keyword_strings(fields.get("keywords"))
                .into_iter()
                .map(|k| k.trim().to_string())
                .filter(|k| !k.is_empty())
                .unique()
                .take(MAX_KEYWORDS)
                .collect(),
        },
        other => {
            match &other {
                Err(e) => warn!(
                    error = %e,
                    truncated = looks_truncated(e),
                    response_preview = %truncate_for_log(raw, 120),
                    "Enrichment reply was not valid JSON; using raw text"
                ),
                Ok(_) => warn!(
                    response_preview = %truncate_for_log(raw, 120),
                    "Enrichment reply was JSON but not an object; using raw text"
                ),
            }
            Enrichment {
                summary: truncate_chars(raw.trim(), FALLBACK_SUMMARY_CHARS),
                keywords: Vec::new(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::stub::StubChat;

    #[test]
    fn test_decode_valid_json() {
        let raw = r#"{"summary": " Rains lash Mumbai. ", "keywords": ["Mumbai", " rain ", "", "Mumbai", "IMD"]}"#;
        let e = decode_enrichment(raw);
        assert_eq!(e.summary, "Rains lash Mumbai.");
        assert_eq!(e.keywords, vec!["Mumbai", "rain", "IMD"]);
    }

    #[test]
    fn test_decode_missing_fields_default() {
        assert_eq!(decode_enrichment(r#"{"summary": "Only a summary"}"#).keywords.len(), 0);
        assert_eq!(decode_enrichment(r#"{"keywords": ["a"]}"#).summary, "");
    }

    #[test]
    fn test_decode_comma_separated_keywords() {
        let raw = r#"{"summary": "Parliament passed the bill.", "keywords": "budget, tax, "}"#;
        let e = decode_enrichment(raw);
        assert_eq!(e.summary, "Parliament passed the bill.");
        assert_eq!(e.keywords, vec!["budget", "tax"]);
    }

    #[test]
    fn test_decode_wrong_typed_fields_default() {
        let e = decode_enrichment(r#"{"summary": null, "keywords": ["a", 3, null, "b"]}"#);
        assert_eq!(e.summary, "");
        assert_eq!(e.keywords, vec!["a", "b"]);

        let e = decode_enrichment(r#"{"summary": 42, "keywords": {"k": "v"}}"#);
        assert_eq!(e, Enrichment::default());
    }

    #[test]
    fn test_decode_non_object_json_falls_back() {
        let e = decode_enrichment(r#"["budget", "tax"]"#);
        assert_eq!(e.summary, r#"["budget", "tax"]"#);
        assert!(e.keywords.is_empty());
    }

    #[test]
    fn test_decode_caps_keywords() {
        let raw = r#"{"summary": "s", "keywords": ["1","2","3","4","5","6","7","8","9"]}"#;
        assert_eq!(decode_enrichment(raw).keywords.len(), MAX_KEYWORDS);
    }

    #[test]
    fn test_decode_fenced_json() {
        let raw = "```json\n{\"summary\": \"Fenced\", \"keywords\": [\"k\"]}\n```";
        let e = decode_enrichment(raw);
        assert_eq!(e.summary, "Fenced");
        assert_eq!(e.keywords, vec!["k"]);
    }

    #[test]
    fn test_decode_plain_text_falls_back() {
        let short = "The article discusses the budget.";
        assert_eq!(
            decode_enrichment(short),
            Enrichment {
                summary: short.to_string(),
                keywords: vec![]
            }
        );

        let long = "x".repeat(250);
        let e = decode_enrichment(&long);
        assert_eq!(e.summary, format!("{}...", "x".repeat(200)));
        assert!(e.keywords.is_empty());
    }

    #[test]
    fn test_prompt_truncates_body() {
        let enricher = Enricher::new(StubChat::replying("{}"), 10);
        let prompt = enricher.build_prompt("Title here", "abcdefghijklmnop");
        assert!(prompt.user.contains("Article Content: abcdefghij..."));
        assert!(prompt.user.contains("Article Title: Title here"));
        assert_eq!(prompt.max_tokens, 500);
    }

    #[tokio::test]
    async fn test_enrich_uses_model_reply() {
        let chat = StubChat::replying(r#"{"summary": "Short summary.", "keywords": ["one", "two"]}"#);
        let enricher = Enricher::new(chat, DEFAULT_MAX_CONTENT_CHARS);
        let e = enricher.enrich("Title", "Body of the article").await;
        assert_eq!(e.summary, "Short summary.");
        assert_eq!(e.keywords, vec!["one", "two"]);
        assert_eq!(enricher.chat.prompts.borrow().len(), 1);
    }

    #[tokio::test]
    async fn test_enrich_failure_is_empty() {
        let enricher = Enricher::new(StubChat::failing(503), DEFAULT_MAX_CONTENT_CHARS);
        assert_eq!(enricher.enrich("Title", "Body").await, Enrichment::default());
    }

    #[tokio::test]
    async fn test_enrich_skips_empty_body() {
        let enricher = Enricher::new(StubChat::replying("{}"), DEFAULT_MAX_CONTENT_CHARS);
        assert_eq!(enricher.enrich("Title", "   ").await, Enrichment::default());
        assert!(enricher.chat.prompts.borrow().is_empty());
    }
}
