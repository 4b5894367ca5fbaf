//! Full-article content extraction.
//!
//! Pages are downloaded with a [`FetchPage`] and parsed in two tiers:
//! Readability main-content detection first, then a plain paragraph sweep
//! when Readability finds nothing. Metadata (authors, publish date, lead
//! image, description) comes from [`metadata`].

pub mod metadata;

use crate::error::ExtractError;
use crate::fetch::FetchPage;
use crate::models::ExtractedContent;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use std::io::Cursor;
use tracing::{debug, info, instrument};
use url::Url;

static INLINE_WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t\u{a0}]+").unwrap());
static ARTICLE_PARAGRAPHS: Lazy<Selector> = Lazy::new(|| Selector::parse("article p").unwrap());
static PARAGRAPHS: Lazy<Selector> = Lazy::new(|| Selector::parse("p").unwrap());

/// Something that can turn an article URL into content.
pub trait ExtractContent {
    async fn extract(&self, url: &str) -> Result<ExtractedContent, ExtractError>;
}

/// [`ExtractContent`] that downloads through a fetcher and parses locally.
#[derive(Debug, Clone)]
pub struct ContentExtractor<F> {
    fetcher: F,
}

impl<F: FetchPage> ContentExtractor<F> {
    pub fn new(fetcher: F) -> Self {
        Self { fetcher }
    }
}

impl<F: FetchPage> ExtractContent for ContentExtractor<F> {
    #[instrument(level = "info", skip(self))]
    async fn extract(&self, url: &str) -> Result<ExtractedContent, ExtractError> {
        let page = self.fetcher.fetch(url).await?;
        let content = parse_article(&page.html, &page.final_url)?;
        info!(chars = content.body_length, "Content extracted");
        Ok(content)
    }
}

/// Collapse inline whitespace, trim lines and drop blank ones.
pub fn normalize_body(text: &str) -> String {
    text.lines()
        .map(|line| INLINE_WS.replace_all(line.trim(), " ").into_owned())
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn paragraph_text(document: &Html) -> String {
    [&*ARTICLE_PARAGRAPHS, &*PARAGRAPHS]
        .into_iter()
        .map(|selector| {
            document
                .select(selector)
                .map(|p| p.text().collect::<String>())
                .collect::<Vec<_>>()
                .join("\n")
        })
        .map(|text| normalize_body(&text))
        .find(|text| !text.is_empty())
        .unwrap_or_default()
}

/// Parse a downloaded article page.
///
/// Only fails when neither Readability nor the paragraph sweep can make
/// sense of the page; an empty body from a successful parse is returned
/// as-is and judged by the caller.
pub fn parse_article(html: &str, url: &str) -> Result<ExtractedContent, ExtractError> {
    let page_url = Url::parse(url).map_err(|_| ExtractError::InvalidUrl(url.to_string()))?;
    let document = Html::parse_document(html);

    let mut reader = Cursor::new(html.as_bytes());
    let (readable_title, readable_text) =
        match readability::extractor::extract(&mut reader, &page_url) {
            Ok(product) => (product.title, normalize_body(&product.text)),
            Err(e) => {
                debug!(%url, error = ?e, "Readability failed; using paragraph sweep");
                let fallback = paragraph_text(&document);
                if fallback.is_empty() {
                    return Err(ExtractError::Parse {
                        url: url.to_string(),
                        reason: format!("{e:?}"),
                    });
                }
                (String::new(), fallback)
            }
        };

    let body_text = if readable_text.is_empty() {
        paragraph_text(&document)
    } else {
        readable_text
    };

    let title = Some(readable_title.trim().to_string())
        .filter(|t| !t.is_empty())
        .or_else(|| metadata::extract_title(&document))
        .unwrap_or_default();

    Ok(ExtractedContent {
        authors: metadata::extract_authors(&document),
        publish_date: metadata::extract_publish_date(&document),
        lead_image: metadata::extract_lead_image(&document),
        auto_summary: metadata::extract_description(&document),
        ..ExtractedContent::with_body(title, body_text)
    })
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::stub::StubFetcher;

    const ARTICLE: &str = r#"
        <html>
          <head>
            <title>Monsoon covers entire country - The Hindu</title>
            <meta property="og:image" content="https://img.example/monsoon.jpg">
            <meta property="og:description" content="The monsoon has covered the whole country.">
            <meta property="article:published_time" content="2025-07-14T06:15:00+05:30">
            <meta name="author" content="Staff Reporter">
          </head>
          <body>
            <nav><a href="/">Home</a> <a href="/news/">News</a></nav>
            <article>
              <h1>Monsoon covers entire country</h1>
              <div class="content">
                <p>The southwest monsoon has covered the entire country, nine days ahead of its normal date, the India Meteorological Department said on Monday.</p>
                <p>Farmers in several States, including Punjab, Haryana and Rajasthan, have welcomed the early arrival, which is expected to boost sowing of kharif crops.</p>
                <p>Officials said reservoir levels, which had dipped during the heatwave, are likely to recover over the coming weeks, easing pressure on urban water supply.</p>
              </div>
            </article>
            <footer>Copyright</footer>
          </body>
        </html>
    "#;

    #[test]
    fn test_normalize_body() {
        let raw = "  First   line\t here \n\n\n   \nSecond\u{a0}\u{a0}line  ";
        assert_eq!(normalize_body(raw), "First line here\nSecond line");
    }

    #[test]
    fn test_parse_article_extracts_body_and_metadata() {
        let content =
            parse_article(ARTICLE, "https://www.thehindu.com/news/national/article1.ece").unwrap();

        assert!(content.body_text.contains("nine days ahead of its normal date"));
        assert!(content.body_text.contains("easing pressure on urban water supply"));
        assert_eq!(content.body_length, content.body_text.chars().count());
        assert!(content.body_length >= 100);
        assert_eq!(content.authors, vec!["Staff Reporter"]);
        assert_eq!(content.lead_image.as_deref(), Some("https://img.example/monsoon.jpg"));
        assert_eq!(content.auto_summary, "The monsoon has covered the whole country.");
        assert!(content.publish_date.is_some());
        assert!(!content.title.is_empty());
    }

    #[test]
    fn test_parse_article_rejects_bad_url() {
        let err = parse_article(ARTICLE, "not a url").unwrap_err();
        assert!(matches!(err, ExtractError::InvalidUrl(_)));
        assert_eq!(err.kind(), "parse");
    }

    #[test]
    fn test_paragraph_sweep_prefers_article_scope() {
        let html = r#"
            <p>Outside paragraph</p>
            <article><p>Inside   one</p><p>Inside two</p></article>
        "#;
        assert_eq!(paragraph_text(&Html::parse_document(html)), "Inside one\nInside two");

        let html = r#"<div><p>Only loose paragraph</p></div>"#;
        assert_eq!(paragraph_text(&Html::parse_document(html)), "Only loose paragraph");
    }

    #[tokio::test]
    async fn test_content_extractor_propagates_fetch_failure() {
        let extractor = ContentExtractor::new(StubFetcher::default());
        let err = extractor.extract("https://www.thehindu.com/news/x").await.unwrap_err();
        assert_eq!(err.kind(), "transport");
    }

    #[tokio::test]
    async fn test_content_extractor_parses_fetched_page() {
        let url = "https://www.thehindu.com/news/national/article1.ece";
        let extractor = ContentExtractor::new(StubFetcher::default().with_page(url, ARTICLE));
        let content = extractor.extract(url).await.unwrap();
        assert!(content.body_length >= 100);
        assert_eq!(content.authors, vec!["Staff Reporter"]);
    }
}
