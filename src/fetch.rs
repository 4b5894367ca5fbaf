//! Plain HTTP page downloads with a bounded timeout.
//!
//! Both the listing extractor and the content extractor go through the
//! [`FetchPage`] trait, which lets tests serve canned HTML without a network.

use crate::error::FetchError;
use std::time::Duration;
use tracing::{debug, instrument};

/// Desktop browser user agent; both news sites serve reduced markup to
/// unknown clients.
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/123.0.0.0 Safari/537.36";

/// A downloaded HTML page.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// URL after HTTP-level redirects.
    pub final_url: String,
    pub html: String,
}

/// Something that can download a page.
pub trait FetchPage {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError>;
}

/// [`FetchPage`] backed by a shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(10))
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }
}

impl FetchPage for HttpFetcher {
    #[instrument(level = "debug", skip(self))]
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
        let resp = self
            .client
            .get(url)
            .header("Accept-Language", "en-US,en;q=0.9")
            .send()
            .await
            .map_err(|source| FetchError::Transport {
                url: url.to_string(),
                source,
            })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let final_url = resp.url().to_string();
        let html = resp.text().await.map_err(|source| FetchError::Body {
            url: url.to_string(),
            source,
        })?;
        debug!(%final_url, bytes = html.len(), "Fetched page");

        Ok(FetchedPage { final_url, html })
    }
}


#[cfg(test)]
mod tests {
    use super::stub::StubFetcher;
    use super::*;

    #[test]
    fn test_http_fetcher_builds() {
        assert!(HttpFetcher::new(Duration::from_secs(10)).is_ok());
    }

    #[tokio::test]
    async fn test_stub_fetcher_missing_page_is_status_error() {
        let fetcher = StubFetcher::default().with_page("https://a.example/", "<html></html>");
        assert!(fetcher.fetch("https://a.example/").await.is_ok());

        let err = fetcher.fetch("https://b.example/").await.unwrap_err();
        assert!(matches!(err, FetchError::Status { status: 404, .. }));
        assert_eq!(fetcher.requests.borrow().len(), 2);
    }
}
