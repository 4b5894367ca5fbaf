//! Error types for the external boundaries of the pipeline.
//!
//! Every network-facing component reports failures through one of these
//! enums so that callers can log *why* a call failed before falling back
//! to an empty or unchanged result.

use thiserror::Error;

/// Failure to download a page.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("could not read body of {url}: {source}")]
    Body {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Failure to turn a URL into article content.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("invalid article url {0}")]
    InvalidUrl(String),

    #[error("could not parse article at {url}: {reason}")]
    Parse { url: String, reason: String },
}

impl ExtractError {
    /// Short label for structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            ExtractError::Fetch(_) => "transport",
            ExtractError::InvalidUrl(_) | ExtractError::Parse { .. } => "parse",
        }
    }
}

/// Failure while settling a URL in the headless browser.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("could not launch headless browser: {0}")]
    Launch(String),

    #[error("navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },

    #[error("browser task did not complete: {0}")]
    Aborted(#[from] tokio::task::JoinError),
}

/// Failure talking to the chat-completions service.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("chat request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("chat API returned HTTP {status}: {body}")]
    Api { status: u16, body: String },

    #[error("chat response had no message content")]
    EmptyResponse,

    #[error("invalid API key header: {0}")]
    InvalidKey(#[from] reqwest::header::InvalidHeaderValue),
}

impl LlmError {
    pub fn kind(&self) -> &'static str {
        match self {
            LlmError::Transport(_) => "transport",
            LlmError::Api { .. } => "api",
            LlmError::EmptyResponse => "empty",
            LlmError::InvalidKey(_) => "config",
        }
    }
}
