//! Feed fetching and one-line summaries.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use scraper::{Html, Selector};
use thiserror::Error;
use url::Url;

use crate::config::FeedConfig;

/// Errors from fetching or parsing a feed.
#[derive(Error, Debug)]
pub enum FeedError {
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
    #[error("request failed: {0}")]
    RequestFailed(String),
    #[error("timed out after {0}s")]
    Timeout(u64),
    #[error("failed to parse feed: {0}")]
    ParseError(String),
    #[error("document is not an RSS or Atom feed")]
    NotAFeed,
}

/// Retrieves remote documents.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch the body at `url`.
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FeedError>;
}

/// [`Fetcher`] over HTTP(S).
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Build a fetcher with the configured timeouts.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: &FeedConfig) -> Result<Self, FeedError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("infobot/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FeedError::RequestFailed(e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FeedError> {
        let parsed = Url::parse(url).map_err(|e| FeedError::InvalidUrl(e.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(FeedError::InvalidUrl(format!(
                "unsupported scheme {}",
                parsed.scheme()
            )));
        }

        let response = self.client.get(parsed).send().await.map_err(|e| {
            if e.is_timeout() {
                FeedError::RequestFailed("request timed out".to_string())
            } else {
                FeedError::RequestFailed(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::RequestFailed(format!("HTTP {status}")));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| FeedError::RequestFailed(e.to_string()))?;
        Ok(body.to_vec())
    }
}

/// Renders feeds as a single `"; "`-separated line of entry titles.
#[derive(Clone)]
pub struct FeedSummarizer {
    fetcher: Arc<dyn Fetcher>,
    timeout: Duration,
}

impl FeedSummarizer {
    #[must_use]
    pub fn new(fetcher: Arc<dyn Fetcher>, timeout: Duration) -> Self {
        Self { fetcher, timeout }
    }

    /// Summarize the feed at `url`.
    ///
    /// Never fails: any fetch or parse problem becomes an inline error
    /// string naming the URL.
    pub async fn summarize(&self, url: &str) -> String {
        match self.try_summarize(url).await {
            Ok(line) => line,
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "Feed summary failed");
                format!("[error fetching {url}: {e}]")
            }
        }
    }

    async fn try_summarize(&self, url: &str) -> Result<String, FeedError> {
        let body = tokio::time::timeout(self.timeout, self.fetcher.fetch(url))
            .await
            .map_err(|_| FeedError::Timeout(self.timeout.as_secs()))??;
        render_titles(&body)
    }
}

/// Extract entry titles from an RSS or Atom document.
///
/// # Errors
///
/// Returns an error if the body is not UTF-8 or not a feed.
pub fn render_titles(body: &[u8]) -> Result<String, FeedError> {
    let text = std::str::from_utf8(body).map_err(|e| FeedError::ParseError(e.to_string()))?;
    let document = Html::parse_document(text);

    let root = Selector::parse("rss, feed, channel")
        .map_err(|e| FeedError::ParseError(e.to_string()))?;
    if document.select(&root).next().is_none() {
        return Err(FeedError::NotAFeed);
    }

    let titles = Selector::parse("item > title, entry > title")
        .map_err(|e| FeedError::ParseError(e.to_string()))?;
    let cdata = Regex::new(r"(?s)<!\[CDATA\[(.*?)\]\]>")
        .map_err(|e| FeedError::ParseError(e.to_string()))?;

    let line = document
        .select(&titles)
        .map(|el| {
            let raw: String = el.text().collect();
            let unwrapped = cdata.replace_all(&raw, "$1");
            unwrapped.split_whitespace().collect::<Vec<_>>().join(" ")
        })
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join("; ");
    Ok(line)
}
