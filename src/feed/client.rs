use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use super::{FeedClient, FeedSnapshot};
use crate::errors::{AppError, AppResult};

const REQUEST_TIMEOUT_SECS: u64 = 30;

const USER_AGENT: &str = concat!("rss-robot/", env!("CARGO_PKG_VERSION"));

// See: https://stackoverflow.com/a/7001617/5155484
const ACCEPT: &str = "application/rss+xml, application/rdf+xml, application/atom+xml, application/feed+json, application/xml;q=0.9, text/xml;q=0.8";

pub struct HttpFeedClient {
    client: Client,
}

impl HttpFeedClient {
    pub fn new() -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl FeedClient for HttpFeedClient {
    async fn fetch(&self, url: &str) -> AppResult<FeedSnapshot> {
        let response = self
            .client
            .get(url)
            .header("Accept", ACCEPT)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AppError::HttpStatus {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        let body = response.bytes().await?;
        log::debug!("Got {} bytes for feed {}", body.len(), url);
        parse_snapshot(&body, url)
    }
}

/// Parse a feed document into its title and newest entry title.
///
/// Entries without a title fall back to their summary, as some feeds only
/// carry a description.
pub fn parse_snapshot(body: &[u8], url: &str) -> AppResult<FeedSnapshot> {
    let parsed = feed_rs::parser::parse(body)?;

    let entry = parsed
        .entries
        .into_iter()
        .next()
        .ok_or_else(|| AppError::EmptyFeed(url.to_string()))?;

    let latest_title = entry
        .title
        .or(entry.summary)
        .map(|t| t.content.trim().to_string())
        .unwrap_or_default();
    let title = parsed
        .title
        .map(|t| t.content.trim().to_string())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| url.to_string());

    Ok(FeedSnapshot {
        title,
        latest_title,
    })
}
