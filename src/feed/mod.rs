mod client;

pub use client::{parse_snapshot, HttpFeedClient};

use async_trait::async_trait;

use crate::errors::AppResult;

/// What one fetch tells us about a feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedSnapshot {
    /// Display title of the feed itself
    pub title: String,
    /// Title of the first entry in document order
    pub latest_title: String,
}

#[async_trait]
pub trait FeedClient: Send + Sync {
    /// Fetch and parse `url`. A feed with no entries is an error.
    async fn fetch(&self, url: &str) -> AppResult<FeedSnapshot>;
}
