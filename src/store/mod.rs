//! Last-seen title per feed URL.

mod memory;
mod redis;

pub use self::memory::MemoryStore;
pub use self::redis::RedisStore;

use async_trait::async_trait;

use crate::errors::AppResult;

/// Key/value storage of the newest item title observed for each feed.
///
/// Values never expire. An absent key means the feed has not been seen yet.
#[async_trait]
pub trait StateStore: Send + Sync {
    async fn get_title(&self, feed_url: &str) -> AppResult<Option<String>>;

    async fn set_title(&self, feed_url: &str, title: &str) -> AppResult<()>;
}
