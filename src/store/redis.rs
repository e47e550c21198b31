use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;

use super::StateStore;
use crate::errors::AppResult;

/// Redis-backed store: `GET <feed-url>` / `SET <feed-url> <title>`, no TTL.
#[derive(Clone)]
pub struct RedisStore {
    manager: ConnectionManager,
}

impl RedisStore {
    pub async fn connect(redis_url: &str) -> AppResult<Self> {
        let client = redis::Client::open(redis_url)?;
        let manager = ConnectionManager::new(client).await?;
        log::info!("Connected to Redis state store");
        Ok(Self { manager })
    }
}

#[async_trait]
impl StateStore for RedisStore {
    async fn get_title(&self, feed_url: &str) -> AppResult<Option<String>> {
        let mut conn = self.manager.clone();
        let title: Option<String> = conn.get(feed_url).await?;
        Ok(title)
    }

    async fn set_title(&self, feed_url: &str, title: &str) -> AppResult<()> {
        let mut conn = self.manager.clone();
        conn.set::<_, _, ()>(feed_url, title).await?;
        Ok(())
    }
}
