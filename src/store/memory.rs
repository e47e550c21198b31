use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::StateStore;
use crate::errors::AppResult;

/// Process-local store. State is lost on restart, so every feed goes through
/// its first-observation path again after a restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    titles: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_titles<I, K, V>(titles: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let titles = titles
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            titles: RwLock::new(titles),
        }
    }

    pub async fn len(&self) -> usize {
        self.titles.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.titles.read().await.is_empty()
    }
}

#[async_trait]
impl StateStore for MemoryStore {
    async fn get_title(&self, feed_url: &str) -> AppResult<Option<String>> {
        Ok(self.titles.read().await.get(feed_url).cloned())
    }

    async fn set_title(&self, feed_url: &str, title: &str) -> AppResult<()> {
        self.titles
            .write()
            .await
            .insert(feed_url.to_string(), title.to_string());
        Ok(())
    }
}
