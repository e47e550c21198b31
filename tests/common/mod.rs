#![allow(dead_code)]

use async_trait::async_trait;
use rss_robot::{
    errors::{AppError, AppResult},
    feed::{FeedClient, FeedSnapshot},
    feishu::{ChatGroup, Messenger, TextMessage},
};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Serves canned snapshots; URLs without one fail like an unreachable host.
/// Each fetch takes `delay` and is counted when it starts and when it returns.
#[derive(Default)]
pub struct FakeFeeds {
    snapshots: Mutex<HashMap<String, FeedSnapshot>>,
    delay: Duration,
    fetches: AtomicUsize,
    completed: AtomicUsize,
}

impl FakeFeeds {
    pub fn with(entries: &[(&str, &str, &str)]) -> Self {
        let feeds = Self::default();
        for (url, title, latest) in entries {
            feeds.publish(url, title, latest);
        }
        feeds
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }

    pub fn publish(&self, url: &str, title: &str, latest: &str) {
        self.snapshots.lock().unwrap().insert(
            url.to_string(),
            FeedSnapshot {
                title: title.to_string(),
                latest_title: latest.to_string(),
            },
        );
    }
}

#[async_trait]
impl FeedClient for FakeFeeds {
    async fn fetch(&self, url: &str) -> AppResult<FeedSnapshot> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.completed.fetch_add(1, Ordering::SeqCst);
        self.snapshots
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .ok_or_else(|| AppError::HttpStatus {
                url: url.to_string(),
                status: 502,
            })
    }
}

/// Records every send as it starts. Chats listed in `failing` reject their
/// message; every send takes `send_delay`.
#[derive(Default)]
pub struct RecordingMessenger {
    pub chats: Vec<ChatGroup>,
    pub failing: HashSet<String>,
    pub list_fails: bool,
    pub send_delay: Duration,
    pub sent: Mutex<Vec<TextMessage>>,
}

impl RecordingMessenger {
    pub fn with_chats(ids: &[&str]) -> Self {
        Self {
            chats: ids
                .iter()
                .map(|id| ChatGroup {
                    chat_id: id.to_string(),
                    name: format!("group {id}"),
                })
                .collect(),
            ..Default::default()
        }
    }

    pub fn sent(&self) -> Vec<TextMessage> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Messenger for RecordingMessenger {
    async fn list_chats(&self) -> AppResult<Vec<ChatGroup>> {
        if self.list_fails {
            return Err(AppError::Feishu {
                code: 99991663,
                msg: "tenant access token invalid".to_string(),
            });
        }
        Ok(self.chats.clone())
    }

    async fn send(&self, message: &TextMessage) -> AppResult<()> {
        self.sent.lock().unwrap().push(message.clone());
        if !self.send_delay.is_zero() {
            tokio::time::sleep(self.send_delay).await;
        }
        if self.failing.contains(&message.chat_id) {
            return Err(AppError::Feishu {
                code: 230002,
                msg: "bot not in chat".to_string(),
            });
        }
        Ok(())
    }
}
