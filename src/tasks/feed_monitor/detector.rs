use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use super::types::{CheckSummary, FeedOutcome};
use crate::{
    errors::AppResult,
    feed::FeedClient,
    feishu::Messenger,
    store::StateStore,
    tasks::notifier::{broadcast_text, format_release_message, LinkRule},
};

/// Compares each feed's newest item against the stored one and announces
/// changes to every chat.
///
/// Holds no feed state of its own; everything lives in the [`StateStore`],
/// so a restart does not re-announce items that were already seen.
pub struct ChangeDetector {
    feeds: Arc<dyn FeedClient>,
    store: Arc<dyn StateStore>,
    messenger: Arc<dyn Messenger>,
    feed_urls: Vec<String>,
    link_rule: LinkRule,
    // One lock per configured URL, held across read-compare-write-broadcast
    // so overlapping runs cannot both see the same change.
    locks: HashMap<String, Mutex<()>>,
}

impl ChangeDetector {
    pub fn new(
        feeds: Arc<dyn FeedClient>,
        store: Arc<dyn StateStore>,
        messenger: Arc<dyn Messenger>,
        feed_urls: Vec<String>,
        link_rule: LinkRule,
    ) -> Self {
        let locks = feed_urls
            .iter()
            .map(|url| (url.clone(), Mutex::new(())))
            .collect();
        Self {
            feeds,
            store,
            messenger,
            feed_urls,
            link_rule,
            locks,
        }
    }

    pub fn feed_urls(&self) -> &[String] {
        &self.feed_urls
    }

    /// Check every configured feed once. A failure on one feed is logged and
    /// the rest are still processed.
    pub async fn check_and_notify(&self) -> CheckSummary {
        let mut summary = CheckSummary::default();

        for url in &self.feed_urls {
            log::debug!("Checking feed {url}");
            match self.check_feed(url).await {
                Ok(outcome) => summary.record(outcome),
                Err(e) => {
                    if e.is_transient() {
                        log::warn!("Skipping feed {url}: {e}");
                    } else {
                        log::error!("Skipping feed {url}: {e}");
                    }
                    summary.skipped += 1;
                }
            }
        }

        summary
    }

    pub async fn check_feed(&self, url: &str) -> AppResult<FeedOutcome> {
        let snapshot = self.feeds.fetch(url).await?;

        let _guard = match self.locks.get(url) {
            Some(lock) => Some(lock.lock().await),
            None => None,
        };

        let stored = self.store.get_title(url).await?;
        match stored {
            None => {
                self.store.set_title(url, &snapshot.latest_title).await?;
                log::info!("First observation of {url}: {:?}", snapshot.latest_title);
                Ok(FeedOutcome::FirstSeen)
            }
            Some(previous) if previous == snapshot.latest_title => Ok(FeedOutcome::Unchanged),
            Some(previous) => {
                self.store.set_title(url, &snapshot.latest_title).await?;
                log::info!(
                    "New item on {url}: {:?} (was {:?})",
                    snapshot.latest_title,
                    previous
                );

                let text = format_release_message(&snapshot, self.link_rule.apply(url));
                match broadcast_text(self.messenger.as_ref(), &text).await {
                    Ok(report) => Ok(FeedOutcome::Changed {
                        delivered: report.delivered,
                    }),
                    Err(e) => {
                        log::error!("Broadcast for {url} aborted: {e}");
                        Ok(FeedOutcome::Changed { delivered: 0 })
                    }
                }
            }
        }
    }
}
