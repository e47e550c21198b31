use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::errors::{AppError, AppResult};
use crate::tasks::notifier::LinkRule;

pub const DEFAULT_CONFIG_PATH: &str = "config.json";
pub const DEFAULT_CHECK_INTERVAL_SECS: u64 = 300;
pub const DEFAULT_FEISHU_BASE_URL: &str = "https://open.feishu.cn";
pub const DEFAULT_REPLY_BANNER: &str = "Subscribed feeds:";

/// Settings read from the JSON config file.
///
/// Key names match the file format operators already deploy with, hence the
/// explicit renames.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(rename = "AppId")]
    pub app_id: String,
    #[serde(rename = "AppSecret")]
    pub app_secret: String,
    #[serde(rename = "VerificationToken", default)]
    pub verification_token: String,
    #[serde(rename = "EncryptKey", default)]
    pub encrypt_key: String,
    #[serde(rename = "RedisAddr", default)]
    pub redis_addr: String,
    #[serde(rename = "RedisPassword", default)]
    pub redis_password: String,
    #[serde(rename = "RedisDB", default)]
    pub redis_db: i64,
    #[serde(rename = "LISTEN")]
    pub listen: String,
    #[serde(rename = "DefaultFeedUrls", default)]
    pub feed_urls: Vec<String>,
    /// Strip this many trailing characters to form the announced link
    /// instead of dropping the file extension.
    #[serde(rename = "LinkSuffixLen", default)]
    pub link_suffix_len: Option<usize>,
    #[serde(rename = "CheckIntervalSecs", default = "default_check_interval_secs")]
    pub check_interval_secs: u64,
    #[serde(rename = "ReplyBanner", default = "default_reply_banner")]
    pub reply_banner: String,
    #[serde(rename = "FeishuBaseUrl", default = "default_feishu_base_url")]
    pub feishu_base_url: String,
}

fn default_check_interval_secs() -> u64 {
    DEFAULT_CHECK_INTERVAL_SECS
}

fn default_reply_banner() -> String {
    DEFAULT_REPLY_BANNER.to_string()
}

fn default_feishu_base_url() -> String {
    DEFAULT_FEISHU_BASE_URL.to_string()
}

impl AppConfig {
    /// Read, override from the environment, and validate.
    pub fn load(path: &Path) -> AppResult<Self> {
        log::info!("Loading configuration from {}", path.display());
        let raw = std::fs::read_to_string(path)?;
        let mut config = Self::from_json(&raw)?;
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_json(raw: &str) -> AppResult<Self> {
        serde_json::from_str(raw).map_err(|e| AppError::config(format!("invalid config file: {e}")))
    }

    /// Apply `RR_*` overrides. `lookup` is `std::env::var` outside of tests.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(listen) = lookup("RR_LISTEN") {
            log::info!("Using listen address from RR_LISTEN: {}", listen);
            self.listen = listen;
        }
        if let Some(addr) = lookup("RR_REDIS_ADDR") {
            log::info!("Using Redis address from RR_REDIS_ADDR: {}", addr);
            self.redis_addr = addr;
        }
        if let Some(password) = lookup("RR_REDIS_PASSWORD") {
            log::info!("Using Redis password from RR_REDIS_PASSWORD");
            self.redis_password = password;
        }
        if let Some(secret) = lookup("RR_APP_SECRET") {
            log::info!("Using app secret from RR_APP_SECRET");
            self.app_secret = secret;
        }
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.app_id.trim().is_empty() {
            return Err(AppError::config("AppId must not be empty"));
        }
        if self.app_secret.trim().is_empty() {
            return Err(AppError::config("AppSecret must not be empty"));
        }
        if self.listen.trim().is_empty() {
            return Err(AppError::config("LISTEN must not be empty"));
        }
        if self.check_interval_secs == 0 {
            return Err(AppError::config("CheckIntervalSecs must be positive"));
        }
        for feed_url in &self.feed_urls {
            url::Url::parse(feed_url)
                .map_err(|e| AppError::config(format!("invalid feed URL {feed_url}: {e}")))?;
        }
        if self.feed_urls.is_empty() {
            log::warn!("No feeds configured in DefaultFeedUrls");
        }
        Ok(())
    }

    pub fn link_rule(&self) -> LinkRule {
        match self.link_suffix_len {
            Some(n) => LinkRule::StripChars(n),
            None => LinkRule::StripExtension,
        }
    }

    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(self.check_interval_secs)
    }

    /// `redis://` connection URL, or `None` when no Redis address is set.
    pub fn redis_url(&self) -> Option<String> {
        let addr = self.redis_addr.trim();
        if addr.is_empty() {
            return None;
        }
        let url = if self.redis_password.is_empty() {
            format!("redis://{}/{}", addr, self.redis_db)
        } else {
            format!(
                "redis://:{}@{}/{}",
                urlencoding::encode(&self.redis_password),
                addr,
                self.redis_db
            )
        };
        Some(url)
    }
}
