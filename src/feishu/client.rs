use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

use super::types::{
    ApiResponse, ChatGroup, ChatListData, TextMessage, TokenRequest, TokenResponse,
};
use super::Messenger;
use crate::errors::{AppError, AppResult};

const REQUEST_TIMEOUT_SECS: u64 = 15;
const CHAT_PAGE_SIZE: u32 = 100;
/// Refresh the tenant token this long before Feishu says it expires.
const TOKEN_REFRESH_MARGIN: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
pub struct FeishuConfig {
    pub app_id: String,
    pub app_secret: String,
    pub base_url: String,
}

impl FeishuConfig {
    fn token_url(&self) -> String {
        format!("{}/open-apis/auth/v3/tenant_access_token/internal", self.base_url)
    }

    fn chat_list_url(&self) -> String {
        format!("{}/open-apis/chat/v4/list", self.base_url)
    }

    fn send_message_url(&self) -> String {
        format!("{}/open-apis/message/v4/send/", self.base_url)
    }
}

struct CachedToken {
    value: String,
    refresh_at: Instant,
}

/// Feishu Open API client for the bot.
///
/// Safe to share between tasks; the tenant token cache sits behind an async
/// mutex so concurrent callers refresh it at most once.
pub struct FeishuClient {
    client: Client,
    config: FeishuConfig,
    token: Mutex<Option<CachedToken>>,
}

impl FeishuClient {
    pub fn new(config: FeishuConfig) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            config,
            token: Mutex::new(None),
        })
    }

    async fn tenant_access_token(&self) -> AppResult<String> {
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref() {
            if Instant::now() < token.refresh_at {
                return Ok(token.value.clone());
            }
        }

        let request = TokenRequest {
            app_id: &self.config.app_id,
            app_secret: &self.config.app_secret,
        };
        let response: TokenResponse = self
            .client
            .post(self.config.token_url())
            .json(&request)
            .send()
            .await?
            .json()
            .await?;

        if response.code != 0 {
            return Err(AppError::Feishu {
                code: response.code,
                msg: response.msg,
            });
        }

        let lifetime = Duration::from_secs(response.expire).saturating_sub(TOKEN_REFRESH_MARGIN);
        log::debug!("Obtained tenant access token valid for {}s", response.expire);
        *cached = Some(CachedToken {
            value: response.tenant_access_token.clone(),
            refresh_at: Instant::now() + lifetime,
        });
        Ok(response.tenant_access_token)
    }

    async fn list_chats_page(&self, token: &str, page_token: &str) -> AppResult<ChatListData> {
        let mut request = self
            .client
            .get(self.config.chat_list_url())
            .bearer_auth(token)
            .query(&[("page_size", CHAT_PAGE_SIZE.to_string())]);
        if !page_token.is_empty() {
            request = request.query(&[("page_token", page_token)]);
        }

        let body = request.send().await?.bytes().await?;
        let response: ApiResponse<ChatListData> = serde_json::from_slice(&body)?;
        if response.code != 0 {
            return Err(AppError::Feishu {
                code: response.code,
                msg: response.msg,
            });
        }
        response.data.ok_or_else(|| AppError::Feishu {
            code: response.code,
            msg: "chat list response has no data".to_string(),
        })
    }
}

#[async_trait]
impl Messenger for FeishuClient {
    async fn list_chats(&self) -> AppResult<Vec<ChatGroup>> {
        let token = self.tenant_access_token().await?;
        let mut chats = Vec::new();
        let mut page_token = String::new();

        loop {
            let page = self.list_chats_page(&token, &page_token).await?;
            chats.extend(page.groups);
            if !page.has_more || page.page_token.is_empty() {
                break;
            }
            page_token = page.page_token;
        }

        log::debug!("Bot is a member of {} chats", chats.len());
        Ok(chats)
    }

    async fn send(&self, message: &TextMessage) -> AppResult<()> {
        let token = self.tenant_access_token().await?;
        let body = self
            .client
            .post(self.config.send_message_url())
            .bearer_auth(&token)
            .json(message)
            .send()
            .await?
            .bytes()
            .await?;

        let response: ApiResponse<serde_json::Value> = serde_json::from_slice(&body)?;
        if response.code != 0 {
            return Err(AppError::Feishu {
                code: response.code,
                msg: response.msg,
            });
        }
        Ok(())
    }
}
