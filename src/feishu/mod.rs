//! Feishu (Lark) bot integration: outbound API calls and inbound webhook events.

pub mod client;
pub mod crypto;
pub mod event;
pub mod types;

pub use client::{FeishuClient, FeishuConfig};
pub use event::{EventParser, InboundEvent, RequestSignature};
pub use types::{ChatGroup, TextMessage};

use async_trait::async_trait;

use crate::errors::AppResult;

/// The messaging operations the relay needs from the platform.
#[async_trait]
pub trait Messenger: Send + Sync {
    /// Every chat group the bot currently belongs to.
    async fn list_chats(&self) -> AppResult<Vec<ChatGroup>>;

    async fn send(&self, message: &TextMessage) -> AppResult<()>;
}
