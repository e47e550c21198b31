use serde::{Deserialize, Serialize};

pub const MSG_TYPE_TEXT: &str = "text";

/// Outbound text message, the body of `POST /open-apis/message/v4/send/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextMessage {
    pub chat_id: String,
    pub msg_type: String,
    pub content: TextMessageContent,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextMessageContent {
    pub text: String,
}

impl TextMessage {
    pub fn new(chat_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            chat_id: chat_id.into(),
            msg_type: MSG_TYPE_TEXT.to_string(),
            content: TextMessageContent { text: text.into() },
        }
    }
}

/// A group chat the bot is a member of.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChatGroup {
    pub chat_id: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    pub code: i64,
    #[serde(default)]
    pub msg: String,
    pub data: Option<T>,
}

#[derive(Debug, Deserialize)]
pub struct ChatListData {
    #[serde(default)]
    pub groups: Vec<ChatGroup>,
    #[serde(default)]
    pub has_more: bool,
    #[serde(default)]
    pub page_token: String,
}

#[derive(Debug, Serialize)]
pub struct TokenRequest<'a> {
    pub app_id: &'a str,
    pub app_secret: &'a str,
}

/// The token endpoint returns its fields at the top level rather than under `data`.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub code: i64,
    #[serde(default)]
    pub msg: String,
    #[serde(default)]
    pub tenant_access_token: String,
    #[serde(default)]
    pub expire: u64,
}
