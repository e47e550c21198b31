use ring::constant_time::verify_slices_are_equal;
use serde::Deserialize;
use serde_json::Value;

use super::crypto::{request_signature, EventCipher};
use crate::errors::{AppError, AppResult};

const URL_VERIFICATION: &str = "url_verification";
const EVENT_CALLBACK: &str = "event_callback";
const SCHEMA_V2: &str = "2.0";
const MESSAGE_RECEIVE_V2: &str = "im.message.receive_v1";

/// Inbound webhook events the bot reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundEvent {
    /// Endpoint ownership handshake; the value must be echoed back.
    Challenge { challenge: String },
    /// Plain text sent to the bot, in a group or a direct chat.
    TextMessage { chat_id: String, text: String },
    /// Anything else. Acknowledged and dropped.
    Ignored,
}

/// Values of the `X-Lark-Request-*` and `X-Lark-Signature` headers.
#[derive(Debug, Clone, Copy)]
pub struct RequestSignature<'a> {
    pub timestamp: &'a str,
    pub nonce: &'a str,
    pub signature: &'a str,
}

#[derive(Deserialize)]
struct Envelope {
    encrypt: Option<String>,
}

#[derive(Deserialize)]
struct RawEvent {
    #[serde(rename = "type")]
    kind: Option<String>,
    token: Option<String>,
    challenge: Option<String>,
    schema: Option<String>,
    header: Option<EventHeader>,
    event: Option<Value>,
}

#[derive(Deserialize)]
struct EventHeader {
    event_type: String,
    #[serde(default)]
    token: String,
}

#[derive(Deserialize)]
struct V1MessageEvent {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    msg_type: String,
    #[serde(default)]
    open_chat_id: String,
    #[serde(default)]
    text: String,
    #[serde(default)]
    text_without_at_bot: String,
}

#[derive(Deserialize)]
struct V2MessageEvent {
    message: V2Message,
}

#[derive(Deserialize)]
struct V2Message {
    chat_id: String,
    message_type: String,
    #[serde(default)]
    content: String,
}

#[derive(Deserialize)]
struct V2TextContent {
    #[serde(default)]
    text: String,
}

/// Decrypts and authenticates webhook payloads, then classifies them.
pub struct EventParser {
    verification_token: String,
    encrypt_key: String,
    cipher: Option<EventCipher>,
}

impl EventParser {
    /// Empty strings disable token checking and decryption respectively.
    pub fn new(verification_token: &str, encrypt_key: &str) -> Self {
        let cipher = (!encrypt_key.is_empty()).then(|| EventCipher::new(encrypt_key));
        Self {
            verification_token: verification_token.to_string(),
            encrypt_key: encrypt_key.to_string(),
            cipher,
        }
    }

    pub fn parse(&self, body: &[u8], signature: Option<RequestSignature<'_>>) -> AppResult<InboundEvent> {
        if let (Some(sig), Some(_)) = (signature, &self.cipher) {
            let expected = request_signature(sig.timestamp, sig.nonce, &self.encrypt_key, body);
            let provided = sig.signature.to_ascii_lowercase();
            if verify_slices_are_equal(expected.as_bytes(), provided.as_bytes()).is_err() {
                return Err(AppError::rejected("signature mismatch"));
            }
        }

        let envelope: Envelope = serde_json::from_slice(body)?;
        let raw: RawEvent = match envelope.encrypt {
            Some(encrypted) => {
                let cipher = self
                    .cipher
                    .as_ref()
                    .ok_or_else(|| AppError::rejected("encrypted event but no EncryptKey configured"))?;
                serde_json::from_str(&cipher.decrypt(&encrypted)?)?
            }
            // With an EncryptKey set, Feishu encrypts every event
            None if self.cipher.is_some() => {
                return Err(AppError::rejected("plaintext event while EncryptKey is configured"));
            }
            None => serde_json::from_slice(body)?,
        };

        self.classify(raw)
    }

    fn check_token(&self, token: &str) -> AppResult<()> {
        if !self.verification_token.is_empty() && token != self.verification_token {
            return Err(AppError::rejected("verification token mismatch"));
        }
        Ok(())
    }

    fn classify(&self, raw: RawEvent) -> AppResult<InboundEvent> {
        if raw.kind.as_deref() == Some(URL_VERIFICATION) {
            self.check_token(raw.token.as_deref().unwrap_or_default())?;
            let challenge = raw
                .challenge
                .ok_or_else(|| AppError::rejected("url_verification without challenge"))?;
            return Ok(InboundEvent::Challenge { challenge });
        }

        if raw.schema.as_deref() == Some(SCHEMA_V2) {
            let header = raw
                .header
                .ok_or_else(|| AppError::rejected("schema 2.0 event without header"))?;
            self.check_token(&header.token)?;
            if header.event_type != MESSAGE_RECEIVE_V2 {
                return Ok(InboundEvent::Ignored);
            }
            let event: V2MessageEvent = serde_json::from_value(raw.event.unwrap_or_default())?;
            if event.message.message_type != "text" {
                return Ok(InboundEvent::Ignored);
            }
            let content: V2TextContent = serde_json::from_str(&event.message.content)?;
            return Ok(InboundEvent::TextMessage {
                chat_id: event.message.chat_id,
                text: content.text,
            });
        }

        if raw.kind.as_deref() == Some(EVENT_CALLBACK) {
            self.check_token(raw.token.as_deref().unwrap_or_default())?;
            let event: V1MessageEvent = serde_json::from_value(raw.event.unwrap_or_default())?;
            if event.kind != "message" || event.msg_type != "text" || event.open_chat_id.is_empty() {
                return Ok(InboundEvent::Ignored);
            }
            let text = if event.text_without_at_bot.is_empty() {
                event.text
            } else {
                event.text_without_at_bot
            };
            return Ok(InboundEvent::TextMessage {
                chat_id: event.open_chat_id,
                text,
            });
        }

        Ok(InboundEvent::Ignored)
    }
}
