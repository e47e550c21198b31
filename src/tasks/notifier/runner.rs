use super::types::BroadcastReport;
use crate::{
    errors::AppResult,
    feishu::{Messenger, TextMessage},
    log_broadcast_summary,
};

/// Send `text` to every chat the bot belongs to.
///
/// Fails only when the chat list cannot be obtained; individual send
/// failures are logged and the remaining chats are still tried.
pub async fn broadcast_text(messenger: &dyn Messenger, text: &str) -> AppResult<BroadcastReport> {
    let chats = messenger.list_chats().await?;
    let mut report = BroadcastReport::default();

    for chat in &chats {
        let message = TextMessage::new(chat.chat_id.as_str(), text);
        report.attempted += 1;
        match messenger.send(&message).await {
            Ok(()) => {
                report.delivered += 1;
                log::info!("Notification sent to chat {} ({})", chat.chat_id, chat.name);
            }
            Err(e) => {
                log::error!("Error sending notification to chat {}: {e}", chat.chat_id);
                continue;
            }
        }
    }

    log_broadcast_summary!(report);
    Ok(report)
}

/// Reply to a single chat, used for command responses.
pub async fn reply_text(messenger: &dyn Messenger, chat_id: &str, text: &str) -> AppResult<()> {
    messenger.send(&TextMessage::new(chat_id, text)).await
}
