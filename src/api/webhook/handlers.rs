use actix_web::{post, web, HttpRequest, HttpResponse, Responder};
use serde_json::json;

use crate::{
    feishu::{InboundEvent, RequestSignature},
    tasks::notifier::{format_subscription_list, reply_text},
    RqAppContext,
};

const TIMESTAMP_HEADER: &str = "X-Lark-Request-Timestamp";
const NONCE_HEADER: &str = "X-Lark-Request-Nonce";
const SIGNATURE_HEADER: &str = "X-Lark-Signature";

fn header<'a>(req: &'a HttpRequest, name: &str) -> Option<&'a str> {
    req.headers().get(name).and_then(|h| h.to_str().ok())
}

fn request_signature(req: &HttpRequest) -> Option<RequestSignature<'_>> {
    Some(RequestSignature {
        timestamp: header(req, TIMESTAMP_HEADER)?,
        nonce: header(req, NONCE_HEADER)?,
        signature: header(req, SIGNATURE_HEADER)?,
    })
}

/// Feishu event callback.
///
/// Unparseable or unauthenticated events get an empty 200 so the platform
/// stops retrying; nothing else happens for them.
#[post("/rss-robot")]
pub async fn rss_robot(ctx: RqAppContext, req: HttpRequest, body: web::Bytes) -> impl Responder {
    let event = match ctx.events.parse(&body, request_signature(&req)) {
        Ok(event) => event,
        Err(e) => {
            log::debug!("Dropping webhook event: {e}");
            return HttpResponse::Ok().finish();
        }
    };

    match event {
        InboundEvent::Challenge { challenge } => {
            log::info!("Answering URL verification challenge");
            HttpResponse::Ok().json(json!({ "challenge": challenge }))
        }
        InboundEvent::TextMessage { chat_id, text } => {
            log::info!("Text message from chat {chat_id}: {:?}", text.trim());
            let reply = format_subscription_list(&ctx.reply_banner, &ctx.feed_urls);
            if let Err(e) = reply_text(ctx.messenger.as_ref(), &chat_id, &reply).await {
                log::error!("Error replying to chat {chat_id}: {e}");
            }
            HttpResponse::Ok().finish()
        }
        InboundEvent::Ignored => HttpResponse::Ok().finish(),
    }
}
