pub mod api;
pub mod config;
pub mod errors;
pub mod feed;
pub mod feishu;
pub mod observability;
pub mod server;
pub mod store;
pub mod tasks;

use actix_web::web;
use std::sync::Arc;

use crate::feishu::{EventParser, Messenger};

/// Shared state for HTTP handlers.
pub struct AppContext {
    pub messenger: Arc<dyn Messenger>,
    pub events: EventParser,
    pub feed_urls: Vec<String>,
    pub reply_banner: String,
}

pub type RqAppContext = web::Data<AppContext>;
