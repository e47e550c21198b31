pub mod runner;
pub mod types;

pub use runner::{broadcast_text, reply_text};
pub use types::{format_release_message, format_subscription_list, BroadcastReport, LinkRule};
