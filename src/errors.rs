use thiserror::Error;

/// Application-wide error type
#[derive(Error, Debug)]
pub enum AppError {
    // Configuration
    #[error("configuration error: {0}")]
    Config(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Feed-related errors
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("HTTP {status} from {url}")]
    HttpStatus { url: String, status: u16 },
    #[error("unable to parse feed: {0}")]
    FeedParse(#[from] feed_rs::parser::ParseFeedError),
    #[error("feed {0} has no items")]
    EmptyFeed(String),

    // State store errors
    #[error("state store error: {0}")]
    Store(#[from] redis::RedisError),

    // Messaging platform errors
    #[error("Feishu API error {code}: {msg}")]
    Feishu { code: i64, msg: String },
    #[error("malformed payload: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("event rejected: {0}")]
    EventRejected(String),
    #[error("decryption failed: {0}")]
    Decrypt(String),
}

/// Result type alias for application errors
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn config(message: impl Into<String>) -> Self {
        AppError::Config(message.into())
    }

    pub fn rejected(reason: impl Into<String>) -> Self {
        AppError::EventRejected(reason.into())
    }

    /// True for failures that only affect a single feed and clear up on their own.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            AppError::Network(_)
                | AppError::HttpStatus { .. }
                | AppError::FeedParse(_)
                | AppError::EmptyFeed(_)
        )
    }
}
