pub mod detector;
pub mod runner;
pub mod types;

pub use detector::ChangeDetector;
pub use types::{CheckSummary, FeedOutcome};
