use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize structured logging and tracing
///
/// `LOG_LEVEL` sets the default filter when `RUST_LOG` is absent, `LOG_FORMAT`
/// chooses between `pretty` and `json`. Records emitted through the `log`
/// facade are forwarded into the same subscriber.
pub fn init_logging() {
    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_level));

    if log_format == "json" {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_current_span(false)
                    .with_span_list(false),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .pretty()
                    .with_target(true)
                    .with_thread_ids(false),
            )
            .init();
    }

    info!(
        service = "rss-robot",
        version = env!("CARGO_PKG_VERSION"),
        log_level = %log_level,
        log_format = %log_format,
        "Logging initialized"
    );
}

/// Structured summary line for one change-detection run
#[macro_export]
macro_rules! log_check_summary {
    ($summary:expr, $duration_ms:expr) => {
        tracing::info!(
            checked = $summary.checked,
            skipped = $summary.skipped,
            first_seen = $summary.first_seen,
            changed = $summary.changed,
            duration_ms = $duration_ms,
            "Feed check completed"
        );
    };
}

/// Structured summary line for one broadcast
#[macro_export]
macro_rules! log_broadcast_summary {
    ($report:expr) => {
        tracing::info!(
            attempted = $report.attempted,
            delivered = $report.delivered,
            failed = $report.attempted - $report.delivered,
            "Broadcast completed"
        );
    };
}
