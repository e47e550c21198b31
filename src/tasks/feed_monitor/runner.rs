use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinSet;
use tokio::time::{Instant, MissedTickBehavior};

use super::detector::ChangeDetector;
use super::types::CheckSummary;
use crate::log_check_summary;

/// One full pass over the configured feeds, with timing.
pub async fn run_once(detector: &ChangeDetector) -> CheckSummary {
    let started = Instant::now();
    let summary = detector.check_and_notify().await;
    log_check_summary!(summary, started.elapsed().as_millis() as u64);
    summary
}

/// Fire a check every `period`, starting one period from now, until `stop`
/// resolves or its sender is dropped.
///
/// Each tick spawns its own run and does not wait for the previous one, so
/// slow runs may overlap. Missed ticks are skipped rather than replayed.
/// After stopping, runs still in flight get up to `drain_timeout` to finish;
/// whatever is left after that is aborted.
pub async fn start(
    detector: Arc<ChangeDetector>,
    period: Duration,
    mut stop: oneshot::Receiver<()>,
    drain_timeout: Duration,
) {
    log::info!(
        "Feed monitor started: {} feeds every {}s",
        detector.feed_urls().len(),
        period.as_secs()
    );

    let mut runs: JoinSet<CheckSummary> = JoinSet::new();
    let mut interval = tokio::time::interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = &mut stop => break,
            _ = interval.tick() => {
                let detector = Arc::clone(&detector);
                runs.spawn(async move { run_once(&detector).await });
            }
            Some(finished) = runs.join_next(), if !runs.is_empty() => {
                if let Err(e) = finished {
                    log::error!("Feed check run failed: {}", e);
                }
            }
        }
    }

    if runs.is_empty() {
        log::info!("Feed monitor stopped");
        return;
    }

    log::info!("Feed monitor stopping, waiting for {} running checks", runs.len());
    let drained = tokio::time::timeout(drain_timeout, async {
        while let Some(finished) = runs.join_next().await {
            if let Err(e) = finished {
                log::error!("Feed check run failed: {}", e);
            }
        }
    })
    .await;

    if drained.is_err() {
        log::warn!(
            "Aborting {} feed checks still running after {}s",
            runs.len(),
            drain_timeout.as_secs()
        );
        runs.shutdown().await;
    }
    log::info!("Feed monitor stopped");
}
