//! Poll scheduler.
//!
//! Drives the monitor at a fixed interval. Each cycle runs to completion
//! inside the tick handler, so two cycles never overlap. A tick that fires
//! late because the previous cycle overran is dropped, and the next cycle
//! starts on the following multiple of the interval.

use std::future::Future;
use std::time::Duration;

use tokio::signal;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::monitor::{AvailabilityMonitor, CycleReport};
use crate::search_area::SearchArea;

/// How far past its deadline a tick may fire and still start a cycle.
const LATE_TICK_TOLERANCE: Duration = Duration::from_millis(500);

/// Run the polling loop until `Ctrl+C` (SIGINT) is received.
pub async fn run_polling(
    monitor: &mut AvailabilityMonitor,
    areas: &[SearchArea],
    poll_interval: Duration,
) {
    run_polling_until(monitor, areas, poll_interval, async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for shutdown signal: {}", err);
            std::future::pending::<()>().await;
        }
    })
    .await;
}

/// Run the polling loop until `shutdown` resolves. The first cycle starts
/// immediately.
///
/// Shutdown is only observed between cycles; a cycle in progress always
/// finishes.
pub async fn run_polling_until<F>(
    monitor: &mut AvailabilityMonitor,
    areas: &[SearchArea],
    poll_interval: Duration,
    shutdown: F,
) where
    F: Future<Output = ()>,
{
    let mut interval = time::interval(poll_interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    tokio::pin!(shutdown);

    tracing::info!(
        "Availability polling started (interval: {}s, areas: {})",
        poll_interval.as_secs(),
        areas.len()
    );

    loop {
        tokio::select! {
            deadline = interval.tick() => {
                let lateness = Instant::now().saturating_duration_since(deadline);
                if lateness > LATE_TICK_TOLERANCE {
                    tracing::warn!(
                        "Previous cycle overran by {}ms, skipping this tick",
                        lateness.as_millis()
                    );
                    continue;
                }
                poll_once(monitor, areas).await;
            }

            _ = &mut shutdown => {
                tracing::info!("Shutdown signal received. Stopping polling.");
                break;
            }
        }
    }

    tracing::info!("Availability polling stopped cleanly");
}

/// Execute a single poll cycle.
pub async fn poll_once(monitor: &mut AvailabilityMonitor, areas: &[SearchArea]) -> CycleReport {
    tracing::debug!("Starting poll cycle");
    monitor.run_cycle(areas).await
}
