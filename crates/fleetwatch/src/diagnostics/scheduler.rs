use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{Instant, interval_at};
use tracing::{error, info, warn};

use super::aggregator::{QuickCheck, StatusAggregator};

/// Periodic connection-only checks of the database and printers
pub struct QuickCheckScheduler {
    aggregator: Arc<StatusAggregator>,
    result_tx: mpsc::Sender<QuickCheck>,
}

impl QuickCheckScheduler {
    pub fn new(aggregator: Arc<StatusAggregator>, result_tx: mpsc::Sender<QuickCheck>) -> Self {
        Self { aggregator, result_tx }
    }

    /// Run a quick check every `period`, the first one after a full period.
    ///
    /// Returns `None` for a zero period. The task ends when the receiving
    /// side of the channel is dropped.
    pub fn start(&self, period: Duration) -> Option<tokio::task::JoinHandle<()>> {
        if period.is_zero() {
            warn!("Quick checks disabled");
            return None;
        }

        let aggregator = self.aggregator.clone();
        let result_tx = self.result_tx.clone();

        Some(tokio::spawn(async move {
            let mut timer = interval_at(Instant::now() + period, period);

            loop {
                timer.tick().await;

                let result = aggregator.quick_check().await;
                let failed = result.failed_checks();
                if failed == 0 {
                    info!(checks = result.database.len() + result.printers.len(), "Scheduled check completed");
                } else {
                    warn!(failed, "Scheduled check completed with failures");
                }

                // Send result to the result channel
                if let Err(e) = result_tx.send(result).await {
                    error!("Failed to send quick check result: {}", e);
                    break;
                }
            }
        }))
    }
}
