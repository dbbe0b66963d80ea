// Hourly finalization background task

use std::sync::Arc;

use tokio::sync::watch;

use crate::services::flash_sale::FlashSaleService;
use crate::services::window;

/// Runs the end-of-window commit on every hour boundary until shutdown.
///
/// The wait is recomputed from the absolute next boundary on each turn of the
/// loop, so a slow finalization run never drifts the schedule. On shutdown
/// the task returns promptly without waiting for the next boundary.
pub async fn run(service: Arc<FlashSaleService>, mut shutdown: watch::Receiver<bool>) {
    tracing::info!("hourly finalization task started");

    loop {
        let wait = window::until_next_hour(chrono::Utc::now());

        tokio::select! {
            _ = tokio::time::sleep(wait) => {
                tracing::info!("running sales finalization");
                if let Err(err) = service.finalize().await {
                    tracing::error!(error = %err, "sales finalization failed");
                }
            }
            _ = shutdown.changed() => {
                tracing::info!("stopping hourly finalization task");
                return;
            }
        }
    }
}
