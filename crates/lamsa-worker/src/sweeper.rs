//! Cron-based expiry sweep for stale pending deliveries.

use std::sync::Arc;

use tokio_cron_scheduler::{Job as CronJob, JobScheduler};
use tracing::{error, info};

use lamsa_core::config::NotificationsConfig;
use lamsa_core::error::AppError;
use lamsa_database::store::DeliveryStore;

/// Periodically transitions `pending` rows past the configured age to
/// `expired`, so quiet-hours parkings and abandoned sends do not linger
/// forever.
pub struct ExpirySweeper {
    scheduler: JobScheduler,
    store: Arc<dyn DeliveryStore>,
    config: NotificationsConfig,
}

impl std::fmt::Debug for ExpirySweeper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExpirySweeper").finish()
    }
}

impl ExpirySweeper {
    pub async fn new(
        store: Arc<dyn DeliveryStore>,
        config: NotificationsConfig,
    ) -> Result<Self, AppError> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|e| AppError::internal(format!("Failed to create scheduler: {}", e)))?;

        Ok(Self {
            scheduler,
            store,
            config,
        })
    }

    /// Register the hourly sweep and start the scheduler.
    pub async fn start(&self) -> Result<(), AppError> {
        let store = Arc::clone(&self.store);
        let max_age = chrono::Duration::hours(self.config.pending_expiry_hours as i64);

        let job = CronJob::new_async("0 0 * * * *", move |_uuid, _lock| {
            let store = Arc::clone(&store);
            Box::pin(async move {
                match store.mark_expired(max_age).await {
                    Ok(0) => {}
                    Ok(count) => info!(count, "Expired stale pending deliveries"),
                    Err(e) => error!(error = %e, "Expiry sweep failed"),
                }
            })
        })
        .map_err(|e| AppError::internal(format!("Failed to create expiry schedule: {}", e)))?;

        self.scheduler
            .add(job)
            .await
            .map_err(|e| AppError::internal(format!("Failed to add expiry schedule: {}", e)))?;

        self.scheduler
            .start()
            .await
            .map_err(|e| AppError::internal(format!("Failed to start scheduler: {}", e)))?;

        info!(
            pending_expiry_hours = self.config.pending_expiry_hours,
            "Expiry sweeper started (hourly)"
        );
        Ok(())
    }

    /// Stop the scheduler and its jobs.
    pub async fn shutdown(&mut self) -> Result<(), AppError> {
        self.scheduler
            .shutdown()
            .await
            .map_err(|e| AppError::internal(format!("Failed to shutdown scheduler: {}", e)))?;

        info!("Expiry sweeper shut down");
        Ok(())
    }
}
