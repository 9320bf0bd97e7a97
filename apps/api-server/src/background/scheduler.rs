//! Cron-driven sweep caller using tokio-cron-scheduler.

use std::sync::Arc;

use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

use publish_core::services::SchedulerSweep;

use super::SchedulerConfig;

/// Cron job scheduler wrapper.
pub struct Scheduler {
    inner: JobScheduler,
    config: SchedulerConfig,
}

impl Scheduler {
    /// Create a new scheduler.
    pub async fn new(config: SchedulerConfig) -> Result<Self, JobSchedulerError> {
        let inner = JobScheduler::new().await?;
        Ok(Self { inner, config })
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Add a cron job.
    pub async fn add_cron<F, Fut>(
        &self,
        schedule: &str,
        task: F,
    ) -> Result<uuid::Uuid, JobSchedulerError>
    where
        F: Fn() -> Fut + Send + Sync + Clone + 'static,
        Fut: std::future::Future<Output = ()> + Send + 'static,
    {
        let job = Job::new_async(schedule, move |_uuid, _lock| {
            let task = task.clone();
            Box::pin(async move {
                task().await;
            })
        })?;

        let id = self.inner.add(job).await?;
        tracing::info!(schedule = %schedule, job_id = %id, "Cron job registered");
        Ok(id)
    }

    /// Start the scheduler.
    pub async fn start(&self) -> Result<(), JobSchedulerError> {
        if !self.config.enabled {
            tracing::info!("Scheduler disabled");
            return Ok(());
        }

        self.inner.start().await?;
        tracing::info!("Scheduler started");
        Ok(())
    }

    /// Stop the scheduler.
    pub async fn shutdown(&mut self) -> Result<(), JobSchedulerError> {
        self.inner.shutdown().await?;
        tracing::info!("Scheduler stopped");
        Ok(())
    }
}

/// Register the sweep as a cron job. Each tick is one independent sweep; a
/// failed tick is logged and the next one runs as usual.
pub async fn register_sweep(
    scheduler: &Scheduler,
    sweep: Arc<SchedulerSweep>,
) -> Result<uuid::Uuid, JobSchedulerError> {
    let schedule = scheduler.config().sweep_cron.clone();
    scheduler
        .add_cron(&schedule, move || {
            let sweep = sweep.clone();
            async move {
                match sweep.run().await {
                    Ok(report) if !report.is_clean() => tracing::warn!(
                        published = report.published.len(),
                        failed = report.failed.len(),
                        "Periodic sweep finished with failures"
                    ),
                    Ok(_) => {}
                    Err(e) => tracing::error!(error = %e, "Periodic sweep failed"),
                }
            }
        })
        .await
}
