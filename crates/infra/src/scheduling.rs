//! Eviction scheduler for the Security Monitoring Service (C7, `spec.md`
//! §4.7: "every 60 s, evict attempts older than 24 h...").
//!
//! Wraps `tokio-cron-scheduler` the way the teacher's `BlockScheduler` does:
//! explicit start/stop lifecycle, a `CancellationToken`-driven monitor task,
//! and timeout-wrapped start/stop operations.

use std::sync::Arc;
use std::time::Duration;

use oauthbroker_core::oauth::monitoring::SecurityMonitoringService;
use thiserror::Error;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio_cron_scheduler::{Job, JobScheduler};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("scheduler already running")]
    AlreadyRunning,
    #[error("scheduler not running")]
    NotRunning,
    #[error("failed to create scheduler: {0}")]
    CreationFailed(String),
    #[error("failed to start scheduler: {0}")]
    StartFailed(String),
    #[error("failed to stop scheduler: {0}")]
    StopFailed(String),
    #[error("failed to register job: {0}")]
    JobRegistrationFailed(String),
    #[error("operation timed out after {seconds}s")]
    Timeout { seconds: u64 },
    #[error("task join failed: {0}")]
    TaskJoinFailed(String),
}

pub type SchedulerResult<T> = Result<T, SchedulerError>;

/// Runs [`SecurityMonitoringService::evict_expired`] on a 60-second cron tick.
pub struct MonitoringEvictionScheduler {
    scheduler: Arc<RwLock<JobScheduler>>,
    monitoring: Arc<SecurityMonitoringService>,
    task_handle: Option<JoinHandle<()>>,
    job_id: Option<Uuid>,
    cancellation: Option<CancellationToken>,
}

impl MonitoringEvictionScheduler {
    /// # Errors
    /// Returns [`SchedulerError::CreationFailed`] if the underlying cron
    /// scheduler cannot be constructed.
    pub async fn new(monitoring: Arc<SecurityMonitoringService>) -> SchedulerResult<Self> {
        let scheduler =
            JobScheduler::new().await.map_err(|e| SchedulerError::CreationFailed(e.to_string()))?;

        Ok(Self {
            scheduler: Arc::new(RwLock::new(scheduler)),
            monitoring,
            task_handle: None,
            job_id: None,
            cancellation: None,
        })
    }

    #[instrument(skip(self))]
    pub async fn start(&mut self) -> SchedulerResult<()> {
        if self.is_running() {
            return Err(SchedulerError::AlreadyRunning);
        }
        info!("starting monitoring eviction scheduler");

        let cancel = CancellationToken::new();
        self.cancellation = Some(cancel.clone());

        let job_id = self.register_eviction_job().await?;
        self.job_id = Some(job_id);

        let scheduler = self.scheduler.clone();
        tokio::time::timeout(Duration::from_secs(5), async move {
            scheduler.write().await.start().await
        })
        .await
        .map_err(|_| SchedulerError::Timeout { seconds: 5 })?
        .map_err(|e| SchedulerError::StartFailed(e.to_string()))?;

        let handle = tokio::spawn(async move {
            cancel.cancelled().await;
            debug!("monitoring eviction scheduler monitor task cancelled");
        });
        self.task_handle = Some(handle);

        info!("monitoring eviction scheduler started");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn stop(&mut self) -> SchedulerResult<()> {
        if !self.is_running() {
            return Err(SchedulerError::NotRunning);
        }
        info!("stopping monitoring eviction scheduler");

        if let Some(cancel) = self.cancellation.take() {
            cancel.cancel();
        }
        if let Some(job_id) = self.job_id.take() {
            if let Err(e) = self.scheduler.write().await.remove(&job_id).await {
                warn!(job_id = %job_id, error = %e, "failed to remove eviction job");
            }
        }

        let scheduler = self.scheduler.clone();
        tokio::time::timeout(Duration::from_secs(5), async move {
            scheduler.write().await.shutdown().await
        })
        .await
        .map_err(|_| SchedulerError::Timeout { seconds: 5 })?
        .map_err(|e| SchedulerError::StopFailed(e.to_string()))?;

        if let Some(handle) = self.task_handle.take() {
            tokio::time::timeout(Duration::from_secs(5), handle)
                .await
                .map_err(|_| SchedulerError::Timeout { seconds: 5 })?
                .map_err(|e| SchedulerError::TaskJoinFailed(e.to_string()))?;
        }

        info!("monitoring eviction scheduler stopped");
        Ok(())
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.task_handle.is_some()
            && self.cancellation.as_ref().is_some_and(|c| !c.is_cancelled())
    }

    async fn register_eviction_job(&self) -> SchedulerResult<Uuid> {
        let monitoring = self.monitoring.clone();
        let job = Job::new_async("0 * * * * *", move |uuid, _lock| {
            let monitoring = monitoring.clone();
            Box::pin(async move {
                debug!(job_id = %uuid, "monitoring eviction job triggered");
                monitoring.evict_expired(chrono::Utc::now());
            })
        })
        .map_err(|e| SchedulerError::JobRegistrationFailed(e.to_string()))?;

        let job_id = self
            .scheduler
            .write()
            .await
            .add(job)
            .await
            .map_err(|e| SchedulerError::JobRegistrationFailed(e.to_string()))?;
        Ok(job_id)
    }
}

impl Drop for MonitoringEvictionScheduler {
    fn drop(&mut self) {
        if self.is_running() {
            warn!("MonitoringEvictionScheduler dropped while still running; call stop() first");
        }
    }
}
