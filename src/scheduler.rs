mod cron_ext;
mod scheduler_jobs;
mod scheduler_state;
mod task_trigger;

pub use self::{cron_ext::CronExt, task_trigger::TaskTrigger};
pub(crate) use self::scheduler_state::SchedulerState;

use crate::{
    api::Api,
    scheduler::scheduler_jobs::ConfigReloadJob,
    server::SchedulerStatus,
    tasks::{ActionInvoker, Notifier},
};
use anyhow::Context;
use std::sync::Arc;
use tokio_cron_scheduler::JobScheduler;
use tracing::{info, warn};

/// Length of the fingerprint prefix exposed in the scheduler status.
const STATUS_FINGERPRINT_PREFIX_LENGTH: usize = 8;

/// Drives all scheduled jobs: owns the timer engine, the reload critical section, and the
/// registered-jobs bookkeeping. The service as a whole moves `Stopped -> Running -> Stopped`;
/// start and stop are idempotent. Stopping is a graceful drain — the timer engine quiesces, but
/// in-flight task executions are not forcibly cancelled.
pub struct Scheduler<I: ActionInvoker, N: Notifier> {
    inner_scheduler: JobScheduler,
    api: Arc<Api<I, N>>,
    state: Arc<SchedulerState>,
    running: bool,
}

impl<I: ActionInvoker, N: Notifier> Scheduler<I, N> {
    /// Creates a scheduler in the stopped state.
    pub async fn create(api: Arc<Api<I, N>>) -> anyhow::Result<Self> {
        Ok(Self {
            inner_scheduler: JobScheduler::new().await?,
            api,
            state: Arc::new(SchedulerState::default()),
            running: false,
        })
    }

    /// Loads the task configuration and starts the timer engine together with the periodic
    /// configuration reload check. Starting an already-running scheduler logs and no-ops.
    pub async fn start(&mut self) -> anyhow::Result<()> {
        if !self.api.config.scheduler.enabled {
            info!("Scheduler is disabled, not starting.");
            return Ok(());
        }
        if self.running {
            warn!("Scheduler is already running.");
            return Ok(());
        }

        ConfigReloadJob::reload(self.api.clone(), &self.inner_scheduler, &self.state, true)
            .await
            .context("Failed to load the initial task configuration.")?;

        self.inner_scheduler
            .add(ConfigReloadJob::create(
                self.api.clone(),
                self.state.clone(),
            )?)
            .await?;
        self.inner_scheduler.start().await?;
        self.running = true;

        info!(
            "Scheduler started, checking for configuration changes every {}.",
            humantime::format_duration(self.api.config.scheduler.reload_interval)
        );

        Ok(())
    }

    /// Stops the timer engine, waiting for it to quiesce, and discards the registration
    /// bookkeeping (it is rebuilt from the configuration store on the next start). Stopping a
    /// stopped scheduler no-ops.
    pub async fn stop(&mut self) -> anyhow::Result<()> {
        if !self.running {
            return Ok(());
        }

        self.inner_scheduler.shutdown().await?;
        self.state.clear().await;
        self.running = false;

        info!("Scheduler stopped.");

        Ok(())
    }

    /// Forces a configuration reload regardless of the content fingerprint.
    pub async fn reload(&self) -> anyhow::Result<bool> {
        ConfigReloadJob::reload(self.api.clone(), &self.inner_scheduler, &self.state, true).await
    }

    /// Returns the scheduler status used for external health checks.
    pub async fn status(&mut self) -> anyhow::Result<SchedulerStatus> {
        let (tasks_loaded, jobs_registered, fingerprint) = self.state.status_snapshot().await;
        let time_till_next_job = if self.running {
            self.inner_scheduler.time_till_next_job().await?
        } else {
            None
        };

        Ok(SchedulerStatus {
            enabled: self.api.config.scheduler.enabled,
            running: self.running,
            tasks_loaded,
            jobs_registered,
            last_fingerprint: fingerprint
                .map(|fingerprint| fingerprint[..STATUS_FINGERPRINT_PREFIX_LENGTH].to_string()),
            time_till_next_job,
        })
    }
}
