use crate::{
    api::Api,
    scheduler::{SchedulerState, scheduler_jobs::TaskRunJob},
    tasks::{ActionInvoker, Notifier},
};
use std::sync::Arc;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{debug, error, info, warn};

/// The job that periodically checks the task configuration file for changes and re-registers the
/// scheduled jobs when the content fingerprint differs from the last loaded one.
pub(crate) struct ConfigReloadJob;
impl ConfigReloadJob {
    /// Creates a new `ConfigReload` job.
    pub fn create<I: ActionInvoker, N: Notifier>(
        api: Arc<Api<I, N>>,
        state: Arc<SchedulerState>,
    ) -> anyhow::Result<Job> {
        let reload_interval = api.config.scheduler.reload_interval;
        Ok(Job::new_repeated_async(
            reload_interval,
            move |_, scheduler| {
                let api = api.clone();
                let state = state.clone();
                Box::pin(async move {
                    if let Err(err) = Self::reload(api, &scheduler, &state, false).await {
                        error!("Failed to check task configuration for changes: {err:?}");
                    }
                })
            },
        )?)
    }

    /// Reloads the task configuration unless the content fingerprint matches the last loaded one
    /// (forced reloads skip the fingerprint check). Serialized with respect to every other reload
    /// via the state's registered-jobs lock. Returns whether jobs were re-registered.
    pub async fn reload<I: ActionInvoker, N: Notifier>(
        api: Arc<Api<I, N>>,
        scheduler: &JobScheduler,
        state: &Arc<SchedulerState>,
        force: bool,
    ) -> anyhow::Result<bool> {
        let mut registered = state.lock_registered().await;

        let fingerprint = api.tasks_store.fingerprint().await;
        if registered.loaded {
            if fingerprint.is_none() {
                // The file disappeared or cannot be read, keep the last good state.
                debug!("Task configuration file is absent or unreadable, not reloading.");
                return Ok(false);
            }
            if !force && fingerprint == registered.fingerprint {
                debug!("Task configuration unchanged, not reloading.");
                return Ok(false);
            }
        }

        let configuration = match api.tasks_store.load_or_default().await {
            Ok(configuration) => configuration,
            Err(err) => {
                // A malformed configuration keeps the previously loaded schedule running.
                error!(
                    "Failed to load task configuration, retaining the previous schedule: {err:?}"
                );
                return Ok(false);
            }
        };

        // Deregister all jobs of the previous configuration.
        for (task_id, job_id) in registered.jobs.drain() {
            if let Err(err) = scheduler.remove(&job_id).await {
                warn!(task.id = task_id, job.id = %job_id, "Failed to deregister job: {err}");
            }
        }

        // Register a fresh job per enabled task. A task that fails resolution is skipped, the
        // rest of the configuration still loads.
        for task in &configuration.tasks {
            if !task.enabled {
                debug!(task.id = %task.id, "Skipping disabled task.");
                continue;
            }

            let job = match TaskRunJob::create(api.clone(), state.clone(), task.clone()) {
                Ok(Some(job)) => job,
                Ok(None) => continue,
                Err(err) => {
                    error!(
                        task.id = %task.id,
                        task.name = task.name,
                        "Failed to resolve task schedule, skipping the task: {err:?}"
                    );
                    continue;
                }
            };

            match scheduler.add(job).await {
                Ok(job_id) => {
                    debug!(
                        task.id = %task.id,
                        task.name = task.name,
                        job.id = %job_id,
                        "Successfully scheduled task."
                    );
                    registered.jobs.insert(task.id.clone(), job_id);
                }
                Err(err) => error!(task.id = %task.id, "Failed to register job: {err}"),
            }
        }

        registered.tasks_loaded = configuration.tasks.len();
        registered.fingerprint = fingerprint;
        registered.loaded = true;

        info!(
            "Task configuration reloaded: {}/{} tasks scheduled.",
            registered.jobs.len(),
            registered.tasks_loaded
        );

        Ok(true)
    }
}
