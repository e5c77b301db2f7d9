mod task_create_params;
mod tasks_list_params;

pub use self::{task_create_params::TaskCreateParams, tasks_list_params::TasksListParams};
use crate::{
    api::Api,
    config::OneTimeCleanupMode,
    error::Error as ChronodError,
    scheduler::TaskTrigger,
    tasks::{
        ActionInvoker, ActionResponse, Notifier, TaskConfig, TaskExecutionResult, TaskKind,
        TasksListFilter,
    },
};
use anyhow::bail;
use chrono::{TimeDelta, Utc};
use http::Method;
use std::time::Duration;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Defines the maximum length of a task name.
pub const MAX_TASK_NAME_LENGTH: usize = 100;

/// We currently wait up to an hour for a single action invocation.
const MAX_ACTION_TIMEOUT: Duration = Duration::from_secs(3600);

/// Describes the API to work with tasks.
pub struct TasksApiExt<'a, I: ActionInvoker, N: Notifier> {
    api: &'a Api<I, N>,
}

impl<'a, I: ActionInvoker, N: Notifier> TasksApiExt<'a, I, N> {
    /// Creates Tasks API.
    pub fn new(api: &'a Api<I, N>) -> Self {
        Self { api }
    }

    /// Returns all tasks matching the specified parameters.
    pub async fn get_tasks(&self, params: TasksListParams) -> anyhow::Result<Vec<TaskConfig>> {
        self.api
            .tasks_store
            .list(&TasksListFilter {
                only_enabled: params.only_enabled,
                name_contains: params.name,
            })
            .await
    }

    /// Returns task by its ID.
    pub async fn get_task(&self, id: &str) -> anyhow::Result<Option<TaskConfig>> {
        Ok(self
            .api
            .tasks_store
            .list(&TasksListFilter::default())
            .await?
            .into_iter()
            .find(|task| task.id == id))
    }

    /// Validates and persists a new task. The task id is assigned by the configuration store and
    /// date-type schedules come back with a normalized, timezone-resolved `run_at`.
    pub async fn create_task(&self, params: TaskCreateParams) -> anyhow::Result<TaskConfig> {
        self.validate_task_params(&params)?;

        let task = self
            .api
            .tasks_store
            .append(TaskConfig {
                id: String::new(),
                name: params.name,
                kind: TaskKind::ApiCall,
                enabled: params.enabled,
                schedule: params.schedule,
                action: params.action,
                description: params.description,
                max_retries: params.max_retries,
                retry_delay: params.retry_delay,
            })
            .await?;

        info!(task.id = %task.id, task.name = task.name, "Successfully created task.");

        Ok(task)
    }

    /// Removes a task by id, returning whether anything was removed.
    pub async fn remove_task(&self, id: &str) -> anyhow::Result<bool> {
        self.api.tasks_store.remove(id).await
    }

    /// Removes a task by its human-friendly name. Prefers a case-insensitive exact match and
    /// falls back to a substring match; multiple matches are rejected so that the caller can
    /// disambiguate.
    pub async fn remove_task_by_name(&self, name: &str) -> anyhow::Result<TaskConfig> {
        let tasks = self.api.tasks_store.list(&TasksListFilter::default()).await?;

        let name_lowercase = name.to_lowercase();
        let exact_matches = tasks
            .iter()
            .filter(|task| task.name.to_lowercase() == name_lowercase)
            .collect::<Vec<_>>();
        let candidates = if exact_matches.is_empty() {
            tasks
                .iter()
                .filter(|task| task.name.to_lowercase().contains(&name_lowercase))
                .collect::<Vec<_>>()
        } else {
            exact_matches
        };

        match candidates.as_slice() {
            [] => bail!(ChronodError::client(format!(
                "No task found with name '{name}'."
            ))),
            [task] => {
                let task = (*task).clone();
                if !self.api.tasks_store.remove(&task.id).await? {
                    bail!(ChronodError::client(format!(
                        "Task not found or already removed: {} [{}].",
                        task.name, task.id
                    )));
                }
                info!(task.id = %task.id, task.name = task.name, "Successfully removed task.");
                Ok(task)
            }
            candidates => bail!(ChronodError::client(format!(
                "Multiple tasks match name '{name}'. Candidates: {}.",
                candidates
                    .iter()
                    .map(|task| format!("{} ({})", task.name, task.id))
                    .collect::<Vec<_>>()
                    .join(", ")
            ))),
        }
    }

    /// Sets `enabled = false` on the task with the specified id.
    pub async fn disable_task(&self, id: &str) -> anyhow::Result<bool> {
        self.api.tasks_store.disable(id).await
    }

    /// Executes the task's action with a bounded retry loop, notifies on terminal failure, and
    /// records the outcome. Every failure mode is captured in the returned result — this method
    /// never surfaces errors to the scheduling loop.
    pub async fn execute_task(&self, task: &TaskConfig) -> TaskExecutionResult {
        let execution_id = Uuid::now_v7();
        let started_at = Utc::now();
        info!(task.id = %task.id, execution.id = %execution_id, "Executing task.");

        let mut result = TaskExecutionResult {
            task_id: task.id.clone(),
            execution_id,
            started_at,
            completed_at: None,
            success: false,
            error_message: None,
            result_data: None,
            retry_count: 0,
            next_retry_at: None,
        };

        let mut attempt: u32 = 0;
        let response = loop {
            let response = match self.api.invoker.invoke(&task.action).await {
                Ok(response) => response,
                // An invoker error is an ordinary failed attempt, not a scheduler crash.
                Err(err) => {
                    error!(task.id = %task.id, "Task action invocation failed: {err:?}");
                    ActionResponse::failure(err.to_string())
                }
            };

            if response.success || attempt >= task.max_retries {
                break response;
            }

            attempt += 1;
            result.retry_count = attempt;
            result.next_retry_at = Some(
                Utc::now()
                    + TimeDelta::from_std(task.retry_delay).unwrap_or_else(|_| TimeDelta::zero()),
            );
            warn!(
                task.id = %task.id,
                "Task attempt {attempt} failed. Retrying in {}.",
                humantime::format_duration(task.retry_delay)
            );
            tokio::time::sleep(task.retry_delay).await;
        };

        result.success = response.success;
        if !response.success {
            result.error_message = Some(
                response
                    .payload
                    .get("error")
                    .and_then(|error| error.as_str())
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("Task action failed: {}", response.payload)),
            );
        }
        result.result_data = Some(response.payload);
        result.completed_at = Some(Utc::now());

        if result.success {
            debug!(task.id = %task.id, execution.id = %execution_id, "Successfully executed task.");
        } else {
            warn!(
                task.id = %task.id,
                execution.id = %execution_id,
                metrics.task_retries = result.retry_count,
                "Task execution failed: {:?}",
                result.error_message
            );

            // Best-effort failure notification — a notifier failure never masks the task failure.
            let notification = format!(
                "Task '{}' failed: {}",
                task.name,
                result.error_message.as_deref().unwrap_or("unknown error")
            );
            if let Err(err) = self.api.notifier.notify(&notification).await {
                error!(task.id = %task.id, "Failed to send error notification: {err:?}");
            }
        }

        if let Err(err) = self.api.results_store.add(result.clone()).await {
            error!(task.id = %task.id, "Failed to record task execution result: {err:?}");
        }

        result
    }

    /// Disposes of a one-time task after it has run, per the configured cleanup mode. Returns
    /// whether the configuration document was changed.
    pub async fn cleanup_one_time_task(&self, task: &TaskConfig) -> anyhow::Result<bool> {
        let cleanup_mode = self.api.config.scheduler.cleanup_mode;
        let changed = match cleanup_mode {
            OneTimeCleanupMode::Remove => self.api.tasks_store.remove(&task.id).await?,
            OneTimeCleanupMode::Disable => self.api.tasks_store.disable(&task.id).await?,
        };

        if changed {
            info!(task.id = %task.id, "Cleaned up one-time task ({cleanup_mode:?} mode).");
        } else {
            debug!(task.id = %task.id, "One-time task was already cleaned up.");
        }

        Ok(changed)
    }

    /// Returns up to `limit` execution results for the specified task, most recent first.
    pub async fn get_task_results(
        &self,
        task_id: &str,
        limit: usize,
    ) -> anyhow::Result<Vec<TaskExecutionResult>> {
        self.api.results_store.results_for_task(task_id, limit).await
    }

    /// Returns up to `limit` execution results across all tasks, most recent first.
    pub async fn get_recent_results(
        &self,
        limit: usize,
    ) -> anyhow::Result<Vec<TaskExecutionResult>> {
        self.api.results_store.recent(limit).await
    }

    fn validate_task_params(&self, params: &TaskCreateParams) -> anyhow::Result<()> {
        if params.name.is_empty() {
            bail!(ChronodError::client("Task name cannot be empty."));
        }
        if params.name.len() > MAX_TASK_NAME_LENGTH {
            bail!(ChronodError::client(format!(
                "Task name cannot be longer than {MAX_TASK_NAME_LENGTH} characters."
            )));
        }

        // The schedule has to resolve the same way it will during reload.
        TaskTrigger::resolve(&params.name, &params.schedule, self.api.config.timezone)?;

        if params.action.endpoint.is_empty() {
            bail!(ChronodError::client("Task action endpoint cannot be empty."));
        }
        if ![Method::GET, Method::POST, Method::PUT].contains(&params.action.method) {
            bail!(ChronodError::client(format!(
                "Unsupported task action HTTP method: {}.",
                params.action.method
            )));
        }
        if params.action.timeout.is_zero() || params.action.timeout > MAX_ACTION_TIMEOUT {
            bail!(ChronodError::client(format!(
                "Task action timeout must be between 1 second and {}.",
                humantime::format_duration(MAX_ACTION_TIMEOUT)
            )));
        }

        Ok(())
    }
}

impl<I: ActionInvoker, N: Notifier> Api<I, N> {
    /// Returns an API to work with tasks.
    pub fn tasks(&self) -> TasksApiExt<I, N> {
        TasksApiExt::new(self)
    }
}
