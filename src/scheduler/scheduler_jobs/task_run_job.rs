use crate::{
    api::Api,
    scheduler::{SchedulerState, TaskTrigger, scheduler_jobs::ConfigReloadJob},
    tasks::{ActionInvoker, Notifier, TaskConfig},
};
use chrono::Utc;
use std::{future::Future, pin::Pin, sync::Arc, time::Duration};
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, warn};
use uuid::Uuid;

/// How soon a missed one-time task fires once it's picked up within the misfire grace window.
const MISSED_ONE_SHOT_DELAY: Duration = Duration::from_secs(1);

/// The job created for every enabled task in the configuration. Executions of the same task never
/// overlap: a fire that arrives while the previous execution is still running is dropped, not
/// queued.
pub(crate) struct TaskRunJob;
impl TaskRunJob {
    /// Creates a new `TaskRun` job for the specified task. Returns `None` for a one-time task
    /// whose fire time has passed beyond the misfire grace window.
    pub fn create<I: ActionInvoker, N: Notifier>(
        api: Arc<Api<I, N>>,
        state: Arc<SchedulerState>,
        task: TaskConfig,
    ) -> anyhow::Result<Option<Job>> {
        let timezone = api.config.timezone;
        let misfire_grace = api.config.scheduler.one_time_misfire_grace;
        let trigger = TaskTrigger::resolve(&task.id, &task.schedule, timezone)?;

        let task_id = task.id.clone();
        let run = {
            let api = api.clone();
            let state = state.clone();
            move |_: Uuid, scheduler: JobScheduler| {
                let api = api.clone();
                let state = state.clone();
                let task = task.clone();
                Box::pin(async move {
                    Self::execute(api, scheduler, state, task).await;
                }) as Pin<Box<dyn Future<Output = ()> + Send>>
            }
        };

        let job = match trigger {
            TaskTrigger::Cron(cron) => {
                Job::new_async_tz(cron.pattern.to_string().as_str(), timezone, run)?
            }
            TaskTrigger::Interval(period) => Job::new_repeated_async(period, run)?,
            TaskTrigger::OneShot(run_at) => {
                let now = Utc::now().with_timezone(&timezone);
                if run_at <= now {
                    let overdue = (now - run_at).to_std().unwrap_or_default();
                    if overdue > misfire_grace {
                        warn!(
                            task.id = %task_id,
                            "One-time task missed its fire time ({run_at}) beyond the misfire \
                             grace window, not scheduling."
                        );
                        return Ok(None);
                    }
                    warn!(
                        task.id = %task_id,
                        "One-time task missed its fire time ({run_at}), firing immediately."
                    );
                    Job::new_one_shot_async(MISSED_ONE_SHOT_DELAY, run)?
                } else {
                    let delay = (run_at - now).to_std()?;
                    Job::new_one_shot_async(delay, run)?
                }
            }
        };

        Ok(Some(job))
    }

    /// Executes a `TaskRun` job: runs the task unless an execution of the same task is already in
    /// flight, then disposes of one-time tasks per the configured cleanup mode and applies the
    /// change right away. Never returns an error — every failure is logged or recorded.
    pub async fn execute<I: ActionInvoker, N: Notifier>(
        api: Arc<Api<I, N>>,
        scheduler: JobScheduler,
        state: Arc<SchedulerState>,
        task: TaskConfig,
    ) {
        if !state.try_begin_execution(&task.id) {
            warn!(
                task.id = %task.id,
                task.name = task.name,
                "Previous execution is still running, dropping this fire."
            );
            return;
        }

        let result = api.tasks().execute_task(&task).await;
        state.finish_execution(&task.id);

        if !task.schedule.is_one_time() {
            return;
        }

        // One-time tasks are cleaned up regardless of the execution outcome, and the mutation is
        // applied immediately instead of waiting for the next periodic reload tick.
        match api.tasks().cleanup_one_time_task(&task).await {
            Ok(true) => {
                if let Err(err) =
                    ConfigReloadJob::reload(api.clone(), &scheduler, &state, true).await
                {
                    error!(
                        task.id = %task.id,
                        "Failed to reload configuration after one-time task cleanup: {err:?}"
                    );
                }
            }
            Ok(false) => {}
            Err(err) => {
                // The task may fire once more within the misfire grace window, which is the
                // accepted tradeoff for cleanup failures.
                error!(
                    task.id = %task.id,
                    execution.id = %result.execution_id,
                    "Failed to clean up one-time task: {err:?}"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::TaskRunJob;
    use crate::{
        scheduler::SchedulerState,
        tasks::{
            TaskSchedule,
            tests::{MockActionInvoker, MockNotifier, mock_task_config},
        },
        tests::{mock_api, mock_config, mock_run_at_in_sec},
    };
    use chrono::Utc;
    use std::{sync::Arc, time::Duration};
    use tokio_cron_scheduler::JobScheduler;

    #[tokio::test]
    async fn creates_jobs_for_every_schedule_kind() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let api = Arc::new(mock_api(
            mock_config(dir.path()),
            MockActionInvoker::succeeding(),
            MockNotifier::default(),
        ));
        let state = Arc::new(SchedulerState::default());

        for schedule in [
            TaskSchedule::Cron {
                expression: "30 19 * * 1,2".to_string(),
            },
            TaskSchedule::Interval { interval_seconds: 60 },
            TaskSchedule::Date {
                run_at: mock_run_at_in_sec(3600),
            },
        ] {
            let job = TaskRunJob::create(
                api.clone(),
                state.clone(),
                mock_task_config("task-one", "task", schedule),
            )?;
            assert!(job.is_some());
        }

        Ok(())
    }

    #[tokio::test]
    async fn applies_the_misfire_grace_window_to_one_time_tasks() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let mut config = mock_config(dir.path());
        config.scheduler.one_time_misfire_grace = Duration::from_secs(600);
        let api = Arc::new(mock_api(
            config,
            MockActionInvoker::succeeding(),
            MockNotifier::default(),
        ));
        let state = Arc::new(SchedulerState::default());

        // Missed fire time within the grace window still schedules.
        let recently_missed = (Utc::now() - chrono::TimeDelta::seconds(60)).to_rfc3339();
        let job = TaskRunJob::create(
            api.clone(),
            state.clone(),
            mock_task_config(
                "task-one",
                "one-shot",
                TaskSchedule::Date {
                    run_at: recently_missed,
                },
            ),
        )?;
        assert!(job.is_some());

        // Beyond the grace window the job is not scheduled.
        let long_missed = (Utc::now() - chrono::TimeDelta::seconds(6000)).to_rfc3339();
        let job = TaskRunJob::create(
            api.clone(),
            state.clone(),
            mock_task_config(
                "task-two",
                "stale one-shot",
                TaskSchedule::Date { run_at: long_missed },
            ),
        )?;
        assert!(job.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn drops_overlapping_executions_of_the_same_task() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let api = Arc::new(mock_api(
            mock_config(dir.path()),
            MockActionInvoker::succeeding().with_delay(Duration::from_millis(500)),
            MockNotifier::default(),
        ));
        let state = Arc::new(SchedulerState::default());
        let scheduler = JobScheduler::new().await?;

        let task = mock_task_config(
            "task-one",
            "slow",
            TaskSchedule::Interval { interval_seconds: 60 },
        );

        // Two simultaneous fires of the same task id produce a single invocation.
        tokio::join!(
            TaskRunJob::execute(api.clone(), scheduler.clone(), state.clone(), task.clone()),
            TaskRunJob::execute(api.clone(), scheduler.clone(), state.clone(), task.clone()),
        );
        assert_eq!(api.invoker.calls(), 1);

        // A subsequent fire runs again.
        TaskRunJob::execute(api.clone(), scheduler.clone(), state.clone(), task.clone()).await;
        assert_eq!(api.invoker.calls(), 2);

        Ok(())
    }

    #[tokio::test]
    async fn cleans_up_one_time_tasks_after_execution() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let api = Arc::new(mock_api(
            mock_config(dir.path()),
            // The action fails, but one-time cleanup happens regardless of the outcome.
            MockActionInvoker::failing(),
            MockNotifier::default(),
        ));
        let state = Arc::new(SchedulerState::default());
        let scheduler = JobScheduler::new().await?;

        let mut task = api
            .tasks_store
            .append(mock_task_config(
                "",
                "one-shot",
                TaskSchedule::Date {
                    run_at: mock_run_at_in_sec(3600),
                },
            ))
            .await?;
        task.max_retries = 0;

        TaskRunJob::execute(api.clone(), scheduler, state, task.clone()).await;

        // The task is gone from the configuration and the failed result is recorded.
        assert_eq!(api.tasks().get_task(&task.id).await?, None);
        let results = api.tasks().get_task_results(&task.id, 10).await?;
        assert_eq!(results.len(), 1);
        assert!(!results[0].success);

        Ok(())
    }
}
