use serde::Serialize;
use serde_with::{DurationMilliSeconds, serde_as, skip_serializing_none};
use std::time::Duration;
use utoipa::ToSchema;

/// Scheduler status.
#[serde_as]
#[skip_serializing_none]
#[derive(Clone, Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SchedulerStatus {
    /// Indicates whether the scheduler is enabled by configuration.
    pub enabled: bool,
    /// Indicates whether the scheduler is currently running.
    pub running: bool,
    /// Number of tasks in the last loaded configuration.
    pub tasks_loaded: usize,
    /// Number of jobs currently registered with the timer engine.
    pub jobs_registered: usize,
    /// Prefix of the content fingerprint of the last loaded configuration.
    pub last_fingerprint: Option<String>,
    /// Indicates when the next job will be run. If there are no scheduled jobs, this field is `None`.
    #[serde_as(as = "Option<DurationMilliSeconds<u64>>")]
    #[schema(value_type = Option<u64>)]
    pub time_till_next_job: Option<Duration>,
}
