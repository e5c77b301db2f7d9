use crate::tasks::{TaskAction, TaskKind, TaskSchedule};
use serde::{Deserialize, Serialize};
use serde_with::{DurationSeconds, serde_as};
use std::time::Duration;
use utoipa::ToSchema;

/// Represents a single scheduled task as persisted in the task configuration document.
#[serde_as]
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, ToSchema)]
pub struct TaskConfig {
    /// Unique and stable task identifier.
    pub id: String,
    /// Human-readable task name.
    pub name: String,
    /// The kind of work the task performs.
    #[serde(rename = "type")]
    pub kind: TaskKind,
    /// Whether the task is currently enabled.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// When the task should run.
    pub schedule: TaskSchedule,
    /// The action to invoke on every run.
    pub action: TaskAction,
    /// Optional task description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Maximum number of retry attempts after a failed invocation.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Delay between retry attempts.
    #[serde_as(as = "DurationSeconds<u64>")]
    #[serde(rename = "retry_delay", default = "default_retry_delay")]
    #[schema(value_type = u64)]
    pub retry_delay: Duration,
}

fn default_enabled() -> bool {
    true
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_delay() -> Duration {
    Duration::from_secs(60)
}
