use crate::tasks::{TaskAction, TaskSchedule};
use serde::Deserialize;
use serde_with::{DurationSeconds, serde_as};
use std::time::Duration;
use utoipa::ToSchema;

/// Parameters for creating a new task.
#[serde_as]
#[derive(Deserialize, ToSchema, Debug, Clone, PartialEq)]
pub struct TaskCreateParams {
    /// Human-readable task name.
    pub name: String,
    /// When the task should run.
    pub schedule: TaskSchedule,
    /// The action to invoke on every run.
    pub action: TaskAction,
    /// Optional task description.
    #[serde(default)]
    pub description: Option<String>,
    /// Whether the task should be enabled right away.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
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

#[cfg(test)]
mod tests {
    use super::TaskCreateParams;
    use crate::tasks::{TaskAction, TaskSchedule};
    use http::Method;
    use serde_json::json;
    use std::time::Duration;

    #[test]
    fn deserialization_applies_defaults() -> anyhow::Result<()> {
        let params = serde_json::from_str::<TaskCreateParams>(
            r#"{
                "name": "ping",
                "schedule": { "type": "interval", "interval_seconds": 5 },
                "action": { "endpoint": "/noop", "method": "POST", "payload": {} }
            }"#,
        )?;

        assert_eq!(
            params,
            TaskCreateParams {
                name: "ping".to_string(),
                schedule: TaskSchedule::Interval { interval_seconds: 5 },
                action: TaskAction {
                    endpoint: "/noop".to_string(),
                    method: Method::POST,
                    payload: json!({}),
                    headers: None,
                    timeout: Duration::from_secs(120),
                },
                description: None,
                enabled: true,
                max_retries: 3,
                retry_delay: Duration::from_secs(60),
            }
        );

        Ok(())
    }
}
