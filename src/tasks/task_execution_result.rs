use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Records the outcome of a single task execution, including the retry state it went through.
/// Once `completed_at` is set the result is never mutated again.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, ToSchema)]
pub struct TaskExecutionResult {
    /// ID of the executed task.
    pub task_id: String,
    /// Unique identifier of this particular execution.
    pub execution_id: Uuid,
    /// When the execution started.
    pub started_at: DateTime<Utc>,
    /// When the execution completed, including all retry attempts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    /// Whether the task completed successfully.
    pub success: bool,
    /// Error message of the last failed attempt, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    /// Response payload of the last invocation attempt.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_data: Option<serde_json::Value>,
    /// Number of retries performed.
    #[serde(default)]
    pub retry_count: u32,
    /// When the last retry was scheduled to happen, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_retry_at: Option<DateTime<Utc>>,
}
