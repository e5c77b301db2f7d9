use crate::tasks::TaskConfig;
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// The full persisted task configuration document.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, ToSchema)]
pub struct TasksConfiguration {
    /// Configuration file format version.
    #[serde(default = "default_version")]
    pub version: String,
    /// All configured tasks.
    #[serde(default)]
    pub tasks: Vec<TaskConfig>,
    /// Timestamp of the last modification, refreshed on every write.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<DateTime<FixedOffset>>,
}

impl Default for TasksConfiguration {
    fn default() -> Self {
        Self {
            version: default_version(),
            tasks: vec![],
            last_modified: None,
        }
    }
}

fn default_version() -> String {
    "1.0".to_string()
}
