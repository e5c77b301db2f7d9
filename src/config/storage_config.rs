use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for the file-backed task and result stores.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct StorageConfig {
    /// Path to the task configuration document.
    pub tasks_path: PathBuf,
    /// Path to the execution results document.
    pub results_path: PathBuf,
    /// Maximum number of execution results to keep.
    pub max_results: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            tasks_path: PathBuf::from("storage/scheduled_tasks.json"),
            results_path: PathBuf::from("storage/task_results.json"),
            max_results: 1000,
        }
    }
}
