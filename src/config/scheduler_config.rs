use serde::{Deserialize, Serialize};
use serde_with::{DurationSeconds, serde_as};
use std::time::Duration;

/// Cleanup policy applied to one-time tasks after they run.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, Default, Hash, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OneTimeCleanupMode {
    /// Delete the task from the configuration document.
    #[default]
    Remove,
    /// Keep the task, but set `enabled = false`.
    Disable,
}

/// Configuration for the chronod scheduler.
#[serde_as]
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct SchedulerConfig {
    /// Indicates whether the scheduler should run at all.
    pub enabled: bool,
    /// How often to check the task configuration file for changes.
    #[serde_as(as = "DurationSeconds<u64>")]
    pub reload_interval: Duration,
    /// How long after its `run_at` timestamp a missed one-time task is still allowed to fire.
    #[serde_as(as = "DurationSeconds<u64>")]
    pub one_time_misfire_grace: Duration,
    /// What to do with one-time tasks once they have run.
    pub cleanup_mode: OneTimeCleanupMode,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            reload_interval: Duration::from_secs(30),
            one_time_misfire_grace: Duration::from_secs(3600),
            cleanup_mode: OneTimeCleanupMode::Remove,
        }
    }
}
