mod actions_config;
mod notifications_config;
mod raw_config;
mod scheduler_config;
mod storage_config;

use chrono_tz::Tz;

pub use self::{
    actions_config::ActionsConfig,
    notifications_config::NotificationsConfig,
    raw_config::RawConfig,
    scheduler_config::{OneTimeCleanupMode, SchedulerConfig},
    storage_config::StorageConfig,
};

/// Main service config.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// The timezone timezone-naive schedules are interpreted in.
    pub timezone: Tz,
    /// Configuration for the file-backed stores.
    pub storage: StorageConfig,
    /// Configuration for the scheduler.
    pub scheduler: SchedulerConfig,
    /// Configuration for the HTTP action invoker.
    pub actions: ActionsConfig,
    /// Configuration for failure notifications.
    pub notifications: Option<NotificationsConfig>,
}

impl AsRef<Config> for Config {
    fn as_ref(&self) -> &Config {
        self
    }
}

impl From<RawConfig> for Config {
    fn from(raw_config: RawConfig) -> Self {
        Self {
            timezone: raw_config.timezone,
            storage: raw_config.storage,
            scheduler: raw_config.scheduler,
            actions: raw_config.actions,
            notifications: raw_config.notifications,
        }
    }
}
