use crate::config::{
    ActionsConfig, NotificationsConfig, SchedulerConfig, StorageConfig,
};
use chrono_tz::Tz;
use figment::{Figment, providers, providers::Format};
use serde::{Deserialize, Serialize};

/// Raw configuration structure that is used to read the configuration from the file.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct RawConfig {
    /// Defines a TCP port to listen on.
    pub port: u16,
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

impl RawConfig {
    /// Reads the configuration from the file (TOML) and merges it with the default values.
    pub fn read_from_file(path: &str) -> anyhow::Result<Self> {
        Ok(
            Figment::from(providers::Serialized::defaults(Self::default()))
                .merge(providers::Toml::file(path))
                .merge(providers::Env::prefixed("CHRONOD_").split("__"))
                .extract()?,
        )
    }
}

impl Default for RawConfig {
    fn default() -> Self {
        Self {
            port: 7878,
            timezone: Tz::UTC,
            storage: Default::default(),
            scheduler: Default::default(),
            actions: Default::default(),
            notifications: None,
        }
    }
}
