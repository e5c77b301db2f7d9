use crate::{
    error::Error as ChronodError,
    tasks::{TaskConfig, TaskSchedule, TasksConfiguration},
};
use anyhow::{Context, bail};
use chrono::Utc;
use chrono_tz::Tz;
use sha2::{Digest, Sha256};
use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};
use tokio::{fs, sync::RwLock};
use tracing::warn;
use uuid::Uuid;

/// Filter applied when listing tasks from the configuration document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TasksListFilter {
    /// Return only enabled tasks.
    pub only_enabled: bool,
    /// Case-insensitive substring match on the task name.
    pub name_contains: Option<String>,
}

/// File-backed store for the task configuration document. The store exclusively owns the on-disk
/// document: mutations are read-modify-write cycles guarded by an internal lock, and every write
/// replaces the file atomically (write-temp-then-rename), so a crash can never leave a partially
/// written configuration behind.
pub struct TasksConfigStore {
    path: PathBuf,
    timezone: Tz,
    lock: RwLock<()>,
}

impl TasksConfigStore {
    /// Creates a store backed by the file at the specified path. Date-type schedules are
    /// normalized to the specified timezone on append.
    pub fn new(path: impl Into<PathBuf>, timezone: Tz) -> Self {
        Self {
            path: path.into(),
            timezone,
            lock: RwLock::new(()),
        }
    }

    /// Returns the path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the configuration document. A missing or malformed file is an error.
    pub async fn load(&self) -> anyhow::Result<TasksConfiguration> {
        let _guard = self.lock.read().await;
        self.read_document().await
    }

    /// Loads the configuration document, falling back to an empty one if the file doesn't exist
    /// yet. A malformed file is still an error.
    pub async fn load_or_default(&self) -> anyhow::Result<TasksConfiguration> {
        let _guard = self.lock.read().await;
        self.read_document_or_default().await
    }

    /// Returns the SHA-256 hex digest of the raw file content, or `None` if the file is absent or
    /// cannot be read.
    pub async fn fingerprint(&self) -> Option<String> {
        let _guard = self.lock.read().await;
        match fs::read(&self.path).await {
            Ok(bytes) => {
                let digest = Sha256::digest(&bytes);
                Some(format!("{digest:x}"))
            }
            Err(err) if err.kind() == ErrorKind::NotFound => None,
            Err(err) => {
                warn!(
                    "Failed to read task configuration file for fingerprinting: {err}"
                );
                None
            }
        }
    }

    /// Appends a task to the document. Assigns a collision-resistant id when the caller didn't
    /// provide one, normalizes date-type schedules to an absolute, timezone-resolved timestamp,
    /// and refreshes `last_modified`.
    pub async fn append(&self, mut task: TaskConfig) -> anyhow::Result<TaskConfig> {
        let _guard = self.lock.write().await;
        let mut configuration = self.read_document_or_default().await?;

        if task.id.is_empty() {
            task.id = Uuid::now_v7().to_string();
        } else if configuration.tasks.iter().any(|t| t.id == task.id) {
            bail!(ChronodError::client(format!(
                "Task with id '{}' already exists.",
                task.id
            )));
        }

        if let TaskSchedule::Date { ref run_at } = task.schedule {
            let resolved = match TaskSchedule::resolve_run_at(run_at, self.timezone) {
                Ok(resolved) => resolved,
                Err(err) => bail!(ChronodError::client(format!(
                    "Cannot schedule task '{}': {err}",
                    task.name
                ))),
            };
            task.schedule = TaskSchedule::Date {
                run_at: resolved.to_rfc3339(),
            };
        }

        configuration.tasks.push(task.clone());
        self.write_document(&mut configuration).await?;

        Ok(task)
    }

    /// Removes a task by id, returning whether anything was removed.
    pub async fn remove(&self, id: &str) -> anyhow::Result<bool> {
        let _guard = self.lock.write().await;
        let mut configuration = self.read_document_or_default().await?;

        let original_count = configuration.tasks.len();
        configuration.tasks.retain(|task| task.id != id);
        if configuration.tasks.len() == original_count {
            return Ok(false);
        }

        self.write_document(&mut configuration).await?;
        Ok(true)
    }

    /// Sets `enabled = false` on the task with the specified id, returning whether the task was
    /// found.
    pub async fn disable(&self, id: &str) -> anyhow::Result<bool> {
        let _guard = self.lock.write().await;
        let mut configuration = self.read_document_or_default().await?;

        let Some(task) = configuration.tasks.iter_mut().find(|task| task.id == id) else {
            return Ok(false);
        };
        task.enabled = false;

        self.write_document(&mut configuration).await?;
        Ok(true)
    }

    /// Lists tasks matching the specified filter. A missing file yields an empty list.
    pub async fn list(&self, filter: &TasksListFilter) -> anyhow::Result<Vec<TaskConfig>> {
        let _guard = self.lock.read().await;
        let configuration = self.read_document_or_default().await?;

        let name_contains = filter
            .name_contains
            .as_ref()
            .map(|name| name.to_lowercase());
        Ok(configuration
            .tasks
            .into_iter()
            .filter(|task| !filter.only_enabled || task.enabled)
            .filter(|task| {
                name_contains
                    .as_ref()
                    .map(|name| task.name.to_lowercase().contains(name))
                    .unwrap_or(true)
            })
            .collect())
    }

    async fn read_document(&self) -> anyhow::Result<TasksConfiguration> {
        let bytes = fs::read(&self.path).await.with_context(|| {
            format!(
                "Cannot read task configuration file: {}.",
                self.path.display()
            )
        })?;
        serde_json::from_slice(&bytes).with_context(|| {
            format!(
                "Cannot parse task configuration file: {}.",
                self.path.display()
            )
        })
    }

    async fn read_document_or_default(&self) -> anyhow::Result<TasksConfiguration> {
        match fs::read(&self.path).await {
            Ok(bytes) => serde_json::from_slice(&bytes).with_context(|| {
                format!(
                    "Cannot parse task configuration file: {}.",
                    self.path.display()
                )
            }),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(TasksConfiguration::default()),
            Err(err) => Err(err).with_context(|| {
                format!(
                    "Cannot read task configuration file: {}.",
                    self.path.display()
                )
            }),
        }
    }

    async fn write_document(&self, configuration: &mut TasksConfiguration) -> anyhow::Result<()> {
        configuration.last_modified =
            Some(Utc::now().with_timezone(&self.timezone).fixed_offset());

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await.with_context(|| {
                    format!("Cannot create storage directory: {}.", parent.display())
                })?;
            }
        }

        let json = serde_json::to_vec_pretty(configuration)?;
        let temp_path = self.path.with_extension("json.tmp");
        fs::write(&temp_path, &json).await.with_context(|| {
            format!(
                "Cannot write task configuration file: {}.",
                temp_path.display()
            )
        })?;
        fs::rename(&temp_path, &self.path).await.with_context(|| {
            format!(
                "Cannot replace task configuration file: {}.",
                self.path.display()
            )
        })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{TasksConfigStore, TasksListFilter};
    use crate::tasks::{TaskConfig, TaskSchedule, tests::mock_task_config};
    use chrono_tz::Tz;
    use std::fs;

    fn mock_store(dir: &tempfile::TempDir) -> TasksConfigStore {
        TasksConfigStore::new(
            dir.path().join("scheduled_tasks.json"),
            "America/Los_Angeles".parse::<Tz>().unwrap(),
        )
    }

    #[tokio::test]
    async fn load_distinguishes_missing_and_malformed_files() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let store = mock_store(&dir);

        assert!(store.load().await.is_err());
        assert_eq!(store.load_or_default().await?.tasks, vec![]);

        fs::write(store.path(), "{ not json")?;
        assert!(store.load().await.is_err());
        assert!(store.load_or_default().await.is_err());

        Ok(())
    }

    #[tokio::test]
    async fn append_assigns_fresh_unique_ids() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let store = mock_store(&dir);

        let task_one = store
            .append(mock_task_config(
                "",
                "ping",
                TaskSchedule::Interval { interval_seconds: 5 },
            ))
            .await?;
        let task_two = store
            .append(mock_task_config(
                "",
                "pong",
                TaskSchedule::Interval { interval_seconds: 5 },
            ))
            .await?;

        assert!(!task_one.id.is_empty());
        assert!(!task_two.id.is_empty());
        assert_ne!(task_one.id, task_two.id);

        // Explicit ids are preserved, but collisions are rejected.
        let task_three = store
            .append(mock_task_config(
                "task-three",
                "custom id",
                TaskSchedule::Interval { interval_seconds: 5 },
            ))
            .await?;
        assert_eq!(task_three.id, "task-three");
        assert!(
            store
                .append(mock_task_config(
                    "task-three",
                    "duplicate",
                    TaskSchedule::Interval { interval_seconds: 5 },
                ))
                .await
                .is_err()
        );

        Ok(())
    }

    #[tokio::test]
    async fn append_normalizes_date_schedules() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let store = mock_store(&dir);

        let task = store
            .append(mock_task_config(
                "",
                "one-shot",
                TaskSchedule::Date {
                    run_at: "2026-01-01T10:00:00".to_string(),
                },
            ))
            .await?;
        assert_eq!(
            task.schedule,
            TaskSchedule::Date {
                run_at: "2026-01-01T10:00:00-08:00".to_string()
            }
        );

        // Round-trip: the persisted document carries the normalized timestamp too.
        let configuration = store.load().await?;
        assert_eq!(configuration.tasks, vec![task]);
        assert!(configuration.last_modified.is_some());

        assert!(
            store
                .append(mock_task_config(
                    "",
                    "bad one-shot",
                    TaskSchedule::Date {
                        run_at: "next tuesday".to_string()
                    },
                ))
                .await
                .is_err()
        );

        Ok(())
    }

    #[tokio::test]
    async fn can_remove_and_disable_tasks() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let store = mock_store(&dir);

        let task = store
            .append(mock_task_config(
                "",
                "ping",
                TaskSchedule::Interval { interval_seconds: 5 },
            ))
            .await?;

        assert!(store.disable(&task.id).await?);
        let tasks = store.list(&TasksListFilter::default()).await?;
        assert_eq!(tasks.len(), 1);
        assert!(!tasks[0].enabled);

        assert!(store.remove(&task.id).await?);
        assert!(!store.remove(&task.id).await?);
        assert!(!store.disable(&task.id).await?);
        assert_eq!(store.list(&TasksListFilter::default()).await?, vec![]);

        Ok(())
    }

    #[tokio::test]
    async fn can_list_tasks_with_filters() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let store = mock_store(&dir);

        // Missing file yields an empty list.
        assert_eq!(store.list(&TasksListFilter::default()).await?, vec![]);

        let ping = store
            .append(mock_task_config(
                "",
                "Ping",
                TaskSchedule::Interval { interval_seconds: 5 },
            ))
            .await?;
        let check = store
            .append(TaskConfig {
                enabled: false,
                ..mock_task_config(
                    "",
                    "evening check",
                    TaskSchedule::Cron {
                        expression: "30 19 * * 1,2".to_string(),
                    },
                )
            })
            .await?;

        assert_eq!(
            store.list(&TasksListFilter::default()).await?,
            vec![ping.clone(), check.clone()]
        );
        assert_eq!(
            store
                .list(&TasksListFilter {
                    only_enabled: true,
                    name_contains: None
                })
                .await?,
            vec![ping.clone()]
        );
        assert_eq!(
            store
                .list(&TasksListFilter {
                    only_enabled: false,
                    name_contains: Some("CHECK".to_string())
                })
                .await?,
            vec![check]
        );
        assert_eq!(
            store
                .list(&TasksListFilter {
                    only_enabled: false,
                    name_contains: Some("missing".to_string())
                })
                .await?,
            vec![]
        );

        Ok(())
    }

    #[tokio::test]
    async fn fingerprint_reflects_file_content() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let store = mock_store(&dir);

        assert_eq!(store.fingerprint().await, None);

        store
            .append(mock_task_config(
                "",
                "ping",
                TaskSchedule::Interval { interval_seconds: 5 },
            ))
            .await?;
        let fingerprint = store.fingerprint().await.unwrap();
        assert_eq!(fingerprint.len(), 64);

        // Unchanged content produces the same digest.
        assert_eq!(store.fingerprint().await, Some(fingerprint.clone()));

        store
            .append(mock_task_config(
                "",
                "pong",
                TaskSchedule::Interval { interval_seconds: 5 },
            ))
            .await?;
        assert_ne!(store.fingerprint().await, Some(fingerprint));

        Ok(())
    }
}
