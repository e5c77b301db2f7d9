use crate::tasks::TaskExecutionResult;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};
use tokio::{fs, sync::RwLock};
use tracing::warn;

/// The persisted execution results document.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
struct ResultsDocument {
    #[serde(default)]
    results: Vec<TaskExecutionResult>,
    #[serde(default = "default_max_results")]
    max_results: usize,
}

fn default_max_results() -> usize {
    1000
}

/// File-backed, bounded log of task execution results. The store exclusively owns the on-disk
/// document; every append rewrites the whole document atomically and evicts the oldest entries
/// beyond the configured cap.
pub struct ResultsStore {
    path: PathBuf,
    max_results: usize,
    lock: RwLock<()>,
}

impl ResultsStore {
    /// Creates a store backed by the file at the specified path, keeping at most `max_results`
    /// entries.
    pub fn new(path: impl Into<PathBuf>, max_results: usize) -> Self {
        Self {
            path: path.into(),
            max_results,
            lock: RwLock::new(()),
        }
    }

    /// Returns the path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends an execution result, evicting the oldest entries beyond the cap.
    pub async fn add(&self, result: TaskExecutionResult) -> anyhow::Result<()> {
        let _guard = self.lock.write().await;
        let mut document = self.read_document_or_default().await;

        document.results.push(result);
        if document.results.len() > self.max_results {
            let excess = document.results.len() - self.max_results;
            document.results.drain(..excess);
        }
        document.max_results = self.max_results;

        self.write_document(&document).await
    }

    /// Returns up to `limit` results for the specified task, most recent first.
    pub async fn results_for_task(
        &self,
        task_id: &str,
        limit: usize,
    ) -> anyhow::Result<Vec<TaskExecutionResult>> {
        let _guard = self.lock.read().await;
        let document = self.read_document_or_default().await;

        let mut results = document
            .results
            .into_iter()
            .filter(|result| result.task_id == task_id)
            .collect::<Vec<_>>();
        results.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        results.truncate(limit);

        Ok(results)
    }

    /// Returns up to `limit` results across all tasks, most recent first.
    pub async fn recent(&self, limit: usize) -> anyhow::Result<Vec<TaskExecutionResult>> {
        let _guard = self.lock.read().await;
        let mut results = self.read_document_or_default().await.results;

        results.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        results.truncate(limit);

        Ok(results)
    }

    /// Reads the results document, falling back to a fresh empty one if the file is absent or
    /// corrupted: execution history is advisory and must never prevent tasks from running.
    async fn read_document_or_default(&self) -> ResultsDocument {
        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(err) => {
                if err.kind() != ErrorKind::NotFound {
                    warn!("Failed to read task results file: {err}");
                }
                return ResultsDocument {
                    results: vec![],
                    max_results: self.max_results,
                };
            }
        };

        match serde_json::from_slice(&bytes) {
            Ok(document) => document,
            Err(err) => {
                warn!("Task results file is corrupted, starting a fresh one: {err}");
                ResultsDocument {
                    results: vec![],
                    max_results: self.max_results,
                }
            }
        }
    }

    async fn write_document(&self, document: &ResultsDocument) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await.with_context(|| {
                    format!("Cannot create storage directory: {}.", parent.display())
                })?;
            }
        }

        let json = serde_json::to_vec_pretty(document)?;
        let temp_path = self.path.with_extension("json.tmp");
        fs::write(&temp_path, &json)
            .await
            .with_context(|| format!("Cannot write task results file: {}.", temp_path.display()))?;
        fs::rename(&temp_path, &self.path)
            .await
            .with_context(|| {
                format!("Cannot replace task results file: {}.", self.path.display())
            })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::ResultsStore;
    use crate::tasks::TaskExecutionResult;
    use chrono::{Duration, TimeZone, Utc};
    use std::fs;
    use uuid::Uuid;

    fn mock_result(task_id: &str, minutes: i64) -> TaskExecutionResult {
        let started_at = Utc.with_ymd_and_hms(2026, 1, 1, 10, 0, 0).unwrap() + Duration::minutes(minutes);
        TaskExecutionResult {
            task_id: task_id.to_string(),
            execution_id: Uuid::now_v7(),
            started_at,
            completed_at: Some(started_at + Duration::seconds(1)),
            success: true,
            error_message: None,
            result_data: None,
            retry_count: 0,
            next_retry_at: None,
        }
    }

    #[tokio::test]
    async fn returns_results_most_recent_first() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let store = ResultsStore::new(dir.path().join("task_results.json"), 1000);

        store.add(mock_result("task-one", 0)).await?;
        store.add(mock_result("task-two", 1)).await?;
        store.add(mock_result("task-one", 2)).await?;

        let results = store.results_for_task("task-one", 10).await?;
        assert_eq!(results.len(), 2);
        assert!(results[0].started_at > results[1].started_at);

        let results = store.results_for_task("task-one", 1).await?;
        assert_eq!(results.len(), 1);

        let results = store.recent(10).await?;
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].task_id, "task-one");
        assert_eq!(results[1].task_id, "task-two");

        assert_eq!(store.results_for_task("task-three", 10).await?, vec![]);

        Ok(())
    }

    #[tokio::test]
    async fn evicts_oldest_results_beyond_the_cap() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let store = ResultsStore::new(dir.path().join("task_results.json"), 3);

        for minutes in 0..5 {
            store.add(mock_result("task-one", minutes)).await?;
        }

        let results = store.results_for_task("task-one", 10).await?;
        assert_eq!(results.len(), 3);

        // The two oldest results are gone.
        let oldest_kept = Utc.with_ymd_and_hms(2026, 1, 1, 10, 2, 0).unwrap();
        assert!(results.iter().all(|result| result.started_at >= oldest_kept));

        Ok(())
    }

    #[tokio::test]
    async fn recovers_from_missing_or_corrupted_files() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let store = ResultsStore::new(dir.path().join("task_results.json"), 1000);

        assert_eq!(store.recent(10).await?, vec![]);

        fs::write(store.path(), "{ not json")?;
        assert_eq!(store.recent(10).await?, vec![]);

        // The next append replaces the corrupted document.
        store.add(mock_result("task-one", 0)).await?;
        assert_eq!(store.recent(10).await?.len(), 1);

        Ok(())
    }
}
