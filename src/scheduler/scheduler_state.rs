use std::{
    collections::{HashMap, HashSet},
    sync::Mutex as StdMutex,
};
use tokio::sync::{Mutex, MutexGuard};
use uuid::Uuid;

/// The jobs registered for the currently loaded configuration, together with the fingerprint that
/// configuration was loaded from.
#[derive(Debug, Default)]
pub(crate) struct RegisteredJobs {
    /// Fingerprint of the last successfully loaded configuration.
    pub fingerprint: Option<String>,
    /// Indicates whether a configuration has been loaded at least once.
    pub loaded: bool,
    /// Total number of tasks in the last loaded configuration.
    pub tasks_loaded: usize,
    /// Job id registered with the timer engine, per task id.
    pub jobs: HashMap<String, Uuid>,
}

/// In-memory scheduler state. Derived entirely from the configuration store and rebuilt from
/// scratch on restart. The registered-jobs half doubles as the reload critical section: every
/// reload — periodic, forced, or cleanup-triggered — holds its lock for the whole
/// "read fingerprint, load, deregister, register" cycle.
#[derive(Debug, Default)]
pub(crate) struct SchedulerState {
    registered: Mutex<RegisteredJobs>,
    running_tasks: StdMutex<HashSet<String>>,
}

impl SchedulerState {
    /// Acquires the reload critical section.
    pub async fn lock_registered(&self) -> MutexGuard<'_, RegisteredJobs> {
        self.registered.lock().await
    }

    /// Marks the task as executing. Returns `false` if an execution for the same task id is
    /// already in flight — the overlapping fire must be dropped, not queued.
    pub fn try_begin_execution(&self, task_id: &str) -> bool {
        self.running_tasks
            .lock()
            .expect("running tasks lock is poisoned")
            .insert(task_id.to_string())
    }

    /// Marks the task execution as finished.
    pub fn finish_execution(&self, task_id: &str) {
        self.running_tasks
            .lock()
            .expect("running tasks lock is poisoned")
            .remove(task_id);
    }

    /// Returns `(tasks loaded, jobs registered, fingerprint)` for status reporting.
    pub async fn status_snapshot(&self) -> (usize, usize, Option<String>) {
        let registered = self.registered.lock().await;
        (
            registered.tasks_loaded,
            registered.jobs.len(),
            registered.fingerprint.clone(),
        )
    }

    /// Drops all bookkeeping, returning the state to its post-construction shape.
    pub async fn clear(&self) {
        *self.registered.lock().await = RegisteredJobs::default();
        self.running_tasks
            .lock()
            .expect("running tasks lock is poisoned")
            .clear();
    }
}
