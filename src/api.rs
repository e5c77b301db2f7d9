use crate::{
    config::Config,
    tasks::{ActionInvoker, Notifier, ResultsStore, TasksConfigStore},
};

/// Shared services of the application: the resolved configuration, the file-backed stores, and
/// the pluggable action invoker and notifier. Constructed once at process start and passed around
/// by reference.
pub struct Api<I: ActionInvoker, N: Notifier> {
    pub config: Config,
    pub tasks_store: TasksConfigStore,
    pub results_store: ResultsStore,
    pub invoker: I,
    pub notifier: N,
}

impl<I: ActionInvoker, N: Notifier> Api<I, N> {
    /// Instantiates APIs collection with the specified config and stores.
    pub fn new(
        config: Config,
        tasks_store: TasksConfigStore,
        results_store: ResultsStore,
        invoker: I,
        notifier: N,
    ) -> Self {
        Self {
            config,
            tasks_store,
            results_store,
            invoker,
            notifier,
        }
    }
}
