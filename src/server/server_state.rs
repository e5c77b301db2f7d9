mod scheduler_status;
mod status;

pub use self::{scheduler_status::SchedulerStatus, status::Status};
use crate::{
    api::Api,
    scheduler::Scheduler,
    tasks::{ActionInvoker, HttpActionInvoker, Notifier, WebhookNotifier},
};
use std::sync::Arc;
use tokio::sync::RwLock;

pub struct ServerState<I: ActionInvoker = HttpActionInvoker, N: Notifier = WebhookNotifier> {
    pub api: Arc<Api<I, N>>,
    pub scheduler: RwLock<Scheduler<I, N>>,
    /// Version of the API server.
    version: String,
}

impl<I: ActionInvoker, N: Notifier> ServerState<I, N> {
    pub fn new(api: Arc<Api<I, N>>, scheduler: Scheduler<I, N>) -> Self {
        Self {
            api,
            scheduler: RwLock::new(scheduler),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// Gets the status of the server.
    pub async fn status(&self) -> anyhow::Result<Status> {
        Ok(Status {
            version: self.version.clone(),
            scheduler: self.scheduler.write().await.status().await?,
        })
    }
}
