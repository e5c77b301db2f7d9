use crate::server::SchedulerStatus;
use serde::Serialize;
use utoipa::ToSchema;

/// Server status.
#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct Status {
    /// Version of the server.
    pub version: String,
    /// Status of the scheduler.
    pub scheduler: SchedulerStatus,
}
