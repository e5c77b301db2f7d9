pub mod scheduler_reload;
pub mod status_get;
pub mod tasks_create;
pub mod tasks_list;
pub mod tasks_list_results;
pub mod tasks_remove;

use crate::{
    server::{SchedulerStatus, Status},
    tasks::{
        TaskAction, TaskConfig, TaskCreateParams, TaskExecutionResult, TaskKind, TaskSchedule,
    },
};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(title = "Chronod"),
    paths(
        status_get::status_get,
        tasks_list::tasks_list,
        tasks_create::tasks_create,
        tasks_remove::tasks_remove,
        tasks_list_results::tasks_list_results,
        scheduler_reload::scheduler_reload
    ),
    components(schemas(
        SchedulerStatus,
        Status,
        TaskAction,
        TaskConfig,
        TaskCreateParams,
        TaskExecutionResult,
        TaskKind,
        TaskSchedule
    ))
)]
pub(super) struct ChronodOpenApi;
