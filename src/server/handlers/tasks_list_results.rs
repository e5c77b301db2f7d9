use crate::{error::Error as ChronodError, server::ServerState, tasks::TaskExecutionResult};
use actix_web::{HttpResponse, get, web};
use serde::Deserialize;
use tracing::error;
use utoipa::IntoParams;

/// Parameters for listing the execution results of a task.
#[derive(Deserialize, IntoParams, Debug, Clone, PartialEq, Eq)]
pub struct TaskResultsListParams {
    /// Maximum number of results to return.
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    10
}

/// Gets the most recent execution results of the task with the specified id.
#[utoipa::path(
    tags = ["tasks"],
    params(
        ("task_id" = String, Path, description = "The id of the task to list results for."),
        TaskResultsListParams
    ),
    responses(
        (status = 200, description = "Execution results, most recent first.", body = [TaskExecutionResult])
    )
)]
#[get("/api/tasks/{task_id}/results")]
pub async fn tasks_list_results(
    state: web::Data<ServerState>,
    task_id: web::Path<String>,
    params: web::Query<TaskResultsListParams>,
) -> Result<HttpResponse, ChronodError> {
    match state
        .api
        .tasks()
        .get_task_results(&task_id.into_inner(), params.limit)
        .await
    {
        Ok(results) => Ok(HttpResponse::Ok().json(results)),
        Err(err) => {
            error!("Failed to retrieve task results: {err:?}");
            Err(err.into())
        }
    }
}
