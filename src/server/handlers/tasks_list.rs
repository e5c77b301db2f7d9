use crate::{
    error::Error as ChronodError,
    server::ServerState,
    tasks::{TaskConfig, TasksListParams},
};
use actix_web::{HttpResponse, get, web};
use tracing::error;

/// Gets a list of configured tasks.
#[utoipa::path(
    tags = ["tasks"],
    params(TasksListParams),
    responses(
        (status = 200, description = "A list of configured tasks.", body = [TaskConfig])
    )
)]
#[get("/api/tasks")]
pub async fn tasks_list(
    state: web::Data<ServerState>,
    params: web::Query<TasksListParams>,
) -> Result<HttpResponse, ChronodError> {
    match state.api.tasks().get_tasks(params.into_inner()).await {
        Ok(tasks) => Ok(HttpResponse::Ok().json(tasks)),
        Err(err) => {
            error!("Failed to retrieve tasks: {err:?}");
            Err(err.into())
        }
    }
}
