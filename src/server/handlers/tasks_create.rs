use crate::{
    error::Error as ChronodError,
    server::ServerState,
    tasks::{TaskConfig, TaskCreateParams},
};
use actix_web::{HttpResponse, post, web};
use tracing::error;

/// Creates a new task with the specified parameters.
#[utoipa::path(
    tags = ["tasks"],
    request_body = TaskCreateParams,
    responses(
        (status = 200, description = "The created task.", body = TaskConfig)
    )
)]
#[post("/api/tasks")]
pub async fn tasks_create(
    state: web::Data<ServerState>,
    params: web::Json<TaskCreateParams>,
) -> Result<HttpResponse, ChronodError> {
    let task = match state.api.tasks().create_task(params.into_inner()).await {
        Ok(task) => task,
        Err(err) => {
            error!("Failed to create task: {err:?}");
            return Err(err.into());
        }
    };

    // Register the new task right away instead of waiting for the periodic reload tick.
    if let Err(err) = state.scheduler.write().await.reload().await {
        error!(task.id = %task.id, "Failed to reload scheduler after task creation: {err:?}");
    }

    Ok(HttpResponse::Ok().json(task))
}
