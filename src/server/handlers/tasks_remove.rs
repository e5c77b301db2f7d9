use crate::{error::Error as ChronodError, server::ServerState, tasks::TaskConfig};
use actix_web::{HttpResponse, delete, web};
use tracing::error;

/// Removes the task with the specified name. The name has to identify a single task: an exact
/// (case-insensitive) match is preferred, a unique substring match is accepted, and multiple
/// matches are rejected with the list of candidates.
#[utoipa::path(
    tags = ["tasks"],
    params(
        ("task_name" = String, Path, description = "A name of the task to remove.")
    ),
    responses(
        (status = 200, description = "The removed task.", body = TaskConfig)
    )
)]
#[delete("/api/tasks/{task_name}")]
pub async fn tasks_remove(
    state: web::Data<ServerState>,
    task_name: web::Path<String>,
) -> Result<HttpResponse, ChronodError> {
    let task = match state
        .api
        .tasks()
        .remove_task_by_name(&task_name.into_inner())
        .await
    {
        Ok(task) => task,
        Err(err) => {
            error!("Failed to remove task: {err:?}");
            return Err(err.into());
        }
    };

    // Deregister the removed task right away instead of waiting for the periodic reload tick.
    if let Err(err) = state.scheduler.write().await.reload().await {
        error!(task.id = %task.id, "Failed to reload scheduler after task removal: {err:?}");
    }

    Ok(HttpResponse::Ok().json(task))
}
