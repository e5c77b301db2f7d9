use crate::{error::Error as ChronodError, server::ServerState};
use actix_web::{HttpResponse, post, web};
use tracing::error;

/// Forces a task configuration reload regardless of the content fingerprint.
#[utoipa::path(
    tags = ["platform"],
    responses(
        (status = 200, description = "The configuration was reloaded.")
    )
)]
#[post("/api/scheduler/reload")]
pub async fn scheduler_reload(state: web::Data<ServerState>) -> Result<HttpResponse, ChronodError> {
    match state.scheduler.write().await.reload().await {
        Ok(reloaded) => Ok(HttpResponse::Ok().json(serde_json::json!({ "reloaded": reloaded }))),
        Err(err) => {
            error!("Failed to reload task configuration: {err:?}");
            Err(err.into())
        }
    }
}
