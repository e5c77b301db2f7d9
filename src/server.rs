mod handlers;
mod server_state;

pub use self::server_state::{SchedulerStatus, ServerState, Status};

use crate::{
    api::Api,
    config::{Config, RawConfig},
    scheduler::Scheduler,
    server::handlers::ChronodOpenApi,
    tasks::{HttpActionInvoker, ResultsStore, TasksConfigStore, WebhookNotifier},
};
use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};
use anyhow::Context;
use std::sync::Arc;
use tracing::info;
use tracing_actix_web::TracingLogger;
use utoipa::OpenApi;
use utoipa_rapidoc::RapiDoc;

pub async fn run(raw_config: RawConfig) -> Result<(), anyhow::Error> {
    let http_port = raw_config.port;
    let config = Config::from(raw_config);

    let tasks_store = TasksConfigStore::new(config.storage.tasks_path.clone(), config.timezone);
    let results_store =
        ResultsStore::new(config.storage.results_path.clone(), config.storage.max_results);
    let invoker = HttpActionInvoker::new(config.actions.clone());
    let notifier = WebhookNotifier::new(config.notifications.clone());
    let api = Arc::new(Api::new(
        config,
        tasks_store,
        results_store,
        invoker,
        notifier,
    ));

    let mut scheduler = Scheduler::create(api.clone()).await?;
    scheduler.start().await?;

    let state = web::Data::new(ServerState::new(api, scheduler));
    let http_server = HttpServer::new(move || {
        App::new()
            .wrap(middleware::Compat::new(TracingLogger::default()))
            .wrap(middleware::Compat::new(middleware::Compress::default()))
            .wrap(middleware::NormalizePath::trim())
            .app_data(state.clone())
            .service(RapiDoc::with_openapi(
                "/api-docs/openapi.json",
                ChronodOpenApi::openapi(),
            ))
            .service(handlers::status_get::status_get)
            .service(handlers::tasks_list::tasks_list)
            .service(handlers::tasks_create::tasks_create)
            .service(handlers::tasks_remove::tasks_remove)
            .service(handlers::tasks_list_results::tasks_list_results)
            .service(handlers::scheduler_reload::scheduler_reload)
            .wrap(Cors::permissive())
    });

    let http_server_url = format!("0.0.0.0:{http_port}");
    let http_server = http_server
        .bind(&http_server_url)
        .with_context(|| format!("Failed to bind to {http_server_url}."))?;

    info!("Chronod API server is available at http://{http_server_url}");

    http_server
        .run()
        .await
        .context("Failed to run Chronod API server.")
}
