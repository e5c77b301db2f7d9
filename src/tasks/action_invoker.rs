use crate::{config::ActionsConfig, tasks::TaskAction};
use anyhow::Context;
use async_trait::async_trait;
use http::Method;
use reqwest_middleware::ClientBuilder;
use reqwest_tracing::{SpanBackendWithUrl, TracingMiddleware};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, warn};
use url::Url;

/// Outcome of a single action invocation.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ActionResponse {
    /// Whether the action reported success.
    pub success: bool,
    /// Response payload returned by the action.
    pub payload: serde_json::Value,
}

impl ActionResponse {
    /// Creates a failed response carrying only an error message.
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            payload: json!({ "error": error.into() }),
        }
    }
}

/// Invokes a task's action and reports success or failure together with a response payload. The
/// scheduler core only depends on this interface, keeping the concrete action transport pluggable.
#[async_trait]
pub trait ActionInvoker: Send + Sync + 'static {
    async fn invoke(&self, action: &TaskAction) -> anyhow::Result<ActionResponse>;
}

/// Default `ActionInvoker` implementation that performs an HTTP call to an endpoint resolved
/// against the configured action base URL.
pub struct HttpActionInvoker {
    client: reqwest_middleware::ClientWithMiddleware,
    config: ActionsConfig,
}

impl HttpActionInvoker {
    /// Creates a new HTTP action invoker with the specified configuration.
    pub fn new(config: ActionsConfig) -> Self {
        let client = ClientBuilder::new(reqwest::Client::new())
            .with(TracingMiddleware::<SpanBackendWithUrl>::new())
            .build();
        Self { client, config }
    }

    fn action_url(&self, endpoint: &str) -> anyhow::Result<Url> {
        let url = format!(
            "{}/{}",
            self.config.base_url.as_str().trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        );
        Url::parse(&url).with_context(|| format!("Cannot parse action URL: {url}."))
    }
}

#[async_trait]
impl ActionInvoker for HttpActionInvoker {
    async fn invoke(&self, action: &TaskAction) -> anyhow::Result<ActionResponse> {
        if ![Method::GET, Method::POST, Method::PUT].contains(&action.method) {
            return Ok(ActionResponse::failure(format!(
                "Unsupported HTTP method: {}",
                action.method
            )));
        }

        let url = self.action_url(&action.endpoint)?;
        debug!("Sending {} request to {url}.", action.method);

        let mut request_builder = self
            .client
            .request(action.method.clone(), url)
            .timeout(action.timeout);
        if let Some(ref token) = self.config.token {
            request_builder = request_builder.header("X-Api-Token", token.as_str());
        }
        if let Some(ref headers) = action.headers {
            request_builder = request_builder.headers(headers.clone());
        }
        if action.method != Method::GET {
            request_builder = request_builder.json(&action.payload);
        }

        let response = match request_builder.send().await {
            Ok(response) => response,
            Err(reqwest_middleware::Error::Reqwest(err)) if err.is_timeout() => {
                let error = format!(
                    "Action request timed out after {}.",
                    humantime::format_duration(action.timeout)
                );
                warn!("{error}");
                return Ok(ActionResponse::failure(error));
            }
            Err(err) => {
                warn!("Action request failed: {err}");
                return Ok(ActionResponse::failure(format!(
                    "Action request failed: {err}"
                )));
            }
        };

        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        let body =
            serde_json::from_str::<serde_json::Value>(&text).unwrap_or_else(|_| json!({ "text": text }));

        if status.is_success() {
            debug!("Action call succeeded: {status}.");
            Ok(ActionResponse {
                success: true,
                payload: json!({ "status_code": status.as_u16(), "response": body }),
            })
        } else {
            warn!("Action call failed: {status}.");
            Ok(ActionResponse {
                success: false,
                payload: json!({
                    "status_code": status.as_u16(),
                    "response": body,
                    "error": format!("HTTP {status}")
                }),
            })
        }
    }
}
