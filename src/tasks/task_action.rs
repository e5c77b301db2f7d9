use http::{HeaderMap, Method};
use serde::{Deserialize, Serialize};
use serde_with::{DurationSeconds, serde_as};
use std::time::Duration;
use utoipa::ToSchema;

/// Describes the HTTP action a task invokes: an endpoint relative to the configured action base
/// URL, the method and payload to send, and the per-request timeout.
#[serde_as]
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, ToSchema)]
pub struct TaskAction {
    /// The endpoint to call (e.g., `/agent_response`), resolved against the action base URL.
    pub endpoint: String,
    /// The HTTP method to use to send the request with.
    #[serde(with = "http_serde::method", default = "default_method")]
    #[schema(value_type = String)]
    pub method: Method,
    /// Request payload/body.
    pub payload: serde_json::Value,
    /// Optional headers to include in the request.
    #[serde(
        with = "http_serde::option::header_map",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    #[schema(value_type = Object)]
    pub headers: Option<HeaderMap>,
    /// Request timeout.
    #[serde_as(as = "DurationSeconds<u64>")]
    #[serde(rename = "timeout_seconds", default = "default_timeout")]
    #[schema(value_type = u64)]
    pub timeout: Duration,
}

fn default_method() -> Method {
    Method::POST
}

fn default_timeout() -> Duration {
    Duration::from_secs(120)
}

#[cfg(test)]
mod tests {
    use super::TaskAction;
    use http::{HeaderMap, HeaderValue, Method, header};
    use insta::assert_json_snapshot;
    use serde_json::json;
    use std::time::Duration;

    #[test]
    fn serialization() -> anyhow::Result<()> {
        assert_json_snapshot!(TaskAction {
            endpoint: "/agent_response".to_string(),
            method: Method::POST,
            payload: json!({ "message": "check the garden" }),
            headers: None,
            timeout: Duration::from_secs(120),
        }, @r###"
        {
          "endpoint": "/agent_response",
          "method": "POST",
          "payload": {
            "message": "check the garden"
          },
          "timeout_seconds": 120
        }
        "###);

        Ok(())
    }

    #[test]
    fn deserialization_applies_defaults() -> anyhow::Result<()> {
        let action = serde_json::from_str::<TaskAction>(
            r#"{ "endpoint": "/noop", "payload": {} }"#,
        )?;
        assert_eq!(
            action,
            TaskAction {
                endpoint: "/noop".to_string(),
                method: Method::POST,
                payload: json!({}),
                headers: None,
                timeout: Duration::from_secs(120),
            }
        );

        Ok(())
    }

    #[test]
    fn deserialization() -> anyhow::Result<()> {
        let action = serde_json::from_str::<TaskAction>(
            r#"{
                "endpoint": "/agent_response",
                "method": "GET",
                "payload": { "q": 1 },
                "headers": { "content-type": "application/json" },
                "timeout_seconds": 30
            }"#,
        )?;
        assert_eq!(
            action,
            TaskAction {
                endpoint: "/agent_response".to_string(),
                method: Method::GET,
                payload: json!({ "q": 1 }),
                headers: Some(HeaderMap::from_iter([(
                    header::CONTENT_TYPE,
                    HeaderValue::from_static("application/json")
                )])),
                timeout: Duration::from_secs(30),
            }
        );

        Ok(())
    }
}
