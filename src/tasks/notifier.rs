use crate::config::NotificationsConfig;
use anyhow::bail;
use async_trait::async_trait;
use reqwest_middleware::ClientBuilder;
use reqwest_tracing::{SpanBackendWithUrl, TracingMiddleware};
use serde_json::json;
use std::time::Duration;
use tracing::debug;

/// How long a single notification delivery attempt may take.
const NOTIFICATION_TIMEOUT: Duration = Duration::from_secs(30);

/// Delivers best-effort, human-readable notifications about task failures. Failures of the
/// notifier itself are logged by the caller and never replace the original task failure.
#[async_trait]
pub trait Notifier: Send + Sync + 'static {
    async fn notify(&self, text: &str) -> anyhow::Result<()>;
}

/// Default `Notifier` implementation that posts messages to a configured webhook. Without a
/// configured webhook every notification is a no-op.
pub struct WebhookNotifier {
    client: reqwest_middleware::ClientWithMiddleware,
    config: Option<NotificationsConfig>,
}

impl WebhookNotifier {
    /// Creates a new webhook notifier with the specified configuration.
    pub fn new(config: Option<NotificationsConfig>) -> Self {
        let client = ClientBuilder::new(reqwest::Client::new())
            .with(TracingMiddleware::<SpanBackendWithUrl>::new())
            .build();
        Self { client, config }
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn notify(&self, text: &str) -> anyhow::Result<()> {
        let Some(ref config) = self.config else {
            debug!("Notifications webhook is not configured, skipping notification.");
            return Ok(());
        };

        let response = self
            .client
            .post(config.webhook_url.clone())
            .timeout(NOTIFICATION_TIMEOUT)
            .json(&json!({ "message": text }))
            .send()
            .await?;
        if !response.status().is_success() {
            bail!(
                "Notification webhook responded with HTTP {}.",
                response.status()
            );
        }

        Ok(())
    }
}

#[cfg(test)]
pub mod tests {
    use super::{Notifier, WebhookNotifier};
    use crate::config::NotificationsConfig;
    use anyhow::bail;
    use async_trait::async_trait;
    use httpmock::MockServer;
    use serde_json::json;
    use std::sync::Mutex;

    /// Records notifications instead of delivering them; optionally fails every delivery.
    #[derive(Default)]
    pub struct MockNotifier {
        notifications: Mutex<Vec<String>>,
        fail: bool,
    }

    impl MockNotifier {
        pub fn failing() -> Self {
            Self {
                fail: true,
                ..Default::default()
            }
        }

        pub fn notifications(&self) -> Vec<String> {
            self.notifications.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Notifier for MockNotifier {
        async fn notify(&self, text: &str) -> anyhow::Result<()> {
            self.notifications.lock().unwrap().push(text.to_string());
            if self.fail {
                bail!("mock notifier failure");
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn posts_notifications_to_the_configured_webhook() -> anyhow::Result<()> {
        let server = MockServer::start();
        let webhook_mock = server.mock(|when, then| {
            when.method(httpmock::Method::POST)
                .path("/send_message")
                .json_body(json!({ "message": "Task 'ping' failed." }));
            then.status(200);
        });

        let notifier = WebhookNotifier::new(Some(NotificationsConfig {
            webhook_url: format!("{}/send_message", server.base_url()).parse()?,
        }));
        notifier.notify("Task 'ping' failed.").await?;

        webhook_mock.assert();

        Ok(())
    }

    #[tokio::test]
    async fn fails_when_the_webhook_responds_with_an_error() -> anyhow::Result<()> {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(httpmock::Method::POST).path("/send_message");
            then.status(500);
        });

        let notifier = WebhookNotifier::new(Some(NotificationsConfig {
            webhook_url: format!("{}/send_message", server.base_url()).parse()?,
        }));
        assert!(notifier.notify("Task 'ping' failed.").await.is_err());

        Ok(())
    }

    #[tokio::test]
    async fn skips_notifications_without_configured_webhook() -> anyhow::Result<()> {
        let notifier = WebhookNotifier::new(None);
        notifier.notify("Task 'ping' failed.").await?;
        Ok(())
    }
}
