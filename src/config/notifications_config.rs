use serde::{Deserialize, Serialize};
use url::Url;

/// Configuration for best-effort failure notifications.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct NotificationsConfig {
    /// URL the notification webhook posts failure messages to.
    pub webhook_url: Url,
}
