use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Represents the kind of work a task performs.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, Default, Hash, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    /// The task invokes an HTTP action endpoint.
    #[default]
    ApiCall,
}

impl TaskKind {
    /// Returns the wire tag of the task kind.
    pub fn type_tag(&self) -> &'static str {
        match self {
            Self::ApiCall => "api_call",
        }
    }
}
