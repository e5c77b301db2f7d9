use serde::Deserialize;
use utoipa::IntoParams;

/// Parameters for filtering the list of tasks.
#[derive(Deserialize, IntoParams, Debug, Default, Clone, PartialEq, Eq)]
pub struct TasksListParams {
    /// Return only enabled tasks.
    #[serde(default)]
    pub only_enabled: bool,
    /// Case-insensitive substring match on the task name.
    #[serde(default)]
    pub name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::TasksListParams;

    #[test]
    fn deserialization() -> anyhow::Result<()> {
        assert_eq!(
            serde_json::from_str::<TasksListParams>(r#"{}"#)?,
            TasksListParams::default()
        );

        assert_eq!(
            serde_json::from_str::<TasksListParams>(
                r#"{ "only_enabled": true, "name": "check" }"#
            )?,
            TasksListParams {
                only_enabled: true,
                name: Some("check".to_string()),
            }
        );

        Ok(())
    }
}
