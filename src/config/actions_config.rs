use serde::{Deserialize, Serialize};
use url::Url;

/// Configuration for the HTTP action invoker.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct ActionsConfig {
    /// Base URL task action endpoints are resolved against.
    pub base_url: Url,
    /// Optional token sent with every action request via the `X-Api-Token` header.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl Default for ActionsConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse("http://localhost:8000/")
                .expect("Cannot parse default action base URL."),
            token: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::ActionsConfig;
    use insta::assert_toml_snapshot;
    use url::Url;

    #[test]
    fn serialization_and_default() {
        assert_toml_snapshot!(ActionsConfig::default(), @r###"
        base_url = 'http://localhost:8000/'
        "###);
    }

    #[test]
    fn deserialization() {
        let config: ActionsConfig = toml::from_str(
            r#"
        base_url = 'http://localhost:1234/api'
        token = 'secret'
    "#,
        )
        .unwrap();
        assert_eq!(
            config,
            ActionsConfig {
                base_url: Url::parse("http://localhost:1234/api").unwrap(),
                token: Some("secret".to_string()),
            }
        );
    }
}
