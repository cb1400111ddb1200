use crate::{ConfigError, CoreError};
use config::{Config, Environment, File, FileFormat, Source};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_CONFIG_PATH: &str = "blastari.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub bind_addr: String,
    pub database_url: String,
    pub request_timeout_secs: u64,
    pub openai: OpenAiConfig,
    pub reddit: RedditConfig,
    pub email: EmailConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OpenAiConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub image_model: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RedditConfig {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub user_agent: String,
    pub api_base_url: String,
    pub token_url: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EmailConfig {
    pub api_key: Option<String>,
    pub api_base_url: String,
    pub from: String,
    pub feedback_to: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
            database_url: "sqlite://blastari.db?mode=rwc".to_string(),
            request_timeout_secs: 60,
            openai: OpenAiConfig::default(),
            reddit: RedditConfig::default(),
            email: EmailConfig::default(),
        }
    }
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
            image_model: "dall-e-3".to_string(),
        }
    }
}

impl Default for RedditConfig {
    fn default() -> Self {
        Self {
            client_id: None,
            client_secret: None,
            user_agent: "blastari/0.1 (marketing analytics)".to_string(),
            api_base_url: "https://oauth.reddit.com".to_string(),
            token_url: "https://www.reddit.com/api/v1/access_token".to_string(),
        }
    }
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base_url: "https://api.resend.com".to_string(),
            from: "BLASTari <feedback@blastari.app>".to_string(),
            feedback_to: None,
        }
    }
}

/// Prefix for variables that can set any field, e.g.
/// `BLASTARI__OPENAI__IMAGE_MODEL` or `BLASTARI__REQUEST_TIMEOUT_SECS`.
pub const ENV_PREFIX: &str = "BLASTARI";

/// Conventional variable names accepted alongside the prefixed form. They win
/// over both the file and the prefixed variables.
const ENV_ALIASES: &[(&str, &str)] = &[
    ("BIND_ADDR", "bind_addr"),
    ("DATABASE_URL", "database_url"),
    ("OPENAI_API_KEY", "openai.api_key"),
    ("OPENAI_BASE_URL", "openai.base_url"),
    ("OPENAI_MODEL", "openai.model"),
    ("REDDIT_CLIENT_ID", "reddit.client_id"),
    ("REDDIT_CLIENT_SECRET", "reddit.client_secret"),
    ("REDDIT_USER_AGENT", "reddit.user_agent"),
    ("RESEND_API_KEY", "email.api_key"),
    ("FEEDBACK_EMAIL_TO", "email.feedback_to"),
];

impl AppConfig {
    /// Layers the TOML file at `path` (optional; a malformed one is an error)
    /// under the process environment. Unset fields keep their defaults.
    pub fn load(path: &Path) -> Result<Self, CoreError> {
        if !path.exists() {
            tracing::debug!("No config file at {}, using defaults", path.display());
        }
        let file = File::from(path).format(FileFormat::Toml).required(false);
        // Non-UTF-8 variables cannot name a setting; skip them.
        let vars = std::env::vars_os()
            .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
            .collect();
        Self::from_sources(file, vars)
    }

    /// Builds the config from one file source and an explicit variable map.
    pub fn from_sources<S>(file: S, vars: HashMap<String, String>) -> Result<Self, CoreError>
    where
        S: Source + Send + Sync + 'static,
    {
        let mut builder = Config::builder().add_source(file).add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .source(Some(vars.clone())),
        );
        for (var, key) in ENV_ALIASES {
            builder = builder
                .set_override_option(*key, vars.get(*var).cloned())
                .map_err(ConfigError::Parse)?;
        }

        let config = builder
            .build()
            .and_then(|c| c.try_deserialize::<AppConfig>())
            .map_err(ConfigError::Parse)?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.openai.api_key.as_deref().map_or(true, str::is_empty) {
            return Err(ConfigError::MissingField {
                field: "openai.api_key".to_string(),
            });
        }
        if self.reddit.client_id.as_deref().map_or(true, str::is_empty) {
            return Err(ConfigError::MissingField {
                field: "reddit.client_id".to_string(),
            });
        }
        if self.reddit.client_secret.as_deref().map_or(true, str::is_empty) {
            return Err(ConfigError::MissingField {
                field: "reddit.client_secret".to_string(),
            });
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "request_timeout_secs".to_string(),
                value: "0".to_string(),
            });
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn toml(raw: &str) -> File<config::FileSourceString, FileFormat> {
        File::from_str(raw, FileFormat::Toml)
    }

    #[test]
    fn test_defaults_fail_validation_without_credentials() {
        let config = AppConfig::default();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::MissingField { field } if field == "openai.api_key"));
    }

    #[test]
    fn test_file_then_env_overrides() {
        let raw = r#"
            bind_addr = "127.0.0.1:9000"

            [openai]
            api_key = "from-file"
            model = "gpt-4o"

            [reddit]
            client_id = "id"
            client_secret = "secret"
        "#;
        let config = AppConfig::from_sources(
            toml(raw),
            vars(&[("OPENAI_API_KEY", "from-env"), ("BIND_ADDR", "0.0.0.0:1")]),
        )
        .unwrap();

        assert_eq!(config.openai.model, "gpt-4o");
        assert_eq!(config.openai.base_url, "https://api.openai.com/v1");
        assert_eq!(config.openai.api_key.as_deref(), Some("from-env"));
        assert_eq!(config.bind_addr, "0.0.0.0:1");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_prefixed_env_reaches_every_field() {
        let config = AppConfig::from_sources(
            toml(""),
            vars(&[
                ("BLASTARI__REQUEST_TIMEOUT_SECS", "15"),
                ("BLASTARI__OPENAI__IMAGE_MODEL", "gpt-image-1"),
                ("BLASTARI__REDDIT__API_BASE_URL", "http://localhost:9999"),
                ("BLASTARI__EMAIL__FROM", "ops@example.com"),
            ]),
        )
        .unwrap();

        assert_eq!(config.request_timeout(), Duration::from_secs(15));
        assert_eq!(config.openai.image_model, "gpt-image-1");
        assert_eq!(config.reddit.api_base_url, "http://localhost:9999");
        assert_eq!(config.email.from, "ops@example.com");
        assert_eq!(config.openai.model, "gpt-4o-mini");
    }

    #[test]
    fn test_conventional_name_beats_prefixed_one() {
        let config = AppConfig::from_sources(
            toml(""),
            vars(&[
                ("BLASTARI__OPENAI__API_KEY", "prefixed"),
                ("OPENAI_API_KEY", "conventional"),
            ]),
        )
        .unwrap();
        assert_eq!(config.openai.api_key.as_deref(), Some("conventional"));
    }

    #[test]
    fn test_malformed_toml_is_config_error() {
        let err = AppConfig::from_sources(toml("bind_addr = ["), HashMap::new()).unwrap_err();
        assert!(matches!(err, CoreError::Config(ConfigError::Parse(_))));
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = AppConfig::load(Path::new("/definitely/not/here.toml")).unwrap();
        assert_eq!(config.bind_addr, AppConfig::default().bind_addr);
    }
}
