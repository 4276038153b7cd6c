//! Application configuration.

use serde::Deserialize;
use std::path::Path;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Locale used when a user has none, e.g. for translation fallback.
    #[serde(default = "default_locale")]
    pub default_locale: String,
    /// Maximum length of a poll's `details` text.
    #[serde(default = "default_max_message_length")]
    pub max_message_length: usize,
    /// Hours a closing-soon notice stays "recent": no second notice for the
    /// same poll inside this window.
    #[serde(default = "default_closing_soon_recency_hours")]
    pub closing_soon_recency_hours: i64,
    /// Optional path to a poll template file layered over the built-ins.
    #[serde(default)]
    pub poll_templates: Option<String>,
}

fn default_locale() -> String {
    "en".to_string()
}

const fn default_max_message_length() -> usize {
    10_000
}

const fn default_closing_soon_recency_hours() -> i64 {
    48
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_locale: default_locale(),
            max_message_length: default_max_message_length(),
            closing_soon_recency_hours: default_closing_soon_recency_hours(),
            poll_templates: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from files and environment variables.
    ///
    /// Configuration is loaded in the following order:
    /// 1. `config/default.toml`
    /// 2. `config/{environment}.toml` (based on `AGORA_ENV`)
    /// 3. Environment variables with `AGORA_` prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();
        let env = std::env::var("AGORA_ENV").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("AGORA")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        tracing::debug!(environment = %env, "Loaded application configuration");
        config.try_deserialize()
    }

    /// Load configuration from a specific file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(
                config::Environment::with_prefix("AGORA")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
