use config::{Config as ConfigLoader, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

/// Effective runtime configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub default_types: String,
    pub compact_mode: bool,
    pub messages_per_page: u32,

    /// Web API base URL override (tests, proxies)
    #[serde(default)]
    pub api_base_url: Option<String>,
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,

    pub log_level: String,
    pub log_format: String,
}

impl AppConfig {
    /// Load configuration for the given settings directory
    ///
    /// Hierarchy (weakest to strongest):
    /// 1. Built-in defaults
    /// 2. `settings.json` in the config directory
    /// 3. `SLACKLINE_*` environment variables (e.g. `SLACKLINE_LOG_LEVEL`)
    pub fn load(config_dir: &Path) -> Result<Self, ConfigError> {
        Self::build(config_dir, None)
    }

    /// Like [`AppConfig::load`], reading variables from `env` instead of the process
    ///
    /// An unreadable `settings.json` is skipped with a warning, the same way
    /// the settings store falls back to defaults.
    pub fn build(config_dir: &Path, env: Option<HashMap<String, String>>) -> Result<Self, ConfigError> {
        let settings_file = config_dir.join("settings.json");

        match Self::layered(Some(&settings_file), env.clone()) {
            Ok(config) => Ok(config),
            Err(e) if settings_file.exists() => {
                tracing::warn!(
                    path = %settings_file.display(),
                    error = %e,
                    "ignoring unreadable settings file"
                );
                Self::layered(None, env)
            }
            Err(e) => Err(e),
        }
    }

    fn layered(settings_file: Option<&Path>, env: Option<HashMap<String, String>>) -> Result<Self, ConfigError> {
        let mut builder = ConfigLoader::builder()
            .set_default("default_types", "public_channel")?
            .set_default("compact_mode", true)?
            .set_default("messages_per_page", 20)?
            .set_default("log_level", "warn")?
            .set_default("log_format", "pretty")?;

        if let Some(path) = settings_file {
            builder = builder.add_source(
                File::from(path)
                    .format(FileFormat::Json)
                    .required(false),
            );
        }

        builder
            .add_source(
                Environment::with_prefix("SLACKLINE")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .source(env),
            )
            .build()?
            .try_deserialize()
    }
}
