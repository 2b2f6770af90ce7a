//! Application settings persisted as flat JSON documents.
//!
//! Layout of the configuration directory:
//! - `tokens.json`    credentials (owner-only permissions on unix)
//! - `vip_users.json` the VIP watchlist, see [`crate::vip`]
//! - `settings.json`  user preferences
//!
//! Token resolution precedence (strongest first):
//! 1. CLI argument (handled by the caller)
//! 2. `SLACK_TOKEN`, then the legacy `SLACK_TUI_TOKEN` environment variable
//! 3. `tokens.json`: a refreshed `access_token`, then a saved `token`

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use directories::BaseDirs;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Result, StoreError};
use crate::json_file;

pub const APP_NAME: &str = "slack-tui-app";

const TOKEN_FILE: &str = "tokens.json";
const VIP_FILE: &str = "vip_users.json";
const SETTINGS_FILE: &str = "settings.json";

const TOKEN_ENV_VARS: &[&str] = &["SLACK_TOKEN", "SLACK_TUI_TOKEN"];

/// Contents of `tokens.json`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredTokens {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// RFC 3339; kept as text so a malformed value never hides the token itself
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
}

/// Contents of `settings.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    pub compact_mode: bool,
    pub messages_per_page: usize,
    pub default_types: String,
    /// Keys owned by other readers of the file, preserved on save
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            compact_mode: true,
            messages_per_page: 20,
            default_types: "public_channel".to_string(),
            extra: Map::new(),
        }
    }
}

pub struct Settings {
    config_dir: PathBuf,
    tokens: StoredTokens,
    preferences: Preferences,
}

impl Settings {
    /// Open the per-user configuration directory, migrating files from the
    /// legacy `~/.config/slack-tui-app` location when needed.
    pub fn open_default() -> Result<Self> {
        let dirs = BaseDirs::new().ok_or(StoreError::NoConfigDir)?;
        let config_dir = dirs.config_dir().join(APP_NAME);
        let legacy_dir = dirs.home_dir().join(".config").join(APP_NAME);

        fs::create_dir_all(&config_dir).map_err(|e| StoreError::io(&config_dir, e))?;
        if legacy_dir != config_dir {
            migrate_legacy(&legacy_dir, &config_dir);
        }

        Self::open(config_dir)
    }

    /// Open (and create if needed) an explicit configuration directory.
    pub fn open(config_dir: impl Into<PathBuf>) -> Result<Self> {
        let config_dir = config_dir.into();
        fs::create_dir_all(&config_dir).map_err(|e| StoreError::io(&config_dir, e))?;

        let mut settings = Self {
            config_dir,
            tokens: StoredTokens::default(),
            preferences: Preferences::default(),
        };
        settings.reload();
        Ok(settings)
    }

    /// Re-read every document from disk.
    pub fn reload(&mut self) {
        self.tokens = json_file::load_or(&self.token_path(), StoredTokens::default());
        self.preferences = json_file::load_or(&self.settings_path(), Preferences::default());
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn token_path(&self) -> PathBuf {
        self.config_dir.join(TOKEN_FILE)
    }

    pub fn vip_path(&self) -> PathBuf {
        self.config_dir.join(VIP_FILE)
    }

    pub fn settings_path(&self) -> PathBuf {
        self.config_dir.join(SETTINGS_FILE)
    }

    // ============= Tokens =============

    /// Token from the process environment, else from `tokens.json`.
    pub fn token(&self) -> Option<String> {
        self.token_with_env(|name| std::env::var(name).ok())
    }

    /// [`Settings::token`] with an injectable environment lookup.
    pub fn token_with_env(&self, env: impl Fn(&str) -> Option<String>) -> Option<String> {
        TOKEN_ENV_VARS
            .iter()
            .filter_map(|name| env(name))
            .find(|value| !value.is_empty())
            .or_else(|| self.stored_token().map(str::to_string))
    }

    pub fn stored_token(&self) -> Option<&str> {
        self.tokens
            .access_token
            .as_deref()
            .or(self.tokens.token.as_deref())
    }

    pub fn tokens(&self) -> &StoredTokens {
        &self.tokens
    }

    /// Persist a user-supplied token, replacing any OAuth grant.
    pub fn save_token(&mut self, token: impl Into<String>) -> Result<()> {
        let tokens = StoredTokens {
            token: Some(token.into()),
            ..StoredTokens::default()
        };
        self.write_tokens(tokens)
    }

    /// Persist the result of an OAuth refresh.
    pub fn save_grant(
        &mut self,
        access_token: impl Into<String>,
        refresh_token: impl Into<String>,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<()> {
        let tokens = StoredTokens {
            access_token: Some(access_token.into()),
            refresh_token: Some(refresh_token.into()),
            expires_at: expires_at.map(|at| at.to_rfc3339()),
            token_type: Some("enterprise_oauth".to_string()),
            ..self.tokens.clone()
        };
        self.write_tokens(tokens)
    }

    pub fn refresh_token(&self) -> Option<&str> {
        self.tokens.refresh_token.as_deref()
    }

    pub fn token_expired(&self) -> bool {
        self.token_expired_at(Utc::now())
    }

    /// An unparsable or absent expiry counts as not expired.
    pub fn token_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.tokens
            .expires_at
            .as_deref()
            .and_then(|at| DateTime::parse_from_rfc3339(at).ok())
            .map(|at| now >= at.with_timezone(&Utc))
            .unwrap_or(false)
    }

    /// Write `tokens` and adopt them once they are on disk.
    fn write_tokens(&mut self, tokens: StoredTokens) -> Result<()> {
        let path = self.token_path();
        json_file::save(&path, &tokens)?;
        json_file::restrict_permissions(&path);
        self.tokens = tokens;
        Ok(())
    }

    // ============= Preferences =============

    pub fn preferences(&self) -> &Preferences {
        &self.preferences
    }

    pub fn default_types(&self) -> &str {
        &self.preferences.default_types
    }

    pub fn set_default_types(&mut self, types: impl Into<String>) -> Result<()> {
        let preferences = Preferences {
            default_types: types.into(),
            ..self.preferences.clone()
        };
        json_file::save(&self.settings_path(), &preferences)?;
        self.preferences = preferences;
        Ok(())
    }
}

/// Copy files that exist in `legacy_dir` but not yet in `config_dir`. Best effort.
fn migrate_legacy(legacy_dir: &Path, config_dir: &Path) {
    if !legacy_dir.is_dir() {
        return;
    }

    for name in [TOKEN_FILE, VIP_FILE, SETTINGS_FILE] {
        let src = legacy_dir.join(name);
        let dst = config_dir.join(name);
        if src.exists() && !dst.exists() {
            match fs::copy(&src, &dst) {
                Ok(_) => tracing::info!(file = name, "migrated legacy configuration file"),
                Err(e) => tracing::warn!(file = name, error = %e, "could not migrate legacy file"),
            }
        }
    }
}
