//! Session start: token classification, `auth.test` and OAuth refresh.
//!
//! Failures here are fatal to the whole session, so they get their own error
//! type whose message already tells the user what to do next.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::slack::client::{decode, read_envelope};
use crate::slack::responses::OAuthAccessResponse;
use crate::slack::SlackClient;

/// `auth.test` codes that mean the token itself is unusable.
const REJECTED_CODES: &[&str] = &["invalid_auth", "not_authed", "token_revoked"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    User,
    Bot,
    AppLevel,
    Enterprise,
    Unknown,
}

impl TokenKind {
    pub fn detect(token: &str) -> Self {
        if token.starts_with("xoxp-") {
            TokenKind::User
        } else if token.starts_with("xoxb-") {
            TokenKind::Bot
        } else if token.starts_with("xapp-") {
            TokenKind::AppLevel
        } else if token.starts_with("xoxe.") {
            TokenKind::Enterprise
        } else {
            TokenKind::Unknown
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TokenKind::User => "User OAuth Token (Web API)",
            TokenKind::Bot => "Bot User OAuth Token (Web API)",
            TokenKind::AppLevel => "App-Level Token (Socket Mode only; NOT Web API)",
            TokenKind::Enterprise => "Enterprise token (often short-lived; Web API may be restricted)",
            TokenKind::Unknown => "Unknown token type",
        }
    }
}

#[derive(Error, Debug)]
pub enum AuthError {
    #[error(
        "No Slack token found.\n\n\
         Provide a token using one of these methods:\n\
         1) CLI:     slackline --token xoxb-...\n\
         2) ENV:     export SLACK_TOKEN=xoxb-...\n\
         3) CONFIG:  saved token in the app config directory (slackline --token ... --save-token)\n\n\
         Recommended token types for this app: xoxb- (bot) or xoxp- (user), with the required scopes."
    )]
    MissingToken,

    #[error(
        "Slack authentication failed: {code}.\n\n\
         Detected token type: {}.\n\
         Get a Web API token (xoxb-/xoxp-) from your Slack app OAuth & Permissions page.",
        .token_kind.label()
    )]
    Rejected { code: String, token_kind: TokenKind },

    #[error("Slack authentication failed: {0}")]
    Failed(String),

    #[error("Token refresh failed: {0}")]
    Refresh(String),
}

/// Identity reported by `auth.test`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthInfo {
    /// User id, or the bot id for bot tokens
    pub user_id: Option<String>,
    pub team_id: Option<String>,
    pub team: String,
    pub user: Option<String>,
}

impl AuthInfo {
    pub fn greeting(&self) -> String {
        format!(
            "Connected to {} as {}",
            self.team,
            self.user.as_deref().unwrap_or("Unknown")
        )
    }
}

/// An authenticated client plus who it authenticated as
pub struct Session {
    pub client: Arc<SlackClient>,
    pub info: AuthInfo,
    pub token_kind: TokenKind,
}

/// Build a client for `config.token` and verify it with `auth.test`.
pub async fn authenticate(config: &ClientConfig) -> Result<Session, AuthError> {
    if config.token.trim().is_empty() {
        return Err(AuthError::MissingToken);
    }

    let token_kind = TokenKind::detect(&config.token);
    let client = SlackClient::from_config(config).map_err(|e| AuthError::Failed(e.to_string()))?;

    match client.auth_test().await {
        Ok(info) => {
            tracing::info!(team = %info.team, kind = ?token_kind, "authenticated with Slack");
            Ok(Session {
                client: Arc::new(client),
                info,
                token_kind,
            })
        }
        Err(e) => match e.code() {
            Some(code) if REJECTED_CODES.contains(&code) => Err(AuthError::Rejected {
                code: code.to_string(),
                token_kind,
            }),
            Some(code) => Err(AuthError::Failed(code.to_string())),
            None => Err(AuthError::Failed(e.to_string())),
        },
    }
}

/// Credentials produced by an OAuth refresh
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenGrant {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: Option<DateTime<Utc>>,
}

/// OAuth application credentials used for `oauth.v2.access`
#[derive(Debug, Clone)]
pub struct OAuthApp {
    pub client_id: String,
    pub client_secret: String,
}

impl OAuthApp {
    /// Read `SLACK_CLIENT_ID` / `SLACK_CLIENT_SECRET`.
    pub fn from_env() -> Result<Self, AuthError> {
        match (
            std::env::var("SLACK_CLIENT_ID"),
            std::env::var("SLACK_CLIENT_SECRET"),
        ) {
            (Ok(client_id), Ok(client_secret)) if !client_id.is_empty() && !client_secret.is_empty() => {
                Ok(Self {
                    client_id,
                    client_secret,
                })
            }
            _ => Err(AuthError::Refresh(
                "SLACK_CLIENT_ID / SLACK_CLIENT_SECRET not set.".to_string(),
            )),
        }
    }
}

/// Exchange a refresh token for a new access token.
///
/// Slack may rotate the refresh token; the previous one is kept when it does not.
pub async fn refresh_access_token(
    base_url: &str,
    app: &OAuthApp,
    refresh_token: &str,
) -> Result<TokenGrant, AuthError> {
    let method = "oauth.v2.access";
    let http_client = reqwest::Client::new();

    let response = http_client
        .post(format!("{}/{}", base_url.trim_end_matches('/'), method))
        .form(&[
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
            ("client_id", app.client_id.as_str()),
            ("client_secret", app.client_secret.as_str()),
        ])
        .send()
        .await
        .map_err(|e| AuthError::Refresh(ApiError::transport(method, e).to_string()))?;

    let body = read_envelope(method, response).await.map_err(refresh_error)?;
    let raw: OAuthAccessResponse = decode(method, body).map_err(refresh_error)?;

    let access_token = raw
        .access_token
        .or_else(|| raw.authed_user.and_then(|u| u.access_token))
        .ok_or_else(|| AuthError::Refresh("Refresh succeeded but no access token returned.".to_string()))?;

    Ok(TokenGrant {
        access_token,
        refresh_token: raw.refresh_token.unwrap_or_else(|| refresh_token.to_string()),
        expires_at: raw
            .expires_in
            .map(|secs| Utc::now() + Duration::seconds(secs)),
    })
}

fn refresh_error(e: ApiError) -> AuthError {
    AuthError::Refresh(e.code().map(str::to_string).unwrap_or_else(|| e.to_string()))
}
