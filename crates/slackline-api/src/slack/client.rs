// Slack Web API client implementation

use crate::auth::AuthInfo;
use crate::config::ClientConfig;
use crate::error::{ApiError, Result};
use crate::slack::responses::{
    AuthTestResponse, ConversationInfoResponse, ConversationsListResponse, MessagesResponse,
    SearchResponse, UserInfoResponse, UsersListResponse,
};
use crate::traits::{DirectoryProvider, MessageProvider};
use crate::types::{ChannelRecord, ConversationTypes, Message, PostedMessage, UserRecord};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Slack Web API client (HTTP direct, no SDK)
pub struct SlackClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl SlackClient {
    /// Create new client with a bearer token
    pub fn new(token: impl Into<String>) -> Result<Self> {
        Self::from_config(&ClientConfig::new(token))
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", config.token))
                .map_err(|_| ApiError::InvalidArgument("token contains invalid characters".to_string()))?,
        );

        let mut builder = reqwest::Client::builder().default_headers(headers);
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let http_client = builder
            .build()
            .map_err(|e| ApiError::transport("client setup", e))?;

        Ok(Self {
            http_client,
            base_url: config.base_url().to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Verify the token and identify the caller
    pub async fn auth_test(&self) -> Result<AuthInfo> {
        let raw: AuthTestResponse = self.call("auth.test", &[]).await?;
        Ok(AuthInfo {
            user_id: raw.user_id.or(raw.bot_id.clone()),
            team_id: raw.team_id,
            team: raw.team.unwrap_or_else(|| "Unknown Team".to_string()),
            user: raw.user.or(raw.bot_id),
        })
    }

    /// Form-encoded POST to `<base>/<method>`, decoded into `T` once the envelope is `ok`.
    async fn call<T: DeserializeOwned>(&self, method: &str, form: &[(&str, String)]) -> Result<T> {
        tracing::debug!(method, "calling Slack Web API");

        let response = self
            .http_client
            .post(format!("{}/{}", self.base_url, method))
            .form(form)
            .send()
            .await
            .map_err(|e| ApiError::transport(method, e))?;

        let body = read_envelope(method, response).await?;
        decode(method, body)
    }
}

/// Check the HTTP status and the `ok` flag of a Web API reply.
pub(crate) async fn read_envelope(method: &str, response: reqwest::Response) -> Result<Value> {
    let status = response.status();

    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(ApiError::Remote {
            method: method.to_string(),
            code: "ratelimited".to_string(),
        });
    }
    if !status.is_success() {
        tracing::error!(method, status = status.as_u16(), "Slack API request failed");
        return Err(ApiError::Http {
            method: method.to_string(),
            status: status.as_u16(),
        });
    }

    let body: Value = response
        .json()
        .await
        .map_err(|e| ApiError::decode(method, e))?;
    check_envelope(method, body)
}

pub(crate) fn check_envelope(method: &str, body: Value) -> Result<Value> {
    if body.get("ok").and_then(Value::as_bool).unwrap_or(false) {
        return Ok(body);
    }

    let field = |name: &str| body.get(name).and_then(Value::as_str).map(str::to_string);
    let code = field("error").unwrap_or_else(|| "unknown_error".to_string());
    tracing::debug!(method, code = %code, "Slack API returned ok=false");

    Err(ApiError::from_slack(method, code, field("needed"), field("provided")))
}

pub(crate) fn decode<T: DeserializeOwned>(method: &str, body: Value) -> Result<T> {
    serde_json::from_value(body).map_err(|e| ApiError::decode(method, e))
}

fn not_found_as_none<T>(result: Result<T>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.is_not_found() => Ok(None),
        Err(e) => Err(e),
    }
}

// ============================================================================
// TRAIT IMPLEMENTATIONS
// ============================================================================

#[async_trait]
impl DirectoryProvider for SlackClient {
    async fn list_conversations(
        &self,
        types: &ConversationTypes,
        exclude_archived: bool,
        limit: u32,
    ) -> Result<Vec<ChannelRecord>> {
        let raw: ConversationsListResponse = self
            .call(
                "conversations.list",
                &[
                    ("types", types.to_string()),
                    ("exclude_archived", exclude_archived.to_string()),
                    ("limit", limit.to_string()),
                ],
            )
            .await?;

        Ok(raw.channels.into_iter().map(ChannelRecord::from).collect())
    }

    async fn get_conversation(&self, id: &str) -> Result<Option<ChannelRecord>> {
        let result: Result<ConversationInfoResponse> = self
            .call("conversations.info", &[("channel", id.to_string())])
            .await;

        Ok(not_found_as_none(result)?.map(|raw| ChannelRecord::from(raw.channel)))
    }

    async fn list_users(&self) -> Result<Vec<UserRecord>> {
        let raw: UsersListResponse = self.call("users.list", &[]).await?;
        Ok(raw.members.into_iter().map(UserRecord::from).collect())
    }

    async fn get_user(&self, id: &str) -> Result<Option<UserRecord>> {
        let result: Result<UserInfoResponse> =
            self.call("users.info", &[("user", id.to_string())]).await;

        Ok(not_found_as_none(result)?.map(|raw| UserRecord::from(raw.user)))
    }
}

#[async_trait]
impl MessageProvider for SlackClient {
    async fn get_history(
        &self,
        channel_id: &str,
        limit: u32,
        before: Option<&str>,
    ) -> Result<Vec<Message>> {
        let mut form = vec![
            ("channel", channel_id.to_string()),
            ("limit", limit.to_string()),
        ];
        if let Some(latest) = before {
            form.push(("latest", latest.to_string()));
        }

        let raw: MessagesResponse = self.call("conversations.history", &form).await?;
        Ok(raw.messages)
    }

    async fn get_replies(&self, channel_id: &str, thread_ts: &str) -> Result<Vec<Message>> {
        let raw: MessagesResponse = self
            .call(
                "conversations.replies",
                &[
                    ("channel", channel_id.to_string()),
                    ("ts", thread_ts.to_string()),
                ],
            )
            .await?;
        Ok(raw.messages)
    }

    async fn search(&self, query: &str, count: u32) -> Result<Vec<Message>> {
        let raw: SearchResponse = self
            .call(
                "search.messages",
                &[("query", query.to_string()), ("count", count.to_string())],
            )
            .await?;
        Ok(raw.messages.matches)
    }

    async fn post_message(
        &self,
        channel_id: &str,
        text: &str,
        thread_ts: Option<&str>,
    ) -> Result<PostedMessage> {
        let method = "chat.postMessage";
        let mut payload = serde_json::json!({
            "channel": channel_id,
            "text": text,
        });
        if let (Some(thread_ts), Some(obj)) = (thread_ts, payload.as_object_mut()) {
            obj.insert("thread_ts".to_string(), serde_json::json!(thread_ts));
        }

        tracing::debug!(method, channel = channel_id, "calling Slack Web API");
        let response = self
            .http_client
            .post(format!("{}/{}", self.base_url, method))
            .json(&payload)
            .send()
            .await
            .map_err(|e| ApiError::transport(method, e))?;

        let body = read_envelope(method, response).await?;
        decode(method, body)
    }
}
