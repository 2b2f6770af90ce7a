// Wire shapes of the Web API replies this client reads

use serde::Deserialize;

use crate::types::{ChannelRecord, Message, UserRecord};

#[derive(Debug, Deserialize)]
pub(crate) struct ConversationsListResponse {
    #[serde(default)]
    pub channels: Vec<SlackChannel>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ConversationInfoResponse {
    pub channel: SlackChannel,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SlackChannel {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    /// Peer of a direct message; DMs have no name.
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub is_member: bool,
    #[serde(default)]
    pub topic: Option<SlackTopic>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SlackTopic {
    #[serde(default)]
    pub value: String,
}

impl From<SlackChannel> for ChannelRecord {
    fn from(channel: SlackChannel) -> Self {
        let name = channel
            .name
            .filter(|name| !name.is_empty())
            .or(channel.user)
            .unwrap_or_else(|| channel.id.clone());
        ChannelRecord {
            id: channel.id,
            name,
            topic: channel.topic.map(|t| t.value).unwrap_or_default(),
            is_member: channel.is_member,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct UsersListResponse {
    #[serde(default)]
    pub members: Vec<SlackUser>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UserInfoResponse {
    pub user: SlackUser,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SlackUser {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub real_name: Option<String>,
    #[serde(default)]
    pub profile: Option<SlackProfile>,
    #[serde(default)]
    pub deleted: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SlackProfile {
    #[serde(default)]
    pub real_name: Option<String>,
}

impl From<SlackUser> for UserRecord {
    fn from(user: SlackUser) -> Self {
        let real_name = user
            .real_name
            .or_else(|| user.profile.and_then(|p| p.real_name))
            .unwrap_or_default();
        UserRecord {
            id: user.id,
            name: user.name,
            real_name,
            deleted: user.deleted,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct MessagesResponse {
    #[serde(default)]
    pub messages: Vec<Message>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SearchResponse {
    #[serde(default)]
    pub messages: SearchMessages,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct SearchMessages {
    #[serde(default)]
    pub matches: Vec<Message>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AuthTestResponse {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub bot_id: Option<String>,
    #[serde(default)]
    pub team_id: Option<String>,
    #[serde(default)]
    pub team: Option<String>,
    #[serde(default)]
    pub user: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OAuthAccessResponse {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub authed_user: Option<AuthedUser>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AuthedUser {
    #[serde(default)]
    pub access_token: Option<String>,
}
