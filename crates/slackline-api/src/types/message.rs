use serde::{Deserialize, Serialize};

/// A message as returned by `conversations.history`, `conversations.replies`
/// or `search.messages`.
///
/// Slack timestamps are kept in their wire form (`"1712345678.000200"`): they
/// double as message identifiers, so they are never round-tripped through a float.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub ts: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub reply_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thread_ts: Option<String>,
    /// Only present on search matches, which span channels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<ChannelRef>,
}

impl Message {
    pub fn new(ts: impl Into<String>, user: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            ts: ts.into(),
            user: Some(user.into()),
            username: None,
            text: text.into(),
            reply_count: 0,
            thread_ts: None,
            channel: None,
        }
    }

    pub fn with_replies(mut self, reply_count: u32) -> Self {
        self.reply_count = reply_count;
        self
    }

    pub fn in_channel(mut self, id: impl Into<String>, name: impl Into<String>) -> Self {
        self.channel = Some(ChannelRef {
            id: id.into(),
            name: name.into(),
        });
        self
    }

    pub fn timestamp(&self) -> f64 {
        parse_ts(&self.ts)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelRef {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

/// Result of `chat.postMessage`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PostedMessage {
    pub channel: String,
    pub ts: String,
}

/// Seconds since the epoch for a Slack timestamp; malformed values sort as 0.
pub fn parse_ts(ts: &str) -> f64 {
    ts.parse().unwrap_or(0.0)
}
