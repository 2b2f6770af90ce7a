use async_trait::async_trait;

use crate::error::Result;
use crate::types::{ChannelRecord, ConversationTypes, Message, PostedMessage, UserRecord};

/// Channel and user lookups against the remote workspace.
///
/// Single-record lookups return `Ok(None)` when Slack reports the record does
/// not exist; every other rejection is an error.
#[async_trait]
pub trait DirectoryProvider: Send + Sync {
    async fn list_conversations(
        &self,
        types: &ConversationTypes,
        exclude_archived: bool,
        limit: u32,
    ) -> Result<Vec<ChannelRecord>>;

    async fn get_conversation(&self, id: &str) -> Result<Option<ChannelRecord>>;

    async fn list_users(&self) -> Result<Vec<UserRecord>>;

    async fn get_user(&self, id: &str) -> Result<Option<UserRecord>>;
}

/// Message history, threads, search and posting.
#[async_trait]
pub trait MessageProvider: Send + Sync {
    /// Newest first. `before` maps to the `latest` bound of the history call.
    async fn get_history(
        &self,
        channel_id: &str,
        limit: u32,
        before: Option<&str>,
    ) -> Result<Vec<Message>>;

    /// The parent message followed by its replies.
    async fn get_replies(&self, channel_id: &str, thread_ts: &str) -> Result<Vec<Message>>;

    /// Matches carry their channel in [`Message::channel`].
    async fn search(&self, query: &str, count: u32) -> Result<Vec<Message>>;

    async fn post_message(
        &self,
        channel_id: &str,
        text: &str,
        thread_ts: Option<&str>,
    ) -> Result<PostedMessage>;
}
