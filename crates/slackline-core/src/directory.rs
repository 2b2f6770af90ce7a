//! In-memory channel and user directory.
//!
//! Records are indexed twice, by id and by name, and both indexes are written
//! together on every listing. Entries never expire during a run; a channel
//! renamed mid-session stays reachable under its old name until the next
//! listing overwrites the new one.

use std::collections::HashMap;
use std::sync::Arc;

use slackline_api::{
    ChannelRecord, ConversationTypes, DirectoryProvider, Result, UserRecord,
};
use tokio::sync::RwLock;

/// `conversations.list` page size
const LIST_LIMIT: u32 = 1000;

/// A record type the directory can index
trait Indexed: Clone {
    fn id(&self) -> &str;
    fn name(&self) -> &str;
}

impl Indexed for ChannelRecord {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl Indexed for UserRecord {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }
}

struct Index<T> {
    by_id: HashMap<String, T>,
    by_name: HashMap<String, T>,
}

impl<T: Indexed> Index<T> {
    fn new() -> Self {
        Self {
            by_id: HashMap::new(),
            by_name: HashMap::new(),
        }
    }

    fn insert(&mut self, record: T) {
        self.by_name.insert(record.name().to_string(), record.clone());
        self.by_id.insert(record.id().to_string(), record);
    }

    fn id_for_name(&self, name: &str) -> Option<String> {
        self.by_name.get(name).map(|record| record.id().to_string())
    }
}

pub struct DirectoryCache {
    provider: Arc<dyn DirectoryProvider>,
    channels: RwLock<Index<ChannelRecord>>,
    users: RwLock<Index<UserRecord>>,
}

impl DirectoryCache {
    pub fn new(provider: Arc<dyn DirectoryProvider>) -> Self {
        Self {
            provider,
            channels: RwLock::new(Index::new()),
            users: RwLock::new(Index::new()),
        }
    }

    // ============= Channels =============

    /// List non-archived conversations of `types` and refresh the cache.
    ///
    /// Scope failures surface as [`slackline_api::ApiError::Permission`],
    /// never as an empty listing.
    pub async fn list_channels(&self, types: &ConversationTypes) -> Result<Vec<ChannelRecord>> {
        let channels = self
            .provider
            .list_conversations(types, true, LIST_LIMIT)
            .await?;

        let mut index = self.channels.write().await;
        for channel in &channels {
            index.insert(channel.clone());
        }
        tracing::debug!(count = channels.len(), types = %types, "cached channels");

        Ok(channels)
    }

    /// Cached record, else a single `conversations.info` lookup.
    pub async fn get_channel(&self, id: &str) -> Result<Option<ChannelRecord>> {
        if let Some(channel) = self.channels.read().await.by_id.get(id) {
            return Ok(Some(channel.clone()));
        }

        let channel = self.provider.get_conversation(id).await?;
        if let Some(channel) = &channel {
            self.channels.write().await.insert(channel.clone());
        }
        Ok(channel)
    }

    /// Channel id for `#name`, `name` or a raw id.
    ///
    /// Strings shaped like channel ids are returned without a lookup. Otherwise
    /// the cache is consulted, refreshed once with `types`, and consulted again.
    /// Lookup failures resolve to `None`.
    pub async fn resolve_channel(&self, identifier: &str, types: &ConversationTypes) -> Option<String> {
        let name = identifier.trim_start_matches('#');
        if looks_like_id(name, &['C', 'D', 'G']) {
            return Some(name.to_string());
        }

        if let Some(id) = self.channels.read().await.id_for_name(name) {
            return Some(id);
        }

        if let Err(e) = self.list_channels(types).await {
            tracing::warn!(identifier, error = %e, "channel refresh failed during resolution");
            return None;
        }
        self.channels.read().await.id_for_name(name)
    }

    // ============= Users =============

    pub async fn list_users(&self) -> Result<Vec<UserRecord>> {
        let users = self.provider.list_users().await?;

        let mut index = self.users.write().await;
        for user in &users {
            index.insert(user.clone());
        }
        tracing::debug!(count = users.len(), "cached users");

        Ok(users)
    }

    pub async fn get_user(&self, id: &str) -> Result<Option<UserRecord>> {
        if let Some(user) = self.users.read().await.by_id.get(id) {
            return Ok(Some(user.clone()));
        }

        let user = self.provider.get_user(id).await?;
        if let Some(user) = &user {
            self.users.write().await.insert(user.clone());
        }
        Ok(user)
    }

    /// User id for `@name`, `name` or a raw id. See [`DirectoryCache::resolve_channel`].
    pub async fn resolve_user(&self, identifier: &str) -> Option<String> {
        let name = identifier.trim_start_matches('@');
        if looks_like_id(name, &['U', 'W']) {
            return Some(name.to_string());
        }

        if let Some(id) = self.users.read().await.id_for_name(name) {
            return Some(id);
        }

        if let Err(e) = self.list_users().await {
            tracing::warn!(identifier, error = %e, "user refresh failed during resolution");
            return None;
        }
        self.users.read().await.id_for_name(name)
    }

    /// Display name for a user id, `None` when it cannot be looked up.
    pub async fn user_name(&self, id: &str) -> Option<String> {
        match self.get_user(id).await {
            Ok(user) => user.map(|u| u.name),
            Err(e) => {
                tracing::debug!(user_id = id, error = %e, "user lookup failed");
                None
            }
        }
    }
}

/// Slack ids are an uppercase kind prefix followed by uppercase letters and digits.
fn looks_like_id(candidate: &str, prefixes: &[char]) -> bool {
    let mut chars = candidate.chars();
    match chars.next() {
        Some(first) if prefixes.contains(&first) => {
            candidate.len() > 1
                && chars.all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_looks_like_channel_id() {
        let kinds = ['C', 'D', 'G'];
        assert!(looks_like_id("C024BE91L", &kinds));
        assert!(looks_like_id("D0123ABCD", &kinds));
        assert!(looks_like_id("G9", &kinds));
        assert!(!looks_like_id("general", &kinds));
        assert!(!looks_like_id("Customers", &kinds));
        assert!(!looks_like_id("C", &kinds));
        assert!(!looks_like_id("", &kinds));
    }

    #[test]
    fn test_looks_like_user_id() {
        let kinds = ['U', 'W'];
        assert!(looks_like_id("U012AB3CD", &kinds));
        assert!(looks_like_id("W012AB3CD", &kinds));
        assert!(!looks_like_id("ursula", &kinds));
        assert!(!looks_like_id("C012AB3CD", &kinds));
    }

    #[test]
    fn test_index_last_write_wins_on_name() {
        let mut index = Index::new();
        index.insert(ChannelRecord::new("C1", "general"));
        index.insert(ChannelRecord::new("C2", "general"));

        assert_eq!(index.id_for_name("general").as_deref(), Some("C2"));
        assert!(index.by_id.contains_key("C1"));
    }
}
