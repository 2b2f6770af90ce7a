#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use slackline_api::{
    ApiError, ChannelRecord, ConversationTypes, DirectoryProvider, Message, MessageProvider,
    PostedMessage, Result, UserRecord,
};
use slackline_core::{DirectoryCache, MessageStore};

/// In-memory Slack that records every call it serves
#[derive(Default)]
pub struct FakeSlack {
    channels: Vec<ChannelRecord>,
    users: Vec<UserRecord>,
    history: HashMap<String, Vec<Message>>,
    replies: HashMap<String, Vec<Message>>,
    search_results: Vec<Message>,
    list_failure: Mutex<Option<ApiError>>,
    history_failures: HashMap<String, ApiError>,
    lookup_failure: Option<ApiError>,
    user_list_failure: Option<ApiError>,
    replies_failure: Option<ApiError>,
    search_failure: Option<ApiError>,
    calls: Mutex<Vec<String>>,
    posted: Mutex<Vec<(String, String, Option<String>)>>,
}

impl FakeSlack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_channel(mut self, channel: ChannelRecord) -> Self {
        self.channels.push(channel);
        self
    }

    pub fn with_user(mut self, user: UserRecord) -> Self {
        self.users.push(user);
        self
    }

    pub fn with_history(mut self, channel_id: &str, messages: Vec<Message>) -> Self {
        self.history.insert(channel_id.to_string(), messages);
        self
    }

    pub fn with_replies(mut self, thread_ts: &str, messages: Vec<Message>) -> Self {
        self.replies.insert(thread_ts.to_string(), messages);
        self
    }

    pub fn with_search_results(mut self, messages: Vec<Message>) -> Self {
        self.search_results = messages;
        self
    }

    pub fn failing_history(mut self, channel_id: &str, err: ApiError) -> Self {
        self.history_failures.insert(channel_id.to_string(), err);
        self
    }

    /// `conversations.info` and `users.info` both fail with `err`
    pub fn failing_lookups(mut self, err: ApiError) -> Self {
        self.lookup_failure = Some(err);
        self
    }

    pub fn failing_user_list(mut self, err: ApiError) -> Self {
        self.user_list_failure = Some(err);
        self
    }

    pub fn failing_replies(mut self, err: ApiError) -> Self {
        self.replies_failure = Some(err);
        self
    }

    pub fn failing_search(mut self, err: ApiError) -> Self {
        self.search_failure = Some(err);
        self
    }

    pub fn failing_list(self, err: ApiError) -> Self {
        self.set_list_failure(Some(err));
        self
    }

    pub fn set_list_failure(&self, err: Option<ApiError>) {
        *self.list_failure.lock().unwrap() = err;
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self, method: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| *c == method).count()
    }

    pub fn posted(&self) -> Vec<(String, String, Option<String>)> {
        self.posted.lock().unwrap().clone()
    }

    fn record(&self, method: &str) {
        self.calls.lock().unwrap().push(method.to_string());
    }
}

#[async_trait]
impl DirectoryProvider for FakeSlack {
    async fn list_conversations(
        &self,
        _types: &ConversationTypes,
        _exclude_archived: bool,
        _limit: u32,
    ) -> Result<Vec<ChannelRecord>> {
        self.record("conversations.list");
        let failure = self.list_failure.lock().unwrap().clone();
        if let Some(err) = failure {
            return Err(err);
        }
        Ok(self.channels.clone())
    }

    async fn get_conversation(&self, id: &str) -> Result<Option<ChannelRecord>> {
        self.record("conversations.info");
        if let Some(err) = &self.lookup_failure {
            return Err(err.clone());
        }
        Ok(self.channels.iter().find(|c| c.id == id).cloned())
    }

    async fn list_users(&self) -> Result<Vec<UserRecord>> {
        self.record("users.list");
        if let Some(err) = &self.user_list_failure {
            return Err(err.clone());
        }
        Ok(self.users.clone())
    }

    async fn get_user(&self, id: &str) -> Result<Option<UserRecord>> {
        self.record("users.info");
        if let Some(err) = &self.lookup_failure {
            return Err(err.clone());
        }
        Ok(self.users.iter().find(|u| u.id == id).cloned())
    }
}

#[async_trait]
impl MessageProvider for FakeSlack {
    async fn get_history(
        &self,
        channel_id: &str,
        limit: u32,
        _before: Option<&str>,
    ) -> Result<Vec<Message>> {
        self.record("conversations.history");
        if let Some(err) = self.history_failures.get(channel_id) {
            return Err(err.clone());
        }
        Ok(self
            .history
            .get(channel_id)
            .map(|messages| messages.iter().take(limit as usize).cloned().collect())
            .unwrap_or_default())
    }

    async fn get_replies(&self, _channel_id: &str, thread_ts: &str) -> Result<Vec<Message>> {
        self.record("conversations.replies");
        if let Some(err) = &self.replies_failure {
            return Err(err.clone());
        }
        Ok(self.replies.get(thread_ts).cloned().unwrap_or_default())
    }

    async fn search(&self, _query: &str, count: u32) -> Result<Vec<Message>> {
        self.record("search.messages");
        if let Some(err) = &self.search_failure {
            return Err(err.clone());
        }
        Ok(self.search_results.iter().take(count as usize).cloned().collect())
    }

    async fn post_message(
        &self,
        channel_id: &str,
        text: &str,
        thread_ts: Option<&str>,
    ) -> Result<PostedMessage> {
        self.record("chat.postMessage");
        self.posted.lock().unwrap().push((
            channel_id.to_string(),
            text.to_string(),
            thread_ts.map(str::to_string),
        ));
        Ok(PostedMessage {
            channel: channel_id.to_string(),
            ts: "9999999999.000001".to_string(),
        })
    }
}

pub fn missing_scope(method: &str) -> ApiError {
    ApiError::from_slack(
        method,
        "missing_scope",
        Some("groups:read".to_string()),
        Some("channels:read".to_string()),
    )
}

/// Directory and message store wired to the same fake
pub fn wire(fake: &Arc<FakeSlack>) -> (Arc<DirectoryCache>, Arc<MessageStore>) {
    let directory = Arc::new(DirectoryCache::new(fake.clone()));
    let store = Arc::new(MessageStore::new(fake.clone(), directory.clone()));
    (directory, store)
}
