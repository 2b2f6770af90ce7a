//! Message access on top of the remote message provider.
//!
//! Every record leaving this module carries a local id (see
//! [`crate::message_id`]), and the store remembers which `(channel, ts)` pair
//! each id it handed out refers to, so later commands can accept the short id.
//!
//! Search is advisory: [`MessageStore::search_messages`] degrades to an empty
//! result on any provider failure, while every other call surfaces its error.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Local};
use slackline_api::{Message, MessageProvider, PostedMessage, Result};
use tokio::sync::RwLock;

use crate::directory::DirectoryCache;
use crate::message_id::{local_message_id, UNKNOWN_MESSAGE_ID};

const PREVIEW_WIDTH: usize = 80;

/// A message annotated for display
#[derive(Debug, Clone, PartialEq)]
pub struct MessageRecord {
    pub local_id: String,
    pub channel_id: String,
    /// Known for search matches and aggregated messages
    pub channel_name: Option<String>,
    pub ts: String,
    pub user_id: Option<String>,
    /// Sender name supplied by the provider, if any
    pub username: Option<String>,
    pub text: String,
    pub reply_count: u32,
}

impl MessageRecord {
    pub fn from_message(channel_id: &str, message: Message) -> Self {
        Self {
            local_id: local_message_id(channel_id, &message.ts),
            channel_id: channel_id.to_string(),
            channel_name: message.channel.map(|c| c.name).filter(|name| !name.is_empty()),
            ts: message.ts,
            user_id: message.user,
            username: message.username,
            text: message.text,
            reply_count: message.reply_count,
        }
    }

    pub fn timestamp(&self) -> f64 {
        slackline_api::types::parse_ts(&self.ts)
    }

    pub fn with_channel_name(mut self, name: impl Into<String>) -> Self {
        self.channel_name = Some(name.into());
        self
    }
}

/// Where a local id points
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageLocation {
    pub channel_id: String,
    pub ts: String,
}

pub struct MessageStore {
    provider: Arc<dyn MessageProvider>,
    directory: Arc<DirectoryCache>,
    locations: RwLock<HashMap<String, MessageLocation>>,
}

impl MessageStore {
    pub fn new(provider: Arc<dyn MessageProvider>, directory: Arc<DirectoryCache>) -> Self {
        Self {
            provider,
            directory,
            locations: RwLock::new(HashMap::new()),
        }
    }

    pub fn directory(&self) -> &Arc<DirectoryCache> {
        &self.directory
    }

    /// Recent history, newest first. `before` bounds the page by timestamp.
    pub async fn get_messages(
        &self,
        channel_id: &str,
        limit: u32,
        before: Option<&str>,
    ) -> Result<Vec<MessageRecord>> {
        let messages = self.provider.get_history(channel_id, limit, before).await?;
        Ok(self.annotate(channel_id, messages).await)
    }

    /// The thread parent followed by its replies.
    pub async fn get_thread_replies(&self, channel_id: &str, thread_ts: &str) -> Result<Vec<MessageRecord>> {
        let messages = self.provider.get_replies(channel_id, thread_ts).await?;
        Ok(self.annotate(channel_id, messages).await)
    }

    /// Workspace search. Failures are logged and yield no matches.
    pub async fn search_messages(&self, query: &str, count: u32) -> Vec<MessageRecord> {
        let matches = match self.provider.search(query, count).await {
            Ok(matches) => matches,
            Err(e) => {
                tracing::warn!(query, error = %e, "search failed, returning no matches");
                return Vec::new();
            }
        };

        let mut records = Vec::with_capacity(matches.len());
        let mut locations = self.locations.write().await;
        for message in matches {
            let channel_id = message
                .channel
                .as_ref()
                .map(|c| c.id.clone())
                .unwrap_or_default();

            let mut record = MessageRecord::from_message(&channel_id, message);
            if channel_id.is_empty() {
                record.local_id = UNKNOWN_MESSAGE_ID.to_string();
            } else {
                locations.insert(record.local_id.clone(), location_of(&record));
            }
            records.push(record);
        }
        records
    }

    /// Post `text`, optionally as a thread reply. Not retried.
    pub async fn send_message(
        &self,
        channel_id: &str,
        text: &str,
        thread_ts: Option<&str>,
    ) -> Result<PostedMessage> {
        let posted = self.provider.post_message(channel_id, text, thread_ts).await?;
        tracing::info!(channel = %posted.channel, ts = %posted.ts, "message sent");
        Ok(posted)
    }

    /// Resolve a local id handed out earlier in this session.
    pub async fn locate(&self, local_id: &str) -> Option<MessageLocation> {
        self.locations.read().await.get(local_id).cloned()
    }

    /// Render one message. The sender is named through the directory, falling
    /// back to the raw user id, then to a provider-supplied bot name.
    pub async fn format_message(&self, record: &MessageRecord, compact: bool) -> String {
        let username = match (&record.user_id, &record.username) {
            (Some(user_id), _) => self
                .directory
                .user_name(user_id)
                .await
                .unwrap_or_else(|| user_id.clone()),
            // bot posts carry a name but no user id
            (None, Some(name)) if !name.is_empty() => name.clone(),
            _ => "unknown".to_string(),
        };
        render_message(record, &username, compact)
    }

    async fn annotate(&self, channel_id: &str, messages: Vec<Message>) -> Vec<MessageRecord> {
        let records: Vec<MessageRecord> = messages
            .into_iter()
            .map(|message| MessageRecord::from_message(channel_id, message))
            .collect();

        let mut locations = self.locations.write().await;
        for record in &records {
            locations.insert(record.local_id.clone(), location_of(record));
        }
        records
    }
}

fn location_of(record: &MessageRecord) -> MessageLocation {
    MessageLocation {
        channel_id: record.channel_id.clone(),
        ts: record.ts.clone(),
    }
}

/// `[id] HH:MM:SS user: first line 🧵` when compact, full text plus a reply
/// footer otherwise. Times are shown in the local timezone.
pub fn render_message(record: &MessageRecord, username: &str, compact: bool) -> String {
    let time = clock_time(record.timestamp());

    if compact {
        let first_line: String = record
            .text
            .split('\n')
            .next()
            .unwrap_or_default()
            .chars()
            .take(PREVIEW_WIDTH)
            .collect();
        let marker = if record.reply_count > 0 { " 🧵" } else { "" };
        format!("[{}] {} {}: {}{}", record.local_id, time, username, first_line, marker)
    } else {
        let footer = if record.reply_count > 0 {
            format!("\n  └─ {} replies", record.reply_count)
        } else {
            String::new()
        };
        format!("[{}] {} {}:\n  {}{}", record.local_id, time, username, record.text, footer)
    }
}

fn clock_time(timestamp: f64) -> String {
    let secs = timestamp.trunc() as i64;
    let nanos = (timestamp.fract() * 1e9) as u32;
    DateTime::from_timestamp(secs, nanos)
        .map(|at| at.with_timezone(&Local).format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "--:--:--".to_string())
}
