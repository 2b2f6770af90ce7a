//! Per-channel activity summaries with a wrap-around cursor.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use slackline_api::{ApiError, ChannelRecord, ConversationTypes, Result};

use crate::store::{MessageRecord, MessageStore};

const PREVIEW_COUNT: usize = 5;
const RULE_WIDTH: usize = 60;
const FOOTER_WIDTH: usize = 56;

/// Summary of one channel's most recent messages
#[derive(Debug, Clone, PartialEq)]
pub struct RecapRecord {
    pub channel_id: String,
    pub channel_name: String,
    pub topic: String,
    pub total_messages: usize,
    /// Distinct senders
    pub participant_count: usize,
    /// Messages with at least one reply
    pub thread_count: usize,
    pub latest_timestamp: f64,
    /// Up to five messages, most recent first
    pub preview: Vec<MessageRecord>,
}

impl RecapRecord {
    /// `None` for a channel without messages.
    pub fn summarize(channel: &ChannelRecord, messages: Vec<MessageRecord>) -> Option<Self> {
        let latest_timestamp = messages
            .iter()
            .map(MessageRecord::timestamp)
            .reduce(f64::max)?;

        let participant_count = messages
            .iter()
            .filter_map(|m| m.user_id.as_deref())
            .collect::<HashSet<_>>()
            .len();
        let thread_count = messages.iter().filter(|m| m.reply_count > 0).count();
        let total_messages = messages.len();

        let mut preview = messages;
        preview.truncate(PREVIEW_COUNT);

        Some(Self {
            channel_id: channel.id.clone(),
            channel_name: channel.name.clone(),
            topic: channel.topic.clone(),
            total_messages,
            participant_count,
            thread_count,
            latest_timestamp,
            preview,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cursor {
    Empty,
    At(usize),
}

/// Owns one recap session: the last generated list and a position in it.
pub struct RecapEngine {
    store: Arc<MessageStore>,
    recaps: Vec<RecapRecord>,
    cursor: Cursor,
}

impl RecapEngine {
    pub fn new(store: Arc<MessageStore>) -> Self {
        Self {
            store,
            recaps: Vec::new(),
            cursor: Cursor::Empty,
        }
    }

    /// Rebuild the recap list from member channels of `types`.
    ///
    /// Channels without messages are skipped. A permission failure on any
    /// channel aborts generation; other per-channel failures skip that
    /// channel. On error the previous list and cursor are kept.
    pub async fn generate_recaps(
        &mut self,
        types: &ConversationTypes,
        messages_per_channel: u32,
    ) -> Result<&[RecapRecord]> {
        let channels = self.store.directory().list_channels(types).await?;

        let mut recaps = Vec::new();
        for channel in channels.iter().filter(|c| c.is_member) {
            let messages = match self.store.get_messages(&channel.id, messages_per_channel, None).await {
                Ok(messages) => messages,
                Err(e @ ApiError::Permission { .. }) => return Err(e),
                Err(e) => {
                    tracing::warn!(channel = %channel.name, error = %e, "skipping channel in recap");
                    continue;
                }
            };

            if let Some(recap) = RecapRecord::summarize(channel, messages) {
                recaps.push(recap);
            }
        }

        recaps.sort_by(|a, b| b.latest_timestamp.total_cmp(&a.latest_timestamp));
        self.replace(recaps);
        tracing::debug!(count = self.recaps.len(), "generated recaps");

        Ok(&self.recaps)
    }

    /// Install a recap list and reset the cursor.
    pub fn replace(&mut self, recaps: Vec<RecapRecord>) {
        self.cursor = if recaps.is_empty() { Cursor::Empty } else { Cursor::At(0) };
        self.recaps = recaps;
    }

    pub fn recaps(&self) -> &[RecapRecord] {
        &self.recaps
    }

    pub fn current(&self) -> Option<&RecapRecord> {
        match self.cursor {
            Cursor::Empty => None,
            Cursor::At(index) => self.recaps.get(index),
        }
    }

    /// Advance, wrapping past the end.
    pub fn next(&mut self) -> Option<&RecapRecord> {
        if let Cursor::At(index) = self.cursor {
            self.cursor = Cursor::At((index + 1) % self.recaps.len());
        }
        self.current()
    }

    /// Step back, wrapping past the start.
    pub fn previous(&mut self) -> Option<&RecapRecord> {
        if let Cursor::At(index) = self.cursor {
            let len = self.recaps.len();
            self.cursor = Cursor::At((index + len - 1) % len);
        }
        self.current()
    }

    /// Zero-based index and list length.
    pub fn position(&self) -> Option<(usize, usize)> {
        match self.cursor {
            Cursor::Empty => None,
            Cursor::At(index) => Some((index, self.recaps.len())),
        }
    }

    /// Render a recap card. `detailed` adds the message preview.
    ///
    /// Relative age is computed against the current wall clock.
    pub async fn format_recap(&self, recap: &RecapRecord, detailed: bool) -> String {
        let rule = "=".repeat(RULE_WIDTH);
        let now = Utc::now().timestamp_millis() as f64 / 1000.0;

        let mut lines = vec![
            rule.clone(),
            format!("  #{}", recap.channel_name),
            rule,
            String::new(),
        ];

        if !recap.topic.is_empty() {
            lines.push(format!("  📝 {}", recap.topic));
            lines.push(String::new());
        }

        lines.push("  📊 Activity Summary:".to_string());
        lines.push(format!("     • {} messages", recap.total_messages));
        lines.push(format!("     • {} participants", recap.participant_count));
        lines.push(format!("     • {} threads", recap.thread_count));
        lines.push(format!("     • Last active: {}", time_ago(recap.latest_timestamp, now)));
        lines.push(String::new());

        if detailed {
            lines.push("  💬 Recent Messages:".to_string());
            lines.push(String::new());
            for message in &recap.preview {
                lines.push(format!("     {}", self.store.format_message(message, true).await));
            }
            lines.push(String::new());
        }

        let (index, total) = self.position().unwrap_or((0, 0));
        let divider = format!("  {}", "─".repeat(FOOTER_WIDTH));
        lines.push(divider.clone());
        lines.push(format!(
            "  [Q] Previous   |   [{}/{}]   |   [E] Next",
            index + 1,
            total
        ));
        lines.push(divider);

        lines.join("\n")
    }
}

/// Human-readable age of `timestamp` relative to `now`, both in epoch seconds.
pub fn time_ago(timestamp: f64, now: f64) -> String {
    let diff = now - timestamp;

    let (count, unit) = if diff < 60.0 {
        return "just now".to_string();
    } else if diff < 3600.0 {
        ((diff / 60.0) as u64, "minute")
    } else if diff < 86400.0 {
        ((diff / 3600.0) as u64, "hour")
    } else {
        ((diff / 86400.0) as u64, "day")
    };

    let plural = if count == 1 { "" } else { "s" };
    format!("{} {}{} ago", count, unit, plural)
}
