//! Messages from watched users across every joined channel.
//!
//! Slack has no cross-channel chronological feed, so the aggregator walks the
//! member channels one at a time, keeps messages sent by VIPs and merges them
//! by timestamp.

use std::collections::HashSet;
use std::sync::Arc;

use slackline_api::{ConversationTypes, Result};
use slackline_store::VipRegistry;

use crate::store::{MessageRecord, MessageStore};

const CHANNEL_COLUMN: usize = 15;

pub struct VipAggregator {
    store: Arc<MessageStore>,
    registry: Arc<dyn VipRegistry>,
    types: ConversationTypes,
}

impl VipAggregator {
    pub fn new(store: Arc<MessageStore>, registry: Arc<dyn VipRegistry>) -> Self {
        Self {
            store,
            registry,
            types: ConversationTypes::channels(),
        }
    }

    /// Conversation kinds to scan. Public and private channels by default.
    pub fn with_types(mut self, types: ConversationTypes) -> Self {
        self.types = types;
        self
    }

    /// VIP messages from member channels, newest first.
    ///
    /// An empty registry returns immediately without touching the network.
    /// Messages with equal timestamps keep the order they were fetched in.
    pub async fn get_vip_messages(&self, limit_per_channel: u32) -> Result<Vec<MessageRecord>> {
        let vip_ids: HashSet<String> = self
            .registry
            .list()
            .into_iter()
            .map(|entry| entry.id)
            .collect();
        if vip_ids.is_empty() {
            return Ok(Vec::new());
        }

        let channels = self.store.directory().list_channels(&self.types).await?;

        let mut collected = Vec::new();
        for channel in channels.iter().filter(|c| c.is_member) {
            let messages = self
                .store
                .get_messages(&channel.id, limit_per_channel, None)
                .await?;

            collected.extend(
                messages
                    .into_iter()
                    .filter(|m| m.user_id.as_ref().is_some_and(|id| vip_ids.contains(id)))
                    .map(|m| m.with_channel_name(channel.name.clone())),
            );
        }

        sort_newest_first(&mut collected);
        tracing::debug!(count = collected.len(), vips = vip_ids.len(), "aggregated VIP messages");
        Ok(collected)
    }

    /// Standard message format prefixed with its channel.
    pub async fn format_vip_message(&self, record: &MessageRecord, compact: bool) -> String {
        let base = self.store.format_message(record, compact).await;
        let channel = record.channel_name.as_deref().unwrap_or("unknown");

        if compact {
            format!("#{:<width$.width$} | {}", channel, base, width = CHANNEL_COLUMN)
        } else {
            format!("Channel: #{}\n{}", channel, base)
        }
    }
}

/// Stable sort by timestamp, descending.
pub(crate) fn sort_newest_first(records: &mut [MessageRecord]) {
    records.sort_by(|a, b| b.timestamp().total_cmp(&a.timestamp()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use slackline_api::Message;

    fn record(channel: &str, ts: &str) -> MessageRecord {
        MessageRecord::from_message(channel, Message::new(ts, "U1", "hi"))
    }

    #[test]
    fn test_sort_is_descending_and_stable() {
        let mut records = vec![
            record("C1", "100.0"),
            record("C2", "300.5"),
            record("C3", "300.5"),
        ];
        sort_newest_first(&mut records);

        let order: Vec<&str> = records.iter().map(|r| r.channel_id.as_str()).collect();
        assert_eq!(order, vec!["C2", "C3", "C1"]);
    }
}
