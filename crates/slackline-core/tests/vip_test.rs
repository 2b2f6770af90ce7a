mod common;

use std::sync::Arc;

use common::{missing_scope, wire, FakeSlack};
use slackline_api::{ChannelRecord, Message, UserRecord};
use slackline_core::VipAggregator;
use slackline_store::{JsonVipRegistry, VipRegistry};

fn registry(dir: &tempfile::TempDir, vips: &[(&str, &str)]) -> Arc<JsonVipRegistry> {
    let registry = JsonVipRegistry::open(dir.path().join("vip_users.json"));
    for (id, name) in vips {
        registry.add(id, name).unwrap();
    }
    Arc::new(registry)
}

#[tokio::test]
async fn test_empty_registry_makes_no_calls() {
    let dir = tempfile::tempdir().unwrap();
    let fake = Arc::new(
        FakeSlack::new()
            .with_channel(ChannelRecord::new("C1", "general").member(true))
            .with_history("C1", vec![Message::new("1.0", "U1", "hi")]),
    );
    let (_, store) = wire(&fake);
    let aggregator = VipAggregator::new(store, registry(&dir, &[]));

    assert!(aggregator.get_vip_messages(50).await.unwrap().is_empty());
    assert!(fake.calls().is_empty());
}

#[tokio::test]
async fn test_merges_newest_first_with_stable_ties() {
    let dir = tempfile::tempdir().unwrap();
    let fake = Arc::new(
        FakeSlack::new()
            .with_channel(ChannelRecord::new("C1", "alpha").member(true))
            .with_channel(ChannelRecord::new("C2", "beta").member(true))
            .with_channel(ChannelRecord::new("C3", "gamma").member(true))
            .with_history("C1", vec![Message::new("100.0", "U1", "old")])
            .with_history(
                "C2",
                vec![
                    Message::new("300.5", "U1", "tie first"),
                    Message::new("200.0", "U2", "not a vip"),
                ],
            )
            .with_history("C3", vec![Message::new("300.5", "U1", "tie second")]),
    );
    let (_, store) = wire(&fake);
    let aggregator = VipAggregator::new(store, registry(&dir, &[("U1", "ada")]));

    let messages = aggregator.get_vip_messages(50).await.unwrap();

    let texts: Vec<&str> = messages.iter().map(|m| m.text.as_str()).collect();
    assert_eq!(texts, vec!["tie first", "tie second", "old"]);
    assert_eq!(messages[0].channel_name.as_deref(), Some("beta"));
    assert_eq!(messages[1].channel_id, "C3");
}

#[tokio::test]
async fn test_only_member_channels_are_read() {
    let dir = tempfile::tempdir().unwrap();
    let fake = Arc::new(
        FakeSlack::new()
            .with_channel(ChannelRecord::new("C1", "joined").member(true))
            .with_channel(ChannelRecord::new("C2", "lurking"))
            .with_history("C1", vec![Message::new("1.0", "U1", "inside")])
            .with_history("C2", vec![Message::new("2.0", "U1", "outside")]),
    );
    let (_, store) = wire(&fake);
    let aggregator = VipAggregator::new(store, registry(&dir, &[("U1", "ada")]));

    let messages = aggregator.get_vip_messages(50).await.unwrap();

    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].text, "inside");
    assert_eq!(fake.call_count("conversations.history"), 1);
}

#[tokio::test]
async fn test_permission_failure_propagates() {
    let dir = tempfile::tempdir().unwrap();
    let fake = Arc::new(FakeSlack::new().failing_list(missing_scope("conversations.list")));
    let (_, store) = wire(&fake);
    let aggregator = VipAggregator::new(store, registry(&dir, &[("U1", "ada")]));

    let err = aggregator.get_vip_messages(50).await.unwrap_err();
    assert!(err.is_permission());
}

#[tokio::test]
async fn test_format_prefixes_channel_column() {
    let dir = tempfile::tempdir().unwrap();
    let fake = Arc::new(
        FakeSlack::new()
            .with_user(UserRecord::new("U1", "ada"))
            .with_channel(ChannelRecord::new("C1", "engineering-announcements").member(true))
            .with_channel(ChannelRecord::new("C2", "ops").member(true))
            .with_history("C1", vec![Message::new("2.0", "U1", "long")])
            .with_history("C2", vec![Message::new("1.0", "U1", "short")]),
    );
    let (_, store) = wire(&fake);
    let aggregator = VipAggregator::new(store, registry(&dir, &[("U1", "ada")]));
    let messages = aggregator.get_vip_messages(50).await.unwrap();

    let long = aggregator.format_vip_message(&messages[0], true).await;
    let short = aggregator.format_vip_message(&messages[1], true).await;
    let full = aggregator.format_vip_message(&messages[1], false).await;

    assert!(long.starts_with("#engineering-ann | ["));
    assert!(short.starts_with("#ops             | ["));
    assert!(full.starts_with("Channel: #ops\n["));
}
