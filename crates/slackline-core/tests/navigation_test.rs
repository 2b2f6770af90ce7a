mod common;

use std::sync::Arc;

use common::{missing_scope, wire, FakeSlack};
use slackline_api::{ChannelRecord, ConversationTypes, Message};
use slackline_core::navigation::{CLEAR_SCREEN, KEY_HINT, NO_ACTIVITY};
use slackline_core::{RecapEngine, RecapNavigator};

fn two_channels() -> Arc<FakeSlack> {
    Arc::new(
        FakeSlack::new()
            .with_channel(ChannelRecord::new("C1", "alpha").member(true))
            .with_channel(ChannelRecord::new("C2", "beta").member(true))
            .with_history("C1", vec![Message::new("200.0", "U1", "a")])
            .with_history("C2", vec![Message::new("100.0", "U1", "b")]),
    )
}

async fn run(engine: &mut RecapEngine, keys: Vec<char>) -> String {
    let mut navigator = RecapNavigator::new(
        engine,
        keys.into_iter(),
        Vec::new(),
        ConversationTypes::default(),
        10,
    );
    navigator.run().await.unwrap();
    String::from_utf8(navigator.into_output()).unwrap()
}

#[tokio::test]
async fn test_navigates_and_exits() {
    let fake = two_channels();
    let (_, store) = wire(&fake);
    let mut engine = RecapEngine::new(store);
    engine
        .generate_recaps(&ConversationTypes::default(), 10)
        .await
        .unwrap();

    let output = run(&mut engine, vec!['E', 'z', 'e', 'q', 'x', 'e']).await;

    let screens: Vec<&str> = output.split(CLEAR_SCREEN).skip(1).collect();
    // initial draw plus e, e, q; 'z' is ignored and 'x' stops before the last 'e'
    assert_eq!(screens.len(), 4);
    assert!(screens[0].contains("#alpha"));
    assert!(screens[1].contains("#beta"));
    assert!(screens[2].contains("#alpha"));
    assert!(screens[3].contains("#beta"));
    assert!(screens.iter().all(|s| s.trim_end().ends_with(KEY_HINT)));
    assert_eq!(engine.position(), Some((1, 2)));
}

#[tokio::test]
async fn test_closed_input_ends_session() {
    let fake = two_channels();
    let (_, store) = wire(&fake);
    let mut engine = RecapEngine::new(store);

    let output = run(&mut engine, Vec::new()).await;

    assert!(output.contains(NO_ACTIVITY));
    assert_eq!(output.matches(CLEAR_SCREEN).count(), 1);
}

#[tokio::test]
async fn test_refresh_failure_is_shown_and_loop_continues() {
    let fake = two_channels();
    let (_, store) = wire(&fake);
    let mut engine = RecapEngine::new(store);
    engine
        .generate_recaps(&ConversationTypes::default(), 10)
        .await
        .unwrap();

    fake.set_list_failure(Some(missing_scope("conversations.list")));
    let output = run(&mut engine, vec!['r', 'e', 'x']).await;

    assert!(output.contains("Error: conversations.list was rejected (missing_scope)"));
    let last_screen = output.rsplit(CLEAR_SCREEN).next().unwrap();
    assert!(last_screen.contains("#beta"));
}

#[tokio::test]
async fn test_refresh_picks_up_new_activity() {
    let fake = two_channels();
    let (_, store) = wire(&fake);
    let mut engine = RecapEngine::new(store);

    let output = run(&mut engine, vec!['r', 'x']).await;

    let screens: Vec<&str> = output.split(CLEAR_SCREEN).skip(1).collect();
    assert!(screens[0].contains(NO_ACTIVITY));
    assert!(screens[1].contains("#alpha"));
    assert!(screens[1].contains("[1/2]"));
}
