/// Placeholder shown for messages whose channel is unknown
pub const UNKNOWN_MESSAGE_ID: &str = "????????";

/// Short, stable id for referring to a message in local output.
///
/// The first four bytes of `md5("<channel>:<ts>")` as lowercase hex. Truncation
/// means distinct messages can collide; ids are never sent to Slack.
pub fn local_message_id(channel_id: &str, ts: &str) -> String {
    let digest: [u8; 16] = md5::compute(format!("{}:{}", channel_id, ts)).into();
    hex::encode(&digest[..4])
}
