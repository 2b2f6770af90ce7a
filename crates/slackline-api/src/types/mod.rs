pub mod channel;
pub mod conversation_type;
pub mod message;
pub mod user;

pub use channel::ChannelRecord;
pub use conversation_type::{ConversationType, ConversationTypes};
pub use message::{parse_ts, ChannelRef, Message, PostedMessage};
pub use user::UserRecord;
