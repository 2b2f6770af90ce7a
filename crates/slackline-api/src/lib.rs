pub mod auth;
pub mod config;
pub mod error;
pub mod slack;
pub mod traits;
pub mod types;

pub use traits::{DirectoryProvider, MessageProvider};

pub use auth::{authenticate, AuthError, AuthInfo, Session, TokenKind};
pub use config::ClientConfig;
pub use error::{ApiError, Result};
pub use slack::SlackClient;
pub use types::{
    ChannelRecord, ChannelRef, ConversationType, ConversationTypes, Message, PostedMessage,
    UserRecord,
};
