//! The slackline engine: name resolution, message access, VIP aggregation and
//! channel recaps, all driven through the provider traits of `slackline-api`.

pub mod directory;
pub mod fuzzy;
pub mod message_id;
pub mod navigation;
pub mod recap;
pub mod store;
pub mod vip;

pub use directory::DirectoryCache;
pub use fuzzy::{match_channels, match_users, render_channel_matches, render_user_matches};
pub use message_id::local_message_id;
pub use navigation::{KeySource, RecapNavigator};
pub use recap::{time_ago, RecapEngine, RecapRecord};
pub use store::{MessageLocation, MessageRecord, MessageStore};
pub use vip::VipAggregator;
