pub mod error;
mod json_file;
pub mod settings;
pub mod vip;

pub use error::{Result, StoreError};
pub use settings::{Preferences, Settings, StoredTokens, APP_NAME};
pub use vip::{JsonVipRegistry, VipEntry, VipRegistry};
