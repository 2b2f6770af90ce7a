pub mod app;
pub mod cli;
pub mod config;
pub mod help;
pub mod logging;
pub mod terminal;

pub use app::App;
pub use cli::{Cli, Command, VipAction};
pub use config::AppConfig;
