use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "slackline",
    version,
    about = "Focused terminal Slack client with VIP filtering and channel recaps"
)]
pub struct Cli {
    /// Slack token (xoxp-*, xoxb-*, xoxe.*). Overrides SLACK_TOKEN and the saved token.
    #[arg(short = 't', long, global = true, value_name = "TOKEN")]
    pub token: Option<String>,

    /// Persist --token after it authenticates successfully
    #[arg(long, global = true, requires = "token")]
    pub save_token: bool,

    /// Settings directory (defaults to the per-user config directory)
    #[arg(long, global = true, value_name = "DIR")]
    pub config_dir: Option<PathBuf>,

    /// Conversation types for channel lookups, e.g. "public_channel,private_channel"
    #[arg(long, global = true, value_name = "LIST")]
    pub types: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Explain token types and how to get one
    AuthHelp,

    /// Post a message to a channel
    Send {
        channel: String,
        text: String,
        /// Reply in a thread (message timestamp or local id)
        #[arg(long, value_name = "TS")]
        thread: Option<String>,
    },

    /// Show recent messages from a channel
    Show {
        channel: String,
        #[arg(short, long)]
        limit: Option<u32>,
    },

    /// Show a thread (message timestamp or local id)
    Thread { channel: String, ts: String },

    /// List the channels you are a member of
    Channels,

    /// Fuzzy-find channels by name
    FindChannel { query: String },

    /// Fuzzy-find users by username or real name
    FindUser { query: String },

    /// Search messages across the workspace
    Search {
        query: String,
        #[arg(short, long, default_value_t = 20)]
        count: u32,
    },

    /// VIP watchlist
    Vip {
        #[command(subcommand)]
        action: Option<VipAction>,
    },

    /// Per-channel activity recap (Q/E to navigate)
    Recap {
        /// Messages fetched per channel
        #[arg(long, default_value_t = 10)]
        per_channel: u32,
        /// Print the most active channel and exit
        #[arg(long)]
        once: bool,
    },

    /// Show or set the default conversation types
    Types { list: Option<String> },

    /// Exchange the saved refresh token for a new access token
    Refresh,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum VipAction {
    /// Recent messages from VIPs (default)
    Show,
    /// List VIP users
    List,
    /// Add a user to the VIP list
    Add { user: String },
    /// Remove a user from the VIP list
    Remove { user: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("slackline").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_global_options_after_subcommand() {
        let cli = parse(&["show", "#general", "-l", "5", "--token", "xoxb-1", "--types", "im"]);
        assert_eq!(
            cli.command,
            Command::Show {
                channel: "#general".to_string(),
                limit: Some(5)
            }
        );
        assert_eq!(cli.token.as_deref(), Some("xoxb-1"));
        assert_eq!(cli.types.as_deref(), Some("im"));
    }

    #[test]
    fn test_send_with_thread() {
        let cli = parse(&["send", "general", "hello there", "--thread", "1.000001"]);
        assert_eq!(
            cli.command,
            Command::Send {
                channel: "general".to_string(),
                text: "hello there".to_string(),
                thread: Some("1.000001".to_string()),
            }
        );
    }

    #[test]
    fn test_vip_defaults_to_show() {
        assert_eq!(parse(&["vip"]).command, Command::Vip { action: None });
        assert_eq!(
            parse(&["vip", "add", "@ada"]).command,
            Command::Vip {
                action: Some(VipAction::Add {
                    user: "@ada".to_string()
                })
            }
        );
    }

    #[test]
    fn test_recap_defaults() {
        assert_eq!(
            parse(&["recap"]).command,
            Command::Recap {
                per_channel: 10,
                once: false
            }
        );
    }

    #[test]
    fn test_save_token_requires_token() {
        assert!(Cli::try_parse_from(["slackline", "--save-token", "channels"]).is_err());
    }
}
