//! Command handlers for the `slackline` binary.

use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use slackline_api::auth::{refresh_access_token, OAuthApp, TokenGrant};
use slackline_api::config::SLACK_API_BASE;
use slackline_api::{authenticate, ClientConfig, ConversationTypes, TokenKind};
use slackline_core::{
    match_channels, match_users, render_channel_matches, render_user_matches, DirectoryCache,
    MessageStore, RecapEngine, RecapNavigator, VipAggregator,
};
use slackline_store::{JsonVipRegistry, Settings, VipRegistry};

use crate::cli::{Command, VipAction};
use crate::config::AppConfig;
use crate::help::AUTH_HELP;
use crate::terminal::{self, RawWriter, TerminalKeys};

const RULE_WIDTH: usize = 60;
const VIP_MESSAGES_PER_CHANNEL: u32 = 50;
const VIP_DISPLAY_LIMIT: usize = 20;
/// History scanned when a thread is referenced by local id
const LOCAL_ID_SCAN: u32 = 200;

/// Connected services for one command
struct Services {
    directory: Arc<DirectoryCache>,
    store: Arc<MessageStore>,
    token_kind: TokenKind,
}

pub struct App<W> {
    settings: Settings,
    config: AppConfig,
    token: Option<String>,
    save_token: bool,
    types: Option<String>,
    out: W,
}

impl<W: Write> App<W> {
    pub fn new(settings: Settings, config: AppConfig, out: W) -> Self {
        Self {
            settings,
            config,
            token: None,
            save_token: false,
            types: None,
            out,
        }
    }

    /// Token given on the command line, optionally persisted after it authenticates.
    pub fn with_token(mut self, token: Option<String>, save_token: bool) -> Self {
        self.token = token;
        self.save_token = save_token;
        self
    }

    /// Conversation types for this invocation, overriding the configured
    /// default. `vip` otherwise scans public and private channels.
    pub fn with_types(mut self, types: Option<String>) -> Self {
        self.types = types;
        self
    }

    pub fn into_output(self) -> W {
        self.out
    }

    pub async fn run(&mut self, command: Command) -> Result<()> {
        tracing::debug!(?command, "running command");

        match command {
            Command::AuthHelp => {
                writeln!(self.out, "{}", AUTH_HELP)?;
                Ok(())
            }
            Command::Send {
                channel,
                text,
                thread,
            } => self.send(&channel, &text, thread.as_deref()).await,
            Command::Show { channel, limit } => {
                let limit = limit.unwrap_or(self.config.messages_per_page);
                self.show(&channel, limit).await
            }
            Command::Thread { channel, ts } => self.thread(&channel, &ts).await,
            Command::Channels => self.channels().await,
            Command::FindChannel { query } => self.find_channel(&query).await,
            Command::FindUser { query } => self.find_user(&query).await,
            Command::Search { query, count } => self.search(&query, count).await,
            Command::Vip { action } => match action.unwrap_or(VipAction::Show) {
                VipAction::Show => self.vip_show().await,
                VipAction::List => self.vip_list(),
                VipAction::Add { user } => self.vip_add(&user).await,
                VipAction::Remove { user } => self.vip_remove(&user),
            },
            Command::Recap { per_channel, once } => self.recap(per_channel, once).await,
            Command::Types { list } => self.set_types(list.as_deref()),
            Command::Refresh => {
                let grant = self.refresh_saved_token().await?;
                match grant.expires_at {
                    Some(at) => writeln!(self.out, "✓ Token refreshed (expires {})", at.to_rfc3339())?,
                    None => writeln!(self.out, "✓ Token refreshed")?,
                }
                Ok(())
            }
        }
    }

    // ============= Session =============

    fn conversation_types(&self) -> Result<ConversationTypes> {
        let raw = self.types.as_deref().unwrap_or(&self.config.default_types);
        Ok(ConversationTypes::parse(raw)?)
    }

    fn base_url(&self) -> &str {
        self.config.api_base_url.as_deref().unwrap_or(SLACK_API_BASE)
    }

    async fn connect(&mut self) -> Result<Services> {
        let token = self.resolve_token().await.unwrap_or_default();

        let mut client_config = ClientConfig::new(token).with_base_url(self.base_url());
        if let Some(secs) = self.config.request_timeout_secs {
            client_config = client_config.with_timeout(Duration::from_secs(secs));
        }

        let session = authenticate(&client_config).await?;
        writeln!(self.out, "✓ {}", session.info.greeting())?;

        if self.save_token {
            if let Some(token) = self.token.clone() {
                self.settings.save_token(token)?;
                writeln!(self.out, "✓ Token saved to {}", self.settings.token_path().display())?;
            }
        }

        let directory = Arc::new(DirectoryCache::new(session.client.clone()));
        let store = Arc::new(MessageStore::new(session.client.clone(), directory.clone()));
        Ok(Services {
            directory,
            store,
            token_kind: session.token_kind,
        })
    }

    /// Command-line token, else environment or saved token. An expired saved
    /// token is refreshed first when a refresh token is available.
    async fn resolve_token(&mut self) -> Option<String> {
        if let Some(token) = &self.token {
            return Some(token.clone());
        }

        let token = self.settings.token();
        let from_file = token.is_some() && token.as_deref() == self.settings.stored_token();
        if from_file && self.settings.token_expired() && self.settings.refresh_token().is_some() {
            match self.refresh_saved_token().await {
                Ok(grant) => return Some(grant.access_token),
                Err(e) => tracing::warn!(error = %e, "automatic token refresh failed"),
            }
        }
        token
    }

    async fn refresh_saved_token(&mut self) -> Result<TokenGrant> {
        let refresh_token = self
            .settings
            .refresh_token()
            .map(str::to_string)
            .ok_or_else(|| anyhow!("No refresh token saved; nothing to refresh."))?;
        let app = OAuthApp::from_env()?;

        let grant = refresh_access_token(self.base_url(), &app, &refresh_token).await?;
        self.settings.save_grant(
            grant.access_token.clone(),
            grant.refresh_token.clone(),
            grant.expires_at,
        )?;
        tracing::info!("access token refreshed");
        Ok(grant)
    }

    // ============= Messages =============

    async fn resolve_channel(&self, services: &Services, channel: &str) -> Result<String> {
        let types = self.conversation_types()?;
        services
            .directory
            .resolve_channel(channel, &types)
            .await
            .ok_or_else(|| anyhow!("Channel not found: {}", channel))
    }

    /// A Slack timestamp, or a local id shown in earlier output for this channel.
    async fn resolve_thread(&self, services: &Services, channel_id: &str, reference: &str) -> Result<String> {
        if reference.contains('.') {
            return Ok(reference.to_string());
        }

        if services.store.locate(reference).await.is_none() {
            services
                .store
                .get_messages(channel_id, LOCAL_ID_SCAN, None)
                .await?;
        }
        services
            .store
            .locate(reference)
            .await
            .filter(|location| location.channel_id == channel_id)
            .map(|location| location.ts)
            .ok_or_else(|| anyhow!("Message not found: {}", reference))
    }

    async fn send(&mut self, channel: &str, text: &str, thread: Option<&str>) -> Result<()> {
        let services = self.connect().await?;
        let channel_id = self.resolve_channel(&services, channel).await?;
        let thread_ts = match thread {
            Some(reference) => Some(self.resolve_thread(&services, &channel_id, reference).await?),
            None => None,
        };

        services
            .store
            .send_message(&channel_id, text, thread_ts.as_deref())
            .await
            .context("Failed to send message")?;
        writeln!(self.out, "✓ Message sent to {}", channel)?;
        Ok(())
    }

    async fn show(&mut self, channel: &str, limit: u32) -> Result<()> {
        let services = self.connect().await?;
        let channel_id = self.resolve_channel(&services, channel).await?;
        let messages = services.store.get_messages(&channel_id, limit, None).await?;

        self.header(&format!("Messages from {}", channel))?;
        for message in messages.iter().rev() {
            let line = services
                .store
                .format_message(message, self.config.compact_mode)
                .await;
            writeln!(self.out, "{}", line)?;
        }
        Ok(())
    }

    async fn thread(&mut self, channel: &str, reference: &str) -> Result<()> {
        let services = self.connect().await?;
        let channel_id = self.resolve_channel(&services, channel).await?;
        let thread_ts = self.resolve_thread(&services, &channel_id, reference).await?;
        let replies = services
            .store
            .get_thread_replies(&channel_id, &thread_ts)
            .await?;

        self.header(&format!("Thread {} in {}", thread_ts, channel))?;
        for message in &replies {
            let text = services.store.format_message(message, false).await;
            writeln!(self.out, "{}\n", text)?;
        }
        Ok(())
    }

    async fn search(&mut self, query: &str, count: u32) -> Result<()> {
        let services = self.connect().await?;
        let results = services.store.search_messages(query, count).await;

        self.header(&format!("Search results for: {}", query))?;
        if results.is_empty() {
            writeln!(self.out, "No messages found.")?;
            if services.token_kind == TokenKind::Bot {
                writeln!(self.out, "Note: search.messages needs a user token (xoxp-*); bot tokens cannot search.")?;
            }
            return Ok(());
        }

        for message in &results {
            let line = services.store.format_message(message, true).await;
            let channel = message.channel_name.as_deref().unwrap_or("unknown");
            writeln!(self.out, "#{} | {}", channel, line)?;
        }
        Ok(())
    }

    // ============= Directory =============

    async fn channels(&mut self) -> Result<()> {
        let services = self.connect().await?;
        let types = self.conversation_types()?;
        let channels = services.directory.list_channels(&types).await?;
        let joined: Vec<_> = channels.iter().filter(|c| c.is_member).collect();

        self.header(&format!("Your Channels ({})", joined.len()))?;
        for channel in joined {
            let topic: String = if channel.topic.trim().is_empty() {
                "No topic".to_string()
            } else {
                channel.topic.chars().take(50).collect()
            };
            writeln!(self.out, "#{:<20} - {}", channel.name, topic)?;
        }
        Ok(())
    }

    async fn find_channel(&mut self, query: &str) -> Result<()> {
        let services = self.connect().await?;
        let types = self.conversation_types()?;
        let channels = services.directory.list_channels(&types).await?;

        let matches = match_channels(query, &channels);
        writeln!(self.out, "{}", render_channel_matches(&matches))?;
        Ok(())
    }

    async fn find_user(&mut self, query: &str) -> Result<()> {
        let services = self.connect().await?;
        let users = services.directory.list_users().await?;

        let matches = match_users(query, &users);
        writeln!(self.out, "{}", render_user_matches(&matches))?;
        Ok(())
    }

    // ============= VIP =============

    fn vip_registry(&self) -> JsonVipRegistry {
        JsonVipRegistry::open(self.settings.vip_path())
    }

    async fn vip_show(&mut self) -> Result<()> {
        let services = self.connect().await?;
        let registry = Arc::new(self.vip_registry());
        let mut aggregator = VipAggregator::new(services.store.clone(), registry.clone());
        if let Some(types) = &self.types {
            aggregator = aggregator.with_types(ConversationTypes::parse(types)?);
        }

        let messages = aggregator
            .get_vip_messages(VIP_MESSAGES_PER_CHANNEL)
            .await?;

        self.header(&format!("VIP Messages ({})", messages.len()))?;
        if messages.is_empty() {
            if registry.list().is_empty() {
                writeln!(self.out, "No VIP users configured.")?;
                writeln!(self.out, "\nAdd VIP users with: slackline vip add @username")?;
            } else {
                writeln!(self.out, "No recent VIP messages found.")?;
            }
            return Ok(());
        }

        for message in messages.iter().take(VIP_DISPLAY_LIMIT) {
            let line = aggregator
                .format_vip_message(message, self.config.compact_mode)
                .await;
            writeln!(self.out, "{}", line)?;
        }
        Ok(())
    }

    fn vip_list(&mut self) -> Result<()> {
        let entries = self.vip_registry().list();
        if entries.is_empty() {
            writeln!(self.out, "No VIP users configured.")?;
            return Ok(());
        }

        self.header(&format!("VIP Users ({})", entries.len()))?;
        for entry in entries {
            writeln!(self.out, "  @{} ({})", entry.username, entry.id)?;
        }
        Ok(())
    }

    async fn vip_add(&mut self, user: &str) -> Result<()> {
        let services = self.connect().await?;
        let not_found = || anyhow!("User not found: {}", user.trim_start_matches('@'));

        let user_id = services.directory.resolve_user(user).await.ok_or_else(not_found)?;
        let record = services
            .directory
            .get_user(&user_id)
            .await?
            .ok_or_else(not_found)?;

        if self.vip_registry().add(&record.id, &record.name)? {
            writeln!(self.out, "✓ Added @{} to VIP list", record.name)?;
        } else {
            writeln!(self.out, "@{} is already in the VIP list", record.name)?;
        }
        Ok(())
    }

    fn vip_remove(&mut self, user: &str) -> Result<()> {
        let registry = self.vip_registry();
        let name = user.trim_start_matches('@');

        let entry = registry
            .find_by_username(name)
            .or_else(|| registry.list().into_iter().find(|e| e.id == name))
            .ok_or_else(|| anyhow!("User not in VIP list: {}", name))?;

        registry.remove(&entry.id)?;
        writeln!(self.out, "✓ Removed @{} from VIP list", entry.username)?;
        Ok(())
    }

    // ============= Recap =============

    async fn recap(&mut self, per_channel: u32, once: bool) -> Result<()> {
        let services = self.connect().await?;
        let types = self.conversation_types()?;
        let mut engine = RecapEngine::new(services.store.clone());

        writeln!(self.out, "Generating recaps...")?;
        engine.generate_recaps(&types, per_channel).await?;

        let Some(current) = engine.current() else {
            writeln!(self.out, "No channel activity to recap.")?;
            return Ok(());
        };

        if once || !terminal::stdin_is_tty() {
            let card = engine.format_recap(current, true).await;
            writeln!(self.out, "{}", card)?;
            return Ok(());
        }

        self.out.flush()?;
        {
            let keys = TerminalKeys::open()?;
            let mut navigator = RecapNavigator::new(
                &mut engine,
                keys,
                RawWriter::new(io::stdout()),
                types,
                per_channel,
            );
            navigator.run().await?;
        }
        writeln!(self.out, "\n\nExited recap mode.")?;
        Ok(())
    }

    // ============= Settings =============

    fn set_types(&mut self, list: Option<&str>) -> Result<()> {
        match list {
            None => {
                writeln!(
                    self.out,
                    "Default conversation types: {}",
                    self.settings.default_types()
                )?;
            }
            Some(list) => {
                let types = ConversationTypes::parse(list)?;
                self.settings.set_default_types(types.to_string())?;
                writeln!(self.out, "✓ Default conversation types set to {}", types)?;
            }
        }
        Ok(())
    }

    fn header(&mut self, title: &str) -> io::Result<()> {
        let rule = "=".repeat(RULE_WIDTH);
        writeln!(self.out, "\n{}\n  {}\n{}\n", rule, title, rule)
    }
}
