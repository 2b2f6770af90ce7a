//! Keyboard-driven browsing of a [`RecapEngine`].
//!
//! Keys come from an injectable [`KeySource`] so the loop runs the same way
//! against a terminal or a scripted sequence.

use std::io::{self, Write};

use slackline_api::ConversationTypes;

use crate::recap::RecapEngine;

pub const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";
pub const KEY_HINT: &str = "[Q] Previous | [E] Next | [R] Refresh | [X] Exit";
pub const NO_ACTIVITY: &str = "No channel activity to recap.";

/// One key press per call. `Ok(None)` means input was closed or cancelled.
pub trait KeySource {
    fn next_key(&mut self) -> io::Result<Option<char>>;
}

/// Replays a fixed key sequence, then reports closed input.
impl KeySource for std::vec::IntoIter<char> {
    fn next_key(&mut self) -> io::Result<Option<char>> {
        Ok(self.next())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Previous,
    Next,
    Refresh,
    Exit,
}

impl Action {
    fn from_key(key: char) -> Option<Self> {
        match key.to_ascii_lowercase() {
            'q' => Some(Action::Previous),
            'e' => Some(Action::Next),
            'r' => Some(Action::Refresh),
            'x' => Some(Action::Exit),
            _ => None,
        }
    }
}

pub struct RecapNavigator<'a, K, W> {
    engine: &'a mut RecapEngine,
    keys: K,
    out: W,
    types: ConversationTypes,
    messages_per_channel: u32,
}

impl<'a, K: KeySource, W: Write> RecapNavigator<'a, K, W> {
    /// `types` and `messages_per_channel` are reused when refreshing.
    pub fn new(
        engine: &'a mut RecapEngine,
        keys: K,
        out: W,
        types: ConversationTypes,
        messages_per_channel: u32,
    ) -> Self {
        Self {
            engine,
            keys,
            out,
            types,
            messages_per_channel,
        }
    }

    /// Draw the current recap and handle keys until exit or closed input.
    ///
    /// Failures while refreshing are shown on screen and the loop carries on.
    /// Only output errors end the loop early.
    pub async fn run(&mut self) -> io::Result<()> {
        self.render().await?;

        while let Some(key) = self.keys.next_key()? {
            let Some(action) = Action::from_key(key) else {
                continue;
            };

            match action {
                Action::Exit => break,
                Action::Previous => {
                    self.engine.previous();
                }
                Action::Next => {
                    self.engine.next();
                }
                Action::Refresh => {
                    if let Err(e) = self
                        .engine
                        .generate_recaps(&self.types, self.messages_per_channel)
                        .await
                    {
                        tracing::warn!(error = %e, "recap refresh failed");
                        writeln!(self.out, "\nError: {}", e)?;
                        self.out.flush()?;
                        continue;
                    }
                }
            }
            self.render().await?;
        }

        Ok(())
    }

    async fn render(&mut self) -> io::Result<()> {
        write!(self.out, "{}", CLEAR_SCREEN)?;

        match self.engine.current() {
            Some(recap) => {
                let card = self.engine.format_recap(recap, true).await;
                writeln!(self.out, "{}", card)?;
            }
            None => writeln!(self.out, "{}", NO_ACTIVITY)?,
        }

        writeln!(self.out, "\n{}", KEY_HINT)?;
        self.out.flush()
    }

    pub fn into_output(self) -> W {
        self.out
    }
}
