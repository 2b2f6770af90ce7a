//! Raw-mode terminal input for the interactive recap.

use std::io::{self, Write};

use anyhow::{bail, Result};
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::tty::IsTty;
use slackline_core::KeySource;

pub const TTY_REQUIRED: &str = "Interactive mode requires a TTY (interactive terminal).";

pub fn stdin_is_tty() -> bool {
    io::stdin().is_tty()
}

/// Single key presses from stdin. Raw mode lasts as long as this value.
pub struct TerminalKeys {
    _private: (),
}

impl TerminalKeys {
    pub fn open() -> Result<Self> {
        if !stdin_is_tty() {
            bail!(TTY_REQUIRED);
        }
        enable_raw_mode()?;
        Ok(Self { _private: () })
    }
}

impl Drop for TerminalKeys {
    fn drop(&mut self) {
        if let Err(e) = disable_raw_mode() {
            tracing::warn!(error = %e, "failed to restore terminal mode");
        }
    }
}

impl KeySource for TerminalKeys {
    fn next_key(&mut self) -> io::Result<Option<char>> {
        loop {
            let Event::Key(key) = event::read()? else {
                continue;
            };
            if key.kind != KeyEventKind::Press {
                continue;
            }

            match key.code {
                KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => return Ok(None),
                KeyCode::Char(c) => return Ok(Some(c.to_ascii_lowercase())),
                KeyCode::Esc => return Ok(Some('x')),
                _ => continue,
            }
        }
    }
}

/// Raw mode disables newline translation; emit `\r\n` for every `\n`.
pub struct RawWriter<W> {
    inner: W,
}

impl<W: Write> RawWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }
}

impl<W: Write> Write for RawWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        for chunk in buf.split_inclusive(|b| *b == b'\n') {
            match chunk.split_last() {
                Some((&b'\n', line)) => {
                    self.inner.write_all(line)?;
                    self.inner.write_all(b"\r\n")?;
                }
                _ => self.inner.write_all(chunk)?,
            }
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}
