//! Terminal transport used by the `chat` subcommand.

use std::io::{self, Write};

use async_trait::async_trait;
use chrono::Utc;
use owo_colors::OwoColorize;

use super::{Transport, TransportError};

/// Get current timestamp in the same format as tracing.
fn timestamp() -> String {
    Utc::now().format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string()
}

/// Prints bot output to stdout.
#[derive(Debug, Clone)]
pub struct ConsoleTransport {
    nick: String,
    raw_mode: bool,
}

impl ConsoleTransport {
    #[must_use]
    pub fn new(nick: impl Into<String>, raw_mode: bool) -> Self {
        Self {
            nick: nick.into(),
            raw_mode,
        }
    }

    /// Plain rendering of a chat line, used in raw mode.
    #[must_use]
    pub fn format_send(&self, target: &str, text: &str) -> String {
        format!("[{target}] <{}> {text}", self.nick)
    }

    /// Plain rendering of an emote, used in raw mode.
    #[must_use]
    pub fn format_emote(&self, target: &str, text: &str) -> String {
        format!("[{target}] * {} {text}", self.nick)
    }

    fn write_line(line: &str) -> Result<(), TransportError> {
        let mut stdout = io::stdout().lock();
        writeln!(stdout, "{line}")?;
        stdout.flush()?;
        Ok(())
    }
}

#[async_trait]
impl Transport for ConsoleTransport {
    async fn send(&self, target: &str, text: &str) -> Result<(), TransportError> {
        if self.raw_mode {
            return Self::write_line(&self.format_send(target, text));
        }
        let line = format!(
            "{} {} {} {}",
            timestamp().dimmed(),
            format!("[{target}]").blue().bold(),
            format!("<{}>", self.nick).cyan(),
            text
        );
        Self::write_line(&line)
    }

    async fn emote(&self, target: &str, text: &str) -> Result<(), TransportError> {
        if self.raw_mode {
            return Self::write_line(&self.format_emote(target, text));
        }
        let line = format!(
            "{} {} {} {}",
            timestamp().dimmed(),
            format!("[{target}]").blue().bold(),
            format!("* {}", self.nick).magenta(),
            text.italic()
        );
        Self::write_line(&line)
    }
}
