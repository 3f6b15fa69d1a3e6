//! Inbound message types.

use regex::Regex;

/// One line delivered by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingMessage {
    /// Identity of whoever sent the line.
    pub sender: String,
    /// Channel the line was said in; `None` for a private message.
    pub channel: Option<String>,
    /// Line text with any addressing prefix already removed.
    pub text: String,
    /// Whether the line was directed at the bot.
    pub addressed: bool,
}

impl IncomingMessage {
    /// A line said in a public channel.
    #[must_use]
    pub fn public(
        sender: impl Into<String>,
        channel: impl Into<String>,
        text: impl Into<String>,
        addressed: bool,
    ) -> Self {
        Self {
            sender: sender.into(),
            channel: Some(channel.into()),
            text: text.into(),
            addressed,
        }
    }

    /// A private message. Private messages are always addressed.
    #[must_use]
    pub fn private(sender: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            sender: sender.into(),
            channel: None,
            text: text.into(),
            addressed: true,
        }
    }

    #[must_use]
    pub fn is_private(&self) -> bool {
        self.channel.is_none()
    }

    /// Where replies to this message go.
    #[must_use]
    pub fn reply_context(&self) -> ReplyContext {
        ReplyContext {
            requester: self.sender.clone(),
            target: self
                .channel
                .clone()
                .unwrap_or_else(|| self.sender.clone()),
        }
    }
}

/// Who asked and where to answer them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyContext {
    pub requester: String,
    /// Channel name, or the requester for private conversations.
    pub target: String,
}

/// Recognizes lines that address the bot by nick.
///
/// The pattern is compiled once per nick; matching is case-insensitive and
/// accepts `nick: text` or `nick, text`.
#[derive(Debug, Clone)]
pub struct AddressMatcher {
    prefix: Regex,
}

impl AddressMatcher {
    /// # Errors
    ///
    /// Returns an error if the prefix pattern for `nick` cannot be compiled.
    pub fn new(nick: &str) -> Result<Self, regex::Error> {
        let prefix = Regex::new(&format!(r"(?i)^\s*{}\s*[:,]\s*", regex::escape(nick)))?;
        Ok(Self { prefix })
    }

    /// Split the addressing prefix off a channel line.
    ///
    /// Returns whether the line addressed the bot, plus the remaining text.
    #[must_use]
    pub fn strip<'a>(&self, line: &'a str) -> (bool, &'a str) {
        match self.prefix.find(line) {
            Some(m) => (true, line[m.end()..].trim()),
            None => (false, line.trim()),
        }
    }
}
