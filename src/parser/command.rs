//! Parsed command types.

use crate::facts::Relation;

/// Longest subject (in characters) that may be taught.
pub const MAX_SUBJECT_LEN: usize = 25;

/// A teach statement such as `no, water is wet or |damp`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeachStatement {
    pub subject: String,
    pub relation: Relation,
    /// Description split on the word `or`.
    pub facts: Vec<String>,
    /// Subject was prefixed with `no` / `no,`.
    pub replace: bool,
    /// Description was prefixed with `also`.
    pub also: bool,
}

/// Whether `subject` is short enough to be stored.
#[must_use]
pub fn subject_fits(subject: &str) -> bool {
    subject.trim().chars().count() <= MAX_SUBJECT_LEN
}

impl TeachStatement {
    #[must_use]
    pub fn subject_too_long(&self) -> bool {
        !subject_fits(&self.subject)
    }
}

/// Result of classifying one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Reply from a peer to one of our queries.
    PeerReply { token: String, payload: String },
    /// A peer asking us about a subject.
    PeerQuery { token: String, subject: String },
    Forget { subject: String },
    AskPeer { peer: String, subject: String },
    Search { terms: Vec<String> },
    Question { subject: String, literal: bool },
    Teach(TeachStatement),
    Unrecognized,
}

impl Command {
    /// Commands that are only honored when the bot is addressed.
    #[must_use]
    pub fn requires_addressing(&self) -> bool {
        matches!(
            self,
            Self::Forget { .. } | Self::AskPeer { .. } | Self::Search { .. }
        )
    }

    /// Short name for logging.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::PeerReply { .. } => "peer_reply",
            Self::PeerQuery { .. } => "peer_query",
            Self::Forget { .. } => "forget",
            Self::AskPeer { .. } => "ask_peer",
            Self::Search { .. } => "search",
            Self::Question { .. } => "question",
            Self::Teach(_) => "teach",
            Self::Unrecognized => "unrecognized",
        }
    }
}
