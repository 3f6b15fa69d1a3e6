//! Wire format of peer protocol lines.

use std::sync::LazyLock;

use rand::Rng;
use regex::Regex;
use uuid::Builder;

use crate::facts::{Relation, LITERAL_JOINER};

/// Prefix of an outbound query line.
pub const QUERY_PREFIX: &str = ":INFOBOT:QUERY";

/// Prefix of an inbound reply line.
pub const REPLY_PREFIX: &str = ":INFOBOT:REPLY";

static REPLY_PAYLOAD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(.+?)\s+=(is|are)=>\s*(.+)$").expect("static reply payload pattern")
});

/// Build `:INFOBOT:QUERY <token> <subject>`.
#[must_use]
pub fn format_query(token: &str, subject: &str) -> String {
    format!("{QUERY_PREFIX} {token} {subject}")
}

/// Build `:INFOBOT:REPLY <token> <subject> =<relation>=> <fact>`.
#[must_use]
pub fn format_reply(token: &str, subject: &str, relation: Relation, fact: &str) -> String {
    format!(
        "{REPLY_PREFIX} {token} {subject} {}> {fact}",
        relation.literal_tag()
    )
}

/// Opaque correlation token drawn from `rng`.
pub fn generate_token<R: Rng + ?Sized>(rng: &mut R) -> String {
    Builder::from_random_bytes(rng.gen())
        .into_uuid()
        .simple()
        .to_string()
}

/// Payload of a peer reply after the token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyPayload {
    pub subject: String,
    pub relation: Relation,
    /// One or more facts; literal views are split on `=or=`.
    pub facts: Vec<String>,
}

/// Parse `<subject> =<relation>=> <fact>`.
#[must_use]
pub fn parse_reply_payload(payload: &str) -> Option<ReplyPayload> {
    let caps = REPLY_PAYLOAD.captures(payload.trim())?;
    let subject = caps[1].trim().to_string();
    let relation = caps[2].parse().ok()?;
    let facts: Vec<String> = caps[3]
        .split(LITERAL_JOINER.trim())
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .map(str::to_string)
        .collect();
    if subject.is_empty() || facts.is_empty() {
        return None;
    }
    Some(ReplyPayload {
        subject,
        relation,
        facts,
    })
}
