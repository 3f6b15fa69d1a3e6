//! Ordered rule classifier.

use regex::Regex;

use crate::facts::{FactEntry, Relation};
use crate::peer::{QUERY_PREFIX, REPLY_PREFIX};

use super::command::{Command, TeachStatement};

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("static parser pattern must compile")
}

/// Classifies chat lines into [`Command`]s.
#[derive(Debug, Clone)]
pub struct StatementParser {
    peer_reply: Regex,
    peer_query: Regex,
    forget: Regex,
    ask_peer: Regex,
    search: Regex,
    question: Regex,
    literal: Regex,
    interrogative: Regex,
    teach: Regex,
    replace: Regex,
    also: Regex,
    or_split: Regex,
}

impl Default for StatementParser {
    fn default() -> Self {
        Self::new()
    }
}

impl StatementParser {
    #[must_use]
    pub fn new() -> Self {
        Self {
            peer_reply: compile(&format!(r"^{}\s+(\S+)\s+(.+)$", regex::escape(REPLY_PREFIX))),
            peer_query: compile(&format!(r"^{}\s+(\S+)\s+(.+)$", regex::escape(QUERY_PREFIX))),
            forget: compile(r"(?i)^forget\s+(.+?)[.!?]*$"),
            ask_peer: compile(r"(?i)^ask\s+(\S+)\s+about\s+(.+?)\?*$"),
            search: compile(r"(?i)^search\s+for\s+(.+)$"),
            question: compile(r"^(.*?)\?+$"),
            literal: compile(r"(?i)^literal\s+(.+)$"),
            interrogative: compile(r"(?i)^(?:what|who|where)\s+(?:is|are)\s+(.+)$"),
            teach: compile(r"(?i)^(.+?)\s+(is|are)\s+(.+)$"),
            replace: compile(r"(?i)^no(?:,\s*|\s+)(.+)$"),
            also: compile(r"(?i)^also\s+(.+)$"),
            or_split: compile(r"\s+or\s+"),
        }
    }

    /// Classify one line of text.
    #[must_use]
    pub fn parse(&self, line: &str) -> Command {
        let text = line.trim();
        if text.is_empty() {
            return Command::Unrecognized;
        }

        self.parse_peer_reply(text)
            .or_else(|| self.parse_peer_query(text))
            .or_else(|| self.parse_forget(text))
            .or_else(|| self.parse_ask_peer(text))
            .or_else(|| self.parse_search(text))
            .or_else(|| self.parse_question(text))
            .or_else(|| self.parse_teach(text))
            .unwrap_or(Command::Unrecognized)
    }

    fn parse_peer_reply(&self, text: &str) -> Option<Command> {
        let caps = self.peer_reply.captures(text)?;
        Some(Command::PeerReply {
            token: caps[1].to_string(),
            payload: caps[2].trim().to_string(),
        })
    }

    fn parse_peer_query(&self, text: &str) -> Option<Command> {
        let caps = self.peer_query.captures(text)?;
        Some(Command::PeerQuery {
            token: caps[1].to_string(),
            subject: caps[2].trim().to_string(),
        })
    }

    fn parse_forget(&self, text: &str) -> Option<Command> {
        let caps = self.forget.captures(text)?;
        Some(Command::Forget {
            subject: caps[1].trim().to_string(),
        })
    }

    fn parse_ask_peer(&self, text: &str) -> Option<Command> {
        let caps = self.ask_peer.captures(text)?;
        let subject = caps[2].trim();
        if subject.is_empty() {
            return None;
        }
        Some(Command::AskPeer {
            peer: caps[1].to_string(),
            subject: subject.to_string(),
        })
    }

    fn parse_search(&self, text: &str) -> Option<Command> {
        let caps = self.search.captures(text)?;
        Some(Command::Search {
            terms: caps[1].split_whitespace().map(str::to_string).collect(),
        })
    }

    fn parse_question(&self, text: &str) -> Option<Command> {
        let caps = self.question.captures(text)?;
        let mut body = caps[1].trim();

        let mut literal = false;
        if let Some(inner) = self.literal.captures(body).and_then(|c| c.get(1)) {
            literal = true;
            body = inner.as_str().trim();
        }
        if let Some(inner) = self.interrogative.captures(body).and_then(|c| c.get(1)) {
            body = inner.as_str().trim();
        }

        if body.is_empty() {
            return None;
        }
        Some(Command::Question {
            subject: body.to_string(),
            literal,
        })
    }

    fn parse_teach(&self, text: &str) -> Option<Command> {
        let caps = self.teach.captures(text)?;
        let mut subject = caps[1].trim();
        let relation: Relation = caps[2].parse().ok()?;
        let mut description = caps[3].trim().trim_end_matches(['.', '!']).trim();

        let mut replace = false;
        if let Some(rest) = self.replace.captures(subject).and_then(|c| c.get(1)) {
            replace = true;
            subject = rest.as_str().trim();
        }

        let mut also = false;
        if let Some(rest) = self.also.captures(description).and_then(|c| c.get(1)) {
            also = true;
            description = rest.as_str().trim();
        }

        let facts: Vec<String> = self
            .or_split
            .split(description)
            .map(str::trim)
            .filter(|f| FactEntry::from_taught(f).is_some())
            .map(str::to_string)
            .collect();

        if subject.is_empty() || facts.is_empty() {
            return None;
        }

        Some(Command::Teach(TeachStatement {
            subject: subject.to_string(),
            relation,
            facts,
            replace,
            also,
        }))
    }
}
