//! Factoid record model and its stored encoding.

use std::fmt;
use std::str::FromStr;

use rand::seq::SliceRandom;
use rand::Rng;

/// Separator between fields of an encoded record (ASCII unit separator).
pub const FIELD_SEPARATOR: char = '\u{1f}';

/// Marker for entries taught as explicit alternates.
pub const ALTERNATE_MARKER: char = '|';

/// Joins entries in the literal view.
pub const LITERAL_JOINER: &str = " =or= ";

/// Copula used when a fact was taught.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Relation {
    Is,
    Are,
}

impl Relation {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Is => "is",
            Self::Are => "are",
        }
    }

    /// Tag used by the literal view, e.g. `=is=`.
    #[must_use]
    pub fn literal_tag(self) -> String {
        format!("={}=", self.as_str())
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Relation {
    type Err = UnknownRelation;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "is" => Ok(Self::Is),
            "are" => Ok(Self::Are),
            _ => Err(UnknownRelation(s.to_string())),
        }
    }
}

/// A relation string other than `is` or `are`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown relation: {0}")]
pub struct UnknownRelation(pub String);

/// One stored answer for a subject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FactEntry {
    pub text: String,
    /// Taught with a leading `|`.
    pub alternate: bool,
}

impl FactEntry {
    /// Parse a taught fact, honoring a leading alternation marker and
    /// dropping any field separators. Returns `None` for blank facts.
    #[must_use]
    pub fn from_taught(fact: &str) -> Option<Self> {
        let cleaned: String = fact.chars().filter(|c| *c != FIELD_SEPARATOR).collect();
        let trimmed = cleaned.trim();
        let (text, alternate) = match trimmed.strip_prefix(ALTERNATE_MARKER) {
            Some(rest) => (rest.trim(), true),
            None => (trimmed, false),
        };
        if text.is_empty() {
            return None;
        }
        Some(Self {
            text: text.to_string(),
            alternate,
        })
    }

    fn literal(&self) -> String {
        if self.alternate {
            format!("{ALTERNATE_MARKER}{}", self.text)
        } else {
            self.text.clone()
        }
    }
}

/// Everything known about one subject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FactRecord {
    pub relation: Relation,
    pub entries: Vec<FactEntry>,
}

impl FactRecord {
    #[must_use]
    pub fn new(relation: Relation) -> Self {
        Self {
            relation,
            entries: Vec::new(),
        }
    }

    /// Append a taught fact. Returns whether anything was added.
    pub fn push(&mut self, fact: &str) -> bool {
        match FactEntry::from_taught(fact) {
            Some(entry) => {
                self.entries.push(entry);
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries joined with `=or=`, alternates keeping their marker.
    #[must_use]
    pub fn literal_text(&self) -> String {
        self.entries
            .iter()
            .map(FactEntry::literal)
            .collect::<Vec<_>>()
            .join(LITERAL_JOINER)
    }

    /// Pick one entry uniformly at random.
    pub fn choose<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&str> {
        self.entries.choose(rng).map(|e| e.text.as_str())
    }

    /// Serialize as `relation<US>entry<US>|alternate...`.
    #[must_use]
    pub fn encode(&self) -> String {
        let mut out = String::from(self.relation.as_str());
        for entry in &self.entries {
            out.push(FIELD_SEPARATOR);
            out.push_str(&entry.literal());
        }
        out
    }

    /// Parse the stored form. Returns `None` when the relation field is not
    /// recognized.
    #[must_use]
    pub fn decode(raw: &str) -> Option<Self> {
        let mut fields = raw.split(FIELD_SEPARATOR);
        let relation = fields.next()?.parse().ok()?;
        let entries = fields.filter_map(FactEntry::from_taught).collect();
        Some(Self { relation, entries })
    }
}
