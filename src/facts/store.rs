//! Fact store over a generic key/value backend.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::store::{KeyValueStore, StoreError};

use super::record::{FactRecord, Relation};

/// Key prefix for factoid records.
pub const FACT_PREFIX: &str = "factoid:";

/// Key prefix for provenance entries.
pub const META_PREFIX: &str = "factmeta:";

/// Normalize a subject for use as a key: trimmed and lowercased.
#[must_use]
pub fn normalize_subject(subject: &str) -> String {
    subject.trim().to_lowercase()
}

/// Answer produced by [`FactStore::get`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FactAnswer {
    /// `is`/`are`, or `=is=`/`=are=` in literal mode.
    pub relation: String,
    pub text: String,
}

/// Who last taught a subject, and when.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Provenance {
    pub taught_by: String,
    pub updated_at: DateTime<Utc>,
}

/// Owns factoid records in the key/value store.
#[derive(Clone)]
pub struct FactStore {
    store: Arc<dyn KeyValueStore>,
}

impl FactStore {
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    fn fact_key(subject: &str) -> String {
        format!("{FACT_PREFIX}{}", normalize_subject(subject))
    }

    fn meta_key(subject: &str) -> String {
        format!("{META_PREFIX}{}", normalize_subject(subject))
    }

    /// Load the raw record for a subject.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    pub async fn record(&self, subject: &str) -> Result<Option<FactRecord>, StoreError> {
        let key = Self::fact_key(subject);
        let Some(raw) = self.store.get(&key).await? else {
            return Ok(None);
        };
        match FactRecord::decode(&raw) {
            Some(record) if !record.is_empty() => Ok(Some(record)),
            Some(_) => Ok(None),
            None => {
                tracing::warn!(key = %key, "Ignoring undecodable factoid record");
                Ok(None)
            }
        }
    }

    /// Look up a subject.
    ///
    /// In literal mode every entry is returned joined with `=or=` and the
    /// relation is tagged (`=is=`). Otherwise one entry is picked at random.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    pub async fn get<R: Rng + ?Sized>(
        &self,
        subject: &str,
        literal: bool,
        rng: &mut R,
    ) -> Result<Option<FactAnswer>, StoreError> {
        let Some(record) = self.record(subject).await? else {
            return Ok(None);
        };

        if literal {
            return Ok(Some(FactAnswer {
                relation: record.relation.literal_tag(),
                text: record.literal_text(),
            }));
        }

        Ok(record.choose(rng).map(|text| FactAnswer {
            relation: record.relation.as_str().to_string(),
            text: text.to_string(),
        }))
    }

    /// Whether a record exists for the subject.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    pub async fn exists(&self, subject: &str) -> Result<bool, StoreError> {
        Ok(self.record(subject).await?.is_some())
    }

    /// Append facts to a subject, creating the record with `relation` if
    /// absent. Returns how many facts were stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    pub async fn add<S: AsRef<str>>(
        &self,
        subject: &str,
        relation: Relation,
        facts: &[S],
        taught_by: &str,
    ) -> Result<usize, StoreError> {
        let mut record = self
            .record(subject)
            .await?
            .unwrap_or_else(|| FactRecord::new(relation));

        let mut added = 0;
        for fact in facts {
            if record.push(fact.as_ref()) {
                added += 1;
            }
        }
        if added == 0 {
            return Ok(0);
        }

        self.store
            .set(&Self::fact_key(subject), &record.encode())
            .await?;

        let provenance = Provenance {
            taught_by: taught_by.to_string(),
            updated_at: Utc::now(),
        };
        self.store
            .set(&Self::meta_key(subject), &serde_json::to_string(&provenance)?)
            .await?;

        tracing::debug!(
            subject = %normalize_subject(subject),
            added,
            total = record.entries.len(),
            "Stored facts"
        );
        Ok(added)
    }

    /// Remove a subject. Returns whether it existed.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    pub async fn delete(&self, subject: &str) -> Result<bool, StoreError> {
        let existed = self.store.unset(&Self::fact_key(subject)).await?;
        self.store.unset(&Self::meta_key(subject)).await?;
        if existed {
            tracing::debug!(subject = %normalize_subject(subject), "Deleted factoid");
        }
        Ok(existed)
    }

    /// Who last taught the subject, if recorded.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    pub async fn provenance(&self, subject: &str) -> Result<Option<Provenance>, StoreError> {
        let Some(raw) = self.store.get(&Self::meta_key(subject)).await? else {
            return Ok(None);
        };
        Ok(serde_json::from_str(&raw).ok())
    }

    /// All subjects containing every term, case-insensitively, sorted.
    ///
    /// An empty term list matches nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    pub async fn search<S: AsRef<str>>(&self, terms: &[S]) -> Result<Vec<String>, StoreError> {
        let terms: Vec<String> = terms
            .iter()
            .map(|t| t.as_ref().trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .collect();
        if terms.is_empty() {
            return Ok(Vec::new());
        }

        let mut subjects: Vec<String> = self
            .store
            .list_keys()
            .await?
            .into_iter()
            .filter_map(|key| key.strip_prefix(FACT_PREFIX).map(str::to_string))
            .filter(|subject| {
                let lower = subject.to_lowercase();
                terms.iter().all(|term| lower.contains(term.as_str()))
            })
            .collect();
        subjects.sort();
        Ok(subjects)
    }
}
