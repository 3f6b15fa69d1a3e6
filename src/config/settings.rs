//! Runtime settings persisted in the key/value store.

use std::fmt;
use std::str::FromStr;

use crate::store::{KeyValueStore, StoreError};

/// Key prefix for settings entries.
pub const SETTING_PREFIX: &str = "setting:";

/// Version of the stored data layout.
pub const DATA_VERSION: u32 = 1;

const SCHEMA_VERSION_KEY: &str = "setting:schema_version";

/// Errors from reading or changing settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Unknown setting: {0}")]
    UnknownKey(String),

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: SettingKey, value: String },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// A setting that can be changed at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingKey {
    /// Peer bot to ask about unknown subjects.
    Ask,
    /// Answer questions that were not addressed to the bot.
    PassiveAsk,
    /// Learn statements that were not addressed to the bot.
    PassiveLearn,
    /// Subjects that may never be taught.
    Stopwords,
}

impl SettingKey {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ask => "ask",
            Self::PassiveAsk => "passive_ask",
            Self::PassiveLearn => "passive_learn",
            Self::Stopwords => "stopwords",
        }
    }

    fn store_key(self) -> String {
        format!("{SETTING_PREFIX}{}", self.as_str())
    }
}

impl fmt::Display for SettingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SettingKey {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "ask" => Ok(Self::Ask),
            "passive_ask" => Ok(Self::PassiveAsk),
            "passive_learn" => Ok(Self::PassiveLearn),
            "stopwords" => Ok(Self::Stopwords),
            _ => Err(SettingsError::UnknownKey(s.to_string())),
        }
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Some(true),
        "" | "0" | "false" | "off" | "no" => Some(false),
        _ => None,
    }
}

fn parse_stopwords(value: &str) -> Vec<String> {
    value
        .split(|c: char| c == ',' || c.is_whitespace())
        .map(|w| w.trim().to_lowercase())
        .filter(|w| !w.is_empty())
        .collect()
}

/// Per-process switches. Everything defaults to empty/disabled.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    pub ask: Option<String>,
    pub passive_ask: bool,
    pub passive_learn: bool,
    pub stopwords: Vec<String>,
}

impl Settings {
    /// Read settings from the store, stamping the data version on first use.
    ///
    /// Unparseable stored values fall back to their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read or written.
    pub async fn load(store: &dyn KeyValueStore) -> Result<Self, StoreError> {
        match store.get(SCHEMA_VERSION_KEY).await? {
            None => store.set(SCHEMA_VERSION_KEY, &DATA_VERSION.to_string()).await?,
            Some(v) if v.trim() != DATA_VERSION.to_string() => {
                tracing::warn!(stored = %v, expected = DATA_VERSION, "Stored data version differs");
            }
            Some(_) => {}
        }

        let mut settings = Self::default();
        for key in [
            SettingKey::Ask,
            SettingKey::PassiveAsk,
            SettingKey::PassiveLearn,
            SettingKey::Stopwords,
        ] {
            if let Some(value) = store.get(&key.store_key()).await? {
                if let Err(e) = settings.apply(key, &value) {
                    tracing::warn!(key = %key, error = %e, "Ignoring stored setting");
                }
            }
        }
        tracing::debug!(?settings, "Loaded settings");
        Ok(settings)
    }

    /// Change one setting and persist it.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is invalid for the key or the store fails.
    pub async fn update(
        &mut self,
        store: &dyn KeyValueStore,
        key: SettingKey,
        value: &str,
    ) -> Result<(), SettingsError> {
        self.apply(key, value)?;
        store.set(&key.store_key(), value.trim()).await?;
        tracing::info!(key = %key, value = %value.trim(), "Updated setting");
        Ok(())
    }

    fn apply(&mut self, key: SettingKey, value: &str) -> Result<(), SettingsError> {
        let invalid = || SettingsError::InvalidValue {
            key,
            value: value.to_string(),
        };
        match key {
            SettingKey::Ask => {
                let peer = value.trim();
                self.ask = (!peer.is_empty()).then(|| peer.to_string());
            }
            SettingKey::PassiveAsk => self.passive_ask = parse_flag(value).ok_or_else(invalid)?,
            SettingKey::PassiveLearn => {
                self.passive_learn = parse_flag(value).ok_or_else(invalid)?;
            }
            SettingKey::Stopwords => self.stopwords = parse_stopwords(value),
        }
        Ok(())
    }

    /// Whether `subject` matches a stopword, ignoring case.
    #[must_use]
    pub fn is_stopword(&self, subject: &str) -> bool {
        let subject = subject.trim().to_lowercase();
        self.stopwords.iter().any(|w| *w == subject)
    }
}
