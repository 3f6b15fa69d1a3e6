//! Configuration types.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Feed fetching limits.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FeedConfig {
    /// Overall deadline for fetching one feed.
    pub timeout_secs: u64,
    /// Deadline for establishing the connection.
    pub connect_timeout_secs: u64,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            connect_timeout_secs: 5,
        }
    }
}

/// Bounds on the pending peer query table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PeerConfig {
    /// Seconds before an unanswered query is forgotten. 0 keeps them forever.
    pub ttl_secs: u64,
    /// Maximum outstanding queries. 0 means unbounded.
    pub max_pending: usize,
}

impl Default for PeerConfig {
    fn default() -> Self {
        Self {
            ttl_secs: 3600,
            max_pending: 64,
        }
    }
}

/// Process configuration for the bot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BotConfig {
    /// Name the bot answers to (`nick: question?`).
    pub nick: String,
    /// Database path. Defaults to the platform data directory.
    pub database: Option<PathBuf>,
    /// Fixed RNG seed for reproducible answer selection.
    pub seed: Option<u64>,
    pub feed: FeedConfig,
    pub peer: PeerConfig,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            nick: "infobot".to_string(),
            database: None,
            seed: None,
            feed: FeedConfig::default(),
            peer: PeerConfig::default(),
        }
    }
}
