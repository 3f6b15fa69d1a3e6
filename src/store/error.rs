//! Store error types.

use std::path::PathBuf;

/// What a per-key operation was doing when it failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOp {
    Read,
    Write,
    Remove,
}

impl std::fmt::Display for KeyOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Read => "read",
            Self::Write => "write",
            Self::Remove => "remove",
        })
    }
}

/// Errors raised by [`KeyValueStore`](super::KeyValueStore) backends.
#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("Cannot open fact database {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    #[error("Cannot create database directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A single key could not be read, written or removed.
    #[error("Failed to {op} key {key:?}: {source}")]
    Key {
        op: KeyOp,
        key: String,
        #[source]
        source: rusqlite::Error,
    },

    /// Schema setup or a whole-table scan failed.
    #[error("Fact database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Cannot encode provenance: {0}")]
    Provenance(#[from] serde_json::Error),

    #[error("Store worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

impl StoreError {
    pub(crate) fn key(op: KeyOp, key: &str, source: rusqlite::Error) -> Self {
        Self::Key {
            op,
            key: key.to_string(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_error_names_key_and_op() {
        let err = StoreError::key(
            KeyOp::Write,
            "factoid:water",
            rusqlite::Error::SqliteFailure(rusqlite::ffi::Error::new(5), Some("locked".into())),
        );
        let text = err.to_string();
        assert!(text.starts_with("Failed to write key \"factoid:water\""));
        assert!(text.contains("locked"));
    }

    #[test]
    fn test_open_error_names_path() {
        let err = StoreError::Open {
            path: PathBuf::from("/nowhere/facts.db"),
            source: rusqlite::Error::InvalidPath(PathBuf::from("/nowhere/facts.db")),
        };
        assert!(err.to_string().contains("/nowhere/facts.db"));
    }
}
