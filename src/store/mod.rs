//! Key/value store boundary.
//!
//! The fact layer only needs four primitives from persistent storage:
//! `get`, `set`, `unset` and `list_keys`. Anything that provides atomic
//! per-key operations can back the bot.

mod error;
mod memory;
mod schema;
mod sqlite;

pub use error::{KeyOp, StoreError};
pub use memory::MemoryStore;
pub use schema::{SCHEMA, SCHEMA_VERSION};
pub use sqlite::{default_database_path, SqliteStore};

use async_trait::async_trait;

/// Persistent string key/value storage.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Fetch the value stored under `key`.
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Store `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Remove `key`. Returns whether it was present.
    async fn unset(&self, key: &str) -> Result<bool, StoreError>;

    /// List every key currently stored.
    async fn list_keys(&self) -> Result<Vec<String>, StoreError>;
}
