//! Configuration module.
//!
//! Two layers: [`BotConfig`] is static process configuration read from a
//! TOML file at startup; [`Settings`] are the runtime switches (peer to ask,
//! passive modes, stopwords) persisted in the key/value store.

mod loader;
mod settings;
mod types;

pub use loader::*;
pub use settings::*;
pub use types::*;
