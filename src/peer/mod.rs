//! Peer knowledge base protocol.
//!
//! Unknown subjects can be delegated to another bot over private messages:
//!
//! ```text
//! us                                   peer
//!  |-- :INFOBOT:QUERY <token> <subject> -->|
//!  |                                       | (looks up subject)
//!  |<-- :INFOBOT:REPLY <token> <subject> =is=> <fact> --|
//! ```
//!
//! The reply may arrive arbitrarily late, out of order, or never. The token
//! is the only thing tying it back to whoever originally asked.

mod coordinator;
mod protocol;

pub use coordinator::*;
pub use protocol::*;
