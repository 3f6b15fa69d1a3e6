//! Classification of incoming chat lines.
//!
//! Every line maps to exactly one [`Command`]. Rules are tried in a fixed
//! order and the first match wins:
//!
//! 1. Peer protocol reply (`:INFOBOT:REPLY`)
//! 2. Peer protocol query (`:INFOBOT:QUERY`)
//! 3. `forget <subject>`
//! 4. `ask <peer> about <subject>`
//! 5. `search for <terms>`
//! 6. Question (`...?`)
//! 7. Teach (`<subject> is|are <description>`)

mod command;
mod rules;

pub use command::*;
pub use rules::*;
