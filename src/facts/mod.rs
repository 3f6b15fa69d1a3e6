//! Factoid records and the store that holds them.
//!
//! A factoid associates a subject with one or more entries through a
//! copula (`is` / `are`). Entries are interchangeable answers; a question
//! picks one at random unless asked for the literal view.

mod record;
mod store;

pub use record::*;
pub use store::*;
