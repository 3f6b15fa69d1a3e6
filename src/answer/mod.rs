//! Turning stored entries into user-facing replies.
//!
//! Entries may carry directives:
//! - `<action>` delivers the rest as an emote
//! - `<reply>` delivers the rest verbatim, without `subject is`
//! - `<rss="URL">` is replaced by a one-line summary of the feed

mod feed;
mod resolver;

pub use feed::*;
pub use resolver::*;
