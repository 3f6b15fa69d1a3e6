//! Infobot - conversational factoid knowledge base.

pub mod answer;
pub mod config;
pub mod dispatch;
pub mod facts;
pub mod parser;
pub mod peer;
pub mod store;
pub mod transport;
