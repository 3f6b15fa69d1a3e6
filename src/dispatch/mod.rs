//! Per-message orchestration.

mod dispatcher;

pub use dispatcher::*;
