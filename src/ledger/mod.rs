//! Double-entry ledger: posting construction and the accounting engine

pub mod engine;
pub mod posting;

pub use engine::AccountingEngine;
pub use posting::{patterns, PendingEntry, PostingBuilder};
