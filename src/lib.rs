//! # Splitledger Core
//!
//! The reconciliation and ledger-posting engine for two parties sharing
//! expenses: ingests normalized transaction records, classifies each one,
//! applies split and settlement rules, maintains a verifiable double-entry
//! ledger, detects data-quality anomalies, and queues anything ambiguous
//! for human review.
//!
//! ## Features
//!
//! - **Rule-based classification**: an ordered, declarative keyword table
//!   maps free-text descriptions to categories and split directives
//! - **Double-entry ledger**: append-only entries with balance invariants
//!   checked after every posting
//! - **Exact decimal arithmetic**: splits and balances in `BigDecimal`,
//!   never floating point
//! - **Data-quality inspection**: missing amounts, suspiciously large
//!   amounts, and date anomalies surface as structured issues
//! - **Manual-review queue**: ambiguous transactions are held unposted and
//!   exported in full to an external review store
//!
//! ## Quick Start
//!
//! ```rust
//! use splitledger_core::{
//!     NormalizedTransaction, Party, ReconciliationRun, RunConfig,
//! };
//! use bigdecimal::BigDecimal;
//! use chrono::NaiveDate;
//! use std::str::FromStr;
//!
//! let groceries = NormalizedTransaction::new(
//!     "txn-1",
//!     "visa",
//!     NaiveDate::from_ymd_opt(2024, 10, 5).unwrap(),
//!     "Weekly groceries",
//!     Some(BigDecimal::from_str("84.50").unwrap()),
//!     Party::PartyA,
//! );
//! let run = ReconciliationRun::from_scratch(RunConfig::default(), vec![groceries]);
//! let report = run.execute().unwrap();
//! println!("{}", report.balance_view());
//! ```

pub mod decoder;
pub mod ledger;
pub mod quality;
pub mod reconcile;
pub mod split;
pub mod traits;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use ledger::AccountingEngine;
pub use quality::{DataQualityInspector, InspectorConfig};
pub use reconcile::{
    export_review_queue, Baseline, ReconciliationRun, RunConfig, RunMode, RunReport, RunSummary,
};
pub use split::SplitShares;
pub use traits::ReviewStore;
pub use types::*;
pub use utils::MemoryReviewStore;
