//! Reconciliation orchestration: run construction, the processing loop, and
//! the run report

pub mod report;
pub mod run;

pub use report::{export_review_queue, RunReport, RunSummary};
pub use run::{Baseline, ReconciliationRun, RunConfig, RunMode};
