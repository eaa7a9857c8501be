//! The run report and the review-queue export contract

use bigdecimal::BigDecimal;
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::traits::ReviewStore;
use crate::types::{
    AuditRecord, BalanceView, DataQualityIssue, Disposition, IssueKind, LedgerEntry,
    ManualReviewItem, ReviewStoreResult,
};

/// Everything one reconciliation run produces
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: Uuid,
    /// Signed opening balance (zero for from-scratch runs)
    pub opening_balance: BigDecimal,
    /// Signed final balance (positive = PartyA owes PartyB)
    pub final_balance: BigDecimal,
    /// Full append-only ledger, in sequence order
    pub ledger: Vec<LedgerEntry>,
    /// One record per transaction processed, in processing order
    pub audit_trail: Vec<AuditRecord>,
    /// All data-quality issues raised during the run
    pub issues: Vec<DataQualityIssue>,
    /// Transactions held for human adjudication
    pub review_queue: Vec<ManualReviewItem>,
}

impl RunReport {
    /// Final balance with direction, e.g. "PartyA owes PartyB $8595.87"
    pub fn balance_view(&self) -> BalanceView {
        BalanceView::from_signed(&self.final_balance)
    }

    /// Rebuild the final balance from the audit trail alone
    ///
    /// The trail is an independent witness: opening balance plus the sum of
    /// posted deltas must equal the ledger-derived final balance.
    pub fn reconstruct_balance_from_audit(&self) -> BigDecimal {
        let mut balance = self.opening_balance.clone();
        for record in &self.audit_trail {
            if let Disposition::Posted { balance_delta, .. } = &record.disposition {
                balance += balance_delta;
            }
        }
        balance
    }

    /// Number of issues of one kind
    pub fn issue_count(&self, kind: IssueKind) -> usize {
        self.issues.iter().filter(|i| i.kind == kind).count()
    }

    /// Headline counts for the run
    pub fn summary(&self) -> RunSummary {
        let mut posted = 0;
        let mut flagged = 0;
        let mut excluded = 0;
        for record in &self.audit_trail {
            match record.disposition {
                Disposition::Posted { .. } => posted += 1,
                Disposition::Flagged { .. } => flagged += 1,
                Disposition::Excluded { .. } => excluded += 1,
            }
        }
        RunSummary {
            transactions_processed: self.audit_trail.len(),
            posted,
            flagged,
            excluded,
            ledger_entries: self.ledger.len(),
            quality_issues: self.issues.len(),
            review_items: self.review_queue.len(),
        }
    }
}

/// Headline counts for one run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub transactions_processed: usize,
    pub posted: usize,
    pub flagged: usize,
    pub excluded: usize,
    pub ledger_entries: usize,
    pub quality_issues: usize,
    pub review_items: usize,
}

/// Export the run's review queue to the persistent store
///
/// Every item is exported, unconditionally: zero-amount and absent-amount
/// items included. Filtering here once hid the vast majority of flagged
/// transactions from reviewers, so the exported count is returned for the
/// caller to verify against the queue length.
pub async fn export_review_queue<S: ReviewStore>(
    report: &RunReport,
    store: &mut S,
) -> ReviewStoreResult<usize> {
    for item in &report.review_queue {
        store.save_item(item).await?;
    }
    info!(
        run_id = %report.run_id,
        exported = report.review_queue.len(),
        "exported review queue"
    );
    Ok(report.review_queue.len())
}
