//! Run construction and the per-transaction reconciliation loop

use std::collections::HashMap;

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::decoder;
use crate::ledger::AccountingEngine;
use crate::quality::{DataQualityInspector, InspectorConfig};
use crate::reconcile::report::RunReport;
use crate::split::SplitShares;
use crate::types::{
    AuditRecord, BalanceDirection, Category, Classification, Confidence, DataQualityIssue,
    DateRange, Disposition, IssueKind, ManualReviewItem, NormalizedTransaction, Party, Resolution,
    ReviewDecision, ReviewReason, RunError, RunResult, SplitDirective,
};

/// A previously agreed, out-of-band balance used as the starting point for
/// baseline mode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Baseline {
    /// Date the balance was agreed; only transactions strictly after it are
    /// processed
    pub as_of: NaiveDate,
    /// Non-negative magnitude of the agreed balance
    pub amount: BigDecimal,
    pub direction: BalanceDirection,
}

impl Baseline {
    pub fn new(as_of: NaiveDate, amount: BigDecimal, direction: BalanceDirection) -> Self {
        Self {
            as_of,
            amount,
            direction,
        }
    }

    /// Signed opening balance (positive = PartyA owes PartyB)
    pub fn signed(&self) -> BigDecimal {
        match self.direction {
            BalanceDirection::PartyAOwesPartyB => self.amount.clone(),
            BalanceDirection::PartyBOwesPartyA => -self.amount.clone(),
            BalanceDirection::Settled => BigDecimal::from(0),
        }
    }
}

/// How a run starts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RunMode {
    /// Start from zero and replay the full history
    FromScratch,
    /// Start from an already-reconciled balance and process only later
    /// transactions
    FromBaseline(Baseline),
}

/// Per-run configuration
///
/// The rent split ratio and payer-of-record are deliberately configuration,
/// not constants: the business records disagree on both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Split applied to rent transactions
    pub rent_split: SplitDirective,
    /// Party that pays rent upfront; `None` trusts each transaction's payer
    pub rent_payer: Option<Party>,
    /// High-value threshold for the quality inspector
    pub high_value_threshold: BigDecimal,
    /// Declared coverage window for date-anomaly detection
    pub coverage: Option<DateRange>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            rent_split: SplitDirective::EvenSplit,
            rent_payer: None,
            high_value_threshold: BigDecimal::from(10_000),
            coverage: None,
        }
    }
}

/// One reconciliation run over a fixed input snapshot
///
/// Immutable after construction; `execute` consumes the run and produces a
/// single report. No two runs share mutable state.
pub struct ReconciliationRun {
    id: Uuid,
    mode: RunMode,
    config: RunConfig,
    transactions: Vec<NormalizedTransaction>,
    decisions: HashMap<String, Resolution>,
}

impl ReconciliationRun {
    /// Build a from-scratch run over the full transaction history
    pub fn from_scratch(config: RunConfig, transactions: Vec<NormalizedTransaction>) -> Self {
        Self {
            id: Uuid::new_v4(),
            mode: RunMode::FromScratch,
            config,
            transactions: sorted(transactions),
            decisions: HashMap::new(),
        }
    }

    /// Build a baseline run; fails when no baseline is supplied
    pub fn from_baseline(
        baseline: Option<Baseline>,
        config: RunConfig,
        transactions: Vec<NormalizedTransaction>,
    ) -> RunResult<Self> {
        let baseline = baseline.ok_or(RunError::MissingBaseline)?;
        Ok(Self {
            id: Uuid::new_v4(),
            mode: RunMode::FromBaseline(baseline),
            config,
            transactions: sorted(transactions),
            decisions: HashMap::new(),
        })
    }

    /// Attach externally resolved review decisions, keyed by transaction
    /// reference
    pub fn with_decisions(mut self, decisions: Vec<ReviewDecision>) -> Self {
        self.decisions = decisions
            .into_iter()
            .map(|d| (d.transaction_ref, d.resolution))
            .collect();
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Run the full pipeline and assemble the report
    ///
    /// Recoverable conditions become audit records, issues, and review
    /// items; only invariant violations (and a missing baseline at
    /// construction) abort the run.
    pub fn execute(self) -> RunResult<RunReport> {
        let ReconciliationRun {
            id,
            mode,
            config,
            transactions,
            decisions,
        } = self;

        let inspector = DataQualityInspector::new(InspectorConfig {
            high_value_threshold: config.high_value_threshold.clone(),
            coverage: config.coverage,
        });
        let mut engine = AccountingEngine::new();

        let (opening_balance, cutoff) = match &mode {
            RunMode::FromScratch => (BigDecimal::from(0), None),
            RunMode::FromBaseline(baseline) => {
                let signed = baseline.signed();
                engine.post_baseline(baseline.as_of, &signed)?;
                (signed, Some(baseline.as_of))
            }
        };

        info!(
            run_id = %id,
            transactions = transactions.len(),
            baseline = cutoff.is_some(),
            "starting reconciliation run"
        );

        let mut audit_trail: Vec<AuditRecord> = Vec::new();
        let mut issues: Vec<DataQualityIssue> = Vec::new();
        let mut review_queue: Vec<ManualReviewItem> = Vec::new();

        for txn in transactions
            .iter()
            .filter(|t| cutoff.is_none_or(|c| t.date > c))
        {
            let sequence = audit_trail.len() as u64;
            let (record, items) = process_transaction(
                txn,
                &config,
                &decisions,
                &inspector,
                &mut engine,
                sequence,
            )?;
            issues.extend(record.issues.iter().cloned());
            audit_trail.push(record);
            review_queue.extend(items);
        }

        engine.verify_invariants()?;

        let final_balance = engine.balance().clone();
        info!(
            run_id = %id,
            balance = %final_balance,
            flagged = review_queue.len(),
            "reconciliation run complete"
        );

        Ok(RunReport {
            run_id: id,
            opening_balance,
            final_balance,
            ledger: engine.into_entries(),
            audit_trail,
            issues,
            review_queue,
        })
    }
}

/// Stable processing order: date, then source, then reference
fn sorted(mut transactions: Vec<NormalizedTransaction>) -> Vec<NormalizedTransaction> {
    transactions.sort_by(|a, b| {
        (a.date, &a.source, &a.reference).cmp(&(b.date, &b.source, &b.reference))
    });
    transactions
}

fn process_transaction(
    txn: &NormalizedTransaction,
    config: &RunConfig,
    decisions: &HashMap<String, Resolution>,
    inspector: &DataQualityInspector,
    engine: &mut AccountingEngine,
    sequence: u64,
) -> RunResult<(AuditRecord, Vec<ManualReviewItem>)> {
    let issues = inspector.inspect(txn);
    let advisory_reasons: Vec<ReviewReason> = issues
        .iter()
        .filter_map(|issue| match issue.kind {
            IssueKind::SuspiciousAmount => Some(ReviewReason::SuspiciousAmount),
            IssueKind::DateAnomaly => Some(ReviewReason::DateOutOfRange),
            IssueKind::MissingAmount => None,
        })
        .collect();

    // A resolved decision from the review store takes priority over both
    // quality gating and the decoder.
    if let Some(resolution) = decisions.get(&txn.reference) {
        return apply_resolution(txn, resolution, config, engine, sequence, issues);
    }

    // Without an amount nothing can be posted.
    let Some(amount) = txn.amount.clone() else {
        debug!(reference = %txn.reference, "flagging transaction with missing amount");
        let mut reasons = vec![ReviewReason::MissingAmount];
        reasons.extend(advisory_reasons);
        return Ok((
            AuditRecord {
                sequence,
                transaction_ref: txn.reference.clone(),
                date: txn.date,
                classification: None,
                issues,
                disposition: Disposition::Flagged { reasons },
            },
            vec![review_item(txn, ReviewReason::MissingAmount)],
        ));
    };

    let classification = decoder::classify(
        &txn.description,
        txn.amount.as_ref(),
        txn.payer,
        &txn.source,
    );

    if classification.confidence == Confidence::Low
        || classification.category == Category::Unrecognized
    {
        let primary = if classification.category == Category::Unrecognized {
            ReviewReason::UnrecognizedDescription
        } else {
            ReviewReason::AmbiguousDescription
        };
        debug!(
            reference = %txn.reference,
            reason = %primary,
            "flagging transaction for review"
        );
        let mut reasons = vec![primary];
        reasons.extend(advisory_reasons);
        return Ok((
            AuditRecord {
                sequence,
                transaction_ref: txn.reference.clone(),
                date: txn.date,
                classification: Some(classification),
                issues,
                disposition: Disposition::Flagged { reasons },
            },
            vec![review_item(txn, primary)],
        ));
    }

    // Rent terms come from run configuration, not from the rule table.
    let split = if classification.category == Category::Rent {
        config.rent_split.clone()
    } else {
        classification.split.clone()
    };
    let disposition = post_classified(txn, &amount, classification.category, &split, config, engine)?;

    // Advisory quality findings post normally but still reach a reviewer.
    let items = advisory_reasons
        .iter()
        .map(|reason| review_item(txn, *reason))
        .collect();

    Ok((
        AuditRecord {
            sequence,
            transaction_ref: txn.reference.clone(),
            date: txn.date,
            classification: Some(classification),
            issues,
            disposition,
        },
        items,
    ))
}

fn apply_resolution(
    txn: &NormalizedTransaction,
    resolution: &Resolution,
    config: &RunConfig,
    engine: &mut AccountingEngine,
    sequence: u64,
    issues: Vec<DataQualityIssue>,
) -> RunResult<(AuditRecord, Vec<ManualReviewItem>)> {
    match resolution {
        Resolution::Exclude { note } => Ok((
            AuditRecord {
                sequence,
                transaction_ref: txn.reference.clone(),
                date: txn.date,
                classification: None,
                issues,
                disposition: Disposition::Excluded { note: note.clone() },
            },
            Vec::new(),
        )),
        Resolution::Post {
            category,
            split,
            amount_override,
        } => {
            let amount = amount_override.clone().or_else(|| txn.amount.clone());
            let Some(amount) = amount else {
                // The reviewer posted without supplying the missing amount;
                // the transaction stays in the queue.
                return Ok((
                    AuditRecord {
                        sequence,
                        transaction_ref: txn.reference.clone(),
                        date: txn.date,
                        classification: None,
                        issues,
                        disposition: Disposition::Flagged {
                            reasons: vec![ReviewReason::MissingAmount],
                        },
                    },
                    vec![review_item(txn, ReviewReason::MissingAmount)],
                ));
            };

            let classification = Classification {
                category: *category,
                split: split.clone(),
                confidence: Confidence::Normal,
                matched_rule: None,
            };
            let disposition =
                post_classified(txn, &amount, *category, split, config, engine)?;
            Ok((
                AuditRecord {
                    sequence,
                    transaction_ref: txn.reference.clone(),
                    date: txn.date,
                    classification: Some(classification),
                    issues,
                    disposition,
                },
                Vec::new(),
            ))
        }
    }
}

fn post_classified(
    txn: &NormalizedTransaction,
    amount: &BigDecimal,
    category: Category,
    split: &SplitDirective,
    config: &RunConfig,
    engine: &mut AccountingEngine,
) -> RunResult<Disposition> {
    let zero = BigDecimal::from(0);
    let negative = *amount < zero;
    let magnitude = amount.abs();
    let before = engine.balance().clone();

    let entry_sequences = match category {
        Category::Settlement => {
            // Sign flips who actually handed money over.
            let payer = if negative { txn.payer.other() } else { txn.payer };
            engine.post_settlement(&txn.reference, txn.date, payer, &magnitude)?
        }
        _ => {
            if *split == SplitDirective::ExcludeFromSplit {
                return Ok(Disposition::Excluded {
                    note: format!("{category} spending carries no shared liability"),
                });
            }
            let payer = if category == Category::Rent {
                config.rent_payer.unwrap_or(txn.payer)
            } else {
                txn.payer
            };
            let shares = SplitShares::compute(&magnitude, split)?;
            // Shared expenses: the counterparty owes the payer. Shared
            // income: the receiving party owes the other their cut.
            let (mut debtor, mut creditor) = match category {
                Category::Income => (payer, payer.other()),
                _ => (payer.other(), payer),
            };
            if negative {
                std::mem::swap(&mut debtor, &mut creditor);
            }
            engine.post_split(&txn.reference, txn.date, debtor, creditor, &shares)?
        }
    };

    let balance_delta = engine.balance() - &before;
    Ok(Disposition::Posted {
        entry_sequences,
        balance_delta,
    })
}

fn review_item(txn: &NormalizedTransaction, reason: ReviewReason) -> ManualReviewItem {
    ManualReviewItem {
        transaction_ref: txn.reference.clone(),
        date: txn.date,
        description: txn.description.clone(),
        amount: txn.amount.clone(),
        payer: txn.payer,
        source: txn.source.clone(),
        reason,
    }
}
