//! Core types and data structures for the reconciliation engine

use bigdecimal::BigDecimal;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// The two parties sharing expenses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Party {
    PartyA,
    PartyB,
}

impl Party {
    /// Returns the other party
    pub fn other(&self) -> Party {
        match self {
            Party::PartyA => Party::PartyB,
            Party::PartyB => Party::PartyA,
        }
    }
}

impl std::fmt::Display for Party {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Party::PartyA => write!(f, "PartyA"),
            Party::PartyB => write!(f, "PartyB"),
        }
    }
}

/// Ledger accounts: one per party plus a clearing pseudo-account used by
/// settlement postings
///
/// Balance convention: debits minus credits on a party account equal what
/// that party currently owes the other. Clearing must net to zero over a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Account {
    PartyA,
    PartyB,
    Clearing,
}

impl From<Party> for Account {
    fn from(party: Party) -> Self {
        match party {
            Party::PartyA => Account::PartyA,
            Party::PartyB => Account::PartyB,
        }
    }
}

/// Types of entries in double-entry bookkeeping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntryType {
    /// Debit entry - on a party account, increases what that party owes
    Debit,
    /// Credit entry - on a party account, decreases what that party owes
    Credit,
}

/// A normalized transaction record produced by an external loader
///
/// Treated as immutable input: the engine never mutates a transaction after
/// ingestion. An absent amount is modelled as `None`, never as a zero
/// sentinel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedTransaction {
    /// Stable identifier assigned by the loader (unique per source record)
    pub reference: String,
    /// Source identifier (bank export, card feed, etc.)
    pub source: String,
    /// Date the transaction occurred
    pub date: NaiveDate,
    /// Raw free-text description from the source
    pub description: String,
    /// Signed amount; `None` when the source record had no parseable amount
    pub amount: Option<BigDecimal>,
    /// Which party paid (or received) the money
    pub payer: Party,
}

impl NormalizedTransaction {
    pub fn new(
        reference: impl Into<String>,
        source: impl Into<String>,
        date: NaiveDate,
        description: impl Into<String>,
        amount: Option<BigDecimal>,
        payer: Party,
    ) -> Self {
        Self {
            reference: reference.into(),
            source: source.into(),
            date,
            description: description.into(),
            amount,
            payer,
        }
    }
}

/// Semantic category assigned to a transaction by the description decoder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    /// Shared expense, split between the parties
    Expense,
    /// Shared income, split in the receiving party's disfavor
    Income,
    /// Personal spending with zero shared liability
    Personal,
    /// Rent, split per run configuration
    Rent,
    /// Direct payment between the parties that reduces the balance
    Settlement,
    /// The decoder could not classify the description
    Unrecognized,
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Category::Expense => "expense",
            Category::Income => "income",
            Category::Personal => "personal",
            Category::Rent => "rent",
            Category::Settlement => "settlement",
            Category::Unrecognized => "unrecognized",
        };
        write!(f, "{label}")
    }
}

/// How a transaction's amount is divided between the parties
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SplitDirective {
    /// Each party bears half
    EvenSplit,
    /// Counterparty bears a fixed percentage of the amount
    FixedPercent { counterparty_percent: BigDecimal },
    /// Counterparty owes the full amount back to the payer
    FullReimbursement,
    /// Nothing is shared; the transaction carries no ledger impact
    ExcludeFromSplit,
}

/// Classification confidence reported by the decoder
///
/// Low confidence always routes the transaction to manual review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Confidence {
    Normal,
    Low,
}

/// Output of the description decoder
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Classification {
    pub category: Category,
    pub split: SplitDirective,
    pub confidence: Confidence,
    /// Name of the rule that matched, if any
    pub matched_rule: Option<&'static str>,
}

/// Immutable double-entry ledger record
///
/// The ledger is an append-only ordered sequence; entries are never deleted
/// or mutated. Corrections are posted as reversing entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Monotonically increasing sequence number, unique within a run
    pub sequence: u64,
    /// Reference of the transaction (or synthetic posting) that produced it
    pub transaction_ref: String,
    pub account: Account,
    pub entry_type: EntryType,
    /// Always strictly positive
    pub amount: BigDecimal,
    /// Effective posting time, derived from the transaction date so that
    /// identical runs produce identical ledgers
    pub posted_at: NaiveDateTime,
    pub note: Option<String>,
}

impl LedgerEntry {
    /// Effective posting time for a given transaction date
    pub fn posting_time(date: NaiveDate) -> NaiveDateTime {
        date.and_time(NaiveTime::MIN)
    }
}

/// Which way the outstanding balance points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BalanceDirection {
    PartyAOwesPartyB,
    PartyBOwesPartyA,
    Settled,
}

/// Human-oriented view of the running balance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceView {
    /// Non-negative magnitude of the outstanding balance
    pub amount: BigDecimal,
    pub direction: BalanceDirection,
}

impl BalanceView {
    /// Build a view from the signed ledger balance
    /// (positive = PartyA owes PartyB)
    pub fn from_signed(signed: &BigDecimal) -> Self {
        let zero = BigDecimal::from(0);
        let direction = if *signed > zero {
            BalanceDirection::PartyAOwesPartyB
        } else if *signed < zero {
            BalanceDirection::PartyBOwesPartyA
        } else {
            BalanceDirection::Settled
        };
        Self {
            amount: signed.abs(),
            direction,
        }
    }

    /// Signed balance under the positive-means-PartyA-owes convention
    pub fn signed(&self) -> BigDecimal {
        match self.direction {
            BalanceDirection::PartyAOwesPartyB => self.amount.clone(),
            BalanceDirection::PartyBOwesPartyA => -self.amount.clone(),
            BalanceDirection::Settled => BigDecimal::from(0),
        }
    }
}

impl std::fmt::Display for BalanceView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.direction {
            BalanceDirection::PartyAOwesPartyB => {
                write!(f, "PartyA owes PartyB ${}", self.amount)
            }
            BalanceDirection::PartyBOwesPartyA => {
                write!(f, "PartyB owes PartyA ${}", self.amount)
            }
            BalanceDirection::Settled => write!(f, "settled, nothing owed"),
        }
    }
}

/// Inclusive date range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

/// Kinds of data-quality anomalies the inspector can raise
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IssueKind {
    /// Amount absent or unparseable; posting is impossible
    MissingAmount,
    /// Absolute amount exceeds the configured high-value threshold
    SuspiciousAmount,
    /// Date falls outside the run's declared coverage window
    DateAnomaly,
}

/// Severity of a data-quality issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum IssueSeverity {
    Info,
    Warning,
    /// Prevents posting entirely
    Blocking,
}

/// A structured, advisory data-quality finding
///
/// Issues are always recorded in the audit trail; only a `Blocking` issue
/// prevents posting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataQualityIssue {
    pub transaction_ref: String,
    pub kind: IssueKind,
    pub severity: IssueSeverity,
    pub detail: String,
}

/// Why a transaction was routed to manual review
///
/// The queue must let a reviewer distinguish quality triggers from
/// classification triggers, so the reason is carried on every item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReviewReason {
    MissingAmount,
    SuspiciousAmount,
    DateOutOfRange,
    AmbiguousDescription,
    UnrecognizedDescription,
}

impl std::fmt::Display for ReviewReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ReviewReason::MissingAmount => "missing amount",
            ReviewReason::SuspiciousAmount => "suspicious amount",
            ReviewReason::DateOutOfRange => "date outside coverage window",
            ReviewReason::AmbiguousDescription => "ambiguous description",
            ReviewReason::UnrecognizedDescription => "unrecognized description",
        };
        write!(f, "{label}")
    }
}

/// A transaction the engine cannot confidently post without human input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManualReviewItem {
    pub transaction_ref: String,
    pub date: NaiveDate,
    pub description: String,
    /// May be zero or absent; such items are still exported
    pub amount: Option<BigDecimal>,
    pub payer: Party,
    pub source: String,
    pub reason: ReviewReason,
}

/// Externally resolved outcome for a previously flagged transaction,
/// keyed by the stable transaction reference
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewDecision {
    pub transaction_ref: String,
    pub resolution: Resolution,
}

/// What the human reviewer decided
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Resolution {
    /// Post the transaction with the given classification; the amount may be
    /// supplied here when the source record had none
    Post {
        category: Category,
        split: SplitDirective,
        amount_override: Option<BigDecimal>,
    },
    /// Drop the transaction from the ledger entirely
    Exclude { note: String },
}

/// Outcome of processing one transaction
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Disposition {
    /// Ledger entries were appended; `balance_delta` is the signed change to
    /// the running balance (positive = toward PartyA owing PartyB)
    Posted {
        entry_sequences: Vec<u64>,
        balance_delta: BigDecimal,
    },
    /// Held pending manual review; contributes zero to the balance
    Flagged { reasons: Vec<ReviewReason> },
    /// Deliberately excluded from the ledger (personal, gift, or a reviewer
    /// decision)
    Excluded { note: String },
}

/// One audit record per transaction processed, in processing order
///
/// The trail carries enough to reconstruct the final balance independently
/// of the ledger: opening balance plus the sum of posted deltas.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuditRecord {
    /// Processing sequence, starting at zero
    pub sequence: u64,
    pub transaction_ref: String,
    pub date: NaiveDate,
    pub classification: Option<Classification>,
    pub issues: Vec<DataQualityIssue>,
    pub disposition: Disposition,
}

/// Fatal ledger errors: internal defects, never bad input data
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("ledger invariant violated: {0}")]
    InvariantViolation(String),
    #[error("posting batch is not balanced: debits = {debits}, credits = {credits}")]
    UnbalancedPosting {
        debits: BigDecimal,
        credits: BigDecimal,
    },
    #[error("entry amount must be positive, got {0}")]
    NonPositiveAmount(BigDecimal),
    #[error("posting batch must contain at least two entries")]
    EmptyPosting,
}

/// Result type for ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Fatal run-level errors
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("baseline mode requires a baseline date, amount, and direction")]
    MissingBaseline,
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

/// Result type for run operations
pub type RunResult<T> = Result<T, RunError>;

/// Errors surfaced by review-store backends
#[derive(Debug, thiserror::Error)]
pub enum ReviewStoreError {
    #[error("review store error: {0}")]
    Backend(String),
}

/// Result type for review-store operations
pub type ReviewStoreResult<T> = Result<T, ReviewStoreError>;
