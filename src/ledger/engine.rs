//! The accounting engine: append-only ledger state for one reconciliation run

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use tracing::error;

use crate::ledger::posting::{patterns, validate_batch, PendingEntry};
use crate::split::SplitShares;
use crate::types::{
    Account, BalanceView, EntryType, LedgerEntry, LedgerError, LedgerResult, Party,
};

/// Reference used for the synthetic opening posting in baseline mode
pub const BASELINE_REF: &str = "baseline";

/// Owns the double-entry ledger and the two-party running balance
///
/// The ledger is exclusively owned by one reconciliation run. Every posting
/// is atomic: a batch is validated in full before anything is appended, and
/// the invariants are re-checked after each append. An invariant failure is
/// a programming defect, not a data problem; the ledger is left intact for
/// forensic inspection.
pub struct AccountingEngine {
    entries: Vec<LedgerEntry>,
    next_sequence: u64,
    /// What PartyA currently owes PartyB (incrementally maintained)
    balance_a: BigDecimal,
    /// What PartyB currently owes PartyA (mirror of `balance_a`)
    balance_b: BigDecimal,
}

impl Default for AccountingEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl AccountingEngine {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_sequence: 0,
            balance_a: BigDecimal::from(0),
            balance_b: BigDecimal::from(0),
        }
    }

    /// Post a shared split: `debtor` owes `creditor` the counterparty share
    ///
    /// A zero share is a no-op returning an empty batch. Returns the
    /// sequence numbers of the appended entries.
    pub fn post_split(
        &mut self,
        transaction_ref: &str,
        date: NaiveDate,
        debtor: Party,
        creditor: Party,
        shares: &SplitShares,
    ) -> LedgerResult<Vec<u64>> {
        if shares.is_zero() {
            return Ok(Vec::new());
        }
        let batch = patterns::shared_split(
            debtor,
            creditor,
            &shares.counterparty_share,
            &shares.rounding_remainder,
        )?;
        self.append_batch(transaction_ref, date, batch)
    }

    /// Post a direct payment from `payer` to the other party
    ///
    /// The sole legitimate one-sided transfer: both legs pass through the
    /// clearing account, which must net to zero over the run.
    pub fn post_settlement(
        &mut self,
        transaction_ref: &str,
        date: NaiveDate,
        payer: Party,
        amount: &BigDecimal,
    ) -> LedgerResult<Vec<u64>> {
        if *amount == BigDecimal::from(0) {
            return Ok(Vec::new());
        }
        let batch = patterns::settlement(payer, amount)?;
        self.append_batch(transaction_ref, date, batch)
    }

    /// Post the synthetic opening balance for baseline mode
    ///
    /// `signed` follows the positive-means-PartyA-owes convention. A zero
    /// baseline posts nothing.
    pub fn post_baseline(&mut self, as_of: NaiveDate, signed: &BigDecimal) -> LedgerResult<Vec<u64>> {
        let zero = BigDecimal::from(0);
        if *signed == zero {
            return Ok(Vec::new());
        }
        let (debtor, amount) = if *signed > zero {
            (Party::PartyA, signed.clone())
        } else {
            (Party::PartyB, signed.abs())
        };
        let batch = patterns::opening_balance(debtor, &amount)?;
        self.append_batch(BASELINE_REF, as_of, batch)
    }

    /// Post a reversing correction for every entry of a prior transaction
    ///
    /// Entries are never deleted or mutated; this is the only correction
    /// mechanism.
    pub fn post_reversal(
        &mut self,
        transaction_ref: &str,
        date: NaiveDate,
    ) -> LedgerResult<Vec<u64>> {
        let batch: Vec<PendingEntry> = self
            .entries
            .iter()
            .filter(|e| e.transaction_ref == transaction_ref)
            .map(|e| {
                let flipped = match e.entry_type {
                    EntryType::Debit => EntryType::Credit,
                    EntryType::Credit => EntryType::Debit,
                };
                PendingEntry::new(
                    e.account,
                    flipped,
                    e.amount.clone(),
                    Some(format!("reversal of #{}", e.sequence)),
                )
            })
            .collect();
        self.append_batch(transaction_ref, date, batch)
    }

    /// Validate and append a batch atomically, then re-check the invariants
    fn append_batch(
        &mut self,
        transaction_ref: &str,
        date: NaiveDate,
        batch: Vec<PendingEntry>,
    ) -> LedgerResult<Vec<u64>> {
        validate_batch(&batch)?;

        let posted_at = LedgerEntry::posting_time(date);
        let mut sequences = Vec::with_capacity(batch.len());
        for pending in batch {
            let entry = LedgerEntry {
                sequence: self.next_sequence,
                transaction_ref: transaction_ref.to_string(),
                account: pending.account,
                entry_type: pending.entry_type,
                amount: pending.amount,
                posted_at,
                note: pending.note,
            };
            self.next_sequence += 1;
            self.apply_to_balance(&entry);
            sequences.push(entry.sequence);
            self.entries.push(entry);
        }

        self.verify_invariants()?;
        Ok(sequences)
    }

    fn apply_to_balance(&mut self, entry: &LedgerEntry) {
        match (entry.account, entry.entry_type) {
            (Account::PartyA, EntryType::Debit) => self.balance_a += &entry.amount,
            (Account::PartyA, EntryType::Credit) => self.balance_a -= &entry.amount,
            (Account::PartyB, EntryType::Debit) => self.balance_b += &entry.amount,
            (Account::PartyB, EntryType::Credit) => self.balance_b -= &entry.amount,
            (Account::Clearing, _) => {}
        }
    }

    /// Signed running balance: positive means PartyA owes PartyB
    pub fn balance(&self) -> &BigDecimal {
        &self.balance_a
    }

    /// Human-oriented view of the running balance
    pub fn balance_view(&self) -> BalanceView {
        BalanceView::from_signed(&self.balance_a)
    }

    /// Recompute the signed balance from the full ledger
    ///
    /// The ledger is the single source of truth; this fold must always agree
    /// with the incrementally maintained value.
    pub fn recompute_balance(&self) -> BigDecimal {
        let mut balance = BigDecimal::from(0);
        for entry in &self.entries {
            match (entry.account, entry.entry_type) {
                (Account::PartyA, EntryType::Debit) => balance += &entry.amount,
                (Account::PartyA, EntryType::Credit) => balance -= &entry.amount,
                _ => {}
            }
        }
        balance
    }

    /// Check all ledger invariants
    ///
    /// Violations are fatal for the run; the ledger is preserved as-is.
    pub fn verify_invariants(&self) -> LedgerResult<()> {
        let zero = BigDecimal::from(0);

        let mut debits = BigDecimal::from(0);
        let mut credits = BigDecimal::from(0);
        let mut clearing = BigDecimal::from(0);
        let mut recomputed_b = BigDecimal::from(0);
        for entry in &self.entries {
            if entry.amount <= zero {
                return self.violated(format!(
                    "entry #{} has non-positive amount {}",
                    entry.sequence, entry.amount
                ));
            }
            match entry.entry_type {
                EntryType::Debit => debits += &entry.amount,
                EntryType::Credit => credits += &entry.amount,
            }
            match (entry.account, entry.entry_type) {
                (Account::Clearing, EntryType::Debit) => clearing += &entry.amount,
                (Account::Clearing, EntryType::Credit) => clearing -= &entry.amount,
                (Account::PartyB, EntryType::Debit) => recomputed_b += &entry.amount,
                (Account::PartyB, EntryType::Credit) => recomputed_b -= &entry.amount,
                _ => {}
            }
        }

        if debits != credits {
            return self.violated(format!(
                "total debits {debits} do not equal total credits {credits}"
            ));
        }
        let recomputed_a = self.recompute_balance();
        if recomputed_a != self.balance_a {
            return self.violated(format!(
                "recomputed balance {recomputed_a} disagrees with running balance {}",
                self.balance_a
            ));
        }
        if recomputed_b != self.balance_b {
            return self.violated(format!(
                "recomputed PartyB balance {recomputed_b} disagrees with running balance {}",
                self.balance_b
            ));
        }
        if self.balance_a != -self.balance_b.clone() {
            return self.violated(format!(
                "party balances are not mirrored: A owes {}, B owes {}",
                self.balance_a, self.balance_b
            ));
        }
        if clearing != zero {
            return self.violated(format!("clearing account does not net to zero: {clearing}"));
        }

        Ok(())
    }

    fn violated(&self, detail: String) -> LedgerResult<()> {
        error!(detail = %detail, entries = self.entries.len(), "ledger invariant violated");
        Err(LedgerError::InvariantViolation(detail))
    }

    /// All entries appended so far, in sequence order
    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }

    /// Consume the engine, yielding the final ledger
    pub fn into_entries(self) -> Vec<LedgerEntry> {
        self.entries
    }
}
