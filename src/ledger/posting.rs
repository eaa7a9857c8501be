//! Posting construction for the two-party ledger

use bigdecimal::BigDecimal;

use crate::types::{Account, EntryType, LedgerError, LedgerResult, Party};

/// An entry awaiting sequence assignment and append
#[derive(Debug, Clone, PartialEq)]
pub struct PendingEntry {
    pub account: Account,
    pub entry_type: EntryType,
    pub amount: BigDecimal,
    pub note: Option<String>,
}

impl PendingEntry {
    pub fn new(
        account: Account,
        entry_type: EntryType,
        amount: BigDecimal,
        note: Option<String>,
    ) -> Self {
        Self {
            account,
            entry_type,
            amount,
            note,
        }
    }

    /// Create a debit entry
    pub fn debit(account: Account, amount: BigDecimal, note: Option<String>) -> Self {
        Self::new(account, EntryType::Debit, amount, note)
    }

    /// Create a credit entry
    pub fn credit(account: Account, amount: BigDecimal, note: Option<String>) -> Self {
        Self::new(account, EntryType::Credit, amount, note)
    }
}

/// Builder for balanced posting batches
///
/// `build` refuses unbalanced or non-positive batches, so a batch that
/// reaches the engine is structurally sound before anything is appended.
#[derive(Debug, Default)]
pub struct PostingBuilder {
    entries: Vec<PendingEntry>,
}

impl PostingBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a debit entry
    pub fn debit(mut self, account: Account, amount: BigDecimal, note: Option<String>) -> Self {
        self.entries.push(PendingEntry::debit(account, amount, note));
        self
    }

    /// Add a credit entry
    pub fn credit(mut self, account: Account, amount: BigDecimal, note: Option<String>) -> Self {
        self.entries.push(PendingEntry::credit(account, amount, note));
        self
    }

    /// Validate and return the batch
    pub fn build(self) -> LedgerResult<Vec<PendingEntry>> {
        validate_batch(&self.entries)?;
        Ok(self.entries)
    }
}

/// Check a batch balances with strictly positive amounts
pub fn validate_batch(entries: &[PendingEntry]) -> LedgerResult<()> {
    if entries.len() < 2 {
        return Err(LedgerError::EmptyPosting);
    }

    let zero = BigDecimal::from(0);
    for entry in entries {
        if entry.amount <= zero {
            return Err(LedgerError::NonPositiveAmount(entry.amount.clone()));
        }
    }

    let debits: BigDecimal = entries
        .iter()
        .filter(|e| e.entry_type == EntryType::Debit)
        .map(|e| &e.amount)
        .sum();
    let credits: BigDecimal = entries
        .iter()
        .filter(|e| e.entry_type == EntryType::Credit)
        .map(|e| &e.amount)
        .sum();
    if debits != credits {
        return Err(LedgerError::UnbalancedPosting { debits, credits });
    }

    Ok(())
}

/// Canned posting shapes for the two-party ledger
pub mod patterns {
    use super::*;

    /// Net pair for a shared amount: the debtor owes the creditor `share`.
    /// A non-zero `remainder` appends a reversing micro-entry pair so the
    /// net owed equals the exact unrounded share.
    pub fn shared_split(
        debtor: Party,
        creditor: Party,
        share: &BigDecimal,
        remainder: &BigDecimal,
    ) -> LedgerResult<Vec<PendingEntry>> {
        let mut builder = PostingBuilder::new()
            .debit(debtor.into(), share.clone(), None)
            .credit(creditor.into(), share.clone(), None);

        if *remainder > BigDecimal::from(0) {
            let note = Some("rounding remainder".to_string());
            builder = builder
                .debit(creditor.into(), remainder.clone(), note.clone())
                .credit(debtor.into(), remainder.clone(), note);
        }

        builder.build()
    }

    /// Settlement legs through the clearing account: `payer` hands money to
    /// the other party, reducing what the payer owes
    pub fn settlement(payer: Party, amount: &BigDecimal) -> LedgerResult<Vec<PendingEntry>> {
        let receiver = payer.other();
        let note = Some(format!("settlement paid by {payer}"));
        PostingBuilder::new()
            .debit(Account::Clearing, amount.clone(), note.clone())
            .credit(payer.into(), amount.clone(), note.clone())
            .debit(receiver.into(), amount.clone(), note.clone())
            .credit(Account::Clearing, amount.clone(), note)
            .build()
    }

    /// Opening-balance pair: `debtor` starts the run owing `amount`
    pub fn opening_balance(debtor: Party, amount: &BigDecimal) -> LedgerResult<Vec<PendingEntry>> {
        let note = Some("opening baseline".to_string());
        PostingBuilder::new()
            .debit(debtor.into(), amount.clone(), note.clone())
            .credit(debtor.other().into(), amount.clone(), note)
            .build()
    }
}
