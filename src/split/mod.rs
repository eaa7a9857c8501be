//! Exact decimal split arithmetic
//!
//! Shares are computed in exact `BigDecimal`; no floating point. The
//! counterparty's visible share is kept at cent scale, rounded toward the
//! payer's favor, and the payer's share is derived by subtraction so the two
//! shares always sum exactly to the amount being split.

use bigdecimal::{BigDecimal, RoundingMode};

use crate::types::{LedgerError, LedgerResult, SplitDirective};

/// Breakdown of one transaction amount between the two parties
#[derive(Debug, Clone, PartialEq)]
pub struct SplitShares {
    /// Portion borne by the party who paid
    pub payer_share: BigDecimal,
    /// Portion owed back by the other party, at cent scale
    pub counterparty_share: BigDecimal,
    /// Sub-cent amount by which the counterparty share was rounded up;
    /// posted back as a micro-entry so the net owed equals the exact share
    pub rounding_remainder: BigDecimal,
}

impl SplitShares {
    /// Compute both parties' shares of a non-negative amount
    ///
    /// Fixed-percentage splits round the counterparty share toward the
    /// payer's favor (ceiling at cent scale) and report the sub-cent
    /// remainder separately. `payer_share + counterparty_share` always
    /// equals `amount` exactly.
    pub fn compute(amount: &BigDecimal, directive: &SplitDirective) -> LedgerResult<Self> {
        let zero = BigDecimal::from(0);
        if *amount < zero {
            return Err(LedgerError::NonPositiveAmount(amount.clone()));
        }

        match directive {
            SplitDirective::ExcludeFromSplit => Ok(Self {
                payer_share: zero.clone(),
                counterparty_share: zero.clone(),
                rounding_remainder: zero,
            }),
            SplitDirective::FullReimbursement => Ok(Self {
                payer_share: zero.clone(),
                counterparty_share: amount.clone(),
                rounding_remainder: zero,
            }),
            SplitDirective::EvenSplit => Self::fixed_percent(amount, &BigDecimal::from(50)),
            SplitDirective::FixedPercent {
                counterparty_percent,
            } => Self::fixed_percent(amount, counterparty_percent),
        }
    }

    fn fixed_percent(amount: &BigDecimal, percent: &BigDecimal) -> LedgerResult<Self> {
        let zero = BigDecimal::from(0);
        let hundred = BigDecimal::from(100);
        if *percent < zero || *percent > hundred {
            return Err(LedgerError::InvariantViolation(format!(
                "split percentage must be between 0 and 100, got {percent}"
            )));
        }

        let raw = (amount * percent) / &hundred;
        let counterparty_share = raw.with_scale_round(2, RoundingMode::Ceiling);
        let rounding_remainder = &counterparty_share - &raw;
        let payer_share = amount - &counterparty_share;

        Ok(Self {
            payer_share,
            counterparty_share,
            rounding_remainder,
        })
    }

    /// Whether the split produced any shared liability at all
    pub fn is_zero(&self) -> bool {
        self.counterparty_share == BigDecimal::from(0)
    }
}
