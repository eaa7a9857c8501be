//! Rule-based description decoder
//!
//! Maps a transaction's free-text description to a semantic classification
//! and split directive. The matcher is an ordered, declarative table of
//! rules evaluated top to bottom; the first full match wins. Rules are
//! required to be mutually exclusive on their canonical examples, which
//! [`verify_rule_exclusivity`] checks.

use bigdecimal::BigDecimal;

use crate::types::{Category, Classification, Confidence, Party, SplitDirective};

/// One row of the classification table
#[derive(Debug)]
pub struct Rule {
    /// Stable rule name, reported on the classification
    pub name: &'static str,
    /// Keyword set; single words match on word boundaries, phrases as
    /// substrings
    pub keywords: &'static [&'static str],
    /// A description this rule, and only this rule, must match
    pub canonical_example: &'static str,
    pub category: Category,
    pub split: SplitDirective,
    /// Confidence a lone match in this rule carries
    pub confidence: Confidence,
}

/// Ordered rule table. Precedence: settlement markers, then explicit
/// category keywords, then the literal multiplier marker, then gift
/// markers. Anything else falls through to the default 50/50 expense.
static RULES: [Rule; 9] = [
    Rule {
        name: "settlement_transfer",
        keywords: &["venmo", "zelle", "interac", "cash app"],
        canonical_example: "Venmo payment",
        category: Category::Settlement,
        split: SplitDirective::FullReimbursement,
        confidence: Confidence::Normal,
    },
    Rule {
        name: "rent",
        keywords: &["rent", "lease"],
        canonical_example: "Monthly rent",
        category: Category::Rent,
        // Placeholder: the reconciler substitutes the configured rent split.
        split: SplitDirective::EvenSplit,
        confidence: Confidence::Normal,
    },
    Rule {
        name: "utilities",
        keywords: &[
            "hydro",
            "electric",
            "electricity",
            "internet",
            "utility",
            "utilities",
            "water",
        ],
        canonical_example: "Hydro electricity bill",
        category: Category::Expense,
        split: SplitDirective::EvenSplit,
        confidence: Confidence::Normal,
    },
    Rule {
        name: "groceries",
        keywords: &["grocery", "groceries", "supermarket", "costco"],
        canonical_example: "Weekly groceries",
        category: Category::Expense,
        split: SplitDirective::EvenSplit,
        confidence: Confidence::Normal,
    },
    Rule {
        name: "dining",
        keywords: &["restaurant", "dining", "takeout", "cafe"],
        canonical_example: "Thai restaurant",
        category: Category::Expense,
        split: SplitDirective::EvenSplit,
        confidence: Confidence::Normal,
    },
    Rule {
        name: "household_income",
        keywords: &["rebate", "cashback", "payout"],
        canonical_example: "Credit card cashback",
        category: Category::Income,
        split: SplitDirective::EvenSplit,
        confidence: Confidence::Normal,
    },
    Rule {
        // A literal "2x" in the description is a categorical marker meaning
        // the payer is reimbursed in full. It never doubles the amount.
        name: "full_reimbursement_marker",
        keywords: &["2x"],
        canonical_example: "2x movie tickets",
        category: Category::Expense,
        split: SplitDirective::FullReimbursement,
        confidence: Confidence::Normal,
    },
    Rule {
        name: "gift",
        keywords: &["gift", "birthday", "anniversary"],
        canonical_example: "Birthday gift",
        category: Category::Personal,
        split: SplitDirective::ExcludeFromSplit,
        confidence: Confidence::Normal,
    },
    Rule {
        // Bank-mechanical memos say nothing about what the money was for;
        // a human has to decide.
        name: "opaque_bank_memo",
        keywords: &["deposit", "withdrawal", "atm"],
        canonical_example: "ATM deposit",
        category: Category::Unrecognized,
        split: SplitDirective::ExcludeFromSplit,
        confidence: Confidence::Low,
    },
];

/// The classification rule table, in precedence order
pub fn rules() -> &'static [Rule] {
    &RULES
}

/// Classify a transaction description
///
/// Pure, deterministic, and total: unclassifiable input yields
/// `Unrecognized` at low confidence rather than an error. The amount sign,
/// payer, and source never influence the category; sign only affects ledger
/// direction downstream.
pub fn classify(
    description: &str,
    _amount: Option<&BigDecimal>,
    _payer: Party,
    _source: &str,
) -> Classification {
    if is_garbled(description) {
        return Classification {
            category: Category::Unrecognized,
            split: SplitDirective::ExcludeFromSplit,
            confidence: Confidence::Low,
            matched_rule: None,
        };
    }

    let normalized = description.to_lowercase();
    let matched: Vec<&Rule> = RULES.iter().filter(|r| rule_matches(r, &normalized)).collect();

    match matched.split_first() {
        None => Classification {
            // Default policy: unmatched but clean descriptions are shared
            // expenses split down the middle.
            category: Category::Expense,
            split: SplitDirective::EvenSplit,
            confidence: Confidence::Normal,
            matched_rule: None,
        },
        Some((winner, rest)) => Classification {
            category: winner.category,
            split: winner.split.clone(),
            confidence: if rest.is_empty() {
                winner.confidence
            } else {
                // More than one rule fired; precedence picked the winner but
                // a human should confirm.
                Confidence::Low
            },
            matched_rule: Some(winner.name),
        },
    }
}

/// Check that every rule's canonical example matches exactly one rule
///
/// Overlapping rules are a construction defect; this runs as a test so the
/// table cannot drift into ambiguity.
pub fn verify_rule_exclusivity() -> Result<(), String> {
    for rule in &RULES {
        let normalized = rule.canonical_example.to_lowercase();
        let matching: Vec<&str> = RULES
            .iter()
            .filter(|r| rule_matches(r, &normalized))
            .map(|r| r.name)
            .collect();
        if matching != [rule.name] {
            return Err(format!(
                "canonical example {:?} of rule '{}' matches rules {:?}",
                rule.canonical_example, rule.name, matching
            ));
        }
    }
    Ok(())
}

fn rule_matches(rule: &Rule, normalized: &str) -> bool {
    rule.keywords.iter().any(|kw| keyword_matches(normalized, kw))
}

fn keyword_matches(normalized: &str, keyword: &str) -> bool {
    if keyword.contains(' ') {
        normalized.contains(keyword)
    } else {
        normalized
            .split(|c: char| !c.is_ascii_alphanumeric())
            .any(|word| word == keyword)
    }
}

/// A description is garbled when it is empty, carries encoding artifacts,
/// or has no alphanumeric content at all
fn is_garbled(description: &str) -> bool {
    let trimmed = description.trim();
    trimmed.is_empty()
        || trimmed.contains('\u{FFFD}')
        || !trimmed.chars().any(|c| c.is_alphanumeric())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify_desc(description: &str) -> Classification {
        classify(description, None, Party::PartyA, "checking")
    }

    #[test]
    fn rule_table_is_mutually_exclusive() {
        verify_rule_exclusivity().unwrap();
    }

    #[test]
    fn canonical_examples_hit_their_own_rule() {
        for rule in rules() {
            let classification = classify_desc(rule.canonical_example);
            assert_eq!(classification.matched_rule, Some(rule.name));
            assert_eq!(classification.category, rule.category);
            assert_eq!(classification.confidence, rule.confidence);
        }
    }

    #[test]
    fn settlement_beats_expense_keywords() {
        // Precedence fixture: settlement markers win over any category
        // keyword appearing in the same description.
        let cases = [
            ("Venmo payment for groceries", Category::Settlement),
            ("Zelle transfer - rent share", Category::Settlement),
            ("Monthly rent via landlord portal", Category::Rent),
            ("Rent rebate from landlord", Category::Rent),
            ("Costco groceries", Category::Expense),
        ];
        for (description, expected) in cases {
            assert_eq!(
                classify_desc(description).category,
                expected,
                "description: {description}"
            );
        }
    }

    #[test]
    fn multiple_matches_lower_confidence() {
        let classification = classify_desc("Venmo payment for groceries");
        assert_eq!(classification.category, Category::Settlement);
        assert_eq!(classification.confidence, Confidence::Low);
    }

    #[test]
    fn multiplier_marker_means_full_reimbursement() {
        let classification = classify_desc("2x movie tickets");
        assert_eq!(classification.category, Category::Expense);
        assert_eq!(classification.split, SplitDirective::FullReimbursement);
    }

    #[test]
    fn gifts_are_personal_and_excluded() {
        let classification = classify_desc("Birthday gift for mom");
        assert_eq!(classification.category, Category::Personal);
        assert_eq!(classification.split, SplitDirective::ExcludeFromSplit);
        assert_eq!(classification.confidence, Confidence::Normal);
    }

    #[test]
    fn unmatched_description_falls_back_to_even_expense() {
        let classification = classify_desc("Hardware store");
        assert_eq!(classification.category, Category::Expense);
        assert_eq!(classification.split, SplitDirective::EvenSplit);
        assert_eq!(classification.confidence, Confidence::Normal);
        assert_eq!(classification.matched_rule, None);
    }

    #[test]
    fn empty_and_garbled_descriptions_are_unrecognized() {
        for description in ["", "   ", "\u{FFFD}\u{FFFD}\u{FFFD}", "???"] {
            let classification = classify_desc(description);
            assert_eq!(classification.category, Category::Unrecognized);
            assert_eq!(classification.confidence, Confidence::Low);
        }
    }

    #[test]
    fn keywords_match_whole_words_only() {
        // "rent" must not fire inside "parent" or "current".
        let classification = classify_desc("Parent teacher association dues");
        assert_eq!(classification.matched_rule, None);
        let classification = classify_desc("Current account fee");
        assert_eq!(classification.matched_rule, None);
    }

    #[test]
    fn opaque_bank_memos_are_low_confidence() {
        for description in ["Deposit", "ATM withdrawal"] {
            let classification = classify_desc(description);
            assert_eq!(classification.category, Category::Unrecognized);
            assert_eq!(classification.confidence, Confidence::Low);
        }
    }

    #[test]
    fn amount_sign_does_not_change_category() {
        use std::str::FromStr;
        let negative = BigDecimal::from_str("-25.00").unwrap();
        let positive = BigDecimal::from_str("25.00").unwrap();
        let a = classify("Weekly groceries", Some(&negative), Party::PartyA, "card");
        let b = classify("Weekly groceries", Some(&positive), Party::PartyB, "bank");
        assert_eq!(a.category, b.category);
        assert_eq!(a.split, b.split);
    }
}
