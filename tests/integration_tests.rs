//! Integration tests for splitledger-core

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use std::str::FromStr;

use splitledger_core::{
    export_review_queue, Account, BalanceDirection, Baseline, Category, DateRange, Disposition,
    EntryType, IssueKind, MemoryReviewStore, NormalizedTransaction, Party, ReconciliationRun,
    Resolution, ReviewDecision, ReviewReason, ReviewStore, RunConfig, RunError, RunReport,
    SplitDirective,
};

fn dec(s: &str) -> BigDecimal {
    BigDecimal::from_str(s).unwrap()
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn txn(
    reference: &str,
    source: &str,
    d: NaiveDate,
    description: &str,
    amount: Option<&str>,
    payer: Party,
) -> NormalizedTransaction {
    NormalizedTransaction::new(reference, source, d, description, amount.map(dec), payer)
}

/// Household fixture: rent at 43/57 paid by PartyA upfront, groceries and
/// utilities split evenly, two opaque bank deposits, a settlement, shared
/// cashback, a gift, three amount-less records from a lossy export, one
/// garbled memo, and two high-value purchases.
fn household_transactions() -> Vec<NormalizedTransaction> {
    vec![
        txn("t01", "chase_checking", date(2024, 10, 1), "Monthly rent", Some("2000.00"), Party::PartyA),
        txn("t02", "visa", date(2024, 10, 5), "Weekly groceries", Some("84.50"), Party::PartyB),
        txn("t03", "visa", date(2024, 10, 12), "Hydro electricity bill", Some("120.00"), Party::PartyA),
        txn("t04", "chase_checking", date(2024, 10, 31), "Deposit", Some("8000.00"), Party::PartyA),
        txn("t05", "chase_checking", date(2024, 11, 1), "Deposit", Some("8000.00"), Party::PartyA),
        txn("t06", "venmo", date(2024, 11, 15), "Venmo payment", Some("500.00"), Party::PartyB),
        txn("t07", "chase_checking", date(2024, 12, 2), "Credit card cashback", Some("60.00"), Party::PartyA),
        txn("t08", "visa", date(2024, 12, 20), "Birthday gift", Some("45.00"), Party::PartyA),
        txn("t09", "scanned_csv", date(2025, 1, 8), "Weekly groceries", None, Party::PartyA),
        txn("t10", "scanned_csv", date(2025, 1, 9), "Thai restaurant", None, Party::PartyB),
        txn("t11", "scanned_csv", date(2025, 1, 10), "Monthly internet", None, Party::PartyA),
        txn("t12", "visa", date(2025, 1, 10), "Weekly groceries", Some("15000.00"), Party::PartyA),
        txn("t13", "visa", date(2025, 2, 14), "Monthly internet", Some("11000.00"), Party::PartyB),
        txn("t14", "visa", date(2025, 3, 3), "???", Some("25.00"), Party::PartyB),
    ]
}

fn household_config() -> RunConfig {
    RunConfig {
        rent_split: SplitDirective::FixedPercent {
            counterparty_percent: dec("43"),
        },
        rent_payer: Some(Party::PartyA),
        high_value_threshold: dec("10000"),
        coverage: Some(DateRange::new(date(2024, 10, 1), date(2025, 8, 2))),
    }
}

fn household_baseline() -> Baseline {
    // PartyB owed PartyA $1,577.08 when the parties last reconciled by hand.
    Baseline::new(date(2024, 9, 30), dec("1577.08"), BalanceDirection::PartyBOwesPartyA)
}

fn run_household() -> RunReport {
    ReconciliationRun::from_baseline(
        Some(household_baseline()),
        household_config(),
        household_transactions(),
    )
    .unwrap()
    .execute()
    .unwrap()
}

#[test]
fn household_run_produces_the_expected_balance() {
    let report = run_household();

    // Hand-computed: -1577.08 (baseline) - 860 (rent, 43% of 2000)
    // + 42.25 (groceries paid by B) - 60 (hydro) + 500 (settlement by B)
    // + 30 (cashback received by A) - 7500 (t12) + 5500 (t13).
    assert_eq!(report.final_balance, dec("-3924.83"));
    assert_eq!(report.balance_view().to_string(), "PartyB owes PartyA $3924.83");

    let summary = report.summary();
    assert_eq!(summary.transactions_processed, 14);
    assert_eq!(summary.posted, 7);
    assert_eq!(summary.flagged, 6);
    assert_eq!(summary.excluded, 1);
    assert_eq!(summary.ledger_entries, 18);
}

#[test]
fn household_run_counts_quality_issues_by_kind() {
    let report = run_household();
    assert_eq!(report.issue_count(IssueKind::MissingAmount), 3);
    assert_eq!(report.issue_count(IssueKind::SuspiciousAmount), 2);
    assert_eq!(report.issue_count(IssueKind::DateAnomaly), 0);
    assert_eq!(report.issues.len(), 5);
}

#[test]
fn household_run_queues_the_opaque_deposits() {
    let report = run_household();
    assert_eq!(report.review_queue.len(), 8);

    let deposits: Vec<_> = report
        .review_queue
        .iter()
        .filter(|item| item.description == "Deposit")
        .collect();
    assert_eq!(deposits.len(), 2);
    assert_eq!(deposits[0].date, date(2024, 10, 31));
    assert_eq!(deposits[0].amount, Some(dec("8000.00")));
    assert_eq!(deposits[0].reason, ReviewReason::UnrecognizedDescription);
    assert_eq!(deposits[1].date, date(2024, 11, 1));
    assert_eq!(deposits[1].amount, Some(dec("8000.00")));

    // Quality triggers and classification triggers stay distinguishable.
    let suspicious = report
        .review_queue
        .iter()
        .filter(|item| item.reason == ReviewReason::SuspiciousAmount)
        .count();
    let missing = report
        .review_queue
        .iter()
        .filter(|item| item.reason == ReviewReason::MissingAmount)
        .count();
    assert_eq!(suspicious, 2);
    assert_eq!(missing, 3);
}

#[test]
fn ledger_debits_equal_credits_exactly() {
    let report = run_household();
    let debits: BigDecimal = report
        .ledger
        .iter()
        .filter(|e| e.entry_type == EntryType::Debit)
        .map(|e| e.amount.clone())
        .sum();
    let credits: BigDecimal = report
        .ledger
        .iter()
        .filter(|e| e.entry_type == EntryType::Credit)
        .map(|e| e.amount.clone())
        .sum();
    assert_eq!(debits, credits);

    let clearing: BigDecimal = report
        .ledger
        .iter()
        .filter(|e| e.account == Account::Clearing)
        .map(|e| match e.entry_type {
            EntryType::Debit => e.amount.clone(),
            EntryType::Credit => -e.amount.clone(),
        })
        .sum();
    assert_eq!(clearing, dec("0"));
}

#[test]
fn audit_trail_reconstructs_the_final_balance() {
    let report = run_household();
    assert_eq!(report.reconstruct_balance_from_audit(), report.final_balance);
}

#[test]
fn from_scratch_agrees_with_from_baseline() {
    let cutoff = date(2024, 12, 31);
    let all = household_transactions();
    let config = household_config();

    // Replay only the history up to the cutoff to derive a baseline.
    let upto: Vec<_> = all.iter().filter(|t| t.date <= cutoff).cloned().collect();
    let checkpoint = ReconciliationRun::from_scratch(config.clone(), upto)
        .execute()
        .unwrap();
    let baseline = Baseline::new(
        cutoff,
        checkpoint.balance_view().amount,
        checkpoint.balance_view().direction,
    );

    let from_baseline = ReconciliationRun::from_baseline(Some(baseline), config.clone(), all.clone())
        .unwrap()
        .execute()
        .unwrap();
    let from_scratch = ReconciliationRun::from_scratch(config, all)
        .execute()
        .unwrap();

    assert_eq!(from_baseline.final_balance, from_scratch.final_balance);
}

#[test]
fn runs_are_deterministic_regardless_of_input_order() {
    let config = household_config();
    let forward = ReconciliationRun::from_scratch(config.clone(), household_transactions())
        .execute()
        .unwrap();

    let mut shuffled = household_transactions();
    shuffled.reverse();
    shuffled.swap(2, 9);
    let reordered = ReconciliationRun::from_scratch(config, shuffled)
        .execute()
        .unwrap();

    assert_eq!(forward.final_balance, reordered.final_balance);
    assert_eq!(forward.ledger, reordered.ledger);
    assert_eq!(forward.audit_trail, reordered.audit_trail);
    assert_eq!(forward.review_queue, reordered.review_queue);
}

#[tokio::test]
async fn every_review_item_is_exported() {
    let report = run_household();
    let mut store = MemoryReviewStore::new();
    let exported = export_review_queue(&report, &mut store).await.unwrap();

    assert_eq!(exported, report.review_queue.len());
    assert_eq!(store.list_items().await.unwrap(), report.review_queue);
}

#[tokio::test]
async fn zero_amount_items_are_not_dropped_from_the_export() {
    // Regression guard: zero-amount review items were once silently
    // filtered out of the export, hiding flagged transactions entirely.
    let run = ReconciliationRun::from_scratch(
        RunConfig::default(),
        vec![txn(
            "t1",
            "chase_checking",
            date(2024, 10, 31),
            "Deposit",
            Some("0"),
            Party::PartyA,
        )],
    );
    let report = run.execute().unwrap();
    assert_eq!(report.review_queue.len(), 1);
    assert_eq!(report.review_queue[0].amount, Some(dec("0")));

    let mut store = MemoryReviewStore::new();
    let exported = export_review_queue(&report, &mut store).await.unwrap();
    assert_eq!(exported, 1);
    assert_eq!(store.item_count(), 1);
}

#[test]
fn rent_split_43_57_has_no_rounding_leakage() {
    let config = RunConfig {
        rent_split: SplitDirective::FixedPercent {
            counterparty_percent: dec("43"),
        },
        rent_payer: Some(Party::PartyA),
        ..RunConfig::default()
    };
    let run = ReconciliationRun::from_scratch(
        config,
        vec![txn(
            "t1",
            "chase_checking",
            date(2024, 10, 1),
            "Monthly rent",
            Some("1000.00"),
            Party::PartyA,
        )],
    );
    let report = run.execute().unwrap();

    // One net pair at the counterparty share, no micro-entry.
    assert_eq!(report.ledger.len(), 2);
    assert!(report.ledger.iter().all(|e| e.amount == dec("430.00")));
    assert_eq!(report.final_balance, dec("-430.00"));

    // The shares partition the full amount exactly.
    let shares = splitledger_core::SplitShares::compute(
        &dec("1000.00"),
        &SplitDirective::FixedPercent {
            counterparty_percent: dec("43"),
        },
    )
    .unwrap();
    assert_eq!(&shares.payer_share + &shares.counterparty_share, dec("1000.00"));
    assert_eq!(shares.rounding_remainder, dec("0"));
}

#[test]
fn classification_precedence_is_stable() {
    let cases = [
        ("Venmo payment for groceries", Category::Settlement),
        ("Zelle rent share", Category::Settlement),
        ("Monthly rent", Category::Rent),
        ("Hydro electricity bill", Category::Expense),
        ("2x movie tickets", Category::Expense),
        ("Birthday gift", Category::Personal),
        ("Deposit", Category::Unrecognized),
    ];
    for (description, expected) in cases {
        let classification =
            splitledger_core::decoder::classify(description, None, Party::PartyA, "visa");
        assert_eq!(classification.category, expected, "description: {description}");
    }
    splitledger_core::decoder::verify_rule_exclusivity().unwrap();
}

#[test]
fn missing_baseline_is_fatal_before_processing() {
    let result =
        ReconciliationRun::from_baseline(None, RunConfig::default(), household_transactions());
    assert!(matches!(result, Err(RunError::MissingBaseline)));
}

#[tokio::test]
async fn resolved_decisions_post_on_the_next_pass() {
    // First pass: a lossy export left an amount behind, so the transaction
    // is flagged and exported.
    let transactions = vec![txn(
        "t1",
        "scanned_csv",
        date(2025, 1, 8),
        "Weekly groceries",
        None,
        Party::PartyA,
    )];
    let first = ReconciliationRun::from_scratch(RunConfig::default(), transactions.clone())
        .execute()
        .unwrap();
    assert_eq!(first.final_balance, dec("0"));

    let mut store = MemoryReviewStore::new();
    export_review_queue(&first, &mut store).await.unwrap();

    // A human supplies the amount out of band.
    store
        .save_decision(&ReviewDecision {
            transaction_ref: "t1".to_string(),
            resolution: Resolution::Post {
                category: Category::Expense,
                split: SplitDirective::EvenSplit,
                amount_override: Some(dec("84.50")),
            },
        })
        .await
        .unwrap();

    // Second pass re-ingests the decisions and posts the transaction.
    let decisions = store.list_decisions().await.unwrap();
    let second = ReconciliationRun::from_scratch(RunConfig::default(), transactions)
        .with_decisions(decisions)
        .execute()
        .unwrap();
    assert_eq!(second.final_balance, dec("-42.25"));
    assert!(second.review_queue.is_empty());
    assert!(matches!(
        second.audit_trail[0].disposition,
        Disposition::Posted { .. }
    ));
}

#[test]
fn review_decisions_round_trip_as_json() {
    // Decisions cross the review-store boundary as JSON.
    let decision = ReviewDecision {
        transaction_ref: "t05".to_string(),
        resolution: Resolution::Post {
            category: Category::Settlement,
            split: SplitDirective::FullReimbursement,
            amount_override: Some(dec("8000.00")),
        },
    };
    let json = serde_json::to_string(&decision).unwrap();
    let back: ReviewDecision = serde_json::from_str(&json).unwrap();
    assert_eq!(back, decision);

    let report = run_household();
    let rendered = serde_json::to_value(&report).unwrap();
    assert_eq!(
        dec(rendered["final_balance"].as_str().unwrap()),
        dec("-3924.83")
    );
    assert_eq!(
        rendered["review_queue"].as_array().unwrap().len(),
        report.review_queue.len()
    );
}

#[test]
fn excluded_personal_spending_leaves_an_audit_record() {
    let report = run_household();
    let gift = report
        .audit_trail
        .iter()
        .find(|r| r.transaction_ref == "t08")
        .unwrap();
    assert!(matches!(gift.disposition, Disposition::Excluded { .. }));
    assert_eq!(
        gift.classification.as_ref().map(|c| c.category),
        Some(Category::Personal)
    );
}
