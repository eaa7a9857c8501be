//! Basic reconciliation usage example

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use std::str::FromStr;

use splitledger_core::utils::MemoryReviewStore;
use splitledger_core::{
    export_review_queue, BalanceDirection, Baseline, NormalizedTransaction, Party,
    ReconciliationRun, RunConfig, SplitDirective,
};

fn dec(s: &str) -> BigDecimal {
    BigDecimal::from_str(s).unwrap()
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    splitledger_core::utils::init_tracing();

    println!("🧾 Splitledger Core - Basic Reconciliation Example\n");

    // 1. Normalized transactions arrive from an external loader
    let transactions = vec![
        NormalizedTransaction::new(
            "txn001",
            "chase_checking",
            date(2024, 10, 1),
            "Monthly rent",
            Some(dec("2000.00")),
            Party::PartyA,
        ),
        NormalizedTransaction::new(
            "txn002",
            "visa",
            date(2024, 10, 5),
            "Weekly groceries",
            Some(dec("84.50")),
            Party::PartyB,
        ),
        NormalizedTransaction::new(
            "txn003",
            "venmo",
            date(2024, 10, 20),
            "Venmo payment",
            Some(dec("400.00")),
            Party::PartyB,
        ),
        NormalizedTransaction::new(
            "txn004",
            "scanned_csv",
            date(2024, 10, 22),
            "Thai restaurant",
            None,
            Party::PartyA,
        ),
    ];

    // 2. Configure the run: rent is split 43/57 with PartyA paying upfront
    let config = RunConfig {
        rent_split: SplitDirective::FixedPercent {
            counterparty_percent: dec("43"),
        },
        rent_payer: Some(Party::PartyA),
        ..RunConfig::default()
    };

    // 3. Start from the balance the parties last agreed on
    let baseline = Baseline::new(
        date(2024, 9, 30),
        dec("1577.08"),
        BalanceDirection::PartyBOwesPartyA,
    );

    println!("⚙️  Running reconciliation from the 2024-09-30 baseline...\n");
    let run = ReconciliationRun::from_baseline(Some(baseline), config, transactions)?;
    let report = run.execute()?;

    // 4. Inspect the results
    let summary = report.summary();
    println!("  ✓ Transactions processed: {}", summary.transactions_processed);
    println!("  ✓ Posted: {}", summary.posted);
    println!("  ✓ Flagged for review: {}", summary.flagged);
    println!("  ✓ Ledger entries: {}", summary.ledger_entries);
    println!();

    println!("📒 Ledger:");
    for entry in &report.ledger {
        println!(
            "  #{:<3} {:<10} {:?} {:?} ${}",
            entry.sequence, entry.transaction_ref, entry.account, entry.entry_type, entry.amount
        );
    }
    println!();

    println!("💰 Final balance: {}\n", report.balance_view());

    // 5. Export the review queue; every item ships, no exceptions
    let mut store = MemoryReviewStore::new();
    let exported = export_review_queue(&report, &mut store).await?;
    println!("📤 Exported {exported} review item(s):");
    for item in &report.review_queue {
        println!(
            "  ⚠ {} ({}) on {}: {}",
            item.transaction_ref, item.source, item.date, item.reason
        );
    }

    Ok(())
}
