//! Classification rule table walkthrough

use splitledger_core::decoder::{classify, rules, verify_rule_exclusivity};
use splitledger_core::Party;

fn main() {
    println!("🔎 Splitledger Core - Classification Rules Example\n");

    println!("📋 Rule table, in precedence order:");
    for rule in rules() {
        println!(
            "  {:<28} {:<13} keywords: {}",
            rule.name,
            rule.category.to_string(),
            rule.keywords.join(", ")
        );
    }
    println!();

    match verify_rule_exclusivity() {
        Ok(()) => println!("  ✓ Rules are mutually exclusive on their canonical examples\n"),
        Err(detail) => println!("  ✗ Rule overlap: {detail}\n"),
    }

    let descriptions = [
        "Venmo payment for groceries",
        "Monthly rent",
        "Hydro electricity bill",
        "Weekly groceries",
        "2x movie tickets",
        "Birthday gift",
        "Deposit",
        "Hardware store",
        "",
    ];

    println!("🏷  Classifications:");
    for description in descriptions {
        let classification = classify(description, None, Party::PartyA, "visa");
        println!(
            "  {:<28} → {:<13} split: {:?}, confidence: {:?}",
            if description.is_empty() {
                "(empty)"
            } else {
                description
            },
            classification.category.to_string(),
            classification.split,
            classification.confidence,
        );
    }
}
