//! Per-participant view of a settlement plan.
//!
//! Generates a random group, then shows what each member owes or is owed
//! and to whom.

use splitledger::prelude::*;
use splitledger::simulation::random_ledger::{generate_random_ledger, LedgerConfig};
use rust_decimal_macros::dec;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("╔══════════════════════════════════════╗");
    println!("║  splitledger: Breakdown Example      ║");
    println!("╚══════════════════════════════════════╝\n");

    let config = LedgerConfig {
        participant_count: 6,
        expense_count: 25,
        max_amount: dec!(800),
        ..Default::default()
    };
    let (roster, expenses) = generate_random_ledger(&config)?;
    let summary = GroupSummary::compute(&roster, &expenses)?;

    println!("{}", summary);

    println!("━━━ Per Participant ━━━\n");
    for participant in roster.iter() {
        if let Some(breakdown) = summary.breakdown(participant) {
            println!("{}", breakdown);
        }
    }

    Ok(())
}
