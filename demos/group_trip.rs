//! A weekend trip, from receipts to payments.
//!
//! Records a handful of shared expenses, prints everyone's net balance and
//! the transfers that square the group.

use splitledger::prelude::*;
use rust_decimal_macros::dec;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("╔══════════════════════════════════════╗");
    println!("║  splitledger: Group Trip Example     ║");
    println!("╚══════════════════════════════════════╝\n");

    let roster = Roster::new(["Karam", "Vishal", "Aviral", "Utkarsh", "Manas"])?;
    let karam = roster.resolve("Karam")?;
    let vishal = roster.resolve("Vishal")?;
    let aviral = roster.resolve("Aviral")?;
    let utkarsh = roster.resolve("Utkarsh")?;
    let manas = roster.resolve("Manas")?;
    let everyone: Vec<ParticipantId> = roster.iter().cloned().collect();

    // --- Record expenses ---
    println!("━━━ Expenses ━━━\n");

    let mut log = ExpenseLog::new();
    log.record(karam.clone(), dec!(2500), everyone.clone(), "Hotel")?;
    log.record(
        vishal.clone(),
        dec!(600),
        vec![vishal.clone(), aviral.clone(), utkarsh.clone()],
        "Cab",
    )?;
    log.record(aviral.clone(), dec!(450.75), vec![karam.clone(), manas.clone()], "Snacks")?;
    log.record(utkarsh.clone(), dec!(1000), everyone, "Dinner")?;

    for expense in log.newest_first() {
        println!(
            "  {:<8} paid {:>8} for {:<8} split {} way(s)",
            expense.payer(),
            expense.amount(),
            expense.memo(),
            expense.beneficiaries().len()
        );
    }
    let total = log.total_spent().ok_or("expense total overflows")?;
    println!("\n  Total: {}\n", total);

    // --- Balances and settlements ---
    let summary = GroupSummary::compute(&roster, log.expenses())?;
    println!("{}", summary.balances());
    println!("{}", summary.plan());

    let gross: usize = log.expenses().iter().map(|e| e.beneficiaries().len()).sum();
    println!(
        "{} share(s) owed across {} expense(s) settle in {} payment(s).",
        gross,
        log.len(),
        summary.plan().len()
    );

    Ok(())
}
