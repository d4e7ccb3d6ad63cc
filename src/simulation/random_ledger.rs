//! Random expense histories for benchmarks and manual testing.
//!
//! Generates a roster and a batch of expenses with random payers, amounts
//! and beneficiary subsets.

use crate::core::expense::{Expense, ExpenseError};
use crate::core::participant::Roster;
use chrono::{Duration, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// Configuration for generating a random expense history.
#[derive(Debug, Clone)]
pub struct LedgerConfig {
    /// Number of participants in the roster.
    pub participant_count: usize,
    /// Number of expenses to generate.
    pub expense_count: usize,
    /// Minimum expense amount.
    pub min_amount: Decimal,
    /// Maximum expense amount.
    pub max_amount: Decimal,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            participant_count: 5,
            expense_count: 30,
            min_amount: Decimal::from(1),
            max_amount: Decimal::from(5_000),
        }
    }
}

/// Generate a roster of `PERSON-NNN` participants and a random expense history.
///
/// Exactly `expense_count` expenses are produced, stamped one minute apart
/// so the history is chronological. Amounts below one cent are raised to a
/// cent.
pub fn generate_random_ledger(
    config: &LedgerConfig,
) -> Result<(Roster, Vec<Expense>), ExpenseError> {
    let mut rng = rand::thread_rng();

    let names: Vec<String> = (0..config.participant_count.max(1))
        .map(|i| format!("PERSON-{:03}", i))
        .collect();
    let roster = Roster::new(&names)?;

    // Amounts are drawn in whole cents.
    let min_cents = to_cents(config.min_amount).max(1);
    let max_cents = to_cents(config.max_amount).max(min_cents.saturating_add(1));

    let start = Utc::now() - Duration::minutes(config.expense_count as i64);
    let mut expenses = Vec::with_capacity(config.expense_count);

    for n in 0..config.expense_count {
        let members = roster.members();
        let payer = members[rng.gen_range(0..members.len())].clone();

        let split_size = rng.gen_range(1..=members.len());
        let beneficiaries: Vec<_> = members
            .choose_multiple(&mut rng, split_size)
            .cloned()
            .collect();

        let amount = Decimal::new(rng.gen_range(min_cents..max_cents), 2);

        let memo = format!("expense #{}", n + 1);
        let expense = Expense::new(payer, amount, beneficiaries, memo)?;
        expenses.push(expense.with_recorded_at(start + Duration::minutes(n as i64)));
    }

    Ok((roster, expenses))
}

fn to_cents(amount: Decimal) -> i64 {
    let saturated = if amount.is_sign_negative() { 0 } else { i64::MAX };
    amount
        .checked_mul(Decimal::from(100))
        .and_then(|cents| cents.trunc().to_i64())
        .unwrap_or(saturated)
}
