use crate::core::balance::Balance;
use crate::core::money::{is_settled, round_amount, TOLERANCE};
use crate::core::settlement::{Settlement, SettlementPlan};
use log::{debug, warn};
use rust_decimal::Decimal;
use thiserror::Error;

/// Errors raised by the settlement planner.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlanError {
    /// The supplied balances do not net to zero. This is a bug in whoever
    /// produced them; a partial plan would be misleading.
    #[error("balances do not net to zero (total {total}); refusing to plan settlements")]
    Unbalanced { total: Decimal },
    /// Credits or debits sum past the range of `Decimal`.
    #[error("balances are too large to total")]
    Overflow,
}

/// Reduce net balances to a short list of point-to-point payments.
///
/// Greedy largest-first pairing: the biggest debtor pays the biggest
/// creditor as much as either can absorb, then whichever side is cleared
/// moves on. Not proven globally minimal, but never produces more than
/// `debtors + creditors - 1` payments.
///
/// # Algorithm
///
/// 1. Reject balances whose total is outside the tolerance band, or whose
///    credits or debits cannot be totalled.
/// 2. Split into debtors (`< -0.01`) and creditors (`> 0.01`); anything in
///    between is already settled and ignored.
/// 3. Sort debtors most negative first and creditors most positive first.
///    Sorting is stable, so ties keep their input order.
/// 4. Walk both lists with a cursor each, transferring
///    `min(|debtor|, creditor)` and advancing each cursor once its working
///    balance drops below the tolerance.
///
/// # Examples
///
/// ```
/// use splitledger::prelude::*;
/// use rust_decimal_macros::dec;
///
/// let roster = Roster::new(["A", "B"]).unwrap();
/// let a = roster.resolve("A").unwrap();
/// let b = roster.resolve("B").unwrap();
///
/// let plan = plan(&[Balance::new(a.clone(), dec!(50)), Balance::new(b.clone(), dec!(-50))]).unwrap();
/// assert_eq!(plan.settlements(), &[Settlement { from: b, to: a, amount: dec!(50) }]);
/// ```
pub fn plan(balances: &[Balance]) -> Result<SettlementPlan, PlanError> {
    // Credits and debits are totalled apart so every later transfer sum fits.
    let credit = checked_total(balances.iter().filter(|b| b.net_amount > Decimal::ZERO))?;
    let debit = checked_total(balances.iter().filter(|b| b.net_amount < Decimal::ZERO))?;
    let total = credit + debit;
    if !is_settled(total) {
        return Err(PlanError::Unbalanced { total });
    }

    let mut debtors: Vec<Balance> = balances.iter().filter(|b| b.is_debtor()).cloned().collect();
    let mut creditors: Vec<Balance> = balances
        .iter()
        .filter(|b| b.is_creditor())
        .cloned()
        .collect();

    debtors.sort_by(|a, b| a.net_amount.cmp(&b.net_amount));
    creditors.sort_by(|a, b| b.net_amount.cmp(&a.net_amount));

    let mut settlements = Vec::with_capacity(debtors.len() + creditors.len());
    let mut i = 0;
    let mut j = 0;

    while i < debtors.len() && j < creditors.len() {
        let debtor = &mut debtors[i];
        let creditor = &mut creditors[j];

        let transfer = debtor.net_amount.abs().min(creditor.net_amount);
        if transfer > Decimal::ZERO {
            settlements.push(Settlement {
                from: debtor.participant.clone(),
                to: creditor.participant.clone(),
                amount: round_amount(transfer),
            });
        }

        debtor.net_amount += transfer;
        creditor.net_amount -= transfer;

        // Both may advance when the transfer clears both sides.
        if debtor.net_amount.abs() < TOLERANCE {
            i += 1;
        }
        if creditor.net_amount < TOLERANCE {
            j += 1;
        }
    }

    let residual: Vec<Balance> = debtors[i..]
        .iter()
        .chain(creditors[j..].iter())
        .filter(|b| !b.is_settled())
        .cloned()
        .collect();

    if !residual.is_empty() {
        warn!(
            "settlement left {} balance(s) outside tolerance: {}",
            residual.len(),
            residual
                .iter()
                .map(|b| format!("{}={}", b.participant, b.net_amount))
                .collect::<Vec<_>>()
                .join(", ")
        );
    }

    debug!(
        "planned {} settlement(s) for {} debtor(s) and {} creditor(s)",
        settlements.len(),
        debtors.len(),
        creditors.len()
    );

    Ok(SettlementPlan::new(settlements, residual))
}

fn checked_total<'a>(mut balances: impl Iterator<Item = &'a Balance>) -> Result<Decimal, PlanError> {
    balances
        .try_fold(Decimal::ZERO, |acc, b| acc.checked_add(b.net_amount))
        .ok_or(PlanError::Overflow)
}
