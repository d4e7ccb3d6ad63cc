use crate::core::balance::{Balance, BalanceSheet};
use crate::core::expense::Expense;
use crate::core::money::{is_settled, round_amount, TOLERANCE};
use crate::core::participant::{ParticipantId, Roster};
use log::debug;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use thiserror::Error;
use uuid::Uuid;

/// Errors raised while folding expenses into balances.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AggregationError {
    #[error("expense {expense} references '{participant}', who is not in the roster")]
    UnknownParticipant {
        expense: Uuid,
        participant: ParticipantId,
    },
    #[error("amounts overflow the decimal range at expense {expense}")]
    Overflow { expense: Uuid },
    #[error("net balances overflow the decimal range")]
    BalanceOverflow,
}

/// Fold expenses into one net balance per roster member.
///
/// The payer of each expense gains `amount`; each beneficiary loses
/// `amount / |beneficiaries|`. A payer who is also a beneficiary keeps
/// `amount - share`. Every roster member gets an entry, even with no
/// activity, and entries come back in roster order.
///
/// # Algorithm
///
/// 1. Accumulate exactly in `Decimal`: what each member paid, and for each
///    split size, the total of the expenses they shared in.
/// 2. Turn those into one net amount per member and round it once, at the
///    end, to two decimal places.
/// 3. If the rounded sheet is more than one cent away from zero, hand the
///    surplus cents back by largest remainder so it sums to exactly zero.
///
/// Running totals are checked; amounts too large for `Decimal` give
/// [`AggregationError::Overflow`] instead of a panic.
///
/// The result does not depend on the order of `expenses`.
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
/// let expenses = vec![Expense::new(a.clone(), dec!(100), vec![a.clone(), b.clone()], "").unwrap()];
///
/// let sheet = aggregate(&roster, &expenses).unwrap();
/// assert_eq!(sheet.get(&a), Some(dec!(50)));
/// assert_eq!(sheet.get(&b), Some(dec!(-50)));
/// ```
pub fn aggregate<'a, I>(roster: &Roster, expenses: I) -> Result<BalanceSheet, AggregationError>
where
    I: IntoIterator<Item = &'a Expense>,
{
    let mut paid = vec![Decimal::ZERO; roster.len()];
    // Per participant: split size -> sum of amounts they share in.
    let mut consumed: Vec<BTreeMap<usize, Decimal>> = vec![BTreeMap::new(); roster.len()];
    // Bounds every partial sum of balances, so later arithmetic stays in range.
    let mut spent = Decimal::ZERO;
    let mut count = 0usize;

    for expense in expenses {
        let payer = slot(roster, expense, expense.payer())?;
        let beneficiaries = expense
            .beneficiaries()
            .iter()
            .map(|b| slot(roster, expense, b))
            .collect::<Result<Vec<_>, _>>()?;

        let overflow = || AggregationError::Overflow {
            expense: expense.id(),
        };
        let amount = expense.amount();
        spent = spent.checked_add(amount).ok_or_else(overflow)?;
        paid[payer] = paid[payer].checked_add(amount).ok_or_else(overflow)?;

        let split = beneficiaries.len();
        for idx in beneficiaries {
            let total = consumed[idx].entry(split).or_insert(Decimal::ZERO);
            *total = total.checked_add(amount).ok_or_else(overflow)?;
        }
        count += 1;
    }

    // Divide once per split size so the result is independent of expense order.
    let exact = paid
        .iter()
        .zip(&consumed)
        .map(|(paid, shares)| {
            let owed = shares.iter().try_fold(Decimal::ZERO, |acc, (split, total)| {
                acc.checked_add(*total / Decimal::from(*split))
            })?;
            paid.checked_sub(owed)
        })
        .collect::<Option<Vec<Decimal>>>()
        .ok_or(AggregationError::BalanceOverflow)?;
    let rounded = settle_rounding(&exact).ok_or(AggregationError::BalanceOverflow)?;

    debug!(
        "aggregated {} expense(s) totalling {} across {} participant(s)",
        count,
        spent,
        roster.len()
    );

    let balances = roster
        .iter()
        .zip(rounded)
        .map(|(p, amount)| Balance::new(p.clone(), amount))
        .collect();
    Ok(BalanceSheet::from_balances(balances))
}

fn slot(
    roster: &Roster,
    expense: &Expense,
    participant: &ParticipantId,
) -> Result<usize, AggregationError> {
    roster
        .position(participant)
        .ok_or_else(|| AggregationError::UnknownParticipant {
            expense: expense.id(),
            participant: participant.clone(),
        })
}

/// Round every accumulator, absorbing rounding drift beyond the tolerance.
///
/// Each value is rounded on its own. While the rounded total stays within
/// one cent of zero the values are reported as rounded. Past that, the
/// surplus cents are taken from (or given to) the accumulators whose
/// rounding moved them furthest in the offending direction, ties broken by
/// roster order, until the total is zero. Each result stays within one cent
/// of its exact value.
///
/// Returns `None` if the rounded values cannot be summed.
fn settle_rounding(exact: &[Decimal]) -> Option<Vec<Decimal>> {
    let mut rounded: Vec<Decimal> = exact.iter().map(|v| round_amount(*v)).collect();

    let drift = rounded
        .iter()
        .try_fold(Decimal::ZERO, |acc, v| acc.checked_add(*v))?;
    if is_settled(drift) {
        return Some(rounded);
    }
    let steps = (drift / TOLERANCE).round().to_i64()?;

    // error > 0: rounding pushed the value up.
    let mut order: Vec<usize> = (0..exact.len()).collect();
    let error = |i: usize| rounded[i] - exact[i];
    if steps > 0 {
        order.sort_by(|&a, &b| error(b).cmp(&error(a)));
    } else {
        order.sort_by(|&a, &b| error(a).cmp(&error(b)));
    }

    let adjust = if steps > 0 { -TOLERANCE } else { TOLERANCE };
    let targets: Vec<usize> = order.into_iter().take(steps.unsigned_abs() as usize).collect();
    for i in targets {
        rounded[i] += adjust;
    }

    debug!("redistributed {} cent(s) of rounding drift", steps.abs());
    Some(rounded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    struct Group {
        roster: Roster,
    }

    impl Group {
        fn new(names: &[&str]) -> Self {
            Self {
                roster: Roster::new(names).unwrap(),
            }
        }

        fn p(&self, name: &str) -> ParticipantId {
            self.roster.resolve(name).unwrap()
        }

        fn expense(&self, payer: &str, amount: Decimal, split: &[&str]) -> Expense {
            Expense::new(
                self.p(payer),
                amount,
                split.iter().map(|n| self.p(n)).collect(),
                "",
            )
            .unwrap()
        }
    }

    #[test]
    fn test_two_person_split() {
        let g = Group::new(&["A", "B"]);
        let sheet = aggregate(&g.roster, &[g.expense("A", dec!(100), &["A", "B"])]).unwrap();
        assert_eq!(sheet.get(&g.p("A")), Some(dec!(50)));
        assert_eq!(sheet.get(&g.p("B")), Some(dec!(-50)));
        assert_eq!(sheet.total(), Decimal::ZERO);
    }

    #[test]
    fn test_three_person_scenario() {
        let g = Group::new(&["A", "B", "C"]);
        let expenses = vec![
            g.expense("A", dec!(90), &["A", "B", "C"]),
            g.expense("B", dec!(30), &["B", "C"]),
        ];
        let sheet = aggregate(&g.roster, &expenses).unwrap();
        assert_eq!(sheet.get(&g.p("A")), Some(dec!(60)));
        assert_eq!(sheet.get(&g.p("B")), Some(dec!(-15)));
        assert_eq!(sheet.get(&g.p("C")), Some(dec!(-45)));
    }

    #[test]
    fn test_inactive_members_have_zero_entries() {
        let g = Group::new(&["A", "B", "C", "D"]);
        let sheet = aggregate(&g.roster, &[g.expense("A", dec!(10), &["B"])]).unwrap();
        assert_eq!(sheet.len(), 4);
        assert_eq!(sheet.get(&g.p("C")), Some(Decimal::ZERO));
        assert_eq!(sheet.get(&g.p("D")), Some(Decimal::ZERO));
    }

    #[test]
    fn test_no_expenses() {
        let g = Group::new(&["A", "B"]);
        let sheet = aggregate(&g.roster, &[]).unwrap();
        assert!(sheet.balances().iter().all(|b| b.net_amount == Decimal::ZERO));
    }

    #[test]
    fn test_self_only_expense_has_no_effect() {
        let g = Group::new(&["A", "B"]);
        let sheet = aggregate(&g.roster, &[g.expense("A", dec!(42.50), &["A"])]).unwrap();
        assert!(sheet.balances().iter().all(|b| b.net_amount == Decimal::ZERO));
    }

    #[test]
    fn test_payer_outside_split() {
        let g = Group::new(&["A", "B", "C"]);
        let sheet = aggregate(&g.roster, &[g.expense("A", dec!(30), &["B", "C"])]).unwrap();
        assert_eq!(sheet.get(&g.p("A")), Some(dec!(30)));
        assert_eq!(sheet.get(&g.p("B")), Some(dec!(-15)));
    }

    #[test]
    fn test_unknown_participant_is_rejected() {
        let g = Group::new(&["A", "B"]);
        let outsiders = Group::new(&["A", "Z"]);
        let expense = outsiders.expense("A", dec!(10), &["A", "Z"]);

        let err = aggregate(&g.roster, &[expense.clone()]).unwrap_err();
        assert_eq!(
            err,
            AggregationError::UnknownParticipant {
                expense: expense.id(),
                participant: outsiders.p("Z"),
            }
        );
    }

    #[test]
    fn test_thirds_round_independently() {
        let g = Group::new(&["A", "B", "C"]);
        let sheet = aggregate(&g.roster, &[g.expense("A", dec!(100), &["A", "B", "C"])]).unwrap();
        // Exact values are 66.666.., -33.333.., -33.333..
        assert_eq!(sheet.get(&g.p("A")), Some(dec!(66.67)));
        assert_eq!(sheet.get(&g.p("B")), Some(dec!(-33.33)));
        assert_eq!(sheet.get(&g.p("C")), Some(dec!(-33.33)));
        assert_eq!(sheet.total(), dec!(0.01));
        assert!(sheet.is_balanced());
    }

    #[test]
    fn test_rounding_drift_is_absorbed() {
        // Each of seven beneficiaries owes 0.00571.., which rounds to -0.01.
        let g = Group::new(&["P", "A", "B", "C", "D", "E", "F", "G"]);
        let sheet = aggregate(
            &g.roster,
            &[g.expense("P", dec!(0.04), &["A", "B", "C", "D", "E", "F", "G"])],
        )
        .unwrap();
        assert_eq!(sheet.total(), Decimal::ZERO);
        assert_eq!(sheet.get(&g.p("P")), Some(dec!(0.04)));
        let owed: Decimal = sheet
            .balances()
            .iter()
            .filter(|b| b.net_amount < Decimal::ZERO)
            .map(|b| b.net_amount)
            .sum();
        assert_eq!(owed, dec!(-0.04));
    }

    #[test]
    fn test_order_independence() {
        let g = Group::new(&["A", "B", "C"]);
        let mut expenses = vec![
            g.expense("A", dec!(10), &["A", "B", "C"]),
            g.expense("B", dec!(7.77), &["A", "C"]),
            g.expense("C", dec!(100), &["A", "B"]),
        ];
        let forward = aggregate(&g.roster, &expenses).unwrap();
        expenses.reverse();
        let backward = aggregate(&g.roster, &expenses).unwrap();
        assert_eq!(forward, backward);
    }

    #[test]
    fn test_overflowing_amounts_are_an_error() {
        let g = Group::new(&["A", "B"]);
        let huge = Decimal::MAX / dec!(1.5);
        let first = g.expense("A", huge, &["B"]);
        let second = g.expense("A", huge, &["B"]);

        let err = aggregate(&g.roster, &[first, second.clone()]).unwrap_err();
        assert_eq!(err, AggregationError::Overflow { expense: second.id() });
    }

    #[test]
    fn test_large_amounts_within_range() {
        let g = Group::new(&["A", "B"]);
        let big = Decimal::MAX / dec!(4);
        let sheet = aggregate(&g.roster, &[g.expense("A", big, &["A", "B"])]).unwrap();
        assert!(sheet.get(&g.p("A")).unwrap() > Decimal::ZERO);
        assert_eq!(sheet.total(), Decimal::ZERO);
    }
}
