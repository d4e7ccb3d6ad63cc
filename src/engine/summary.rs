use crate::core::balance::BalanceSheet;
use crate::core::expense::Expense;
use crate::core::participant::{ParticipantId, Roster};
use crate::core::settlement::SettlementPlan;
use crate::engine::aggregate::{aggregate, AggregationError};
use crate::engine::settle::{plan, PlanError};
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SummaryError {
    #[error(transparent)]
    Aggregation(#[from] AggregationError),
    #[error(transparent)]
    Plan(#[from] PlanError),
}

/// Balances and settlement plan for a group, computed from its full history.
#[derive(Debug, Clone, Serialize)]
pub struct GroupSummary {
    roster: Roster,
    balances: BalanceSheet,
    plan: SettlementPlan,
    total_spent: Decimal,
    expense_count: usize,
}

impl GroupSummary {
    /// Run aggregation and settlement planning over `expenses`.
    pub fn compute(roster: &Roster, expenses: &[Expense]) -> Result<Self, SummaryError> {
        let balances = aggregate(roster, expenses)?;
        let plan = plan(balances.balances())?;
        let total_spent = expenses.iter().try_fold(Decimal::ZERO, |acc, e| {
            acc.checked_add(e.amount())
                .ok_or(AggregationError::Overflow { expense: e.id() })
        })?;

        Ok(Self {
            roster: roster.clone(),
            balances,
            plan,
            total_spent,
            expense_count: expenses.len(),
        })
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn balances(&self) -> &BalanceSheet {
        &self.balances
    }

    pub fn plan(&self) -> &SettlementPlan {
        &self.plan
    }

    pub fn total_spent(&self) -> Decimal {
        self.total_spent
    }

    pub fn expense_count(&self) -> usize {
        self.expense_count
    }

    /// Peer-to-peer view for one participant.
    ///
    /// Returns `None` if `participant` is not in the roster.
    pub fn breakdown(&self, participant: &ParticipantId) -> Option<ParticipantBreakdown> {
        let net_amount = self.balances.get(participant)?;
        let entries = self
            .plan
            .involving(participant)
            .map(|s| {
                if &s.from == participant {
                    BreakdownEntry {
                        direction: Direction::Owes,
                        counterparty: s.to.clone(),
                        amount: s.amount,
                    }
                } else {
                    BreakdownEntry {
                        direction: Direction::IsOwed,
                        counterparty: s.from.clone(),
                        amount: s.amount,
                    }
                }
            })
            .collect();

        Some(ParticipantBreakdown {
            participant: participant.clone(),
            net_amount,
            entries,
        })
    }
}

impl fmt::Display for GroupSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Participants:   {}", self.roster)?;
        writeln!(f, "Expenses:       {}", self.expense_count)?;
        writeln!(f, "Total Spent:    {}", self.total_spent)?;
        writeln!(f)?;
        write!(f, "{}", self.balances)?;
        writeln!(f)?;
        write!(f, "{}", self.plan)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Owes,
    IsOwed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BreakdownEntry {
    pub direction: Direction,
    pub counterparty: ParticipantId,
    pub amount: Decimal,
}

/// A participant's net balance and the settlements that concern them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParticipantBreakdown {
    pub participant: ParticipantId,
    pub net_amount: Decimal,
    pub entries: Vec<BreakdownEntry>,
}

impl ParticipantBreakdown {
    /// Total this participant still has to pay out.
    pub fn total_owed(&self) -> Decimal {
        self.entries
            .iter()
            .filter(|e| e.direction == Direction::Owes)
            .map(|e| e.amount)
            .sum()
    }

    /// Total this participant still has to receive.
    pub fn total_receivable(&self) -> Decimal {
        self.entries
            .iter()
            .filter(|e| e.direction == Direction::IsOwed)
            .map(|e| e.amount)
            .sum()
    }
}

impl fmt::Display for ParticipantBreakdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.net_amount > Decimal::ZERO { "+" } else { "" };
        writeln!(f, "=== {} ===", self.participant)?;
        writeln!(f, "Net Balance: {}{}", sign, self.net_amount)?;
        if self.entries.is_empty() {
            writeln!(f, "All settled up with everyone.")?;
        }
        for e in &self.entries {
            match e.direction {
                Direction::Owes => writeln!(f, "  Owes {:<15} {:>12}", e.counterparty, e.amount)?,
                Direction::IsOwed => {
                    writeln!(f, "  Is owed by {:<9} {:>12}", e.counterparty, e.amount)?
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn setup() -> (Roster, Vec<Expense>) {
        let roster = Roster::new(["A", "B", "C"]).unwrap();
        let p = |n: &str| roster.resolve(n).unwrap();
        let expenses = vec![
            Expense::new(p("A"), dec!(90), vec![p("A"), p("B"), p("C")], "Groceries").unwrap(),
            Expense::new(p("B"), dec!(30), vec![p("B"), p("C")], "Cab").unwrap(),
        ];
        (roster, expenses)
    }

    #[test]
    fn test_summary_totals() {
        let (roster, expenses) = setup();
        let summary = GroupSummary::compute(&roster, &expenses).unwrap();
        assert_eq!(summary.total_spent(), dec!(120));
        assert_eq!(summary.expense_count(), 2);
        assert_eq!(summary.plan().len(), 2);
        assert!(summary.balances().is_balanced());
    }

    #[test]
    fn test_breakdown_directions() {
        let (roster, expenses) = setup();
        let summary = GroupSummary::compute(&roster, &expenses).unwrap();

        let a = summary.breakdown(&roster.resolve("A").unwrap()).unwrap();
        assert_eq!(a.net_amount, dec!(60));
        assert!(a.entries.iter().all(|e| e.direction == Direction::IsOwed));
        assert_eq!(a.total_receivable(), dec!(60));

        let c = summary.breakdown(&roster.resolve("C").unwrap()).unwrap();
        assert_eq!(c.total_owed(), dec!(45));
        assert_eq!(c.entries[0].counterparty.as_str(), "A");
    }

    #[test]
    fn test_breakdown_unknown_participant() {
        let (roster, expenses) = setup();
        let summary = GroupSummary::compute(&roster, &expenses).unwrap();
        let other = Roster::new(["Z"]).unwrap();
        assert!(summary.breakdown(&other.resolve("Z").unwrap()).is_none());
    }

    #[test]
    fn test_settled_participant_display() {
        let roster = Roster::new(["A", "B"]).unwrap();
        let summary = GroupSummary::compute(&roster, &[]).unwrap();
        let a = summary.breakdown(&roster.resolve("A").unwrap()).unwrap();
        assert!(format!("{}", a).contains("All settled up"));
    }

    #[test]
    fn test_overflow_surfaces_as_error() {
        let roster = Roster::new(["A", "B"]).unwrap();
        let p = |n: &str| roster.resolve(n).unwrap();
        let huge = Decimal::MAX / dec!(1.5);
        let expenses = vec![
            Expense::new(p("A"), huge, vec![p("B")], "").unwrap(),
            Expense::new(p("B"), huge, vec![p("A")], "").unwrap(),
        ];
        assert!(matches!(
            GroupSummary::compute(&roster, &expenses),
            Err(SummaryError::Aggregation(AggregationError::Overflow { .. }))
        ));
    }
}
