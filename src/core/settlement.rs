use crate::core::balance::Balance;
use crate::core::money::is_settled;
use crate::core::participant::ParticipantId;
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;

/// A single directed payment: `from` pays `to` the given `amount`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Settlement {
    pub from: ParticipantId,
    pub to: ParticipantId,
    /// Always positive.
    pub amount: Decimal,
}

impl fmt::Display for Settlement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} pays {} {}", self.from, self.to, self.amount)
    }
}

/// Ordered list of settlements produced by the planner.
///
/// `residual` holds any working balance the greedy pass left outside the
/// tolerance band. It is empty for every well-formed sheet except when
/// several balances sit exactly on the tolerance edge.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SettlementPlan {
    settlements: Vec<Settlement>,
    residual: Vec<Balance>,
}

impl SettlementPlan {
    pub(crate) fn new(settlements: Vec<Settlement>, residual: Vec<Balance>) -> Self {
        Self {
            settlements,
            residual,
        }
    }

    pub fn settlements(&self) -> &[Settlement] {
        &self.settlements
    }

    pub fn residual(&self) -> &[Balance] {
        &self.residual
    }

    /// Whether applying the plan clears every balance.
    pub fn is_complete(&self) -> bool {
        self.residual.is_empty()
    }

    pub fn len(&self) -> usize {
        self.settlements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.settlements.is_empty()
    }

    /// Sum of all settlement amounts.
    pub fn total_transferred(&self) -> Decimal {
        self.settlements.iter().map(|s| s.amount).sum()
    }

    /// Settlements in which `participant` pays or receives.
    pub fn involving<'a>(
        &'a self,
        participant: &'a ParticipantId,
    ) -> impl Iterator<Item = &'a Settlement> + 'a {
        self.settlements
            .iter()
            .filter(move |s| &s.from == participant || &s.to == participant)
    }

    /// Apply every settlement, in order, to `balances`.
    ///
    /// The payer's balance rises by the amount and the payee's falls by it.
    /// Participants not present in `balances` are ignored.
    pub fn apply_to(&self, balances: &[Balance]) -> Vec<Balance> {
        let mut out = balances.to_vec();
        for s in &self.settlements {
            for b in out.iter_mut() {
                if b.participant == s.from {
                    b.net_amount += s.amount;
                } else if b.participant == s.to {
                    b.net_amount -= s.amount;
                }
            }
        }
        out
    }

    /// Whether applying the plan brings every balance within tolerance.
    pub fn settles(&self, balances: &[Balance]) -> bool {
        self.apply_to(balances)
            .iter()
            .all(|b| is_settled(b.net_amount))
    }
}

impl<'a> IntoIterator for &'a SettlementPlan {
    type Item = &'a Settlement;
    type IntoIter = std::slice::Iter<'a, Settlement>;

    fn into_iter(self) -> Self::IntoIter {
        self.settlements.iter()
    }
}

impl fmt::Display for SettlementPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Settlement Plan ===")?;
        if self.settlements.is_empty() {
            writeln!(f, "No debts to settle. Everyone is square.")?;
        }
        for s in &self.settlements {
            writeln!(f, "  {:<15} pays {:<15} {:>12}", s.from, s.to, s.amount)?;
        }
        if !self.residual.is_empty() {
            writeln!(f, "\nUnsettled residue:")?;
            for b in &self.residual {
                writeln!(f, "  {:<15} {:>12}", b.participant, b.net_amount)?;
            }
        }
        Ok(())
    }
}
