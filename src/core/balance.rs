use crate::core::money::{is_settled, TOLERANCE};
use crate::core::participant::ParticipantId;
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;

/// A participant's aggregate position.
///
/// Positive means the participant is owed money; negative means they owe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Balance {
    pub participant: ParticipantId,
    pub net_amount: Decimal,
}

impl Balance {
    pub fn new(participant: ParticipantId, net_amount: Decimal) -> Self {
        Self {
            participant,
            net_amount,
        }
    }

    pub fn is_settled(&self) -> bool {
        is_settled(self.net_amount)
    }

    pub fn is_debtor(&self) -> bool {
        self.net_amount < -TOLERANCE
    }

    pub fn is_creditor(&self) -> bool {
        self.net_amount > TOLERANCE
    }
}

/// Net balances for every roster member, in roster order.
///
/// Produced by [`crate::engine::aggregate::aggregate`]. Every member has an
/// entry, including those with no activity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct BalanceSheet {
    balances: Vec<Balance>,
}

impl BalanceSheet {
    pub(crate) fn from_balances(balances: Vec<Balance>) -> Self {
        Self { balances }
    }

    pub fn balances(&self) -> &[Balance] {
        &self.balances
    }

    /// Net amount of a participant, or `None` if they are not on the sheet.
    pub fn get(&self, participant: &ParticipantId) -> Option<Decimal> {
        self.balances
            .iter()
            .find(|b| &b.participant == participant)
            .map(|b| b.net_amount)
    }

    /// Sum of all net amounts. Zero for a consistent sheet.
    pub fn total(&self) -> Decimal {
        self.balances.iter().map(|b| b.net_amount).sum()
    }

    /// Whether the sheet satisfies the zero-sum invariant.
    pub fn is_balanced(&self) -> bool {
        is_settled(self.total())
    }

    /// Participants who owe more than the tolerance.
    pub fn debtors(&self) -> impl Iterator<Item = &Balance> {
        self.balances.iter().filter(|b| b.is_debtor())
    }

    /// Participants who are owed more than the tolerance.
    pub fn creditors(&self) -> impl Iterator<Item = &Balance> {
        self.balances.iter().filter(|b| b.is_creditor())
    }

    pub fn len(&self) -> usize {
        self.balances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.balances.is_empty()
    }
}

impl AsRef<[Balance]> for BalanceSheet {
    fn as_ref(&self) -> &[Balance] {
        &self.balances
    }
}

impl<'a> IntoIterator for &'a BalanceSheet {
    type Item = &'a Balance;
    type IntoIter = std::slice::Iter<'a, Balance>;

    fn into_iter(self) -> Self::IntoIter {
        self.balances.iter()
    }
}

impl fmt::Display for BalanceSheet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Balances ===")?;
        for b in &self.balances {
            let status = if b.is_creditor() {
                "IS OWED"
            } else if b.is_debtor() {
                "OWES"
            } else {
                "SETTLED"
            };
            writeln!(f, "  {:<15} {:>12}  [{}]", b.participant, b.net_amount, status)?;
        }
        Ok(())
    }
}
