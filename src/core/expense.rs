use crate::core::participant::{ParticipantId, Roster, RosterError};
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;
use uuid::Uuid;

/// Errors raised when an expense record is malformed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExpenseError {
    #[error("expense amount must be positive, got {0}")]
    NonPositiveAmount(Decimal),
    #[error("expense must be split among at least one participant")]
    NoBeneficiaries,
    #[error("participant '{0}' is listed more than once among the beneficiaries")]
    DuplicateBeneficiary(ParticipantId),
    #[error(transparent)]
    Roster(#[from] RosterError),
}

/// A shared expense: `payer` paid `amount`, split equally among `beneficiaries`.
///
/// Expenses are immutable once created. The payer may or may not be one of
/// the beneficiaries.
///
/// # Examples
///
/// ```
/// use splitledger::core::expense::Expense;
/// use splitledger::core::participant::Roster;
/// use rust_decimal_macros::dec;
///
/// let roster = Roster::new(["A", "B"]).unwrap();
/// let a = roster.resolve("A").unwrap();
/// let b = roster.resolve("B").unwrap();
///
/// let dinner = Expense::new(a.clone(), dec!(100), vec![a, b], "Dinner").unwrap();
/// assert_eq!(dinner.share(), dec!(50));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Expense {
    id: Uuid,
    payer: ParticipantId,
    amount: Decimal,
    /// Ordered, duplicate-free, never empty.
    beneficiaries: Vec<ParticipantId>,
    memo: String,
    recorded_at: DateTime<Utc>,
}

impl Expense {
    /// Create a new expense with a fresh id, recorded now.
    pub fn new(
        payer: ParticipantId,
        amount: Decimal,
        beneficiaries: Vec<ParticipantId>,
        memo: impl Into<String>,
    ) -> Result<Self, ExpenseError> {
        Self::with_id(Uuid::new_v4(), payer, amount, beneficiaries, memo)
    }

    /// Create an expense with a specific id (useful for replay / determinism).
    pub fn with_id(
        id: Uuid,
        payer: ParticipantId,
        amount: Decimal,
        beneficiaries: Vec<ParticipantId>,
        memo: impl Into<String>,
    ) -> Result<Self, ExpenseError> {
        if amount <= Decimal::ZERO {
            return Err(ExpenseError::NonPositiveAmount(amount));
        }
        if beneficiaries.is_empty() {
            return Err(ExpenseError::NoBeneficiaries);
        }
        let mut seen = HashSet::with_capacity(beneficiaries.len());
        for b in &beneficiaries {
            if !seen.insert(b) {
                return Err(ExpenseError::DuplicateBeneficiary(b.clone()));
            }
        }

        Ok(Self {
            id,
            payer,
            amount,
            beneficiaries,
            memo: memo.into(),
            recorded_at: Utc::now(),
        })
    }

    /// Override the recording timestamp.
    pub fn with_recorded_at(mut self, recorded_at: DateTime<Utc>) -> Self {
        self.recorded_at = recorded_at;
        self
    }

    // --- Accessors ---

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn payer(&self) -> &ParticipantId {
        &self.payer
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn beneficiaries(&self) -> &[ParticipantId] {
        &self.beneficiaries
    }

    pub fn memo(&self) -> &str {
        &self.memo
    }

    pub fn recorded_at(&self) -> DateTime<Utc> {
        self.recorded_at
    }

    /// Unrounded amount charged to each beneficiary.
    pub fn share(&self) -> Decimal {
        self.amount / Decimal::from(self.beneficiaries.len())
    }
}

/// Wire form of an expense, as it arrives from storage or a ledger file.
///
/// Names are resolved against a [`Roster`] by [`ExpenseRecord::into_expense`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpenseRecord {
    #[serde(default)]
    pub id: Option<Uuid>,
    pub payer: String,
    pub amount: Decimal,
    pub beneficiaries: Vec<String>,
    #[serde(default)]
    pub memo: String,
    #[serde(default)]
    pub recorded_at: Option<DateTime<Utc>>,
}

impl ExpenseRecord {
    /// Resolve names against the roster and validate the record.
    pub fn into_expense(self, roster: &Roster) -> Result<Expense, ExpenseError> {
        let payer = roster.resolve(&self.payer)?;
        let beneficiaries = self
            .beneficiaries
            .iter()
            .map(|name| roster.resolve(name))
            .collect::<Result<Vec<_>, _>>()?;

        let expense = Expense::with_id(
            self.id.unwrap_or_else(Uuid::new_v4),
            payer,
            self.amount,
            beneficiaries,
            self.memo,
        )?;
        Ok(match self.recorded_at {
            Some(at) => expense.with_recorded_at(at),
            None => expense,
        })
    }
}

impl From<&Expense> for ExpenseRecord {
    fn from(expense: &Expense) -> Self {
        Self {
            id: Some(expense.id),
            payer: expense.payer.to_string(),
            amount: expense.amount,
            beneficiaries: expense.beneficiaries.iter().map(|p| p.to_string()).collect(),
            memo: expense.memo.clone(),
            recorded_at: Some(expense.recorded_at),
        }
    }
}

/// Chronological, append-only history of expenses.
///
/// Supports exactly what the engine needs from storage: create, list all,
/// and clear all. Timestamps handed out by [`ExpenseLog::record`] are
/// strictly increasing.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExpenseLog {
    expenses: Vec<Expense>,
}

impl ExpenseLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create and append a new expense.
    pub fn record(
        &mut self,
        payer: ParticipantId,
        amount: Decimal,
        beneficiaries: Vec<ParticipantId>,
        memo: impl Into<String>,
    ) -> Result<&Expense, ExpenseError> {
        let expense = Expense::new(payer, amount, beneficiaries, memo)?;
        let stamp = self.next_timestamp(expense.recorded_at());
        self.expenses.push(expense.with_recorded_at(stamp));
        Ok(&self.expenses[self.expenses.len() - 1])
    }

    /// Append an already-built expense, keeping its timestamp.
    pub fn push(&mut self, expense: Expense) {
        self.expenses.push(expense);
    }

    fn next_timestamp(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        match self.expenses.iter().map(|e| e.recorded_at()).max() {
            Some(last) if now <= last => last + Duration::milliseconds(1),
            _ => now,
        }
    }

    /// All expenses in the order they were recorded.
    pub fn expenses(&self) -> &[Expense] {
        &self.expenses
    }

    /// All expenses, most recent first.
    pub fn newest_first(&self) -> Vec<&Expense> {
        let mut items: Vec<&Expense> = self.expenses.iter().collect();
        items.sort_by(|a, b| b.recorded_at().cmp(&a.recorded_at()));
        items
    }

    /// Remove every expense.
    pub fn clear(&mut self) {
        self.expenses.clear();
    }

    pub fn len(&self) -> usize {
        self.expenses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.expenses.is_empty()
    }

    /// Total amount spent across all expenses, or `None` if it overflows.
    pub fn total_spent(&self) -> Option<Decimal> {
        self.expenses
            .iter()
            .try_fold(Decimal::ZERO, |acc, e| acc.checked_add(e.amount()))
    }
}

impl FromIterator<Expense> for ExpenseLog {
    fn from_iter<T: IntoIterator<Item = Expense>>(iter: T) -> Self {
        Self {
            expenses: iter.into_iter().collect(),
        }
    }
}
