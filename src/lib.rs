//! # splitledger
//!
//! Shared-expense netting and debt settlement engine.
//!
//! Given the expense history of a fixed group of participants, this crate
//! computes each participant's net balance and a short list of
//! point-to-point payments that brings every balance back to zero.
//!
//! ## Architecture
//!
//! - **core** — Foundational types: participants and roster, expenses, balances, settlements
//! - **engine** — Balance aggregation, settlement planning, group summaries
//! - **config** — Ledger file format and roster configuration
//! - **simulation** — Random expense histories for benchmarking
//!
//! Both engine stages are pure functions of their input: no I/O, no shared
//! state, identical output for identical input.

pub mod config;
pub mod core;
pub mod engine;
pub mod simulation;

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::core::balance::{Balance, BalanceSheet};
    pub use crate::core::expense::{Expense, ExpenseError, ExpenseLog};
    pub use crate::core::participant::{ParticipantId, Roster, RosterError};
    pub use crate::core::settlement::{Settlement, SettlementPlan};
    pub use crate::engine::aggregate::{aggregate, AggregationError};
    pub use crate::engine::settle::{plan, PlanError};
    pub use crate::engine::summary::{GroupSummary, ParticipantBreakdown};
}
