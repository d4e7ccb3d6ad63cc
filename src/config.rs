//! Ledger files and roster configuration.
//!
//! The roster is deployment configuration, not code. It is taken from, in
//! order of precedence: an explicit override (the CLI `--roster` flag), the
//! `SPLITLEDGER_ROSTER` environment variable, then the `roster` field of the
//! ledger file.

use crate::core::expense::{ExpenseError, ExpenseLog, ExpenseRecord};
use crate::core::participant::{Roster, RosterError};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable holding a comma-separated roster.
pub const ROSTER_ENV: &str = "SPLITLEDGER_ROSTER";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid ledger file: {0}")]
    Json(#[from] serde_json::Error),
    #[error("no roster configured; pass --roster, set SPLITLEDGER_ROSTER, or add a \"roster\" field")]
    MissingRoster,
    #[error("invalid roster: {0}")]
    Roster(#[from] RosterError),
    #[error("expense #{index} is invalid: {source}")]
    Expense { index: usize, source: ExpenseError },
}

/// On-disk ledger format.
///
/// ```json
/// {
///   "roster": ["Alice", "Bob"],
///   "expenses": [
///     { "payer": "Alice", "amount": "100", "beneficiaries": ["Alice", "Bob"], "memo": "Dinner" }
///   ]
/// }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LedgerFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roster: Option<Vec<String>>,
    #[serde(default)]
    pub expenses: Vec<ExpenseRecord>,
}

impl LedgerFile {
    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn read(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content)
    }

    /// Build a file from a roster and its expense history.
    pub fn from_ledger(roster: &Roster, expenses: &ExpenseLog) -> Self {
        Self {
            roster: Some(roster.iter().map(|p| p.to_string()).collect()),
            expenses: expenses.expenses().iter().map(ExpenseRecord::from).collect(),
        }
    }

    /// Resolve the roster and validate every expense against it.
    pub fn into_ledger(self, sources: &RosterSources) -> Result<(Roster, ExpenseLog), ConfigError> {
        let roster = sources.resolve(self.roster.as_deref())?;

        let mut log = ExpenseLog::new();
        for (i, record) in self.expenses.into_iter().enumerate() {
            let expense = record
                .into_expense(&roster)
                .map_err(|source| ConfigError::Expense { index: i + 1, source })?;
            log.push(expense);
        }

        debug!("loaded {} expense(s) for roster [{}]", log.len(), roster);
        Ok((roster, log))
    }
}

/// Roster sources that take precedence over the ledger file.
#[derive(Debug, Clone, Default)]
pub struct RosterSources {
    /// Explicit override, e.g. from a command-line flag.
    pub explicit: Option<String>,
    /// Value of [`ROSTER_ENV`], if set.
    pub env: Option<String>,
}

impl RosterSources {
    /// Explicit override plus whatever the process environment holds.
    pub fn from_env(explicit: Option<String>) -> Self {
        Self {
            explicit,
            env: std::env::var(ROSTER_ENV).ok(),
        }
    }

    /// Pick the first configured roster source.
    pub fn resolve(&self, file_roster: Option<&[String]>) -> Result<Roster, ConfigError> {
        let from_list = |list: &str| Roster::from_csv(list).map_err(ConfigError::from);

        if let Some(list) = self.explicit.as_deref() {
            return from_list(list);
        }
        if let Some(list) = self.env.as_deref().filter(|s| !s.trim().is_empty()) {
            return from_list(list);
        }
        match file_roster {
            Some(names) => Ok(Roster::new(names)?),
            None => Err(ConfigError::MissingRoster),
        }
    }
}
