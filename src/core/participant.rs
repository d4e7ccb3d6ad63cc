use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// Identifier of a participant in an expense-sharing group.
///
/// Identifiers are handed out by a [`Roster`]; code outside this module
/// cannot turn an arbitrary string into a participant.
///
/// # Examples
///
/// ```
/// use splitledger::core::participant::Roster;
///
/// let roster = Roster::new(["Alice", "Bob"]).unwrap();
/// let alice = roster.resolve("Alice").unwrap();
/// assert_eq!(alice.as_str(), "Alice");
/// assert!(roster.resolve("Mallory").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ParticipantId(String);

impl ParticipantId {
    fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the string representation of this participant.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

/// Errors raised while building or querying a roster.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RosterError {
    #[error("roster must contain at least one participant")]
    Empty,
    #[error("participant names must not be blank")]
    BlankName,
    #[error("participant '{0}' appears more than once in the roster")]
    Duplicate(String),
    #[error("'{0}' is not a member of the roster")]
    UnknownParticipant(String),
}

/// The fixed, ordered set of participants in a group.
///
/// Membership does not change once the roster is built. Order is the
/// insertion order and is used for display and deterministic tie-breaks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct Roster {
    members: Vec<ParticipantId>,
    index: HashMap<String, usize>,
}

impl Roster {
    /// Build a roster from participant names.
    ///
    /// Names are trimmed. Blank names and duplicates are rejected.
    pub fn new<I, S>(names: I) -> Result<Self, RosterError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut members = Vec::new();
        let mut index = HashMap::new();

        for name in names {
            let name = name.as_ref().trim();
            if name.is_empty() {
                return Err(RosterError::BlankName);
            }
            if index.contains_key(name) {
                return Err(RosterError::Duplicate(name.to_string()));
            }
            index.insert(name.to_string(), members.len());
            members.push(ParticipantId::new(name));
        }

        if members.is_empty() {
            return Err(RosterError::Empty);
        }

        Ok(Self { members, index })
    }

    /// Parse a comma-separated list such as `"Alice, Bob,Carol"`.
    pub fn from_csv(list: &str) -> Result<Self, RosterError> {
        let names: Vec<&str> = list.split(',').filter(|s| !s.trim().is_empty()).collect();
        Self::new(names)
    }

    /// Look up a participant by name.
    pub fn resolve(&self, name: &str) -> Result<ParticipantId, RosterError> {
        self.index
            .get(name.trim())
            .map(|&i| self.members[i].clone())
            .ok_or_else(|| RosterError::UnknownParticipant(name.to_string()))
    }

    pub fn contains(&self, participant: &ParticipantId) -> bool {
        self.index.contains_key(participant.as_str())
    }

    /// Position of a participant in roster order.
    pub fn position(&self, participant: &ParticipantId) -> Option<usize> {
        self.index.get(participant.as_str()).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ParticipantId> {
        self.members.iter()
    }

    pub fn members(&self) -> &[ParticipantId] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

impl TryFrom<Vec<String>> for Roster {
    type Error = RosterError;

    fn try_from(names: Vec<String>) -> Result<Self, Self::Error> {
        Self::new(names)
    }
}

impl From<Roster> for Vec<String> {
    fn from(roster: Roster) -> Self {
        roster.members.into_iter().map(|p| p.0).collect()
    }
}

impl fmt::Display for Roster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.members.iter().map(|p| p.as_str()).collect();
        write!(f, "{}", names.join(", "))
    }
}
