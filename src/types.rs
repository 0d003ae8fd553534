use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{RaftError, Result};

/// Unique identity of a cluster member. Assigned once, never changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServerId(Uuid);

impl ServerId {
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse from the canonical UUID text form.
    pub fn parse(s: &str) -> Result<Self> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

impl fmt::Display for ServerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Logical clock epoch. Increases monotonically for a given node:
/// exactly when it starts (or restarts) an election, or when it
/// discovers a higher term from an RPC.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct TermIndex(u64);

impl TermIndex {
    pub const ZERO: TermIndex = TermIndex(0);

    pub fn new(term: u64) -> Self {
        Self(term)
    }

    pub fn get(self) -> u64 {
        self.0
    }

    pub fn increment(&mut self) -> Result<()> {
        self.0 = self.0.checked_add(1).ok_or(RaftError::TermOverflow)?;
        Ok(())
    }
}

impl TryFrom<i64> for TermIndex {
    type Error = RaftError;

    fn try_from(value: i64) -> Result<Self> {
        u64::try_from(value)
            .map(Self)
            .map_err(|_| RaftError::NegativeIndex(value))
    }
}

impl fmt::Display for TermIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Index of an entry in the replicated log. 0 means "no entry yet".
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct LogIndex(u64);

impl LogIndex {
    pub const ZERO: LogIndex = LogIndex(0);

    pub fn new(index: u64) -> Self {
        Self(index)
    }

    pub fn get(self) -> u64 {
        self.0
    }

    /// The index following this one.
    pub fn next(self) -> LogIndex {
        LogIndex(self.0.saturating_add(1))
    }
}

impl TryFrom<i64> for LogIndex {
    type Error = RaftError;

    fn try_from(value: i64) -> Result<Self> {
        u64::try_from(value)
            .map(Self)
            .map_err(|_| RaftError::NegativeIndex(value))
    }
}

impl fmt::Display for LogIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_id_parse_roundtrip() {
        let id = ServerId::random();
        let parsed = ServerId::parse(&id.to_string()).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn server_id_rejects_malformed() {
        assert!(ServerId::parse("not-a-uuid").is_err());
        assert!(ServerId::parse("").is_err());
    }

    #[test]
    fn term_increment() {
        let mut term = TermIndex::ZERO;
        term.increment().unwrap();
        assert_eq!(term, TermIndex::new(1));
    }

    #[test]
    fn term_increment_overflow() {
        let mut term = TermIndex::new(u64::MAX);
        assert!(matches!(term.increment(), Err(RaftError::TermOverflow)));
        assert_eq!(term, TermIndex::new(u64::MAX));
    }

    #[test]
    fn term_rejects_negative() {
        assert!(matches!(
            TermIndex::try_from(-1),
            Err(RaftError::NegativeIndex(-1))
        ));
        assert_eq!(TermIndex::try_from(3).unwrap(), TermIndex::new(3));
    }

    #[test]
    fn log_index_next() {
        assert_eq!(LogIndex::ZERO.next(), LogIndex::new(1));
        assert_eq!(LogIndex::new(u64::MAX).next(), LogIndex::new(u64::MAX));
    }

    #[test]
    fn log_index_rejects_negative() {
        assert!(matches!(
            LogIndex::try_from(-5),
            Err(RaftError::NegativeIndex(-5))
        ));
    }
}
