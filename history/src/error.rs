use thiserror::Error;

/// Store operation that touched the persistence backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum_macros::Display)]
#[strum(serialize_all = "snake_case")]
pub enum Operation {
    Load,
    Record,
    Remove,
    Clear,
    SetCapacity,
    Reload,
    Import,
}

#[derive(Debug, Error)]
pub enum HistoryError {
    /// The backend failed to load or save. For mutating operations the
    /// in-memory list already holds the new state; only durability is lost.
    #[error("{op} failed with {entries} entries in flight: {source:#}")]
    Persistence {
        op: Operation,
        entries: usize,
        #[source]
        source: anyhow::Error,
    },
}

impl HistoryError {
    pub fn operation(&self) -> Operation {
        match self {
            HistoryError::Persistence { op, .. } => *op,
        }
    }

    pub fn entries_in_flight(&self) -> usize {
        match self {
            HistoryError::Persistence { entries, .. } => *entries,
        }
    }
}

pub type Result<T> = std::result::Result<T, HistoryError>;
