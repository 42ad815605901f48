use crate::types::Entry;

/// Durable home for the history list. Implementations replace the whole
/// persisted list on every `save`.
pub trait HistoryBackend: Send + Sync {
    /// Read the persisted list, most-recent-first. Nothing persisted yet is
    /// an empty list, not an error.
    fn load(&self) -> anyhow::Result<Vec<Entry>>;
    fn save(&self, entries: &[Entry]) -> anyhow::Result<()>;
    /// Where the data lives, for log lines and `copycache stats`.
    fn describe(&self) -> String;
}

pub mod jsonl;
pub mod memory;
pub mod sqlite;

pub use jsonl::JsonlBackend;
pub use memory::InMemoryBackend;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteBackend;
