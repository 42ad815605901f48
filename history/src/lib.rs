//! Bounded, deduplicating clipboard history with content-type tagging.
//!
//! Capture hooks call [`ClipboardHistory::record`]; UIs read snapshots with
//! [`ClipboardHistory::list`] and subscribe to [`HistoryEvent`]s. Durability
//! comes from whichever [`store::HistoryBackend`] the host injects.

pub mod classify;
pub mod error;
pub mod factory;
pub mod history;
pub mod migrate;
pub mod query;
pub mod store;
pub mod types;

pub use classify::classify;
pub use error::HistoryError;
pub use error::Operation;
pub use history::ClipboardHistory;
pub use history::DEFAULT_CAPACITY;
pub use history::HistoryEvent;
pub use history::SUBSCRIBER_BUFFER;
pub use types::ContentType;
pub use types::Entry;
