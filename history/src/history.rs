//! The clipboard history store: an ordered, deduplicated, capacity-bounded
//! list of entries mirrored to a [`HistoryBackend`] after every mutation.
//!
//! All mutations run inside one critical section that spans the in-memory
//! change and the backend write, so overlapping callers never lose updates.
//! When a write fails the in-memory list keeps the new state and the error
//! is returned; a later reload from the backend may not reflect it.

use chrono::Utc;
use std::sync::Mutex;
use std::sync::MutexGuard;

use crate::error::HistoryError;
use crate::error::Operation;
use crate::error::Result;
use crate::migrate::normalize;
use crate::store::HistoryBackend;
use crate::types::ContentType;
use crate::types::Entry;

pub const DEFAULT_CAPACITY: usize = 200;

/// Events queued per subscriber before new ones are dropped.
pub const SUBSCRIBER_BUFFER: usize = 256;

/// Change notification delivered to subscribers after a mutation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HistoryEvent {
    Recorded(Entry),
    Removed { id: String },
    Cleared,
    /// Entries dropped from the tail because capacity shrank.
    Trimmed { evicted: usize },
    Reloaded { len: usize },
    Imported { count: usize },
}

struct State {
    entries: Vec<Entry>,
    capacity: usize,
}

pub struct ClipboardHistory {
    backend: Box<dyn HistoryBackend>,
    state: Mutex<State>,
    subscribers: Mutex<Vec<async_channel::Sender<HistoryEvent>>>,
}

impl ClipboardHistory {
    /// Load the persisted list once and return a ready store. A persisted
    /// list with duplicates or more than `capacity` entries is normalized in
    /// memory; nothing is written until the first mutation.
    pub fn open(backend: Box<dyn HistoryBackend>, capacity: usize) -> Result<Self> {
        let capacity = clamp_capacity(capacity);
        let mut entries = backend.load().map_err(|source| HistoryError::Persistence {
            op: Operation::Load,
            entries: 0,
            source,
        })?;
        let dropped = normalize(&mut entries, capacity);
        if dropped > 0 {
            tracing::debug!(dropped, "normalized persisted history on load");
        }
        tracing::debug!(
            backend = %backend.describe(),
            len = entries.len(),
            capacity,
            "clipboard history ready"
        );
        Ok(Self {
            backend,
            state: Mutex::new(State { entries, capacity }),
            subscribers: Mutex::new(Vec::new()),
        })
    }

    /// Capture `raw` at the front of the list. Blank input is a no-op and
    /// returns `Ok(None)` without touching the backend.
    pub fn record(&self, raw: &str) -> Result<Option<Entry>> {
        let text = raw.trim();
        if text.is_empty() {
            return Ok(None);
        }

        let mut state = self.lock_state();
        let entry = Entry::new(text.to_string(), Utc::now());
        let moved = match state.entries.iter().position(|e| e.text == text) {
            Some(idx) => {
                state.entries.remove(idx);
                true
            }
            None => false,
        };
        state.entries.insert(0, entry.clone());
        let capacity = state.capacity;
        state.entries.truncate(capacity);
        tracing::debug!(id = %entry.id, kind = %entry.r#type, moved, "recorded entry");

        self.notify(HistoryEvent::Recorded(entry.clone()));
        self.persist(Operation::Record, &state)?;
        Ok(Some(entry))
    }

    /// Snapshot of the list, most recent first.
    pub fn list(&self) -> Vec<Entry> {
        self.lock_state().entries.clone()
    }

    pub fn get(&self, id: &str) -> Option<Entry> {
        self.lock_state().entries.iter().find(|e| e.id == id).cloned()
    }

    pub fn len(&self) -> usize {
        self.lock_state().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.lock_state().capacity
    }

    /// Remove the entry with `id`. Returns `Ok(false)` and writes nothing
    /// when no such entry exists.
    pub fn remove(&self, id: &str) -> Result<bool> {
        let mut state = self.lock_state();
        let Some(idx) = state.entries.iter().position(|e| e.id == id) else {
            return Ok(false);
        };
        state.entries.remove(idx);
        tracing::debug!(id, "removed entry");

        self.notify(HistoryEvent::Removed { id: id.to_string() });
        self.persist(Operation::Remove, &state)?;
        Ok(true)
    }

    /// Empty the list. Always writes, even when already empty.
    pub fn clear(&self) -> Result<()> {
        let mut state = self.lock_state();
        state.entries.clear();
        tracing::debug!("cleared history");

        self.notify(HistoryEvent::Cleared);
        self.persist(Operation::Clear, &state)
    }

    /// Change the capacity used by future captures. Values below one are
    /// raised to one. Shrinking below the current length trims the tail
    /// immediately and writes; otherwise nothing is written.
    pub fn set_capacity(&self, capacity: usize) -> Result<()> {
        let capacity = clamp_capacity(capacity);
        let mut state = self.lock_state();
        state.capacity = capacity;
        let evicted = state.entries.len().saturating_sub(capacity);
        if evicted == 0 {
            return Ok(());
        }
        state.entries.truncate(capacity);
        tracing::debug!(capacity, evicted, "trimmed history to new capacity");

        self.notify(HistoryEvent::Trimmed { evicted });
        self.persist(Operation::SetCapacity, &state)
    }

    /// Replace the in-memory list with what the backend currently holds,
    /// for hosts that learn about external writes.
    pub fn reload(&self) -> Result<()> {
        let mut state = self.lock_state();
        let mut entries = self
            .backend
            .load()
            .map_err(|source| HistoryError::Persistence {
                op: Operation::Reload,
                entries: state.entries.len(),
                source,
            })?;
        normalize(&mut entries, state.capacity);
        state.entries = entries;
        let len = state.entries.len();
        self.notify(HistoryEvent::Reloaded { len });
        Ok(())
    }

    /// Merge entries from an export, keeping their ids and timestamps. The
    /// first imported entry ends up on top; existing entries with the same
    /// text are replaced. One backend write for the whole batch.
    pub fn import(&self, entries: Vec<Entry>) -> Result<usize> {
        let mut incoming: Vec<Entry> = entries
            .into_iter()
            .filter_map(|mut e| {
                let trimmed = e.text.trim();
                if trimmed.is_empty() {
                    return None;
                }
                if trimmed.len() != e.text.len() {
                    e.text = trimmed.to_string();
                }
                Some(e)
            })
            .collect();
        normalize(&mut incoming, usize::MAX);
        if incoming.is_empty() {
            return Ok(0);
        }

        let mut state = self.lock_state();
        state.entries.retain(|existing| {
            !incoming
                .iter()
                .any(|e| e.text == existing.text || e.id == existing.id)
        });
        let count = incoming.len().min(state.capacity);
        incoming.append(&mut state.entries);
        normalize(&mut incoming, state.capacity);
        state.entries = incoming;
        tracing::debug!(count, "imported entries");

        self.notify(HistoryEvent::Imported { count });
        self.persist(Operation::Import, &state)?;
        Ok(count)
    }

    /// Entry counts per content type.
    pub fn stats(&self) -> serde_json::Value {
        let state = self.lock_state();
        let mut by_type = serde_json::Map::new();
        for t in ContentType::ALL {
            let n = state.entries.iter().filter(|e| e.r#type == t).count();
            by_type.insert(t.to_string(), serde_json::json!(n));
        }
        serde_json::json!({
            "total": state.entries.len(),
            "capacity": state.capacity,
            "backend": self.backend.describe(),
            "by_type": by_type,
        })
    }

    /// Receive a [`HistoryEvent`] for every mutation from now on. Dropping
    /// the receiver unsubscribes. At most [`SUBSCRIBER_BUFFER`] events are
    /// queued per receiver; further events are dropped until it catches up.
    pub fn subscribe(&self) -> async_channel::Receiver<HistoryEvent> {
        let (tx, rx) = async_channel::bounded(SUBSCRIBER_BUFFER);
        self.lock_subscribers().push(tx);
        rx
    }

    fn persist(&self, op: Operation, state: &State) -> Result<()> {
        self.backend.save(&state.entries).map_err(|source| {
            tracing::warn!(
                %op,
                entries = state.entries.len(),
                backend = %self.backend.describe(),
                "failed to persist clipboard history: {source:#}"
            );
            HistoryError::Persistence {
                op,
                entries: state.entries.len(),
                source,
            }
        })
    }

    fn notify(&self, event: HistoryEvent) {
        let mut subscribers = self.lock_subscribers();
        subscribers.retain(|tx| match tx.try_send(event.clone()) {
            Ok(()) => true,
            Err(async_channel::TrySendError::Full(_)) => {
                tracing::debug!("history subscriber lagging, dropping event");
                true
            }
            Err(async_channel::TrySendError::Closed(_)) => false,
        });
    }

    fn lock_state(&self) -> MutexGuard<'_, State> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                tracing::warn!("history state mutex poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }

    fn lock_subscribers(&self) -> MutexGuard<'_, Vec<async_channel::Sender<HistoryEvent>>> {
        match self.subscribers.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

fn clamp_capacity(capacity: usize) -> usize {
    if capacity == 0 {
        tracing::warn!("history capacity 0 requested, using 1");
        return 1;
    }
    capacity
}
