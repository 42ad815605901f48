use super::*;
use std::sync::Mutex;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

/// Volatile backend for hosts without durable storage.
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    entries: Mutex<Vec<Entry>>,
    writes: AtomicUsize,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an already persisted list.
    pub fn with_entries(entries: Vec<Entry>) -> Self {
        Self {
            entries: Mutex::new(entries),
            writes: AtomicUsize::new(0),
        }
    }

    /// Number of successful `save` calls so far.
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// What a fresh `load` would return.
    pub fn persisted(&self) -> Vec<Entry> {
        match self.entries.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl HistoryBackend for InMemoryBackend {
    fn load(&self) -> anyhow::Result<Vec<Entry>> {
        Ok(self.persisted())
    }

    fn save(&self, entries: &[Entry]) -> anyhow::Result<()> {
        let mut guard = self
            .entries
            .lock()
            .map_err(|e| anyhow::anyhow!("memory backend mutex poisoned: {e}"))?;
        *guard = entries.to_vec();
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}
