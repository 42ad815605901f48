use chrono::DateTime;
use chrono::Utc;
use std::collections::HashSet;

use crate::types::Entry;
use crate::types::new_entry_id;

/// Shapes a persisted line may take. Older capture hooks stored either the
/// bare string or an object keyed by `text` with an epoch-millis `timestamp`.
#[derive(serde::Deserialize)]
#[serde(untagged)]
enum StoredEntry {
    Current(Entry),
    Legacy(LegacyEntry),
    Bare(String),
}

#[derive(serde::Deserialize)]
struct LegacyEntry {
    #[serde(default)]
    id: Option<serde_json::Value>,
    text: String,
    #[serde(default)]
    timestamp: Option<f64>,
}

/// Decode one stored line into the structured form, upgrading legacy shapes.
/// Legacy type tags are not trusted; the text is classified again.
pub fn decode_stored(line: &str) -> anyhow::Result<Entry> {
    let stored: StoredEntry = serde_json::from_str(line)?;
    let entry = match stored {
        StoredEntry::Current(entry) => entry,
        StoredEntry::Legacy(legacy) => {
            let created_at = legacy
                .timestamp
                .and_then(|ms| DateTime::<Utc>::from_timestamp_millis(ms as i64))
                .unwrap_or_else(Utc::now);
            let mut entry = Entry::new(legacy.text.trim().to_string(), created_at);
            match legacy.id {
                Some(serde_json::Value::String(id)) if !id.is_empty() => entry.id = id,
                Some(serde_json::Value::Number(n)) => entry.id = n.to_string(),
                _ => {}
            }
            entry
        }
        StoredEntry::Bare(text) => Entry::new(text.trim().to_string(), Utc::now()),
    };
    if entry.text.trim().is_empty() {
        anyhow::bail!("stored entry {} has blank text", entry.id);
    }
    Ok(entry)
}

/// Drop later duplicates of the same text and anything past `capacity`,
/// then give a fresh id to any surviving entry whose id is already taken
/// by an earlier one. Returns how many entries were discarded.
pub fn normalize(entries: &mut Vec<Entry>, capacity: usize) -> usize {
    let before = entries.len();
    let mut seen = HashSet::new();
    entries.retain(|e| seen.insert(e.text.clone()));
    entries.truncate(capacity);

    let mut ids = HashSet::new();
    for entry in entries.iter_mut() {
        while !ids.insert(entry.id.clone()) {
            let stale = std::mem::replace(&mut entry.id, new_entry_id(entry.created_at));
            tracing::debug!(%stale, id = %entry.id, "regenerated colliding entry id");
        }
    }
    before - entries.len()
}

/// Rewrite a JSONL history file in the current shape, dropping unreadable
/// lines and duplicate texts (the first, most recent occurrence wins).
///
/// Returns `(lines read, entries written)`.
pub fn upgrade_jsonl(
    input: &std::path::Path,
    output: &std::path::Path,
) -> anyhow::Result<(usize, usize)> {
    let data = std::fs::read_to_string(input)?;
    let mut read = 0usize;
    let mut entries = Vec::new();
    for line in data.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        read += 1;
        match decode_stored(line) {
            Ok(entry) => entries.push(entry),
            Err(err) => tracing::warn!("dropping unreadable line {read}: {err:#}"),
        }
    }
    normalize(&mut entries, usize::MAX);

    use crate::store::HistoryBackend as _;
    crate::store::JsonlBackend::new(output).save(&entries)?;
    Ok((read, entries.len()))
}

/// Copy a JSONL history file into a SQLite database file.
///
/// Returns the number of entries written.
#[cfg(feature = "sqlite")]
pub fn migrate_jsonl_to_sqlite(
    jsonl_path: &std::path::Path,
    sqlite_path: &std::path::Path,
) -> anyhow::Result<usize> {
    use crate::store::HistoryBackend;
    use crate::store::JsonlBackend;
    use crate::store::SqliteBackend;

    if !jsonl_path.exists() {
        anyhow::bail!("no history file at {}", jsonl_path.display());
    }
    let mut entries = JsonlBackend::new(jsonl_path).load()?;
    normalize(&mut entries, usize::MAX);
    if let Some(dir) = sqlite_path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    SqliteBackend::new(sqlite_path).save(&entries)?;
    Ok(entries.len())
}

#[cfg(not(feature = "sqlite"))]
pub fn migrate_jsonl_to_sqlite(
    _jsonl_path: &std::path::Path,
    _sqlite_path: &std::path::Path,
) -> anyhow::Result<usize> {
    anyhow::bail!("sqlite backend not compiled; enable with `--features copycache-history/sqlite`");
}
