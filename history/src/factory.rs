use std::path::PathBuf;

use crate::history::ClipboardHistory;
use crate::history::DEFAULT_CAPACITY;
use crate::store::HistoryBackend;
use crate::store::InMemoryBackend;
use crate::store::JsonlBackend;

#[cfg(feature = "sqlite")]
use crate::store::SqliteBackend;

/// Backend selection for history persistence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Jsonl,
    #[cfg(feature = "sqlite")]
    Sqlite,
    Memory,
}

impl std::str::FromStr for Backend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "jsonl" => Ok(Backend::Jsonl),
            #[cfg(feature = "sqlite")]
            "sqlite" => Ok(Backend::Sqlite),
            #[cfg(not(feature = "sqlite"))]
            "sqlite" => anyhow::bail!(
                "sqlite backend not compiled; enable with `--features copycache-history/sqlite`"
            ),
            "memory" => Ok(Backend::Memory),
            other => anyhow::bail!("unknown backend: {other}"),
        }
    }
}

/// Choose backend using env `COPYCACHE_BACKEND` if present: `jsonl`,
/// `sqlite` or `memory`. Defaults to JSONL; an unknown or uncompiled value
/// falls back to JSONL with a warning.
pub fn choose_backend_from_env() -> Backend {
    let Ok(v) = std::env::var("COPYCACHE_BACKEND") else {
        return Backend::Jsonl;
    };
    v.parse().unwrap_or_else(|err| {
        tracing::warn!("ignoring COPYCACHE_BACKEND: {err:#}");
        Backend::Jsonl
    })
}

/// Where and how the history is kept.
#[derive(Debug, Clone)]
pub struct HistoryConfig {
    pub backend: Backend,
    pub data_dir: PathBuf,
    pub capacity: usize,
}

impl HistoryConfig {
    /// Build from the environment:
    /// - `COPYCACHE_BACKEND` (see [`choose_backend_from_env`])
    /// - `COPYCACHE_DATA_DIR`, default `<platform data dir>/copycache`
    /// - `COPYCACHE_CAPACITY`, default 200
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_env_in(None)
    }

    /// Like [`HistoryConfig::from_env`], but an explicit `data_dir` wins over
    /// `COPYCACHE_DATA_DIR` and the platform default.
    pub fn from_env_in(data_dir: Option<PathBuf>) -> anyhow::Result<Self> {
        let data_dir = match data_dir {
            Some(dir) => dir,
            None => match std::env::var("COPYCACHE_DATA_DIR") {
                Ok(dir) => PathBuf::from(dir),
                Err(_) => default_data_dir()?,
            },
        };
        let capacity = match std::env::var("COPYCACHE_CAPACITY") {
            Ok(v) => v
                .trim()
                .parse()
                .map_err(|e| anyhow::anyhow!("invalid COPYCACHE_CAPACITY {v:?}: {e}"))?,
            Err(_) => DEFAULT_CAPACITY,
        };
        Ok(Self {
            backend: choose_backend_from_env(),
            data_dir,
            capacity,
        })
    }

    /// JSONL file location; `COPYCACHE_HISTORY_JSONL` overrides it.
    pub fn jsonl_path(&self) -> PathBuf {
        std::env::var("COPYCACHE_HISTORY_JSONL")
            .map(PathBuf::from)
            .unwrap_or_else(|_| self.data_dir.join("history.jsonl"))
    }

    /// SQLite file location; `COPYCACHE_HISTORY_DB` overrides it.
    pub fn sqlite_path(&self) -> PathBuf {
        std::env::var("COPYCACHE_HISTORY_DB")
            .map(PathBuf::from)
            .unwrap_or_else(|_| self.data_dir.join("history.db"))
    }
}

pub fn default_data_dir() -> anyhow::Result<PathBuf> {
    dirs::data_dir()
        .map(|d| d.join("copycache"))
        .ok_or_else(|| anyhow::anyhow!("no platform data directory; set COPYCACHE_DATA_DIR"))
}

pub fn open_backend(config: &HistoryConfig) -> anyhow::Result<Box<dyn HistoryBackend>> {
    Ok(match config.backend {
        Backend::Jsonl => Box::new(JsonlBackend::new(config.jsonl_path())),
        #[cfg(feature = "sqlite")]
        Backend::Sqlite => {
            let path = config.sqlite_path();
            if let Some(dir) = path.parent() {
                std::fs::create_dir_all(dir)?;
            }
            Box::new(SqliteBackend::new(path))
        }
        Backend::Memory => Box::new(InMemoryBackend::new()),
    })
}

/// Open the backend described by `config` and load the history from it.
pub fn open_history(config: &HistoryConfig) -> anyhow::Result<ClipboardHistory> {
    let backend = open_backend(config)?;
    Ok(ClipboardHistory::open(backend, config.capacity)?)
}
