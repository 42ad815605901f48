use super::*;

#[cfg(feature = "sqlite")]
use crate::types::ContentType;
#[cfg(feature = "sqlite")]
use rusqlite::Connection;
#[cfg(feature = "sqlite")]
use rusqlite::params;

#[cfg(feature = "sqlite")]
fn init_db(conn: &Connection) -> anyhow::Result<()> {
    conn.execute_batch(
        r#"
        PRAGMA journal_mode=WAL;
        CREATE TABLE IF NOT EXISTS clipboard_entries (
            position INTEGER PRIMARY KEY,
            id TEXT NOT NULL UNIQUE,
            text TEXT NOT NULL,
            type TEXT NOT NULL,
            created_at TEXT NOT NULL
        );
        "#,
    )?;
    Ok(())
}

#[cfg(feature = "sqlite")]
fn open_conn(path: &std::path::Path) -> anyhow::Result<Connection> {
    let conn = Connection::open(path)?;
    init_db(&conn)?;
    Ok(conn)
}

#[cfg(feature = "sqlite")]
fn row_to_entry(row: &rusqlite::Row<'_>) -> rusqlite::Result<Entry> {
    use rusqlite::types::Type;
    let conv_err = |idx: usize, msg: String| -> rusqlite::Error {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            Type::Text,
            Box::new(std::io::Error::new(std::io::ErrorKind::InvalidData, msg)),
        )
    };
    let type_s: String = row.get(2)?;
    let created_s: String = row.get(3)?;

    Ok(Entry {
        id: row.get::<_, String>(0)?,
        text: row.get::<_, String>(1)?,
        r#type: ContentType::parse(&type_s)
            .map_err(|_| conv_err(2, format!("invalid type: {type_s}")))?,
        created_at: chrono::DateTime::parse_from_rfc3339(&created_s)
            .map_err(|e| conv_err(3, format!("created_at decode: {e}")))?
            .with_timezone(&chrono::Utc),
    })
}

/// SQLite file holding the list in `position` order.
#[cfg(feature = "sqlite")]
#[derive(Debug, Clone)]
pub struct SqliteBackend {
    path: std::path::PathBuf,
}

#[cfg(feature = "sqlite")]
impl SqliteBackend {
    pub fn new<P: AsRef<std::path::Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

#[cfg(feature = "sqlite")]
impl HistoryBackend for SqliteBackend {
    fn load(&self) -> anyhow::Result<Vec<Entry>> {
        let conn = open_conn(&self.path)?;
        let mut stmt = conn.prepare(
            "SELECT id, text, type, created_at FROM clipboard_entries ORDER BY position ASC",
        )?;
        let mut rows = stmt.query([])?;
        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            out.push(row_to_entry(row)?);
        }
        Ok(out)
    }

    fn save(&self, entries: &[Entry]) -> anyhow::Result<()> {
        let mut conn = open_conn(&self.path)?;
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM clipboard_entries", [])?;
        for (position, entry) in entries.iter().enumerate() {
            tx.execute(
                "INSERT INTO clipboard_entries (position, id, text, type, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    i64::try_from(position)?,
                    entry.id,
                    entry.text,
                    entry.r#type.as_ref(),
                    entry.created_at.to_rfc3339(),
                ],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    fn describe(&self) -> String {
        format!("sqlite:{}", self.path.display())
    }
}
