use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use cidian_core::dictionary::{Entry, LookupStore, StoreError};
use cidian_core::preprocess::sanitize_prefix;
use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags, OptionalExtension, Row, params, params_from_iter};

const SELECT: &str = "SELECT word, phonetic, translation, definition, exchange FROM stardict";

/// Idle read-only connections kept around between lookups
const MAX_IDLE_CONNECTIONS: usize = 4;

/// ECDICT SQLite database (`stardict` table)
///
/// Connections are opened lazily and read-only, so the store can be built
/// before the dataset has been downloaded.
pub struct Ecdict {
    path: PathBuf,
    idle: Mutex<Vec<Connection>>,
}

impl Ecdict {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            idle: Mutex::new(Vec::new()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn idle(&self) -> MutexGuard<'_, Vec<Connection>> {
        self.idle.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn open(&self) -> Result<Connection, StoreError> {
        if !self.path.exists() {
            return Err(StoreError::NotFound(self.path.display().to_string()));
        }

        tracing::debug!("Opening ECDICT at {}", self.path.display());
        Connection::open_with_flags(
            &self.path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(backend)
    }

    /// Run `f` on a pooled connection. A connection that errored is dropped.
    fn with_conn<T>(
        &self,
        f: impl FnOnce(&Connection) -> rusqlite::Result<T>,
    ) -> Result<T, StoreError> {
        let pooled = self.idle().pop();
        let conn = match pooled {
            Some(conn) => conn,
            None => self.open()?,
        };

        let out = f(&conn).map_err(backend)?;

        let mut idle = self.idle();
        if idle.len() < MAX_IDLE_CONNECTIONS {
            idle.push(conn);
        }
        Ok(out)
    }
}

impl LookupStore for Ecdict {
    fn get_exact(&self, key: &str) -> Result<Option<Entry>, StoreError> {
        let key = key.trim();
        if key.is_empty() {
            return Ok(None);
        }

        self.with_conn(|conn| {
            conn.prepare_cached(&format!("{SELECT} WHERE word = ?1 LIMIT 1"))?
                .query_row(params![key], read_entry)
                .optional()
        })
    }

    fn get_many(&self, keys: &[String]) -> Result<Vec<Entry>, StoreError> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = vec!["?"; keys.len()].join(",");
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!("{SELECT} WHERE word IN ({placeholders})"))?;
            let rows = stmt.query_map(params_from_iter(keys.iter()), read_entry)?;
            rows.collect()
        })
    }

    fn get_prefix(&self, prefix: &str, limit: usize) -> Result<Vec<Entry>, StoreError> {
        let prefix = sanitize_prefix(prefix);
        if prefix.is_empty() {
            return Ok(Vec::new());
        }

        self.with_conn(|conn| {
            let mut stmt = conn.prepare_cached(&format!(
                "{SELECT} WHERE sw LIKE ?1 \
                 ORDER BY IFNULL(frq, 0) > 0 DESC, IFNULL(frq, 0), rowid LIMIT ?2"
            ))?;
            let rows = stmt.query_map(params![format!("{prefix}%"), limit as i64], read_entry)?;
            rows.collect()
        })
    }
}

fn backend(e: rusqlite::Error) -> StoreError {
    StoreError::Backend(Box::new(e))
}

fn read_entry(row: &Row<'_>) -> rusqlite::Result<Entry> {
    Ok(Entry {
        key: text(row, 0)?,
        phonetic: text(row, 1)?,
        translation: text(row, 2)?,
        definition: text(row, 3)?,
        exchange: text(row, 4)?,
    })
}

/// Any column type as text, NULL as empty
fn text(row: &Row<'_>, idx: usize) -> rusqlite::Result<String> {
    Ok(match row.get_ref(idx)? {
        ValueRef::Null => String::new(),
        ValueRef::Integer(i) => i.to_string(),
        ValueRef::Real(f) => f.to_string(),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => String::from_utf8_lossy(bytes).into_owned(),
    })
}
