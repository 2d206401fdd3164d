pub mod migrations;

use std::path::Path;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use rusqlite::{Connection, OptionalExtension};
use tracing::info;

/// Flat string key-value store backed by a single SQLite file.
///
/// All namespaces share one database; a [`Namespace`] handle scopes
/// every operation to its own key space.
pub struct KvStore {
    conn: Mutex<Connection>,
}

impl KvStore {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;

        // WAL mode for concurrent reads
        conn.pragma_update(None, "journal_mode", "WAL")?;

        migrations::run(&conn)?;

        info!("KV store opened at {}", path.display());
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Handle scoped to one named key space. Namespaces come into
    /// existence on first use; there is nothing to create up front.
    pub fn namespace(self: &Arc<Self>, name: impl Into<String>) -> Namespace {
        Namespace {
            store: self.clone(),
            name: name.into(),
        }
    }

    fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let conn = self
            .conn
            .lock()
            .map_err(|e| anyhow::anyhow!("KV lock poisoned: {}", e))?;
        f(&conn)
    }
}

/// Cheaply clonable view of one key space. Calls block on SQLite;
/// async callers run them via `spawn_blocking`.
#[derive(Clone)]
pub struct Namespace {
    store: Arc<KvStore>,
    name: String,
}

impl Namespace {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn get(&self, key: &str) -> Result<Option<String>> {
        self.store.with_conn(|conn| {
            let value = conn
                .query_row(
                    "SELECT value FROM kv_entries WHERE namespace = ?1 AND key = ?2",
                    (self.name.as_str(), key),
                    |row| row.get(0),
                )
                .optional()?;
            Ok(value)
        })
    }

    pub fn put(&self, key: &str, value: &str) -> Result<()> {
        self.store.with_conn(|conn| {
            conn.execute(
                "INSERT INTO kv_entries (namespace, key, value) VALUES (?1, ?2, ?3)
                 ON CONFLICT (namespace, key)
                 DO UPDATE SET value = excluded.value, updated_at = datetime('now')",
                (self.name.as_str(), key, value),
            )?;
            Ok(())
        })
    }

    pub fn delete(&self, key: &str) -> Result<()> {
        self.store.with_conn(|conn| {
            conn.execute(
                "DELETE FROM kv_entries WHERE namespace = ?1 AND key = ?2",
                (self.name.as_str(), key),
            )?;
            Ok(())
        })
    }

    /// Keys currently present in this namespace, lexicographic order.
    pub fn list(&self) -> Result<Vec<String>> {
        self.store.with_conn(|conn| {
            let mut stmt =
                conn.prepare("SELECT key FROM kv_entries WHERE namespace = ?1 ORDER BY key")?;
            let keys = stmt
                .query_map([self.name.as_str()], |row| row.get(0))?
                .collect::<std::result::Result<Vec<String>, _>>()?;
            Ok(keys)
        })
    }
}
