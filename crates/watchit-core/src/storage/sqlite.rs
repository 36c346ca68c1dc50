use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};

use super::{ChangeListener, KeyValueStore, ListenerId};
use crate::error::StorageError;

const SCHEMA_V1: &str = include_str!("../../../../migrations/001_key_value.sql");

#[derive(Default)]
struct Watched {
    listeners: Vec<(ListenerId, String, ChangeListener)>,
    /// Last value this handle wrote or observed for each watched key.
    last_seen: HashMap<String, Option<String>>,
}

/// SQLite-backed key-value store for native builds.
///
/// Several processes may open the same file. There is no push notification
/// between them; [`poll_external_changes`](Self::poll_external_changes) diffs
/// the watched keys against what this handle last saw.
pub struct SqliteStorage {
    conn: Mutex<Connection>,
    watched: Mutex<Watched>,
    next_listener: AtomicU64,
}

impl SqliteStorage {
    /// Open (or create) the store at the given path and run migrations.
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA busy_timeout=2000;")?;
        Self::with_connection(conn)
    }

    /// Open an in-memory store (for tests).
    pub fn open_memory() -> Result<Self, StorageError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StorageError> {
        conn.execute_batch(SCHEMA_V1)?;
        Ok(Self {
            conn: Mutex::new(conn),
            watched: Mutex::new(Watched::default()),
            next_listener: AtomicU64::new(0),
        })
    }

    /// Fire listeners for watched keys whose stored value differs from the
    /// last one this handle saw. Returns the number of changed keys.
    pub fn poll_external_changes(&self) -> Result<usize, StorageError> {
        let keys: Vec<String> = {
            let watched = self.watched();
            let mut keys: Vec<String> = watched.last_seen.keys().cloned().collect();
            keys.sort();
            keys
        };

        let mut changed = Vec::new();
        for key in keys {
            let current = self.read(&key)?;
            let mut watched = self.watched();
            if watched.last_seen.get(&key) != Some(&current) {
                watched.last_seen.insert(key.clone(), current);
                changed.push(key);
            }
        }

        let fired: Vec<(String, ChangeListener)> = {
            let watched = self.watched();
            watched
                .listeners
                .iter()
                .filter(|(_, key, _)| changed.contains(key))
                .map(|(_, key, l)| (key.clone(), Arc::clone(l)))
                .collect()
        };
        for (key, listener) in fired {
            tracing::debug!(key = %key, "external store change");
            listener(&key);
        }
        Ok(changed.len())
    }

    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        let conn = self.conn()?;
        conn.query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
            row.get(0)
        })
        .optional()
        .map_err(Into::into)
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, StorageError> {
        self.conn
            .lock()
            .map_err(|_| StorageError::Unavailable("connection lock poisoned".into()))
    }

    fn watched(&self) -> MutexGuard<'_, Watched> {
        self.watched.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl KeyValueStore for SqliteStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.read(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        {
            let conn = self.conn()?;
            conn.execute(
                "INSERT INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value,
                                                updated_at = excluded.updated_at",
                params![key, value, Utc::now().to_rfc3339()],
            )?;
        }
        let mut watched = self.watched();
        if let Some(seen) = watched.last_seen.get_mut(key) {
            *seen = Some(value.to_string());
        }
        Ok(())
    }

    fn on_external_change(&self, key: &str, listener: ChangeListener) -> ListenerId {
        let id = ListenerId(self.next_listener.fetch_add(1, Ordering::Relaxed));
        let initial = self.read(key).unwrap_or_else(|e| {
            tracing::warn!(key, error = %e, "failed to snapshot watched key");
            None
        });
        let mut watched = self.watched();
        watched.last_seen.entry(key.to_string()).or_insert(initial);
        watched.listeners.push((id, key.to_string(), listener));
        id
    }

    fn remove_listener(&self, id: ListenerId) {
        let mut watched = self.watched();
        watched.listeners.retain(|(lid, _, _)| *lid != id);
        let Watched {
            listeners,
            last_seen,
        } = &mut *watched;
        last_seen.retain(|key, _| listeners.iter().any(|(_, k, _)| k == key));
    }

    fn announce(&self, key: &str, origin: Option<ListenerId>) {
        let fired: Vec<ChangeListener> = self
            .watched()
            .listeners
            .iter()
            .filter(|(id, k, _)| k == key && Some(*id) != origin)
            .map(|(_, _, l)| Arc::clone(l))
            .collect();
        for listener in fired {
            listener(key);
        }
    }
}
