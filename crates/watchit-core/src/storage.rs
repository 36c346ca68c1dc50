//! Key-value persistence capability.
//!
//! Everything the app persists lives under a handful of well-known keys as
//! serialized JSON. Backends implement [`KeyValueStore`]: an in-memory profile
//! for tests and embedding, SQLite for native builds, and `localStorage` in the
//! wasm crate.

mod memory;
#[cfg(feature = "sqlite")]
mod sqlite;

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::StorageError;

pub use memory::MemoryStorage;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteStorage;

/// Saved watchlist, a JSON array of entries.
pub const WATCHLIST_KEY: &str = "watchit_watchlist";
/// Recent search queries, a JSON array of strings.
pub const RECENT_SEARCHES_KEY: &str = "watchit_recent_searches";
/// Stable per-profile session identifier (UUID string, stored raw).
pub const SESSION_KEY: &str = "watchit_session_id";

/// Callback fired with the changed key.
pub type ChangeListener = Arc<dyn Fn(&str) + Send + Sync>;

/// Handle returned by [`KeyValueStore::on_external_change`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

/// Local key-value persistence shared by every context of one profile.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Register for writes to `key` made by another context (tab, window or
    /// process). A context's own writes never reach its listeners.
    fn on_external_change(&self, key: &str, listener: ChangeListener) -> ListenerId;

    fn remove_listener(&self, id: ListenerId);

    /// Tell this context's own listeners on `key` that it was just written
    /// here, skipping `origin`. This is the in-context counterpart of the
    /// external signal, so that several views of one context stay in step.
    fn announce(&self, key: &str, origin: Option<ListenerId>);
}

/// Read and decode a JSON value, degrading to `T::default()` on any failure.
pub fn read_json_or_default<T>(store: &dyn KeyValueStore, key: &str) -> T
where
    T: DeserializeOwned + Default,
{
    match read_json(store, key) {
        Ok(Some(value)) => value,
        Ok(None) => T::default(),
        Err(e) => {
            tracing::warn!(key, error = %e, "discarding unreadable stored value");
            T::default()
        }
    }
}

pub fn read_json<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> Result<Option<T>, StorageError> {
    match store.get(key)? {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

pub fn write_json<T: Serialize + ?Sized>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), StorageError> {
    let raw = serde_json::to_string(value)?;
    store.set(key, &raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_payload_reads_as_default() {
        let store = MemoryStorage::new();
        store.set(RECENT_SEARCHES_KEY, "{not json").unwrap();
        let recent: Vec<String> = read_json_or_default(&store, RECENT_SEARCHES_KEY);
        assert!(recent.is_empty());
        assert!(read_json::<Vec<String>>(&store, RECENT_SEARCHES_KEY).is_err());
    }

    #[test]
    fn test_unavailable_reads_as_default() {
        let store = MemoryStorage::new();
        write_json(&store, RECENT_SEARCHES_KEY, &["dune"]).unwrap();
        store.set_unavailable(true);
        let recent: Vec<String> = read_json_or_default(&store, RECENT_SEARCHES_KEY);
        assert!(recent.is_empty());
    }
}
