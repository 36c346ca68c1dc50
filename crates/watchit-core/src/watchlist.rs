//! The watchlist store.
//!
//! One store per application instance holds the in-memory snapshot of saved
//! titles and keeps it in step with the persisted copy. Every context of the
//! profile writes the whole collection under [`WATCHLIST_KEY`]; conflicting
//! writes resolve last-writer-wins.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, Weak};

use crate::models::{MediaKind, WatchlistEntry};
use crate::storage::{self, KeyValueStore, ListenerId, WATCHLIST_KEY};

/// Callback receiving the snapshot after every change. Observers run with no
/// store lock held and may call back into the store.
pub type Observer = Arc<dyn Fn(&[WatchlistEntry]) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

pub struct WatchlistStore {
    storage: Arc<dyn KeyValueStore>,
    items: RwLock<Vec<WatchlistEntry>>,
    observers: Mutex<Vec<(ObserverId, Observer)>>,
    next_observer: AtomicU64,
    listener: Mutex<Option<ListenerId>>,
}

impl WatchlistStore {
    /// Load the persisted collection and start observing writes made by other
    /// contexts and by other stores on this one.
    pub fn init(storage: Arc<dyn KeyValueStore>) -> Arc<Self> {
        let items = load(storage.as_ref());
        let store = Arc::new(Self {
            storage,
            items: RwLock::new(items),
            observers: Mutex::new(Vec::new()),
            next_observer: AtomicU64::new(0),
            listener: Mutex::new(None),
        });

        let weak: Weak<Self> = Arc::downgrade(&store);
        let id = store.storage.on_external_change(
            WATCHLIST_KEY,
            Arc::new(move |_key: &str| {
                if let Some(store) = weak.upgrade() {
                    store.reconcile();
                }
            }),
        );
        *store.lock_listener() = Some(id);
        store
    }

    /// Stop observing external writes. Local operations keep working.
    pub fn dispose(&self) {
        if let Some(id) = self.lock_listener().take() {
            self.storage.remove_listener(id);
        }
    }

    /// Current snapshot, most recently added first.
    pub fn list(&self) -> Vec<WatchlistEntry> {
        self.read_items().clone()
    }

    pub fn list_kind(&self, kind: MediaKind) -> Vec<WatchlistEntry> {
        self.read_items()
            .iter()
            .filter(|e| e.kind == kind)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.read_items().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read_items().is_empty()
    }

    pub fn has(&self, kind: MediaKind, id: u64) -> bool {
        self.read_items().iter().any(|e| e.is(kind, id))
    }

    /// Insert at the front unless an entry with the same key exists.
    /// Returns whether the collection changed.
    pub fn add(&self, entry: WatchlistEntry) -> bool {
        let snapshot = {
            let mut items = self.write_items();
            if items.iter().any(|e| e.key() == entry.key()) {
                return false;
            }
            tracing::debug!(kind = ?entry.kind, id = entry.id, "watchlist add");
            items.insert(0, entry);
            items.clone()
        };
        self.commit(snapshot);
        true
    }

    /// Delete the entry with the given key. Returns whether it was present.
    pub fn remove(&self, kind: MediaKind, id: u64) -> bool {
        let snapshot = {
            let mut items = self.write_items();
            let before = items.len();
            items.retain(|e| !e.is(kind, id));
            if items.len() == before {
                return false;
            }
            tracing::debug!(?kind, id, "watchlist remove");
            items.clone()
        };
        self.commit(snapshot);
        true
    }

    /// Remove if present, add otherwise. Returns whether the entry is now saved.
    ///
    /// The membership check and the mutation are separate steps; a write from
    /// another context in between is overwritten by whichever lands last.
    pub fn toggle(&self, entry: WatchlistEntry) -> bool {
        if self.has(entry.kind, entry.id) {
            self.remove(entry.kind, entry.id);
            false
        } else {
            self.add(entry);
            true
        }
    }

    /// Replace the snapshot wholesale with the persisted collection.
    pub fn reconcile(&self) {
        let fresh = load(self.storage.as_ref());
        tracing::debug!(entries = fresh.len(), "watchlist reconciled from storage");
        *self.write_items() = fresh.clone();
        self.notify(&fresh);
    }

    pub fn subscribe(
        &self,
        observer: impl Fn(&[WatchlistEntry]) + Send + Sync + 'static,
    ) -> ObserverId {
        let id = ObserverId(self.next_observer.fetch_add(1, Ordering::Relaxed));
        self.lock_observers().push((id, Arc::new(observer)));
        id
    }

    pub fn unsubscribe(&self, id: ObserverId) {
        self.lock_observers().retain(|(oid, _)| *oid != id);
    }

    /// Persist a locally mutated snapshot, announce it to the other stores of
    /// this context, then reconcile.
    fn commit(&self, snapshot: Vec<WatchlistEntry>) {
        match storage::write_json(self.storage.as_ref(), WATCHLIST_KEY, &snapshot) {
            Ok(()) => {
                let origin = *self.lock_listener();
                self.storage.announce(WATCHLIST_KEY, origin);
                self.reconcile();
            }
            Err(e) => {
                // Storage is gone; the in-memory snapshot stays authoritative.
                tracing::warn!(error = %e, "failed to persist watchlist");
                self.notify(&snapshot);
            }
        }
    }

    fn notify(&self, snapshot: &[WatchlistEntry]) {
        let observers: Vec<Observer> = self
            .lock_observers()
            .iter()
            .map(|(_, observer)| Arc::clone(observer))
            .collect();
        for observer in observers {
            observer(snapshot);
        }
    }

    fn read_items(&self) -> std::sync::RwLockReadGuard<'_, Vec<WatchlistEntry>> {
        self.items.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_items(&self) -> std::sync::RwLockWriteGuard<'_, Vec<WatchlistEntry>> {
        self.items.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_observers(&self) -> MutexGuard<'_, Vec<(ObserverId, Observer)>> {
        self.observers.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_listener(&self) -> MutexGuard<'_, Option<ListenerId>> {
        self.listener.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for WatchlistStore {
    fn drop(&mut self) {
        self.dispose();
    }
}

/// Read the persisted collection, dropping duplicate keys (first one wins).
fn load(storage: &dyn KeyValueStore) -> Vec<WatchlistEntry> {
    let mut items: Vec<WatchlistEntry> = storage::read_json_or_default(storage, WATCHLIST_KEY);
    let mut seen = std::collections::HashSet::new();
    items.retain(|e| seen.insert(e.key()));
    items
}
