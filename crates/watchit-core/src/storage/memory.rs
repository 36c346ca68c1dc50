use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::{ChangeListener, KeyValueStore, ListenerId};
use crate::error::StorageError;

struct Registration {
    id: ListenerId,
    context: u64,
    key: String,
    listener: ChangeListener,
}

#[derive(Default)]
struct Profile {
    data: HashMap<String, String>,
    listeners: Vec<Registration>,
    next_context: u64,
    next_listener: u64,
    unavailable: bool,
}

/// In-memory storage profile.
///
/// Every handle is one context of the profile, the way each open tab is a
/// context of the browser's `localStorage`. Handles from [`open_context`] share
/// the data; a write through one of them notifies the listeners of all others.
///
/// [`open_context`]: MemoryStorage::open_context
pub struct MemoryStorage {
    profile: Arc<Mutex<Profile>>,
    context: u64,
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStorage {
    pub fn new() -> Self {
        let mut profile = Profile::default();
        let context = profile.next_context;
        profile.next_context += 1;
        Self {
            profile: Arc::new(Mutex::new(profile)),
            context,
        }
    }

    /// Another context on the same profile.
    pub fn open_context(&self) -> Self {
        let mut profile = self.lock();
        let context = profile.next_context;
        profile.next_context += 1;
        Self {
            profile: Arc::clone(&self.profile),
            context,
        }
    }

    /// Make every read and write fail until reset.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.lock().unavailable = unavailable;
    }

    /// Clear the whole profile from outside any context (e.g. the user wiping
    /// site data). Every registered listener is notified.
    pub fn wipe(&self) {
        let fired: Vec<(String, ChangeListener)> = {
            let mut profile = self.lock();
            profile.data.clear();
            profile
                .listeners
                .iter()
                .map(|r| (r.key.clone(), Arc::clone(&r.listener)))
                .collect()
        };
        for (key, listener) in fired {
            listener(&key);
        }
    }

    fn lock(&self) -> MutexGuard<'_, Profile> {
        self.profile.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl KeyValueStore for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let profile = self.lock();
        if profile.unavailable {
            return Err(StorageError::Unavailable("memory profile disabled".into()));
        }
        Ok(profile.data.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        // Listeners run after the lock is released; they usually read back.
        let fired: Vec<ChangeListener> = {
            let mut profile = self.lock();
            if profile.unavailable {
                return Err(StorageError::Unavailable("memory profile disabled".into()));
            }
            profile.data.insert(key.to_string(), value.to_string());
            profile
                .listeners
                .iter()
                .filter(|r| r.context != self.context && r.key == key)
                .map(|r| Arc::clone(&r.listener))
                .collect()
        };
        for listener in fired {
            listener(key);
        }
        Ok(())
    }

    fn on_external_change(&self, key: &str, listener: ChangeListener) -> ListenerId {
        let mut profile = self.lock();
        let id = ListenerId(profile.next_listener);
        profile.next_listener += 1;
        profile.listeners.push(Registration {
            id,
            context: self.context,
            key: key.to_string(),
            listener,
        });
        id
    }

    fn remove_listener(&self, id: ListenerId) {
        self.lock().listeners.retain(|r| r.id != id);
    }

    fn announce(&self, key: &str, origin: Option<ListenerId>) {
        let fired: Vec<ChangeListener> = self
            .lock()
            .listeners
            .iter()
            .filter(|r| r.context == self.context && r.key == key && Some(r.id) != origin)
            .map(|r| Arc::clone(&r.listener))
            .collect();
        for listener in fired {
            listener(key);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    fn counter() -> (Arc<AtomicUsize>, ChangeListener) {
        let hits = Arc::new(AtomicUsize::new(0));
        let h = Arc::clone(&hits);
        let listener: ChangeListener = Arc::new(move |_key: &str| {
            h.fetch_add(1, Ordering::SeqCst);
        });
        (hits, listener)
    }

    #[test]
    fn test_contexts_share_data() {
        let tab_a = MemoryStorage::new();
        let tab_b = tab_a.open_context();
        tab_a.set("k", "v").unwrap();
        assert_eq!(tab_b.get("k").unwrap().as_deref(), Some("v"));
    }

    #[test]
    fn test_own_writes_do_not_notify() {
        let tab_a = MemoryStorage::new();
        let tab_b = tab_a.open_context();
        let (hits_a, listener_a) = counter();
        let (hits_b, listener_b) = counter();
        tab_a.on_external_change("k", listener_a);
        tab_b.on_external_change("k", listener_b);

        tab_a.set("k", "1").unwrap();
        assert_eq!(hits_a.load(Ordering::SeqCst), 0);
        assert_eq!(hits_b.load(Ordering::SeqCst), 1);

        tab_a.set("other", "1").unwrap();
        assert_eq!(hits_b.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_removed_listener_is_silent() {
        let tab_a = MemoryStorage::new();
        let tab_b = tab_a.open_context();
        let (hits, listener) = counter();
        let id = tab_b.on_external_change("k", listener);
        tab_b.remove_listener(id);
        tab_a.set("k", "1").unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_wipe_notifies_every_context() {
        let tab_a = MemoryStorage::new();
        let tab_b = tab_a.open_context();
        let (hits, listener) = counter();
        tab_a.on_external_change("k", Arc::clone(&listener));
        tab_b.on_external_change("k", listener);
        tab_a.set("k", "1").unwrap();

        tab_a.wipe();
        assert_eq!(hits.load(Ordering::SeqCst), 3);
        assert!(tab_b.get("k").unwrap().is_none());
    }

    #[test]
    fn test_announce_stays_in_context() {
        let tab_a = MemoryStorage::new();
        let tab_b = tab_a.open_context();
        let (hits_writer, writer) = counter();
        let (hits_sibling, sibling) = counter();
        let (hits_other_tab, other_tab) = counter();
        let origin = tab_a.on_external_change("k", writer);
        tab_a.on_external_change("k", sibling);
        tab_b.on_external_change("k", other_tab);

        tab_a.announce("k", Some(origin));
        assert_eq!(hits_writer.load(Ordering::SeqCst), 0);
        assert_eq!(hits_sibling.load(Ordering::SeqCst), 1);
        assert_eq!(hits_other_tab.load(Ordering::SeqCst), 0);

        tab_a.announce("other", None);
        assert_eq!(hits_sibling.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_unavailable_profile_fails() {
        let store = MemoryStorage::new();
        store.set_unavailable(true);
        assert!(store.set("k", "v").is_err());
        assert!(store.get("k").is_err());
        store.set_unavailable(false);
        assert!(store.get("k").unwrap().is_none());
    }
}
