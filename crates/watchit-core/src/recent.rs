use std::sync::Arc;

use crate::storage::{self, KeyValueStore, RECENT_SEARCHES_KEY};

/// Maximum number of remembered queries.
pub const MAX_RECENT: usize = 8;

/// Most-recent-first list of committed search queries.
pub struct RecentSearches {
    storage: Arc<dyn KeyValueStore>,
    items: Vec<String>,
}

impl RecentSearches {
    pub fn load(storage: Arc<dyn KeyValueStore>) -> Self {
        let items = read(storage.as_ref());
        Self { storage, items }
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.items.get(index).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Move `query` to the front, dropping any older copy and anything past
    /// [`MAX_RECENT`]. Empty queries are ignored.
    pub fn push(&mut self, query: &str) {
        if query.is_empty() {
            return;
        }
        self.items.retain(|q| q != query);
        self.items.insert(0, query.to_string());
        self.items.truncate(MAX_RECENT);
        self.persist();
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.persist();
    }

    /// Re-read the persisted list, e.g. after another context wrote it.
    pub fn reload(&mut self) {
        self.items = read(self.storage.as_ref());
    }

    fn persist(&self) {
        let result = storage::write_json(self.storage.as_ref(), RECENT_SEARCHES_KEY, &self.items);
        if let Err(e) = result {
            tracing::warn!(error = %e, "failed to persist recent searches");
        }
    }
}

fn read(storage: &dyn KeyValueStore) -> Vec<String> {
    let mut items: Vec<String> = storage::read_json_or_default(storage, RECENT_SEARCHES_KEY);
    let mut seen = std::collections::HashSet::new();
    items.retain(|q| !q.is_empty() && seen.insert(q.clone()));
    items.truncate(MAX_RECENT);
    items
}
