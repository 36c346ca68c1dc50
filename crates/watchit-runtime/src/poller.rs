use std::sync::{Arc, Weak};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use watchit_core::storage::SqliteStorage;

/// Periodically surface writes made to the store by other processes.
///
/// Stops on its own once the storage is dropped.
pub fn spawn_change_poller(storage: &Arc<SqliteStorage>, every: Duration) -> JoinHandle<()> {
    let storage: Weak<SqliteStorage> = Arc::downgrade(storage);
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let Some(store) = storage.upgrade() else {
                tracing::debug!("store dropped, stopping change poller");
                break;
            };
            let polled = tokio::task::spawn_blocking(move || store.poll_external_changes()).await;
            match polled {
                Ok(Ok(0)) => {}
                Ok(Ok(changed)) => tracing::debug!(changed, "picked up external changes"),
                Ok(Err(e)) => tracing::warn!(error = %e, "change poll failed"),
                Err(e) => tracing::warn!(error = %e, "change poll task panicked"),
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use watchit_core::models::{MediaKind, WatchlistEntry};
    use watchit_core::storage::KeyValueStore;
    use watchit_core::watchlist::WatchlistStore;

    use super::*;

    #[tokio::test]
    async fn test_poller_reconciles_other_process_writes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("watchit.db");
        let ours = Arc::new(SqliteStorage::open(&path).unwrap());
        let theirs: Arc<dyn KeyValueStore> = Arc::new(SqliteStorage::open(&path).unwrap());

        let store = WatchlistStore::init(Arc::clone(&ours) as Arc<dyn KeyValueStore>);
        let other = WatchlistStore::init(theirs);

        let notified = Arc::new(AtomicUsize::new(0));
        let n = Arc::clone(&notified);
        store.subscribe(move |_| {
            n.fetch_add(1, Ordering::SeqCst);
        });

        let poller = spawn_change_poller(&ours, Duration::from_millis(10));
        other.add(WatchlistEntry::new(MediaKind::Movie, 603, "The Matrix"));

        for _ in 0..100 {
            if store.has(MediaKind::Movie, 603) {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert!(store.has(MediaKind::Movie, 603));
        assert!(notified.load(Ordering::SeqCst) >= 1);
        poller.abort();
    }

    #[tokio::test]
    async fn test_poller_stops_when_storage_dropped() {
        let storage = Arc::new(SqliteStorage::open_memory().unwrap());
        let poller = spawn_change_poller(&storage, Duration::from_millis(5));
        drop(storage);
        tokio::time::timeout(Duration::from_secs(1), poller)
            .await
            .unwrap()
            .unwrap();
    }
}
