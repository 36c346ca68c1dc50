mod debounce;
mod entries;
pub mod logging;
mod poller;
pub mod search;

use std::sync::Arc;

use tokio::task::JoinHandle;

use watchit_api::tmdb::TmdbClient;
use watchit_core::config::AppConfig;
use watchit_core::recent::RecentSearches;
use watchit_core::session;
use watchit_core::storage::{KeyValueStore, SqliteStorage};
use watchit_core::watchlist::WatchlistStore;

pub use debounce::Debouncer;
pub use entries::{entry_from_movie, entry_from_show};
pub use poller::spawn_change_poller;
pub use search::{Committed, SearchSession, SearchView};

#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error("config error: {0}")]
    Config(String),
    #[error("storage error: {0}")]
    Storage(String),
}

/// Everything a page needs: config, the shared watchlist, the session id and
/// the catalog client.
pub struct Runtime {
    config: AppConfig,
    storage: Arc<dyn KeyValueStore>,
    /// Set when backed by the on-disk store, which needs polling for changes
    /// made by other processes.
    sqlite: Option<Arc<SqliteStorage>>,
    watchlist: Arc<WatchlistStore>,
    session_id: String,
    tmdb: Arc<TmdbClient>,
}

impl Runtime {
    /// Load config and open the on-disk store in the data directory.
    pub fn new() -> Result<Self, RuntimeError> {
        let config = AppConfig::load().map_err(|e| RuntimeError::Config(e.to_string()))?;
        let store_path =
            AppConfig::ensure_store_path().map_err(|e| RuntimeError::Config(e.to_string()))?;
        let sqlite = Arc::new(
            SqliteStorage::open(&store_path).map_err(|e| RuntimeError::Storage(e.to_string()))?,
        );
        tracing::info!(path = %store_path.display(), "opened local store");

        let mut runtime = Self::from_parts(config, Arc::clone(&sqlite) as Arc<dyn KeyValueStore>)?;
        runtime.sqlite = Some(sqlite);
        Ok(runtime)
    }

    /// Build from injected pieces. No change poller is available.
    pub fn from_parts(
        config: AppConfig,
        storage: Arc<dyn KeyValueStore>,
    ) -> Result<Self, RuntimeError> {
        let tmdb = Arc::new(build_client(&config)?);
        let watchlist = WatchlistStore::init(Arc::clone(&storage));
        let session_id = session::session_id(storage.as_ref());
        tracing::debug!(session = %session_id, entries = watchlist.len(), "runtime ready");

        Ok(Self {
            config,
            storage,
            sqlite: None,
            watchlist,
            session_id,
            tmdb,
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn update_config(&mut self, config: AppConfig) -> Result<(), RuntimeError> {
        config
            .save()
            .map_err(|e| RuntimeError::Config(e.to_string()))?;
        self.tmdb = Arc::new(build_client(&config)?);
        self.config = config;
        Ok(())
    }

    pub fn storage(&self) -> &Arc<dyn KeyValueStore> {
        &self.storage
    }

    pub fn watchlist(&self) -> &Arc<WatchlistStore> {
        &self.watchlist
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn tmdb(&self) -> &Arc<TmdbClient> {
        &self.tmdb
    }

    /// A fresh search box sharing this runtime's recent searches.
    pub fn search_session(&self) -> SearchSession<TmdbClient> {
        SearchSession::new(
            Arc::clone(&self.tmdb),
            RecentSearches::load(Arc::clone(&self.storage)),
            self.config.search.debounce(),
        )
    }

    /// Start polling the on-disk store for other processes' writes.
    /// `None` when the runtime is not backed by SQLite.
    pub fn spawn_change_poller(&self) -> Option<JoinHandle<()>> {
        self.sqlite
            .as_ref()
            .map(|sqlite| spawn_change_poller(sqlite, self.config.sync.poll_interval()))
    }
}

fn build_client(config: &AppConfig) -> Result<TmdbClient, RuntimeError> {
    let base_url = config
        .tmdb
        .base_url()
        .map_err(|e| RuntimeError::Config(e.to_string()))?;
    let mut client = TmdbClient::new(base_url).with_language(config.tmdb.language.clone());
    if let Some(key) = config.tmdb.api_key() {
        client = client.with_api_key(key);
    }
    if let Some(token) = config.tmdb.access_token() {
        client = client.with_access_token(token);
    }
    if !client.has_credentials() {
        tracing::warn!("no TMDB credentials configured; catalog requests will be rejected");
    }
    Ok(client)
}

#[cfg(test)]
mod tests {
    use watchit_core::models::{MediaKind, WatchlistEntry};
    use watchit_core::storage::{MemoryStorage, SESSION_KEY};

    use super::*;

    fn runtime(storage: Arc<dyn KeyValueStore>) -> Runtime {
        Runtime::from_parts(AppConfig::default(), storage).unwrap()
    }

    #[test]
    fn test_from_parts_loads_saved_watchlist() {
        let storage: Arc<dyn KeyValueStore> = Arc::new(MemoryStorage::new());
        {
            let first = runtime(Arc::clone(&storage));
            first
                .watchlist()
                .add(WatchlistEntry::new(MediaKind::Series, 1396, "Breaking Bad"));
        }

        let second = runtime(storage);
        assert!(second.watchlist().has(MediaKind::Series, 1396));
    }

    #[test]
    fn test_session_id_is_stable() {
        let storage: Arc<dyn KeyValueStore> = Arc::new(MemoryStorage::new());
        let a = runtime(Arc::clone(&storage));
        let b = runtime(Arc::clone(&storage));
        assert_eq!(a.session_id(), b.session_id());
        assert_eq!(
            storage.get(SESSION_KEY).unwrap().as_deref(),
            Some(a.session_id())
        );
    }

    #[test]
    fn test_bad_base_url_is_config_error() {
        let mut config = AppConfig::default();
        config.tmdb.base_url = "not a url".into();
        let err = Runtime::from_parts(config, Arc::new(MemoryStorage::new()))
            .err()
            .unwrap();
        assert!(matches!(err, RuntimeError::Config(_)));
    }

    #[tokio::test]
    async fn test_memory_runtime_has_no_poller() {
        let rt = runtime(Arc::new(MemoryStorage::new()));
        assert!(rt.spawn_change_poller().is_none());
        let session = rt.search_session();
        assert!(session.view().recent.is_empty());
    }
}
