//! Async driver for [`SearchBox`]: debounced lookups against a
//! [`MetadataService`] and a `watch` channel of view snapshots.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde::Serialize;
use tokio::sync::watch;

use watchit_api::traits::MetadataService;
use watchit_core::models::{Destination, SuggestionItem};
use watchit_core::recent::RecentSearches;
use watchit_core::search::{merge_suggestions, Action, Message, SearchBox};

use crate::debounce::Debouncer;

/// What the search box currently shows.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SearchView {
    pub query: String,
    pub open: bool,
    pub suggestions: Vec<SuggestionItem>,
    pub active: Option<usize>,
    pub recent: Vec<String>,
}

impl SearchView {
    fn of(search: &SearchBox) -> Self {
        Self {
            query: search.query().to_string(),
            open: search.is_open(),
            suggestions: search.suggestions().to_vec(),
            active: search.active_index(),
            recent: search.recent().to_vec(),
        }
    }
}

/// A query the user committed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Committed {
    pub query: String,
    /// Set when a suggestion was chosen; navigate there.
    pub destination: Option<Destination>,
}

struct Shared {
    search: Mutex<SearchBox>,
    view: watch::Sender<SearchView>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, SearchBox> {
        self.search.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Apply a message and publish the resulting view.
    fn apply(&self, msg: Message) -> Action {
        let mut search = self.lock();
        let action = search.update(msg);
        let view = SearchView::of(&search);
        drop(search);
        self.view.send_if_modified(|current| {
            if *current == view {
                false
            } else {
                *current = view;
                true
            }
        });
        action
    }
}

/// One search box bound to a catalog.
///
/// Must be used from within a tokio runtime.
pub struct SearchSession<M> {
    shared: Arc<Shared>,
    service: Arc<M>,
    debouncer: Debouncer,
}

impl<M> SearchSession<M>
where
    M: MetadataService + 'static,
{
    pub fn new(service: Arc<M>, recent: RecentSearches, debounce: Duration) -> Self {
        let search = SearchBox::new(recent);
        let (view, _) = watch::channel(SearchView::of(&search));
        Self {
            shared: Arc::new(Shared {
                search: Mutex::new(search),
                view,
            }),
            service,
            debouncer: Debouncer::new(debounce),
        }
    }

    /// Start with text supplied by the page, scheduling its lookup.
    pub fn with_query(
        service: Arc<M>,
        recent: RecentSearches,
        debounce: Duration,
        query: impl Into<String>,
    ) -> Self {
        let mut session = Self::new(service, recent, debounce);
        session.handle(Message::InputChanged(query.into()));
        session
    }

    pub fn subscribe(&self) -> watch::Receiver<SearchView> {
        self.shared.view.subscribe()
    }

    pub fn view(&self) -> SearchView {
        self.shared.view.borrow().clone()
    }

    /// Feed a UI event. Returns the committed query, if this event committed one.
    pub fn handle(&mut self, msg: Message) -> Option<Committed> {
        match self.shared.apply(msg) {
            Action::None => None,
            Action::ScheduleLookup { seq, query } => {
                tracing::debug!(seq, query = %query, "scheduling suggestion lookup");
                let shared = Arc::clone(&self.shared);
                let service = Arc::clone(&self.service);
                self.debouncer.schedule(async move {
                    let result = lookup(service.as_ref(), &query).await;
                    shared.apply(Message::LookupFinished { seq, result });
                });
                None
            }
            Action::CancelLookup => {
                self.debouncer.cancel();
                None
            }
            Action::Commit { query, destination } => {
                self.debouncer.cancel();
                Some(Committed { query, destination })
            }
        }
    }

    /// Re-read recent searches after another context changed them.
    pub fn reload_recent(&self) {
        self.shared.lock().recent_store_mut().reload();
        let view = SearchView::of(&self.shared.lock());
        self.shared.view.send_replace(view);
    }

    pub fn clear_recent(&self) {
        self.shared.lock().recent_store_mut().clear();
        let view = SearchView::of(&self.shared.lock());
        self.shared.view.send_replace(view);
    }
}

/// First page of both searches, run concurrently, merged movies first.
pub async fn lookup<M: MetadataService>(
    service: &M,
    query: &str,
) -> Result<Vec<SuggestionItem>, String> {
    let (movies, shows) = futures::future::try_join(
        service.search_movies(query, 1),
        service.search_tv(query, 1),
    )
    .await
    .map_err(|e| {
        tracing::warn!(query, error = %e, "suggestion lookup failed");
        e.to_string()
    })?;

    Ok(merge_suggestions(
        movies
            .results
            .into_iter()
            .map(|r| SuggestionItem::movie(r.id, r.name)),
        shows
            .results
            .into_iter()
            .map(|r| SuggestionItem::series(r.id, r.name)),
    ))
}
