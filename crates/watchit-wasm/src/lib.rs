//! Browser bindings: the watchlist over `localStorage`, shared by every tab,
//! and the search box state machine.

mod search;
mod storage;

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::sync::Arc;

use wasm_bindgen::prelude::*;

use watchit_core::models::{MediaKind, WatchlistEntry};
use watchit_core::session;
use watchit_core::watchlist::{ObserverId, WatchlistStore};

pub use search::Search;
pub use storage::LocalStorage;

thread_local! {
    static CALLBACKS: RefCell<HashMap<u32, js_sys::Function>> = RefCell::new(HashMap::new());
}

/// Handle to a watchlist store over the tab's `localStorage`. Handles in one
/// tab see each other's changes as soon as they are written. Entries cross the
/// boundary as JSON (`{"id", "type", "title", "posterUrl"}`).
#[wasm_bindgen]
pub struct Watchlist {
    store: Arc<WatchlistStore>,
    subscriptions: RefCell<HashMap<u32, ObserverId>>,
    next_subscription: Cell<u32>,
}

#[wasm_bindgen]
impl Watchlist {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Watchlist {
        Self {
            store: WatchlistStore::init(Arc::new(LocalStorage::new())),
            subscriptions: RefCell::new(HashMap::new()),
            next_subscription: Cell::new(0),
        }
    }

    pub fn list(&self) -> String {
        to_json(&self.store.list())
    }

    #[wasm_bindgen(js_name = listKind)]
    pub fn list_kind(&self, kind: &str) -> Result<String, JsError> {
        Ok(to_json(&self.store.list_kind(parse_kind(kind)?)))
    }

    pub fn has(&self, kind: &str, id: u32) -> Result<bool, JsError> {
        Ok(self.store.has(parse_kind(kind)?, id.into()))
    }

    pub fn add(&self, entry: &str) -> Result<bool, JsError> {
        Ok(self.store.add(parse_entry(entry)?))
    }

    pub fn remove(&self, kind: &str, id: u32) -> Result<bool, JsError> {
        Ok(self.store.remove(parse_kind(kind)?, id.into()))
    }

    pub fn toggle(&self, entry: &str) -> Result<bool, JsError> {
        Ok(self.store.toggle(parse_entry(entry)?))
    }

    /// Call `callback(json)` with the new list after every change, including
    /// changes made in other tabs. Returns a subscription id.
    pub fn subscribe(&self, callback: js_sys::Function) -> u32 {
        let token = self.next_subscription.get();
        self.next_subscription.set(token.wrapping_add(1));
        CALLBACKS.with(|cbs| cbs.borrow_mut().insert(token, callback));

        let observer = self.store.subscribe(move |entries| {
            let json = JsValue::from_str(&to_json(entries));
            let callback = CALLBACKS.with(|cbs| cbs.borrow().get(&token).cloned());
            if let Some(callback) = callback {
                if let Err(e) = callback.call1(&JsValue::NULL, &json) {
                    tracing::warn!(error = ?e, "watchlist subscriber threw");
                }
            }
        });
        self.subscriptions.borrow_mut().insert(token, observer);
        token
    }

    pub fn unsubscribe(&self, token: u32) {
        if let Some(observer) = self.subscriptions.borrow_mut().remove(&token) {
            self.store.unsubscribe(observer);
        }
        CALLBACKS.with(|cbs| cbs.borrow_mut().remove(&token));
    }

    /// Stop following writes made by other tabs and other handles.
    pub fn dispose(&self) {
        self.store.dispose();
    }
}

impl Default for Watchlist {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Watchlist {
    fn drop(&mut self) {
        let tokens: Vec<u32> = self.subscriptions.borrow().keys().copied().collect();
        for token in tokens {
            self.unsubscribe(token);
        }
    }
}

/// Per-profile id, created on first use.
#[wasm_bindgen(js_name = sessionId)]
pub fn session_id() -> String {
    session::session_id(&LocalStorage::new())
}

fn parse_kind(kind: &str) -> Result<MediaKind, JsError> {
    MediaKind::from_path(kind).ok_or_else(|| JsError::new(&format!("unknown media type: {kind}")))
}

fn parse_entry(json: &str) -> Result<WatchlistEntry, JsError> {
    serde_json::from_str(json).map_err(|e| JsError::new(&format!("invalid entry: {e}")))
}

fn to_json(entries: &[WatchlistEntry]) -> String {
    serde_json::to_string(entries).unwrap_or_else(|_| "[]".to_string())
}
