use std::cell::RefCell;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::StorageEvent;

use watchit_core::error::StorageError;
use watchit_core::storage::{ChangeListener, KeyValueStore, ListenerId};

#[derive(Default)]
struct Registry {
    next: u64,
    listeners: Vec<(ListenerId, String, ChangeListener)>,
    /// The window `storage` handler, installed with the first listener.
    handler: Option<Closure<dyn FnMut(StorageEvent)>>,
}

thread_local! {
    static REGISTRY: RefCell<Registry> = RefCell::new(Registry::default());
}

/// `window.localStorage`.
///
/// The browser delivers a `storage` event to every other tab of the origin
/// when one of them writes, which is exactly the external-change signal.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalStorage;

impl LocalStorage {
    pub fn new() -> Self {
        Self
    }

    fn backend() -> Result<web_sys::Storage, StorageError> {
        let window =
            web_sys::window().ok_or_else(|| StorageError::Unavailable("no window".into()))?;
        window
            .local_storage()
            .map_err(js_error)?
            .ok_or_else(|| StorageError::Unavailable("localStorage disabled".into()))
    }
}

impl KeyValueStore for LocalStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Self::backend()?.get_item(key).map_err(js_error)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        Self::backend()?.set_item(key, value).map_err(js_error)
    }

    fn on_external_change(&self, key: &str, listener: ChangeListener) -> ListenerId {
        REGISTRY.with(|registry| {
            let mut registry = registry.borrow_mut();
            if registry.handler.is_none() {
                registry.handler = install_handler();
            }
            let id = ListenerId(registry.next);
            registry.next += 1;
            registry.listeners.push((id, key.to_string(), listener));
            id
        })
    }

    fn remove_listener(&self, id: ListenerId) {
        REGISTRY.with(|registry| {
            registry
                .borrow_mut()
                .listeners
                .retain(|(lid, _, _)| *lid != id);
        });
    }

    /// The browser never sends `storage` to the writing tab.
    fn announce(&self, key: &str, origin: Option<ListenerId>) {
        let fired: Vec<ChangeListener> = REGISTRY.with(|registry| {
            registry
                .borrow()
                .listeners
                .iter()
                .filter(|(id, k, _)| k == key && Some(*id) != origin)
                .map(|(_, _, l)| l.clone())
                .collect()
        });
        for listener in fired {
            listener(key);
        }
    }
}

fn install_handler() -> Option<Closure<dyn FnMut(StorageEvent)>> {
    let window = web_sys::window()?;
    let handler = Closure::<dyn FnMut(StorageEvent)>::new(dispatch);
    match window.add_event_listener_with_callback("storage", handler.as_ref().unchecked_ref()) {
        Ok(()) => Some(handler),
        Err(e) => {
            tracing::warn!(error = ?e, "failed to listen for storage events");
            None
        }
    }
}

/// A `null` key means the other tab called `localStorage.clear()`.
fn dispatch(event: StorageEvent) {
    let changed = event.key();
    let fired: Vec<(String, ChangeListener)> = REGISTRY.with(|registry| {
        registry
            .borrow()
            .listeners
            .iter()
            .filter(|(_, key, _)| changed.as_deref().map_or(true, |c| c == key))
            .map(|(_, key, l)| (key.clone(), l.clone()))
            .collect()
    });
    for (key, listener) in fired {
        listener(&key);
    }
}

fn js_error(e: JsValue) -> StorageError {
    StorageError::Unavailable(format!("{e:?}"))
}
