use std::sync::Arc;

use serde_json::{json, Value};
use wasm_bindgen::prelude::*;

use watchit_core::models::SuggestionItem;
use watchit_core::recent::RecentSearches;
use watchit_core::search::{Action, Key, Message, SearchBox, SUGGESTION_DEBOUNCE};

use crate::storage::LocalStorage;

/// The search box state machine. The page owns the timer and the requests:
/// every method returns the action JSON to carry out, one of
/// `{"type":"none"}`, `{"type":"schedule","seq","query","delayMs"}`,
/// `{"type":"cancel"}` or `{"type":"commit","query","path"?}`.
#[wasm_bindgen]
pub struct Search {
    inner: SearchBox,
}

#[wasm_bindgen]
impl Search {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Search {
        Self {
            inner: SearchBox::new(RecentSearches::load(Arc::new(LocalStorage::new()))),
        }
    }

    pub fn input(&mut self, text: String) -> String {
        self.send(Message::InputChanged(text))
    }

    pub fn focus(&mut self) -> String {
        self.send(Message::Focused)
    }

    /// `key` is a `KeyboardEvent.key` value; other keys are ignored.
    pub fn key(&mut self, key: &str) -> String {
        match parse_key(key) {
            Some(key) => self.send(Message::KeyPressed(key)),
            None => action_json(Action::None),
        }
    }

    #[wasm_bindgen(js_name = outsideClick)]
    pub fn outside_click(&mut self) -> String {
        self.send(Message::OutsideClicked)
    }

    pub fn submit(&mut self) -> String {
        self.send(Message::Submitted)
    }

    pub fn hover(&mut self, index: usize) -> String {
        self.send(Message::Hovered(index))
    }

    #[wasm_bindgen(js_name = clickSuggestion)]
    pub fn click_suggestion(&mut self, index: usize) -> String {
        self.send(Message::SuggestionClicked(index))
    }

    #[wasm_bindgen(js_name = clickRecent)]
    pub fn click_recent(&mut self, index: usize) -> String {
        self.send(Message::RecentClicked(index))
    }

    /// Report a lookup outcome: `suggestions` is a JSON array of
    /// `{"id","label","destination":{"kind","id"}}`, or `undefined` on failure.
    #[wasm_bindgen(js_name = lookupFinished)]
    pub fn lookup_finished(&mut self, seq: u32, suggestions: Option<String>) -> String {
        let result = match suggestions {
            Some(json) => {
                serde_json::from_str::<Vec<SuggestionItem>>(&json).map_err(|e| e.to_string())
            }
            None => Err("lookup failed".to_string()),
        };
        self.send(Message::LookupFinished {
            seq: seq.into(),
            result,
        })
    }

    /// Current view as JSON: query, open, suggestions, active, recent.
    pub fn view(&self) -> String {
        view_json(&self.inner).to_string()
    }
}

impl Default for Search {
    fn default() -> Self {
        Self::new()
    }
}

impl Search {
    fn send(&mut self, msg: Message) -> String {
        action_json(self.inner.update(msg))
    }
}

fn parse_key(key: &str) -> Option<Key> {
    match key {
        "ArrowDown" => Some(Key::ArrowDown),
        "ArrowUp" => Some(Key::ArrowUp),
        "Enter" => Some(Key::Enter),
        "Escape" => Some(Key::Escape),
        _ => None,
    }
}

fn action_json(action: Action) -> String {
    let value = match action {
        Action::None => json!({ "type": "none" }),
        Action::ScheduleLookup { seq, query } => json!({
            "type": "schedule",
            "seq": seq,
            "query": query,
            "delayMs": SUGGESTION_DEBOUNCE.as_millis() as u64,
        }),
        Action::CancelLookup => json!({ "type": "cancel" }),
        Action::Commit { query, destination } => match destination {
            Some(dest) => json!({ "type": "commit", "query": query, "path": dest.to_string() }),
            None => json!({ "type": "commit", "query": query }),
        },
    };
    value.to_string()
}

fn view_json(search: &SearchBox) -> Value {
    json!({
        "query": search.query(),
        "open": search.is_open(),
        "suggestions": search.suggestions(),
        "active": search.active_index(),
        "recent": search.recent(),
    })
}
