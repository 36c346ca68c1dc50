//! Search box interaction state.
//!
//! [`SearchBox`] owns the query text, the suggestion dropdown and keyboard
//! selection. It performs no I/O: [`SearchBox::update`] returns an [`Action`]
//! telling the driver to (re)schedule or cancel the debounced lookup, or that a
//! query was committed. The driver reports lookup outcomes back with
//! [`Message::LookupFinished`].
//!
//! Selection indexes the *actionable list*: the literal "search for <query>"
//! row (present while the trimmed query is non-empty) followed by the
//! suggestions.

use std::time::Duration;

use crate::models::{Destination, SuggestionItem};
use crate::recent::RecentSearches;

/// Quiet period before a lookup fires.
pub const SUGGESTION_DEBOUNCE: Duration = Duration::from_millis(250);
/// Suggestions kept from each source kind.
pub const SUGGESTIONS_PER_KIND: usize = 5;

/// Navigation keys the search box reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    ArrowDown,
    ArrowUp,
    Enter,
    Escape,
}

#[derive(Debug, Clone)]
pub enum Message {
    InputChanged(String),
    Focused,
    KeyPressed(Key),
    /// Pointer down outside the component.
    OutsideClicked,
    /// Form submission (search button or Enter with nothing selected).
    Submitted,
    Hovered(usize),
    SuggestionClicked(usize),
    RecentClicked(usize),
    LookupFinished {
        seq: u64,
        result: Result<Vec<SuggestionItem>, String>,
    },
}

/// What the driver must do after an update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    None,
    /// Cancel any pending lookup timer and start a new one for `query`.
    ScheduleLookup { seq: u64, query: String },
    /// Cancel any pending lookup timer.
    CancelLookup,
    /// Hand the committed text to the page; navigate if a destination is set.
    Commit {
        query: String,
        destination: Option<Destination>,
    },
}

/// One selectable row of the dropdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actionable<'a> {
    SearchFor(&'a str),
    Suggestion(&'a SuggestionItem),
}

pub struct SearchBox {
    query: String,
    open: bool,
    suggestions: Vec<SuggestionItem>,
    active: Option<usize>,
    recent: RecentSearches,
    /// Sequence number of the latest scheduled lookup.
    seq: u64,
}

impl SearchBox {
    pub fn new(recent: RecentSearches) -> Self {
        Self {
            query: String::new(),
            open: false,
            suggestions: Vec::new(),
            active: None,
            recent,
            seq: 0,
        }
    }

    /// Start with externally supplied text (e.g. the query of the results page).
    /// Returns the box and the action for that text.
    pub fn with_query(recent: RecentSearches, query: impl Into<String>) -> (Self, Action) {
        let mut search = Self::new(recent);
        let action = search.update(Message::InputChanged(query.into()));
        (search, action)
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn suggestions(&self) -> &[SuggestionItem] {
        &self.suggestions
    }

    pub fn recent(&self) -> &[String] {
        self.recent.items()
    }

    pub fn recent_store_mut(&mut self) -> &mut RecentSearches {
        &mut self.recent
    }

    /// Selected actionable row, `None` when nothing is selected.
    pub fn active_index(&self) -> Option<usize> {
        self.active
    }

    pub fn has_search_action(&self) -> bool {
        !self.query.trim().is_empty()
    }

    pub fn actionable_count(&self) -> usize {
        usize::from(self.has_search_action()) + self.suggestions.len()
    }

    pub fn actionables(&self) -> Vec<Actionable<'_>> {
        let literal = self
            .has_search_action()
            .then_some(Actionable::SearchFor(self.query.as_str()));
        literal
            .into_iter()
            .chain(self.suggestions.iter().map(Actionable::Suggestion))
            .collect()
    }

    pub fn update(&mut self, msg: Message) -> Action {
        match msg {
            Message::InputChanged(text) => {
                self.query = text;
                self.active = None;
                self.seq += 1;
                let trimmed = self.query.trim();
                if trimmed.is_empty() {
                    self.suggestions.clear();
                    self.open = false;
                    Action::CancelLookup
                } else {
                    Action::ScheduleLookup {
                        seq: self.seq,
                        query: trimmed.to_string(),
                    }
                }
            }
            Message::Focused => {
                if !self.suggestions.is_empty()
                    || !self.recent.is_empty()
                    || self.has_search_action()
                {
                    self.open = true;
                }
                Action::None
            }
            Message::KeyPressed(key) => self.on_key(key),
            Message::OutsideClicked => {
                self.open = false;
                Action::None
            }
            Message::Submitted => self.commit(self.query.clone(), None),
            Message::Hovered(index) => {
                if index < self.actionable_count() {
                    self.active = Some(index);
                }
                Action::None
            }
            Message::SuggestionClicked(index) => match self.suggestions.get(index) {
                Some(item) => {
                    let (label, destination) = (item.label.clone(), item.destination);
                    self.commit(label, Some(destination))
                }
                None => Action::None,
            },
            Message::RecentClicked(index) => match self.recent.get(index).map(str::to_string) {
                Some(query) => self.commit(query, None),
                None => Action::None,
            },
            Message::LookupFinished { seq, result } => {
                if seq != self.seq || !self.has_search_action() {
                    tracing::debug!(seq, latest = self.seq, "discarding stale suggestions");
                    return Action::None;
                }
                match result {
                    Ok(items) => {
                        self.suggestions = items;
                        self.open = true;
                    }
                    Err(e) => {
                        tracing::debug!(error = %e, "suggestion lookup failed");
                        self.suggestions.clear();
                    }
                }
                // Keep the selection inside the new list.
                if let Some(i) = self.active {
                    if i >= self.actionable_count() {
                        self.active = None;
                    }
                }
                Action::None
            }
        }
    }

    fn on_key(&mut self, key: Key) -> Action {
        let total = self.actionable_count();
        match key {
            Key::ArrowDown => {
                if !self.open {
                    self.open = true;
                } else if total > 0 {
                    let next = self.active.map_or(0, |i| i + 1);
                    self.active = Some(next.min(total - 1));
                }
                Action::None
            }
            Key::ArrowUp => {
                self.open = true;
                // Floor is the first row whenever there is one.
                self.active = match self.active {
                    _ if total == 0 => None,
                    Some(i) => Some(i.saturating_sub(1)),
                    None => Some(0),
                };
                Action::None
            }
            Key::Enter => match self.active {
                None => self.commit(self.query.clone(), None),
                Some(0) if self.has_search_action() => self.commit(self.query.clone(), None),
                Some(i) => {
                    let index = i - usize::from(self.has_search_action());
                    match self.suggestions.get(index) {
                        Some(item) => {
                            let (label, destination) = (item.label.clone(), item.destination);
                            self.commit(label, Some(destination))
                        }
                        None => Action::None,
                    }
                }
            },
            Key::Escape => {
                self.open = false;
                self.active = None;
                Action::None
            }
        }
    }

    fn commit(&mut self, query: String, destination: Option<Destination>) -> Action {
        self.recent.push(&query);
        self.open = false;
        self.active = None;
        Action::Commit { query, destination }
    }
}

/// Merge per-kind results: up to [`SUGGESTIONS_PER_KIND`] movies, then up to
/// as many shows. The order is fixed by kind, not by which lookup finished first.
pub fn merge_suggestions(
    movies: impl IntoIterator<Item = SuggestionItem>,
    shows: impl IntoIterator<Item = SuggestionItem>,
) -> Vec<SuggestionItem> {
    movies
        .into_iter()
        .take(SUGGESTIONS_PER_KIND)
        .chain(shows.into_iter().take(SUGGESTIONS_PER_KIND))
        .collect()
}
