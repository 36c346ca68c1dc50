use serde::{Deserialize, Serialize};

use super::MediaKind;

/// Where selecting a suggestion navigates to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Destination {
    pub kind: MediaKind,
    pub id: u64,
}

impl Destination {
    pub fn new(kind: MediaKind, id: u64) -> Self {
        Self { kind, id }
    }
}

impl std::fmt::Display for Destination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "/{}/{}", self.kind.as_path(), self.id)
    }
}

/// One remote search suggestion. Recomputed on every query, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestionItem {
    pub id: u64,
    pub label: String,
    pub destination: Destination,
}

impl SuggestionItem {
    pub fn movie(id: u64, title: impl Into<String>) -> Self {
        Self {
            id,
            label: title.into(),
            destination: Destination::new(MediaKind::Movie, id),
        }
    }

    pub fn series(id: u64, name: impl Into<String>) -> Self {
        Self {
            id,
            label: name.into(),
            destination: Destination::new(MediaKind::Series, id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_destination_paths() {
        let movie = SuggestionItem::movie(550, "Fight Club");
        assert_eq!(movie.destination.to_string(), "/movie/550");
        let series = SuggestionItem::series(1396, "Breaking Bad");
        assert_eq!(series.destination.to_string(), "/tv/1396");
    }
}
