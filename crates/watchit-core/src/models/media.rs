use serde::{Deserialize, Serialize};

/// Media category discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MediaKind {
    #[serde(rename = "movie")]
    Movie,
    #[serde(rename = "tv")]
    Series,
}

impl MediaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Movie => "Movie",
            Self::Series => "TV Show",
        }
    }

    /// Path segment used by the catalog API and navigation targets.
    pub fn as_path(&self) -> &'static str {
        match self {
            Self::Movie => "movie",
            Self::Series => "tv",
        }
    }

    pub fn from_path(s: &str) -> Option<Self> {
        match s {
            "movie" => Some(Self::Movie),
            "tv" => Some(Self::Series),
            _ => None,
        }
    }

    pub const ALL: &[MediaKind] = &[Self::Movie, Self::Series];
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A saved reference to a movie or TV title.
///
/// Identity is `(kind, id)`; the remaining fields are display data captured at
/// the time the entry was saved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchlistEntry {
    pub id: u64,
    #[serde(rename = "type")]
    pub kind: MediaKind,
    pub title: String,
    #[serde(rename = "posterUrl", default, skip_serializing_if = "Option::is_none")]
    pub poster_ref: Option<String>,
}

impl WatchlistEntry {
    pub fn new(kind: MediaKind, id: u64, title: impl Into<String>) -> Self {
        Self {
            id,
            kind,
            title: title.into(),
            poster_ref: None,
        }
    }

    pub fn with_poster(mut self, poster_ref: impl Into<String>) -> Self {
        self.poster_ref = Some(poster_ref.into());
        self
    }

    pub fn key(&self) -> (MediaKind, u64) {
        (self.kind, self.id)
    }

    pub fn is(&self, kind: MediaKind, id: u64) -> bool {
        self.kind == kind && self.id == id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_wire_format() {
        let entry = WatchlistEntry::new(MediaKind::Series, 1399, "Game of Thrones")
            .with_poster("https://image.tmdb.org/t/p/w342/got.jpg");
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["type"], "tv");
        assert_eq!(json["id"], 1399);
        assert_eq!(json["posterUrl"], "https://image.tmdb.org/t/p/w342/got.jpg");
    }

    #[test]
    fn test_entry_without_poster() {
        let entry: WatchlistEntry =
            serde_json::from_str(r#"{"id":27205,"type":"movie","title":"Inception"}"#).unwrap();
        assert_eq!(entry.key(), (MediaKind::Movie, 27205));
        assert!(entry.poster_ref.is_none());

        let json = serde_json::to_string(&entry).unwrap();
        assert!(!json.contains("posterUrl"));
    }

    #[test]
    fn test_unknown_kind_rejected() {
        let parsed = serde_json::from_str::<WatchlistEntry>(
            r#"{"id":1,"type":"person","title":"Someone"}"#,
        );
        assert!(parsed.is_err());
    }

    #[test]
    fn test_kind_paths() {
        for kind in MediaKind::ALL {
            assert_eq!(MediaKind::from_path(kind.as_path()), Some(*kind));
        }
        assert_eq!(MediaKind::from_path("person"), None);
    }
}
