use watchit_api::image::poster_url;
use watchit_api::tmdb::types::{MovieDetails, TvDetails};
use watchit_core::models::{MediaKind, WatchlistEntry};

const UNTITLED: &str = "Untitled";

/// Watchlist entry for a movie detail page.
pub fn entry_from_movie(details: &MovieDetails) -> WatchlistEntry {
    build(MediaKind::Movie, details.id, details.title.as_deref(), details.poster_path.as_deref())
}

/// Watchlist entry for a TV detail page.
pub fn entry_from_show(details: &TvDetails) -> WatchlistEntry {
    build(MediaKind::Series, details.id, details.name.as_deref(), details.poster_path.as_deref())
}

fn build(kind: MediaKind, id: u64, title: Option<&str>, poster: Option<&str>) -> WatchlistEntry {
    let title = title.filter(|t| !t.trim().is_empty()).unwrap_or(UNTITLED);
    WatchlistEntry {
        poster_ref: poster_url(poster),
        ..WatchlistEntry::new(kind, id, title)
    }
}
