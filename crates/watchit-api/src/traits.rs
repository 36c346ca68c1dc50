//! The metadata catalog seen by the rest of the app.
//!
//! Search suggestions only need the two title searches; any catalog that can
//! answer them (TMDB, a cache, a test double) implements [`MetadataService`].

use std::future::Future;

/// A catalog backend that can search titles by text.
pub trait MetadataService: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Search movies by title, one page at a time (pages start at 1).
    fn search_movies(
        &self,
        query: &str,
        page: u32,
    ) -> impl Future<Output = Result<SearchPage, Self::Error>> + Send;

    /// Search TV shows by name, one page at a time (pages start at 1).
    fn search_tv(
        &self,
        query: &str,
        page: u32,
    ) -> impl Future<Output = Result<SearchPage, Self::Error>> + Send;
}

/// A title returned by a search, movie or TV alike.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SearchResult {
    pub id: u64,
    /// Movie title or show name.
    pub name: String,
    pub poster_path: Option<String>,
    pub overview: Option<String>,
    pub vote_average: Option<f32>,
    /// Release date or first air date, `YYYY-MM-DD`.
    pub date: Option<String>,
}

impl SearchResult {
    pub fn year(&self) -> Option<u32> {
        self.date.as_deref()?.get(..4)?.parse().ok()
    }
}

/// One page of search results.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SearchPage {
    pub page: u32,
    pub results: Vec<SearchResult>,
    pub total_pages: u32,
    pub total_results: u32,
}
