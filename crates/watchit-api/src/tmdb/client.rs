use reqwest::Client;
use serde::de::DeserializeOwned;
use url::Url;

use super::discover::{DiscoverMoviesParams, DiscoverTvParams};
use super::error::TmdbError;
use super::types::{
    CombinedCredits, Credits, GenreList, MovieDetails, MovieSummary, PaginatedResponse,
    PersonDetails, PersonSummary, Review, TmdbStatus, TrendingItem, TvDetails, TvSummary,
    VideoList,
};
use crate::traits::{MetadataService, SearchPage};

pub const DEFAULT_BASE_URL: &str = "https://api.themoviedb.org/3";

/// Window for the trending feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeWindow {
    #[default]
    Day,
    Week,
}

impl TimeWindow {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Week => "week",
        }
    }
}

/// TMDB v3 REST client.
///
/// Authenticates with a v3 `api_key` query parameter, a v4 bearer token, or
/// both. Requests without either are still sent and TMDB answers 401.
pub struct TmdbClient {
    http: Client,
    base_url: Url,
    api_key: Option<String>,
    access_token: Option<String>,
    language: Option<String>,
}

impl TmdbClient {
    pub fn new(base_url: Url) -> Self {
        Self {
            http: Client::new(),
            base_url,
            api_key: None,
            access_token: None,
            language: None,
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn has_credentials(&self) -> bool {
        self.api_key.is_some() || self.access_token.is_some()
    }

    /// Full request URL for an API path, credentials and language included.
    fn endpoint(&self, path: &str, query: &[(&str, String)]) -> Result<Url, TmdbError> {
        let raw = format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        let mut url = Url::parse(&raw).map_err(|e| TmdbError::Parse(e.to_string()))?;
        {
            let mut pairs = url.query_pairs_mut();
            if let Some(key) = &self.api_key {
                pairs.append_pair("api_key", key);
            }
            if let Some(language) = &self.language {
                pairs.append_pair("language", language);
            }
            for (name, value) in query {
                pairs.append_pair(name, value);
            }
        }
        if url.query() == Some("") {
            url.set_query(None);
        }
        Ok(url)
    }

    async fn check_response(resp: reqwest::Response) -> Result<reqwest::Response, TmdbError> {
        if resp.status().is_success() {
            Ok(resp)
        } else {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            tracing::warn!(status, "TMDB API error");
            Err(TmdbError::Api {
                status,
                message: status_message(&body),
            })
        }
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, TmdbError> {
        let url = self.endpoint(path, query)?;
        tracing::debug!(path, "TMDB request");

        let mut req = self.http.get(url).header("Accept", "application/json");
        if let Some(token) = &self.access_token {
            req = req.bearer_auth(token);
        }
        let resp = Self::check_response(req.send().await?).await?;
        resp.json()
            .await
            .map_err(|e| TmdbError::Parse(e.to_string()))
    }

    async fn get_page<T: DeserializeOwned>(
        &self,
        path: &str,
        page: u32,
    ) -> Result<PaginatedResponse<T>, TmdbError> {
        self.get(path, &[("page", page.to_string())]).await
    }

    // ── Movies ──────────────────────────────────────────────────

    pub async fn popular_movies(
        &self,
        page: u32,
    ) -> Result<PaginatedResponse<MovieSummary>, TmdbError> {
        self.get_page("movie/popular", page).await
    }

    pub async fn top_rated_movies(
        &self,
        page: u32,
    ) -> Result<PaginatedResponse<MovieSummary>, TmdbError> {
        self.get_page("movie/top_rated", page).await
    }

    pub async fn upcoming_movies(
        &self,
        page: u32,
    ) -> Result<PaginatedResponse<MovieSummary>, TmdbError> {
        self.get_page("movie/upcoming", page).await
    }

    pub async fn now_playing_movies(
        &self,
        page: u32,
    ) -> Result<PaginatedResponse<MovieSummary>, TmdbError> {
        self.get_page("movie/now_playing", page).await
    }

    pub async fn movie_details(&self, id: u64) -> Result<MovieDetails, TmdbError> {
        self.get(&format!("movie/{id}"), &[]).await
    }

    pub async fn movie_similar(
        &self,
        id: u64,
        page: u32,
    ) -> Result<PaginatedResponse<MovieSummary>, TmdbError> {
        self.get_page(&format!("movie/{id}/similar"), page).await
    }

    pub async fn movie_credits(&self, id: u64) -> Result<Credits, TmdbError> {
        self.get(&format!("movie/{id}/credits"), &[]).await
    }

    pub async fn movie_reviews(
        &self,
        id: u64,
        page: u32,
    ) -> Result<PaginatedResponse<Review>, TmdbError> {
        self.get_page(&format!("movie/{id}/reviews"), page).await
    }

    pub async fn movie_videos(&self, id: u64) -> Result<VideoList, TmdbError> {
        self.get(&format!("movie/{id}/videos"), &[]).await
    }

    // ── TV ──────────────────────────────────────────────────────

    pub async fn popular_tv(&self, page: u32) -> Result<PaginatedResponse<TvSummary>, TmdbError> {
        self.get_page("tv/popular", page).await
    }

    pub async fn top_rated_tv(&self, page: u32) -> Result<PaginatedResponse<TvSummary>, TmdbError> {
        self.get_page("tv/top_rated", page).await
    }

    pub async fn on_the_air_tv(
        &self,
        page: u32,
    ) -> Result<PaginatedResponse<TvSummary>, TmdbError> {
        self.get_page("tv/on_the_air", page).await
    }

    pub async fn tv_details(&self, id: u64) -> Result<TvDetails, TmdbError> {
        self.get(&format!("tv/{id}"), &[]).await
    }

    pub async fn tv_similar(
        &self,
        id: u64,
        page: u32,
    ) -> Result<PaginatedResponse<TvSummary>, TmdbError> {
        self.get_page(&format!("tv/{id}/similar"), page).await
    }

    pub async fn tv_credits(&self, id: u64) -> Result<Credits, TmdbError> {
        self.get(&format!("tv/{id}/credits"), &[]).await
    }

    pub async fn tv_reviews(
        &self,
        id: u64,
        page: u32,
    ) -> Result<PaginatedResponse<Review>, TmdbError> {
        self.get_page(&format!("tv/{id}/reviews"), page).await
    }

    pub async fn tv_videos(&self, id: u64) -> Result<VideoList, TmdbError> {
        self.get(&format!("tv/{id}/videos"), &[]).await
    }

    // ── Trending & people ───────────────────────────────────────

    pub async fn trending_all(
        &self,
        window: TimeWindow,
    ) -> Result<PaginatedResponse<TrendingItem>, TmdbError> {
        self.get(&format!("trending/all/{}", window.as_str()), &[])
            .await
    }

    pub async fn popular_people(
        &self,
        page: u32,
    ) -> Result<PaginatedResponse<PersonSummary>, TmdbError> {
        self.get_page("person/popular", page).await
    }

    pub async fn person_details(&self, id: u64) -> Result<PersonDetails, TmdbError> {
        self.get(&format!("person/{id}"), &[]).await
    }

    pub async fn person_combined_credits(&self, id: u64) -> Result<CombinedCredits, TmdbError> {
        self.get(&format!("person/{id}/combined_credits"), &[]).await
    }

    // ── Search ──────────────────────────────────────────────────

    pub async fn search_movie_summaries(
        &self,
        query: &str,
        page: u32,
    ) -> Result<PaginatedResponse<MovieSummary>, TmdbError> {
        self.get("search/movie", &search_query(query, page)).await
    }

    pub async fn search_tv_summaries(
        &self,
        query: &str,
        page: u32,
    ) -> Result<PaginatedResponse<TvSummary>, TmdbError> {
        self.get("search/tv", &search_query(query, page)).await
    }

    pub async fn search_people(
        &self,
        query: &str,
        page: u32,
    ) -> Result<PaginatedResponse<PersonSummary>, TmdbError> {
        self.get("search/person", &search_query(query, page)).await
    }

    // ── Genres & discover ───────────────────────────────────────

    pub async fn movie_genres(&self) -> Result<GenreList, TmdbError> {
        self.get("genre/movie/list", &[]).await
    }

    pub async fn tv_genres(&self) -> Result<GenreList, TmdbError> {
        self.get("genre/tv/list", &[]).await
    }

    pub async fn discover_movies(
        &self,
        params: &DiscoverMoviesParams,
    ) -> Result<PaginatedResponse<MovieSummary>, TmdbError> {
        self.get("discover/movie", &params.to_query()).await
    }

    pub async fn discover_tv(
        &self,
        params: &DiscoverTvParams,
    ) -> Result<PaginatedResponse<TvSummary>, TmdbError> {
        self.get("discover/tv", &params.to_query()).await
    }
}

fn search_query(query: &str, page: u32) -> [(&'static str, String); 2] {
    [("query", query.to_string()), ("page", page.to_string())]
}

/// TMDB's `status_message` if the body carries one, else the raw body.
fn status_message(body: &str) -> String {
    serde_json::from_str::<TmdbStatus>(body)
        .ok()
        .and_then(|s| s.status_message)
        .unwrap_or_else(|| {
            if body.is_empty() {
                "Request failed".to_string()
            } else {
                body.to_string()
            }
        })
}

impl MetadataService for TmdbClient {
    type Error = TmdbError;

    async fn search_movies(&self, query: &str, page: u32) -> Result<SearchPage, TmdbError> {
        let resp = self.search_movie_summaries(query, page).await?;
        Ok(resp.into_search_page(MovieSummary::into_search_result))
    }

    async fn search_tv(&self, query: &str, page: u32) -> Result<SearchPage, TmdbError> {
        let resp = self.search_tv_summaries(query, page).await?;
        Ok(resp.into_search_page(TvSummary::into_search_result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> TmdbClient {
        TmdbClient::new(Url::parse(DEFAULT_BASE_URL).unwrap())
    }

    #[test]
    fn test_endpoint_without_credentials() {
        let url = client().endpoint("movie/550", &[]).unwrap();
        assert_eq!(url.as_str(), "https://api.themoviedb.org/3/movie/550");
    }

    #[test]
    fn test_endpoint_with_api_key_and_language() {
        let url = client()
            .with_api_key("k3y")
            .with_language("en-US")
            .endpoint("/search/movie", &search_query("the matrix", 1))
            .unwrap();
        assert_eq!(
            url.as_str(),
            concat!(
                "https://api.themoviedb.org/3/search/movie",
                "?api_key=k3y&language=en-US&query=the+matrix&page=1"
            )
        );
    }

    #[test]
    fn test_endpoint_tolerates_trailing_slash_base() {
        let c = TmdbClient::new(Url::parse("http://localhost:8080/3/").unwrap());
        let url = c.endpoint("trending/all/week", &[]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/3/trending/all/week");
    }

    #[test]
    fn test_bearer_token_stays_out_of_url() {
        let c = client().with_access_token("secret");
        assert!(c.has_credentials());
        let url = c.endpoint("movie/popular", &[("page", "1".into())]).unwrap();
        assert!(!url.as_str().contains("secret"));
    }

    #[test]
    fn test_status_message_extraction() {
        assert_eq!(
            status_message(
                r#"{"status_code":34,
                    "status_message":"The resource you requested could not be found."}"#
            ),
            "The resource you requested could not be found."
        );
        assert_eq!(status_message("Bad Gateway"), "Bad Gateway");
        assert_eq!(status_message(""), "Request failed");
    }

    #[test]
    fn test_time_window() {
        assert_eq!(TimeWindow::default().as_str(), "day");
        assert_eq!(TimeWindow::Week.as_str(), "week");
    }
}
