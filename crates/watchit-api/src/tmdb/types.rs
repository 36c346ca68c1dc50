use serde::{Deserialize, Serialize};

use crate::traits::{SearchPage, SearchResult};

// ── Paging ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginatedResponse<T> {
    pub page: u32,
    pub results: Vec<T>,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub total_results: u32,
}

/// Error body TMDB sends with non-success statuses.
#[derive(Debug, Deserialize)]
pub struct TmdbStatus {
    pub status_code: Option<i64>,
    pub status_message: Option<String>,
}

// ── Summaries (list and search endpoints) ───────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovieSummary {
    pub id: u64,
    pub title: String,
    pub overview: Option<String>,
    pub poster_path: Option<String>,
    pub release_date: Option<String>,
    pub vote_average: Option<f32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TvSummary {
    pub id: u64,
    pub name: String,
    pub overview: Option<String>,
    pub poster_path: Option<String>,
    pub first_air_date: Option<String>,
    pub vote_average: Option<f32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonSummary {
    pub id: u64,
    pub name: String,
    pub profile_path: Option<String>,
    pub known_for_department: Option<String>,
}

/// An item of the mixed trending feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "media_type", rename_all = "snake_case")]
pub enum TrendingItem {
    Movie(MovieSummary),
    Tv(TvSummary),
    Person(PersonSummary),
    #[serde(other)]
    Other,
}

// ── Details ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Genre {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenreList {
    pub genres: Vec<Genre>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovieDetails {
    pub id: u64,
    pub title: Option<String>,
    pub tagline: Option<String>,
    pub overview: Option<String>,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub release_date: Option<String>,
    pub runtime: Option<u32>,
    pub status: Option<String>,
    pub vote_average: Option<f32>,
    #[serde(default)]
    pub genres: Vec<Genre>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TvDetails {
    pub id: u64,
    pub name: Option<String>,
    pub tagline: Option<String>,
    pub overview: Option<String>,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub first_air_date: Option<String>,
    pub number_of_seasons: Option<u32>,
    pub number_of_episodes: Option<u32>,
    pub status: Option<String>,
    pub vote_average: Option<f32>,
    #[serde(default)]
    pub genres: Vec<Genre>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonDetails {
    pub id: u64,
    pub name: String,
    pub biography: Option<String>,
    pub birthday: Option<String>,
    pub place_of_birth: Option<String>,
    pub profile_path: Option<String>,
    pub known_for_department: Option<String>,
}

/// A movie or show a person appeared in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CombinedCredit {
    pub id: u64,
    pub media_type: String,
    pub title: Option<String>,
    pub name: Option<String>,
    pub character: Option<String>,
    pub poster_path: Option<String>,
}

impl CombinedCredit {
    pub fn display_title(&self) -> &str {
        self.title
            .as_deref()
            .or(self.name.as_deref())
            .unwrap_or("Untitled")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CombinedCredits {
    #[serde(default)]
    pub cast: Vec<CombinedCredit>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credit {
    pub id: u64,
    pub name: String,
    pub character: Option<String>,
    pub profile_path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credits {
    #[serde(default)]
    pub cast: Vec<Credit>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    pub id: String,
    pub author: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Video {
    pub id: String,
    pub key: String,
    pub name: String,
    pub site: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl Video {
    /// Watch URL for YouTube-hosted videos.
    pub fn youtube_url(&self) -> Option<String> {
        (self.site == "YouTube").then(|| format!("https://www.youtube.com/watch?v={}", self.key))
    }

    pub fn is_trailer(&self) -> bool {
        self.kind == "Trailer"
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoList {
    #[serde(default)]
    pub results: Vec<Video>,
}

// ── Conversions to shared trait types ───────────────────────────

impl MovieSummary {
    pub fn into_search_result(self) -> SearchResult {
        SearchResult {
            id: self.id,
            name: self.title,
            poster_path: self.poster_path,
            overview: self.overview,
            vote_average: self.vote_average,
            date: self.release_date,
        }
    }
}

impl TvSummary {
    pub fn into_search_result(self) -> SearchResult {
        SearchResult {
            id: self.id,
            name: self.name,
            poster_path: self.poster_path,
            overview: self.overview,
            vote_average: self.vote_average,
            date: self.first_air_date,
        }
    }
}

impl<T> PaginatedResponse<T> {
    pub fn into_search_page(self, convert: impl FnMut(T) -> SearchResult) -> SearchPage {
        SearchPage {
            page: self.page,
            results: self.results.into_iter().map(convert).collect(),
            total_pages: self.total_pages,
            total_results: self.total_results,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_movie_search() {
        let json = r#"{
            "page": 1,
            "results": [
                {
                    "adult": false,
                    "backdrop_path": "/s3TBrRGB1iav7gFOCNx3H31MoES.jpg",
                    "genre_ids": [28, 878, 12],
                    "id": 27205,
                    "original_language": "en",
                    "original_title": "Inception",
                    "overview": "Cobb, a skilled thief who commits corporate espionage...",
                    "popularity": 83.952,
                    "poster_path": "/oYuLEt3zVCKq57qu2F8dT7NIa6f.jpg",
                    "release_date": "2010-07-15",
                    "title": "Inception",
                    "video": false,
                    "vote_average": 8.369,
                    "vote_count": 36412
                },
                {
                    "id": 64956,
                    "title": "Inception: The Cobol Job",
                    "poster_path": null,
                    "release_date": ""
                }
            ],
            "total_pages": 1,
            "total_results": 2
        }"#;

        let resp: PaginatedResponse<MovieSummary> = serde_json::from_str(json).unwrap();
        assert_eq!(resp.results.len(), 2);

        let page = resp.into_search_page(MovieSummary::into_search_result);
        assert_eq!(page.total_results, 2);
        let first = &page.results[0];
        assert_eq!(first.id, 27205);
        assert_eq!(first.name, "Inception");
        assert_eq!(first.year(), Some(2010));
        assert_eq!(first.poster_path.as_deref(), Some("/oYuLEt3zVCKq57qu2F8dT7NIa6f.jpg"));
        assert!(page.results[1].poster_path.is_none());
        assert_eq!(page.results[1].year(), None);
    }

    #[test]
    fn test_deserialize_tv_search() {
        let json = r#"{
            "page": 1,
            "results": [
                {
                    "id": 1396,
                    "name": "Breaking Bad",
                    "overview": "Walter White, a New Mexico high school chemistry instructor...",
                    "poster_path": "/ztkUQFLlC19CCMYHW9o1zWhJRNq.jpg",
                    "first_air_date": "2008-01-20",
                    "vote_average": 8.9,
                    "origin_country": ["US"]
                }
            ],
            "total_pages": 1,
            "total_results": 1
        }"#;

        let resp: PaginatedResponse<TvSummary> = serde_json::from_str(json).unwrap();
        let page = resp.into_search_page(TvSummary::into_search_result);
        assert_eq!(page.results[0].name, "Breaking Bad");
        assert_eq!(page.results[0].date.as_deref(), Some("2008-01-20"));
    }

    #[test]
    fn test_deserialize_trending_mixed() {
        let json = r#"{
            "page": 1,
            "results": [
                {"media_type": "movie", "id": 550, "title": "Fight Club"},
                {"media_type": "tv", "id": 1399, "name": "Game of Thrones"},
                {"media_type": "person", "id": 287, "name": "Brad Pitt"},
                {"media_type": "collection", "id": 10, "name": "Star Wars Collection"}
            ]
        }"#;

        let resp: PaginatedResponse<TrendingItem> = serde_json::from_str(json).unwrap();
        assert!(matches!(&resp.results[0], TrendingItem::Movie(m) if m.title == "Fight Club"));
        assert!(matches!(&resp.results[1], TrendingItem::Tv(t) if t.id == 1399));
        assert!(matches!(&resp.results[2], TrendingItem::Person(p) if p.name == "Brad Pitt"));
        assert!(matches!(resp.results[3], TrendingItem::Other));
        assert_eq!(resp.total_pages, 0);
    }

    #[test]
    fn test_deserialize_movie_details() {
        let json = r#"{
            "id": 550,
            "title": "Fight Club",
            "tagline": "Mischief. Mayhem. Soap.",
            "overview": "A ticking-time-bomb insomniac...",
            "poster_path": "/pB8BM7pdSp6B6Ih7QZ4DrQ3PmJK.jpg",
            "backdrop_path": "/hZkgoQYus5vegHoetLkCJzb17zJ.jpg",
            "release_date": "1999-10-15",
            "runtime": 139,
            "status": "Released",
            "vote_average": 8.4,
            "genres": [{"id": 18, "name": "Drama"}]
        }"#;

        let details: MovieDetails = serde_json::from_str(json).unwrap();
        assert_eq!(details.runtime, Some(139));
        assert_eq!(details.genres[0].name, "Drama");
    }

    #[test]
    fn test_deserialize_tv_details_sparse() {
        let details: TvDetails = serde_json::from_str(r#"{"id": 1399}"#).unwrap();
        assert!(details.name.is_none());
        assert!(details.genres.is_empty());
    }

    #[test]
    fn test_video_urls() {
        let json = r#"{
            "id": 550,
            "results": [
                {"id": "a", "key": "qtRKdVHc-cE", "name": "Trailer",
                 "site": "YouTube", "type": "Trailer"},
                {"id": "b", "key": "123", "name": "Clip", "site": "Vimeo", "type": "Clip"}
            ]
        }"#;
        let videos: VideoList = serde_json::from_str(json).unwrap();
        assert_eq!(
            videos.results[0].youtube_url().as_deref(),
            Some("https://www.youtube.com/watch?v=qtRKdVHc-cE")
        );
        assert!(videos.results[0].is_trailer());
        assert_eq!(videos.results[1].youtube_url(), None);
    }

    #[test]
    fn test_combined_credit_title_fallback() {
        let json = r#"{
            "cast": [
                {"id": 550, "media_type": "movie", "title": "Fight Club",
                 "character": "Tyler Durden"},
                {"id": 1, "media_type": "tv", "name": "Friends"},
                {"id": 2, "media_type": "tv"}
            ]
        }"#;
        let credits: CombinedCredits = serde_json::from_str(json).unwrap();
        let titles: Vec<_> = credits.cast.iter().map(|c| c.display_title()).collect();
        assert_eq!(titles, ["Fight Club", "Friends", "Untitled"]);
    }

    #[test]
    fn test_status_body() {
        let status: TmdbStatus = serde_json::from_str(
            r#"{"status_code": 7,
                "status_message": "Invalid API key: You must be granted a valid key.",
                "success": false}"#,
        )
        .unwrap();
        assert_eq!(status.status_code, Some(7));
        assert!(status.status_message.unwrap().starts_with("Invalid API key"));
    }
}
