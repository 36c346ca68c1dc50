/// Ordering for the discover endpoints.
///
/// TMDB names the date sort differently per kind: `release_date.*` for
/// movies, `first_air_date.*` for TV.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortBy {
    #[default]
    PopularityDesc,
    PopularityAsc,
    VoteAverageDesc,
    VoteAverageAsc,
    ReleaseDateDesc,
    ReleaseDateAsc,
}

impl SortBy {
    pub fn as_movie_str(self) -> &'static str {
        match self {
            Self::PopularityDesc => "popularity.desc",
            Self::PopularityAsc => "popularity.asc",
            Self::VoteAverageDesc => "vote_average.desc",
            Self::VoteAverageAsc => "vote_average.asc",
            Self::ReleaseDateDesc => "release_date.desc",
            Self::ReleaseDateAsc => "release_date.asc",
        }
    }

    pub fn as_tv_str(self) -> &'static str {
        match self {
            Self::ReleaseDateDesc => "first_air_date.desc",
            Self::ReleaseDateAsc => "first_air_date.asc",
            other => other.as_movie_str(),
        }
    }
}

/// Filters for `/discover/movie`. Unset fields are left out of the query.
#[derive(Debug, Clone, Default)]
pub struct DiscoverMoviesParams {
    pub page: Option<u32>,
    pub with_genres: Vec<u64>,
    pub primary_release_year: Option<i32>,
    pub min_vote_average: Option<f32>,
    pub min_runtime: Option<u32>,
    pub sort_by: Option<SortBy>,
}

impl DiscoverMoviesParams {
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = common_query(
            self.page,
            &self.with_genres,
            self.min_vote_average,
            self.min_runtime,
        );
        if let Some(year) = self.primary_release_year {
            query.push(("primary_release_year", year.to_string()));
        }
        if let Some(sort) = self.sort_by {
            query.push(("sort_by", sort.as_movie_str().to_string()));
        }
        query
    }
}

/// Filters for `/discover/tv`. Unset fields are left out of the query.
#[derive(Debug, Clone, Default)]
pub struct DiscoverTvParams {
    pub page: Option<u32>,
    pub with_genres: Vec<u64>,
    pub first_air_date_year: Option<i32>,
    pub min_vote_average: Option<f32>,
    pub min_runtime: Option<u32>,
    pub sort_by: Option<SortBy>,
}

impl DiscoverTvParams {
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = common_query(
            self.page,
            &self.with_genres,
            self.min_vote_average,
            self.min_runtime,
        );
        if let Some(year) = self.first_air_date_year {
            query.push(("first_air_date_year", year.to_string()));
        }
        if let Some(sort) = self.sort_by {
            query.push(("sort_by", sort.as_tv_str().to_string()));
        }
        query
    }
}

fn common_query(
    page: Option<u32>,
    genres: &[u64],
    min_vote_average: Option<f32>,
    min_runtime: Option<u32>,
) -> Vec<(&'static str, String)> {
    let mut query = Vec::new();
    if let Some(page) = page {
        query.push(("page", page.to_string()));
    }
    if !genres.is_empty() {
        let ids: Vec<String> = genres.iter().map(u64::to_string).collect();
        query.push(("with_genres", ids.join(",")));
    }
    if let Some(vote) = min_vote_average {
        query.push(("vote_average.gte", vote.to_string()));
    }
    if let Some(runtime) = min_runtime {
        query.push(("with_runtime.gte", runtime.to_string()));
    }
    query
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_params_produce_empty_query() {
        assert!(DiscoverMoviesParams::default().to_query().is_empty());
        assert!(DiscoverTvParams::default().to_query().is_empty());
    }

    #[test]
    fn test_movie_query() {
        let params = DiscoverMoviesParams {
            page: Some(2),
            with_genres: vec![28, 12],
            primary_release_year: Some(1999),
            min_vote_average: Some(7.5),
            min_runtime: Some(90),
            sort_by: Some(SortBy::ReleaseDateDesc),
        };
        assert_eq!(
            params.to_query(),
            vec![
                ("page", "2".to_string()),
                ("with_genres", "28,12".to_string()),
                ("vote_average.gte", "7.5".to_string()),
                ("with_runtime.gte", "90".to_string()),
                ("primary_release_year", "1999".to_string()),
                ("sort_by", "release_date.desc".to_string()),
            ]
        );
    }

    #[test]
    fn test_tv_sort_uses_air_date() {
        let params = DiscoverTvParams {
            first_air_date_year: Some(2008),
            sort_by: Some(SortBy::ReleaseDateAsc),
            ..Default::default()
        };
        assert_eq!(
            params.to_query(),
            vec![
                ("first_air_date_year", "2008".to_string()),
                ("sort_by", "first_air_date.asc".to_string()),
            ]
        );
        assert_eq!(SortBy::VoteAverageDesc.as_tv_str(), "vote_average.desc");
    }
}
