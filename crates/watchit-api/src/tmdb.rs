pub mod client;
pub mod discover;
pub mod error;
pub mod types;

pub use client::{TimeWindow, TmdbClient};
pub use discover::{DiscoverMoviesParams, DiscoverTvParams, SortBy};
pub use error::TmdbError;
