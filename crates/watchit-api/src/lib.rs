pub mod image;
pub mod tmdb;
pub mod traits;
