//! Poster and profile image URLs on the TMDB image CDN.

const IMAGE_BASE_URL: &str = "https://image.tmdb.org/t/p";

/// Rendition widths used by the app.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSize {
    /// Cards, watchlist tiles and profile photos.
    W342,
    /// Hero banners.
    W500,
    Original,
}

impl ImageSize {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::W342 => "w342",
            Self::W500 => "w500",
            Self::Original => "original",
        }
    }
}

/// Full URL for an image path such as `/qJ2tW6WMUDux911r6m7haRef0WH.jpg`.
pub fn image_url(path: &str, size: ImageSize) -> String {
    if path.starts_with('/') {
        format!("{IMAGE_BASE_URL}/{}{path}", size.as_str())
    } else {
        format!("{IMAGE_BASE_URL}/{}/{path}", size.as_str())
    }
}

/// Card-sized poster URL, `None` when the title has no poster.
pub fn poster_url(path: Option<&str>) -> Option<String> {
    path.filter(|p| !p.is_empty())
        .map(|p| image_url(p, ImageSize::W342))
}
