use serde::{Deserialize, Serialize};

pub mod recommendation;
pub mod title;

pub use recommendation::{
    CandidateTier, RankedItem, RecommendOptions, RecommendationSet, Recommendations, SortMode,
    Weights,
};
pub use title::{normalize_title, CatalogItem, CatalogSummary, ContentType, TypeRules};

/// Poster shown when no provider has an image for a title
pub const PLACEHOLDER_POSTER: &str = "https://via.placeholder.com/500x750?text=No+Image";
const NO_OVERVIEW: &str = "No overview available.";
const NO_RELEASE_DATE: &str = "N/A";

/// Display metadata for a title, resolved from a third-party catalog
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TitleMetadata {
    pub title: String,
    pub poster: String,
    pub rating: f64,
    pub overview: String,
    pub release_date: String,
}

impl TitleMetadata {
    /// Placeholder returned when every provider came up empty
    pub fn placeholder(title: &str) -> Self {
        Self {
            title: title.to_string(),
            poster: PLACEHOLDER_POSTER.to_string(),
            rating: 0.0,
            overview: NO_OVERVIEW.to_string(),
            release_date: NO_RELEASE_DATE.to_string(),
        }
    }

    pub fn has_poster(&self) -> bool {
        self.poster != PLACEHOLDER_POSTER
    }
}

// ============================================================================
// TMDB API Types
// ============================================================================

/// Response from TMDB `/search/{movie,tv,multi}`
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbSearchResponse {
    #[serde(default)]
    pub results: Vec<TmdbResult>,
}

/// A single TMDB search hit (movies use `title`, TV uses `name`)
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbResult {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub vote_average: Option<f64>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub first_air_date: Option<String>,
}

impl TmdbResult {
    /// Converts a search hit, resolving the poster path against `image_base`
    pub fn into_metadata(self, image_base: &str, requested_title: &str) -> TitleMetadata {
        let poster = self
            .poster_path
            .filter(|p| !p.is_empty())
            .map(|p| format!("{}/w500{}", image_base.trim_end_matches('/'), p))
            .unwrap_or_else(|| PLACEHOLDER_POSTER.to_string());

        TitleMetadata {
            title: self
                .title
                .or(self.name)
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| requested_title.to_string()),
            poster,
            rating: self.vote_average.unwrap_or(0.0),
            overview: self
                .overview
                .filter(|o| !o.is_empty())
                .unwrap_or_else(|| NO_OVERVIEW.to_string()),
            release_date: self
                .release_date
                .filter(|d| !d.is_empty())
                .or(self.first_air_date.filter(|d| !d.is_empty()))
                .unwrap_or_else(|| NO_RELEASE_DATE.to_string()),
        }
    }
}

// ============================================================================
// Jikan API Types
// ============================================================================

/// Response from Jikan `/anime?q=`
#[derive(Debug, Clone, Deserialize)]
pub struct JikanSearchResponse {
    #[serde(default)]
    pub data: Vec<JikanAnime>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JikanAnime {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub title_english: Option<String>,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub synopsis: Option<String>,
    #[serde(default)]
    pub images: Option<JikanImages>,
    #[serde(default)]
    pub aired: Option<JikanAired>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JikanImages {
    pub jpg: Option<JikanImageSet>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JikanImageSet {
    #[serde(default)]
    pub large_image_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JikanAired {
    #[serde(default)]
    pub from: Option<String>,
}

impl JikanAnime {
    pub fn into_metadata(self, requested_title: &str) -> TitleMetadata {
        let poster = self
            .images
            .and_then(|images| images.jpg)
            .and_then(|jpg| jpg.large_image_url)
            .unwrap_or_else(|| PLACEHOLDER_POSTER.to_string());

        TitleMetadata {
            title: self
                .title_english
                .or(self.title)
                .unwrap_or_else(|| requested_title.to_string()),
            poster,
            rating: self.score.unwrap_or(0.0),
            overview: self.synopsis.unwrap_or_else(|| NO_OVERVIEW.to_string()),
            release_date: self
                .aired
                .and_then(|aired| aired.from)
                .unwrap_or_else(|| NO_RELEASE_DATE.to_string()),
        }
    }
}
