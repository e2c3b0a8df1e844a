use serde::{Deserialize, Serialize};

use super::ContentType;

/// Blend weights for the final score
///
/// Weights need not sum to 1, but scores are only comparable across queries
/// when they do.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Weights {
    pub sim: f64,
    pub rating: f64,
    pub pop: f64,
    pub recency: f64,
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            sim: 0.5,
            rating: 0.25,
            pop: 0.15,
            recency: 0.10,
        }
    }
}

impl Weights {
    /// All weights must be finite and non-negative
    pub fn is_valid(&self) -> bool {
        [self.sim, self.rating, self.pop, self.recency]
            .iter()
            .all(|w| w.is_finite() && *w >= 0.0)
    }
}

/// Ordering applied to scored candidates before deduplication
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SortMode {
    /// Descending final score
    #[default]
    Score,
    Latest,
    Oldest,
    Popular,
    TopRated,
}

/// Which cascade stage produced the candidate pool
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CandidateTier {
    /// Same cluster and same type
    Cluster,
    /// Same type anywhere in the catalog
    TypeOnly,
    /// Whole catalog
    Global,
}

/// Caller options for a single `recommend` call
#[derive(Debug, Clone, PartialEq)]
pub struct RecommendOptions {
    pub content_type: Option<ContentType>,
    pub top_n: usize,
    pub sort_mode: Option<SortMode>,
    pub weights: Option<Weights>,
}

impl Default for RecommendOptions {
    fn default() -> Self {
        Self {
            content_type: None,
            top_n: 10,
            sort_mode: None,
            weights: None,
        }
    }
}

/// A single ranked recommendation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RankedItem {
    pub title: String,
    pub genre: String,
    pub rating: f64,
    pub year: i32,
    pub similarity: f64,
    pub final_score: f64,
    #[serde(rename = "type")]
    pub content_type: ContentType,
    pub cluster_id: i32,
}

/// Successful recommendation result
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RecommendationSet {
    /// The query as the caller typed it
    pub query: String,
    /// Catalog title the query resolved to
    pub matched_title: String,
    /// Type the candidates were restricted to
    #[serde(rename = "type")]
    pub content_type: ContentType,
    pub tier: CandidateTier,
    pub items: Vec<RankedItem>,
}

/// Outcome of `recommend`
#[derive(Debug, Clone, PartialEq)]
pub enum Recommendations {
    /// The query matched no catalog title closely enough
    NotFound { query: String },
    Found(RecommendationSet),
}

impl Recommendations {
    pub fn is_found(&self) -> bool {
        matches!(self, Recommendations::Found(_))
    }

    /// Ranked items, empty when the title was not found
    pub fn items(&self) -> &[RankedItem] {
        match self {
            Recommendations::Found(set) => &set.items,
            Recommendations::NotFound { .. } => &[],
        }
    }
}
