use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fmt::Display, str::FromStr};

/// Canonical content type of a catalog item
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Movie,
    Series,
    Anime,
    Unknown,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Movie => "movie",
            ContentType::Series => "series",
            ContentType::Anime => "anime",
            ContentType::Unknown => "unknown",
        }
    }
}

impl Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ContentType {
    type Err = String;

    /// Parses a caller-supplied type label using the built-in aliases
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TypeRules::default()
            .resolve_alias(s)
            .ok_or_else(|| format!("unknown content type '{}'", s.trim()))
    }
}

/// Trims and lowercases a title for case-insensitive comparison
pub fn normalize_title(title: &str) -> String {
    title.trim().to_lowercase()
}

/// Keyword and alias rules for content type detection
///
/// Kept as data so the heuristic can be tuned (or loaded from a JSON file)
/// without touching the ranking code.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TypeRules {
    pub version: String,
    /// Lowercase source label → canonical type
    pub aliases: HashMap<String, ContentType>,
    /// Any of these in `title genre description` marks the item as anime
    pub anime_keywords: Vec<String>,
}

impl Default for TypeRules {
    fn default() -> Self {
        let aliases = [
            ("movie", ContentType::Movie),
            ("movies", ContentType::Movie),
            ("film", ContentType::Movie),
            ("films", ContentType::Movie),
            ("series", ContentType::Series),
            ("tv", ContentType::Series),
            ("tv show", ContentType::Series),
            ("tv series", ContentType::Series),
            ("show", ContentType::Series),
            ("web series", ContentType::Series),
            ("anime", ContentType::Anime),
            ("animes", ContentType::Anime),
            ("cartoon", ContentType::Anime),
            ("unknown", ContentType::Unknown),
        ]
        .into_iter()
        .map(|(label, ty)| (label.to_string(), ty))
        .collect();

        Self {
            version: "v1".to_string(),
            aliases,
            anime_keywords: vec!["manga".to_string(), "japan".to_string()],
        }
    }
}

impl TypeRules {
    /// Loads rules from a JSON file
    pub fn from_json_file(path: &std::path::Path) -> Result<Self, crate::error::DatasetLoadError> {
        let file = std::fs::File::open(path)?;
        let rules = serde_json::from_reader(std::io::BufReader::new(file))?;
        Ok(rules)
    }

    /// Maps a raw label to a canonical type, if it is a known alias
    pub fn resolve_alias(&self, label: &str) -> Option<ContentType> {
        self.aliases.get(&label.trim().to_lowercase()).copied()
    }

    /// Classifies an item from its raw type label and text fields
    pub fn classify(
        &self,
        raw_type: &str,
        title: &str,
        genre: &str,
        description: &str,
    ) -> ContentType {
        let label = raw_type.trim().to_lowercase();
        if label.contains("anime") {
            return ContentType::Anime;
        }

        let text = format!("{} {} {}", title, genre, description).to_lowercase();
        if self
            .anime_keywords
            .iter()
            .any(|keyword| text.contains(keyword.as_str()))
        {
            return ContentType::Anime;
        }

        self.resolve_alias(&label).unwrap_or(ContentType::Unknown)
    }
}

/// One catalog entry with its precomputed embedding and cluster label
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogItem {
    pub title: String,
    #[serde(rename = "type")]
    pub content_type: ContentType,
    pub genre: String,
    pub description: String,
    pub rating: f64,
    pub popularity: f64,
    pub year: i32,
    pub cluster_id: i32,
    #[serde(skip_serializing)]
    pub embedding: Vec<f32>,
}

impl CatalogItem {
    pub fn normalized_title(&self) -> String {
        normalize_title(&self.title)
    }
}

/// Lightweight view of a catalog item for browse and cluster listings
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CatalogSummary {
    pub title: String,
    #[serde(rename = "type")]
    pub content_type: ContentType,
    pub genre: String,
    pub rating: f64,
    pub year: i32,
    pub cluster_id: i32,
}

impl From<&CatalogItem> for CatalogSummary {
    fn from(item: &CatalogItem) -> Self {
        Self {
            title: item.title.clone(),
            content_type: item.content_type,
            genre: item.genre.clone(),
            rating: item.rating,
            year: item.year,
            cluster_id: item.cluster_id,
        }
    }
}
