use chrono::Datelike;
use std::{
    collections::{HashMap, HashSet},
    fs::File,
    io::{BufReader, Read},
    path::{Path, PathBuf},
};

use crate::{
    error::DatasetLoadError,
    models::{normalize_title, CatalogItem, ContentType, TypeRules},
};

/// Years later than `current year + YEAR_SLACK` are treated as unknown
const YEAR_SLACK: i32 = 2;
const MAX_RATING: f64 = 10.0;
const DEFAULT_GENRE: &str = "Unknown";

const TITLE_COLUMNS: &[&str] = &["title"];
const TYPE_COLUMNS: &[&str] = &["type"];
const GENRE_COLUMNS: &[&str] = &["genre", "genres", "listed_in"];
const DESCRIPTION_COLUMNS: &[&str] = &["description", "overview", "synopsis"];
const RATING_COLUMNS: &[&str] = &["rating", "vote_average"];
const POPULARITY_COLUMNS: &[&str] = &["popularity", "members", "vote_count", "score"];
const YEAR_COLUMNS: &[&str] = &["year", "release_date", "first_air_date"];
const CLUSTER_COLUMNS: &[&str] = &["cluster"];

/// Locations of the dataset, embedding and cluster artifacts
#[derive(Debug, Clone)]
pub struct ArtifactPaths {
    pub dataset: PathBuf,
    pub embeddings: PathBuf,
    /// When absent, labels come from the dataset's `cluster` column
    pub clusters: Option<PathBuf>,
}

/// One normalized row of the dataset table, before embeddings are attached
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogRow {
    pub title: String,
    pub content_type: ContentType,
    pub genre: String,
    pub description: String,
    pub rating: f64,
    pub popularity: f64,
    pub year: i32,
    pub cluster: Option<i32>,
}

/// Catalog-wide normalizers, computed once at load
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CatalogStats {
    /// Highest rating, floored at 1
    pub rating_max: f64,
    /// Highest popularity, floored at 1
    pub popularity_max: f64,
    /// Lowest known (> 0) year
    pub year_min: i32,
    pub year_max: i32,
    /// Mean rating over every item, unrated ones included
    pub rating_mean: f64,
}

impl CatalogStats {
    fn compute(items: &[CatalogItem]) -> Self {
        let rating_max = items.iter().map(|i| i.rating).fold(0.0_f64, f64::max).max(1.0);
        let popularity_max = items
            .iter()
            .map(|i| i.popularity)
            .fold(0.0_f64, f64::max)
            .max(1.0);

        let known_years = || items.iter().map(|i| i.year).filter(|y| *y > 0);
        let year_max = known_years().max().unwrap_or_else(current_year);
        let year_min = known_years().min().unwrap_or(year_max);

        let rating_mean = if items.is_empty() {
            0.0
        } else {
            items.iter().map(|i| i.rating).sum::<f64>() / items.len() as f64
        };

        Self {
            rating_max,
            popularity_max,
            year_min,
            year_max,
            rating_mean,
        }
    }
}

/// Read-only, in-memory catalog shared by every recommendation request
#[derive(Debug)]
pub struct CatalogStore {
    items: Vec<CatalogItem>,
    norms: Vec<f32>,
    normalized_titles: Vec<String>,
    title_index: HashMap<String, usize>,
    stats: CatalogStats,
}

impl CatalogStore {
    /// Builds a store from fully assembled items
    ///
    /// Rejects an empty catalog, blank titles and ragged embeddings.
    pub fn new(items: Vec<CatalogItem>) -> Result<Self, DatasetLoadError> {
        if items.is_empty() {
            return Err(DatasetLoadError::EmptyCatalog);
        }

        let width = items[0].embedding.len();
        for (row, item) in items.iter().enumerate() {
            if item.title.trim().is_empty() {
                return Err(DatasetLoadError::EmptyTitle { row });
            }
            if item.embedding.len() != width || width == 0 {
                return Err(DatasetLoadError::EmbeddingWidth {
                    row,
                    expected: width,
                    found: item.embedding.len(),
                });
            }
        }

        let normalized_titles: Vec<String> = items.iter().map(CatalogItem::normalized_title).collect();

        // Later rows overwrite earlier ones, so the last duplicate owns the title
        let mut title_index = HashMap::with_capacity(items.len());
        let mut duplicates = 0usize;
        for (idx, title) in normalized_titles.iter().enumerate() {
            if title_index.insert(title.clone(), idx).is_some() {
                duplicates += 1;
            }
        }
        if duplicates > 0 {
            tracing::warn!(
                duplicates = duplicates,
                "Catalog contains duplicate normalized titles, keeping last occurrence"
            );
        }

        let norms = items
            .iter()
            .map(|item| item.embedding.iter().map(|x| x * x).sum::<f32>().sqrt())
            .collect();

        let stats = CatalogStats::compute(&items);

        Ok(Self {
            items,
            norms,
            normalized_titles,
            title_index,
            stats,
        })
    }

    /// Joins table rows with their embedding and cluster rows
    ///
    /// All three inputs must be row-aligned and of equal length.
    pub fn assemble(
        rows: Vec<CatalogRow>,
        embeddings: Vec<Vec<f32>>,
        clusters: Vec<i32>,
    ) -> Result<Self, DatasetLoadError> {
        if rows.len() != embeddings.len() || rows.len() != clusters.len() {
            return Err(DatasetLoadError::RowCountMismatch {
                table: rows.len(),
                embeddings: embeddings.len(),
                clusters: clusters.len(),
            });
        }

        let items = rows
            .into_iter()
            .zip(embeddings)
            .zip(clusters)
            .map(|((row, embedding), cluster_id)| CatalogItem {
                title: row.title,
                content_type: row.content_type,
                genre: row.genre,
                description: row.description,
                rating: row.rating,
                popularity: row.popularity,
                year: row.year,
                cluster_id,
                embedding,
            })
            .collect();

        Self::new(items)
    }

    /// Loads the catalog from its on-disk artifacts
    pub fn load(paths: &ArtifactPaths, rules: &TypeRules) -> Result<Self, DatasetLoadError> {
        tracing::info!(dataset = %paths.dataset.display(), "Loading catalog dataset");
        let rows = parse_table(File::open(&paths.dataset)?, rules)?;

        tracing::info!(embeddings = %paths.embeddings.display(), "Loading embeddings");
        let embeddings: Vec<Vec<f32>> = read_json(&paths.embeddings)?;

        let clusters: Vec<i32> = match &paths.clusters {
            Some(path) => {
                tracing::info!(clusters = %path.display(), "Loading cluster labels");
                read_json(path)?
            }
            None => rows
                .iter()
                .map(|row| row.cluster)
                .collect::<Option<Vec<i32>>>()
                .ok_or(DatasetLoadError::MissingClusters)?,
        };

        let store = Self::assemble(rows, embeddings, clusters)?;

        let distinct_clusters: HashSet<i32> = store.items.iter().map(|i| i.cluster_id).collect();
        tracing::info!(
            items = store.len(),
            embedding_width = store.embedding_width(),
            clusters = distinct_clusters.len(),
            "Catalog loaded"
        );

        Ok(store)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[CatalogItem] {
        &self.items
    }

    pub fn get(&self, index: usize) -> Option<&CatalogItem> {
        self.items.get(index)
    }

    pub fn embedding_width(&self) -> usize {
        self.items.first().map(|i| i.embedding.len()).unwrap_or(0)
    }

    /// Exact lookup by already-normalized title
    pub fn lookup(&self, normalized: &str) -> Option<usize> {
        self.title_index.get(normalized).copied()
    }

    pub fn normalized_titles(&self) -> &[String] {
        &self.normalized_titles
    }

    pub fn normalized_title(&self, index: usize) -> &str {
        &self.normalized_titles[index]
    }

    /// L2 norm of an item's embedding
    pub fn norm(&self, index: usize) -> f32 {
        self.norms[index]
    }

    pub fn stats(&self) -> &CatalogStats {
        &self.stats
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, DatasetLoadError> {
    let file = File::open(path)?;
    Ok(serde_json::from_reader(BufReader::new(file))?)
}

fn current_year() -> i32 {
    chrono::Utc::now().year()
}

/// Parses the dataset table, normalizing heterogeneous source columns
pub fn parse_table<R: Read>(reader: R, rules: &TypeRules) -> Result<Vec<CatalogRow>, DatasetLoadError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let headers: Vec<String> = csv_reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_lowercase())
        .collect();

    let column = |names: &[&str]| {
        names
            .iter()
            .find_map(|name| headers.iter().position(|h| h == name))
    };

    let title_col = column(TITLE_COLUMNS)
        .ok_or_else(|| DatasetLoadError::MissingColumn("title".to_string()))?;
    let type_col = column(TYPE_COLUMNS);
    let genre_col = column(GENRE_COLUMNS);
    let description_col = column(DESCRIPTION_COLUMNS);
    let rating_col = column(RATING_COLUMNS);
    let popularity_col = column(POPULARITY_COLUMNS);
    let year_col = column(YEAR_COLUMNS);
    let cluster_col = column(CLUSTER_COLUMNS);

    let max_year = current_year() + YEAR_SLACK;
    let mut rows = Vec::new();

    for (row, record) in csv_reader.records().enumerate() {
        let record = record?;
        let field = |col: Option<usize>| col.and_then(|c| record.get(c)).unwrap_or("").trim();

        let title = field(Some(title_col)).to_string();
        if title.is_empty() {
            return Err(DatasetLoadError::EmptyTitle { row });
        }

        let genre = match field(genre_col) {
            "" => DEFAULT_GENRE.to_string(),
            g => g.to_string(),
        };
        let description = field(description_col).to_string();
        let content_type = rules.classify(field(type_col), &title, &genre, &description);

        let cluster = match field(cluster_col) {
            "" => None,
            raw => Some(parse_cluster(raw).ok_or_else(|| DatasetLoadError::InvalidCluster {
                row,
                value: raw.to_string(),
            })?),
        };

        rows.push(CatalogRow {
            rating: parse_number(field(rating_col)).clamp(0.0, MAX_RATING),
            popularity: parse_number(field(popularity_col)).max(0.0),
            year: parse_year(field(year_col), max_year),
            title,
            content_type,
            genre,
            description,
            cluster,
        });
    }

    Ok(rows)
}

/// Unparseable or non-finite values count as 0
fn parse_number(raw: &str) -> f64 {
    raw.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

/// Accepts plain years ("2010", "2010.0") and dates with a leading year ("2010-07-15")
fn parse_year(raw: &str, max_year: i32) -> i32 {
    let year = match raw.parse::<f64>() {
        Ok(v) if v.is_finite() => v.trunc() as i64,
        _ => {
            let digits: String = raw.chars().take_while(|c| c.is_ascii_digit()).collect();
            if digits.len() != 4 {
                return 0;
            }
            digits.parse::<i64>().unwrap_or(0)
        }
    };

    if year <= 0 || year > max_year as i64 {
        0
    } else {
        year as i32
    }
}

fn parse_cluster(raw: &str) -> Option<i32> {
    if let Ok(v) = raw.parse::<i32>() {
        return Some(v);
    }
    // pandas writes integer columns with NaNs as floats
    raw.parse::<f64>()
        .ok()
        .filter(|v| v.fract() == 0.0 && v.abs() <= i32::MAX as f64)
        .map(|v| v as i32)
}
