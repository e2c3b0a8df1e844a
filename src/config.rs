use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::db::ArtifactPaths;
use crate::services::{franchise::DEFAULT_MIN_SHARED_WORDS, EngineConfig, FranchiseRule, RetryPolicy};

/// Which franchise rule the deduplicator applies
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum FranchiseRuleKind {
    /// Substring containment or word-set Jaccard at `franchise_jaccard_threshold`
    #[default]
    SubstringOrJaccard,
    /// At least `franchise_min_shared_words` words in common
    SharedWords,
}

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Catalog table (CSV)
    #[serde(default = "default_dataset_path")]
    pub dataset_path: PathBuf,

    /// Embedding matrix (JSON), row-aligned with the dataset
    #[serde(default = "default_embeddings_path")]
    pub embeddings_path: PathBuf,

    /// Cluster labels (JSON); falls back to the dataset's `cluster` column
    #[serde(default)]
    pub clusters_path: Option<PathBuf>,

    /// Type detection rules (JSON); built-in rules when unset
    #[serde(default)]
    pub type_rules_path: Option<PathBuf>,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// TMDB API key; metadata enrichment is disabled without it
    #[serde(default)]
    pub tmdb_api_key: Option<String>,

    #[serde(default = "default_tmdb_api_url")]
    pub tmdb_api_url: String,

    #[serde(default = "default_tmdb_image_url")]
    pub tmdb_image_url: String,

    #[serde(default = "default_jikan_api_url")]
    pub jikan_api_url: String,

    #[serde(default = "default_poster_cache_dir")]
    pub poster_cache_dir: PathBuf,

    #[serde(default = "default_max_poster_files")]
    pub max_poster_files: usize,

    /// Per-request timeout for metadata providers
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,

    /// Attempts per provider request, including the first
    #[serde(default = "default_fetch_retries")]
    pub fetch_retries: u32,

    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    #[serde(default = "default_fuzzy_match_cutoff")]
    pub fuzzy_match_cutoff: f64,

    #[serde(default)]
    pub franchise_rule: FranchiseRuleKind,

    #[serde(default = "default_franchise_jaccard_threshold")]
    pub franchise_jaccard_threshold: f64,

    #[serde(default = "default_franchise_min_shared_words")]
    pub franchise_min_shared_words: usize,

    #[serde(default = "default_top_n")]
    pub default_top_n: usize,

    #[serde(default = "default_max_top_n")]
    pub max_top_n: usize,
}

fn default_dataset_path() -> PathBuf {
    PathBuf::from("data/catalog.csv")
}

fn default_embeddings_path() -> PathBuf {
    PathBuf::from("data/embeddings.json")
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_tmdb_api_url() -> String {
    "https://api.themoviedb.org/3".to_string()
}

fn default_tmdb_image_url() -> String {
    "https://image.tmdb.org/t/p".to_string()
}

fn default_jikan_api_url() -> String {
    "https://api.jikan.moe/v4".to_string()
}

fn default_poster_cache_dir() -> PathBuf {
    PathBuf::from("cache/posters")
}

fn default_max_poster_files() -> usize {
    300
}

fn default_http_timeout_secs() -> u64 {
    8
}

fn default_fetch_retries() -> u32 {
    3
}

fn default_retry_backoff_ms() -> u64 {
    1500
}

fn default_fuzzy_match_cutoff() -> f64 {
    0.6
}

fn default_franchise_jaccard_threshold() -> f64 {
    0.6
}

fn default_franchise_min_shared_words() -> usize {
    DEFAULT_MIN_SHARED_WORDS
}

fn default_top_n() -> usize {
    10
}

fn default_max_top_n() -> usize {
    50
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    pub fn artifact_paths(&self) -> ArtifactPaths {
        ArtifactPaths {
            dataset: self.dataset_path.clone(),
            embeddings: self.embeddings_path.clone(),
            clusters: self.clusters_path.clone(),
        }
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            fuzzy_cutoff: self.fuzzy_match_cutoff,
            franchise_rule: match self.franchise_rule {
                FranchiseRuleKind::SubstringOrJaccard => FranchiseRule::SubstringOrJaccard {
                    threshold: self.franchise_jaccard_threshold,
                },
                FranchiseRuleKind::SharedWords => FranchiseRule::SharedWords {
                    min_shared: self.franchise_min_shared_words,
                },
            },
            ..EngineConfig::default()
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            attempts: self.fetch_retries,
            backoff: Duration::from_millis(self.retry_backoff_ms),
        }
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    /// Address the server binds to
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_environment() {
        let config: Config = envy::from_iter(Vec::<(String, String)>::new()).unwrap();

        assert_eq!(config.port, 5000);
        assert_eq!(config.max_poster_files, 300);
        assert_eq!(config.fetch_retries, 3);
        assert_eq!(config.default_top_n, 10);
        assert_eq!(config.max_top_n, 50);
        assert!(config.tmdb_api_key.is_none());
        assert!(config.clusters_path.is_none());
        assert_eq!(config.engine_config().franchise_rule, FranchiseRule::default());
        assert_eq!(config.retry_policy().backoff, Duration::from_millis(1500));
        assert_eq!(config.http_timeout(), Duration::from_secs(8));
    }

    #[test]
    fn test_overrides_from_environment() {
        let vars = vec![
            ("PORT".to_string(), "8080".to_string()),
            ("TMDB_API_KEY".to_string(), "secret".to_string()),
            ("CLUSTERS_PATH".to_string(), "data/clusters.json".to_string()),
            ("FRANCHISE_JACCARD_THRESHOLD".to_string(), "0.75".to_string()),
        ];
        let config: Config = envy::from_iter(vars).unwrap();

        assert_eq!(config.bind_addr(), "127.0.0.1:8080");
        assert_eq!(config.tmdb_api_key.as_deref(), Some("secret"));
        assert_eq!(
            config.artifact_paths().clusters,
            Some(PathBuf::from("data/clusters.json"))
        );
        assert_eq!(
            config.engine_config().franchise_rule,
            FranchiseRule::SubstringOrJaccard { threshold: 0.75 }
        );
    }

    #[test]
    fn test_shared_words_rule_from_environment() {
        let vars = vec![
            ("FRANCHISE_RULE".to_string(), "shared_words".to_string()),
            ("FRANCHISE_MIN_SHARED_WORDS".to_string(), "3".to_string()),
        ];
        let config: Config = envy::from_iter(vars).unwrap();

        assert_eq!(config.franchise_rule, FranchiseRuleKind::SharedWords);
        assert_eq!(
            config.engine_config().franchise_rule,
            FranchiseRule::SharedWords { min_shared: 3 }
        );
    }

    #[test]
    fn test_unknown_franchise_rule_is_rejected() {
        let vars = vec![("FRANCHISE_RULE".to_string(), "levenshtein".to_string())];
        assert!(envy::from_iter::<_, Config>(vars).is_err());
    }
}
