pub mod candidates;
pub mod franchise;
pub mod metadata;
pub mod providers;
pub mod recommendations;
pub mod scoring;
pub mod title_search;

pub use candidates::{select_candidates, CandidatePool};
pub use franchise::{franchise_base, Deduplicator, FranchiseRule};
pub use metadata::MetadataService;
pub use providers::{JikanProvider, MetadataProvider, RetryPolicy, TmdbProvider};
pub use recommendations::{EngineConfig, RecommendationEngine};
pub use scoring::{rank, score_candidates, ScoredCandidate};
pub use title_search::TitleResolver;
