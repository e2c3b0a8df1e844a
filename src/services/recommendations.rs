use std::time::Instant;

use crate::{
    db::CatalogStore,
    models::{
        CatalogSummary, ContentType, RankedItem, RecommendOptions, RecommendationSet,
        Recommendations, Weights,
    },
    services::{
        candidates::select_candidates,
        franchise::{franchise_base, Deduplicator, FranchiseRule},
        scoring::{rank, score_candidates},
        title_search::{TitleResolver, DEFAULT_FUZZY_CUTOFF},
    },
};

/// Tunables for the recommendation engine
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    pub fuzzy_cutoff: f64,
    pub franchise_rule: FranchiseRule,
    pub default_weights: Weights,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            fuzzy_cutoff: DEFAULT_FUZZY_CUTOFF,
            franchise_rule: FranchiseRule::default(),
            default_weights: Weights::default(),
        }
    }
}

/// Content-based recommender over an immutable catalog
///
/// Holds no mutable state; share it behind an `Arc` and call from any thread.
#[derive(Debug)]
pub struct RecommendationEngine {
    catalog: CatalogStore,
    resolver: TitleResolver,
    deduplicator: Deduplicator,
    default_weights: Weights,
}

impl RecommendationEngine {
    pub fn new(catalog: CatalogStore, config: EngineConfig) -> Self {
        Self {
            catalog,
            resolver: TitleResolver::new(config.fuzzy_cutoff),
            deduplicator: Deduplicator::new(config.franchise_rule),
            default_weights: config.default_weights,
        }
    }

    pub fn catalog(&self) -> &CatalogStore {
        &self.catalog
    }

    /// Recommends up to `options.top_n` titles similar to `query`
    ///
    /// The query is resolved exactly or fuzzily; candidates come from the
    /// cluster/type cascade, are scored, stripped of the query's own title,
    /// ordered by the requested sort mode and reduced to one per franchise
    /// (the query's franchise included).
    pub fn recommend(&self, query: &str, options: &RecommendOptions) -> Recommendations {
        let started = Instant::now();

        let Some(query_index) = self.resolver.resolve(&self.catalog, query) else {
            tracing::info!(
                query = %query,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Title not found in catalog"
            );
            return Recommendations::NotFound {
                query: query.to_string(),
            };
        };

        let matched = &self.catalog.items()[query_index];
        let matched_normalized = self.catalog.normalized_title(query_index);
        let desired_type = options.content_type.unwrap_or(matched.content_type);

        let pool = select_candidates(&self.catalog, query_index, desired_type);
        let weights = options.weights.unwrap_or(self.default_weights);

        let mut scored = score_candidates(&self.catalog, query_index, &pool.indices, &weights);
        scored.retain(|c| self.catalog.normalized_title(c.index) != matched_normalized);
        rank(
            &self.catalog,
            &mut scored,
            options.sort_mode.unwrap_or_default(),
        );

        let seeds = [franchise_base(&matched.title)];
        let kept = self.deduplicator.dedup_excluding(
            &scored,
            |c| self.catalog.items()[c.index].title.as_str(),
            options.top_n,
            &seeds,
        );

        let items: Vec<RankedItem> = kept
            .iter()
            .map(|c| {
                let item = &self.catalog.items()[c.index];
                RankedItem {
                    title: item.title.clone(),
                    genre: item.genre.clone(),
                    rating: item.rating,
                    year: item.year,
                    similarity: c.similarity,
                    final_score: c.final_score,
                    content_type: item.content_type,
                    cluster_id: item.cluster_id,
                }
            })
            .collect();

        tracing::info!(
            query = %query,
            matched = %matched.title,
            tier = ?pool.tier,
            pool_size = pool.len(),
            results = items.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Recommendations computed"
        );

        Recommendations::Found(RecommendationSet {
            query: query.to_string(),
            matched_title: matched.title.clone(),
            content_type: desired_type,
            tier: pool.tier,
            items,
        })
    }

    /// First `limit` catalog items of a type, in catalog order
    ///
    /// `None` browses every type.
    pub fn browse(&self, content_type: Option<ContentType>, limit: usize) -> Vec<CatalogSummary> {
        self.catalog
            .items()
            .iter()
            .filter(|item| content_type.map_or(true, |t| item.content_type == t))
            .take(limit)
            .map(CatalogSummary::from)
            .collect()
    }

    /// First `limit` items of a cluster, in catalog order
    pub fn cluster_sample(&self, cluster_id: i32, limit: usize) -> Vec<CatalogSummary> {
        self.catalog
            .items()
            .iter()
            .filter(|item| item.cluster_id == cluster_id)
            .take(limit)
            .map(CatalogSummary::from)
            .collect()
    }
}
