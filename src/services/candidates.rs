use crate::{
    db::CatalogStore,
    models::{CandidateTier, ContentType},
};

/// Catalog indices considered for ranking, with the cascade tier that produced them
#[derive(Debug, Clone, PartialEq)]
pub struct CandidatePool {
    pub tier: CandidateTier,
    /// Ascending catalog indices, never containing the query item
    pub indices: Vec<usize>,
}

impl CandidatePool {
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// Selects the candidate pool for a resolved query item
///
/// Cascade, first non-empty pool wins:
/// 1. same cluster and desired type
/// 2. desired type anywhere
/// 3. the whole catalog
///
/// The global tier is empty only for a single-item catalog.
pub fn select_candidates(
    catalog: &CatalogStore,
    query_index: usize,
    desired_type: ContentType,
) -> CandidatePool {
    let Some(query) = catalog.get(query_index) else {
        return CandidatePool {
            tier: CandidateTier::Global,
            indices: Vec::new(),
        };
    };

    let others = move || {
        catalog
            .items()
            .iter()
            .enumerate()
            .filter(move |(index, _)| *index != query_index)
    };

    let cluster_peers: Vec<usize> = others()
        .filter(|(_, item)| item.cluster_id == query.cluster_id && item.content_type == desired_type)
        .map(|(index, _)| index)
        .collect();
    if !cluster_peers.is_empty() {
        return CandidatePool {
            tier: CandidateTier::Cluster,
            indices: cluster_peers,
        };
    }

    tracing::debug!(
        cluster_id = query.cluster_id,
        content_type = %desired_type,
        "No same-type peers in cluster, widening to type-only pool"
    );

    let type_peers: Vec<usize> = others()
        .filter(|(_, item)| item.content_type == desired_type)
        .map(|(index, _)| index)
        .collect();
    if !type_peers.is_empty() {
        return CandidatePool {
            tier: CandidateTier::TypeOnly,
            indices: type_peers,
        };
    }

    tracing::debug!(
        content_type = %desired_type,
        "No items of desired type, falling back to the whole catalog"
    );

    CandidatePool {
        tier: CandidateTier::Global,
        indices: others().map(|(index, _)| index).collect(),
    }
}
