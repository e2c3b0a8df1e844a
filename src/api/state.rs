use std::sync::Arc;

use crate::services::{MetadataService, RecommendationEngine};

/// Bounds applied to caller-supplied result counts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestLimits {
    pub default_top_n: usize,
    pub max_top_n: usize,
}

impl Default for RequestLimits {
    fn default() -> Self {
        Self {
            default_top_n: 10,
            max_top_n: 50,
        }
    }
}

/// Shared application state
///
/// The engine is immutable and shared without locks. Metadata enrichment is
/// optional; without it responses carry catalog fields only.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<RecommendationEngine>,
    pub metadata: Option<Arc<MetadataService>>,
    pub limits: RequestLimits,
}

impl AppState {
    pub fn new(engine: Arc<RecommendationEngine>) -> Self {
        Self {
            engine,
            metadata: None,
            limits: RequestLimits::default(),
        }
    }

    pub fn with_metadata(mut self, metadata: Arc<MetadataService>) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn with_limits(mut self, limits: RequestLimits) -> Self {
        self.limits = limits;
        self
    }
}
