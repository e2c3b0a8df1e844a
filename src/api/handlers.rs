use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::{AppError, AppResult};
use crate::models::{
    CandidateTier, CatalogSummary, ContentType, RankedItem, RecommendOptions, Recommendations,
    SortMode, TitleMetadata, Weights,
};

use super::state::RequestLimits;
use super::AppState;

const DEFAULT_BROWSE_LIMIT: usize = 50;
const DEFAULT_CLUSTER_LIMIT: usize = 10;
const BROWSE_ALL: &str = "all";

// Request/Response types

#[derive(Debug, Deserialize)]
pub struct RecommendRequest {
    pub title: String,
    #[serde(rename = "type", default)]
    pub content_type: Option<String>,
    #[serde(default)]
    pub top_n: Option<i64>,
    #[serde(default)]
    pub sort: Option<SortMode>,
    #[serde(default)]
    pub weights: Option<Weights>,
}

#[derive(Debug, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<usize>,
}

/// One recommendation, optionally enriched with provider metadata
#[derive(Debug, Serialize)]
pub struct RecommendedTitle {
    #[serde(flatten)]
    pub item: RankedItem,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<TitleMetadata>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum RecommendResponse {
    Found {
        query: String,
        matched_title: String,
        #[serde(rename = "type")]
        content_type: ContentType,
        tier: CandidateTier,
        results: Vec<RecommendedTitle>,
    },
    NotFound {
        error: String,
        suggestion: String,
        fallback: Option<TitleMetadata>,
    },
}

/// Validates a recommend request into engine options
fn parse_options(
    request: &RecommendRequest,
    limits: RequestLimits,
) -> AppResult<RecommendOptions> {
    if request.title.trim().is_empty() {
        return Err(AppError::InvalidInput("Title cannot be empty".to_string()));
    }

    let content_type = request
        .content_type
        .as_deref()
        .map(str::parse::<ContentType>)
        .transpose()
        .map_err(AppError::InvalidInput)?;

    let top_n = match request.top_n {
        None => limits.default_top_n,
        Some(n) if n >= 1 && n as u64 <= limits.max_top_n as u64 => n as usize,
        Some(n) => {
            return Err(AppError::InvalidInput(format!(
                "top_n must be between 1 and {}, got {}",
                limits.max_top_n, n
            )))
        }
    };

    if let Some(weights) = &request.weights {
        if !weights.is_valid() {
            return Err(AppError::InvalidInput(
                "Weights must be finite and non-negative".to_string(),
            ));
        }
    }

    Ok(RecommendOptions {
        content_type,
        top_n,
        sort_mode: request.sort,
        weights: request.weights,
    })
}

// Handlers

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "catalog_size": state.engine.catalog().len(),
    }))
}

/// Recommends titles similar to the requested one
pub async fn recommend(
    State(state): State<AppState>,
    Json(request): Json<RecommendRequest>,
) -> AppResult<Json<RecommendResponse>> {
    let options = parse_options(&request, state.limits)?;
    let query = request.title.trim().to_string();

    let engine = state.engine.clone();
    let outcome = {
        let query = query.clone();
        let options = options.clone();
        tokio::task::spawn_blocking(move || engine.recommend(&query, &options))
            .await
            .map_err(|e| AppError::Internal(format!("Recommendation task failed: {}", e)))?
    };

    let response = match outcome {
        Recommendations::Found(set) => {
            let metadata = match &state.metadata {
                Some(service) => {
                    let requests = set
                        .items
                        .iter()
                        .map(|item| (item.title.clone(), item.content_type))
                        .collect();
                    service.fetch_batch(requests).await.into_iter().map(Some).collect()
                }
                None => vec![None; set.items.len()],
            };

            RecommendResponse::Found {
                query: set.query,
                matched_title: set.matched_title,
                content_type: set.content_type,
                tier: set.tier,
                results: set
                    .items
                    .into_iter()
                    .zip(metadata)
                    .map(|(item, metadata)| RecommendedTitle { item, metadata })
                    .collect(),
            }
        }
        Recommendations::NotFound { query } => {
            let fallback = match &state.metadata {
                Some(service) => {
                    let content_type = options.content_type.unwrap_or(ContentType::Movie);
                    Some(service.fetch(&query, content_type).await?)
                }
                None => None,
            };

            RecommendResponse::NotFound {
                error: format!("'{}' not found in dataset.", query),
                suggestion: "Try another similar title.".to_string(),
                fallback,
            }
        }
    };

    Ok(Json(response))
}

/// Lists catalog items of one type, or of every type for `all`
pub async fn browse(
    State(state): State<AppState>,
    Path(content_type): Path<String>,
    Query(params): Query<LimitQuery>,
) -> AppResult<Json<Vec<CatalogSummary>>> {
    let filter = if content_type.trim().eq_ignore_ascii_case(BROWSE_ALL) {
        None
    } else {
        Some(
            content_type
                .parse::<ContentType>()
                .map_err(AppError::InvalidInput)?,
        )
    };

    let limit = params.limit.unwrap_or(DEFAULT_BROWSE_LIMIT);
    Ok(Json(state.engine.browse(filter, limit)))
}

/// Lists the first items of a cluster
pub async fn cluster_sample(
    State(state): State<AppState>,
    Path(cluster_id): Path<i32>,
    Query(params): Query<LimitQuery>,
) -> AppResult<Json<Vec<CatalogSummary>>> {
    let limit = params.limit.unwrap_or(DEFAULT_CLUSTER_LIMIT);
    let items = state.engine.cluster_sample(cluster_id, limit);

    if items.is_empty() && limit > 0 {
        return Err(AppError::NotFound(format!("Cluster {} not found", cluster_id)));
    }

    Ok(Json(items))
}
