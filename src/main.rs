use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cinesense_api::{
    api::{create_router, AppState, RequestLimits},
    config::Config,
    db::{CatalogStore, MetadataCache, PosterCache},
    models::TypeRules,
    services::{JikanProvider, MetadataService, RecommendationEngine, TmdbProvider},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env()?;

    let rules = match &config.type_rules_path {
        Some(path) => TypeRules::from_json_file(path)
            .with_context(|| format!("Failed to load type rules from {}", path.display()))?,
        None => TypeRules::default(),
    };
    tracing::info!(version = %rules.version, "Type rules ready");

    let catalog = CatalogStore::load(&config.artifact_paths(), &rules)
        .context("Failed to load catalog artifacts")?;
    let engine = Arc::new(RecommendationEngine::new(catalog, config.engine_config()));

    let mut state = AppState::new(engine).with_limits(RequestLimits {
        default_top_n: config.default_top_n,
        max_top_n: config.max_top_n,
    });

    match build_metadata_service(&config)? {
        Some(metadata) => state = state.with_metadata(Arc::new(metadata)),
        None => tracing::warn!("TMDB_API_KEY not set, metadata enrichment disabled"),
    }

    let app = create_router(state);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// TMDB first, Jikan as the anime fallback, with a bounded poster cache
fn build_metadata_service(config: &Config) -> anyhow::Result<Option<MetadataService>> {
    let Some(api_key) = config.tmdb_api_key.clone().filter(|k| !k.trim().is_empty()) else {
        return Ok(None);
    };

    let tmdb = TmdbProvider::new(
        api_key,
        config.tmdb_api_url.clone(),
        config.tmdb_image_url.clone(),
        config.http_timeout(),
        config.retry_policy(),
    )?;
    let jikan = JikanProvider::new(
        config.jikan_api_url.clone(),
        config.http_timeout(),
        config.retry_policy(),
    )?;

    let posters = PosterCache::new(&config.poster_cache_dir, config.max_poster_files)?;
    let poster_client = reqwest::Client::builder()
        .timeout(config.http_timeout())
        .build()?;

    tracing::info!(
        poster_cache = %config.poster_cache_dir.display(),
        max_posters = config.max_poster_files,
        "Metadata enrichment enabled"
    );

    Ok(Some(
        MetadataService::new(Arc::new(tmdb), Some(Arc::new(jikan)), MetadataCache::new())
            .with_poster_cache(posters, poster_client),
    ))
}
