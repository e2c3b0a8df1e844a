use std::sync::Arc;

use reqwest::Client as HttpClient;

use crate::{
    cached,
    db::{CacheKey, MetadataCache, PosterCache},
    error::{AppError, AppResult},
    models::{ContentType, TitleMetadata},
    services::providers::MetadataProvider,
};

/// Resolves display metadata for catalog titles
///
/// Lookup order: cache, primary provider, anime fallback provider (anime
/// only), placeholder. Every outcome is cached, the placeholder included, so
/// a title is looked up remotely at most once per process.
pub struct MetadataService {
    primary: Arc<dyn MetadataProvider>,
    anime_fallback: Option<Arc<dyn MetadataProvider>>,
    cache: MetadataCache,
    posters: Option<(PosterCache, HttpClient)>,
}

impl MetadataService {
    pub fn new(
        primary: Arc<dyn MetadataProvider>,
        anime_fallback: Option<Arc<dyn MetadataProvider>>,
        cache: MetadataCache,
    ) -> Self {
        Self {
            primary,
            anime_fallback,
            cache,
            posters: None,
        }
    }

    /// Also download resolved posters into `posters`
    pub fn with_poster_cache(mut self, posters: PosterCache, http_client: HttpClient) -> Self {
        self.posters = Some((posters, http_client));
        self
    }

    pub fn cache(&self) -> &MetadataCache {
        &self.cache
    }

    pub async fn fetch(&self, title: &str, content_type: ContentType) -> AppResult<TitleMetadata> {
        cached!(
            self.cache,
            CacheKey::metadata(title, content_type),
            self.resolve(title, content_type)
        )
    }

    /// Fetches metadata for many titles in parallel, preserving input order
    pub async fn fetch_batch(
        self: &Arc<Self>,
        requests: Vec<(String, ContentType)>,
    ) -> Vec<TitleMetadata> {
        let mut tasks = Vec::with_capacity(requests.len());

        for (title, content_type) in requests {
            let service = Arc::clone(self);
            let task = tokio::spawn(async move {
                let metadata = service.fetch(&title, content_type).await;
                (title, metadata)
            });
            tasks.push(task);
        }

        let mut results = Vec::with_capacity(tasks.len());
        for task in tasks {
            match task.await {
                Ok((_, Ok(metadata))) => results.push(metadata),
                Ok((title, Err(e))) => {
                    tracing::error!(error = %e, title = %title, "Metadata fetch failed");
                    results.push(TitleMetadata::placeholder(&title));
                }
                Err(e) => {
                    tracing::error!(error = %e, "Task join error");
                    results.push(TitleMetadata::placeholder(""));
                }
            }
        }

        results
    }

    /// Provider chain for a cache miss; never fails, falls back to a placeholder
    async fn resolve(&self, title: &str, content_type: ContentType) -> AppResult<TitleMetadata> {
        if let Some(metadata) = self.try_provider(self.primary.as_ref(), title, content_type).await {
            return Ok(metadata);
        }

        if content_type == ContentType::Anime {
            if let Some(fallback) = &self.anime_fallback {
                if let Some(metadata) = self.try_provider(fallback.as_ref(), title, content_type).await {
                    return Ok(metadata);
                }
            }
        }

        tracing::debug!(title = %title, content_type = %content_type, "No provider match, using placeholder");
        Ok(TitleMetadata::placeholder(title))
    }

    async fn try_provider(
        &self,
        provider: &dyn MetadataProvider,
        title: &str,
        content_type: ContentType,
    ) -> Option<TitleMetadata> {
        match provider.lookup(title, content_type).await {
            Ok(Some(metadata)) => {
                self.store_poster(title, &metadata).await;
                Some(metadata)
            }
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    title = %title,
                    provider = provider.name(),
                    "Metadata provider failed"
                );
                None
            }
        }
    }

    /// Best effort; failures are logged and otherwise ignored
    async fn store_poster(&self, title: &str, metadata: &TitleMetadata) {
        let Some((posters, http_client)) = &self.posters else {
            return;
        };
        if !metadata.has_poster() || posters.contains(title).await {
            return;
        }

        let download = async {
            let response = http_client.get(&metadata.poster).send().await?;
            if !response.status().is_success() {
                return Err(AppError::ExternalApi(format!(
                    "Poster download returned status {}",
                    response.status()
                )));
            }
            let bytes = response.bytes().await?;
            posters.store(title, &bytes).await
        };

        if let Err(e) = download.await {
            tracing::warn!(error = %e, title = %title, "Failed to cache poster");
        }
    }
}
