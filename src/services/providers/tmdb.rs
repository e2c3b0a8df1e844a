//! TMDB search provider
//!
//! API Flow:
//! 1. `/search/movie` for movies, `/search/tv` for everything else
//! 2. `/search/multi` when the typed search comes back empty
//!
//! The best hit is the first one carrying a poster, else the first hit.

use std::time::Duration;

use reqwest::Client as HttpClient;

use crate::{
    error::{AppError, AppResult},
    models::{ContentType, TitleMetadata, TmdbResult, TmdbSearchResponse},
    services::providers::{clean_query_title, with_retry, MetadataProvider, RetryPolicy},
};

const MULTI_SEARCH: &str = "search/multi";

#[derive(Clone)]
pub struct TmdbProvider {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    image_url: String,
    retry: RetryPolicy,
}

impl TmdbProvider {
    pub fn new(
        api_key: String,
        api_url: String,
        image_url: String,
        timeout: Duration,
        retry: RetryPolicy,
    ) -> AppResult<Self> {
        let http_client = HttpClient::builder().timeout(timeout).build()?;

        Ok(Self {
            http_client,
            api_key,
            api_url: api_url.trim_end_matches('/').to_string(),
            image_url,
            retry,
        })
    }

    fn endpoint_for(content_type: ContentType) -> &'static str {
        match content_type {
            ContentType::Movie => "search/movie",
            _ => "search/tv",
        }
    }

    /// One search request, retried per the policy
    async fn search(&self, endpoint: &str, query: &str) -> AppResult<Vec<TmdbResult>> {
        let url = format!("{}/{}", self.api_url, endpoint);
        let url = url.as_str();

        with_retry(self.retry, self.name(), move || async move {
            let response = self
                .http_client
                .get(url)
                .query(&[
                    ("api_key", self.api_key.as_str()),
                    ("query", query),
                    ("language", "en-US"),
                ])
                .send()
                .await?;

            if !response.status().is_success() {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                return Err(AppError::ExternalApi(format!(
                    "TMDB API returned status {}: {}",
                    status, body
                )));
            }

            let search: TmdbSearchResponse = response.json().await?;
            Ok(search.results)
        })
        .await
    }
}

/// First hit with a poster, else the first hit
fn best_result(results: Vec<TmdbResult>) -> Option<TmdbResult> {
    let with_poster = results
        .iter()
        .position(|r| r.poster_path.as_deref().is_some_and(|p| !p.is_empty()));
    results.into_iter().nth(with_poster.unwrap_or(0))
}

#[async_trait::async_trait]
impl MetadataProvider for TmdbProvider {
    async fn lookup(
        &self,
        title: &str,
        content_type: ContentType,
    ) -> AppResult<Option<TitleMetadata>> {
        let query = clean_query_title(title);
        if query.is_empty() {
            return Ok(None);
        }

        let mut results = self.search(Self::endpoint_for(content_type), &query).await?;
        if results.is_empty() {
            tracing::debug!(title = %title, "Typed TMDB search empty, trying multi search");
            results = self.search(MULTI_SEARCH, &query).await?;
        }

        let metadata = best_result(results).map(|r| r.into_metadata(&self.image_url, title));

        tracing::info!(
            title = %title,
            found = metadata.is_some(),
            provider = "tmdb",
            "Metadata lookup completed"
        );

        Ok(metadata)
    }

    fn name(&self) -> &'static str {
        "tmdb"
    }
}
