//! Jikan (MyAnimeList) provider, used for anime TMDB could not place

use std::time::Duration;

use reqwest::Client as HttpClient;

use crate::{
    error::{AppError, AppResult},
    models::{ContentType, JikanSearchResponse, TitleMetadata},
    services::providers::{clean_query_title, with_retry, MetadataProvider, RetryPolicy},
};

#[derive(Clone)]
pub struct JikanProvider {
    http_client: HttpClient,
    api_url: String,
    retry: RetryPolicy,
}

impl JikanProvider {
    pub fn new(api_url: String, timeout: Duration, retry: RetryPolicy) -> AppResult<Self> {
        let http_client = HttpClient::builder().timeout(timeout).build()?;

        Ok(Self {
            http_client,
            api_url: api_url.trim_end_matches('/').to_string(),
            retry,
        })
    }
}

#[async_trait::async_trait]
impl MetadataProvider for JikanProvider {
    async fn lookup(
        &self,
        title: &str,
        _content_type: ContentType,
    ) -> AppResult<Option<TitleMetadata>> {
        let query = clean_query_title(title);
        if query.is_empty() {
            return Ok(None);
        }

        let url = format!("{}/anime", self.api_url);
        let (url, query) = (url.as_str(), query.as_str());

        let search: JikanSearchResponse = with_retry(self.retry, self.name(), move || async move {
            let response = self
                .http_client
                .get(url)
                .query(&[("q", query), ("limit", "1")])
                .send()
                .await?;

            if !response.status().is_success() {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                return Err(AppError::ExternalApi(format!(
                    "Jikan API returned status {}: {}",
                    status, body
                )));
            }

            Ok(response.json().await?)
        })
        .await?;

        let metadata = search
            .data
            .into_iter()
            .next()
            .map(|anime| anime.into_metadata(title));

        tracing::info!(
            title = %title,
            found = metadata.is_some(),
            provider = "jikan",
            "Metadata lookup completed"
        );

        Ok(metadata)
    }

    fn name(&self) -> &'static str {
        "jikan"
    }
}
