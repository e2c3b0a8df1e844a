//! Metadata provider abstraction
//!
//! Each provider looks a catalog title up in one third-party catalog (TMDB,
//! Jikan) and returns poster, rating and overview. Providers share the retry
//! policy below; caching is layered on top by `MetadataService`.

use std::{future::Future, time::Duration};

use crate::{
    error::AppResult,
    models::{ContentType, TitleMetadata},
};

pub mod jikan;
pub mod tmdb;

pub use jikan::JikanProvider;
pub use tmdb::TmdbProvider;

/// Trait for title metadata providers
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Looks up display metadata for a title
    ///
    /// `Ok(None)` means the provider answered but had no match.
    async fn lookup(&self, title: &str, content_type: ContentType)
        -> AppResult<Option<TitleMetadata>>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}

/// Linear backoff retry policy for provider requests
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub attempts: u32,
    /// Wait before retry `n` is `backoff * n`
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            backoff: Duration::from_millis(1500),
        }
    }
}

/// Runs `f` until it succeeds or the policy's attempts are used up
///
/// Returns the last error when every attempt fails.
pub async fn with_retry<F, Fut, T>(policy: RetryPolicy, provider: &str, mut f: F) -> AppResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = AppResult<T>>,
{
    let attempts = policy.attempts.max(1);
    let mut attempt = 1;

    loop {
        match f().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt >= attempts => return Err(e),
            Err(e) => {
                let delay = policy.backoff * attempt;
                tracing::warn!(
                    provider = provider,
                    attempt = attempt,
                    max_attempts = attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "Provider request failed, retrying"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

/// Strips everything except word characters, whitespace and `:` from a query title
pub fn clean_query_title(title: &str) -> String {
    title
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_' || c.is_whitespace() || *c == ':')
        .collect::<String>()
        .trim()
        .to_string()
}
