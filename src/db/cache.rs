use std::collections::HashMap;
use std::fmt::Display;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::models::{ContentType, TitleMetadata};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    Metadata { title: String, content_type: ContentType },
}

impl CacheKey {
    pub fn metadata(title: &str, content_type: ContentType) -> Self {
        CacheKey::Metadata {
            title: title.to_string(),
            content_type,
        }
    }
}

impl Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheKey::Metadata {
                title,
                content_type,
            } => write!(f, "meta:{}:{}", content_type, title.trim().to_lowercase()),
        }
    }
}

/// In-process metadata cache shared by all request handlers
///
/// Entries never expire; the catalog is bounded so the cache is too.
#[derive(Clone, Default)]
pub struct MetadataCache {
    entries: Arc<Mutex<HashMap<String, TitleMetadata>>>,
}

impl MetadataCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Retrieves the cached metadata for `key`, if any
    pub async fn get(&self, key: &CacheKey) -> Option<TitleMetadata> {
        self.entries.lock().await.get(&key.to_string()).cloned()
    }

    /// Stores `value` under `key`, replacing any previous entry
    pub async fn put(&self, key: &CacheKey, value: &TitleMetadata) {
        self.entries
            .lock()
            .await
            .insert(key.to_string(), value.clone());
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
