//! Catalog builders shared by unit tests.

use super::CatalogStore;
use crate::models::{CatalogItem, ContentType};

/// A catalog item with neutral defaults: rating 5, no popularity, year 2000
pub(crate) fn item(
    title: &str,
    content_type: ContentType,
    cluster_id: i32,
    embedding: &[f32],
) -> CatalogItem {
    CatalogItem {
        title: title.to_string(),
        content_type,
        genre: "Drama".to_string(),
        description: String::new(),
        rating: 5.0,
        popularity: 0.0,
        year: 2000,
        cluster_id,
        embedding: embedding.to_vec(),
    }
}

pub(crate) fn store(items: Vec<CatalogItem>) -> CatalogStore {
    CatalogStore::new(items).expect("fixture catalog must be valid")
}
