pub mod cache;
pub mod catalog;
pub mod posters;

mod macros;

#[cfg(test)]
pub(crate) mod fixtures;

pub use cache::{CacheKey, MetadataCache};
pub use catalog::{ArtifactPaths, CatalogRow, CatalogStats, CatalogStore};
pub use posters::PosterCache;
