use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use tokio::sync::Mutex;

use crate::error::AppResult;

/// Default number of posters kept on disk
pub const DEFAULT_MAX_POSTERS: usize = 300;

/// Bounded on-disk poster cache
///
/// Posters are stored as `<md5(title)>.jpg`. After every write the directory
/// is trimmed back to `max_files`, deleting the oldest-modified files first.
/// Write, listing and eviction share one lock.
#[derive(Clone)]
pub struct PosterCache {
    dir: PathBuf,
    max_files: usize,
    lock: Arc<Mutex<()>>,
}

impl PosterCache {
    /// Opens the cache directory, creating it if needed
    pub fn new(dir: impl Into<PathBuf>, max_files: usize) -> AppResult<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;

        Ok(Self {
            dir,
            max_files,
            lock: Arc::new(Mutex::new(())),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File path a title's poster is stored under
    pub fn path_for(&self, title: &str) -> PathBuf {
        self.dir
            .join(format!("{:x}.jpg", md5::compute(title.as_bytes())))
    }

    pub async fn contains(&self, title: &str) -> bool {
        tokio::fs::try_exists(self.path_for(title))
            .await
            .unwrap_or(false)
    }

    /// Writes a poster and evicts the oldest files beyond the bound
    pub async fn store(&self, title: &str, bytes: &[u8]) -> AppResult<PathBuf> {
        let _guard = self.lock.lock().await;

        let path = self.path_for(title);
        tokio::fs::write(&path, bytes).await?;

        let evicted = self.evict_oldest().await?;
        if evicted > 0 {
            tracing::debug!(
                evicted = evicted,
                max_files = self.max_files,
                "Evicted old posters"
            );
        }

        Ok(path)
    }

    /// Number of files currently in the cache directory
    pub async fn len(&self) -> AppResult<usize> {
        let _guard = self.lock.lock().await;
        Ok(self.list_files().await?.len())
    }

    async fn list_files(&self) -> AppResult<Vec<(PathBuf, SystemTime)>> {
        let mut entries = tokio::fs::read_dir(&self.dir).await?;
        let mut files = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            let metadata = entry.metadata().await?;
            if metadata.is_file() {
                let modified = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);
                files.push((entry.path(), modified));
            }
        }

        Ok(files)
    }

    /// Caller must hold the lock
    async fn evict_oldest(&self) -> AppResult<usize> {
        let mut files = self.list_files().await?;
        if files.len() <= self.max_files {
            return Ok(0);
        }

        files.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
        let excess = files.len() - self.max_files;

        for (path, _) in files.iter().take(excess) {
            tokio::fs::remove_file(path).await?;
        }

        Ok(excess)
    }
}
