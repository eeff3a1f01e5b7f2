//! Caller-owned memoization of normalization.
//!
//! Normalizing is the expensive step, and it is a pure function of the file
//! contents. Front-ends that reload (the TUI) keep a `DatasetCache` and only
//! re-normalize when the bytes actually changed.

use std::collections::hash_map::DefaultHasher;
use std::fs;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use crate::error::AppError;
use crate::io::ingest::read_raw_table_from_bytes;
use crate::schema::{Normalized, normalize_with_report};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    /// Same path and content as last time; the previous result was reused.
    Hit,
    Miss,
}

#[derive(Debug, Default)]
pub struct DatasetCache {
    entry: Option<CacheEntry>,
}

#[derive(Debug)]
struct CacheEntry {
    path: PathBuf,
    fingerprint: u64,
    data: Arc<Normalized>,
}

impl DatasetCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read `path` and return its normalized dataset, reusing the cached one
    /// when the file content is unchanged.
    pub fn load(&mut self, path: &Path) -> Result<(Arc<Normalized>, CacheStatus), AppError> {
        let bytes = fs::read(path)
            .map_err(|e| AppError::new(2, format!("Failed to open CSV '{}': {e}", path.display())))?;
        self.load_bytes(path, &bytes)
    }

    /// Same as [`load`](Self::load) with the content already in memory.
    pub fn load_bytes(&mut self, path: &Path, bytes: &[u8]) -> Result<(Arc<Normalized>, CacheStatus), AppError> {
        let fingerprint = fingerprint(bytes);

        if let Some(entry) = &self.entry {
            if entry.path == path && entry.fingerprint == fingerprint {
                debug!(path = %path.display(), "normalization cache hit");
                return Ok((Arc::clone(&entry.data), CacheStatus::Hit));
            }
        }

        let raw = read_raw_table_from_bytes(bytes)?;
        let data = Arc::new(normalize_with_report(&raw)?);
        self.entry = Some(CacheEntry {
            path: path.to_path_buf(),
            fingerprint,
            data: Arc::clone(&data),
        });
        debug!(path = %path.display(), "normalization cache miss");
        Ok((data, CacheStatus::Miss))
    }
}

fn fingerprint(bytes: &[u8]) -> u64 {
    let mut hasher = DefaultHasher::new();
    bytes.len().hash(&mut hasher);
    bytes.hash(&mut hasher);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV_A: &[u8] = b"Date,Estimated Unemployment Rate (%)\n2020-01-31,5.0\n2020-02-29,5.5\n";
    const CSV_B: &[u8] = b"Date,Estimated Unemployment Rate (%)\n2020-01-31,6.0\n";

    #[test]
    fn unchanged_content_is_reused() {
        let mut cache = DatasetCache::new();
        let path = Path::new("data.csv");

        let (first, status) = cache.load_bytes(path, CSV_A).unwrap();
        assert_eq!(status, CacheStatus::Miss);
        let (second, status) = cache.load_bytes(path, CSV_A).unwrap();
        assert_eq!(status, CacheStatus::Hit);
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn changed_content_or_path_is_renormalized() {
        let mut cache = DatasetCache::new();
        let path = Path::new("data.csv");

        cache.load_bytes(path, CSV_A).unwrap();
        let (data, status) = cache.load_bytes(path, CSV_B).unwrap();
        assert_eq!(status, CacheStatus::Miss);
        assert_eq!(data.dataset.len(), 1);

        let (_, status) = cache.load_bytes(Path::new("other.csv"), CSV_B).unwrap();
        assert_eq!(status, CacheStatus::Miss);
    }

    #[test]
    fn schema_errors_are_not_cached() {
        let mut cache = DatasetCache::new();
        let err = cache.load_bytes(Path::new("bad.csv"), b"region\nA\n").unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(cache.entry.is_none());
    }

    #[test]
    fn load_reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.csv");
        std::fs::write(&path, CSV_A).unwrap();

        let mut cache = DatasetCache::new();
        let (data, status) = cache.load(&path).unwrap();
        assert_eq!(status, CacheStatus::Miss);
        assert_eq!(data.dataset.len(), 2);
        assert_eq!(cache.load(&path).unwrap().1, CacheStatus::Hit);
    }
}
