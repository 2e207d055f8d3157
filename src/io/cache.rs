//! Memoization of loaded input tables.
//!
//! Loading the full sales table is by far the slowest non-model step, and the
//! dashboard re-runs the pipeline every time the user triggers a forecast.
//! `DatasetCache` keeps loaded tables keyed by *input identity*:
//!
//! - canonical path
//! - modification time
//! - byte length
//!
//! A rewritten file therefore gets a new key and is loaded again. Entries are
//! only dropped through `invalidate` / `clear`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use tracing::debug;

use crate::error::PipelineError;

/// Identity of an input file at the time it was read.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub path: PathBuf,
    pub modified: Option<SystemTime>,
    pub len: u64,
}

impl CacheKey {
    /// Resolve the identity of `path` from filesystem metadata.
    pub fn for_path(path: &Path) -> Result<Self, PipelineError> {
        let path = path.canonicalize().map_err(|e| PipelineError::io(path, e))?;
        let meta = std::fs::metadata(&path).map_err(|e| PipelineError::io(&path, e))?;
        Ok(Self {
            modified: meta.modified().ok(),
            len: meta.len(),
            path,
        })
    }
}

/// Compute-once / serve-many cache for one kind of loaded table.
#[derive(Debug)]
pub struct DatasetCache<T> {
    entries: HashMap<CacheKey, Arc<T>>,
    hits: u64,
    misses: u64,
}

impl<T> Default for DatasetCache<T> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            hits: 0,
            misses: 0,
        }
    }
}

impl<T> DatasetCache<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached table for `path`, loading it with `loader` on a miss.
    ///
    /// Loader errors are returned as-is and nothing is cached.
    pub fn get_or_load<F>(&mut self, path: &Path, loader: F) -> Result<Arc<T>, PipelineError>
    where
        F: FnOnce(&Path) -> Result<T, PipelineError>,
    {
        let key = CacheKey::for_path(path)?;
        if let Some(hit) = self.entries.get(&key) {
            self.hits += 1;
            debug!(path = %key.path.display(), "dataset cache hit");
            return Ok(Arc::clone(hit));
        }

        self.misses += 1;
        debug!(path = %key.path.display(), "dataset cache miss");
        let value = Arc::new(loader(&key.path)?);

        // A new identity for the same path supersedes older snapshots.
        self.entries.retain(|k, _| k.path != key.path);
        self.entries.insert(key, Arc::clone(&value));
        Ok(value)
    }

    /// Drop every entry for `path`. Returns the number of entries removed.
    pub fn invalidate(&mut self, path: &Path) -> usize {
        let target = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        let before = self.entries.len();
        self.entries.retain(|k, _| k.path != target);
        before - self.entries.len()
    }

    /// Drop everything.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `(hits, misses)` since creation.
    pub fn stats(&self) -> (u64, u64) {
        (self.hits, self.misses)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn temp_file(name: &str, contents: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("salesdash-cache-{}-{name}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("data.csv");
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn loads_once_and_serves_repeatedly() {
        let path = temp_file("once", "a\n1\n");
        let mut cache: DatasetCache<String> = DatasetCache::new();
        let calls = Cell::new(0);

        let load = |p: &Path| {
            calls.set(calls.get() + 1);
            std::fs::read_to_string(p).map_err(|e| PipelineError::io(p, e))
        };

        let a = cache.get_or_load(&path, load).unwrap();
        let b = cache.get_or_load(&path, load).unwrap();
        assert_eq!(calls.get(), 1);
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(cache.stats(), (1, 1));
    }

    #[test]
    fn changed_length_reloads_and_replaces_entry() {
        let path = temp_file("changed", "a\n1\n");
        let mut cache: DatasetCache<String> = DatasetCache::new();
        let load = |p: &Path| std::fs::read_to_string(p).map_err(|e| PipelineError::io(p, e));

        let first = cache.get_or_load(&path, load).unwrap();
        std::fs::write(&path, "a\n1\n2\n").unwrap();
        let second = cache.get_or_load(&path, load).unwrap();

        assert_ne!(*first, *second);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn invalidate_and_clear() {
        let path = temp_file("invalidate", "x\n");
        let mut cache: DatasetCache<usize> = DatasetCache::new();
        cache.get_or_load(&path, |_| Ok(1)).unwrap();
        assert_eq!(cache.invalidate(&path), 1);
        assert!(cache.is_empty());

        cache.get_or_load(&path, |_| Ok(2)).unwrap();
        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn loader_error_is_not_cached() {
        let path = temp_file("error", "x\n");
        let mut cache: DatasetCache<usize> = DatasetCache::new();
        let err = cache
            .get_or_load(&path, |_| Err(PipelineError::parse("x", None, "boom")))
            .unwrap_err();
        assert!(matches!(err, PipelineError::Parse { .. }));
        assert!(cache.is_empty());
    }
}
