// ============================================================
// Layer 6 - Model Cache
// ============================================================
// Loaded predictors keyed by work directory. A process that
// predicts several files against the same model loads weights
// once; nothing is global, the cache is owned by whoever runs
// the command and passed down explicitly.

use anyhow::Result;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub struct ModelCache<P> {
    entries: HashMap<PathBuf, Arc<P>>,
}

impl<P> ModelCache<P> {
    pub fn new() -> Self {
        Self { entries: HashMap::new() }
    }

    /// Return the cached entry for `key`, running `load` only on a miss.
    /// A failed load leaves the cache untouched.
    pub fn get_or_load<F>(&mut self, key: &Path, load: F) -> Result<Arc<P>>
    where
        F: FnOnce(&Path) -> Result<P>,
    {
        if let Some(hit) = self.entries.get(key) {
            tracing::debug!("Model cache hit for '{}'", key.display());
            return Ok(Arc::clone(hit));
        }
        let loaded = Arc::new(load(key)?);
        self.entries.insert(key.to_path_buf(), Arc::clone(&loaded));
        Ok(loaded)
    }

    /// Drop one entry, e.g. after retraining into the same work dir.
    pub fn invalidate(&mut self, key: &Path) -> bool {
        self.entries.remove(key).is_some()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<P> Default for ModelCache<P> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_loads_once_per_key() {
        let calls = Cell::new(0);
        let mut cache: ModelCache<String> = ModelCache::new();
        let load = |p: &Path| {
            calls.set(calls.get() + 1);
            Ok(p.display().to_string())
        };

        let a = cache.get_or_load(Path::new("run_a"), load).unwrap();
        let again = cache.get_or_load(Path::new("run_a"), load).unwrap();
        cache.get_or_load(Path::new("run_b"), load).unwrap();

        assert_eq!(*a, "run_a");
        assert!(Arc::ptr_eq(&a, &again));
        assert_eq!(calls.get(), 2);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_failed_load_not_cached() {
        let mut cache: ModelCache<u32> = ModelCache::new();
        assert!(cache.get_or_load(Path::new("x"), |_| anyhow::bail!("boom")).is_err());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_invalidate_and_clear() {
        let mut cache: ModelCache<u32> = ModelCache::new();
        cache.get_or_load(Path::new("x"), |_| Ok(1)).unwrap();
        cache.get_or_load(Path::new("y"), |_| Ok(2)).unwrap();
        assert!(cache.invalidate(Path::new("x")));
        assert!(!cache.invalidate(Path::new("x")));
        cache.clear();
        assert!(cache.is_empty());
    }
}
