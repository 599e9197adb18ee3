//! Memo cache for assembled testcases, using moka
//!
//! Keyed by the canonical absolute path of the testcase file, for lookup and
//! storage alike, so a file referenced from several steps is parsed once per
//! project load. Entries are never evicted by size: the cache lives only as
//! long as one load.

use crate::model::TestCase;
use moka::sync::Cache;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Default pre-allocated entry count
pub const DEFAULT_CAPACITY: u64 = 10_000;

/// Statistics for cache monitoring
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of entries in cache
    pub entry_count: u64,
    /// Lookups answered from the cache
    pub hits: u64,
    /// Lookups that required loading the file
    pub misses: u64,
}

/// Path-keyed cache of assembled testcases
#[derive(Debug)]
pub struct TestcaseCache {
    inner: Cache<PathBuf, Arc<TestCase>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl TestcaseCache {
    /// Create cache sized for `initial_capacity` entries
    ///
    /// The capacity is a pre-allocation hint only; inserts beyond it are kept.
    #[inline]
    #[must_use]
    pub fn new(initial_capacity: u64) -> Self {
        let initial = usize::try_from(initial_capacity).unwrap_or(10_000);
        Self {
            inner: Cache::builder().initial_capacity(initial).build(),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Get testcase, counting the lookup as a hit or miss
    #[must_use]
    pub fn get(&self, path: &Path) -> Option<Arc<TestCase>> {
        let found = self.inner.get(path);
        let counter = if found.is_some() { &self.hits } else { &self.misses };
        counter.fetch_add(1, Ordering::Relaxed);
        found
    }

    /// Insert testcase under its canonical path
    #[inline]
    pub fn insert(&self, path: PathBuf, testcase: Arc<TestCase>) {
        self.inner.insert(path, testcase);
    }

    /// Check presence without touching the counters
    #[inline]
    #[must_use]
    pub fn contains(&self, path: &Path) -> bool {
        self.inner.contains_key(path)
    }

    /// Invalidate all entries
    #[inline]
    pub fn invalidate_all(&self) {
        self.inner.invalidate_all();
    }

    /// Get cache statistics
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        self.inner.run_pending_tasks();
        CacheStats {
            entry_count: self.inner.entry_count(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

impl Default for TestcaseCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
