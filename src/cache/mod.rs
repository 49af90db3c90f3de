//! Byte-bounded cache of file name resolutions.
//!
//! Eviction is plain least-recently-used via the `lru` crate; this module only
//! keeps the byte accounting.

use lru::LruCache;
use parking_lot::Mutex;
use tracing::debug;

/// Default cache budget in bytes.
pub const DEFAULT_CACHE_SIZE: usize = 2048;

/// A cached name lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    /// File name the lookup was made with.
    pub name: String,
    /// Drive file ID the name resolved to.
    pub id: String,
}

impl CacheEntry {
    /// Creates an entry.
    pub fn new(name: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: id.into(),
        }
    }

    /// Bytes this entry counts against the budget.
    pub fn weight(&self) -> usize {
        self.name.len() + self.id.len()
    }
}

struct Inner {
    entries: LruCache<String, CacheEntry>,
    used_bytes: usize,
}

/// Thread-safe LRU cache bounded by total entry weight.
pub struct FileCache {
    max_bytes: usize,
    inner: Mutex<Inner>,
}

impl FileCache {
    /// Creates a cache holding at most `max_bytes` of entries.
    pub fn new(max_bytes: usize) -> Self {
        Self {
            max_bytes,
            inner: Mutex::new(Inner {
                entries: LruCache::unbounded(),
                used_bytes: 0,
            }),
        }
    }

    /// Configured byte budget.
    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// Bytes currently held.
    pub fn used_bytes(&self) -> usize {
        self.inner.lock().used_bytes
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    /// True when empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Looks up `name`, marking it recently used.
    pub fn get(&self, name: &str) -> Option<CacheEntry> {
        self.inner.lock().entries.get(name).cloned()
    }

    /// Stores `entry`, evicting older entries to stay within budget.
    ///
    /// Returns false if the entry alone exceeds the budget and was not stored.
    pub fn insert(&self, entry: CacheEntry) -> bool {
        let weight = entry.weight();
        if weight > self.max_bytes {
            debug!(name = %entry.name, weight, max_bytes = self.max_bytes, "Entry too large to cache");
            return false;
        }

        let mut inner = self.inner.lock();
        if let Some(previous) = inner.entries.pop(&entry.name) {
            inner.used_bytes -= previous.weight();
        }

        while inner.used_bytes + weight > self.max_bytes {
            match inner.entries.pop_lru() {
                Some((_, evicted)) => {
                    inner.used_bytes -= evicted.weight();
                    debug!(name = %evicted.name, "Evicted cache entry");
                }
                None => break,
            }
        }

        inner.used_bytes += weight;
        inner.entries.put(entry.name.clone(), entry);
        true
    }

    /// Removes `name`, returning its entry.
    pub fn remove(&self, name: &str) -> Option<CacheEntry> {
        let mut inner = self.inner.lock();
        let removed = inner.entries.pop(name);
        if let Some(entry) = &removed {
            inner.used_bytes -= entry.weight();
        }
        removed
    }

    /// Drops every entry.
    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        inner.entries.clear();
        inner.used_bytes = 0;
    }
}

impl std::fmt::Debug for FileCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileCache")
            .field("max_bytes", &self.max_bytes)
            .field("used_bytes", &self.used_bytes())
            .finish()
    }
}
