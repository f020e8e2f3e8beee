use crate::item::DriveItem;
use std::collections::HashMap;
use std::time::{Duration, SystemTime};
use tracing::debug;

/// Window after which a cached path resolution is considered stale.
pub const PATH_TTL: Duration = Duration::from_secs(30);

struct CacheEntry {
    item: DriveItem,
    inserted_at: SystemTime,
}

impl CacheEntry {
    /// An entry is valid only while its age is within the TTL *and* its
    /// insertion time is not in the future. A future timestamp means the
    /// system clock moved; trusting such an entry would extend its
    /// lifetime unboundedly, so it is treated as invalid.
    fn is_valid(&self, now: SystemTime) -> bool {
        match now.duration_since(self.inserted_at) {
            Ok(age) => age < PATH_TTL,
            Err(_) => false,
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub expirations: u64,
}

/// Bounded-staleness memo from file-system path to resolved item.
///
/// Keyed by path, not by object id: two paths denoting the same object are
/// cached independently. Entry count is unbounded; the only eviction is
/// expiry-on-lookup.
pub struct PathCache {
    entries: HashMap<String, CacheEntry>,
    stats: CacheStats,
}

impl PathCache {
    pub fn new() -> Self {
        PathCache {
            entries: HashMap::new(),
            stats: CacheStats::default(),
        }
    }

    pub fn lookup(&mut self, path: &str) -> Option<DriveItem> {
        self.lookup_at(path, SystemTime::now())
    }

    /// Lookup against an explicit clock; invalid entries encountered here
    /// are removed as a side effect.
    pub fn lookup_at(&mut self, path: &str, now: SystemTime) -> Option<DriveItem> {
        match self.entries.get(path) {
            Some(entry) if entry.is_valid(now) => {
                self.stats.hits += 1;
                Some(entry.item.clone())
            }
            Some(_) => {
                self.entries.remove(path);
                self.stats.expirations += 1;
                self.stats.misses += 1;
                debug!("path cache: evicted stale entry for {}", path);
                None
            }
            None => {
                self.stats.misses += 1;
                None
            }
        }
    }

    pub fn insert(&mut self, path: &str, item: DriveItem) {
        self.insert_at(path, item, SystemTime::now());
    }

    /// Insert with an explicit timestamp; unconditionally overwrites any
    /// existing entry for the path.
    pub fn insert_at(&mut self, path: &str, item: DriveItem, now: SystemTime) {
        self.entries.insert(
            path.to_string(),
            CacheEntry {
                item,
                inserted_at: now,
            },
        );
    }

    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl Default for PathCache {
    fn default() -> Self {
        Self::new()
    }
}
