//! Tag cache with a freshness window.

use super::models::TagMetadata;
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Default time a refreshed cache stays valid.
pub const DEFAULT_TAG_CACHE_TTL: Duration = Duration::from_secs(300);

/// Snapshot of the vault-wide tag map.
///
/// Owned by exactly one [`super::TagIndex`]; there is no shared or static
/// instance.
#[derive(Debug, Default)]
pub struct TagCache {
    pub entries: HashMap<String, TagMetadata>,
    /// Notes scanned by the last refresh
    pub file_count: usize,
    pub last_refresh: Option<Instant>,
}

impl TagCache {
    pub fn is_fresh(&self, ttl: Duration) -> bool {
        self.last_refresh
            .map(|at| at.elapsed() < ttl)
            .unwrap_or(false)
    }

    /// Replace the snapshot and restart the freshness window.
    pub fn replace(&mut self, entries: HashMap<String, TagMetadata>, file_count: usize) {
        self.entries = entries;
        self.file_count = file_count;
        self.last_refresh = Some(Instant::now());
    }

    pub fn invalidate(&mut self) {
        self.entries.clear();
        self.file_count = 0;
        self.last_refresh = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_freshness_window() {
        let mut cache = TagCache::default();
        assert!(!cache.is_fresh(DEFAULT_TAG_CACHE_TTL));

        cache.replace(HashMap::new(), 3);
        assert!(cache.is_fresh(DEFAULT_TAG_CACHE_TTL));
        assert!(!cache.is_fresh(Duration::ZERO));

        cache.invalidate();
        assert!(!cache.is_fresh(DEFAULT_TAG_CACHE_TTL));
        assert_eq!(cache.file_count, 0);
    }
}
