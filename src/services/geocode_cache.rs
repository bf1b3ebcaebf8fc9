//! Persistent geocode cache
//!
//! Address text -> `[lon, lat]` with a time-to-live and an LRU capacity
//! bound. The whole cache is one JSON blob on disk: loaded wholesale at
//! startup, rewritten wholesale after every successful insert. Persistence
//! is best-effort - a failed write keeps the in-memory state and logs a
//! warning, a missing or corrupt file at startup yields an empty cache.
//!
//! Only successful geocodes are ever stored; failing addresses re-trigger a
//! live lookup on every call.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CacheEntry {
    /// Wire-order pair as returned by the geocoding service.
    coords: [f64; 2],
    /// Unix seconds at insert time.
    timestamp: i64,
    /// Recency counter for eviction. Not persisted - recency resets on load.
    #[serde(skip)]
    last_used: u64,
}

/// Bounded, expiring, persistent address -> coordinates cache.
///
/// Keys are exact address strings; the cache applies no normalization.
pub struct GeocodeCache {
    entries: HashMap<String, CacheEntry>,
    max_entries: usize,
    expiry_secs: i64,
    path: Option<PathBuf>,
    tick: u64,
}

impl GeocodeCache {
    /// Load prior state from `path`. Missing or unreadable state is not an
    /// error - the cache starts empty and will try to persist again on the
    /// next write.
    pub fn load(path: impl Into<PathBuf>, max_entries: usize, expiry_secs: i64) -> Self {
        let path = path.into();
        let entries = match Self::read_blob(&path) {
            Ok(Some(entries)) => {
                debug!("Loaded {} cached geocodes from {}", entries.len(), path.display());
                entries
            }
            Ok(None) => HashMap::new(),
            Err(err) => {
                warn!("Ignoring unreadable geocode cache {}: {}", path.display(), err);
                HashMap::new()
            }
        };

        Self {
            entries,
            max_entries,
            expiry_secs,
            path: Some(path),
            tick: 0,
        }
    }

    /// A cache that never touches disk. Used by tests and one-off lookups.
    pub fn in_memory(max_entries: usize, expiry_secs: i64) -> Self {
        Self {
            entries: HashMap::new(),
            max_entries,
            expiry_secs,
            path: None,
            tick: 0,
        }
    }

    fn read_blob(path: &Path) -> anyhow::Result<Option<HashMap<String, CacheEntry>>> {
        if !path.is_file() {
            return Ok(None);
        }
        let file = std::fs::File::open(path)?;
        Ok(Some(serde_json::from_reader(file)?))
    }

    /// Look up an address. An entry is valid while `now - timestamp` is
    /// strictly below the expiry; an entry aged exactly `expiry_secs` is
    /// already a miss. Expired entries stay in the map until eviction.
    pub fn get(&mut self, address: &str) -> Option<[f64; 2]> {
        self.get_at(address, Utc::now().timestamp())
    }

    fn get_at(&mut self, address: &str, now: i64) -> Option<[f64; 2]> {
        let expiry = self.expiry_secs;
        let tick = self.next_tick();
        let entry = self.entries.get_mut(address)?;
        if now - entry.timestamp >= expiry {
            return None;
        }
        entry.last_used = tick;
        Some(entry.coords)
    }

    /// Insert a successful lookup and persist the cache. Evicts the
    /// least-recently-used entry first when the capacity bound would be
    /// exceeded.
    pub fn set(&mut self, address: &str, coords: [f64; 2]) {
        self.set_at(address, coords, Utc::now().timestamp());
    }

    fn set_at(&mut self, address: &str, coords: [f64; 2], now: i64) {
        if self.max_entries == 0 {
            return;
        }
        if !self.entries.contains_key(address) && self.entries.len() >= self.max_entries {
            self.evict_lru();
        }
        let tick = self.next_tick();
        self.entries.insert(
            address.to_string(),
            CacheEntry { coords, timestamp: now, last_used: tick },
        );
        self.persist();
    }

    fn evict_lru(&mut self) {
        let victim = self
            .entries
            .iter()
            .min_by_key(|(_, entry)| entry.last_used)
            .map(|(address, _)| address.clone());
        if let Some(address) = victim {
            debug!("Evicting least-recently-used geocode for '{}'", address);
            self.entries.remove(&address);
        }
    }

    fn next_tick(&mut self) -> u64 {
        self.tick += 1;
        self.tick
    }

    fn persist(&self) {
        let Some(path) = &self.path else {
            return;
        };
        if let Err(err) = self.write_blob(path) {
            warn!("Failed to persist geocode cache to {}: {}", path.display(), err);
        }
    }

    fn write_blob(&self, path: &Path) -> anyhow::Result<()> {
        let file = std::fs::File::create(path)?;
        serde_json::to_writer(file, &self.entries)?;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const NOW: i64 = 1_700_000_000;

    fn cache(max_entries: usize) -> GeocodeCache {
        GeocodeCache::in_memory(max_entries, 3600)
    }

    #[test]
    fn test_get_miss_on_empty() {
        let mut cache = cache(10);
        assert_eq!(cache.get("Невский пр. 28"), None);
    }

    #[test]
    fn test_set_then_get_hit() {
        let mut cache = cache(10);
        cache.set_at("Невский пр. 28", [30.33, 59.94], NOW);
        assert_eq!(cache.get_at("Невский пр. 28", NOW + 10), Some([30.33, 59.94]));
    }

    #[test]
    fn test_keys_are_case_sensitive() {
        let mut cache = cache(10);
        cache.set_at("Невский пр. 28", [30.33, 59.94], NOW);
        assert_eq!(cache.get_at("невский пр. 28", NOW), None);
    }

    #[test]
    fn test_expiry_boundaries() {
        let mut cache = cache(10);
        cache.set_at("addr", [30.0, 59.0], NOW);

        assert!(cache.get_at("addr", NOW + 3599).is_some());
        // Exactly at expiry is already a miss.
        assert!(cache.get_at("addr", NOW + 3600).is_none());
        assert!(cache.get_at("addr", NOW + 3601).is_none());
    }

    #[test]
    fn test_lru_eviction_on_overflow() {
        let mut cache = cache(3);
        cache.set_at("a", [1.0, 1.0], NOW);
        cache.set_at("b", [2.0, 2.0], NOW);
        cache.set_at("c", [3.0, 3.0], NOW);

        // Touch "a" so "b" becomes the least recently used.
        cache.get_at("a", NOW);

        cache.set_at("d", [4.0, 4.0], NOW);

        assert_eq!(cache.len(), 3);
        assert!(cache.get_at("b", NOW).is_none());
        assert!(cache.get_at("a", NOW).is_some());
        assert!(cache.get_at("c", NOW).is_some());
        assert!(cache.get_at("d", NOW).is_some());
    }

    #[test]
    fn test_overwrite_does_not_evict() {
        let mut cache = cache(2);
        cache.set_at("a", [1.0, 1.0], NOW);
        cache.set_at("b", [2.0, 2.0], NOW);
        cache.set_at("a", [1.5, 1.5], NOW + 1);

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get_at("a", NOW + 2), Some([1.5, 1.5]));
        assert!(cache.get_at("b", NOW + 2).is_some());
    }

    #[test]
    fn test_expired_entry_refreshed_by_set() {
        let mut cache = cache(10);
        cache.set_at("addr", [30.0, 59.0], NOW);
        assert!(cache.get_at("addr", NOW + 7200).is_none());

        cache.set_at("addr", [30.1, 59.1], NOW + 7200);
        assert_eq!(cache.get_at("addr", NOW + 7201), Some([30.1, 59.1]));
    }

    #[test]
    fn test_persist_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.json");

        let mut cache = GeocodeCache::load(&path, 10, 3600);
        cache.set("Невский пр. 28", [30.33, 59.94]);
        cache.set("Литейный пр. 10", [30.35, 59.95]);

        let mut reloaded = GeocodeCache::load(&path, 10, 3600);
        assert_eq!(reloaded.len(), 2);
        assert_eq!(reloaded.get("Невский пр. 28"), Some([30.33, 59.94]));
    }

    #[test]
    fn test_corrupt_file_loads_empty() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json at all").unwrap();

        let cache = GeocodeCache::load(file.path(), 10, 3600);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let cache = GeocodeCache::load(dir.path().join("absent.json"), 10, 3600);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_unwritable_path_degrades_to_memory() {
        let mut cache = GeocodeCache::load("/nonexistent-dir/cache.json", 10, 3600);
        cache.set("addr", [30.0, 59.0]);
        // Write failed, in-memory state intact.
        assert_eq!(cache.get("addr"), Some([30.0, 59.0]));
    }
}
