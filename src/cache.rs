//! Persisted enrichment cache.
//!
//! A JSON object mapping remote-endpoint keys (`ip:port`) to
//! [`EnrichmentRecord`]s. The file is read once at the start of a cycle and
//! rewritten in full at the end of it; a missing or corrupt file is an empty
//! cache, never an error.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Utc;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::error_handling::CacheError;
use crate::models::EnrichmentRecord;

/// Mapping from endpoint key to enrichment record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EnrichmentCache {
    entries: BTreeMap<String, EnrichmentRecord>,
}

impl EnrichmentCache {
    /// Empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads the cache, falling back to an empty one if the file is missing
    /// or unreadable.
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            debug!("No enrichment cache at {}, starting empty", path.display());
            return Self::new();
        }
        match Self::try_load(path) {
            Ok(cache) => cache,
            Err(e) => {
                warn!(
                    "Ignoring unreadable enrichment cache {}: {}",
                    path.display(),
                    e
                );
                Self::new()
            }
        }
    }

    /// Strict variant of [`EnrichmentCache::load`] used by the flush command.
    pub fn try_load(path: &Path) -> Result<Self, CacheError> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Writes the whole mapping, replacing the previous file.
    ///
    /// The content goes to a sibling temporary file first and is then renamed
    /// over `path`, so readers never observe a half-written cache. On failure
    /// the temporary file is removed and the previous file is left as it was.
    pub fn persist(&self, path: &Path) -> Result<(), CacheError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let tmp = temp_path(path);
        let content = serde_json::to_vec_pretty(self)?;
        let written = write_synced(&tmp, &content).and_then(|()| fs::rename(&tmp, path));
        if let Err(e) = written {
            if let Err(cleanup) = fs::remove_file(&tmp) {
                debug!("Could not remove {}: {cleanup}", tmp.display());
            }
            return Err(e.into());
        }
        Ok(())
    }

    /// True if `key` is absent or its record is at least `ttl_secs` old.
    pub fn needs_resolution(&self, key: &str, now: i64, ttl_secs: i64) -> bool {
        match self.entries.get(key) {
            Some(record) => is_stale(record, now, ttl_secs),
            None => true,
        }
    }

    /// Inserts or replaces the record for `key`, stamping it with the current time.
    pub fn put(&mut self, key: impl Into<String>, mut record: EnrichmentRecord) {
        record.last_resolved = Utc::now().timestamp();
        self.entries.insert(key.into(), record);
    }

    /// Stores an already-resolved record under another key without touching
    /// its resolution timestamp.
    pub fn share(&mut self, key: impl Into<String>, record: EnrichmentRecord) {
        self.entries.insert(key.into(), record);
    }

    /// A fresh record for `ip` stored under any key.
    ///
    /// Lets a new port on an already-known host reuse that host's metadata
    /// instead of triggering another provider lookup.
    pub fn fresh_for_ip(&self, ip: &str, now: i64, ttl_secs: i64) -> Option<&EnrichmentRecord> {
        self.entries
            .values()
            .filter(|record| record.ip == ip && !is_stale(record, now, ttl_secs))
            .max_by_key(|record| record.last_resolved)
    }

    /// Record stored under `key`, fresh or not.
    pub fn get(&self, key: &str) -> Option<&EnrichmentRecord> {
        self.entries.get(key)
    }

    /// Number of stored endpoints.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &EnrichmentRecord)> {
        self.entries.iter()
    }
}

fn is_stale(record: &EnrichmentRecord, now: i64, ttl_secs: i64) -> bool {
    now.saturating_sub(record.last_resolved) >= ttl_secs
}

fn write_synced(path: &Path, content: &[u8]) -> std::io::Result<()> {
    let mut file = fs::File::create(path)?;
    file.write_all(content)?;
    file.sync_all()
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "cache".into());
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use tempfile::TempDir;

    const TTL: i64 = 3 * 86_400;

    fn record(ip: &str, last_resolved: i64) -> EnrichmentRecord {
        EnrichmentRecord {
            ip: ip.to_string(),
            hostname: "not available".to_string(),
            city: "*".to_string(),
            region: "*".to_string(),
            country: "*".to_string(),
            location: "*".to_string(),
            last_resolved,
        }
    }

    #[test]
    fn test_needs_resolution_when_absent() {
        let cache = EnrichmentCache::new();
        assert!(cache.needs_resolution("1.2.3.4:443", 1_000_000, TTL));
    }

    #[test]
    fn test_needs_resolution_boundary() {
        let now = 10_000_000;
        let mut cache = EnrichmentCache::new();
        cache.share("exact:1", record("1.1.1.1", now - TTL));
        cache.share("fresh:1", record("2.2.2.2", now - TTL + 1));
        cache.share("old:1", record("3.3.3.3", now - TTL - 1));

        assert!(cache.needs_resolution("exact:1", now, TTL));
        assert!(!cache.needs_resolution("fresh:1", now, TTL));
        assert!(cache.needs_resolution("old:1", now, TTL));
    }

    #[test]
    fn test_needs_resolution_does_not_mutate() {
        let mut cache = EnrichmentCache::new();
        cache.share("k", record("1.1.1.1", 5));
        let before = cache.clone();
        let _ = cache.needs_resolution("k", 1_000_000, TTL);
        assert_eq!(cache, before);
    }

    #[test]
    fn test_put_stamps_current_time() {
        let mut cache = EnrichmentCache::new();
        let before = Utc::now().timestamp();
        cache.put("1.2.3.4:443", record("1.2.3.4", 0));
        let stored = cache.get("1.2.3.4:443").unwrap();
        assert!(stored.last_resolved >= before);
        assert!(!cache.needs_resolution("1.2.3.4:443", stored.last_resolved, TTL));
    }

    #[test]
    fn test_persist_then_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("info_cache.json");

        let mut cache = EnrichmentCache::new();
        cache.share("1.2.3.4:443", record("1.2.3.4", 100));
        cache.share("[2607:f8b0::200e]:443", record("2607:f8b0::200e", 200));
        cache.persist(&path).unwrap();

        assert_eq!(EnrichmentCache::load(&path), cache);
        assert!(!temp_path(&path).exists());
    }

    #[test]
    fn test_persist_overwrites_previous_contents() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("info_cache.json");

        let mut first = EnrichmentCache::new();
        first.share("a:1", record("1.1.1.1", 1));
        first.persist(&path).unwrap();

        let mut second = EnrichmentCache::new();
        second.share("b:2", record("2.2.2.2", 2));
        second.persist(&path).unwrap();

        let loaded = EnrichmentCache::load(&path);
        assert_eq!(loaded.len(), 1);
        assert!(loaded.get("a:1").is_none());
    }

    #[test]
    fn test_failed_persist_leaves_no_temp_file() {
        let dir = TempDir::new().unwrap();
        // A non-empty directory at the target path makes the final rename fail.
        let path = dir.path().join("info_cache.json");
        fs::create_dir(&path).unwrap();
        fs::write(path.join("occupant"), "x").unwrap();

        let mut cache = EnrichmentCache::new();
        cache.share("1.2.3.4:443", record("1.2.3.4", 100));

        assert!(matches!(cache.persist(&path), Err(CacheError::Io(_))));
        assert!(!temp_path(&path).exists());
        assert!(path.join("occupant").exists());
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let cache = EnrichmentCache::load(&dir.path().join("absent.json"));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_load_corrupt_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("info_cache.json");
        fs::write(&path, b"\x80not json{{").unwrap();

        assert!(EnrichmentCache::load(&path).is_empty());
        assert!(EnrichmentCache::try_load(&path).is_err());
    }

    #[test]
    fn test_fresh_for_ip_ignores_stale_and_other_hosts() {
        let now = 10_000_000;
        let mut cache = EnrichmentCache::new();
        cache.share("1.2.3.4:443", record("1.2.3.4", now - TTL - 5));
        cache.share("5.6.7.8:80", record("5.6.7.8", now - 10));

        assert!(cache.fresh_for_ip("1.2.3.4", now, TTL).is_none());
        assert_eq!(
            cache.fresh_for_ip("5.6.7.8", now, TTL).map(|r| r.last_resolved),
            Some(now - 10)
        );
        assert!(cache.fresh_for_ip("9.9.9.9", now, TTL).is_none());
    }

    proptest! {
        #[test]
        fn test_staleness_matches_age(age in 0i64..1_000_000, ttl in 1i64..1_000_000) {
            let now = 2_000_000_000;
            let mut cache = EnrichmentCache::new();
            cache.share("k", record("1.1.1.1", now - age));
            prop_assert_eq!(cache.needs_resolution("k", now, ttl), age >= ttl);
        }
    }
}
