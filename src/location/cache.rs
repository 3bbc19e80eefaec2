//! File-based geocoding cache at ~/.rmv-locator/cache.json.
//!
//! TTL: 30 days. Case-insensitive keys. Missing optional fields default.

use super::types::{LocationSource, ResolvedLocation};
use crate::geo::Coordinate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

const CACHE_TTL_MS: i64 = 30 * 24 * 3600 * 1000;

/// Environment variable overriding the cache file location.
pub const CACHE_PATH_ENV: &str = "RMV_LOCATOR_CACHE";

#[derive(Serialize, Deserialize, Clone)]
struct CacheEntry {
    lat: f64,
    lon: f64,
    name: String,
    timestamp: i64,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default = "default_confidence")]
    confidence: f64,
}

fn default_confidence() -> f64 {
    1.0
}

impl CacheEntry {
    fn is_fresh(&self, now: i64) -> bool {
        now - self.timestamp <= CACHE_TTL_MS
    }

    fn to_resolved(&self, coordinate: Coordinate) -> ResolvedLocation {
        ResolvedLocation {
            name: self.name.clone(),
            coordinate,
            source: LocationSource::Cache,
            display_name: self.display_name.clone(),
            office_code: None,
            confidence: self.confidence,
        }
    }
}

/// The geocoding cache.
pub struct LocationCache {
    path: PathBuf,
    entries: HashMap<String, CacheEntry>,
}

impl LocationCache {
    /// Load from the default location (~/.rmv-locator/cache.json).
    pub fn load() -> Self {
        Self::load_from(Self::default_path())
    }

    /// Load from a specific path.
    pub fn load_from(path: PathBuf) -> Self {
        let entries = Self::read_file(&path).unwrap_or_default();
        tracing::debug!(path = %path.display(), entries = entries.len(), "loaded location cache");
        Self { path, entries }
    }

    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".rmv-locator")
            .join("cache.json")
    }

    fn read_file(path: &Path) -> Option<HashMap<String, CacheEntry>> {
        let data = fs::read_to_string(path).ok()?;
        serde_json::from_str(&data).ok()
    }

    /// Look up a query. Returns None if missing, expired or out of range.
    pub fn get(&self, query: &str) -> Option<ResolvedLocation> {
        let key = query.to_lowercase();
        let entry = self.entries.get(&key)?;
        let now = chrono::Utc::now().timestamp_millis();
        if !entry.is_fresh(now) {
            return None;
        }
        match Coordinate::new(entry.lat, entry.lon) {
            Ok(coordinate) => Some(entry.to_resolved(coordinate)),
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "ignoring cache entry with invalid coordinate");
                None
            }
        }
    }

    /// Store a resolved location under `query` and persist to disk.
    pub fn put(&mut self, query: &str, resolved: &ResolvedLocation) {
        let entry = CacheEntry {
            lat: resolved.coordinate.lat,
            lon: resolved.coordinate.lon,
            name: resolved.name.clone(),
            timestamp: chrono::Utc::now().timestamp_millis(),
            display_name: resolved.display_name.clone(),
            confidence: resolved.confidence,
        };
        self.entries.insert(query.to_lowercase(), entry);
        self.persist();
    }

    fn persist(&self) {
        if let Some(parent) = self.path.parent() {
            let _ = fs::create_dir_all(parent);
        }
        match serde_json::to_string_pretty(&self.entries) {
            Ok(json) => {
                if let Err(e) = fs::write(&self.path, json) {
                    tracing::warn!(path = %self.path.display(), error = %e, "failed to write location cache");
                }
            }
            Err(e) => tracing::warn!(error = %e, "failed to serialize location cache"),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
