//! Resolvers turning free-text input into a query coordinate.
//!
//! Chain flow:  Cache → Nominatim (online only) → office-name match → default center
//!
//! The ranking engine only ever sees the resulting [`Coordinate`]; the
//! fallback policy lives entirely here.

use super::cache::LocationCache;
use super::providers;
use super::types::{LocationError, LocationSource, ResolvedLocation};
use crate::geo::{Coordinate, DEFAULT_CENTER};
use crate::offices::OfficeRegistry;

/// Capability shared by every resolution strategy.
pub trait Resolve {
    fn resolve(&mut self, text: &str) -> Result<ResolvedLocation, LocationError>;
}

/// Trim and title-case user input ("  new   bedford " → "New Bedford").
pub fn normalize_query(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(|c| c.to_lowercase()))
                    .collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// The location used when nothing else resolves.
pub fn default_location() -> ResolvedLocation {
    ResolvedLocation {
        name: "Boston".into(),
        coordinate: DEFAULT_CENTER,
        source: LocationSource::Fallback,
        display_name: None,
        office_code: None,
        confidence: 0.0,
    }
}

// ─── Offline: office names ──────────────────────────────────────

/// Resolves by fuzzy matching against the registry's office names.
pub struct OfficeNameResolver {
    registry: &'static OfficeRegistry,
}

impl OfficeNameResolver {
    pub fn new(registry: &'static OfficeRegistry) -> Self {
        Self { registry }
    }
}

impl Default for OfficeNameResolver {
    fn default() -> Self {
        Self::new(OfficeRegistry::massachusetts())
    }
}

impl Resolve for OfficeNameResolver {
    fn resolve(&mut self, text: &str) -> Result<ResolvedLocation, LocationError> {
        let query = normalize_query(text);
        if query.is_empty() {
            return Err(LocationError::NoInput);
        }
        providers::office_lookup(self.registry, &query).ok_or(LocationError::NotFound(query))
    }
}

// ─── Online: geocoder ───────────────────────────────────────────

/// Resolves through Nominatim, memoizing hits in a [`LocationCache`].
pub struct GeocodingResolver {
    cache: LocationCache,
    endpoint: String,
}

impl GeocodingResolver {
    pub fn new(cache: LocationCache) -> Self {
        Self::with_endpoint(cache, providers::NOMINATIM_URL)
    }

    pub fn with_endpoint(cache: LocationCache, endpoint: impl Into<String>) -> Self {
        Self {
            cache,
            endpoint: endpoint.into(),
        }
    }

    /// Cached result only; never touches the network.
    pub fn cached(&self, text: &str) -> Option<ResolvedLocation> {
        self.cache.get(&normalize_query(text))
    }
}

impl Resolve for GeocodingResolver {
    fn resolve(&mut self, text: &str) -> Result<ResolvedLocation, LocationError> {
        let query = normalize_query(text);
        if query.is_empty() {
            return Err(LocationError::NoInput);
        }
        if let Some(hit) = self.cache.get(&query) {
            return Ok(hit);
        }
        let loc = providers::nominatim_resolve(&self.endpoint, &query)?;
        self.cache.put(&query, &loc);
        Ok(loc)
    }
}

// ─── Chain ──────────────────────────────────────────────────────

/// The full fallback pipeline used by the CLI and the server.
pub struct LocationResolver {
    geocoder: GeocodingResolver,
    offices: OfficeNameResolver,
    offline: bool,
}

impl LocationResolver {
    pub fn new() -> Self {
        Self::with_cache(LocationCache::load())
    }

    pub fn with_cache(cache: LocationCache) -> Self {
        Self {
            geocoder: GeocodingResolver::new(cache),
            offices: OfficeNameResolver::default(),
            offline: false,
        }
    }

    /// Offline mode skips the geocoder (the cache is still consulted).
    pub fn set_offline(&mut self, offline: bool) {
        self.offline = offline;
    }

    /// Resolve without the default-center fallback.
    pub fn resolve_strict(&mut self, text: &str) -> Result<ResolvedLocation, LocationError> {
        let query = normalize_query(text);
        if query.is_empty() {
            return Err(LocationError::NoInput);
        }

        if let Some(hit) = self.geocoder.cached(&query) {
            return Ok(hit);
        }

        if !self.offline {
            match self.geocoder.resolve(&query) {
                Ok(loc) => return Ok(loc),
                Err(e) => tracing::warn!(query = %query, error = %e, "geocoder failed, trying office names"),
            }
        }

        self.offices.resolve(&query)
    }

    /// Create a location from explicit coordinates.
    pub fn from_manual(lat: f64, lon: f64) -> Result<ResolvedLocation, LocationError> {
        let coordinate = Coordinate::new(lat, lon)?;
        Ok(ResolvedLocation {
            name: format!("{:.4}, {:.4}", lat, lon),
            coordinate,
            source: LocationSource::Manual,
            display_name: None,
            office_code: None,
            confidence: 1.0,
        })
    }
}

impl Default for LocationResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl Resolve for LocationResolver {
    /// Never fails: unresolvable or empty input degrades to the default center.
    fn resolve(&mut self, text: &str) -> Result<ResolvedLocation, LocationError> {
        match self.resolve_strict(text) {
            Ok(loc) => Ok(loc),
            Err(e) => {
                tracing::info!(query = %text.trim(), reason = %e, "falling back to default center");
                Ok(default_location())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn offline_resolver() -> (LocationResolver, TempDir) {
        let dir = TempDir::new().unwrap();
        let cache = LocationCache::load_from(dir.path().join("cache.json"));
        let mut resolver = LocationResolver::with_cache(cache);
        resolver.set_offline(true);
        (resolver, dir)
    }

    #[test]
    fn test_normalize_query() {
        assert_eq!(normalize_query("  new   bedford "), "New Bedford");
        assert_eq!(normalize_query("WORCESTER"), "Worcester");
        assert_eq!(normalize_query("   "), "");
    }

    #[test]
    fn test_office_resolver() {
        let mut r = OfficeNameResolver::default();
        let loc = r.resolve("quincy").unwrap();
        assert_eq!(loc.office_code.as_deref(), Some("620"));
        assert_eq!(r.resolve(""), Err(LocationError::NoInput));
        assert!(matches!(r.resolve("zzzzzzzz"), Err(LocationError::NotFound(_))));
    }

    #[test]
    fn test_chain_offline_office_match() {
        let (mut resolver, _dir) = offline_resolver();
        let loc = resolver.resolve("Lowel").unwrap();
        assert_eq!(loc.source, LocationSource::Office);
        assert_eq!(loc.office_code.as_deref(), Some("645"));
    }

    #[test]
    fn test_chain_falls_back_to_default_center() {
        let (mut resolver, _dir) = offline_resolver();
        let loc = resolver.resolve("zzzzzzzz").unwrap();
        assert_eq!(loc.source, LocationSource::Fallback);
        assert_eq!(loc.coordinate, DEFAULT_CENTER);
    }

    #[test]
    fn test_chain_empty_input_falls_back() {
        let (mut resolver, _dir) = offline_resolver();
        assert_eq!(resolver.resolve("").unwrap().coordinate, DEFAULT_CENTER);
        assert_eq!(resolver.resolve_strict(""), Err(LocationError::NoInput));
    }

    #[test]
    fn test_strict_not_found() {
        let (mut resolver, _dir) = offline_resolver();
        assert!(matches!(
            resolver.resolve_strict("zzzzzzzz"),
            Err(LocationError::NotFound(_))
        ));
    }

    #[test]
    fn test_chain_cache_hit_offline() {
        let dir = TempDir::new().unwrap();
        let mut cache = LocationCache::load_from(dir.path().join("cache.json"));
        cache.put(
            "Salem",
            &ResolvedLocation {
                name: "Salem".into(),
                coordinate: Coordinate { lat: 42.5195, lon: -70.8967 },
                source: LocationSource::Geocoder,
                display_name: None,
                office_code: None,
                confidence: 0.6,
            },
        );
        let mut resolver = LocationResolver::with_cache(cache);
        resolver.set_offline(true);

        let loc = resolver.resolve("salem").unwrap();
        assert_eq!(loc.source, LocationSource::Cache);
        assert!((loc.coordinate.lat - 42.5195).abs() < 1e-9);
    }

    #[test]
    fn test_chain_skips_out_of_range_cache_entry() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cache.json");
        std::fs::write(
            &path,
            r#"{ "zzzzzzzz": { "lat": 200.0, "lon": -70.89, "name": "Nowhere", "timestamp": 9999999999999 } }"#,
        )
        .unwrap();
        let mut resolver = LocationResolver::with_cache(LocationCache::load_from(path));
        resolver.set_offline(true);

        let loc = resolver.resolve("zzzzzzzz").unwrap();
        assert_eq!(loc.source, LocationSource::Fallback);
        assert_eq!(loc.coordinate, DEFAULT_CENTER);
        assert!(OfficeRegistry::massachusetts().rank(loc.coordinate).is_ok());
    }

    #[test]
    fn test_geocoder_unreachable_falls_through() {
        let dir = TempDir::new().unwrap();
        let cache = LocationCache::load_from(dir.path().join("cache.json"));
        let mut resolver = LocationResolver {
            geocoder: GeocodingResolver::with_endpoint(cache, "http://127.0.0.1:9/search"),
            offices: OfficeNameResolver::default(),
            offline: false,
        };
        let loc = resolver.resolve("Taunton").unwrap();
        assert_eq!(loc.office_code.as_deref(), Some("660"));
    }

    #[test]
    fn test_manual_location() {
        let loc = LocationResolver::from_manual(42.0, -71.0).unwrap();
        assert_eq!(loc.source, LocationSource::Manual);
        assert!(matches!(
            LocationResolver::from_manual(200.0, 0.0),
            Err(LocationError::InvalidCoordinate(_))
        ));
    }

    #[test]
    fn test_resolvers_are_interchangeable() {
        let (chain, _dir) = offline_resolver();
        let mut resolvers: Vec<Box<dyn Resolve>> =
            vec![Box::new(OfficeNameResolver::default()), Box::new(chain)];
        for r in resolvers.iter_mut() {
            let loc = r.resolve("Danvers").unwrap();
            assert_eq!(loc.office_code.as_deref(), Some("640"));
        }
    }
}
