//! Location providers: offline office-name matching and the Nominatim geocoder.

use super::types::{LocationError, LocationSource, ResolvedLocation};
use crate::geo::Coordinate;
use crate::offices::{OfficeRecord, OfficeRegistry};
use serde::Deserialize;
use std::time::Duration;

// ─── Office-name matching ───────────────────────────────────────

/// Minimum similarity ratio for a fuzzy office-name match.
pub const FUZZY_CUTOFF: f64 = 0.4;

/// Compute edit distance between two strings (Levenshtein).
fn edit_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for i in 1..=a.len() {
        curr[0] = i;
        for j in 1..=b.len() {
            let cost = if a[i - 1] == b[j - 1] { 0 } else { 1 };
            curr[j] = (prev[j] + 1).min(curr[j - 1] + 1).min(prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

/// Similarity in [0, 1]: 1 for identical strings, 0 for nothing in common.
fn similarity(a: &str, b: &str) -> f64 {
    let longest = a.chars().count().max(b.chars().count());
    if longest == 0 {
        return 1.0;
    }
    1.0 - edit_distance(a, b) as f64 / longest as f64
}

/// Match a free-text query against office names.
///
/// Exact city or full-name match first, then substring, then the closest
/// name by similarity ratio at or above [`FUZZY_CUTOFF`]. Ties keep table order.
pub fn office_lookup(registry: &OfficeRegistry, query: &str) -> Option<ResolvedLocation> {
    let q = query.trim().to_lowercase();
    if q.is_empty() {
        return None;
    }

    let keys = |o: &OfficeRecord| [o.city().to_lowercase(), o.name.to_lowercase()];

    // Exact
    for office in registry.offices() {
        if keys(office).iter().any(|k| *k == q) {
            return Some(office_to_resolved(office, 1.0));
        }
    }

    // Substring
    if q.chars().count() >= 3 {
        for office in registry.offices() {
            let name = office.name.to_lowercase();
            if name.contains(&q) || q.contains(&name) {
                return Some(office_to_resolved(office, 0.9));
            }
        }
    }

    // Fuzzy
    let mut best: Option<(&OfficeRecord, f64)> = None;
    for office in registry.offices() {
        let score = keys(office)
            .iter()
            .map(|k| similarity(&q, k))
            .fold(0.0_f64, f64::max);
        if score >= FUZZY_CUTOFF && best.map_or(true, |(_, s)| score > s) {
            best = Some((office, score));
        }
    }

    best.map(|(office, score)| office_to_resolved(office, score))
}

fn office_to_resolved(office: &OfficeRecord, confidence: f64) -> ResolvedLocation {
    ResolvedLocation {
        name: office.name.to_string(),
        coordinate: office.coordinate(),
        source: LocationSource::Office,
        display_name: Some(format!("{}, {}", office.name, office.address)),
        office_code: Some(office.code.to_string()),
        confidence,
    }
}

// ─── Nominatim provider ─────────────────────────────────────────

pub const NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org/search";
const USER_AGENT: &str = "RmvLocator/0.3 (office-locator)";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Deserialize)]
pub struct NominatimResult {
    pub lat: String,
    pub lon: String,
    pub display_name: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub importance: Option<f64>,
}

/// Scope a bare city name to the state ("Salem" → "Salem, Massachusetts").
fn scoped_query(query: &str) -> String {
    if query.contains(',') {
        query.to_string()
    } else {
        format!("{}, Massachusetts", query)
    }
}

/// Geocode a place name through a Nominatim-compatible endpoint.
pub fn nominatim_resolve(base_url: &str, query: &str) -> Result<ResolvedLocation, LocationError> {
    let q = scoped_query(query);
    tracing::debug!(query = %q, "querying geocoder");

    let response = ureq::get(base_url)
        .timeout(REQUEST_TIMEOUT)
        .set("User-Agent", USER_AGENT)
        .query("q", &q)
        .query("format", "json")
        .query("limit", "1")
        .query("countrycodes", "us")
        .call()
        .map_err(|e| LocationError::Network(e.to_string()))?;

    let results: Vec<NominatimResult> = response
        .into_json()
        .map_err(|e| LocationError::InvalidResponse(e.to_string()))?;

    parse_nominatim(query, results)
}

/// Turn the first geocoder hit into a location.
pub fn parse_nominatim(
    query: &str,
    results: Vec<NominatimResult>,
) -> Result<ResolvedLocation, LocationError> {
    let top = results
        .into_iter()
        .next()
        .ok_or_else(|| LocationError::NotFound(query.to_string()))?;

    let lat: f64 = top
        .lat
        .parse()
        .map_err(|_| LocationError::InvalidResponse(format!("bad lat '{}'", top.lat)))?;
    let lon: f64 = top
        .lon
        .parse()
        .map_err(|_| LocationError::InvalidResponse(format!("bad lon '{}'", top.lon)))?;
    let coordinate = Coordinate::new(lat, lon)?;

    Ok(ResolvedLocation {
        name: top.name.filter(|n| !n.is_empty()).unwrap_or_else(|| query.to_string()),
        coordinate,
        source: LocationSource::Geocoder,
        display_name: Some(top.display_name),
        office_code: None,
        confidence: top.importance.unwrap_or(0.5).clamp(0.0, 1.0),
    })
}
