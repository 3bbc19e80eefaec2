//! Presentation helpers: top-N text list, map markers and the API payload.
//!
//! The "near" highlight is display policy only; ranking never consults it.

use crate::location::ResolvedLocation;
use crate::ranking::RankedOffice;
use serde::Serialize;

/// Offices closer than this are drawn as "you are here" markers.
pub const NEAR_THRESHOLD_KM: f64 = 0.1;

/// Default number of offices in the sidebar list.
pub const DEFAULT_TOP_N: usize = 3;

pub fn is_near(ranked: &RankedOffice) -> bool {
    ranked.distance_km < NEAR_THRESHOLD_KM
}

/// One map pin.
#[derive(Debug, Clone, Serialize)]
pub struct Marker {
    pub code: String,
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    pub tooltip: String,
    pub near: bool,
}

pub fn markers(ranked: &[RankedOffice]) -> Vec<Marker> {
    ranked
        .iter()
        .map(|r| Marker {
            code: r.office.code.to_string(),
            name: r.office.name.to_string(),
            lat: r.office.lat,
            lon: r.office.lon,
            tooltip: format!(
                "{}\nZMA code: {}\nAddress: {}\nDistance: {:.2} KM",
                r.office.name, r.office.code, r.office.address, r.distance_km
            ),
            near: is_near(r),
        })
        .collect()
}

/// A ranked entry as returned by the API.
#[derive(Debug, Clone, Serialize)]
pub struct NearestEntry {
    pub rank: usize,
    #[serde(flatten)]
    pub office: RankedOffice,
    pub near: bool,
}

/// Response body for a nearest-office query (CLI stdout and `/api/nearest`).
#[derive(Debug, Clone, Serialize)]
pub struct NearestResponse {
    pub query: ResolvedLocation,
    pub formatted_coords: String,
    pub results: Vec<NearestEntry>,
}

impl NearestResponse {
    pub fn new(query: ResolvedLocation, ranked: &[RankedOffice], limit: usize) -> Self {
        let results = ranked
            .iter()
            .take(limit)
            .enumerate()
            .map(|(i, r)| NearestEntry {
                rank: i + 1,
                office: *r,
                near: is_near(r),
            })
            .collect();
        Self {
            formatted_coords: query.coordinate.to_string(),
            query,
            results,
        }
    }
}

/// Render the top `n` offices as a text block.
pub fn render_top_list(ranked: &[RankedOffice], n: usize) -> String {
    let mut out = String::new();
    out.push_str(&format!("  Nearest {} office(s)\n", n.min(ranked.len())));
    out.push_str("  ──────────────────────────────────────────\n");

    for (i, r) in ranked.iter().take(n).enumerate() {
        let pin = if is_near(r) { "\u{1F535}" } else { "\u{1F4CD}" };
        out.push_str(&format!("  {} #{}: {}\n", pin, i + 1, r.office.name));
        out.push_str(&format!("      ZMA code : {}\n", r.office.code));
        out.push_str(&format!("      Address  : {}\n", r.office.address));
        out.push_str(&format!("      Distance : {:.2} KM\n", r.distance_km));
    }

    out.push_str("  ──────────────────────────────────────────\n");
    out
}
