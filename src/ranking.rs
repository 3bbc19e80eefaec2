//! Ranking engine: orders every registry office by distance from a query point.
//!
//! Pure and stateless. The result always contains every office exactly once,
//! nearest first, with equal distances ordered by office code.

use crate::geo::{Coordinate, CoordinateError};
use crate::offices::{OfficeRecord, OfficeRegistry};
use serde::Serialize;
use std::cmp::Ordering;

/// The only failure the engine reports.
pub type RankError = CoordinateError;

/// An office together with its distance from the query coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RankedOffice {
    #[serde(flatten)]
    pub office: OfficeRecord,
    pub distance_km: f64,
}

/// Rank all offices in `registry` by great-circle distance from `query`.
pub fn rank(registry: &OfficeRegistry, query: Coordinate) -> Result<Vec<RankedOffice>, RankError> {
    query.validate()?;

    let mut ranked: Vec<RankedOffice> = registry
        .offices()
        .iter()
        .map(|office| RankedOffice {
            office: *office,
            distance_km: query.distance_km(&office.coordinate()),
        })
        .collect();

    ranked.sort_by(compare_ranked);
    Ok(ranked)
}

/// The first `n` entries of [`rank`]. `n` larger than the registry returns all.
pub fn nearest(
    registry: &OfficeRegistry,
    query: Coordinate,
    n: usize,
) -> Result<Vec<RankedOffice>, RankError> {
    let mut ranked = rank(registry, query)?;
    ranked.truncate(n);
    Ok(ranked)
}

// Total order: distance first, then code. Distances are never NaN here since
// the query is validated and the clamp in haversine keeps the result finite.
fn compare_ranked(a: &RankedOffice, b: &RankedOffice) -> Ordering {
    a.distance_km
        .total_cmp(&b.distance_km)
        .then_with(|| a.office.code.cmp(b.office.code))
}

impl OfficeRegistry {
    pub fn rank(&self, query: Coordinate) -> Result<Vec<RankedOffice>, RankError> {
        rank(self, query)
    }

    pub fn nearest(&self, query: Coordinate, n: usize) -> Result<Vec<RankedOffice>, RankError> {
        nearest(self, query, n)
    }
}
