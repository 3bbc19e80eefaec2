//! Geographic primitives: validated coordinates and great-circle distance.
//!
//! Distances use the haversine formula on a spherical Earth of mean radius
//! 6371 km. Accuracy is well within what an office locator needs (~0.5%).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Mean Earth radius in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Boston city center. Resolvers fall back to this point when a query
/// cannot be resolved.
pub const DEFAULT_CENTER: Coordinate = Coordinate {
    lat: 42.3601,
    lon: -71.0589,
};

/// A point on the Earth's surface in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

/// Raised when a latitude/longitude pair is non-finite or out of range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CoordinateError {
    InvalidCoordinate { lat: f64, lon: f64 },
}

impl fmt::Display for CoordinateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidCoordinate { lat, lon } => write!(
                f,
                "Invalid coordinate ({}, {}). Lat: -90..90, Lon: -180..180",
                lat, lon
            ),
        }
    }
}

impl std::error::Error for CoordinateError {}

impl Coordinate {
    /// Build a coordinate, rejecting non-finite or out-of-range values.
    pub fn new(lat: f64, lon: f64) -> Result<Self, CoordinateError> {
        let c = Self { lat, lon };
        c.validate()?;
        Ok(c)
    }

    /// Check a coordinate that was built directly (e.g. deserialized).
    pub fn validate(&self) -> Result<(), CoordinateError> {
        let lat_ok = self.lat.is_finite() && (-90.0..=90.0).contains(&self.lat);
        let lon_ok = self.lon.is_finite() && (-180.0..=180.0).contains(&self.lon);
        if lat_ok && lon_ok {
            Ok(())
        } else {
            Err(CoordinateError::InvalidCoordinate {
                lat: self.lat,
                lon: self.lon,
            })
        }
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// Great-circle distance to `other` in kilometres.
    pub fn distance_km(&self, other: &Coordinate) -> f64 {
        haversine_km(self, other)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_coords(self.lat, self.lon))
    }
}

/// Haversine distance between two coordinates, in kilometres.
///
/// `a` is clamped to `[0, 1]` so rounding can never push `sqrt(1 - a)`
/// into NaN; identical points yield exactly `0.0`.
pub fn haversine_km(a: &Coordinate, b: &Coordinate) -> f64 {
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lon = (b.lon - a.lon).to_radians();
    let h = ((d_lat / 2.0).sin().powi(2)
        + a.lat.to_radians().cos() * b.lat.to_radians().cos() * (d_lon / 2.0).sin().powi(2))
    .clamp(0.0, 1.0);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_KM * c
}

/// Format as "42.3601°N, 71.0589°W".
pub fn format_coords(lat: f64, lon: f64) -> String {
    let ns = if lat >= 0.0 { 'N' } else { 'S' };
    let ew = if lon >= 0.0 { 'E' } else { 'W' };
    format!("{:.4}\u{00B0}{}, {:.4}\u{00B0}{}", lat.abs(), ns, lon.abs(), ew)
}
