//! Core types for the location subsystem.

use crate::geo::{format_coords, Coordinate, CoordinateError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// How a location was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LocationSource {
    Office,
    Geocoder,
    Cache,
    Fallback,
    Manual,
}

impl fmt::Display for LocationSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Office => write!(f, "Office name"),
            Self::Geocoder => write!(f, "Nominatim"),
            Self::Cache => write!(f, "Cache"),
            Self::Fallback => write!(f, "Default center"),
            Self::Manual => write!(f, "Manual"),
        }
    }
}

/// A query location with its provenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedLocation {
    pub name: String,
    #[serde(flatten)]
    pub coordinate: Coordinate,
    pub source: LocationSource,
    /// Full display name from the geocoder (e.g. "Worcester, Worcester County, Massachusetts, United States")
    #[serde(default)]
    pub display_name: Option<String>,
    /// Set when the query matched an office by name.
    #[serde(default)]
    pub office_code: Option<String>,
    /// Resolver confidence (0.0 to 1.0)
    #[serde(default = "default_confidence")]
    pub confidence: f64,
}

fn default_confidence() -> f64 {
    1.0
}

impl ResolvedLocation {
    pub fn display_line(&self) -> String {
        format!(
            "\u{1F4CD} {} ({})\n  \u{1F4D0} {}",
            self.name,
            self.source,
            format_coords(self.coordinate.lat, self.coordinate.lon)
        )
    }
}

/// Location resolution errors.
#[derive(Debug, Clone, PartialEq)]
pub enum LocationError {
    Network(String),
    NotFound(String),
    InvalidResponse(String),
    NoInput,
    InvalidCoordinate(CoordinateError),
}

impl fmt::Display for LocationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Network(msg) => write!(f, "Network error: {}", msg),
            Self::NotFound(q) => write!(f, "Location not found: '{}'", q),
            Self::InvalidResponse(msg) => write!(f, "Invalid geocoder response: {}", msg),
            Self::NoInput => write!(f, "No location specified. Use a city name or --lat/--lon"),
            Self::InvalidCoordinate(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for LocationError {}

impl From<CoordinateError> for LocationError {
    fn from(e: CoordinateError) -> Self {
        Self::InvalidCoordinate(e)
    }
}
