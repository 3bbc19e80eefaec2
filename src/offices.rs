//! Office registry: the fixed table of Massachusetts RMV service centers.
//!
//! The table is a `'static` constant, built once at compile time and never
//! mutated, so it can be shared across threads without locking.

use crate::geo::Coordinate;
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;

/// One registry office. `code` is the ZMA code and the unique key.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OfficeRecord {
    pub code: &'static str,
    pub name: &'static str,
    pub lat: f64,
    pub lon: f64,
    pub address: &'static str,
}

impl OfficeRecord {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate {
            lat: self.lat,
            lon: self.lon,
        }
    }

    /// Leading word of the display name ("Boston (Haymarket)" → "Boston").
    pub fn city(&self) -> &'static str {
        self.name.split(' ').next().unwrap_or(self.name)
    }
}

// ─── Built-in table ─────────────────────────────────────────────

const MA_OFFICES: &[OfficeRecord] = &[
    OfficeRecord { code: "601", name: "Boston (Haymarket)", lat: 42.3625, lon: -71.0561, address: "136 Blackstone St" },
    OfficeRecord { code: "603", name: "Brockton", lat: 42.0834, lon: -71.0184, address: "490 Forest Ave" },
    OfficeRecord { code: "605", name: "Chicopee", lat: 42.1490, lon: -72.6079, address: "1011 Chicopee St" },
    OfficeRecord { code: "608", name: "Fall River", lat: 41.7015, lon: -71.1550, address: "179 President Ave" },
    OfficeRecord { code: "611", name: "Lawrence", lat: 42.7070, lon: -71.1631, address: "73 Winthrop Ave" },
    OfficeRecord { code: "613", name: "Leominster", lat: 42.5251, lon: -71.7598, address: "80 Erdman Way" },
    OfficeRecord { code: "615", name: "New Bedford", lat: 41.6362, lon: -70.9342, address: "53 North 6th St" },
    OfficeRecord { code: "620", name: "Quincy", lat: 42.2529, lon: -71.0023, address: "25 Newport Ave Ext" },
    OfficeRecord { code: "622", name: "Revere", lat: 42.4084, lon: -71.0120, address: "11 Everett St" },
    OfficeRecord { code: "625", name: "Springfield", lat: 42.1015, lon: -72.5898, address: "165 Liberty St" },
    OfficeRecord { code: "628", name: "Worcester", lat: 42.2626, lon: -71.8023, address: "611 Main St" },
    OfficeRecord { code: "640", name: "Danvers", lat: 42.5651, lon: -70.9259, address: "82 Woodbury St" },
    OfficeRecord { code: "645", name: "Lowell", lat: 42.6334, lon: -71.3162, address: "77 Fortune Blvd" },
    OfficeRecord { code: "652", name: "Plymouth", lat: 41.9584, lon: -70.6673, address: "40 Industrial Park Rd" },
    OfficeRecord { code: "660", name: "Taunton", lat: 41.9001, lon: -71.0898, address: "1 Washington St" },
    OfficeRecord { code: "670", name: "Watertown", lat: 42.3709, lon: -71.1828, address: "550 Arsenal St" },
    OfficeRecord { code: "688", name: "Wilmington", lat: 42.5584, lon: -71.1684, address: "355 Main St" },
];

static MASSACHUSETTS: OfficeRegistry = OfficeRegistry { offices: MA_OFFICES };

// ─── Registry ───────────────────────────────────────────────────

/// Read-only, ordered collection of offices keyed by code.
#[derive(Debug, Clone, Copy)]
pub struct OfficeRegistry {
    offices: &'static [OfficeRecord],
}

/// Reasons a caller-supplied table is rejected.
#[derive(Debug, Clone, PartialEq)]
pub enum RegistryError {
    Empty,
    DuplicateCode(String),
    InvalidRecord(String),
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "Office registry must contain at least one office"),
            Self::DuplicateCode(code) => write!(f, "Duplicate office code '{}'", code),
            Self::InvalidRecord(code) => write!(f, "Office '{}' has an invalid coordinate", code),
        }
    }
}

impl std::error::Error for RegistryError {}

impl OfficeRegistry {
    /// The built-in Massachusetts RMV registry.
    pub fn massachusetts() -> &'static OfficeRegistry {
        &MASSACHUSETTS
    }

    /// Build a registry over another static table.
    pub fn new(offices: &'static [OfficeRecord]) -> Result<Self, RegistryError> {
        if offices.is_empty() {
            return Err(RegistryError::Empty);
        }
        let mut seen = HashSet::with_capacity(offices.len());
        for office in offices {
            if !seen.insert(office.code) {
                return Err(RegistryError::DuplicateCode(office.code.to_string()));
            }
            if !office.coordinate().is_valid() {
                return Err(RegistryError::InvalidRecord(office.code.to_string()));
            }
        }
        Ok(Self { offices })
    }

    /// All offices in table order.
    pub fn offices(&self) -> &'static [OfficeRecord] {
        self.offices
    }

    pub fn get(&self, code: &str) -> Option<&'static OfficeRecord> {
        self.offices.iter().find(|o| o.code == code)
    }

    pub fn len(&self) -> usize {
        self.offices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offices.is_empty()
    }
}
