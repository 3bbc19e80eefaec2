//! Location resolution for the office locator.
//!
//! Turns free-text city input into a query coordinate, either offline by
//! fuzzy matching office names or online via geocoding with a local cache.

pub mod cache;
pub mod providers;
pub mod resolver;
pub mod types;

pub use cache::LocationCache;
pub use resolver::{
    default_location, normalize_query, GeocodingResolver, LocationResolver, OfficeNameResolver, Resolve,
};
pub use types::{LocationError, LocationSource, ResolvedLocation};
