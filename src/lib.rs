//! Nearest Massachusetts RMV office locator.
//!
//! The core is [`offices::OfficeRegistry`] plus [`ranking::rank`]; resolution
//! of free text to a coordinate lives in [`location`], display in [`report`].

pub mod geo;
pub mod location;
pub mod offices;
pub mod ranking;
pub mod report;
pub mod server;
