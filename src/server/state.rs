use crate::location::LocationResolver;
use crate::offices::OfficeRegistry;
use std::sync::Mutex;

pub struct AppState {
    pub resolver: Mutex<LocationResolver>,
    pub registry: &'static OfficeRegistry,
}
