//! Business logic services

pub mod destinations;
pub mod geocode_cache;
pub mod geocoding;
pub mod openroute;
pub mod optimizer;
