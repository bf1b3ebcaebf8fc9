//! Shared business constants for route construction.

/// Time spent unloading at each destination, in seconds.
pub const SERVICE_DURATION_SECS: u32 = 300;

/// One capacity unit equals this many kilograms of cargo. Job demands and
/// vehicle capacities are both expressed in these units.
pub const CAPACITY_UNIT_KG: f64 = 100.0;

/// Delivery shift start, seconds since midnight (08:00).
pub const SHIFT_START_SECS: u32 = 28_800;

/// Delivery shift end, seconds since midnight (18:00).
pub const SHIFT_END_SECS: u32 = 64_800;

/// Label used for destinations whose company field is empty.
pub const DEFAULT_COMPANY_NAME: &str = "Без названия";

/// Warehouse location (Saint Petersburg) used when no override is configured.
pub const DEFAULT_WAREHOUSE_LAT: f64 = 59.9386;
pub const DEFAULT_WAREHOUSE_LON: f64 = 30.3155;

/// Capacity of the fallback vehicle when no fleet file is configured,
/// in capacity units.
pub const DEFAULT_VEHICLE_CAPACITY: u32 = 200;

/// Routing profile requested from the optimization service.
pub const VEHICLE_PROFILE: &str = "driving-car";
