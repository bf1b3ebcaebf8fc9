//! Route types

use serde::{Deserialize, Serialize};

/// Coordinates
///
/// Named fields so axis order is carried by the type. External wire formats
/// (geocoding features, optimization job locations) use positional
/// `[lon, lat]` pairs; conversion happens at the service boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    /// Positional pair in the order the routing services expect.
    pub fn to_lon_lat(self) -> [f64; 2] {
        [self.lon, self.lat]
    }

    /// Build from a wire pair in `[lon, lat]` order.
    pub fn from_lon_lat(pair: [f64; 2]) -> Self {
        Self { lat: pair[1], lon: pair[0] }
    }
}

/// A geocoded delivery destination.
///
/// Only ever constructed from a successful geocode; owned by the Route that
/// contains it and immutable afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutePoint {
    pub company: String,
    pub address: String,
    pub weight: f64,
    pub lon: f64,
    pub lat: f64,
    pub delivery_date: String,
    pub manager: String,
}

/// One vehicle's planned route.
///
/// `points` is the visiting sequence chosen by the solver. The warehouse is
/// never one of the points; it travels only as the vehicle's start/end
/// location in the optimization request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    pub points: Vec<RoutePoint>,
    /// Opaque encoded polyline returned by the optimization service.
    pub geometry: String,
}

impl Route {
    pub fn new(points: Vec<RoutePoint>, geometry: String) -> Self {
        Self { points, geometry }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinates_wire_order_roundtrip() {
        let coords = Coordinates::from_lon_lat([30.3155, 59.9386]);
        assert_eq!(coords.lat, 59.9386);
        assert_eq!(coords.lon, 30.3155);
        assert_eq!(coords.to_lon_lat(), [30.3155, 59.9386]);
    }

    #[test]
    fn test_route_point_serializes_camel_case() {
        let point = RoutePoint {
            company: "ООО Ромашка".to_string(),
            address: "Невский пр. 28".to_string(),
            weight: 50.0,
            lon: 30.33,
            lat: 59.94,
            delivery_date: "12.03".to_string(),
            manager: "Иванов".to_string(),
        };
        let json = serde_json::to_string(&point).unwrap();
        assert!(json.contains("\"deliveryDate\":\"12.03\""));
        assert!(json.contains("\"lon\":30.33"));
    }
}
