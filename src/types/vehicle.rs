//! Vehicle fleet types

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::defaults::DEFAULT_VEHICLE_CAPACITY;

/// Vehicle entity - a delivery vehicle the optimizer can assign routes to.
///
/// Capacity is expressed in capacity units (see `defaults::CAPACITY_UNIT_KG`),
/// matching the unit job demands are expressed in. The display fields are
/// passed through to the presentation layer untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vehicle {
    pub id: u32,
    pub capacity: u32,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
}

impl Vehicle {
    /// The single-vehicle fleet used when no fleet file is configured.
    pub fn default_fleet() -> Vec<Vehicle> {
        vec![Vehicle {
            id: 0,
            capacity: DEFAULT_VEHICLE_CAPACITY,
            name: None,
            color: None,
        }]
    }

    /// Load a fleet from a JSON file (an array of vehicles).
    pub fn load_fleet(path: &Path) -> Result<Vec<Vehicle>> {
        let file = std::fs::File::open(path)
            .with_context(|| format!("Failed to open fleet file {}", path.display()))?;
        let fleet: Vec<Vehicle> = serde_json::from_reader(file)
            .with_context(|| format!("Failed to parse fleet file {}", path.display()))?;
        anyhow::ensure!(!fleet.is_empty(), "Fleet file {} contains no vehicles", path.display());
        Ok(fleet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_fleet_is_single_vehicle() {
        let fleet = Vehicle::default_fleet();
        assert_eq!(fleet.len(), 1);
        assert_eq!(fleet[0].id, 0);
        assert_eq!(fleet[0].capacity, DEFAULT_VEHICLE_CAPACITY);
    }

    #[test]
    fn test_load_fleet_from_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"id": 1, "capacity": 150, "name": "Газель", "color": "blue"}},
                {{"id": 2, "capacity": 300}}]"#
        )
        .unwrap();

        let fleet = Vehicle::load_fleet(file.path()).unwrap();
        assert_eq!(fleet.len(), 2);
        assert_eq!(fleet[0].id, 1);
        assert_eq!(fleet[0].capacity, 150);
        assert_eq!(fleet[0].name.as_deref(), Some("Газель"));
        assert_eq!(fleet[1].id, 2);
        assert!(fleet[1].name.is_none());
    }

    #[test]
    fn test_load_fleet_rejects_empty_array() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[]").unwrap();
        assert!(Vehicle::load_fleet(file.path()).is_err());
    }

    #[test]
    fn test_load_fleet_missing_file_is_error() {
        assert!(Vehicle::load_fleet(Path::new("/nonexistent/fleet.json")).is_err());
    }
}
