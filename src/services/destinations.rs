//! Destination source
//!
//! The narrow interface the pipeline pulls delivery destinations through.
//! Rows without address text are filtered here, at the boundary, so the
//! optimizer only ever sees records that at least name a place.

use std::path::PathBuf;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::types::{validate_delivery_date, AddressRecord};

/// Source of delivery destinations for one planning run.
#[async_trait]
pub trait DestinationSource: Send + Sync {
    /// May return an empty batch; never returns records without an address.
    async fn get_addresses(&self) -> Result<Vec<AddressRecord>>;
}

/// A CSV export of the dispatcher spreadsheet.
///
/// Expected header: `company,address,weight,delivery_date,manager`; missing
/// columns fall back to record defaults, extra columns are ignored.
pub struct CsvDestinations {
    path: PathBuf,
}

impl CsvDestinations {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[derive(Debug, Deserialize)]
struct RawRow {
    #[serde(default)]
    company: Option<String>,
    #[serde(default)]
    address: Option<String>,
    #[serde(default)]
    weight: Option<String>,
    #[serde(default)]
    delivery_date: Option<String>,
    #[serde(default)]
    manager: Option<String>,
}

#[async_trait]
impl DestinationSource for CsvDestinations {
    async fn get_addresses(&self) -> Result<Vec<AddressRecord>> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(&self.path)
            .with_context(|| format!("Failed to open destinations file {}", self.path.display()))?;

        let mut records = Vec::new();
        for (line, row) in reader.deserialize::<RawRow>().enumerate() {
            let row = match row {
                Ok(row) => row,
                Err(err) => {
                    warn!("Skipping unreadable row {}: {}", line + 2, err);
                    continue;
                }
            };

            let address = row.address.as_deref().unwrap_or("").trim();
            if address.is_empty() {
                debug!("Skipping row {}: no address", line + 2);
                continue;
            }

            let record = AddressRecord::from_raw(
                row.company.as_deref(),
                address,
                row.weight.as_deref(),
                row.delivery_date.as_deref(),
                row.manager.as_deref(),
            );

            if !record.has_plausible_address() {
                warn!("Row {}: address '{}' looks incomplete", line + 2, record.address);
            }
            if !record.delivery_date.is_empty() && !validate_delivery_date(&record.delivery_date) {
                warn!(
                    "Row {}: delivery date '{}' is not дд.мм or дд.мм - дд.мм",
                    line + 2,
                    record.delivery_date
                );
            }

            records.push(record);
        }

        debug!("Loaded {} destinations from {}", records.len(), self.path.display());
        Ok(records)
    }
}
