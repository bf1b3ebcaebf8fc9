//! Destination record types

use serde::{Deserialize, Serialize};

use crate::defaults::DEFAULT_COMPANY_NAME;

/// A delivery destination as produced by the destination source.
///
/// Constructed once at the ingest boundary and immutable afterwards; every
/// optional column is resolved to its documented default here so the rest of
/// the pipeline never deals with missing fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressRecord {
    pub company: String,
    pub address: String,
    /// Parcel weight in kilograms, never negative.
    pub weight: f64,
    pub delivery_date: String,
    pub manager: String,
}

impl AddressRecord {
    /// Build a record from raw column values, applying permissive defaults.
    pub fn from_raw(
        company: Option<&str>,
        address: &str,
        weight: Option<&str>,
        delivery_date: Option<&str>,
        manager: Option<&str>,
    ) -> Self {
        let company = match company.map(str::trim) {
            Some(c) if !c.is_empty() => c.to_string(),
            _ => DEFAULT_COMPANY_NAME.to_string(),
        };
        Self {
            company,
            address: address.trim().to_string(),
            weight: parse_weight(weight.unwrap_or_default()),
            delivery_date: delivery_date.unwrap_or_default().trim().to_string(),
            manager: manager.unwrap_or_default().trim().to_string(),
        }
    }

    /// An address is plausible when it is longer than five characters and
    /// contains a house number. Used only for ingest warnings.
    pub fn has_plausible_address(&self) -> bool {
        let trimmed = self.address.trim();
        trimmed.len() > 5 && trimmed.chars().any(|c| c.is_ascii_digit())
    }
}

/// Parse a weight column tolerantly: embedded whitespace is stripped and a
/// decimal comma is accepted ("1 234,5" -> 1234.5). Unparseable or negative
/// input yields 0.0.
pub fn parse_weight(raw: &str) -> f64 {
    let cleaned: String = raw
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| if c == ',' { '.' } else { c })
        .collect();

    match cleaned.parse::<f64>() {
        Ok(w) if w.is_finite() && w >= 0.0 => w,
        _ => 0.0,
    }
}

/// Validate a delivery window string: `дд.мм` or `дд.мм - дд.мм`.
pub fn validate_delivery_date(date: &str) -> bool {
    let date = date.trim();
    if date.is_empty() {
        return false;
    }
    date.split('-').all(|part| is_day_month(part.trim()))
        && date.split('-').count() <= 2
}

fn is_day_month(part: &str) -> bool {
    let mut fields = part.split('.');
    let (day, month) = match (fields.next(), fields.next(), fields.next()) {
        (Some(d), Some(m), None) => (d, m),
        _ => return false,
    };
    matches!(day.parse::<u32>(), Ok(1..=31)) && matches!(month.parse::<u32>(), Ok(1..=12))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_raw_applies_defaults() {
        let record = AddressRecord::from_raw(None, "Невский пр. 28", None, None, None);
        assert_eq!(record.company, DEFAULT_COMPANY_NAME);
        assert_eq!(record.address, "Невский пр. 28");
        assert_eq!(record.weight, 0.0);
        assert_eq!(record.delivery_date, "");
        assert_eq!(record.manager, "");
    }

    #[test]
    fn test_from_raw_keeps_explicit_values() {
        let record = AddressRecord::from_raw(
            Some("ООО Ромашка"),
            "  Литейный пр. 10  ",
            Some("50"),
            Some("12.03"),
            Some("Иванов"),
        );
        assert_eq!(record.company, "ООО Ромашка");
        assert_eq!(record.address, "Литейный пр. 10");
        assert_eq!(record.weight, 50.0);
        assert_eq!(record.delivery_date, "12.03");
        assert_eq!(record.manager, "Иванов");
    }

    #[test]
    fn test_parse_weight_decimal_comma_and_spaces() {
        assert_eq!(parse_weight("1 234,5"), 1234.5);
        assert_eq!(parse_weight("75"), 75.0);
        assert_eq!(parse_weight("0.25"), 0.25);
    }

    #[test]
    fn test_parse_weight_garbage_is_zero() {
        assert_eq!(parse_weight(""), 0.0);
        assert_eq!(parse_weight("n/a"), 0.0);
        assert_eq!(parse_weight("-5"), 0.0);
    }

    #[test]
    fn test_validate_delivery_date_single_day() {
        assert!(validate_delivery_date("12.03"));
        assert!(validate_delivery_date("1.1"));
        assert!(!validate_delivery_date("32.03"));
        assert!(!validate_delivery_date("12.13"));
        assert!(!validate_delivery_date(""));
        assert!(!validate_delivery_date("завтра"));
    }

    #[test]
    fn test_validate_delivery_date_range() {
        assert!(validate_delivery_date("12.03 - 15.03"));
        assert!(validate_delivery_date("1.1-2.1"));
        assert!(!validate_delivery_date("12.03 - 15.03 - 16.03"));
    }

    #[test]
    fn test_plausible_address_needs_length_and_digit() {
        let with_number = AddressRecord::from_raw(None, "Невский пр. 28", None, None, None);
        assert!(with_number.has_plausible_address());

        let no_number = AddressRecord::from_raw(None, "Невский проспект", None, None, None);
        assert!(!no_number.has_plausible_address());

        let too_short = AddressRecord::from_raw(None, "д.5", None, None, None);
        assert!(!too_short.has_plausible_address());
    }
}
