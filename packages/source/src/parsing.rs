//! Field coercion helpers for raw API items.
//!
//! The API sends the same field as a JSON string on one call and a number
//! on the next, omits fields freely, and uses blank strings for unknown
//! values. Every helper here returns `None` instead of failing.

use er_congestion_hospital_models::{is_valid_latitude, is_valid_longitude};
use serde_json::Value;

use crate::RawRecord;

/// Reads a text field. Numbers are rendered as their decimal text; blank
/// strings and other JSON types yield `None`.
#[must_use]
pub fn get_string(record: &RawRecord, field: &str) -> Option<String> {
    match record.get(field)? {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Reads a finite floating-point value from a number or numeric string.
#[must_use]
pub fn get_f64(record: &RawRecord, field: &str) -> Option<f64> {
    let value = match record.get(field)? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    value.is_finite().then_some(value)
}

/// Reads a non-negative count (beds, patients). Negative values are
/// treated as missing.
#[must_use]
pub fn get_count(record: &RawRecord, field: &str) -> Option<f64> {
    get_f64(record, field).filter(|v| *v >= 0.0)
}

/// Reads a WGS84 latitude, rejecting out-of-range values.
#[must_use]
pub fn get_latitude(record: &RawRecord, field: &str) -> Option<f64> {
    get_f64(record, field).filter(|v| is_valid_latitude(*v))
}

/// Reads a WGS84 longitude, rejecting out-of-range values.
#[must_use]
pub fn get_longitude(record: &RawRecord, field: &str) -> Option<f64> {
    get_f64(record, field).filter(|v| is_valid_longitude(*v))
}

/// First whitespace-delimited token of an address, e.g. the province or
/// metropolitan city of a Korean postal address.
#[must_use]
pub fn derive_region(address: Option<&str>) -> Option<String> {
    address?.split_whitespace().next().map(str::to_string)
}
