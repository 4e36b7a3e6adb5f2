#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the ER congestion server.
//!
//! These types are serialized to JSON for the REST API. Hospital rows are
//! reused from the domain models as-is; only the envelopes live here.

use chrono::{DateTime, Utc};
use er_congestion_hospital_models::{Coordinate, MarkerDescriptor, RankedHospital};
use serde::{Deserialize, Serialize};

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHealth {
    /// Whether the server is healthy.
    pub healthy: bool,
    /// Server version.
    pub version: String,
}

/// Response of `GET /api/hospitals`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHospitalList {
    /// When the underlying snapshot was fetched.
    pub fetched_at: DateTime<Utc>,
    /// Filtered hospitals, lowest congestion first.
    pub hospitals: Vec<RankedHospital>,
    /// Top picks; `null` unless a valid reference point was given.
    pub recommended: Option<Vec<RankedHospital>>,
    /// User-facing warning about the request, if any.
    pub warning: Option<String>,
}

/// Response of `GET /api/markers`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiMarkers {
    /// Suggested map center.
    pub center: Coordinate,
    pub markers: Vec<MarkerDescriptor>,
    pub warning: Option<String>,
}

/// Error body for non-2xx responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
}

/// Query parameters shared by the hospital endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HospitalQueryParams {
    /// Row limit for the upstream fetch. Defaults to the configured limit.
    pub rows: Option<u32>,
    /// Exact region, or `all`.
    pub region: Option<String>,
    /// Case-insensitive name substring.
    pub name: Option<String>,
    /// Comma-separated label names.
    pub labels: Option<String>,
    /// Reference latitude, as typed by the user.
    pub lat: Option<String>,
    /// Reference longitude, as typed by the user.
    pub lon: Option<String>,
}

/// Query parameters of `GET /api/regions`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RowsParams {
    pub rows: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hospital_list_uses_camel_case() {
        let list = ApiHospitalList {
            fetched_at: DateTime::from_timestamp(0, 0).unwrap(),
            hospitals: Vec::new(),
            recommended: None,
            warning: None,
        };
        let json = serde_json::to_value(&list).unwrap();
        assert!(json.get("fetchedAt").is_some());
        assert!(json["recommended"].is_null());
    }

    #[test]
    fn params_keep_coordinates_as_text() {
        let params: HospitalQueryParams =
            serde_json::from_str(r#"{"rows": 50, "lat": "37.5", "lon": "abc"}"#).unwrap();
        assert_eq!(params.rows, Some(50));
        assert_eq!(params.lon.as_deref(), Some("abc"));
        assert!(params.region.is_none());
    }
}
