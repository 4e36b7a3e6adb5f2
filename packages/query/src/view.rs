//! Query boundary: raw user input in, a fully ordered view out.
//!
//! Bad reference-coordinate input never aborts a view. It disables the
//! distance features for that view and surfaces a warning instead.

use std::collections::BTreeSet;

use er_congestion_hospital_models::{
    CongestionLabel, Coordinate, HospitalRow, MarkerDescriptor, RankedHospital,
};
use serde::Serialize;

use crate::markers::{map_center, markers};
use crate::rank::{RECOMMENDED_COUNT, full_list, recommended};
use crate::{RegionFilter, UserQuery, apply};

/// Errors in user-supplied query input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// The reference latitude/longitude could not be used.
    #[error(
        "Invalid reference location {latitude:?} / {longitude:?}; expected e.g. 37.5665 / 126.9780"
    )]
    InvalidCoordinateInput {
        latitude: String,
        longitude: String,
    },
}

/// Parses a reference coordinate from raw text.
///
/// Returns `Ok(None)` unless both values are non-blank.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidCoordinateInput`] if either value is
/// not a number or lies outside the WGS84 range.
pub fn parse_reference(
    latitude: Option<&str>,
    longitude: Option<&str>,
) -> Result<Option<Coordinate>, ValidationError> {
    let lat = latitude.map(str::trim).filter(|s| !s.is_empty());
    let lon = longitude.map(str::trim).filter(|s| !s.is_empty());
    let (Some(lat), Some(lon)) = (lat, lon) else {
        return Ok(None);
    };

    let invalid = || ValidationError::InvalidCoordinateInput {
        latitude: lat.to_string(),
        longitude: lon.to_string(),
    };
    let lat_value: f64 = lat.parse().map_err(|_| invalid())?;
    let lon_value: f64 = lon.parse().map_err(|_| invalid())?;
    Coordinate::new(lat_value, lon_value)
        .map(Some)
        .ok_or_else(invalid)
}

/// Parses a comma-separated label list. Unknown names are skipped.
///
/// Absent or blank input yields the default selection. A non-blank list
/// in which nothing parses yields an empty set, so a typo selects nothing
/// rather than everything.
#[must_use]
pub fn parse_labels(input: Option<&str>) -> BTreeSet<CongestionLabel> {
    let Some(input) = input.filter(|s| !s.trim().is_empty()) else {
        return CongestionLabel::default_selection().iter().copied().collect();
    };

    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter_map(|s| {
            let label = s.parse().ok();
            if label.is_none() {
                log::warn!("Ignoring unknown congestion label {s:?}");
            }
            label
        })
        .collect()
}

/// Unvalidated input from a UI, CLI or HTTP request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryInput {
    pub region: Option<String>,
    pub name: Option<String>,
    /// Comma-separated label names.
    pub labels: Option<String>,
    pub latitude: Option<String>,
    pub longitude: Option<String>,
}

impl QueryInput {
    /// Validates the input. A bad reference coordinate is dropped and
    /// returned as the second element instead of failing.
    #[must_use]
    pub fn into_query(self) -> (UserQuery, Option<ValidationError>) {
        let (reference, error) =
            match parse_reference(self.latitude.as_deref(), self.longitude.as_deref()) {
                Ok(reference) => (reference, None),
                Err(e) => {
                    log::warn!("{e}");
                    (None, Some(e))
                }
            };

        let query = UserQuery {
            region: RegionFilter::parse(self.region.as_deref().unwrap_or_default()),
            name: self.name.unwrap_or_default().trim().to_string(),
            labels: parse_labels(self.labels.as_deref()),
            reference,
        };
        (query, error)
    }
}

/// Everything a presentation layer renders for one interaction.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct View {
    /// Filtered rows ordered by congestion index.
    pub hospitals: Vec<RankedHospital>,
    /// Top picks by congestion then distance. `None` without a valid
    /// reference point.
    pub recommended: Option<Vec<RankedHospital>>,
    pub markers: Vec<MarkerDescriptor>,
    pub center: Coordinate,
    /// User-facing warning, e.g. for an unusable reference location.
    pub warning: Option<String>,
}

impl View {
    /// Builds a view from validated query parts.
    #[must_use]
    pub fn build(rows: &[HospitalRow], query: &UserQuery) -> Self {
        let filtered = apply(rows, query);
        let recommended = query
            .reference
            .map(|_| recommended(filtered.clone(), RECOMMENDED_COUNT));
        let center = map_center(query.reference, filtered.first().map(|r| &r.hospital));
        let markers = markers(filtered.iter().map(|r| &r.hospital));

        Self {
            hospitals: full_list(filtered),
            recommended,
            markers,
            center,
            warning: None,
        }
    }

    /// Validates raw input and builds a view; invalid reference input
    /// becomes [`View::warning`].
    #[must_use]
    pub fn from_input(rows: &[HospitalRow], input: QueryInput) -> Self {
        let (query, error) = input.into_query();
        let mut view = Self::build(rows, &query);
        view.warning = error.map(|e| e.to_string());
        view
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::row;

    #[test]
    fn parses_valid_reference() {
        let c = parse_reference(Some(" 37.5665 "), Some("126.9780"))
            .unwrap()
            .unwrap();
        assert!((c.latitude - 37.5665).abs() < f64::EPSILON);
    }

    #[test]
    fn blank_or_partial_reference_is_none() {
        assert_eq!(parse_reference(None, None), Ok(None));
        assert_eq!(parse_reference(Some(""), Some("126.9")), Ok(None));
        assert_eq!(parse_reference(Some("37.5"), Some("  ")), Ok(None));
    }

    #[test]
    fn malformed_reference_is_rejected() {
        assert!(matches!(
            parse_reference(Some("north"), Some("126.9")),
            Err(ValidationError::InvalidCoordinateInput { .. })
        ));
        assert!(matches!(
            parse_reference(Some("95"), Some("126.9")),
            Err(ValidationError::InvalidCoordinateInput { .. })
        ));
    }

    #[test]
    fn labels_default_only_when_absent_or_blank() {
        let defaults: BTreeSet<CongestionLabel> =
            CongestionLabel::default_selection().iter().copied().collect();
        assert_eq!(parse_labels(None), defaults);
        assert_eq!(parse_labels(Some("  ")), defaults);
        assert!(parse_labels(Some("busy, ")).is_empty());
        assert!(parse_labels(Some(",")).is_empty());
        assert_eq!(
            parse_labels(Some("unknown,high,bogus")),
            [CongestionLabel::High, CongestionLabel::Unknown]
                .into_iter()
                .collect()
        );
    }

    #[test]
    fn invalid_reference_degrades_to_warning() {
        let rows = vec![row("A", Some("Seoul"), Some(0.2)), row("B", None, Some(0.1))];
        let view = View::from_input(
            &rows,
            QueryInput {
                latitude: Some("abc".to_string()),
                longitude: Some("126.9".to_string()),
                ..QueryInput::default()
            },
        );
        assert!(view.warning.is_some());
        assert!(view.recommended.is_none());
        assert_eq!(view.hospitals.len(), 2);
        assert!(view.hospitals.iter().all(|r| r.distance_km.is_none()));
        assert_eq!(view.hospitals[0].hospital.name, "B");
    }

    #[test]
    fn reference_enables_recommendations() {
        let rows = vec![
            row("busy", None, Some(1.5)),
            row("calm", None, Some(0.1)),
            row("unknown", None, None),
        ];
        let view = View::from_input(
            &rows,
            QueryInput {
                labels: Some("LOW,MEDIUM,HIGH,UNKNOWN".to_string()),
                latitude: Some("37.5665".to_string()),
                longitude: Some("126.9780".to_string()),
                ..QueryInput::default()
            },
        );
        assert!(view.warning.is_none());
        let recommended = view.recommended.unwrap();
        assert_eq!(recommended[0].hospital.name, "calm");
        assert_eq!(recommended[0].distance_km, Some(0.0));
        assert_eq!(recommended.last().unwrap().hospital.name, "unknown");
        assert_eq!(view.markers.len(), 3);
        assert!((view.center.latitude - 37.5665).abs() < f64::EPSILON);
    }

    #[test]
    fn unknown_labels_select_nothing() {
        let rows = vec![row("A", None, Some(0.2)), row("B", None, Some(0.7))];
        let view = View::from_input(
            &rows,
            QueryInput {
                labels: Some("bogus".to_string()),
                ..QueryInput::default()
            },
        );
        assert!(view.hospitals.is_empty());
        assert!(view.markers.is_empty());
    }

    #[test]
    fn region_and_name_filters_come_from_input() {
        let rows = vec![
            row("Alpha Hospital", Some("Seoul"), Some(0.2)),
            row("Beta Hospital", Some("Seoul"), Some(0.2)),
            row("Alpha Clinic", Some("Busan"), Some(0.2)),
        ];
        let view = View::from_input(
            &rows,
            QueryInput {
                region: Some("Seoul".to_string()),
                name: Some("alpha".to_string()),
                ..QueryInput::default()
            },
        );
        assert_eq!(view.hospitals.len(), 1);
        assert_eq!(view.hospitals[0].hospital.name, "Alpha Hospital");
    }
}
