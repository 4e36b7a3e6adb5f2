#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! User-facing filtering and ranking over a snapshot of [`HospitalRow`]s.
//!
//! [`apply`] filters rows by region, name and label and attaches a
//! geodesic distance when a reference point is given. [`rank`] orders the
//! result for the recommended and full-list views. [`view`] wires these
//! together starting from raw, unvalidated user input.

pub mod distance;
pub mod markers;
pub mod rank;
pub mod view;

use std::collections::BTreeSet;

use er_congestion_hospital_models::{CongestionLabel, Coordinate, HospitalRow, RankedHospital};

/// Region selector value meaning "no region filter".
pub const ALL_REGIONS: &str = "all";

/// Region filter of a [`UserQuery`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RegionFilter {
    /// Every region.
    #[default]
    All,
    /// Exact, case-sensitive match on the derived region.
    Only(String),
}

impl RegionFilter {
    /// Parses selector input; blank or `"all"` (any case) means
    /// [`RegionFilter::All`].
    #[must_use]
    pub fn parse(input: &str) -> Self {
        let trimmed = input.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case(ALL_REGIONS) {
            Self::All
        } else {
            Self::Only(trimmed.to_string())
        }
    }

    #[must_use]
    pub fn matches(&self, region: Option<&str>) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => region == Some(wanted.as_str()),
        }
    }
}

/// One interaction's filters. Nothing here outlives the request.
#[derive(Debug, Clone, PartialEq)]
pub struct UserQuery {
    pub region: RegionFilter,
    /// Case-insensitive substring of the hospital name. Empty matches all.
    pub name: String,
    /// Labels to keep.
    pub labels: BTreeSet<CongestionLabel>,
    /// Point distances are measured from.
    pub reference: Option<Coordinate>,
}

impl Default for UserQuery {
    fn default() -> Self {
        Self {
            region: RegionFilter::All,
            name: String::new(),
            labels: CongestionLabel::default_selection().iter().copied().collect(),
            reference: None,
        }
    }
}

impl UserQuery {
    /// Whether `row` passes the region, name and label filters.
    #[must_use]
    pub fn matches(&self, row: &HospitalRow) -> bool {
        self.region.matches(row.region.as_deref())
            && name_matches(&row.name, &self.name)
            && self.labels.contains(&row.congestion_label)
    }
}

fn name_matches(name: &str, needle: &str) -> bool {
    needle.is_empty() || name.to_lowercase().contains(&needle.to_lowercase())
}

/// Filters `rows` and attaches distances, preserving input order.
///
/// `distance_km` is `None` for every row when the query has no reference
/// point.
#[must_use]
pub fn apply(rows: &[HospitalRow], query: &UserQuery) -> Vec<RankedHospital> {
    let ranked: Vec<RankedHospital> = rows
        .iter()
        .filter(|row| query.matches(row))
        .map(|row| RankedHospital {
            distance_km: query
                .reference
                .map(|reference| distance::distance_km(reference, row.coordinate())),
            hospital: row.clone(),
        })
        .collect();

    log::debug!("{} of {} hospitals match {query:?}", ranked.len(), rows.len());
    ranked
}

/// Distinct non-null regions, sorted, for building a selector.
#[must_use]
pub fn distinct_regions(rows: &[HospitalRow]) -> Vec<String> {
    rows.iter()
        .filter_map(|row| row.region.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub fn row(name: &str, region: Option<&str>, index: Option<f64>) -> HospitalRow {
        HospitalRow {
            name: name.to_string(),
            address: region.map(|r| format!("{r} 어딘가 1")),
            phone: None,
            available_beds: None,
            occupied_patients: None,
            latitude: 37.5665,
            longitude: 126.978,
            updated_at: None,
            er_open_time: None,
            er_close_time: None,
            region: region.map(str::to_string),
            congestion_index: index,
            congestion_label: CongestionLabel::from_index(index),
        }
    }

    fn all_labels() -> BTreeSet<CongestionLabel> {
        CongestionLabel::all().iter().copied().collect()
    }

    fn names(ranked: &[RankedHospital]) -> Vec<&str> {
        ranked.iter().map(|r| r.hospital.name.as_str()).collect()
    }

    #[test]
    fn region_filter_is_exact() {
        let rows = vec![
            row("A", Some("Seoul"), Some(0.1)),
            row("B", Some("Busan"), Some(0.1)),
            row("C", Some("seoul"), Some(0.1)),
            row("D", None, Some(0.1)),
        ];
        let query = UserQuery {
            region: RegionFilter::Only("Seoul".to_string()),
            ..UserQuery::default()
        };
        let result = apply(&rows, &query);
        assert_eq!(names(&result), ["A"]);
        assert!(
            result
                .iter()
                .all(|r| r.hospital.region.as_deref() == Some("Seoul"))
        );
    }

    #[test]
    fn all_region_keeps_every_row() {
        let rows = vec![
            row("A", Some("Seoul"), Some(0.1)),
            row("B", Some("Busan"), Some(0.7)),
            row("C", None, Some(3.0)),
        ];
        let query = UserQuery {
            region: RegionFilter::parse("All"),
            ..UserQuery::default()
        };
        assert_eq!(apply(&rows, &query).len(), 3);
    }

    #[test]
    fn name_filter_is_case_insensitive_substring() {
        let rows = vec![
            row("Seoul National University Hospital", None, Some(0.1)),
            row("Asan Medical Center", None, Some(0.1)),
            row("", None, Some(0.1)),
        ];
        let query = UserQuery {
            name: "UNIVERSITY".to_string(),
            ..UserQuery::default()
        };
        assert_eq!(
            names(&apply(&rows, &query)),
            ["Seoul National University Hospital"]
        );

        let everything = UserQuery::default();
        assert_eq!(apply(&rows, &everything).len(), 3);
    }

    #[test]
    fn label_filter_uses_membership() {
        let rows = vec![
            row("low", None, Some(0.1)),
            row("medium", None, Some(0.7)),
            row("high", None, Some(2.0)),
            row("unknown", None, None),
        ];
        assert_eq!(
            names(&apply(&rows, &UserQuery::default())),
            ["low", "medium", "high"]
        );

        let query = UserQuery {
            labels: [CongestionLabel::Unknown, CongestionLabel::High]
                .into_iter()
                .collect(),
            ..UserQuery::default()
        };
        assert_eq!(names(&apply(&rows, &query)), ["high", "unknown"]);

        let none = UserQuery {
            labels: BTreeSet::new(),
            ..UserQuery::default()
        };
        assert!(apply(&rows, &none).is_empty());
    }

    #[test]
    fn distance_is_null_without_reference() {
        let rows = vec![row("A", None, Some(0.1))];
        let query = UserQuery {
            labels: all_labels(),
            ..UserQuery::default()
        };
        assert!(apply(&rows, &query).iter().all(|r| r.distance_km.is_none()));
    }

    #[test]
    fn same_point_is_zero_km() {
        let rows = vec![row("A", None, Some(0.1))];
        let query = UserQuery {
            reference: Coordinate::new(37.5665, 126.978),
            ..UserQuery::default()
        };
        assert_eq!(apply(&rows, &query)[0].distance_km, Some(0.0));
    }

    #[test]
    fn regions_are_distinct_and_sorted() {
        let rows = vec![
            row("A", Some("서울특별시"), None),
            row("B", Some("부산광역시"), None),
            row("C", Some("서울특별시"), None),
            row("D", None, None),
        ];
        assert_eq!(distinct_regions(&rows), ["부산광역시", "서울특별시"]);
    }
}
