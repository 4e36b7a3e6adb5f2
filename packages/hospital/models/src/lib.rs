#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Hospital emergency-room records and the congestion taxonomy.
//!
//! Every refresh cycle turns raw API items into [`NormalizedHospital`]
//! values, scores them, and keeps only the located ones as
//! [`HospitalRow`]s. Rows are never mutated after creation; the next
//! refresh replaces the whole set.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Congestion index below which a hospital is considered [`CongestionLabel::Low`].
pub const LOW_UPPER_BOUND: f64 = 0.5;

/// Congestion index at or above which a hospital is [`CongestionLabel::High`].
pub const HIGH_LOWER_BOUND: f64 = 1.0;

/// Discretized congestion bucket derived from the congestion index.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum CongestionLabel {
    /// Index below 0.5
    Low,
    /// Index in `[0.5, 1.0)`
    Medium,
    /// Index of 1.0 or more
    High,
    /// No index could be computed
    Unknown,
}

impl CongestionLabel {
    /// Buckets a congestion index. `None` maps to [`Self::Unknown`].
    ///
    /// Lower bounds are inclusive and upper bounds exclusive; `High` is
    /// unbounded above.
    #[must_use]
    pub fn from_index(index: Option<f64>) -> Self {
        match index {
            None => Self::Unknown,
            Some(x) if x < LOW_UPPER_BOUND => Self::Low,
            Some(x) if x < HIGH_LOWER_BOUND => Self::Medium,
            Some(_) => Self::High,
        }
    }

    /// Marker color used when rendering this label on a map.
    #[must_use]
    pub const fn marker_color(self) -> MarkerColor {
        match self {
            Self::Low => MarkerColor::Green,
            Self::Medium => MarkerColor::Orange,
            Self::High => MarkerColor::Red,
            Self::Unknown => MarkerColor::Gray,
        }
    }

    /// Human-readable threshold description for legends.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Low => "congestion index < 0.5",
            Self::Medium => "0.5 <= congestion index < 1.0",
            Self::High => "congestion index >= 1.0",
            Self::Unknown => "congestion index unavailable",
        }
    }

    /// Labels selected when the user has not chosen any.
    #[must_use]
    pub const fn default_selection() -> &'static [Self] {
        &[Self::Low, Self::Medium, Self::High]
    }

    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Low, Self::Medium, Self::High, Self::Unknown]
    }
}

/// Map marker color category.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum MarkerColor {
    Green,
    Orange,
    Red,
    Gray,
}

/// Rounds to 2 decimals, ties to even.
#[must_use]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

/// A WGS84 point in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    /// Creates a coordinate, returning `None` if either component is
    /// non-finite or outside the WGS84 range.
    #[must_use]
    pub fn new(latitude: f64, longitude: f64) -> Option<Self> {
        if is_valid_latitude(latitude) && is_valid_longitude(longitude) {
            Some(Self {
                latitude,
                longitude,
            })
        } else {
            None
        }
    }
}

/// Whether `value` is a finite latitude in `[-90, 90]`.
#[must_use]
pub fn is_valid_latitude(value: f64) -> bool {
    value.is_finite() && (-90.0..=90.0).contains(&value)
}

/// Whether `value` is a finite longitude in `[-180, 180]`.
#[must_use]
pub fn is_valid_longitude(value: f64) -> bool {
    value.is_finite() && (-180.0..=180.0).contains(&value)
}

/// A hospital record after field coercion, before metrics are computed.
///
/// Any field the source omitted or sent in an unusable form is `None`;
/// `name` is empty instead.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedHospital {
    pub name: String,
    pub address: Option<String>,
    /// Emergency-room direct phone line.
    pub phone: Option<String>,
    pub available_beds: Option<f64>,
    pub occupied_patients: Option<f64>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// Source-formatted timestamp of the last occupancy update.
    pub updated_at: Option<String>,
    pub er_open_time: Option<String>,
    pub er_close_time: Option<String>,
    /// First whitespace-delimited token of `address`.
    pub region: Option<String>,
}

impl NormalizedHospital {
    /// The record's location, if both coordinates are present.
    #[must_use]
    pub fn coordinate(&self) -> Option<Coordinate> {
        Coordinate::new(self.latitude?, self.longitude?)
    }
}

/// A located, scored hospital as handed to every downstream consumer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HospitalRow {
    pub name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub available_beds: Option<f64>,
    pub occupied_patients: Option<f64>,
    pub latitude: f64,
    pub longitude: f64,
    pub updated_at: Option<String>,
    pub er_open_time: Option<String>,
    pub er_close_time: Option<String>,
    pub region: Option<String>,
    /// `occupied / (available_or_zero + 1)` rounded to 2 decimals.
    /// `None` when the occupied count is unknown.
    pub congestion_index: Option<f64>,
    pub congestion_label: CongestionLabel,
}

impl HospitalRow {
    #[must_use]
    pub const fn coordinate(&self) -> Coordinate {
        Coordinate {
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }
}

/// A [`HospitalRow`] annotated with its distance from a reference point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedHospital {
    #[serde(flatten)]
    pub hospital: HospitalRow,
    /// Geodesic distance in kilometres, rounded to 2 decimals. `None`
    /// when no reference coordinate was supplied.
    pub distance_km: Option<f64>,
}

/// Everything a map layer needs to draw one hospital.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkerDescriptor {
    pub latitude: f64,
    pub longitude: f64,
    pub color_category: CongestionLabel,
    pub color: MarkerColor,
    pub label_text: String,
    /// Plain-text popup body. Not escaped; renderers must escape it.
    pub summary: String,
}
