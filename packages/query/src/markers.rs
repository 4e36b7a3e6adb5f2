//! Map marker descriptors, map center, and legend entries.

use std::fmt::Write as _;

use er_congestion_hospital_models::{
    CongestionLabel, Coordinate, HospitalRow, MarkerColor, MarkerDescriptor,
};
use serde::Serialize;

/// Seoul City Hall, used when there is nothing else to center on.
pub const DEFAULT_CENTER: Coordinate = Coordinate {
    latitude: 37.5665,
    longitude: 126.978,
};

/// Builds the marker for one hospital.
#[must_use]
pub fn marker(row: &HospitalRow) -> MarkerDescriptor {
    MarkerDescriptor {
        latitude: row.latitude,
        longitude: row.longitude,
        color_category: row.congestion_label,
        color: row.congestion_label.marker_color(),
        label_text: row.name.clone(),
        summary: summary(row),
    }
}

/// Builds markers for every row, in order.
#[must_use]
pub fn markers<'a>(rows: impl IntoIterator<Item = &'a HospitalRow>) -> Vec<MarkerDescriptor> {
    rows.into_iter().map(marker).collect()
}

/// Reference point if given, else the first row, else [`DEFAULT_CENTER`].
#[must_use]
pub fn map_center(reference: Option<Coordinate>, first: Option<&HospitalRow>) -> Coordinate {
    reference
        .or_else(|| first.map(HospitalRow::coordinate))
        .unwrap_or(DEFAULT_CENTER)
}

fn or_na(value: Option<&str>) -> &str {
    value.unwrap_or("N/A")
}

#[allow(clippy::cast_possible_truncation)]
fn count(value: Option<f64>) -> String {
    value.map_or_else(|| "N/A".to_string(), |v| (v.trunc() as i64).to_string())
}

/// Plain-text popup body.
fn summary(row: &HospitalRow) -> String {
    let mut text = String::new();
    let index = row
        .congestion_index
        .map_or_else(|| "N/A".to_string(), |i| format!("{i:.2}"));

    writeln!(text, "Address: {}", or_na(row.address.as_deref())).ok();
    writeln!(text, "Phone: {}", or_na(row.phone.as_deref())).ok();
    writeln!(text, "Available beds: {}", count(row.available_beds)).ok();
    writeln!(text, "Patients: {}", count(row.occupied_patients)).ok();
    writeln!(text, "Congestion index: {index} ({})", row.congestion_label).ok();
    write!(text, "Updated: {}", or_na(row.updated_at.as_deref())).ok();
    text
}

/// One legend row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LegendEntry {
    pub label: CongestionLabel,
    pub color: MarkerColor,
    pub description: &'static str,
}

/// Legend covering every label.
#[must_use]
pub fn legend() -> Vec<LegendEntry> {
    CongestionLabel::all()
        .iter()
        .map(|&label| LegendEntry {
            label,
            color: label.marker_color(),
            description: label.description(),
        })
        .collect()
}
