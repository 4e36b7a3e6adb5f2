//! Plain-text tables for terminal output.

use std::fmt::Write as _;

use er_congestion_hospital_models::RankedHospital;
use er_congestion_query::markers::LegendEntry;

const NAME_WIDTH: usize = 28;

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() > width {
        let mut short: String = text.chars().take(width - 3).collect();
        short.push_str("...");
        short
    } else {
        text.to_string()
    }
}

fn number(value: Option<f64>, precision: usize) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.precision$}"))
}

/// Renders hospitals as a fixed-width table, one row per hospital.
#[must_use]
pub fn hospital_table(rows: &[RankedHospital]) -> String {
    let mut out = String::new();
    writeln!(
        out,
        "{:<30} {:<10} {:>5} {:>8} {:>6} {:<8} {:>9} PHONE",
        "NAME", "REGION", "BEDS", "PATIENTS", "INDEX", "LABEL", "DIST(km)"
    )
    .ok();
    writeln!(out, "{}", "-".repeat(100)).ok();

    for row in rows {
        let h = &row.hospital;
        writeln!(
            out,
            "{:<30} {:<10} {:>5} {:>8} {:>6} {:<8} {:>9} {}",
            truncate(&h.name, NAME_WIDTH),
            h.region.as_deref().unwrap_or("-"),
            number(h.available_beds, 0),
            number(h.occupied_patients, 0),
            number(h.congestion_index, 2),
            h.congestion_label.as_ref(),
            number(row.distance_km, 2),
            h.phone.as_deref().unwrap_or("-"),
        )
        .ok();
    }

    write!(out, "\n{} hospital(s)", rows.len()).ok();
    out
}

/// Renders the congestion legend.
#[must_use]
pub fn legend_table(entries: &[LegendEntry]) -> String {
    let mut out = String::new();
    for entry in entries {
        writeln!(
            out,
            "{:<8} {:<7} {}",
            entry.label.as_ref(),
            entry.color.as_ref(),
            entry.description
        )
        .ok();
    }
    out
}
