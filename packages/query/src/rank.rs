//! Stable orderings for the recommended and full-list views.
//!
//! Missing keys sort after present ones. `sort_by` is stable, so rows that
//! tie on every key keep their incoming order.

use std::cmp::Ordering;

use er_congestion_hospital_models::RankedHospital;

/// Size of the recommended list.
pub const RECOMMENDED_COUNT: usize = 5;

/// Ascending, with `None` last.
fn cmp_nulls_last(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.total_cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Orders by `(congestion_index, distance_km)` and keeps the first `n`.
///
/// Lower congestion first; ties go to the closer hospital.
#[must_use]
pub fn recommended(mut rows: Vec<RankedHospital>, n: usize) -> Vec<RankedHospital> {
    rows.sort_by(|a, b| {
        cmp_nulls_last(a.hospital.congestion_index, b.hospital.congestion_index)
            .then_with(|| cmp_nulls_last(a.distance_km, b.distance_km))
    });
    rows.truncate(n);
    rows
}

/// Orders by `congestion_index` alone.
#[must_use]
pub fn full_list(mut rows: Vec<RankedHospital>) -> Vec<RankedHospital> {
    rows.sort_by(|a, b| cmp_nulls_last(a.hospital.congestion_index, b.hospital.congestion_index));
    rows
}
