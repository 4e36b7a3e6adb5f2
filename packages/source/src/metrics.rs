//! Congestion scoring.
//!
//! `index = round(occupied / (available_or_zero + 1), 2)`. The `+ 1`
//! smoothing is applied even when beds are reported, and keeps the
//! denominator at 1 or more. An unknown occupied count propagates to an
//! unknown index rather than zero.

use er_congestion_hospital_models::{CongestionLabel, HospitalRow, NormalizedHospital, round2};

/// Computes the congestion index from the two occupancy counts.
#[must_use]
pub fn congestion_index(occupied_patients: Option<f64>, available_beds: Option<f64>) -> Option<f64> {
    let occupied = occupied_patients?;
    let beds = available_beds.unwrap_or(0.0).max(0.0);
    Some(round2(occupied.max(0.0) / (beds + 1.0)))
}

/// A normalized record with its congestion metrics attached. Coordinates
/// may still be missing at this stage.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredHospital {
    pub hospital: NormalizedHospital,
    pub congestion_index: Option<f64>,
    pub congestion_label: CongestionLabel,
}

impl ScoredHospital {
    /// Converts into a [`HospitalRow`] if both coordinates are present.
    #[must_use]
    pub fn into_row(self) -> Option<HospitalRow> {
        let coordinate = self.hospital.coordinate()?;
        let h = self.hospital;
        Some(HospitalRow {
            name: h.name,
            address: h.address,
            phone: h.phone,
            available_beds: h.available_beds,
            occupied_patients: h.occupied_patients,
            latitude: coordinate.latitude,
            longitude: coordinate.longitude,
            updated_at: h.updated_at,
            er_open_time: h.er_open_time,
            er_close_time: h.er_close_time,
            region: h.region,
            congestion_index: self.congestion_index,
            congestion_label: self.congestion_label,
        })
    }
}

/// Attaches the congestion index and label to a record.
#[must_use]
pub fn compute_metrics(hospital: NormalizedHospital) -> ScoredHospital {
    let congestion_index = congestion_index(hospital.occupied_patients, hospital.available_beds);
    ScoredHospital {
        congestion_label: CongestionLabel::from_index(congestion_index),
        congestion_index,
        hospital,
    }
}

/// Scores every record and keeps only the located ones, in input order.
///
/// Returns the retained rows and the number dropped for missing
/// coordinates.
#[must_use]
pub fn score_and_locate(hospitals: Vec<NormalizedHospital>) -> (Vec<HospitalRow>, usize) {
    let mut rows = Vec::with_capacity(hospitals.len());
    let mut dropped = 0;

    for hospital in hospitals {
        let scored = compute_metrics(hospital);
        let name = scored.hospital.name.clone();
        let label = scored.congestion_label;
        if let Some(row) = scored.into_row() {
            rows.push(row);
        } else {
            dropped += 1;
            log::debug!("Dropping {name:?} ({label}): missing coordinates");
        }
    }

    (rows, dropped)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hospital(
        beds: Option<f64>,
        patients: Option<f64>,
        lat: Option<f64>,
        lon: Option<f64>,
    ) -> NormalizedHospital {
        NormalizedHospital {
            name: "H".to_string(),
            available_beds: beds,
            occupied_patients: patients,
            latitude: lat,
            longitude: lon,
            ..NormalizedHospital::default()
        }
    }

    #[test]
    fn index_uses_plus_one_smoothing() {
        assert_eq!(congestion_index(Some(1.0), Some(3.0)), Some(0.25));
        assert_eq!(congestion_index(Some(2.0), None), Some(2.0));
        assert_eq!(congestion_index(Some(5.0), Some(0.0)), Some(5.0));
        assert_eq!(congestion_index(Some(0.0), Some(10.0)), Some(0.0));
    }

    #[test]
    fn unknown_occupancy_propagates() {
        assert_eq!(congestion_index(None, Some(3.0)), None);
        let scored = compute_metrics(hospital(Some(3.0), None, Some(37.5), Some(127.0)));
        assert_eq!(scored.congestion_index, None);
        assert_eq!(scored.congestion_label, CongestionLabel::Unknown);
    }

    #[test]
    fn index_is_rounded_to_two_decimals() {
        assert_eq!(congestion_index(Some(1.0), Some(2.0)), Some(0.33));
        assert_eq!(congestion_index(Some(2.0), Some(2.0)), Some(0.67));
    }

    #[test]
    fn rounding_is_idempotent() {
        for x in [0.0, 0.125, 0.333_333, 0.675, 1.005, 2.5, 17.999, 123.456] {
            let once = round2(x);
            assert_eq!(round2(once), once, "{x}");
        }
    }

    #[test]
    fn index_is_never_negative() {
        for (patients, beds) in [(0.0, 0.0), (3.0, 0.0), (1.0, 100.0), (0.0, 5.0)] {
            let index = congestion_index(Some(patients), Some(beds)).unwrap();
            assert!(index >= 0.0);
        }
    }

    #[test]
    fn labels_match_index() {
        let low = compute_metrics(hospital(Some(3.0), Some(1.0), None, None));
        assert_eq!(low.congestion_label, CongestionLabel::Low);
        let medium = compute_metrics(hospital(Some(1.0), Some(1.0), None, None));
        assert_eq!(medium.congestion_label, CongestionLabel::Medium);
        let high = compute_metrics(hospital(None, Some(2.0), None, None));
        assert_eq!(high.congestion_label, CongestionLabel::High);
    }

    #[test]
    fn drops_rows_without_coordinates() {
        let (rows, dropped) = score_and_locate(vec![
            hospital(Some(3.0), Some(1.0), Some(37.5), Some(127.0)),
            hospital(Some(3.0), Some(1.0), None, Some(127.0)),
            hospital(Some(3.0), Some(1.0), Some(37.5), None),
            hospital(None, None, Some(35.1), Some(129.0)),
        ]);
        assert_eq!(dropped, 2);
        assert_eq!(rows.len(), 2);
        assert!((rows[0].latitude - 37.5).abs() < f64::EPSILON);
        assert_eq!(rows[1].congestion_label, CongestionLabel::Unknown);
    }
}
