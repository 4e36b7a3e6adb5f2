//! Raw item → [`NormalizedHospital`] coercion.
//!
//! Every item yields exactly one record, in input order. Missing or
//! malformed fields degrade to `None` (or an empty name); nothing here
//! drops a record or fails the batch.

use er_congestion_hospital_models::NormalizedHospital;

use crate::RawRecord;
use crate::parsing::{derive_region, get_count, get_latitude, get_longitude, get_string};

/// Field names used by the emergency-room real-time bed API.
pub mod fields {
    /// Hospital name.
    pub const NAME: &str = "dutyName";
    /// Postal address.
    pub const ADDRESS: &str = "dutyAddr";
    /// Emergency-room direct phone line.
    pub const PHONE: &str = "dutyTel3";
    /// Available emergency-room beds.
    pub const AVAILABLE_BEDS: &str = "hvec";
    /// Patients currently admitted to the emergency room.
    pub const OCCUPIED_PATIENTS: &str = "hvoc";
    pub const LATITUDE: &str = "wgs84Lat";
    pub const LONGITUDE: &str = "wgs84Lon";
    /// Timestamp of the last occupancy update.
    pub const UPDATED_AT: &str = "hvidate";
    pub const ER_OPEN_TIME: &str = "dutyTime1s";
    pub const ER_CLOSE_TIME: &str = "dutyTime1c";
}

/// The fixed field set every normalized record is built from.
pub const REQUIRED_FIELDS: [&str; 10] = [
    fields::NAME,
    fields::ADDRESS,
    fields::PHONE,
    fields::AVAILABLE_BEDS,
    fields::OCCUPIED_PATIENTS,
    fields::LATITUDE,
    fields::LONGITUDE,
    fields::UPDATED_AT,
    fields::ER_OPEN_TIME,
    fields::ER_CLOSE_TIME,
];

/// Normalizes a batch of raw items, preserving order.
#[must_use]
pub fn normalize(records: &[RawRecord]) -> Vec<NormalizedHospital> {
    records.iter().map(normalize_record).collect()
}

/// Normalizes a single raw item.
#[must_use]
pub fn normalize_record(record: &RawRecord) -> NormalizedHospital {
    let missing: Vec<&str> = REQUIRED_FIELDS
        .iter()
        .copied()
        .filter(|f| !record.contains_key(*f))
        .collect();
    if !missing.is_empty() {
        log::trace!(
            "Item {:?} is missing fields: {}",
            record.get(fields::NAME),
            missing.join(", ")
        );
    }

    let address = get_string(record, fields::ADDRESS);
    let region = derive_region(address.as_deref());

    NormalizedHospital {
        name: get_string(record, fields::NAME).unwrap_or_default(),
        address,
        phone: get_string(record, fields::PHONE),
        available_beds: get_count(record, fields::AVAILABLE_BEDS),
        occupied_patients: get_count(record, fields::OCCUPIED_PATIENTS),
        latitude: get_latitude(record, fields::LATITUDE),
        longitude: get_longitude(record, fields::LONGITUDE),
        updated_at: get_string(record, fields::UPDATED_AT),
        er_open_time: get_string(record, fields::ER_OPEN_TIME),
        er_close_time: get_string(record, fields::ER_CLOSE_TIME),
        region,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use super::*;

    fn records(value: Value) -> Vec<RawRecord> {
        value
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_object().cloned().unwrap())
            .collect()
    }

    #[test]
    fn maps_every_field() {
        let rows = normalize(&records(json!([{
            "dutyName": "서울대학교병원",
            "dutyAddr": "서울특별시 종로구 대학로 101",
            "dutyTel3": "02-2072-2475",
            "hvec": 12,
            "hvoc": "30",
            "wgs84Lat": 37.579_6,
            "wgs84Lon": "126.9990",
            "hvidate": "20240115143000",
            "dutyTime1s": "0000",
            "dutyTime1c": "2400"
        }])));

        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.name, "서울대학교병원");
        assert_eq!(row.region.as_deref(), Some("서울특별시"));
        assert_eq!(row.phone.as_deref(), Some("02-2072-2475"));
        assert_eq!(row.available_beds, Some(12.0));
        assert_eq!(row.occupied_patients, Some(30.0));
        assert_eq!(row.latitude, Some(37.579_6));
        assert_eq!(row.longitude, Some(126.999));
        assert_eq!(row.updated_at.as_deref(), Some("20240115143000"));
        assert_eq!(row.er_open_time.as_deref(), Some("0000"));
        assert_eq!(row.er_close_time.as_deref(), Some("2400"));
    }

    #[test]
    fn absent_fields_become_empty() {
        let rows = normalize(&records(json!([{}])));
        assert_eq!(rows, vec![NormalizedHospital::default()]);
    }

    #[test]
    fn unparseable_numbers_keep_the_row() {
        let rows = normalize(&records(json!([
            {"dutyName": "A", "hvec": "many", "wgs84Lat": "north"},
            {"dutyName": "B", "hvoc": "2"}
        ])));
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].available_beds, None);
        assert_eq!(rows[0].latitude, None);
        assert_eq!(rows[1].occupied_patients, Some(2.0));
    }

    #[test]
    fn preserves_input_order() {
        let rows = normalize(&records(json!([
            {"dutyName": "C"},
            {"dutyName": "A"},
            {"dutyName": "B"}
        ])));
        let names: Vec<&str> = rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["C", "A", "B"]);
    }

    #[test]
    fn blank_address_has_no_region() {
        let rows = normalize(&records(json!([{"dutyAddr": "  "}])));
        assert_eq!(rows[0].address, None);
        assert_eq!(rows[0].region, None);
    }
}
