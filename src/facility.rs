//! Water facility payload and CSV row transform.

use std::collections::HashMap;

use serde::Serialize;

use regpush_upload::{RecordTransform, TransformError};

/// One CSV row, header name to cell text. Blank cells count as absent.
pub type CsvRow = HashMap<String, String>;

/// Submission payload for one water facility.
///
/// Optional fields are omitted from the serialized payload entirely rather
/// than sent as null; the registry schema treats absent and null
/// differently.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FacilityRecord {
    pub geo_code: String,
    pub water_point_type: String,
    pub location: Location,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub water_point_type_other: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extraction_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extraction_type_other: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pump_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pump_type_other: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_taps: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_depth_info: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub depth_metres: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub installer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub installer_other: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub funder: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
}

/// Administrative location of a facility.
#[derive(Debug, Clone, Serialize)]
pub struct Location {
    pub county: String,
    pub district: String,
    pub community: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
}

/// Geographic coordinates; any subset of fields may be present.
#[derive(Debug, Clone, Serialize)]
pub struct Coordinates {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lon: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elevation: Option<f64>,
}

impl Coordinates {
    fn is_empty(&self) -> bool {
        self.lat.is_none() && self.lon.is_none() && self.elevation.is_none()
    }
}

/// Maps one CSV row into a [`FacilityRecord`]. The item key is the row's
/// `geo_code`.
#[derive(Debug, Default, Clone)]
pub struct FacilityTransform;

fn required<'a>(row: &'a CsvRow, name: &str) -> Result<&'a str, TransformError> {
    match row.get(name).map(|v| v.trim()) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(TransformError::missing_field(name)),
    }
}

fn optional<'a>(row: &'a CsvRow, name: &str) -> Option<&'a str> {
    row.get(name).map(|v| v.trim()).filter(|v| !v.is_empty())
}

fn optional_f64(row: &CsvRow, name: &str) -> Result<Option<f64>, TransformError> {
    match optional(row, name) {
        Some(value) => value
            .parse::<f64>()
            .map(Some)
            .map_err(|_| TransformError::invalid_field(name, value)),
        None => Ok(None),
    }
}

impl RecordTransform for FacilityTransform {
    type Row = CsvRow;
    type Payload = FacilityRecord;

    fn item_key(&self, row: &Self::Row) -> String {
        row.get("geo_code").cloned().unwrap_or_default()
    }

    fn transform(&self, row: &Self::Row) -> Result<Self::Payload, TransformError> {
        let coordinates = Coordinates {
            lat: optional_f64(row, "lat")?,
            lon: optional_f64(row, "lon")?,
            elevation: optional_f64(row, "elevation")?,
        };

        Ok(FacilityRecord {
            geo_code: required(row, "geo_code")?.to_string(),
            water_point_type: required(row, "water_point_type")?.to_string(),
            location: Location {
                county: required(row, "county")?.to_string(),
                district: required(row, "district")?.to_string(),
                community: required(row, "community")?.to_string(),
                coordinates: (!coordinates.is_empty()).then_some(coordinates),
            },
            water_point_type_other: optional(row, "water_point_type_other").map(str::to_string),
            extraction_type: optional(row, "extraction_type").map(str::to_string),
            extraction_type_other: optional(row, "extraction_type_other").map(str::to_string),
            pump_type: optional(row, "pump_type").map(str::to_string),
            pump_type_other: optional(row, "pump_type_other").map(str::to_string),
            num_taps: optional_f64(row, "num_taps")?,
            has_depth_info: optional(row, "has_depth_info").map(|v| v.eq_ignore_ascii_case("yes")),
            depth_metres: optional_f64(row, "depth_metres")?,
            installer: optional(row, "installer").map(str::to_string),
            installer_other: optional(row, "installer_other").map(str::to_string),
            owner: optional(row, "owner").map(str::to_string),
            funder: optional(row, "funder").map(str::to_string),
            photo_url: optional(row, "photo_url").map(str::to_string),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_row() -> CsvRow {
        [
            ("geo_code", "G-001"),
            ("water_point_type", "Protected spring"),
            ("county", "Nimba"),
            ("district", "Buu-Yao"),
            ("community", "Gbedin"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
    }

    #[test]
    fn test_minimal_row_serializes_without_optional_fields() {
        let record = FacilityTransform.transform(&minimal_row()).unwrap();
        let value = serde_json::to_value(&record).unwrap();

        assert_eq!(value["geoCode"], "G-001");
        assert_eq!(value["waterPointType"], "Protected spring");
        assert_eq!(value["location"]["county"], "Nimba");
        let object = value.as_object().unwrap();
        assert!(!object.contains_key("numTaps"));
        assert!(!object.contains_key("hasDepthInfo"));
        // Empty coordinates are dropped, not sent as {}.
        assert!(!value["location"].as_object().unwrap().contains_key("coordinates"));
    }

    #[test]
    fn test_full_row() {
        let mut row = minimal_row();
        row.insert("lat".into(), "6.45".into());
        row.insert("lon".into(), "-9.32".into());
        row.insert("num_taps".into(), "4".into());
        row.insert("has_depth_info".into(), "Yes".into());
        row.insert("depth_metres".into(), "12.5".into());
        row.insert("installer".into(), "UNICEF".into());

        let record = FacilityTransform.transform(&row).unwrap();
        let value = serde_json::to_value(&record).unwrap();

        assert_eq!(value["location"]["coordinates"]["lat"], 6.45);
        assert!(!value["location"]["coordinates"]
            .as_object()
            .unwrap()
            .contains_key("elevation"));
        assert_eq!(value["numTaps"], 4.0);
        assert_eq!(value["hasDepthInfo"], true);
        assert_eq!(value["depthMetres"], 12.5);
        assert_eq!(value["installer"], "UNICEF");
    }

    #[test]
    fn test_missing_required_field() {
        let mut row = minimal_row();
        row.remove("water_point_type");

        let err = FacilityTransform.transform(&row).unwrap_err();
        assert!(err.to_string().contains("water_point_type"));
    }

    #[test]
    fn test_blank_required_field_counts_as_missing() {
        let mut row = minimal_row();
        row.insert("county".into(), "   ".into());

        assert!(FacilityTransform.transform(&row).is_err());
    }

    #[test]
    fn test_unparsable_number() {
        let mut row = minimal_row();
        row.insert("lat".into(), "north".into());

        let err = FacilityTransform.transform(&row).unwrap_err();
        assert!(err.to_string().contains("lat"));
    }

    #[test]
    fn test_has_depth_info_parsing() {
        let mut row = minimal_row();
        row.insert("has_depth_info".into(), "no".into());
        let record = FacilityTransform.transform(&row).unwrap();
        assert_eq!(record.has_depth_info, Some(false));

        row.insert("has_depth_info".into(), "YES".into());
        let record = FacilityTransform.transform(&row).unwrap();
        assert_eq!(record.has_depth_info, Some(true));
    }

    #[test]
    fn test_item_key_is_geo_code() {
        assert_eq!(FacilityTransform.item_key(&minimal_row()), "G-001");
        assert_eq!(FacilityTransform.item_key(&CsvRow::new()), "");
    }
}
