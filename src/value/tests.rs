//! Tests for date conversion

use super::*;
use chrono::{TimeZone, Utc};
use pretty_assertions::assert_eq;
use serde_json::json;
use test_case::test_case;

#[test_case("2024-01-31T08:15:00Z", true ; "utc with seconds")]
#[test_case("2024-01-31T08:15:00.123Z", true ; "utc with millis")]
#[test_case("2024-01-31T08:15:00+02:00", true ; "offset")]
#[test_case("2024-01-31T08:15:00", true ; "no zone")]
#[test_case("2024-01-31T08:15", true ; "no seconds")]
#[test_case("2024-01-31", false ; "date only")]
#[test_case("31/01/2024", false ; "other format")]
#[test_case("Project 2024-01-31T08:15:00Z", false ; "embedded")]
#[test_case("", false ; "empty")]
fn test_is_iso_datetime(input: &str, expected: bool) {
    assert_eq!(is_iso_datetime(input), expected);
}

#[test]
fn test_parse_datetime_normalizes_to_utc() {
    let dt = parse_datetime("2024-01-31T10:15:00+02:00").unwrap();
    assert_eq!(dt, Utc.with_ymd_and_hms(2024, 1, 31, 8, 15, 0).unwrap());

    let naive = parse_datetime("2024-01-31T08:15:00").unwrap();
    assert_eq!(naive, Utc.with_ymd_and_hms(2024, 1, 31, 8, 15, 0).unwrap());

    assert_eq!(parse_datetime("2024-13-45T99:00:00Z"), None);
}

#[test]
fn test_format_datetime() {
    let dt = Utc.with_ymd_and_hms(2024, 1, 31, 8, 15, 0).unwrap();
    assert_eq!(format_datetime(&dt), "2024-01-31T08:15:00.000Z");
}

#[test_case("2024-01-31T08:15:00.123Z", "2024-01-31T08:15:00.123Z" ; "millis")]
#[test_case("2024-01-31T08:15:00.123456Z", "2024-01-31T08:15:00.123456Z" ; "micros kept")]
#[test_case("2024-01-31T08:15:00.123456789Z", "2024-01-31T08:15:00.123456789Z" ; "nanos kept")]
#[test_case("2024-01-31T08:15:00.5Z", "2024-01-31T08:15:00.500Z" ; "short fraction padded")]
fn test_format_keeps_precision(input: &str, expected: &str) {
    let dt = parse_datetime(input).unwrap();
    assert_eq!(format_datetime(&dt), expected);
}

#[test]
fn test_conversion_at_any_depth() {
    let response = json!({
        "id": "bq1",
        "created": "2024-01-31T08:15:00Z",
        "dateFormat": "MM-DD-YYYY",
        "tables": [
            {"name": "Projects", "updated": "2024-02-01T00:00:00.000Z"}
        ],
        "nested": {"deeper": {"at": "2024-03-01T12:00:00Z"}}
    });

    let value = QbValue::from_json(response, true);

    assert_eq!(
        value["created"].as_datetime(),
        Some(&Utc.with_ymd_and_hms(2024, 1, 31, 8, 15, 0).unwrap())
    );
    assert!(value["tables"][0]["updated"].as_datetime().is_some());
    assert!(value["nested"]["deeper"]["at"].as_datetime().is_some());
    assert_eq!(value["dateFormat"].as_str(), Some("MM-DD-YYYY"));
    assert_eq!(value["id"].as_str(), Some("bq1"));
}

#[test]
fn test_conversion_disabled_leaves_strings() {
    let response = json!({
        "created": "2024-01-31T08:15:00Z",
        "tables": [{"updated": "2024-02-01T00:00:00.000Z"}]
    });

    let value = QbValue::from_json(response.clone(), false);

    assert_eq!(value["created"].as_str(), Some("2024-01-31T08:15:00Z"));
    assert_eq!(
        value["tables"][0]["updated"].as_str(),
        Some("2024-02-01T00:00:00.000Z")
    );
    assert_eq!(value.to_json(), response);
}

#[test]
fn test_structure_is_preserved() {
    let response = json!({
        "a": [1, "2024-01-31T08:15:00.000Z", null, true],
        "b": {"c": 2.5}
    });

    let converted = QbValue::from_json(response.clone(), true);
    assert_eq!(converted.to_json(), response);
}

#[test]
fn test_round_trip_is_idempotent() {
    let original = json!({"at": "2024-01-31T10:15:00.123456+02:00"});

    let first = QbValue::from_json(original, true);
    let lowered = first.to_json();
    let second = QbValue::from_json(lowered.clone(), true);

    assert_eq!(second.to_json(), lowered);
    assert_eq!(lowered["at"], "2024-01-31T08:15:00.123456Z");
}

#[test]
fn test_request_dates_serialize_as_iso() {
    let mut params = std::collections::BTreeMap::new();
    params.insert(
        "start".to_string(),
        QbValue::from(Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap()),
    );
    params.insert("accountId".to_string(), QbValue::from("123"));
    let params = QbValue::Object(params);

    assert_eq!(
        params.to_json(),
        json!({"start": "2024-05-01T00:00:00.000Z", "accountId": "123"})
    );
    assert_eq!(
        serde_json::to_string(&params).unwrap(),
        r#"{"accountId":"123","start":"2024-05-01T00:00:00.000Z"}"#
    );
}

#[test]
fn test_index_missing_is_null() {
    let value = QbValue::from(json!({"a": [1]}));
    assert!(value["missing"].is_null());
    assert!(value["a"][5].is_null());
    assert_eq!(value["a"][0].as_i64(), Some(1));
    assert!(QbValue::Null["x"].is_null());
}

#[test]
fn test_deserialize_does_not_convert() {
    let value: QbValue = serde_json::from_str(r#"{"at":"2024-01-31T08:15:00Z"}"#).unwrap();
    assert_eq!(value["at"].as_str(), Some("2024-01-31T08:15:00Z"));
}
