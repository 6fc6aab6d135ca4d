//! Measurements Tests
//!
//! Additive merge semantics of the measurement record.

use benchwire::Measurements;
use serde_json::json;

// =============================================================================
// Merge Semantics Tests
// =============================================================================

#[test]
fn test_numbers_add() {
    let mut measurements = Measurements::new();
    measurements.add("inference_count", json!(3));
    measurements.add("inference_count", json!(4));

    assert_eq!(measurements.get("inference_count"), Some(&json!(7)));
}

#[test]
fn test_floats_add() {
    let mut measurements = Measurements::new();
    measurements.add("total_time_ms", json!(1.5));
    measurements.add("total_time_ms", json!(2.25));

    assert_eq!(measurements.get("total_time_ms"), Some(&json!(3.75)));
}

#[test]
fn test_arrays_extend() {
    let mut measurements = Measurements::new();
    measurements.add("latencies", json!([1.0, 2.0]));
    measurements.add("latencies", json!([3.0]));

    assert_eq!(measurements.get("latencies"), Some(&json!([1.0, 2.0, 3.0])));
}

#[test]
fn test_nested_objects_merge() {
    let mut measurements = Measurements::new();
    measurements.add("session", json!({"runs": 1, "host": "a"}));
    measurements.add("session", json!({"runs": 2, "port": 5}));

    assert_eq!(
        measurements.get("session"),
        Some(&json!({"runs": 3, "host": "a", "port": 5}))
    );
}

#[test]
fn test_kind_mismatch_replaces() {
    let mut measurements = Measurements::new();
    measurements.add("metric", json!(5));
    measurements.add("metric", json!("five"));

    assert_eq!(measurements.get("metric"), Some(&json!("five")));
}

#[test]
fn test_add_sample_builds_series() {
    let mut measurements = Measurements::new();
    measurements.add_sample("process_time_ms", 12.5);
    measurements.add_sample("process_time_ms", 13.0);

    assert_eq!(
        measurements.get("process_time_ms"),
        Some(&json!([12.5, 13.0]))
    );
}

#[test]
fn test_add_assign_merges_records() {
    let mut first = Measurements::new();
    first.add("count", json!(1));

    let mut second = Measurements::new();
    second.add("count", json!(2));
    second.add("name", json!("run"));

    first += second;

    assert_eq!(first.get("count"), Some(&json!(3)));
    assert_eq!(first.get("name"), Some(&json!("run")));
}

// =============================================================================
// JSON Interchange Tests
// =============================================================================

#[test]
fn test_merge_json_stats_body() {
    let mut measurements = Measurements::new();
    assert!(measurements.is_empty());

    measurements
        .merge_json(br#"{"latency_ms": 12.5}"#)
        .unwrap();

    assert_eq!(measurements.len(), 1);
    assert_eq!(measurements.get("latency_ms"), Some(&json!(12.5)));
}

#[test]
fn test_merge_json_rejects_malformed_body() {
    let mut measurements = Measurements::new();
    assert!(measurements.merge_json(b"not json").is_err());
}

#[test]
fn test_json_round_trip() {
    let mut measurements = Measurements::new();
    measurements.add("latencies", json!([1.0, 2.0]));
    measurements.add("model", json!("resnet"));

    let encoded = measurements.to_json_vec().unwrap();

    let mut decoded = Measurements::new();
    decoded.merge_json(&encoded).unwrap();

    assert_eq!(decoded, measurements);
}
