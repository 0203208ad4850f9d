use graphpersist::{ConvertError, Scalar, Value, json, storage};
use std::fs;

fn cleanup(path: &str) {
    let _ = fs::remove_file(path);
}

#[test]
fn file_round_trip_keeps_aliasing() -> Result<(), Box<dyn std::error::Error>> {
    let path = "test_file_round_trip.gp";
    cleanup(path);

    let shared = Value::map([("k", Value::str("v"))]);
    let fixture = Value::seq(vec![shared.clone(), Value::int(3), shared]);

    storage::save(path, &fixture)?;
    assert!(storage::exists(path));

    let loaded = storage::load(path)?;
    assert_eq!(loaded, fixture);

    let items = loaded.as_sequence().ok_or("not a sequence")?.borrow();
    assert!(items[0].ptr_eq(&items[2]));

    cleanup(path);
    Ok(())
}

#[test]
fn load_missing_file_fails() {
    let path = "test_missing_file.gp";
    cleanup(path);
    assert!(!storage::exists(path));
    assert!(storage::load(path).is_err());
}

#[test]
fn corrupt_file_fails_to_load() -> Result<(), Box<dyn std::error::Error>> {
    let path = "test_corrupt_file.gp";
    cleanup(path);

    fs::write(path, "{\"op\":\"seq_start\",\"pos\":0}\n{\"op\":\"ref\",\"pos\":9}\n")?;
    let err = match storage::load(path) {
        Ok(_) => return Err("corrupt file loaded".into()),
        Err(e) => e,
    };
    assert!(matches!(
        err.downcast_ref::<graphpersist::DecodeError>(),
        Some(graphpersist::DecodeError::DanglingReference(9))
    ));

    cleanup(path);
    Ok(())
}

#[test]
fn json_document_converts_both_ways() -> Result<(), Box<dyn std::error::Error>> {
    let doc = serde_json::json!({
        "name": "graph",
        "ratio": 0.25,
        "count": 3,
        "tags": ["a", null, true],
        "nested": {"empty": []}
    });

    let value = json::from_json(&doc)?;
    let map = value.as_mapping().ok_or("not a mapping")?.borrow();
    assert_eq!(map.get(&Scalar::from("count")), Some(&Value::int(3)));
    assert_eq!(map.get(&Scalar::from("ratio")), Some(&Value::float(0.25)));
    drop(map);

    assert_eq!(json::to_json(&value)?, doc);
    Ok(())
}

#[test]
fn json_conversion_rejects_non_string_keys() {
    let value = Value::map([(Scalar::Int(7), Value::null())]);
    assert!(matches!(
        json::to_json(&value),
        Err(ConvertError::NonStringKey(_))
    ));

    let value = Value::seq(vec![Value::float(f64::INFINITY)]);
    assert!(matches!(
        json::to_json(&value),
        Err(ConvertError::NonFiniteFloat(_))
    ));
}

#[test]
fn aliased_values_duplicate_in_json() -> Result<(), Box<dyn std::error::Error>> {
    let shared = Value::seq(vec![Value::int(1)]);
    let value = Value::seq(vec![shared.clone(), shared]);
    assert_eq!(json::to_json(&value)?, serde_json::json!([[1], [1]]));
    Ok(())
}

#[test]
fn json_integers_beyond_i64_are_rejected() {
    let doc = serde_json::json!({"big": u64::MAX});
    assert!(matches!(
        json::from_json(&doc),
        Err(ConvertError::IntegerOutOfRange(_))
    ));

    let doc = serde_json::json!([i64::MIN, i64::MAX, 1.5]);
    assert!(json::from_json(&doc).is_ok());
}
