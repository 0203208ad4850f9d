use graphpersist::backref::BackRefTable;
use graphpersist::identity::IdentityTable;
use graphpersist::{DecodeError, Scalar, Value, encoder};

fn roundtrip(fixture: &Value) -> Result<Value, Box<dyn std::error::Error>> {
    let mut writer = Vec::new();
    graphpersist::save(fixture, &mut writer)?;
    Ok(graphpersist::load(writer.as_slice())?)
}

fn item(seq: &Value, index: usize) -> Result<Value, Box<dyn std::error::Error>> {
    let items = seq.as_sequence().ok_or("not a sequence")?.borrow();
    Ok(items.get(index).cloned().ok_or("index out of range")?)
}

#[test]
fn shared_child_stays_shared() -> Result<(), Box<dyn std::error::Error>> {
    let shared = Value::seq(vec![Value::str("shared")]);
    let fixture = Value::seq(vec![shared.clone(), shared]);

    let result = roundtrip(&fixture)?;
    assert_eq!(result, fixture);

    let first = item(&result, 0)?;
    let second = item(&result, 1)?;
    assert!(first.ptr_eq(&second));

    first.as_sequence().ok_or("not a sequence")?.borrow_mut()[0] = Value::str("changed");
    assert_eq!(item(&second, 0)?, Value::str("changed"));
    Ok(())
}

#[test]
fn shared_child_is_written_once() -> Result<(), Box<dyn std::error::Error>> {
    let shared = Value::seq(vec![Value::str("shared")]);
    let fixture = Value::seq(vec![shared.clone(), shared]);

    let text = encoder::to_string(&fixture)?;
    let expected = [
        r#"{"op":"seq_start","pos":0}"#,
        r#"{"op":"seq_start","pos":1}"#,
        r#"{"op":"scalar","value":"shared"}"#,
        r#"{"op":"end"}"#,
        r#"{"op":"ref","pos":1}"#,
        r#"{"op":"end"}"#,
    ];
    assert_eq!(text.lines().collect::<Vec<_>>(), expected);
    Ok(())
}

#[test]
fn equal_contents_are_not_merged() -> Result<(), Box<dyn std::error::Error>> {
    let fixture = Value::seq(vec![
        Value::empty_seq(),
        Value::empty_seq(),
        Value::map([("k", Value::int(1))]),
        Value::map([("k", Value::int(1))]),
    ]);

    let text = encoder::to_string(&fixture)?;
    assert!(!text.contains("\"ref\""));

    let result = roundtrip(&fixture)?;
    assert_eq!(result, fixture);
    assert!(!item(&result, 0)?.ptr_eq(&item(&result, 1)?));
    assert!(!item(&result, 2)?.ptr_eq(&item(&result, 3)?));
    Ok(())
}

#[test]
fn shared_mapping_across_containers() -> Result<(), Box<dyn std::error::Error>> {
    let config = Value::map([("level", Value::int(3))]);
    let holder = Value::map([
        (Scalar::from("primary"), config.clone()),
        (Scalar::Int(2), Value::seq(vec![config.clone(), Value::null()])),
    ]);
    let fixture = Value::seq(vec![holder, config]);

    let result = roundtrip(&fixture)?;
    assert_eq!(result, fixture);

    let holder = item(&result, 0)?;
    let outer = item(&result, 1)?;
    let holder_map = holder.as_mapping().ok_or("not a mapping")?.borrow();
    let primary = holder_map.get(&Scalar::from("primary")).ok_or("missing key")?;
    let nested = holder_map.get(&Scalar::Int(2)).ok_or("missing key")?;
    let inner = item(nested, 0)?;

    assert!(primary.ptr_eq(&outer));
    assert!(inner.ptr_eq(&outer));

    outer
        .as_mapping()
        .ok_or("not a mapping")?
        .borrow_mut()
        .insert(Scalar::from("level"), Value::int(9));
    let seen = primary.as_mapping().ok_or("not a mapping")?.borrow();
    assert_eq!(seen.get(&Scalar::from("level")), Some(&Value::int(9)));
    Ok(())
}

#[test]
fn identity_table_assigns_positions_in_visit_order() {
    let a = Value::empty_seq();
    let b = Value::empty_map();
    let a_alias = a.clone();
    let a_twin = Value::empty_seq();

    assert!(a.is_compound() && b.is_compound());
    assert!(!Value::str("x").is_compound());

    let mut table = IdentityTable::new();
    assert!(table.is_empty());
    assert_eq!(table.lookup_or_register(&a), Some((0, true)));
    assert_eq!(table.lookup_or_register(&b), Some((1, true)));
    assert_eq!(table.lookup_or_register(&a_alias), Some((0, false)));
    assert_eq!(table.lookup_or_register(&a_twin), Some((2, true)));
    assert_eq!(table.lookup_or_register(&Value::str("x")), None);
    assert_eq!(table.len(), 3);
}

#[test]
fn back_reference_table_returns_same_instance() -> Result<(), Box<dyn std::error::Error>> {
    let seq = Value::empty_seq();
    let mut table = BackRefTable::new();
    table.register(0, seq.clone())?;

    assert!(table.resolve(0)?.ptr_eq(&seq));
    assert!(matches!(
        table.resolve(1),
        Err(DecodeError::DanglingReference(1))
    ));
    assert!(matches!(
        table.register(5, Value::empty_map()),
        Err(DecodeError::MalformedToken(_))
    ));
    assert_eq!(table.len(), 1);
    Ok(())
}
