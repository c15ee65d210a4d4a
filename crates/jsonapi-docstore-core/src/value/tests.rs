use super::*;
use serde_json::json;
use std::cmp::Ordering;

#[test]
fn canonical_cmp_orders_by_rank_then_value() {
    let mut values = vec![
        Value::from("b"),
        Value::Int(3),
        Value::Null,
        Value::Float(1.5),
        Value::Bool(true),
        Value::from("a"),
    ];
    values.sort_by(canonical_cmp);

    assert_eq!(
        values,
        vec![
            Value::Null,
            Value::Bool(true),
            Value::Float(1.5),
            Value::Int(3),
            Value::from("a"),
            Value::from("b"),
        ]
    );
}

#[test]
fn strict_order_cmp_compares_int_and_float_numerically() {
    assert_eq!(
        strict_order_cmp(&Value::Int(2), &Value::Float(2.5)),
        Some(Ordering::Less)
    );
    assert_eq!(
        strict_order_cmp(&Value::Float(5.0), &Value::Int(5)),
        Some(Ordering::Equal)
    );
}

#[test]
fn strict_order_cmp_rejects_mixed_families() {
    assert_eq!(strict_order_cmp(&Value::Int(1), &Value::from("1")), None);
    assert_eq!(strict_order_cmp(&Value::Null, &Value::Null), None);
}

#[test]
fn values_equal_is_numeric_aware() {
    assert!(values_equal(&Value::Int(5), &Value::Float(5.0)));
    assert!(values_equal(&Value::Null, &Value::Null));
    assert!(!values_equal(&Value::Null, &Value::from("")));
    assert!(values_equal(
        &Value::from_slice(&[1, 2]),
        &Value::List(vec![Value::Float(1.0), Value::Int(2)])
    ));
}

#[test]
fn json_conversion_keeps_integers_integral() {
    let value = Value::from(json!({ "pages": 120, "price": 2.5, "tags": ["a", null] }));

    let Value::Map(map) = &value else {
        panic!("object should convert to a map");
    };
    assert_eq!(map.get("pages"), Some(&Value::Int(120)));
    assert_eq!(map.get("price"), Some(&Value::Float(2.5)));
    assert_eq!(
        map.get("tags"),
        Some(&Value::List(vec![Value::from("a"), Value::Null]))
    );

    let back = serde_json::Value::from(value);
    assert_eq!(back, json!({ "pages": 120, "price": 2.5, "tags": ["a", null] }));
}

#[test]
fn non_finite_float_renders_as_json_null() {
    assert_eq!(
        serde_json::Value::from(Value::Float(f64::NAN)),
        serde_json::Value::Null
    );
}

#[test]
fn serde_untagged_shape_matches_plain_json() {
    let value: Value = serde_json::from_str(r#"{"name":"Basic Philosophy","price":2.0}"#)
        .expect("plain json should deserialize into a value");
    let rendered = serde_json::to_string(&value).expect("value should serialize");

    assert_eq!(rendered, r#"{"name":"Basic Philosophy","price":2.0}"#);
}
