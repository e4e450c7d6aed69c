use pretty_assertions::assert_eq;

use super::*;

#[test]
fn truthiness_of_scalars_and_collections() {
    for falsy in [
        Value::Null,
        Value::Bool(false),
        Value::Int(0),
        Value::Float(0.0),
        Value::from(""),
        Value::from("0"),
        Value::list(vec![]),
        Value::empty_map(),
    ] {
        assert!(!falsy.is_truthy(), "{falsy:?} should be falsy");
    }
    for truthy in [
        Value::Bool(true),
        Value::Int(-1),
        Value::from("0.0"),
        Value::from(" "),
        Value::list(vec![Value::Null]),
    ] {
        assert!(truthy.is_truthy(), "{truthy:?} should be truthy");
    }
}

#[test]
fn text_forms() {
    assert_eq!(Value::Null.to_text().ok().as_deref(), Some(""));
    assert_eq!(Value::Bool(true).to_text().ok().as_deref(), Some("1"));
    assert_eq!(Value::Bool(false).to_text().ok().as_deref(), Some(""));
    assert_eq!(Value::Float(2.0).to_text().ok().as_deref(), Some("2"));
    assert_eq!(Value::Float(2.5).to_text().ok().as_deref(), Some("2.5"));
    assert_eq!(Value::Float(f64::INFINITY).to_text().ok().as_deref(), Some("INF"));
    assert!(Value::list(vec![]).to_text().is_err());
}

#[test]
fn numeric_strings() {
    assert_eq!(parse_numeric("42"), Some(Number::Int(42)));
    assert_eq!(parse_numeric(" -3 "), Some(Number::Int(-3)));
    assert_eq!(parse_numeric("1.5e2"), Some(Number::Float(150.0)));
    assert_eq!(parse_numeric("abc"), None);
    assert_eq!(parse_numeric("inf"), None);
    assert_eq!(parse_numeric(""), None);
    assert_eq!(parse_numeric("-"), None);
}

#[test]
fn loose_equality() {
    assert!(Value::Int(1).loose_eq(&Value::from("1")));
    assert!(Value::Int(1).loose_eq(&Value::Float(1.0)));
    assert!(Value::from("1e1").loose_eq(&Value::from("10")));
    assert!(Value::Null.loose_eq(&Value::from("")));
    assert!(Value::Null.loose_eq(&Value::Bool(false)));
    assert!(!Value::Int(0).loose_eq(&Value::from("a")));
    assert!(!Value::from("abc").loose_eq(&Value::from("ABC")));
}

#[test]
fn strict_equality_distinguishes_types() {
    assert!(!Value::Int(1).strict_eq(&Value::Float(1.0)));
    assert!(!Value::Int(1).strict_eq(&Value::from("1")));
    assert!(Value::from("x").strict_eq(&Value::from("x")));
}

#[test]
fn comparison() {
    assert_eq!(Value::Int(2).compare(&Value::Float(2.5)), Some(Ordering::Less));
    assert_eq!(Value::from("10").compare(&Value::from("9")), Some(Ordering::Greater));
    assert_eq!(Value::from("b").compare(&Value::from("a")), Some(Ordering::Greater));
    assert_eq!(Value::Float(f64::NAN).compare(&Value::Int(1)), None);
}

#[test]
fn json_conversion_round_trips() {
    let json: serde_json::Value =
        serde_json::from_str(r#"{"b": 1, "a": [true, null, 2.5], "c": "x"}"#)
            .unwrap_or_else(|e| panic!("bad json: {e}"));
    let value = Value::from(json.clone());
    let Value::Map(map) = &value else {
        panic!("expected map");
    };
    assert_eq!(map.len(), 3);
    assert_eq!(map.get("c"), Some(&Value::from("x")));
    assert_eq!(serde_json::Value::from(&value), json);
}

#[test]
fn keys() {
    assert_eq!(Value::Int(3).to_key().ok().as_deref(), Some("3"));
    assert_eq!(Value::Float(3.9).to_key().ok().as_deref(), Some("3"));
    assert_eq!(Value::Bool(true).to_key().ok().as_deref(), Some("1"));
    assert!(Value::list(vec![]).to_key().is_err());
}
