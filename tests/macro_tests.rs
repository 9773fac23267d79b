use serde::Serialize;
use serde_pivot::{json, path, List, Map, Number, Value};

#[test]
fn test_json_macro_null() {
    assert_eq!(json!(null), Value::Null);
}

#[test]
fn test_json_macro_booleans() {
    assert_eq!(json!(true), Value::Bool(true));
    assert_eq!(json!(false), Value::Bool(false));
}

#[test]
fn test_json_macro_numbers() {
    assert_eq!(json!(42), Value::Number(Number::Int(42)));
    assert_eq!(json!(3.5), Value::Number(Number::Double(3.5)));
    assert_eq!(json!((-123)), Value::Number(Number::Int(-123)));
    assert!(matches!(json!(9_000_000_000i64), Value::Number(Number::Long(9_000_000_000))));
}

#[test]
fn test_json_macro_strings() {
    assert_eq!(json!("hello world"), Value::String("hello world".to_string()));
    assert_eq!(json!(""), Value::String(String::new()));
}

#[test]
fn test_json_macro_lists() {
    assert_eq!(json!([]), Value::List(List::new()));

    let list = json!([1, "two", [3], null,]);
    let items = list.as_list().unwrap();
    assert_eq!(items.len(), 4);
    assert_eq!(items.get(1), Some(&Value::from("two")));
    assert_eq!(items.get(2), Some(&json!([3])));
    assert_eq!(items.get(3), Some(&Value::Null));
}

#[test]
fn test_json_macro_maps_keep_order() {
    assert_eq!(json!({}), Value::Map(Map::new()));

    let value = json!({
        "zeta": 1,
        "alpha": { "inner": [true, false] },
        "mid": "m",
    });

    let keys: Vec<_> = value.as_map().unwrap().keys().cloned().collect();
    assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
    assert_eq!(path::get_bool(&value, "alpha.inner[1]").unwrap(), Some(false));
    assert_eq!(value.to_string(), r#"{zeta: 1, alpha: {inner: [true, false]}, mid: "m"}"#);
}

#[test]
fn test_json_macro_embeds_expressions() {
    #[derive(Serialize)]
    struct Point {
        x: i32,
        y: i32,
    }

    let point = Point { x: 1, y: 2 };
    let name = String::from("origin");
    let value = json!({ "name": name, "at": point, "scale": (2.0 * 1.5) });

    assert_eq!(path::get_str(&value, "name").unwrap(), Some("origin"));
    assert_eq!(path::get_i32(&value, "at.y").unwrap(), Some(2));
    assert_eq!(path::get_f64(&value, "scale").unwrap(), Some(3.0));
}

#[test]
fn test_json_macro_matches_parser() {
    let built = json!({ "a": [1, 2.5, "x"], "b": { "c": null } });
    let parsed = serde_pivot::json::parse("{a: [1, 2.5, 'x'], b: {c: null}}").unwrap();
    assert_eq!(built, parsed);
}
