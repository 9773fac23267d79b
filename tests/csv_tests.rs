use serde::{Deserialize, Serialize};
use serde_pivot::{
    json, Charset, CsvListener, CsvOptions, CsvSerializer, Error, Map, Value,
};
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
struct Point {
    x: i32,
    y: i32,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
struct Contact {
    name: String,
    note: String,
    score: f64,
    active: bool,
}

#[test]
fn test_header_inference() {
    let mut serializer = CsvSerializer::new();
    let points: Vec<Point> = serializer.read_str("x,y\n1,2\n3,4\n").unwrap();

    assert_eq!(points, vec![Point { x: 1, y: 2 }, Point { x: 3, y: 4 }]);
    assert_eq!(serializer.keys(), ["x", "y"]);
}

#[test]
fn test_records_default_to_string_maps() {
    let mut serializer = CsvSerializer::new();
    let rows: Vec<Map> = serializer.read_str(" a , b \r\n 1 ,two\r\n").unwrap();

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get("a"), Some(&Value::from("1")));
    assert_eq!(rows[0].get("b"), Some(&Value::from("two")));
}

#[test]
fn test_configured_keys_skip_header() {
    let mut serializer = CsvSerializer::with_options(CsvOptions::new().with_keys(["x", "y"]));
    let points: Vec<Point> = serializer.read_str("5,6\n7,8").unwrap();
    assert_eq!(points, vec![Point { x: 5, y: 6 }, Point { x: 7, y: 8 }]);
}

#[test]
fn test_quoted_fields() {
    let text = "name,note\n\"Doe, Jane\",\"said \"\"hi\"\"\nthen left\"\nplain,\"\"\n";
    let mut serializer = CsvSerializer::new();
    let rows: Vec<Map> = serializer.read_str(text).unwrap();

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].get("name").and_then(Value::as_str), Some("Doe, Jane"));
    assert_eq!(rows[0].get("note").and_then(Value::as_str), Some("said \"hi\"\nthen left"));
    assert_eq!(rows[1].get("note").and_then(Value::as_str), Some(""));
}

#[test]
fn test_quoting_round_trip() {
    let contacts = vec![
        Contact {
            name: "a,\"b\"\nc".to_string(),
            note: "plain".to_string(),
            score: 1.5,
            active: true,
        },
        Contact {
            name: "second".to_string(),
            note: "x\ry".to_string(),
            score: -2.0,
            active: false,
        },
    ];

    let writer = CsvSerializer::with_options(CsvOptions::new().with_write_keys(true));
    let text = writer.write_to_string(&contacts).unwrap();
    assert!(text.starts_with("name,note,score,active\r\n\"a,\"\"b\"\"\nc\",plain,1.5,true\r\n"));

    let mut reader = CsvSerializer::new();
    let back: Vec<Contact> = reader.read_str(&text).unwrap();
    assert_eq!(back, contacts);
}

#[test]
fn test_write_without_header_and_missing_values() {
    let mut first = Map::new();
    first.insert("a", Value::from(1)).unwrap();
    first.insert("b", json::parse("[1, {k: 'v'}]").unwrap()).unwrap();
    let mut second = Map::new();
    second.insert("b", Value::Null).unwrap();

    let serializer = CsvSerializer::new();
    let text = serializer.write_to_string(&[first, second]).unwrap();
    assert_eq!(text, "1,\"[1, {k: \"\"v\"\"}]\"\r\n,\r\n");
}

#[test]
fn test_write_encodes_with_charset() {
    let rows = vec![Point { x: 1, y: 2 }];
    let mut row = Map::new();
    row.insert("word", Value::from("café")).unwrap();

    let mut latin = Vec::new();
    CsvSerializer::new().write(&[row.clone()], &mut latin).unwrap();
    assert_eq!(latin, b"caf\xe9\r\n".to_vec());

    let utf8 = CsvSerializer::with_options(CsvOptions::new().with_charset(Charset::Utf8));
    let mut out = Vec::new();
    utf8.write(&[row], &mut out).unwrap();
    assert_eq!(out, "café\r\n".as_bytes().to_vec());

    let mut points = Vec::new();
    CsvSerializer::new().write(&rows, &mut points).unwrap();
    assert_eq!(points, b"1,2\r\n".to_vec());
}

#[test]
fn test_read_decodes_latin1_by_default() {
    let mut serializer = CsvSerializer::new();
    assert_eq!(serializer.mime_type(), "text/csv; charset=ISO-8859-1");

    let rows: Vec<Map> = serializer.read(&b"word\ncaf\xe9\n"[..]).unwrap();
    assert_eq!(rows[0].get("word").and_then(Value::as_str), Some("café"));
}

#[test]
fn test_byte_order_mark_is_skipped() {
    let mut serializer = CsvSerializer::with_options(CsvOptions::new().with_charset(Charset::Utf8));
    let rows: Vec<Map> = serializer.read("\u{feff}id\n7\n".as_bytes()).unwrap();
    assert_eq!(serializer.keys(), ["id"]);
    assert_eq!(rows[0].get("id").and_then(Value::as_str), Some("7"));
}

#[test]
fn test_blank_lines_between_records() {
    let mut serializer = CsvSerializer::new();
    let points: Vec<Point> = serializer.read_str("x,y\n\n1,2\n\r\n3,4\n\n").unwrap();
    assert_eq!(points.len(), 2);
}

#[test]
fn test_trailing_comma_yields_empty_last_field() {
    let mut serializer = CsvSerializer::new();
    let rows: Vec<Map> = serializer.read_str("a,b\n1,\n").unwrap();
    assert_eq!(rows[0].get("b").and_then(Value::as_str), Some(""));
}

#[test]
fn test_malformed_records() {
    let cases = [
        ("a,b\n1\n", "Line data is incomplete"),
        ("a,b\n1,2,3\n", "more values than keys"),
        ("a\nx\"y\n", "Dangling quote"),
        ("a\n\"x\"y\n", "Prematurely terminated quote"),
        ("a\n\"open\n", "Unterminated string"),
        ("", "Could not read keys"),
    ];

    for (text, message) in cases {
        let mut serializer = CsvSerializer::new();
        let err = serializer.read_str::<Map>(text).unwrap_err();
        assert!(err.is_syntax(), "{:?} gave {:?}", text, err);
        assert!(err.to_string().contains(message), "{:?} gave {}", text, err);
    }
}

#[test]
fn test_error_reports_line() {
    let mut serializer = CsvSerializer::new();
    let err = serializer.read_str::<Map>("a,b\n1,2\n3\n").unwrap_err();
    assert_eq!(err.line(), Some(3));
}

#[test]
fn test_binding_failure_is_a_syntax_error() {
    let mut serializer = CsvSerializer::new();
    let err = serializer.read_str::<Point>("x,y\n1,abc\n").unwrap_err();
    assert!(matches!(err, Error::Syntax { .. }));
}

#[test]
fn test_streaming_reads_lazily() {
    let mut serializer = CsvSerializer::new();
    let mut records = serializer.stream::<Point, _>(&b"x,y\n1,2\n3,4\n5,6"[..]).unwrap();

    assert!(records.has_next());
    assert_eq!(records.next().unwrap().unwrap(), Point { x: 1, y: 2 });
    assert_eq!(records.next().unwrap().unwrap(), Point { x: 3, y: 4 });
    assert!(records.has_next());
    assert_eq!(records.next().unwrap().unwrap(), Point { x: 5, y: 6 });
    assert!(!records.has_next());
    assert!(records.next().is_none());
}

#[test]
fn test_streaming_stops_after_error() {
    let mut serializer = CsvSerializer::new();
    let records = serializer.stream::<Point, _>(&b"x,y\n1,2\nbad\n3,4\n"[..]).unwrap();
    let results: Vec<_> = records.collect();

    assert_eq!(results.len(), 2);
    assert!(results[0].is_ok());
    assert!(results[1].is_err());
}

#[test]
fn test_close_releases_stream() {
    let mut serializer = CsvSerializer::new();
    let mut records = serializer.stream::<Map, _>(&b"a\n1\n2\n"[..]).unwrap();
    assert!(records.next().is_some());
    records.close();
    assert!(!records.has_next());
    assert!(records.next().is_none());
}

#[derive(Clone, Default)]
struct Events(Rc<RefCell<Vec<String>>>);

impl CsvListener for Events {
    fn begin_list(&mut self) {
        self.0.borrow_mut().push("begin".into());
    }

    fn read_item(&mut self, item: &Value) {
        self.0.borrow_mut().push(item.to_string());
    }

    fn end_list(&mut self) {
        self.0.borrow_mut().push("end".into());
    }
}

#[test]
fn test_listeners() {
    let events = Events::default();
    let mut serializer = CsvSerializer::new();
    serializer.add_listener(events.clone());

    let _: Vec<Map> = serializer.read_str("a\n1\n2\n").unwrap();
    assert_eq!(
        *events.0.borrow(),
        vec!["begin", r#"{a: "1"}"#, r#"{a: "2"}"#, "end"]
    );

    events.0.borrow_mut().clear();
    let mut fresh = CsvSerializer::new();
    fresh.add_listener(events.clone());
    {
        let mut records = fresh.stream::<Map, _>(&b"a\n1\n2\n"[..]).unwrap();
        records.next();
    }
    assert_eq!(*events.0.borrow(), vec!["begin", r#"{a: "1"}"#, "end"]);
}

#[test]
fn test_inferred_keys_persist_across_reads() {
    let mut serializer = CsvSerializer::new();
    let _: Vec<Map> = serializer.read_str("a\n1\n").unwrap();
    assert_eq!(serializer.keys(), ["a"]);

    // The header is now read as data.
    let rows: Vec<Map> = serializer.read_str("a\n2\n").unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].get("a").and_then(Value::as_str), Some("a"));
}

#[test]
fn test_lone_empty_field_survives_round_trip() {
    let mut empty = Map::new();
    empty.insert("a", Value::from("")).unwrap();
    let mut filled = Map::new();
    filled.insert("a", Value::from("x")).unwrap();
    let records = vec![empty, filled];

    let serializer = CsvSerializer::with_options(CsvOptions::new().with_keys(["a"]));
    let text = serializer.write_to_string(&records).unwrap();
    assert_eq!(text, "\"\"\r\nx\r\n");

    let mut reader = CsvSerializer::with_options(CsvOptions::new().with_keys(["a"]));
    let back: Vec<Map> = reader.read_str(&text).unwrap();
    assert_eq!(back, records);

    let mut pair = Map::new();
    pair.insert("a", Value::Null).unwrap();
    pair.insert("b", Value::Null).unwrap();
    let two = CsvSerializer::with_options(CsvOptions::new().with_keys(["a", "b"]));
    assert_eq!(two.write_to_string(&[pair]).unwrap(), ",\r\n");
}

#[test]
fn test_verbose_streaming() {
    let mut serializer = CsvSerializer::with_options(CsvOptions::new().with_verbose(true));
    let records = serializer.stream::<Point, _>(&b"x,y\n1,2\n3,4\n"[..]).unwrap();
    let points: Vec<Point> = records.collect::<Result<_, _>>().unwrap();
    assert_eq!(points, vec![Point { x: 1, y: 2 }, Point { x: 3, y: 4 }]);
}
