//! Property-based tests for the codecs and the document tree.
//!
//! Generated values stay within what the grammar can express: finite doubles,
//! non-empty keys, and integers in the `i64` range.

use proptest::prelude::*;
use serde::{Deserialize, Serialize};
use serde_pivot::json;
use serde_pivot::{from_str, to_string, CsvOptions, CsvSerializer, DocumentTree, ElementKind, Map, NodeId, Value};

fn roundtrip<T: Serialize + for<'de> Deserialize<'de> + PartialEq + std::fmt::Debug>(
    value: &T,
) -> bool {
    match to_string(value) {
        Ok(serialized) => match from_str::<T>(&serialized) {
            Ok(deserialized) => *value == deserialized,
            Err(e) => {
                eprintln!("Deserialize failed: {}", e);
                eprintln!("Serialized was: {}", serialized);
                false
            }
        },
        Err(e) => {
            eprintln!("Serialize failed: {}", e);
            false
        }
    }
}

fn arb_value() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i32>().prop_map(Value::from),
        any::<i64>().prop_map(Value::from),
        prop::num::f64::NORMAL.prop_map(Value::from),
        ".*".prop_map(Value::from),
    ];
    leaf.prop_recursive(4, 48, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Value::from),
            prop::collection::vec(("[a-zA-Z_$][a-zA-Z0-9_$]{0,6}|.{1,8}", inner), 0..6)
                .prop_map(|entries| Value::Map(entries.into_iter().collect::<Map>())),
        ]
    })
}

proptest! {
    #[test]
    fn prop_i32(n in any::<i32>()) {
        prop_assert!(roundtrip(&n));
    }

    #[test]
    fn prop_i64(n in any::<i64>()) {
        prop_assert!(roundtrip(&n));
    }

    #[test]
    fn prop_u32(n in any::<u32>()) {
        prop_assert!(roundtrip(&n));
    }

    #[test]
    fn prop_bool(b in any::<bool>()) {
        prop_assert!(roundtrip(&b));
    }

    #[test]
    fn prop_string(s in ".*") {
        prop_assert!(roundtrip(&s));
    }

    #[test]
    fn prop_vec_option_i32(v in prop::collection::vec(proptest::option::of(any::<i32>()), 0..20)) {
        prop_assert!(roundtrip(&v));
    }

    #[test]
    fn prop_value_round_trip(value in arb_value()) {
        let text = json::to_string(&value).unwrap();
        prop_assert_eq!(json::parse(&text).unwrap(), value);
    }

    #[test]
    fn prop_delimited_keys_round_trip(value in arb_value()) {
        let text = json::to_string_delimited(&value, true).unwrap();
        prop_assert_eq!(json::parse(&text).unwrap(), value);
    }

    #[test]
    fn prop_csv_round_trip(rows in prop::collection::vec(("[a-zA-Z0-9 ,\"\r\n]{0,12}", "[ -~]{0,16}"), 1..8)) {
        let records: Vec<Map> = rows
            .iter()
            .map(|(a, b)| {
                let mut map = Map::new();
                map.insert("a", Value::from(a.trim())).unwrap();
                map.insert("b", Value::from(b.trim())).unwrap();
                map
            })
            .collect();

        let serializer = CsvSerializer::with_options(CsvOptions::new().with_keys(["a", "b"]));
        let text = serializer.write_to_string(&records).unwrap();

        let mut reader = CsvSerializer::with_options(CsvOptions::new().with_keys(["a", "b"]));
        let back: Vec<Map> = reader.read_str(&text).unwrap();
        prop_assert_eq!(back, records);
    }
}

#[derive(Debug, Clone)]
enum Op {
    InsertText { at: usize, text: String },
    RemoveRange { at: usize, len: usize },
    AddParagraph(String),
    RemoveParagraph(usize),
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (any::<usize>(), "[a-z]{0,5}").prop_map(|(at, text)| Op::InsertText { at, text }),
        (any::<usize>(), 0usize..6).prop_map(|(at, len)| Op::RemoveRange { at, len }),
        "[a-z ]{0,8}".prop_map(Op::AddParagraph),
        any::<usize>().prop_map(Op::RemoveParagraph),
    ]
}

fn check_invariants(tree: &DocumentTree, node: NodeId) -> Result<(), TestCaseError> {
    if !tree.is_element(node) {
        return Ok(());
    }
    let mut expected = 0;
    for &child in tree.children(node) {
        prop_assert_eq!(tree.offset(child), expected);
        expected += tree.character_count(child);
        check_invariants(tree, child)?;
    }
    let newline = usize::from(tree.kind(node) == Some(ElementKind::Paragraph));
    prop_assert_eq!(tree.character_count(node), expected + newline);
    Ok(())
}

proptest! {
    #[test]
    fn prop_document_offsets_stay_contiguous(ops in prop::collection::vec(arb_op(), 1..24)) {
        let mut tree = DocumentTree::new();
        let doc = tree.document_from_text("seed text\nsecond");

        for op in ops {
            let count = tree.character_count(doc);
            match op {
                Op::InsertText { at, text } => {
                    if count > 0 {
                        let leaf = tree.descendant_at(doc, at % count);
                        if let Ok(leaf) = leaf {
                            let len = tree.character_count(leaf);
                            tree.insert_text(leaf, &text, at % (len + 1)).unwrap();
                        }
                    }
                }
                Op::RemoveRange { at, len } => {
                    if count > 0 {
                        let at = at % count;
                        let len = len.min(count - at);
                        tree.remove_range(doc, at, len).unwrap();
                    }
                }
                Op::AddParagraph(text) => {
                    let paragraph = tree.create_paragraph(&text);
                    tree.add(doc, paragraph).unwrap();
                }
                Op::RemoveParagraph(index) => {
                    let len = tree.len(doc);
                    if len > 0 {
                        tree.remove(doc, index % len, 1).unwrap();
                    }
                }
            }
            check_invariants(&tree, doc)?;
            prop_assert_eq!(tree.get_text(doc).chars().count(), tree.character_count(doc));
        }
    }

    #[test]
    fn prop_cut_and_paste_restores_text(at in 0usize..40, len in 0usize..40) {
        let mut tree = DocumentTree::new();
        let paragraph = tree.create_element(ElementKind::Paragraph);
        for piece in ["lorem ", "ipsum ", "dolor ", "sit ", "amet"] {
            let text = tree.create_text(piece);
            tree.add(paragraph, text).unwrap();
        }
        let before = tree.get_text(paragraph);
        let content = tree.character_count(paragraph) - 1;
        let at = at % content;
        let len = len.min(content - at);

        let cut = tree.remove_range(paragraph, at, len).unwrap();
        tree.insert_range(paragraph, cut, at).unwrap();

        prop_assert_eq!(tree.get_text(paragraph), before);
        check_invariants(&tree, paragraph)?;
    }
}
