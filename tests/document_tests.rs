use serde_pivot::{DocumentTree, ElementKind, Error, NodeId, TreeEvent};
use std::cell::RefCell;
use std::rc::Rc;

/// Checks contiguous offsets and aggregate counts for the whole subtree.
fn check_invariants(tree: &DocumentTree, node: NodeId) {
    if !tree.is_element(node) {
        return;
    }
    let mut expected = 0;
    for &child in tree.children(node) {
        assert_eq!(tree.parent(child), Some(node));
        assert_eq!(tree.offset(child), expected);
        expected += tree.character_count(child);
        check_invariants(tree, child);
    }
    let newline = usize::from(tree.kind(node) == Some(ElementKind::Paragraph));
    assert_eq!(tree.character_count(node), expected + newline);
}

fn paragraph_of(tree: &mut DocumentTree, pieces: &[&str]) -> NodeId {
    let paragraph = tree.create_element(ElementKind::Paragraph);
    for piece in pieces {
        let text = tree.create_text(piece);
        tree.add(paragraph, text).unwrap();
    }
    paragraph
}

#[test]
fn test_document_from_text() {
    let mut tree = DocumentTree::new();
    let doc = tree.document_from_text("first\r\nsecond\n\nfourth");

    assert_eq!(tree.kind(doc), Some(ElementKind::Document));
    assert_eq!(tree.len(doc), 4);
    assert_eq!(tree.get_text(doc), "first\nsecond\n\nfourth\n");
    assert_eq!(tree.offset(tree.children(doc)[3]), 14);
    check_invariants(&tree, doc);
}

#[test]
fn test_split_range_round_trip() {
    let mut tree = DocumentTree::new();
    let doc = tree.create_element(ElementKind::Document);
    let paragraph = paragraph_of(&mut tree, &["alpha ", "beta ", "gamma"]);
    tree.add(doc, paragraph).unwrap();
    let before = tree.get_text(doc);

    let cut = tree.remove_range(paragraph, 3, 10).unwrap();
    assert_eq!(tree.get_text(cut), "ha beta ga\n");
    assert_eq!(tree.get_text(doc), "alpmma\n");
    check_invariants(&tree, doc);

    tree.insert_range(paragraph, cut, 3).unwrap();
    assert_eq!(tree.get_text(doc), before);
    check_invariants(&tree, doc);
}

#[test]
fn test_get_range_leaves_source_untouched() {
    let mut tree = DocumentTree::new();
    let doc = tree.document_from_text("one two\nthree four");

    let copy = tree.get_range(doc, 4, 9).unwrap();
    assert_eq!(tree.kind(copy), Some(ElementKind::Document));
    // Both partial paragraphs keep their newline.
    assert_eq!(tree.get_text(copy), "two\nthree\n");
    assert_eq!(tree.get_text(doc), "one two\nthree four\n");
    assert!(tree.parent(copy).is_none());
    check_invariants(&tree, doc);
    check_invariants(&tree, copy);
}

#[test]
fn test_remove_range_across_paragraphs() {
    let mut tree = DocumentTree::new();
    let doc = tree.document_from_text("aaa\nbbb\nccc\nddd");

    let removed = tree.remove_range(doc, 2, 9).unwrap();
    assert_eq!(tree.len(removed), 3);
    assert_eq!(tree.get_text(doc), "aa\n\nddd\n");
    assert_eq!(tree.len(doc), 3);
    check_invariants(&tree, doc);
    check_invariants(&tree, removed);
}

#[test]
fn test_whole_paragraph_text_is_emptied_not_detached() {
    let mut tree = DocumentTree::new();
    let doc = tree.document_from_text("abc\nxyz");
    let paragraph = tree.children(doc)[0];
    let text = tree.children(paragraph)[0];

    tree.remove_range(paragraph, 0, 3).unwrap();
    assert_eq!(tree.children(paragraph), &[text]);
    assert_eq!(tree.character_count(text), 0);
    assert_eq!(tree.get_text(doc), "\nxyz\n");
    check_invariants(&tree, doc);
}

#[test]
fn test_replace_range_in_text_node() {
    let mut tree = DocumentTree::new();
    let text = tree.create_text("hello world");
    let replacement = tree.create_text("there");

    let removed = tree.replace_range(text, 6, 5, replacement).unwrap();
    assert_eq!(tree.get_text(removed), "world");
    assert_eq!(tree.get_text(text), "hello there");

    let element = tree.create_element(ElementKind::Block);
    assert!(matches!(tree.insert_range(text, element, 0), Err(Error::InvalidArgument(_))));
}

#[test]
fn test_range_bounds_are_checked() {
    let mut tree = DocumentTree::new();
    let doc = tree.document_from_text("abc");

    assert!(matches!(tree.get_range(doc, 2, 5), Err(Error::IndexOutOfBounds { .. })));
    assert!(matches!(tree.remove_range(doc, 5, 0), Err(Error::IndexOutOfBounds { .. })));
    assert!(tree.character_at(doc, 4).is_err());
    assert!(tree.remove(doc, 0, 2).is_err());

    let text = tree.descendant_at(doc, 0).unwrap();
    assert!(tree.insert_text(text, "x", 4).is_err());
    assert!(tree.remove_text(text, 2, 2).is_err());
}

#[test]
fn test_move_paragraph_between_documents() {
    let mut tree = DocumentTree::new();
    let first = tree.document_from_text("keep\nmove");
    let second = tree.document_from_text("target");

    let moved = tree.remove(first, 1, 1).unwrap();
    tree.insert(second, moved[0], 0).unwrap();

    assert_eq!(tree.get_text(first), "keep\n");
    assert_eq!(tree.get_text(second), "move\ntarget\n");
    assert_eq!(tree.document_offset(tree.descendant_at(second, 6).unwrap()), 5);
    check_invariants(&tree, first);
    check_invariants(&tree, second);
}

#[test]
fn test_path_and_descendant_lookup() {
    let mut tree = DocumentTree::new();
    let doc = tree.create_element(ElementKind::Document);
    let block = tree.create_element(ElementKind::Block);
    let paragraph = paragraph_of(&mut tree, &["ab", "cd"]);
    tree.add(block, paragraph).unwrap();
    tree.add(doc, block).unwrap();

    assert_eq!(tree.path_at(doc, 3).unwrap(), vec![0, 0, 1]);
    let leaf = tree.descendant_at(doc, 3).unwrap();
    assert_eq!(tree.get_text(leaf), "cd");
    assert_eq!(tree.document_offset(leaf), 2);
    assert_eq!(tree.character_at(doc, 4).unwrap(), '\n');
}

#[test]
fn test_offset_events_for_shifted_siblings() {
    let events = Rc::new(RefCell::new(Vec::new()));
    let mut tree = DocumentTree::new();
    let doc = tree.document_from_text("a\nb");
    let second = tree.children(doc)[1];

    let sink = events.clone();
    tree.add_listener(move |event: &TreeEvent| sink.borrow_mut().push(event.clone()));

    let inserted = tree.create_paragraph("new");
    tree.insert(doc, inserted, 0).unwrap();

    let events = events.borrow();
    assert!(events.contains(&TreeEvent::ParentChanged { node: inserted, previous_parent: None }));
    assert!(events.contains(&TreeEvent::OffsetChanged { node: second, previous_offset: 2 }));
    assert!(events.contains(&TreeEvent::RangeInserted { node: doc, offset: 0, count: 4 }));
    assert_eq!(events.last(), Some(&TreeEvent::NodeInserted { element: doc, index: 0 }));
}
