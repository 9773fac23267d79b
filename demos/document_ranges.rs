//! Cutting and pasting ranges in a document tree.
//!
//! Run with: cargo run --example document_ranges

use serde_pivot::{DocumentTree, TreeEvent};
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    let mut tree = DocumentTree::new();
    let doc = tree.document_from_text("The quick brown fox\njumps over\nthe lazy dog");

    tree.add_listener(|event: &TreeEvent| {
        if let TreeEvent::RangeRemoved { node, offset, count } | TreeEvent::RangeInserted { node, offset, count } =
            event
        {
            println!("  {} at {} on {}: {}", event_name(event), offset, node, count);
        }
    });

    println!("{:?}", tree.get_text(doc));

    println!("cut 4..16:");
    let cut = tree.remove_range(doc, 4, 12)?;
    println!("{:?} / {:?}", tree.get_text(doc), tree.get_text(cut));

    println!("paste at 0:");
    tree.insert_range(doc, cut, 0)?;
    println!("{:?}", tree.get_text(doc));

    let leaf = tree.descendant_at(doc, 10)?;
    println!(
        "offset 10 is {:?} in {} (path {:?})",
        tree.character_at(doc, 10)?,
        leaf,
        tree.path_at(doc, 10)?
    );

    Ok(())
}

fn event_name(event: &TreeEvent) -> &'static str {
    match event {
        TreeEvent::RangeInserted { .. } => "inserted",
        TreeEvent::RangeRemoved { .. } => "removed",
        _ => "other",
    }
}
