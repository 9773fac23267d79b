//! An offset-indexed rich-text tree.
//!
//! A [`DocumentTree`] is an arena of nodes addressed by [`NodeId`]. Nodes are either
//! elements, which own an ordered list of children, or text nodes, which own their
//! characters. Every node knows its offset inside its parent, and every element knows
//! how many characters its subtree holds, so any character position can be resolved to a
//! node with a binary search at each level.
//!
//! A paragraph reports one character more than its children hold: the newline that ends
//! it. That character exists in no text node.
//!
//! Nodes are created detached, attached with [`DocumentTree::insert`] and detached again
//! (not destroyed) with [`DocumentTree::remove`]. A detached node can be inserted
//! somewhere else, which is how cut and paste is built.
//!
//! Handles are only meaningful for the tree that created them; passing a handle from
//! another tree panics like an out-of-range slice index.
//!
//! ## Examples
//!
//! ```rust
//! use serde_pivot::document::DocumentTree;
//!
//! let mut tree = DocumentTree::new();
//! let doc = tree.document_from_text("hello world\nsecond line");
//!
//! assert_eq!(tree.get_text(doc), "hello world\nsecond line\n");
//! assert_eq!(tree.character_count(doc), 24);
//!
//! // Cut "world" out of the first paragraph and paste it back.
//! let first = tree.children(doc)[0];
//! let cut = tree.remove_range(first, 6, 5).unwrap();
//! assert_eq!(tree.get_text(cut), "world\n");
//! assert_eq!(tree.get_text(doc), "hello \nsecond line\n");
//!
//! tree.insert_range(first, cut, 6).unwrap();
//! assert_eq!(tree.get_text(doc), "hello world\nsecond line\n");
//! assert_eq!(tree.character_at(doc, 12).unwrap(), 's');
//! ```

use crate::listener::Listeners;
use crate::{Error, Result};
use std::fmt;
use tracing::trace;

/// Handle to a node of a [`DocumentTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The kind of an element node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    /// The root of a document.
    Document,
    /// A run of text ending with a virtual newline.
    Paragraph,
    /// A generic container.
    Block,
}

impl ElementKind {
    #[inline]
    #[must_use]
    pub const fn is_paragraph(self) -> bool {
        matches!(self, ElementKind::Paragraph)
    }
}

/// A change to the tree, delivered to every registered [`TreeListener`].
///
/// Range events are delivered for the node where the change happened and then for each of
/// its ancestors, with the offset translated into that ancestor's coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeEvent {
    ParentChanged {
        node: NodeId,
        previous_parent: Option<NodeId>,
    },
    OffsetChanged {
        node: NodeId,
        previous_offset: usize,
    },
    NodeInserted {
        element: NodeId,
        index: usize,
    },
    NodesRemoved {
        element: NodeId,
        index: usize,
        removed: Vec<NodeId>,
    },
    RangeInserted {
        node: NodeId,
        offset: usize,
        count: usize,
    },
    RangeRemoved {
        node: NodeId,
        offset: usize,
        count: usize,
    },
}

/// Receives [`TreeEvent`]s. Implemented for every `FnMut(&TreeEvent)`.
pub trait TreeListener {
    fn tree_changed(&mut self, event: &TreeEvent);
}

impl<F: FnMut(&TreeEvent)> TreeListener for F {
    fn tree_changed(&mut self, event: &TreeEvent) {
        self(event)
    }
}

#[derive(Debug, Clone)]
enum Content {
    Element {
        kind: ElementKind,
        children: Vec<NodeId>,
        count: usize,
    },
    Text(Vec<char>),
}

#[derive(Debug, Clone)]
struct NodeData {
    parent: Option<NodeId>,
    offset: usize,
    content: Content,
}

/// Arena owning every node of one or more documents.
#[derive(Debug, Default)]
pub struct DocumentTree {
    nodes: Vec<NodeData>,
    listeners: Listeners<dyn TreeListener>,
}

impl DocumentTree {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_listener<L: TreeListener + 'static>(&mut self, listener: L) {
        self.listeners.add(Box::new(listener));
    }

    fn alloc(&mut self, content: Content) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeData {
            parent: None,
            offset: 0,
            content,
        });
        id
    }

    /// Creates a detached, empty element.
    pub fn create_element(&mut self, kind: ElementKind) -> NodeId {
        self.alloc(Content::Element {
            kind,
            children: Vec::new(),
            count: 0,
        })
    }

    /// Creates a detached text node.
    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.alloc(Content::Text(text.chars().collect()))
    }

    /// Creates a detached paragraph holding one text node with `text`.
    pub fn create_paragraph(&mut self, text: &str) -> NodeId {
        let paragraph = self.create_element(ElementKind::Paragraph);
        let node = self.create_text(text);
        self.attach(paragraph, node, 0);
        paragraph
    }

    /// Builds a document with one paragraph per line of `text`.
    pub fn document_from_text(&mut self, text: &str) -> NodeId {
        let document = self.create_element(ElementKind::Document);
        for (index, line) in text.lines().enumerate() {
            let paragraph = self.create_paragraph(line);
            self.attach(document, paragraph, index);
        }
        document
    }

    // Inspection

    /// The element kind, or `None` for a text node.
    #[must_use]
    pub fn kind(&self, node: NodeId) -> Option<ElementKind> {
        match &self.nodes[node.0].content {
            Content::Element { kind, .. } => Some(*kind),
            Content::Text(_) => None,
        }
    }

    #[must_use]
    pub fn is_element(&self, node: NodeId) -> bool {
        self.kind(node).is_some()
    }

    #[must_use]
    pub fn is_text(&self, node: NodeId) -> bool {
        self.kind(node).is_none()
    }

    #[must_use]
    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node.0].parent
    }

    /// Offset of the node's first character within its parent.
    #[must_use]
    pub fn offset(&self, node: NodeId) -> usize {
        self.nodes[node.0].offset
    }

    /// Offset of the node's first character within the root of its tree.
    #[must_use]
    pub fn document_offset(&self, node: NodeId) -> usize {
        match self.parent(node) {
            Some(parent) => self.document_offset(parent) + self.offset(node),
            None => 0,
        }
    }

    /// Number of characters in the node, including a paragraph's newline.
    #[must_use]
    pub fn character_count(&self, node: NodeId) -> usize {
        match &self.nodes[node.0].content {
            Content::Element { kind, count, .. } => count + usize::from(kind.is_paragraph()),
            Content::Text(chars) => chars.len(),
        }
    }

    /// Characters held by the node's children, without a paragraph's newline.
    fn content_count(&self, node: NodeId) -> usize {
        match &self.nodes[node.0].content {
            Content::Element { count, .. } => *count,
            Content::Text(chars) => chars.len(),
        }
    }

    /// The children of an element; empty for a text node.
    #[must_use]
    pub fn children(&self, node: NodeId) -> &[NodeId] {
        match &self.nodes[node.0].content {
            Content::Element { children, .. } => children,
            Content::Text(_) => &[],
        }
    }

    #[must_use]
    pub fn len(&self, element: NodeId) -> usize {
        self.children(element).len()
    }

    #[must_use]
    pub fn index_of(&self, element: NodeId, node: NodeId) -> Option<usize> {
        self.children(element).iter().position(|&child| child == node)
    }

    /// The text of a node; paragraphs contribute their trailing newline.
    #[must_use]
    pub fn get_text(&self, node: NodeId) -> String {
        let mut text = String::with_capacity(self.character_count(node));
        self.collect_text(node, &mut text);
        text
    }

    fn collect_text(&self, node: NodeId, text: &mut String) {
        match &self.nodes[node.0].content {
            Content::Text(chars) => text.extend(chars.iter()),
            Content::Element { kind, children, .. } => {
                for &child in children {
                    self.collect_text(child, text);
                }
                if kind.is_paragraph() {
                    text.push('\n');
                }
            }
        }
    }

    pub fn character_at(&self, node: NodeId, offset: usize) -> Result<char> {
        match &self.nodes[node.0].content {
            Content::Text(chars) => chars
                .get(offset)
                .copied()
                .ok_or_else(|| Error::index_out_of_bounds(offset, chars.len())),
            Content::Element { kind, count, .. } => {
                if kind.is_paragraph() && offset == *count {
                    return Ok('\n');
                }
                let child = self.children(node)[self.node_at(node, offset)?];
                self.character_at(child, offset - self.offset(child))
            }
        }
    }

    /// Index of the child of `element` holding the character at `offset`.
    ///
    /// # Errors
    ///
    /// [`Error::IndexOutOfBounds`] unless `offset` falls inside the element's children.
    pub fn node_at(&self, element: NodeId, offset: usize) -> Result<usize> {
        self.require_element(element)?;
        let count = self.content_count(element);
        if offset >= count {
            return Err(Error::index_out_of_bounds(offset, count));
        }
        let children = self.children(element);
        let after = children.partition_point(|&child| self.offset(child) <= offset);
        Ok(after - 1)
    }

    /// Child indices leading from `element` to the leaf holding `offset`.
    pub fn path_at(&self, element: NodeId, offset: usize) -> Result<Vec<usize>> {
        let mut path = Vec::new();
        let mut node = element;
        let mut offset = offset;
        while self.is_element(node) {
            let index = self.node_at(node, offset)?;
            path.push(index);
            node = self.children(node)[index];
            offset -= self.offset(node);
        }
        Ok(path)
    }

    /// The leaf holding the character at `offset`.
    pub fn descendant_at(&self, element: NodeId, offset: usize) -> Result<NodeId> {
        let mut node = element;
        let mut offset = offset;
        while self.is_element(node) {
            node = self.children(node)[self.node_at(node, offset)?];
            offset -= self.offset(node);
        }
        Ok(node)
    }

    /// Copies a node. A non-recursive copy of an element has no children.
    pub fn duplicate(&mut self, node: NodeId, recursive: bool) -> NodeId {
        match self.nodes[node.0].content.clone() {
            Content::Text(chars) => self.alloc(Content::Text(chars)),
            Content::Element { kind, children, .. } => {
                let copy = self.create_element(kind);
                if recursive {
                    for (index, child) in children.into_iter().enumerate() {
                        let child_copy = self.duplicate(child, true);
                        self.attach(copy, child_copy, index);
                    }
                }
                copy
            }
        }
    }

    // Structural mutation

    /// Inserts a detached `node` as child `index` of `element`.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] if `element` is not an element, if `node` already has a
    /// parent, or if `node` is `element` or one of its ancestors.
    /// [`Error::IndexOutOfBounds`] if `index` is past the last child.
    pub fn insert(&mut self, element: NodeId, node: NodeId, index: usize) -> Result<()> {
        self.require_element(element)?;
        let len = self.len(element);
        if index > len {
            return Err(Error::index_out_of_bounds(index, len));
        }
        if self.parent(node).is_some() {
            return Err(Error::invalid_argument(format!("Node {} already has a parent.", node)));
        }
        if node == element || self.ancestors(element).any(|ancestor| ancestor == node) {
            return Err(Error::invalid_argument("Cannot add an element to itself."));
        }
        self.attach(element, node, index);
        Ok(())
    }

    /// Appends a detached `node` to `element`, returning its index.
    pub fn add(&mut self, element: NodeId, node: NodeId) -> Result<usize> {
        let index = self.len(element);
        self.insert(element, node, index)?;
        Ok(index)
    }

    fn attach(&mut self, element: NodeId, node: NodeId, index: usize) {
        let count = self.character_count(node);
        self.set_parent(node, Some(element));
        if let Content::Element {
            children,
            count: total,
            ..
        } = &mut self.nodes[element.0].content
        {
            children.insert(index, node);
            *total += count;
        }

        let offset = match index.checked_sub(1) {
            Some(previous) => {
                let previous = self.children(element)[previous];
                self.offset(previous) + self.character_count(previous)
            }
            None => 0,
        };
        self.set_offset(node, offset);
        self.shift_from(element, index + 1, count as isize);

        trace!(element = %element, node = %node, index, count, "node inserted");
        self.propagate_inserted(element, offset, count);
        self.fire(|| TreeEvent::NodeInserted { element, index });
    }

    /// Detaches `count` children of `element` starting at `index` and returns them.
    ///
    /// The removed nodes stay in the arena and can be inserted again.
    pub fn remove(&mut self, element: NodeId, index: usize, count: usize) -> Result<Vec<NodeId>> {
        self.require_element(element)?;
        let len = self.len(element);
        if index.checked_add(count).map_or(true, |end| end > len) {
            return Err(Error::index_out_of_bounds(index.saturating_add(count), len));
        }
        if count == 0 {
            return Ok(Vec::new());
        }

        let removed: Vec<NodeId> = match &mut self.nodes[element.0].content {
            Content::Element { children, .. } => children.drain(index..index + count).collect(),
            Content::Text(_) => Vec::new(),
        };

        let mut removed_count = 0;
        for &node in &removed {
            self.set_parent(node, None);
            removed_count += self.character_count(node);
        }
        if let Content::Element { count: total, .. } = &mut self.nodes[element.0].content {
            *total -= removed_count;
        }
        self.shift_from(element, index, -(removed_count as isize));

        let offset = match self.children(element).get(index) {
            Some(&next) => self.offset(next),
            None => self.content_count(element),
        };

        trace!(element = %element, index, nodes = removed.len(), count = removed_count, "nodes removed");
        self.propagate_removed(element, offset, removed_count);
        self.fire(|| TreeEvent::NodesRemoved {
            element,
            index,
            removed: removed.clone(),
        });
        Ok(removed)
    }

    /// Detaches `node` from `element`, returning the index it had.
    pub fn remove_node(&mut self, element: NodeId, node: NodeId) -> Result<Option<usize>> {
        match self.index_of(element, node) {
            Some(index) => {
                self.remove(element, index, 1)?;
                Ok(Some(index))
            }
            None => Ok(None),
        }
    }

    // Text mutation

    /// Inserts `text` into a text node before character `index`.
    pub fn insert_text(&mut self, node: NodeId, text: &str, index: usize) -> Result<()> {
        let chars = self.text_mut(node)?;
        if index > chars.len() {
            return Err(Error::index_out_of_bounds(index, chars.len()));
        }
        let inserted: Vec<char> = text.chars().collect();
        let count = inserted.len();
        chars.splice(index..index, inserted);
        if count > 0 {
            self.propagate_inserted(node, index, count);
        }
        Ok(())
    }

    /// Removes `count` characters from a text node, returning them.
    pub fn remove_text(&mut self, node: NodeId, index: usize, count: usize) -> Result<String> {
        let chars = self.text_mut(node)?;
        if index.checked_add(count).map_or(true, |end| end > chars.len()) {
            return Err(Error::index_out_of_bounds(index.saturating_add(count), chars.len()));
        }
        let removed: String = chars.drain(index..index + count).collect();
        if count > 0 {
            self.propagate_removed(node, index, count);
        }
        Ok(removed)
    }

    // Range operations

    /// Copies the characters `offset..offset + count` of `node` into a new detached node
    /// with the same structure.
    pub fn get_range(&mut self, node: NodeId, offset: usize, count: usize) -> Result<NodeId> {
        if self.is_text(node) {
            self.check_range(node, offset, count)?;
            let text: String = self.get_text(node).chars().skip(offset).take(count).collect();
            return Ok(self.create_text(&text));
        }

        self.check_range(node, offset, count)?;
        let count = self.trim_newline(node, offset, count);
        self.check_content_range(node, offset, count)?;

        let range = self.duplicate(node, false);
        if count == 0 {
            return Ok(range);
        }

        let start = self.node_at(node, offset)?;
        let end = self.node_at(node, offset + count - 1)?;
        if start == end {
            let child = self.children(node)[start];
            let segment = self.get_range(child, offset - self.offset(child), count)?;
            self.attach_last(range, segment);
            return Ok(range);
        }

        let start_node = self.children(node)[start];
        let leading_offset = offset - self.offset(start_node);
        let leading_count = self.character_count(start_node) - leading_offset;
        let leading = self.get_range(start_node, leading_offset, leading_count)?;

        let end_node = self.children(node)[end];
        let trailing_count = offset + count - self.offset(end_node);
        let trailing = self.get_range(end_node, 0, trailing_count)?;

        if self.character_count(leading) > 0 {
            self.attach_last(range, leading);
        }
        for index in start + 1..end {
            let child = self.children(node)[index];
            let copy = self.duplicate(child, true);
            self.attach_last(range, copy);
        }
        if self.character_count(trailing) > 0 {
            self.attach_last(range, trailing);
        }
        Ok(range)
    }

    /// Removes the characters `offset..offset + count` of `node` and returns them as a
    /// new detached node with the same structure.
    ///
    /// Children entirely inside the range move into the returned node; children cut by
    /// either end of the range are split. The last text node of a paragraph is emptied
    /// rather than detached.
    pub fn remove_range(&mut self, node: NodeId, offset: usize, count: usize) -> Result<NodeId> {
        if self.is_text(node) {
            let removed = self.remove_text(node, offset, count)?;
            return Ok(self.create_text(&removed));
        }

        self.check_range(node, offset, count)?;
        let count = self.trim_newline(node, offset, count);
        self.check_content_range(node, offset, count)?;

        let range = self.duplicate(node, false);
        if count == 0 {
            return Ok(range);
        }

        let mut start = self.node_at(node, offset)?;
        let mut end = self.node_at(node, offset + count - 1)?;
        if start == end {
            let child = self.children(node)[start];
            let child_offset = self.offset(child);
            let segment = if offset == child_offset && count == self.character_count(child) {
                if self.is_text(child) && self.is_only_text_of_paragraph(child) {
                    self.remove_range(child, 0, count)?
                } else {
                    self.remove(node, start, 1)?;
                    child
                }
            } else {
                self.remove_range(child, offset - child_offset, count)?
            };
            self.attach_last(range, segment);
            return Ok(range);
        }

        let start_node = self.children(node)[start];
        let leading_offset = offset - self.offset(start_node);
        let end_node = self.children(node)[end];
        let trailing_count = offset + count - self.offset(end_node);

        let mut leading = None;
        if leading_offset > 0 {
            let leading_count = self.character_count(start_node) - leading_offset;
            leading = Some(self.remove_range(start_node, leading_offset, leading_count)?);
            start += 1;
        }

        let mut trailing = None;
        if trailing_count < self.character_count(end_node) {
            trailing = Some(self.remove_range(end_node, 0, trailing_count)?);
            end -= 1;
        }

        let removed = self.remove(node, start, end + 1 - start)?;

        if let Some(segment) = leading.filter(|&s| self.character_count(s) > 0) {
            self.attach_last(range, segment);
        }
        for child in removed {
            self.attach_last(range, child);
        }
        if let Some(segment) = trailing.filter(|&s| self.character_count(s) > 0) {
            self.attach_last(range, segment);
        }
        Ok(range)
    }

    /// Splices the content of `range` into `node` at `offset`.
    ///
    /// For an element, the children of `range` are moved into `node`; a child cut by
    /// `offset` is split and its trailing part placed after them. For a text node,
    /// `range` must be a text node and its characters are inserted.
    pub fn insert_range(&mut self, node: NodeId, range: NodeId, offset: usize) -> Result<()> {
        if self.is_text(node) {
            if !self.is_text(range) {
                return Err(Error::invalid_argument(format!("Range node {} is not a text node.", range)));
            }
            let text = self.get_text(range);
            return self.insert_text(node, &text, offset);
        }

        if !self.is_element(range) {
            return Err(Error::invalid_argument(format!("Range node {} is not an element.", range)));
        }
        let count = self.content_count(node);
        if offset > count {
            return Err(Error::index_out_of_bounds(offset, count));
        }

        let n = self.len(range);
        if n == 0 {
            return Ok(());
        }
        let nodes = self.remove(range, 0, n)?;

        if offset == count {
            for child in nodes {
                self.attach_last(node, child);
            }
            return Ok(());
        }

        let mut index = self.node_at(node, offset)?;
        let leading = self.children(node)[index];
        let splice = offset - self.offset(leading);
        let trailing = if splice > 0 {
            let trailing_count = self.character_count(leading) - splice;
            index += 1;
            Some(self.remove_range(leading, splice, trailing_count)?)
        } else {
            None
        };

        for (i, child) in nodes.into_iter().enumerate() {
            self.insert(node, child, index + i)?;
        }
        if let Some(segment) = trailing {
            self.insert(node, segment, index + n)?;
        }
        Ok(())
    }

    /// Removes `offset..offset + count` and inserts `range` in its place, returning the
    /// removed range.
    pub fn replace_range(&mut self, node: NodeId, offset: usize, count: usize, range: NodeId) -> Result<NodeId> {
        let removed = self.remove_range(node, offset, count)?;
        self.insert_range(node, range, offset)?;
        Ok(removed)
    }

    // Internals

    fn require_element(&self, node: NodeId) -> Result<()> {
        if self.is_element(node) {
            Ok(())
        } else {
            Err(Error::invalid_argument(format!("Node {} is not an element.", node)))
        }
    }

    fn text_mut(&mut self, node: NodeId) -> Result<&mut Vec<char>> {
        match &mut self.nodes[node.0].content {
            Content::Text(chars) => Ok(chars),
            Content::Element { .. } => Err(Error::invalid_argument(format!("Node {} is not a text node.", node))),
        }
    }

    fn check_range(&self, node: NodeId, offset: usize, count: usize) -> Result<()> {
        let available = self.character_count(node);
        match offset.checked_add(count) {
            Some(end) if end <= available => Ok(()),
            _ => Err(Error::index_out_of_bounds(offset.saturating_add(count), available)),
        }
    }

    fn check_content_range(&self, node: NodeId, offset: usize, count: usize) -> Result<()> {
        let available = self.content_count(node);
        if offset + count > available {
            Err(Error::index_out_of_bounds(offset + count, available))
        } else {
            Ok(())
        }
    }

    /// Drops a paragraph's newline from a range that ends at the paragraph's end.
    fn trim_newline(&self, node: NodeId, offset: usize, count: usize) -> usize {
        let is_paragraph = self.kind(node).map_or(false, ElementKind::is_paragraph);
        if is_paragraph && count > 0 && offset + count == self.character_count(node) {
            count - 1
        } else {
            count
        }
    }

    fn is_only_text_of_paragraph(&self, node: NodeId) -> bool {
        self.ancestors(node)
            .find(|&ancestor| self.kind(ancestor).map_or(false, ElementKind::is_paragraph))
            .map_or(false, |paragraph| self.len(paragraph) == 1)
    }

    fn attach_last(&mut self, element: NodeId, node: NodeId) {
        let index = self.len(element);
        self.attach(element, node, index);
    }

    fn ancestors(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(node), move |&ancestor| self.parent(ancestor))
    }

    /// Moves the offsets of the children from `start` on by `delta`.
    fn shift_from(&mut self, element: NodeId, start: usize, delta: isize) {
        if delta == 0 {
            return;
        }
        let later: Vec<NodeId> = self.children(element).iter().skip(start).copied().collect();
        for child in later {
            let offset = self.offset(child).wrapping_add_signed(delta);
            self.set_offset(child, offset);
        }
    }

    /// Reports an insertion at `node` and grows every ancestor by `count`.
    fn propagate_inserted(&mut self, node: NodeId, offset: usize, count: usize) {
        let mut node = node;
        let mut offset = offset;
        loop {
            self.fire(|| TreeEvent::RangeInserted { node, offset, count });
            let Some(parent) = self.parent(node) else { break };
            if let Content::Element { count: total, .. } = &mut self.nodes[parent.0].content {
                *total += count;
            }
            if let Some(index) = self.index_of(parent, node) {
                self.shift_from(parent, index + 1, count as isize);
            }
            offset += self.offset(node);
            node = parent;
        }
    }

    /// Reports a removal at `node` and shrinks every ancestor by `count`.
    fn propagate_removed(&mut self, node: NodeId, offset: usize, count: usize) {
        let mut node = node;
        let mut offset = offset;
        loop {
            self.fire(|| TreeEvent::RangeRemoved { node, offset, count });
            let Some(parent) = self.parent(node) else { break };
            if let Some(index) = self.index_of(parent, node) {
                self.shift_from(parent, index + 1, -(count as isize));
            }
            if let Content::Element { count: total, .. } = &mut self.nodes[parent.0].content {
                *total -= count;
            }
            offset += self.offset(node);
            node = parent;
        }
    }

    fn set_parent(&mut self, node: NodeId, parent: Option<NodeId>) {
        let previous_parent = self.nodes[node.0].parent;
        if previous_parent != parent {
            self.nodes[node.0].parent = parent;
            self.fire(|| TreeEvent::ParentChanged { node, previous_parent });
        }
    }

    fn set_offset(&mut self, node: NodeId, offset: usize) {
        let previous_offset = self.nodes[node.0].offset;
        if previous_offset != offset {
            self.nodes[node.0].offset = offset;
            self.fire(|| TreeEvent::OffsetChanged { node, previous_offset });
        }
    }

    fn fire(&mut self, event: impl FnOnce() -> TreeEvent) {
        if self.listeners.is_empty() {
            return;
        }
        let event = event();
        self.listeners.each(|listener| listener.tree_changed(&event));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn assert_offsets(tree: &DocumentTree, element: NodeId) {
        let mut expected = 0;
        for &child in tree.children(element) {
            assert_eq!(tree.offset(child), expected, "offset of {}", child);
            assert_eq!(tree.parent(child), Some(element));
            expected += tree.character_count(child);
            assert_offsets(tree, child);
        }
        if tree.is_element(element) {
            assert_eq!(tree.content_count(element), expected, "count of {}", element);
        }
    }

    #[test]
    fn test_insert_assigns_offsets() {
        let mut tree = DocumentTree::new();
        let block = tree.create_element(ElementKind::Block);
        let a = tree.create_text("abc");
        let b = tree.create_text("de");
        let c = tree.create_text("f");
        tree.add(block, a).unwrap();
        tree.add(block, c).unwrap();
        tree.insert(block, b, 1).unwrap();

        assert_eq!(tree.children(block), &[a, b, c]);
        assert_eq!(tree.offset(c), 5);
        assert_eq!(tree.character_count(block), 6);
        assert_offsets(&tree, block);
    }

    #[test]
    fn test_insert_preconditions() {
        let mut tree = DocumentTree::new();
        let outer = tree.create_element(ElementKind::Block);
        let inner = tree.create_element(ElementKind::Block);
        let text = tree.create_text("x");
        tree.add(outer, inner).unwrap();

        assert!(matches!(tree.insert(inner, outer, 0), Err(Error::InvalidArgument(_))));
        assert!(matches!(tree.insert(inner, inner, 0), Err(Error::InvalidArgument(_))));
        assert!(matches!(tree.insert(text, inner, 0), Err(Error::InvalidArgument(_))));
        assert!(matches!(tree.insert(outer, text, 5), Err(Error::IndexOutOfBounds { .. })));

        tree.add(inner, text).unwrap();
        assert!(matches!(tree.add(outer, text), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_nested_counts_propagate() {
        let mut tree = DocumentTree::new();
        let doc = tree.document_from_text("ab\ncd");
        let second = tree.children(doc)[1];
        assert_eq!(tree.offset(second), 3);

        let text = tree.children(tree.children(doc)[0])[0];
        tree.insert_text(text, "XY", 1).unwrap();
        assert_eq!(tree.get_text(doc), "aXYb\ncd\n");
        assert_eq!(tree.offset(second), 5);
        assert_eq!(tree.document_offset(tree.children(second)[0]), 5);
        assert_offsets(&tree, doc);

        assert_eq!(tree.remove_text(text, 0, 2).unwrap(), "aX");
        assert_eq!(tree.offset(second), 3);
        assert_offsets(&tree, doc);
    }

    #[test]
    fn test_remove_returns_detached_children() {
        let mut tree = DocumentTree::new();
        let doc = tree.document_from_text("one\ntwo\nthree");
        let removed = tree.remove(doc, 0, 2).unwrap();

        assert_eq!(removed.len(), 2);
        assert!(removed.iter().all(|&n| tree.parent(n).is_none()));
        assert_eq!(tree.get_text(doc), "three\n");
        assert_eq!(tree.offset(tree.children(doc)[0]), 0);
        assert_offsets(&tree, doc);

        tree.add(doc, removed[1]).unwrap();
        assert_eq!(tree.get_text(doc), "three\ntwo\n");
    }

    #[test]
    fn test_node_at_and_paths() {
        let mut tree = DocumentTree::new();
        let doc = tree.document_from_text("ab\ncde");
        assert_eq!(tree.node_at(doc, 0).unwrap(), 0);
        assert_eq!(tree.node_at(doc, 2).unwrap(), 0);
        assert_eq!(tree.node_at(doc, 3).unwrap(), 1);
        assert!(tree.node_at(doc, 7).is_err());

        assert_eq!(tree.path_at(doc, 4).unwrap(), vec![1, 0]);
        let leaf = tree.descendant_at(doc, 4).unwrap();
        assert_eq!(tree.get_text(leaf), "cde");
        assert_eq!(tree.character_at(doc, 2).unwrap(), '\n');
        assert_eq!(tree.character_at(doc, 5).unwrap(), 'e');
    }

    #[test]
    fn test_get_range_splits_children() {
        let mut tree = DocumentTree::new();
        let paragraph = tree.create_element(ElementKind::Paragraph);
        for text in ["hello", " big", " world"] {
            let node = tree.create_text(text);
            tree.add(paragraph, node).unwrap();
        }

        let range = tree.get_range(paragraph, 3, 9).unwrap();
        assert_eq!(tree.kind(range), Some(ElementKind::Paragraph));
        assert_eq!(tree.len(range), 3);
        assert_eq!(tree.get_text(range), "lo big wo\n");
        assert_eq!(tree.get_text(paragraph), "hello big world\n");
    }

    #[test]
    fn test_range_ending_at_paragraph_end_skips_newline() {
        let mut tree = DocumentTree::new();
        let paragraph = tree.create_paragraph("abc");

        let range = tree.get_range(paragraph, 1, 3).unwrap();
        assert_eq!(tree.get_text(range), "bc\n");

        let removed = tree.remove_range(paragraph, 0, 4).unwrap();
        assert_eq!(tree.get_text(removed), "abc\n");
        assert_eq!(tree.len(paragraph), 1);
        assert_eq!(tree.get_text(paragraph), "\n");
    }

    #[test]
    fn test_remove_and_reinsert_range() {
        let mut tree = DocumentTree::new();
        let paragraph = tree.create_element(ElementKind::Paragraph);
        for text in ["hello", " world"] {
            let node = tree.create_text(text);
            tree.add(paragraph, node).unwrap();
        }

        let cut = tree.remove_range(paragraph, 3, 5).unwrap();
        assert_eq!(tree.get_text(paragraph), "helrld\n");
        assert_offsets(&tree, paragraph);

        tree.insert_range(paragraph, cut, 3).unwrap();
        assert_eq!(tree.get_text(paragraph), "hello world\n");
        assert_offsets(&tree, paragraph);
    }

    #[test]
    fn test_insert_range_splits_target() {
        let mut tree = DocumentTree::new();
        let block = tree.create_element(ElementKind::Block);
        let text = tree.create_text("abcd");
        tree.add(block, text).unwrap();

        let range = tree.create_element(ElementKind::Block);
        let inserted = tree.create_text("XY");
        tree.add(range, inserted).unwrap();

        tree.insert_range(block, range, 2).unwrap();
        assert_eq!(tree.get_text(block), "abXYcd");
        assert_eq!(tree.len(block), 3);
        assert_eq!(tree.len(range), 0);
        assert_offsets(&tree, block);

        let not_element = tree.create_text("z");
        assert!(tree.insert_range(block, not_element, 0).is_err());
    }

    #[test]
    fn test_replace_range() {
        let mut tree = DocumentTree::new();
        let block = tree.create_element(ElementKind::Block);
        let text = tree.create_text("good morning");
        tree.add(block, text).unwrap();

        let replacement = tree.create_element(ElementKind::Block);
        let evening = tree.create_text("evening");
        tree.add(replacement, evening).unwrap();

        let removed = tree.replace_range(block, 5, 7, replacement).unwrap();
        assert_eq!(tree.get_text(removed), "morning");
        assert_eq!(tree.get_text(block), "good evening");
    }

    #[test]
    fn test_duplicate() {
        let mut tree = DocumentTree::new();
        let doc = tree.document_from_text("a\nb");
        let deep = tree.duplicate(doc, true);
        let shallow = tree.duplicate(doc, false);

        assert_eq!(tree.get_text(deep), tree.get_text(doc));
        assert_ne!(tree.children(deep)[0], tree.children(doc)[0]);
        assert_eq!(tree.len(shallow), 0);
        assert!(tree.parent(deep).is_none());
    }

    #[test]
    fn test_events_bubble_to_root() {
        let events = Rc::new(RefCell::new(Vec::new()));
        let mut tree = DocumentTree::new();
        let doc = tree.document_from_text("ab");
        let paragraph = tree.children(doc)[0];
        let text = tree.children(paragraph)[0];

        let sink = events.clone();
        tree.add_listener(move |event: &TreeEvent| sink.borrow_mut().push(event.clone()));
        tree.insert_text(text, "c", 2).unwrap();

        assert_eq!(
            *events.borrow(),
            vec![
                TreeEvent::RangeInserted { node: text, offset: 2, count: 1 },
                TreeEvent::RangeInserted { node: paragraph, offset: 2, count: 1 },
                TreeEvent::RangeInserted { node: doc, offset: 2, count: 1 },
            ]
        );

        events.borrow_mut().clear();
        let removed = tree.remove(paragraph, 0, 1).unwrap();
        let events = events.borrow();
        assert!(events.contains(&TreeEvent::ParentChanged { node: text, previous_parent: Some(paragraph) }));
        assert!(events.contains(&TreeEvent::RangeRemoved { node: doc, offset: 0, count: 3 }));
        assert_eq!(
            events.last(),
            Some(&TreeEvent::NodesRemoved { element: paragraph, index: 0, removed })
        );
    }
}
