//! Linear text coordinates over a document tree
//!
//! A [`TextSpace`] is a coordinate space: a root node plus an optional
//! filter. Offsets count UTF-16 code units of the concatenated text of every
//! accepted text node under the root, in document order, the same unit a DOM
//! range uses. Nodes the filter rejects contribute nothing, and neither does
//! anything beneath them.
//!
//! Offsets from different spaces are not comparable. [`char_index`] and
//! [`unit_index`] convert to and from `char` counts.

mod walker;

pub use walker::{SeekMode, TextWalker};

use crate::error::{AnchorError, Result};
use crate::tree::{Boundary, DocumentTree, TextRange};

/// Predicate deciding whether a node takes part in a coordinate space
pub type NodeFilter<'a, N> = &'a dyn Fn(N) -> bool;

/// A (root, filter) coordinate space over a tree
pub struct TextSpace<'a, T: DocumentTree> {
    tree: &'a T,
    root: T::Node,
    filter: Option<NodeFilter<'a, T::Node>>,
}

impl<'a, T: DocumentTree> Clone for TextSpace<'a, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, T: DocumentTree> Copy for TextSpace<'a, T> {}

impl<'a, T: DocumentTree> TextSpace<'a, T> {
    /// Coordinate space over all text under `root`
    pub fn new(tree: &'a T, root: T::Node) -> Self {
        Self {
            tree,
            root,
            filter: None,
        }
    }

    /// Restrict the space to nodes accepted by `filter`
    pub fn with_filter(mut self, filter: NodeFilter<'a, T::Node>) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Same filter, different root
    pub fn rooted_at(&self, root: T::Node) -> Self {
        Self { root, ..*self }
    }

    pub fn tree(&self) -> &'a T {
        self.tree
    }

    pub fn root(&self) -> T::Node {
        self.root
    }

    /// Whether the filter accepts a node (the root is always accepted)
    pub fn accepts(&self, node: T::Node) -> bool {
        node == self.root || self.filter.map_or(true, |filter| filter(node))
    }

    /// Create a walker positioned at offset 0
    pub fn walker(&self) -> TextWalker<'a, T> {
        TextWalker::new(*self)
    }

    /// Accepted text nodes with non-empty text, in document order
    pub fn text_nodes(&self) -> impl Iterator<Item = T::Node> + 'a {
        let space = *self;
        let mut next = Some(space.root);
        std::iter::from_fn(move || loop {
            let current = next?;
            next = space.next_node(current);
            if space.is_text_node(current) {
                return Some(current);
            }
        })
    }

    /// The corpus: concatenated text of the space
    pub fn text(&self) -> String {
        self.text_nodes()
            .filter_map(|node| self.tree.text(node))
            .collect()
    }

    /// Length of the space in UTF-16 code units
    pub fn len(&self) -> usize {
        self.text_nodes().map(|node| self.unit_len(node)).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.text_nodes().next().is_none()
    }

    /// Offset of a range boundary in this space.
    ///
    /// Element boundaries resolve to the offset of the first text following
    /// them. Boundaries inside rejected subtrees resolve to the offset where
    /// the subtree would have started.
    pub fn offset_of(&self, boundary: &Boundary<T::Node>) -> Result<usize> {
        let container = boundary.container;

        if let Some(rejected) = self.rejected_ancestor(container)? {
            return self.offset_before(rejected);
        }

        if self.tree.is_text(container) {
            let len = self.unit_len(container);
            return Ok(self.offset_before(container)? + boundary.offset.min(len));
        }

        let following = match self.tree.child_at(container, boundary.offset) {
            Some(child) => Some(child),
            None => self.next_outside(container),
        };
        match following {
            Some(node) => self.offset_before(node),
            None => Ok(self.len()),
        }
    }

    /// Start and end offsets of a range
    pub fn offsets_of(&self, range: &TextRange<T::Node>) -> Result<(usize, usize)> {
        let start = self.offset_of(&range.start)?;
        let end = self.offset_of(&range.end)?;
        if start > end {
            return Err(AnchorError::InvalidRange(format!(
                "range start {} is after its end {}",
                start, end
            )));
        }
        Ok((start, end))
    }

    /// Text between two offsets
    pub fn text_between(&self, start: usize, end: usize) -> String {
        let text = self.text();
        let end = byte_index(&text, end);
        let start = byte_index(&text, start).min(end);
        text[start..end].to_string()
    }

    /// Text covered by a range, as seen by this space
    pub fn range_text(&self, range: &TextRange<T::Node>) -> Result<String> {
        let (start, end) = self.offsets_of(range)?;
        Ok(self.text_between(start, end))
    }

    pub(crate) fn unit_len(&self, node: T::Node) -> usize {
        self.tree.text(node).map_or(0, |text| text.encode_utf16().count())
    }

    pub(crate) fn is_text_node(&self, node: T::Node) -> bool {
        self.tree.is_text(node) && self.accepts(node) && self.unit_len(node) > 0
    }

    /// Next node in pre-order, not descending into rejected elements
    pub(crate) fn next_node(&self, node: T::Node) -> Option<T::Node> {
        if self.accepts(node) {
            if let Some(child) = self.tree.first_child(node) {
                return Some(child);
            }
        }
        self.next_outside(node)
    }

    /// Previous node in pre-order, not descending into rejected elements
    pub(crate) fn previous_node(&self, node: T::Node) -> Option<T::Node> {
        if node == self.root {
            return None;
        }
        match self.tree.previous_sibling(node) {
            Some(mut sibling) => {
                while self.accepts(sibling) {
                    match self.tree.last_child(sibling) {
                        Some(child) => sibling = child,
                        None => break,
                    }
                }
                Some(sibling)
            }
            None => self.tree.parent(node),
        }
    }

    /// First node after the subtree of `node`, staying under the root
    fn next_outside(&self, node: T::Node) -> Option<T::Node> {
        let mut current = node;
        loop {
            if current == self.root {
                return None;
            }
            if let Some(sibling) = self.tree.next_sibling(current) {
                return Some(sibling);
            }
            current = self.tree.parent(current)?;
        }
    }

    /// Topmost rejected ancestor-or-self below the root
    fn rejected_ancestor(&self, node: T::Node) -> Result<Option<T::Node>> {
        let mut rejected = None;
        let mut current = node;
        while current != self.root {
            if !self.accepts(current) {
                rejected = Some(current);
            }
            current = self.tree.parent(current).ok_or_else(|| {
                AnchorError::InvalidRange(format!("{:?} is outside the root", node))
            })?;
        }
        Ok(rejected)
    }

    /// Length of accepted text strictly before `target` in document order
    fn offset_before(&self, target: T::Node) -> Result<usize> {
        let mut offset = 0;
        let mut current = self.root;
        loop {
            if current == target {
                return Ok(offset);
            }
            if self.is_text_node(current) {
                offset += self.unit_len(current);
            }
            current = self.next_node(current).ok_or_else(|| {
                AnchorError::InvalidRange(format!("{:?} is not reachable from the root", target))
            })?;
        }
    }
}

/// Byte index of the char holding UTF-16 offset `units`, or the length of
/// `text` past its end. An offset inside a surrogate pair rounds down.
pub fn byte_index(text: &str, units: usize) -> usize {
    let mut seen = 0;
    for (byte, ch) in text.char_indices() {
        seen += ch.len_utf16();
        if seen > units {
            return byte;
        }
    }
    text.len()
}

/// Number of chars before UTF-16 offset `units`
pub fn char_index(text: &str, units: usize) -> usize {
    text[..byte_index(text, units)].chars().count()
}

/// UTF-16 offset of the `chars`-th char
pub fn unit_index(text: &str, chars: usize) -> usize {
    text.chars().take(chars).map(char::len_utf16).sum()
}
