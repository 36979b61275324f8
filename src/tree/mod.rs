//! Document tree access
//!
//! Anchoring never owns the document. Callers hand in a [`DocumentTree`],
//! a minimal read-only view over whatever tree they render from (an XHTML
//! chapter parsed with roxmltree, a browser DOM behind bindings, ...).
//!
//! Ranges are plain values over node handles: a [`Boundary`] is a
//! `(container, offset)` pair with DOM semantics. For text containers the
//! offset counts UTF-16 code units into the node's text; for element
//! containers it is a child index.

use std::fmt;

mod ignore;
mod xml;

pub use ignore::IgnoreSelector;

/// Read-only access to a tree of element and text nodes
pub trait DocumentTree {
    /// Handle to a node. Handles are cheap copies, never owning references.
    type Node: Copy + Eq + fmt::Debug;

    /// Parent of a node (None for the document root)
    fn parent(&self, node: Self::Node) -> Option<Self::Node>;

    fn first_child(&self, node: Self::Node) -> Option<Self::Node>;

    fn last_child(&self, node: Self::Node) -> Option<Self::Node>;

    fn next_sibling(&self, node: Self::Node) -> Option<Self::Node>;

    fn previous_sibling(&self, node: Self::Node) -> Option<Self::Node>;

    /// Text of a text node, None for any other node type
    fn text(&self, node: Self::Node) -> Option<&str>;

    /// Local tag name of an element, None for any other node type
    fn tag_name(&self, node: Self::Node) -> Option<&str>;

    /// Attribute value of an element
    fn attribute(&self, node: Self::Node, name: &str) -> Option<&str>;

    fn is_text(&self, node: Self::Node) -> bool {
        self.text(node).is_some()
    }

    fn is_element(&self, node: Self::Node) -> bool {
        self.tag_name(node).is_some()
    }

    /// Iterate the direct children of a node
    fn children(&self, node: Self::Node) -> Children<'_, Self> {
        Children {
            tree: self,
            next: self.first_child(node),
        }
    }

    /// Iterate a node and all of its descendants in document order
    fn subtree(&self, root: Self::Node) -> Subtree<'_, Self> {
        Subtree {
            tree: self,
            root,
            next: Some(root),
        }
    }

    fn child_count(&self, node: Self::Node) -> usize {
        self.children(node).count()
    }

    fn child_at(&self, node: Self::Node, index: usize) -> Option<Self::Node> {
        self.children(node).nth(index)
    }

    /// Nearest ancestor-or-self satisfying a predicate
    fn closest<F>(&self, node: Self::Node, predicate: F) -> Option<Self::Node>
    where
        F: Fn(Self::Node) -> bool,
        Self: Sized,
    {
        let mut current = Some(node);
        while let Some(candidate) = current {
            if predicate(candidate) {
                return Some(candidate);
            }
            current = self.parent(candidate);
        }
        None
    }

    /// Whether `ancestor` is `node` or one of its ancestors
    fn contains(&self, ancestor: Self::Node, node: Self::Node) -> bool {
        let mut current = Some(node);
        while let Some(candidate) = current {
            if candidate == ancestor {
                return true;
            }
            current = self.parent(candidate);
        }
        false
    }

    /// Deepest node containing both `a` and `b`
    fn common_ancestor(&self, a: Self::Node, b: Self::Node) -> Option<Self::Node> {
        let mut current = Some(a);
        while let Some(candidate) = current {
            if self.contains(candidate, b) {
                return Some(candidate);
            }
            current = self.parent(candidate);
        }
        None
    }

    /// First element under `root` (inclusive) whose `id` attribute equals `id`
    fn element_by_id(&self, root: Self::Node, id: &str) -> Option<Self::Node> {
        self.subtree(root)
            .find(|&node| self.is_element(node) && self.attribute(node, "id") == Some(id))
    }

    /// First element under `root` (inclusive) with the given tag name
    fn find_element(&self, root: Self::Node, tag: &str) -> Option<Self::Node> {
        self.subtree(root).find(|&node| {
            self.tag_name(node)
                .is_some_and(|name| name.eq_ignore_ascii_case(tag))
        })
    }

    /// Concatenated text of all text nodes under `node`
    fn text_content(&self, node: Self::Node) -> String {
        self.subtree(node)
            .filter_map(|n| self.text(n))
            .collect()
    }
}

/// Iterator over the children of a node
pub struct Children<'a, T: DocumentTree + ?Sized> {
    tree: &'a T,
    next: Option<T::Node>,
}

impl<'a, T: DocumentTree + ?Sized> Iterator for Children<'a, T> {
    type Item = T::Node;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = self.tree.next_sibling(current);
        Some(current)
    }
}

/// Pre-order iterator over a subtree
pub struct Subtree<'a, T: DocumentTree + ?Sized> {
    tree: &'a T,
    root: T::Node,
    next: Option<T::Node>,
}

impl<'a, T: DocumentTree + ?Sized> Iterator for Subtree<'a, T> {
    type Item = T::Node;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = match self.tree.first_child(current) {
            Some(child) => Some(child),
            None => {
                let mut node = current;
                loop {
                    if node == self.root {
                        break None;
                    }
                    if let Some(sibling) = self.tree.next_sibling(node) {
                        break Some(sibling);
                    }
                    match self.tree.parent(node) {
                        Some(parent) => node = parent,
                        None => break None,
                    }
                }
            }
        };
        Some(current)
    }
}

/// One end of a range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Boundary<N> {
    /// Text node or element the offset is relative to
    pub container: N,
    /// Character offset (text container) or child index (element container)
    pub offset: usize,
}

impl<N> Boundary<N> {
    pub fn new(container: N, offset: usize) -> Self {
        Self { container, offset }
    }
}

/// A live range over a document tree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextRange<N> {
    pub start: Boundary<N>,
    pub end: Boundary<N>,
}

impl<N: Copy> TextRange<N> {
    /// Create a range between two boundaries
    pub fn new(start: Boundary<N>, end: Boundary<N>) -> Self {
        Self { start, end }
    }

    /// Create a range from container/offset pairs
    pub fn between(
        start_container: N,
        start_offset: usize,
        end_container: N,
        end_offset: usize,
    ) -> Self {
        Self {
            start: Boundary::new(start_container, start_offset),
            end: Boundary::new(end_container, end_offset),
        }
    }

    /// Create a collapsed range at a single boundary
    pub fn collapsed(at: Boundary<N>) -> Self {
        Self { start: at, end: at }
    }

    /// Range covering the whole content of an element
    pub fn select_contents<T>(tree: &T, node: N) -> Self
    where
        T: DocumentTree<Node = N>,
    {
        let end = if tree.is_text(node) {
            tree.text(node).map_or(0, |text| text.encode_utf16().count())
        } else {
            tree.child_count(node)
        };
        Self::between(node, 0, node, end)
    }

    pub fn is_collapsed(&self) -> bool
    where
        N: PartialEq,
    {
        self.start == self.end
    }
}
