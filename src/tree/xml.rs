//! [`DocumentTree`] for parsed XHTML chapters
//!
//! EPUB content documents are XHTML, so a roxmltree `Document` is a complete
//! tree for anchoring. Node handles are `NodeId`s.

use roxmltree::{Document, NodeId};

use super::DocumentTree;

impl<'input> DocumentTree for Document<'input> {
    type Node = NodeId;

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.get_node(node)?.parent().map(|n| n.id())
    }

    fn first_child(&self, node: NodeId) -> Option<NodeId> {
        self.get_node(node)?.first_child().map(|n| n.id())
    }

    fn last_child(&self, node: NodeId) -> Option<NodeId> {
        self.get_node(node)?.last_child().map(|n| n.id())
    }

    fn next_sibling(&self, node: NodeId) -> Option<NodeId> {
        self.get_node(node)?.next_sibling().map(|n| n.id())
    }

    fn previous_sibling(&self, node: NodeId) -> Option<NodeId> {
        self.get_node(node)?.prev_sibling().map(|n| n.id())
    }

    fn text(&self, node: NodeId) -> Option<&str> {
        let node = self.get_node(node)?;
        // Element::text() returns the first child's text; only text nodes count here
        if node.is_text() {
            node.text()
        } else {
            None
        }
    }

    fn tag_name(&self, node: NodeId) -> Option<&str> {
        let node = self.get_node(node)?;
        if node.is_element() {
            Some(node.tag_name().name())
        } else {
            None
        }
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        self.get_node(node)?.attribute(name)
    }
}
