//! Text offset walker
//!
//! Converts between linear offsets and positions inside text nodes. A walker
//! keeps only its current position; moving it is a scan from that position,
//! so seeking forward from the start and seeking back from the end land on
//! the same node.

use super::TextSpace;
use crate::error::{AnchorError, Result};
use crate::tree::{Boundary, DocumentTree};

/// How `seek` interprets its amount
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeekMode {
    /// Offset from the start of the space
    Absolute,
    /// Offset from the walker's current position
    Relative,
}

/// Cursor over the text nodes of a [`TextSpace`]
pub struct TextWalker<'a, T: DocumentTree> {
    space: TextSpace<'a, T>,
    /// Text node under the cursor (None before the first seek)
    node: Option<T::Node>,
    /// Offset at the start of `node`
    base: usize,
    /// Exact position
    offset: usize,
}

impl<'a, T: DocumentTree> TextWalker<'a, T> {
    pub(super) fn new(space: TextSpace<'a, T>) -> Self {
        Self {
            space,
            node: None,
            base: 0,
            offset: 0,
        }
    }

    /// Current offset from the start of the space
    pub fn tell(&self) -> usize {
        self.offset
    }

    /// Text node under the cursor
    pub fn node(&self) -> Option<T::Node> {
        self.node
    }

    /// The cursor as a `(text node, code unit offset)` boundary
    pub fn boundary(&self) -> Option<Boundary<T::Node>> {
        self.node
            .map(|node| Boundary::new(node, self.offset - self.base))
    }

    /// Move the cursor and return the offset at the start of the text node
    /// now under it. The position inside that node is `target - base`.
    ///
    /// A target on a node boundary lands on the node starting there, except
    /// at the very end of the space, which lands on the last node.
    pub fn seek(&mut self, amount: isize, mode: SeekMode) -> Result<usize> {
        let target = match mode {
            SeekMode::Absolute => amount,
            SeekMode::Relative => (self.offset as isize).saturating_add(amount),
        };
        let target = usize::try_from(target).map_err(|_| AnchorError::OffsetOutOfRange {
            offset: target,
            length: self.space.len(),
        })?;

        let mut node = match self.node {
            Some(node) => node,
            None => {
                let first = self.space.text_nodes().next().ok_or(
                    AnchorError::OffsetOutOfRange {
                        offset: target as isize,
                        length: 0,
                    },
                )?;
                self.base = 0;
                first
            }
        };
        let mut base = self.base;

        while target < base {
            let previous = self.previous_text_node(node).ok_or_else(|| {
                AnchorError::InvalidRange("walker lost its position".to_string())
            })?;
            base -= self.space.unit_len(previous);
            node = previous;
        }

        loop {
            let end = base + self.space.unit_len(node);
            if target < end {
                break;
            }
            match self.next_text_node(node) {
                Some(next) => {
                    base = end;
                    node = next;
                }
                None if target == end => break,
                None => {
                    return Err(AnchorError::OffsetOutOfRange {
                        offset: target as isize,
                        length: end,
                    })
                }
            }
        }

        self.node = Some(node);
        self.base = base;
        self.offset = target;
        tracing::trace!(offset = target, base, "walker seek");
        Ok(base)
    }

    fn next_text_node(&self, node: T::Node) -> Option<T::Node> {
        let mut current = self.space.next_node(node)?;
        loop {
            if self.space.is_text_node(current) {
                return Some(current);
            }
            current = self.space.next_node(current)?;
        }
    }

    fn previous_text_node(&self, node: T::Node) -> Option<T::Node> {
        let mut current = self.space.previous_node(node)?;
        loop {
            if self.space.is_text_node(current) {
                return Some(current);
            }
            current = self.space.previous_node(current)?;
        }
    }
}
