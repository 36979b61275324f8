//! Fragment anchor: the id of an element enclosing the range

use super::{Anchor, AnchorContext, AnchorKind};
use crate::error::{AnchorError, Result};
use crate::selectors::Selector;
use crate::tree::{DocumentTree, TextRange};

/// Anchor to an element by its `id` attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FragmentAnchor {
    id: String,
}

impl FragmentAnchor {
    pub fn new(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        if id.is_empty() {
            return Err(AnchorError::MissingParameter("id"));
        }
        Ok(Self { id })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> AnchorKind {
        AnchorKind::Fragment
    }
}

impl<T: DocumentTree> Anchor<T> for FragmentAnchor {
    fn from_range(ctx: &AnchorContext<'_, T>, range: &TextRange<T::Node>) -> Result<Self> {
        let tree = ctx.tree();
        let common = tree
            .common_ancestor(range.start.container, range.end.container)
            .ok_or(AnchorError::MissingParameter("id"))?;
        let element = tree
            .closest(common, |node| {
                tree.is_element(node) && tree.attribute(node, "id").is_some_and(|id| !id.is_empty())
            })
            .ok_or(AnchorError::MissingParameter("id"))?;

        match tree.attribute(element, "id") {
            Some(id) => Self::new(id),
            None => Err(AnchorError::MissingParameter("id")),
        }
    }

    fn from_selector(_ctx: &AnchorContext<'_, T>, selector: &Selector) -> Result<Self> {
        match selector {
            Selector::Fragment { value } => Self::new(value.as_str()),
            other => Err(AnchorError::SelectorMismatch {
                expected: AnchorKind::Fragment.selector_type(),
                found: other.type_name(),
            }),
        }
    }

    fn to_range(&self, ctx: &AnchorContext<'_, T>) -> Result<TextRange<T::Node>> {
        let tree = ctx.tree();
        let element = tree
            .element_by_id(ctx.root(), &self.id)
            .ok_or_else(|| AnchorError::DomLookup(self.id.clone()))?;
        Ok(TextRange::select_contents(tree, element))
    }

    fn to_selector(&self, _ctx: &AnchorContext<'_, T>) -> Result<Selector> {
        Ok(Selector::Fragment {
            value: self.id.clone(),
        })
    }
}
