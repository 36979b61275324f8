//! Range anchor: container paths and text offsets
//!
//! Each boundary is stored as the path of the nearest element holding it,
//! relative to the root, plus a code unit offset into that element's text:
//!
//! ```text
//! /p[2]/b[1]   second <p> under the root, first <b> inside it
//! ""           the root itself
//! ```
//!
//! Elements matched by the ignore selector (highlight wrappers and the
//! like) never appear as steps. Their element children are counted as if
//! they were children of the wrapper's parent, so wrapping text in a
//! highlight does not change the paths of anything around it.

use super::{Anchor, AnchorContext, AnchorKind};
use crate::error::{AnchorError, Result};
use crate::selectors::Selector;
use crate::text::{SeekMode, TextSpace};
use crate::tree::{Boundary, DocumentTree, TextRange};

/// Anchor holding a live range directly
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeAnchor<N> {
    range: TextRange<N>,
}

impl<N: Copy> RangeAnchor<N> {
    pub fn new(range: TextRange<N>) -> Self {
        Self { range }
    }

    pub fn range(&self) -> TextRange<N> {
        self.range
    }

    pub fn kind(&self) -> AnchorKind {
        AnchorKind::Range
    }
}

impl<T: DocumentTree> Anchor<T> for RangeAnchor<T::Node> {
    fn from_range(_ctx: &AnchorContext<'_, T>, range: &TextRange<T::Node>) -> Result<Self> {
        Ok(Self::new(*range))
    }

    fn from_selector(ctx: &AnchorContext<'_, T>, selector: &Selector) -> Result<Self> {
        let Selector::Range {
            start_container,
            start_offset,
            end_container,
            end_offset,
        } = selector
        else {
            return Err(AnchorError::SelectorMismatch {
                expected: AnchorKind::Range.selector_type(),
                found: selector.type_name(),
            });
        };

        let start = resolve_boundary(ctx, start_container, *start_offset)?;
        let end = resolve_boundary(ctx, end_container, *end_offset)?;
        let range = TextRange::new(start, end);
        ctx.space.offsets_of(&range)?;
        Ok(Self::new(range))
    }

    fn to_range(&self, ctx: &AnchorContext<'_, T>) -> Result<TextRange<T::Node>> {
        ctx.space.offsets_of(&self.range)?;
        Ok(self.range)
    }

    fn to_selector(&self, ctx: &AnchorContext<'_, T>) -> Result<Selector> {
        let (start_container, start_offset) = describe_boundary(ctx, &self.range.start)?;
        let (end_container, end_offset) = describe_boundary(ctx, &self.range.end)?;
        Ok(Selector::Range {
            start_container,
            start_offset,
            end_container,
            end_offset,
        })
    }
}

/// Path and offset of one boundary
fn describe_boundary<T: DocumentTree>(
    ctx: &AnchorContext<'_, T>,
    boundary: &Boundary<T::Node>,
) -> Result<(String, usize)> {
    let container = container_element(ctx, boundary.container)?;
    let offset = ctx.space.rooted_at(container).offset_of(boundary)?;
    Ok((element_path(ctx, container)?, offset))
}

/// Nearest non-ignored element holding `node`, never above the root
fn container_element<T: DocumentTree>(ctx: &AnchorContext<'_, T>, node: T::Node) -> Result<T::Node> {
    let tree = ctx.tree();
    let mut current = node;
    loop {
        if current == ctx.root() || (tree.is_element(current) && !ctx.is_ignored(current)) {
            return Ok(current);
        }
        current = tree.parent(current).ok_or_else(|| {
            AnchorError::InvalidRange(format!("{:?} is outside the root", node))
        })?;
    }
}

fn element_path<T: DocumentTree>(ctx: &AnchorContext<'_, T>, element: T::Node) -> Result<String> {
    let tree = ctx.tree();
    let mut steps = Vec::new();
    let mut current = element;

    while current != ctx.root() {
        let parent = container_element(
            ctx,
            tree.parent(current).ok_or_else(|| {
                AnchorError::InvalidRange(format!("{:?} is outside the root", element))
            })?,
        )?;
        let name = tree.tag_name(current).unwrap_or_default().to_ascii_lowercase();
        let index = path_children(ctx, parent)
            .into_iter()
            .filter(|&child| same_tag(tree, child, &name))
            .position(|child| child == current)
            .map(|i| i + 1)
            .ok_or_else(|| AnchorError::InvalidRange(format!("{:?} has no path", current)))?;

        steps.push(format!("/{}[{}]", name, index));
        current = parent;
    }

    steps.reverse();
    Ok(steps.concat())
}

/// Element children for path purposes, with ignored wrappers flattened away
fn path_children<T: DocumentTree>(ctx: &AnchorContext<'_, T>, parent: T::Node) -> Vec<T::Node> {
    let tree = ctx.tree();
    let mut children = Vec::new();
    for child in tree.children(parent) {
        if !tree.is_element(child) {
            continue;
        }
        if ctx.is_ignored(child) {
            children.extend(path_children(ctx, child));
        } else {
            children.push(child);
        }
    }
    children
}

fn same_tag<T: DocumentTree>(tree: &T, node: T::Node, name: &str) -> bool {
    tree.tag_name(node)
        .is_some_and(|tag| tag.eq_ignore_ascii_case(name))
}

fn resolve_path<T: DocumentTree>(ctx: &AnchorContext<'_, T>, path: &str) -> Result<T::Node> {
    let tree = ctx.tree();
    let invalid = || AnchorError::InvalidRange(format!("cannot resolve path {:?}", path));

    let mut current = ctx.root();
    for step in path.split('/').filter(|step| !step.is_empty()) {
        let (name, index) = step
            .strip_suffix(']')
            .and_then(|step| step.split_once('['))
            .ok_or_else(invalid)?;
        let index: usize = index.parse().map_err(|_| invalid())?;
        if index == 0 {
            return Err(invalid());
        }

        current = path_children(ctx, current)
            .into_iter()
            .filter(|&child| same_tag(tree, child, name))
            .nth(index - 1)
            .ok_or_else(invalid)?;
    }
    Ok(current)
}

/// Boundary `offset` code units into the text of the element at `path`.
///
/// Several boundaries share an offset where text nodes meet. The one chosen
/// describes back to the same container, so a loaded selector is written out
/// again unchanged.
fn resolve_boundary<T: DocumentTree>(
    ctx: &AnchorContext<'_, T>,
    path: &str,
    offset: usize,
) -> Result<Boundary<T::Node>> {
    let container = resolve_path(ctx, path)?;
    let space = ctx.space.rooted_at(container);

    if offset == 0 && space.is_empty() {
        return Ok(Boundary::new(container, 0));
    }

    let seek = |amount: usize| -> Result<Boundary<T::Node>> {
        let mut walker = space.walker();
        let amount = isize::try_from(amount)
            .map_err(|_| AnchorError::InvalidRange(format!("offset {} is too large", amount)))?;
        walker.seek(amount, SeekMode::Absolute).map_err(|e| {
            AnchorError::InvalidRange(format!("offset {} in {:?}: {}", offset, path, e))
        })?;
        walker
            .boundary()
            .ok_or_else(|| AnchorError::InvalidRange(format!("offset {} in {:?}", offset, path)))
    };

    let landed = seek(offset)?;
    if container_element(ctx, landed.container)? == container {
        return Ok(landed);
    }

    // The walker lands at the start of the next node; the text ending here
    // may sit directly in the container
    if landed.offset == 0 && offset > 0 {
        let before = seek(offset - 1)?;
        let previous = Boundary::new(before.container, before.offset + 1);
        if container_element(ctx, previous.container)? == container {
            return Ok(previous);
        }
    }

    Ok(element_boundary(ctx, &space, container, landed.container, offset)?.unwrap_or(landed))
}

/// Boundary between two children of `container` at `offset`, found by
/// climbing from `node` to the child holding it
fn element_boundary<T: DocumentTree>(
    ctx: &AnchorContext<'_, T>,
    space: &TextSpace<'_, T>,
    container: T::Node,
    node: T::Node,
    offset: usize,
) -> Result<Option<Boundary<T::Node>>> {
    let tree = ctx.tree();
    let mut child = node;
    while let Some(parent) = tree.parent(child) {
        if container_element(ctx, parent)? == container {
            let Some(index) = tree.children(parent).position(|n| n == child) else {
                return Ok(None);
            };
            for candidate in [Boundary::new(parent, index), Boundary::new(parent, index + 1)] {
                if space.offset_of(&candidate)? == offset {
                    return Ok(Some(candidate));
                }
            }
            return Ok(None);
        }
        child = parent;
    }
    Ok(None)
}
