//! Anchors: resolvable forms of selectors
//!
//! Each anchor kind reads and writes exactly one selector variant:
//!
//! - [`FragmentAnchor`]: id of an enclosing element
//! - [`RangeAnchor`]: container paths plus offsets
//! - [`TextPositionAnchor`]: linear code unit offsets
//! - [`TextQuoteAnchor`]: quoted text with surrounding context
//!
//! Anchors are plain values. Everything they need from the document comes in
//! through an [`AnchorContext`] at call time.

mod fragment;
mod position;
mod quote;
mod range;

pub use fragment::FragmentAnchor;
pub use position::TextPositionAnchor;
pub use quote::{PositionHint, TextQuoteAnchor};
pub use range::RangeAnchor;

use std::fmt;

use serde::Serialize;

use crate::config::AnchorConfig;
use crate::error::Result;
use crate::matcher::{ApproximateMatcher, FuzzyMatcher};
use crate::selectors::Selector;
use crate::text::TextSpace;
use crate::tree::{DocumentTree, IgnoreSelector, TextRange};

static DEFAULT_MATCHER: FuzzyMatcher = FuzzyMatcher;

/// Kind of an anchor, one per selector variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum AnchorKind {
    Fragment,
    Range,
    TextPosition,
    TextQuote,
}

impl AnchorKind {
    /// Wire name of the selector this kind reads and writes
    pub fn selector_type(&self) -> &'static str {
        match self {
            AnchorKind::Fragment => "FragmentSelector",
            AnchorKind::Range => "RangeSelector",
            AnchorKind::TextPosition => "TextPositionSelector",
            AnchorKind::TextQuote => "TextQuoteSelector",
        }
    }
}

impl fmt::Display for AnchorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnchorKind::Fragment => write!(f, "fragment"),
            AnchorKind::Range => write!(f, "range"),
            AnchorKind::TextPosition => write!(f, "text position"),
            AnchorKind::TextQuote => write!(f, "text quote"),
        }
    }
}

/// Document, coordinate space and collaborators for one anchoring call
pub struct AnchorContext<'a, T: DocumentTree> {
    /// Root and filter defining the coordinate space
    pub space: TextSpace<'a, T>,
    /// Elements transparent to range selector paths
    pub ignore: Option<&'a IgnoreSelector>,
    /// Approximate search used by quote anchors
    pub matcher: &'a dyn ApproximateMatcher,
    pub config: AnchorConfig,
}

impl<'a, T: DocumentTree> AnchorContext<'a, T> {
    /// Context over `space` with the bundled matcher and default config
    pub fn new(space: TextSpace<'a, T>) -> Self {
        Self {
            space,
            ignore: None,
            matcher: &DEFAULT_MATCHER,
            config: AnchorConfig::default(),
        }
    }

    pub fn with_ignore(mut self, ignore: &'a IgnoreSelector) -> Self {
        self.ignore = Some(ignore);
        self
    }

    pub fn with_matcher(mut self, matcher: &'a dyn ApproximateMatcher) -> Self {
        self.matcher = matcher;
        self
    }

    pub fn with_config(mut self, config: AnchorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn tree(&self) -> &'a T {
        self.space.tree()
    }

    pub fn root(&self) -> T::Node {
        self.space.root()
    }

    /// Whether an element is transparent to range selector paths
    pub fn is_ignored(&self, node: T::Node) -> bool {
        node != self.root()
            && self
                .ignore
                .is_some_and(|ignore| ignore.matches(self.tree(), node))
    }
}

/// Conversion between live ranges and one selector variant
pub trait Anchor<T: DocumentTree>: Sized {
    /// Capture a live range
    fn from_range(ctx: &AnchorContext<'_, T>, range: &TextRange<T::Node>) -> Result<Self>;

    /// Load a persisted selector
    fn from_selector(ctx: &AnchorContext<'_, T>, selector: &Selector) -> Result<Self>;

    /// Resolve back to a live range
    fn to_range(&self, ctx: &AnchorContext<'_, T>) -> Result<TextRange<T::Node>>;

    /// Persistable form
    fn to_selector(&self, ctx: &AnchorContext<'_, T>) -> Result<Selector>;
}
